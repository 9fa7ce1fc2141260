//! # Input Action Module
//!
//! A named logical input ("Jump", "Fire") aggregating an ordered list of
//! bindings.
//!
//! The float value is resolved with a first-non-neutral policy: bindings are
//! evaluated in order and the first one whose value is non-zero wins, so
//! earlier bindings act as the primary source and later ones as fallbacks.
//! Booleans aggregate with OR, and the press/release edges are detected by
//! comparing the aggregate against the previous tick's aggregate.

use tracing::warn;

use super::binding::{InputBinding, AXIS_NEUTRAL, MAX_BINDINGS};
use crate::gamepad::GamepadHandler;
use crate::source::RawInputSource;

/// Per-player aggregate state, never serialized.
#[derive(Debug, Clone, Copy, Default)]
struct ActionState {
    pressed: bool,
    prev_pressed: bool,
}

/// A named logical input aggregating up to [`MAX_BINDINGS`] bindings.
#[derive(Debug, Clone)]
pub struct InputAction {
    /// Lookup name, unique within the owning scheme.
    pub name: String,
    /// Human-readable name shown in rebinding UIs.
    pub display_name: String,

    bindings: Vec<InputBinding>,
    states: Vec<ActionState>,
}

impl PartialEq for InputAction {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.display_name == other.display_name
            && self.bindings == other.bindings
    }
}

impl InputAction {
    /// Creates an empty action.
    #[must_use]
    pub fn new(name: &str, display_name: &str) -> Self {
        Self {
            name: name.to_string(),
            display_name: display_name.to_string(),
            bindings: Vec::new(),
            states: Vec::new(),
        }
    }

    /// The action's bindings, in resolution order.
    #[must_use]
    pub fn bindings(&self) -> &[InputBinding] {
        &self.bindings
    }

    /// A binding by index.
    #[must_use]
    pub fn binding(&self, index: usize) -> Option<&InputBinding> {
        self.bindings.get(index)
    }

    /// A binding by index, mutable (rebinding / editing).
    pub fn binding_mut(&mut self, index: usize) -> Option<&mut InputBinding> {
        self.bindings.get_mut(index)
    }

    /// Appends a binding. Exceeding [`MAX_BINDINGS`] logs a diagnostic and
    /// leaves the action unchanged.
    pub fn add_binding(&mut self, binding: InputBinding) -> bool {
        if self.bindings.len() >= MAX_BINDINGS {
            warn!(
                "Action '{}' already has {} bindings; ignoring extra binding",
                self.name, MAX_BINDINGS
            );
            return false;
        }
        self.bindings.push(binding);
        true
    }

    /// Appends a default binding and returns it for configuration, or `None`
    /// when the action is full.
    pub fn create_binding(&mut self) -> Option<&mut InputBinding> {
        if !self.add_binding(InputBinding::new()) {
            return None;
        }
        self.bindings.last_mut()
    }

    /// Allocates per-player runtime state for this action and its bindings.
    pub fn initialize(&mut self, num_players: usize) {
        self.states = vec![ActionState::default(); num_players];
        for binding in &mut self.bindings {
            binding.initialize(num_players);
        }
    }

    /// Advances every binding for every player by one tick and refreshes the
    /// aggregate press state.
    pub fn update<S: RawInputSource>(
        &mut self,
        delta_time: f32,
        source: &S,
        gamepad: &GamepadHandler,
    ) {
        for player in 0..self.states.len() {
            for binding in &mut self.bindings {
                binding.update(player, delta_time, source, gamepad);
            }

            let pressed = self.bindings.iter().any(|b| b.pressed(player));
            let state = &mut self.states[player];
            state.prev_pressed = state.pressed;
            state.pressed = pressed;
        }
    }

    /// The resolved float value: the first binding with a non-neutral value
    /// wins; an action with no active binding reports 0.
    #[must_use]
    pub fn value(&self, player: usize) -> f32 {
        for binding in &self.bindings {
            let value = binding.value(player);
            if value != AXIS_NEUTRAL {
                return value;
            }
        }
        AXIS_NEUTRAL
    }

    /// Whether any binding reports pressed.
    #[must_use]
    pub fn get_button(&self, player: usize) -> bool {
        self.states.get(player).map(|s| s.pressed).unwrap_or(false)
    }

    /// Whether the aggregate went from released to pressed this tick.
    #[must_use]
    pub fn get_button_down(&self, player: usize) -> bool {
        self.states
            .get(player)
            .map(|s| s.pressed && !s.prev_pressed)
            .unwrap_or(false)
    }

    /// Whether the aggregate went from pressed to released this tick.
    #[must_use]
    pub fn get_button_up(&self, player: usize) -> bool {
        self.states
            .get(player)
            .map(|s| !s.pressed && s.prev_pressed)
            .unwrap_or(false)
    }

    /// Whether any binding is receiving input.
    #[must_use]
    pub fn any_input(&self, player: usize) -> bool {
        self.bindings.iter().any(|b| b.any_input(player))
    }
}
