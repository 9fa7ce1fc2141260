//! # Control Scheme Module
//!
//! A named set of actions: one complete input profile ("Keyboard + Mouse",
//! "Gamepad"). Schemes own their actions and carry a unique id that stays
//! stable across renames within a session.

use std::collections::HashMap;

use rand::Rng;
use tracing::warn;

use super::action::InputAction;
use crate::gamepad::GamepadHandler;
use crate::source::RawInputSource;

/// A named, ordered collection of actions.
#[derive(Debug, Clone)]
pub struct ControlScheme {
    /// Scheme name, the save/load and lookup key.
    pub name: String,

    unique_id: String,
    actions: Vec<InputAction>,
    lookup: HashMap<String, usize>,
}

impl PartialEq for ControlScheme {
    // unique_id is session-local (regenerated on load), so equality is over
    // the persisted model only.
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.actions == other.actions
    }
}

impl ControlScheme {
    /// Creates an empty scheme with a fresh unique id.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            unique_id: Self::generate_unique_id(),
            actions: Vec::new(),
            lookup: HashMap::new(),
        }
    }

    /// 32 hex characters, generated once per scheme.
    #[must_use]
    pub fn generate_unique_id() -> String {
        format!("{:032x}", rand::thread_rng().gen::<u128>())
    }

    /// The scheme's session-stable unique id.
    #[must_use]
    pub fn unique_id(&self) -> &str {
        &self.unique_id
    }

    /// The scheme's actions, in declaration order.
    #[must_use]
    pub fn actions(&self) -> &[InputAction] {
        &self.actions
    }

    /// The scheme's actions, mutable (editing).
    pub fn actions_mut(&mut self) -> &mut [InputAction] {
        &mut self.actions
    }

    /// Appends a new empty action and returns it for configuration.
    pub fn create_action(&mut self, name: &str, display_name: &str) -> &mut InputAction {
        self.actions.push(InputAction::new(name, display_name));
        let last = self.actions.len() - 1;
        &mut self.actions[last]
    }

    /// Whether an action with this name exists (valid after `initialize`).
    #[must_use]
    pub fn has_action(&self, name: &str) -> bool {
        self.lookup.contains_key(name)
    }

    /// An action by name (valid after `initialize`).
    #[must_use]
    pub fn action(&self, name: &str) -> Option<&InputAction> {
        self.lookup.get(name).map(|&idx| &self.actions[idx])
    }

    /// An action by name, mutable (valid after `initialize`).
    pub fn action_mut(&mut self, name: &str) -> Option<&mut InputAction> {
        let idx = *self.lookup.get(name)?;
        self.actions.get_mut(idx)
    }

    /// Builds the name lookup and allocates per-player runtime state.
    /// Duplicate action names log a diagnostic; the first occurrence wins.
    pub fn initialize(&mut self, num_players: usize) {
        self.lookup.clear();
        for (idx, action) in self.actions.iter_mut().enumerate() {
            if self.lookup.contains_key(&action.name) {
                warn!(
                    "Control scheme '{}' has duplicate action name '{}'",
                    self.name, action.name
                );
            } else {
                self.lookup.insert(action.name.clone(), idx);
            }
            action.initialize(num_players);
        }
    }

    /// Advances every action by one tick.
    pub fn update<S: RawInputSource>(
        &mut self,
        delta_time: f32,
        source: &S,
        gamepad: &GamepadHandler,
    ) {
        for action in &mut self.actions {
            action.update(delta_time, source, gamepad);
        }
    }

    /// Whether any action of this scheme is receiving input.
    #[must_use]
    pub fn any_input(&self, player: usize) -> bool {
        self.actions.iter().any(|a| a.any_input(player))
    }
}
