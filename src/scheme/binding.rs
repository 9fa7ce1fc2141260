//! # Input Binding Module
//!
//! One raw-input source mapped with a read-out policy to a logical action.
//!
//! ## Binding kinds
//!
//! | Kind | Source | Float | Boolean |
//! |------|--------|-------|---------|
//! | KeyButton | one key | ramp while held (`update_as_axis`) | key held |
//! | DigitalAxis | two keys | time-integrated ramp | threshold (`update_as_button`) |
//! | MouseAxis | mouse delta | raw delta, unscaled | never |
//! | GamepadButton | logical button | ramp while held (`update_as_axis`) | button held |
//! | GamepadAxis | logical axis | raw, dead-zone filtered | threshold (`update_as_button`) |
//! | GamepadAnalogButton | logical axis | ramp from threshold (`update_as_axis`) | sign-gated threshold |
//!
//! All per-binding resolution is a pure function of (previous float state,
//! raw snapshot, delta time), so evaluation order between bindings never
//! matters. A binding referencing an unassigned gamepad slot resolves to
//! neutral rather than failing.

use crate::gamepad::{self, GamepadHandler};
use crate::keycode::KeyCode;
use crate::source::RawInputSource;

/// Neutral axis value.
pub const AXIS_NEUTRAL: f32 = 0.0;
/// Maximum axis value.
pub const AXIS_POSITIVE: f32 = 1.0;
/// Minimum axis value.
pub const AXIS_NEGATIVE: f32 = -1.0;

/// Maximum number of bindings one action may hold.
pub const MAX_BINDINGS: usize = 8;

/// Advances a synthesized axis value by one tick.
///
/// While the positive input is held the value ramps toward +1 at
/// `sensitivity` units/sec (snapping through neutral first when `snap` is set
/// and the sign flips); the negative input is symmetric; with neither held
/// the value relaxes toward 0 at `gravity` units/sec. The positive input wins
/// when both are held. Result is clamped to [-1, 1].
///
/// This is the single canonical ramp: digital axes, button-as-axis emulation
/// and the gamepad D-pad axis synthesis all run through here.
///
/// # Examples
///
/// ```
/// use bindkit::scheme::binding::advance_axis;
///
/// // Held for 0.1s at sensitivity 3: value advances by 0.3
/// let v = advance_axis(0.0, true, false, 0.1, 3.0, 3.0, true);
/// assert!((v - 0.3).abs() < 1e-6);
///
/// // Released: relaxes toward neutral at gravity
/// let v = advance_axis(0.3, false, false, 0.1, 3.0, 3.0, true);
/// assert!((v - 0.0).abs() < 1e-6);
/// ```
#[must_use]
pub fn advance_axis(
    value: f32,
    positive_held: bool,
    negative_held: bool,
    delta_time: f32,
    sensitivity: f32,
    gravity: f32,
    snap: bool,
) -> f32 {
    let mut value = value;
    if positive_held {
        if value < AXIS_NEUTRAL && snap {
            value = AXIS_NEUTRAL;
        }
        value += sensitivity * delta_time;
        if value > AXIS_POSITIVE {
            value = AXIS_POSITIVE;
        }
    } else if negative_held {
        if value > AXIS_NEUTRAL && snap {
            value = AXIS_NEUTRAL;
        }
        value -= sensitivity * delta_time;
        if value < AXIS_NEGATIVE {
            value = AXIS_NEGATIVE;
        }
    } else if value < AXIS_NEUTRAL {
        value += gravity * delta_time;
        if value > AXIS_NEUTRAL {
            value = AXIS_NEUTRAL;
        }
    } else if value > AXIS_NEUTRAL {
        value -= gravity * delta_time;
        if value < AXIS_NEUTRAL {
            value = AXIS_NEUTRAL;
        }
    }
    value
}

/// Which raw source a binding reads.
///
/// The spellings of these names are part of the persistence wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputType {
    KeyButton,
    MouseAxis,
    DigitalAxis,
    GamepadButton,
    GamepadAxis,
    GamepadAnalogButton,
}

impl InputType {
    /// The wire-format spelling of this kind.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            InputType::KeyButton => "KeyButton",
            InputType::MouseAxis => "MouseAxis",
            InputType::DigitalAxis => "DigitalAxis",
            InputType::GamepadButton => "GamepadButton",
            InputType::GamepadAxis => "GamepadAxis",
            InputType::GamepadAnalogButton => "GamepadAnalogButton",
        }
    }

    /// Fail-soft name lookup: unknown spellings map to `KeyButton`.
    #[must_use]
    pub fn from_name(name: &str) -> InputType {
        match name {
            "MouseAxis" => InputType::MouseAxis,
            "DigitalAxis" => InputType::DigitalAxis,
            "GamepadButton" => InputType::GamepadButton,
            "GamepadAxis" => InputType::GamepadAxis,
            "GamepadAnalogButton" => InputType::GamepadAnalogButton,
            _ => InputType::KeyButton,
        }
    }
}

impl Default for InputType {
    fn default() -> Self {
        InputType::KeyButton
    }
}

impl std::fmt::Display for InputType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-player runtime state, never serialized.
#[derive(Debug, Clone, Copy, Default)]
struct BindingState {
    value: f32,
    pressed: bool,
}

/// One input source mapping plus its read-out policy.
///
/// The record is flat: `kind` selects which source fields resolution reads,
/// and the unused ones are preserved untouched so a document round-trips
/// losslessly. Equality compares the model fields only, not runtime state.
#[derive(Debug, Clone)]
pub struct InputBinding {
    /// Which source this binding reads.
    pub kind: InputType,
    /// Key driving the positive direction (and the key for `KeyButton`).
    pub positive: KeyCode,
    /// Key driving the negative direction (`DigitalAxis` only).
    pub negative: KeyCode,
    /// Mouse axis index (0 = X, 1 = Y, 2 = scroll).
    pub mouse_axis: usize,
    /// Logical gamepad button (`GamepadButton` kind).
    pub gamepad_button: gamepad::GamepadButton,
    /// Logical gamepad axis (`GamepadAxis` / `GamepadAnalogButton` kinds).
    pub gamepad_axis: gamepad::GamepadAxis,
    /// Band around neutral treated as zero / threshold for button emulation.
    pub dead_zone: f32,
    /// Relaxation rate toward neutral, units/sec.
    pub gravity: f32,
    /// Ramp rate while held, units/sec.
    pub sensitivity: f32,
    /// Snap through neutral when the held direction flips.
    pub snap: bool,
    /// Negate the final float value.
    pub invert: bool,
    /// Button emulation triggers on the negative side of the axis.
    pub use_negative_axis_for_button: bool,
    /// Whether interactive rebinding may retarget this binding.
    pub rebindable: bool,
    /// Whether the sensitivity is user-editable.
    pub sensitivity_editable: bool,
    /// Whether the invert flag is user-editable.
    pub invert_editable: bool,
    /// Maintain a ramped float for button-like sources.
    pub update_as_axis: bool,
    /// Derive a boolean from axis-like sources.
    pub update_as_button: bool,

    pub(crate) states: Vec<BindingState>,
}

impl Default for InputBinding {
    fn default() -> Self {
        Self {
            kind: InputType::KeyButton,
            positive: KeyCode::None,
            negative: KeyCode::None,
            mouse_axis: 0,
            gamepad_button: gamepad::GamepadButton::None,
            gamepad_axis: gamepad::GamepadAxis::None,
            dead_zone: 0.0,
            gravity: 1.0,
            sensitivity: 1.0,
            snap: false,
            invert: false,
            use_negative_axis_for_button: false,
            rebindable: false,
            sensitivity_editable: false,
            invert_editable: false,
            update_as_axis: false,
            update_as_button: false,
            states: Vec::new(),
        }
    }
}

impl PartialEq for InputBinding {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.positive == other.positive
            && self.negative == other.negative
            && self.mouse_axis == other.mouse_axis
            && self.gamepad_button == other.gamepad_button
            && self.gamepad_axis == other.gamepad_axis
            && self.dead_zone == other.dead_zone
            && self.gravity == other.gravity
            && self.sensitivity == other.sensitivity
            && self.snap == other.snap
            && self.invert == other.invert
            && self.use_negative_axis_for_button == other.use_negative_axis_for_button
            && self.rebindable == other.rebindable
            && self.sensitivity_editable == other.sensitivity_editable
            && self.invert_editable == other.invert_editable
            && self.update_as_axis == other.update_as_axis
            && self.update_as_button == other.update_as_button
    }
}

impl InputBinding {
    /// Creates a binding with default policy (a `KeyButton` bound to nothing).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates per-player runtime state, discarding any previous state.
    pub fn initialize(&mut self, num_players: usize) {
        self.states = vec![BindingState::default(); num_players];
    }

    /// Copies the model fields of `other` into this binding, resetting
    /// runtime state. Used when restoring a binding to its default.
    pub fn copy_from(&mut self, other: &InputBinding) {
        let num_players = self.states.len();
        *self = other.clone();
        self.initialize(num_players);
    }

    /// Advances this binding's state for one player by one tick.
    pub fn update<S: RawInputSource>(
        &mut self,
        player: usize,
        delta_time: f32,
        source: &S,
        gamepad: &GamepadHandler,
    ) {
        if player >= self.states.len() {
            return;
        }

        let previous = self.states[player].value;
        let (value, pressed) = match self.kind {
            InputType::KeyButton => self.resolve_key_button(previous, delta_time, source),
            InputType::MouseAxis => self.resolve_mouse_axis(source),
            InputType::DigitalAxis => self.resolve_digital_axis(previous, delta_time, source),
            InputType::GamepadButton => {
                self.resolve_gamepad_button(previous, delta_time, player, gamepad)
            }
            InputType::GamepadAxis => self.resolve_gamepad_axis(player, source, gamepad),
            InputType::GamepadAnalogButton => {
                self.resolve_gamepad_analog_button(previous, delta_time, player, source, gamepad)
            }
        };

        self.states[player] = BindingState { value, pressed };
    }

    /// The resolved float value in [-1, 1], after `invert`.
    #[must_use]
    pub fn value(&self, player: usize) -> f32 {
        let value = self
            .states
            .get(player)
            .map(|s| s.value)
            .unwrap_or(AXIS_NEUTRAL);
        if self.invert {
            -value
        } else {
            value
        }
    }

    /// The resolved boolean state.
    #[must_use]
    pub fn pressed(&self, player: usize) -> bool {
        self.states.get(player).map(|s| s.pressed).unwrap_or(false)
    }

    /// Whether this binding is currently receiving any input.
    #[must_use]
    pub fn any_input(&self, player: usize) -> bool {
        self.pressed(player) || self.value(player) != AXIS_NEUTRAL
    }

    fn resolve_key_button<S: RawInputSource>(
        &self,
        previous: f32,
        delta_time: f32,
        source: &S,
    ) -> (f32, bool) {
        let held = source.key_held(self.positive);
        let value = if self.update_as_axis {
            self.ramp(previous, held, delta_time)
        } else {
            AXIS_NEUTRAL
        };
        (value, held)
    }

    fn resolve_mouse_axis<S: RawInputSource>(&self, source: &S) -> (f32, bool) {
        (source.mouse_axis(self.mouse_axis), false)
    }

    fn resolve_digital_axis<S: RawInputSource>(
        &self,
        previous: f32,
        delta_time: f32,
        source: &S,
    ) -> (f32, bool) {
        let positive_held = source.key_held(self.positive);
        let negative_held = source.key_held(self.negative);
        let value = advance_axis(
            previous,
            positive_held,
            negative_held,
            delta_time,
            self.sensitivity,
            self.gravity,
            self.snap,
        );
        let pressed = self.update_as_button && self.threshold_pressed(value);
        (value, pressed)
    }

    fn resolve_gamepad_button(
        &self,
        previous: f32,
        delta_time: f32,
        player: usize,
        gamepad: &GamepadHandler,
    ) -> (f32, bool) {
        let held = gamepad.get_button(self.gamepad_button, player);
        let value = if self.update_as_axis {
            self.ramp(previous, held, delta_time)
        } else {
            AXIS_NEUTRAL
        };
        (value, held)
    }

    fn resolve_gamepad_axis<S: RawInputSource>(
        &self,
        player: usize,
        source: &S,
        gamepad: &GamepadHandler,
    ) -> (f32, bool) {
        let raw = gamepad.get_axis(self.gamepad_axis, player, source);
        let value = if raw.abs() < self.dead_zone {
            AXIS_NEUTRAL
        } else {
            raw
        };
        let pressed = self.update_as_button && self.threshold_pressed(value);
        (value, pressed)
    }

    fn resolve_gamepad_analog_button<S: RawInputSource>(
        &self,
        previous: f32,
        delta_time: f32,
        player: usize,
        source: &S,
        gamepad: &GamepadHandler,
    ) -> (f32, bool) {
        let raw = gamepad.get_axis(self.gamepad_axis, player, source);
        let pressed = self.threshold_pressed(raw);
        let value = if self.update_as_axis {
            self.ramp(previous, pressed, delta_time)
        } else {
            AXIS_NEUTRAL
        };
        (value, pressed)
    }

    /// Button-as-axis emulation: toward +1 while held, toward 0 otherwise.
    fn ramp(&self, previous: f32, held: bool, delta_time: f32) -> f32 {
        advance_axis(
            previous,
            held,
            false,
            delta_time,
            self.sensitivity,
            self.gravity,
            self.snap,
        )
    }

    /// Sign-gated threshold crossing for button emulation.
    fn threshold_pressed(&self, value: f32) -> bool {
        if self.use_negative_axis_for_button {
            value < -self.dead_zone
        } else {
            value > self.dead_zone
        }
    }
}
