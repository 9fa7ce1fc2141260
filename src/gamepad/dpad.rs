//! # D-Pad State Module
//!
//! Per-slot derived D-pad state: a synthesized two-axis value (for devices
//! whose D-pad is four buttons) and four edge-tracked button states (for
//! devices whose D-pad is a pair of axes).

/// Four-phase button state used by the D-pad edge tracker.
///
/// A press moves `Released -> JustPressed -> Pressed`; a release moves
/// `Pressed -> JustReleased -> Released`. The `Just*` phases last exactly one
/// tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonState {
    Released,
    JustPressed,
    Pressed,
    JustReleased,
}

impl ButtonState {
    /// Advances the tracker one tick given the current physical state.
    #[must_use]
    pub fn advance(self, is_pressed: bool) -> ButtonState {
        match self {
            ButtonState::Pressed | ButtonState::JustPressed => {
                if is_pressed {
                    ButtonState::Pressed
                } else {
                    ButtonState::JustReleased
                }
            }
            ButtonState::Released | ButtonState::JustReleased => {
                if is_pressed {
                    ButtonState::JustPressed
                } else {
                    ButtonState::Released
                }
            }
        }
    }
}

/// Derived D-pad state for one gamepad slot.
///
/// Allocated once per slot at startup and mutated every tick; which half is
/// meaningful depends on the assigned profile's D-pad type.
#[derive(Debug, Clone, Copy)]
pub struct DPadState {
    /// Synthesized (x, y) axis values in [-1, 1] (Button-type profiles).
    pub axes: (f32, f32),
    pub up: ButtonState,
    pub down: ButtonState,
    pub left: ButtonState,
    pub right: ButtonState,
}

impl Default for DPadState {
    fn default() -> Self {
        Self {
            axes: (0.0, 0.0),
            up: ButtonState::Released,
            down: ButtonState::Released,
            left: ButtonState::Released,
            right: ButtonState::Released,
        }
    }
}

impl DPadState {
    /// Advances all four direction trackers from thresholded axis reads
    /// (Axis-type profiles).
    pub fn update_button_states(&mut self, up: bool, down: bool, left: bool, right: bool) {
        self.up = self.up.advance(up);
        self.down = self.down.advance(down);
        self.left = self.left.advance(left);
        self.right = self.right.advance(right);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_sequence() {
        let mut state = ButtonState::Released;
        state = state.advance(true);
        assert_eq!(state, ButtonState::JustPressed);
        state = state.advance(true);
        assert_eq!(state, ButtonState::Pressed);
        state = state.advance(true);
        assert_eq!(state, ButtonState::Pressed);
    }

    #[test]
    fn test_release_sequence() {
        let mut state = ButtonState::Pressed;
        state = state.advance(false);
        assert_eq!(state, ButtonState::JustReleased);
        state = state.advance(false);
        assert_eq!(state, ButtonState::Released);
    }

    #[test]
    fn test_tap_within_two_ticks() {
        // Press then release immediately: each edge phase still shows up.
        let mut state = ButtonState::Released;
        state = state.advance(true);
        assert_eq!(state, ButtonState::JustPressed);
        state = state.advance(false);
        assert_eq!(state, ButtonState::JustReleased);
        state = state.advance(false);
        assert_eq!(state, ButtonState::Released);
    }

    #[test]
    fn test_re_press_during_just_released() {
        let state = ButtonState::JustReleased.advance(true);
        assert_eq!(state, ButtonState::JustPressed);
    }

    #[test]
    fn test_dpad_state_default() {
        let state = DPadState::default();
        assert_eq!(state.axes, (0.0, 0.0));
        assert_eq!(state.up, ButtonState::Released);
        assert_eq!(state.right, ButtonState::Released);
    }

    #[test]
    fn test_dpad_update_button_states() {
        let mut state = DPadState::default();
        state.update_button_states(false, false, false, true);
        assert_eq!(state.right, ButtonState::JustPressed);
        assert_eq!(state.left, ButtonState::Released);

        state.update_button_states(false, false, false, true);
        assert_eq!(state.right, ButtonState::Pressed);

        state.update_button_states(false, false, false, false);
        assert_eq!(state.right, ButtonState::JustReleased);

        state.update_button_states(false, false, false, false);
        assert_eq!(state.right, ButtonState::Released);
    }
}
