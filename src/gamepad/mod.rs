//! # Gamepad Module
//!
//! Gamepad resolution: per-device profiles, slot assignment, and the virtual
//! D-pad synthesis that papers over the two ways hardware exposes a D-pad.
//!
//! This module handles:
//! - Matching connected device names against profile aliases per platform
//! - Logical button/axis lookup through a slot's assigned profile
//! - Synthesizing D-pad axes from buttons (and button edges from axes)
//! - Trigger mid-range calibration for drivers that rest triggers at 0

pub mod dpad;
pub mod handler;
pub mod profile;

pub use dpad::{ButtonState, DPadState};
pub use handler::GamepadHandler;
pub use profile::{GamepadProfile, Platform};

use serde::{Deserialize, Serialize};

/// Logical gamepad axes, resolved to raw indices through a profile.
///
/// The spellings of these names are part of the persistence wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GamepadAxis {
    LeftThumbstickX,
    LeftThumbstickY,
    RightThumbstickX,
    RightThumbstickY,
    DPadX,
    DPadY,
    LeftTrigger,
    RightTrigger,
    None,
}

impl GamepadAxis {
    /// Every real axis (excludes `None`), used for scan sweeps.
    pub const ALL: &'static [GamepadAxis] = &[
        GamepadAxis::LeftThumbstickX,
        GamepadAxis::LeftThumbstickY,
        GamepadAxis::RightThumbstickX,
        GamepadAxis::RightThumbstickY,
        GamepadAxis::DPadX,
        GamepadAxis::DPadY,
        GamepadAxis::LeftTrigger,
        GamepadAxis::RightTrigger,
    ];

    /// The wire-format spelling of this axis.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            GamepadAxis::LeftThumbstickX => "LeftThumbstickX",
            GamepadAxis::LeftThumbstickY => "LeftThumbstickY",
            GamepadAxis::RightThumbstickX => "RightThumbstickX",
            GamepadAxis::RightThumbstickY => "RightThumbstickY",
            GamepadAxis::DPadX => "DPadX",
            GamepadAxis::DPadY => "DPadY",
            GamepadAxis::LeftTrigger => "LeftTrigger",
            GamepadAxis::RightTrigger => "RightTrigger",
            GamepadAxis::None => "None",
        }
    }

    /// Fail-soft name lookup: unknown spellings map to `None`.
    #[must_use]
    pub fn from_name(name: &str) -> GamepadAxis {
        match name {
            "LeftThumbstickX" => GamepadAxis::LeftThumbstickX,
            "LeftThumbstickY" => GamepadAxis::LeftThumbstickY,
            "RightThumbstickX" => GamepadAxis::RightThumbstickX,
            "RightThumbstickY" => GamepadAxis::RightThumbstickY,
            "DPadX" => GamepadAxis::DPadX,
            "DPadY" => GamepadAxis::DPadY,
            "LeftTrigger" => GamepadAxis::LeftTrigger,
            "RightTrigger" => GamepadAxis::RightTrigger,
            _ => GamepadAxis::None,
        }
    }
}

impl Default for GamepadAxis {
    fn default() -> Self {
        GamepadAxis::None
    }
}

impl std::fmt::Display for GamepadAxis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Logical gamepad buttons, resolved to raw indices through a profile.
///
/// The spellings of these names are part of the persistence wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GamepadButton {
    LeftStick,
    RightStick,
    LeftBumper,
    RightBumper,
    DPadUp,
    DPadDown,
    DPadLeft,
    DPadRight,
    Back,
    Start,
    ActionBottom,
    ActionRight,
    ActionLeft,
    ActionTop,
    None,
}

impl GamepadButton {
    /// Every real button (excludes `None`), used for scan sweeps.
    pub const ALL: &'static [GamepadButton] = &[
        GamepadButton::LeftStick,
        GamepadButton::RightStick,
        GamepadButton::LeftBumper,
        GamepadButton::RightBumper,
        GamepadButton::DPadUp,
        GamepadButton::DPadDown,
        GamepadButton::DPadLeft,
        GamepadButton::DPadRight,
        GamepadButton::Back,
        GamepadButton::Start,
        GamepadButton::ActionBottom,
        GamepadButton::ActionRight,
        GamepadButton::ActionLeft,
        GamepadButton::ActionTop,
    ];

    /// The wire-format spelling of this button.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            GamepadButton::LeftStick => "LeftStick",
            GamepadButton::RightStick => "RightStick",
            GamepadButton::LeftBumper => "LeftBumper",
            GamepadButton::RightBumper => "RightBumper",
            GamepadButton::DPadUp => "DPadUp",
            GamepadButton::DPadDown => "DPadDown",
            GamepadButton::DPadLeft => "DPadLeft",
            GamepadButton::DPadRight => "DPadRight",
            GamepadButton::Back => "Back",
            GamepadButton::Start => "Start",
            GamepadButton::ActionBottom => "ActionBottom",
            GamepadButton::ActionRight => "ActionRight",
            GamepadButton::ActionLeft => "ActionLeft",
            GamepadButton::ActionTop => "ActionTop",
            GamepadButton::None => "None",
        }
    }

    /// Fail-soft name lookup: unknown spellings map to `None`.
    #[must_use]
    pub fn from_name(name: &str) -> GamepadButton {
        match name {
            "LeftStick" => GamepadButton::LeftStick,
            "RightStick" => GamepadButton::RightStick,
            "LeftBumper" => GamepadButton::LeftBumper,
            "RightBumper" => GamepadButton::RightBumper,
            "DPadUp" => GamepadButton::DPadUp,
            "DPadDown" => GamepadButton::DPadDown,
            "DPadLeft" => GamepadButton::DPadLeft,
            "DPadRight" => GamepadButton::DPadRight,
            "Back" => GamepadButton::Back,
            "Start" => GamepadButton::Start,
            "ActionBottom" => GamepadButton::ActionBottom,
            "ActionRight" => GamepadButton::ActionRight,
            "ActionLeft" => GamepadButton::ActionLeft,
            "ActionTop" => GamepadButton::ActionTop,
            _ => GamepadButton::None,
        }
    }
}

impl Default for GamepadButton {
    fn default() -> Self {
        GamepadButton::None
    }
}

impl std::fmt::Display for GamepadButton {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a device reports its D-pad: as a pair of axes or as four buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DPadType {
    Axis,
    Button,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_name_round_trip() {
        for &axis in GamepadAxis::ALL {
            assert_eq!(GamepadAxis::from_name(axis.as_str()), axis);
        }
        assert_eq!(GamepadAxis::from_name("None"), GamepadAxis::None);
    }

    #[test]
    fn test_button_name_round_trip() {
        for &button in GamepadButton::ALL {
            assert_eq!(GamepadButton::from_name(button.as_str()), button);
        }
        assert_eq!(GamepadButton::from_name("None"), GamepadButton::None);
    }

    #[test]
    fn test_unknown_names_fail_soft() {
        assert_eq!(GamepadAxis::from_name("Throttle"), GamepadAxis::None);
        assert_eq!(GamepadButton::from_name("Select"), GamepadButton::None);
    }

    #[test]
    fn test_all_excludes_none() {
        assert!(!GamepadAxis::ALL.contains(&GamepadAxis::None));
        assert!(!GamepadButton::ALL.contains(&GamepadButton::None));
        assert_eq!(GamepadAxis::ALL.len(), 8);
        assert_eq!(GamepadButton::ALL.len(), 14);
    }
}
