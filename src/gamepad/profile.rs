//! # Gamepad Profile Module
//!
//! Per-device mapping from logical buttons/axes to raw indices, loaded from
//! TOML asset files and validated before use.
//!
//! A profile is selected for a physical slot by matching the device's
//! reported name against the profile's alias list, gated by whether the
//! current platform appears in the profile's platform list.

use serde::{Deserialize, Serialize};
use serde::de::Error;
use std::fs;
use std::path::Path;

use super::{DPadType, GamepadAxis, GamepadButton};
use crate::error::Result;
use crate::source::{MAX_JOYSTICK_AXES, MAX_JOYSTICK_BUTTONS};

/// Platforms a profile can declare support for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Platform {
    Linux,
    MacOs,
    Windows,
    Ps4,
    XboxOne,
}

impl Platform {
    /// The platform this build is running on. Consoles are cross-compiled
    /// targets and never the host, so desktop platforms are the only
    /// candidates here; unknown hosts fall back to `Linux`.
    #[must_use]
    pub fn current() -> Platform {
        if cfg!(target_os = "macos") {
            Platform::MacOs
        } else if cfg!(target_os = "windows") {
            Platform::Windows
        } else {
            Platform::Linux
        }
    }
}

/// Raw button index for each logical button.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ButtonMap {
    #[serde(default)]
    pub left_stick: usize,
    #[serde(default)]
    pub right_stick: usize,
    #[serde(default)]
    pub left_bumper: usize,
    #[serde(default)]
    pub right_bumper: usize,
    #[serde(default)]
    pub dpad_up: usize,
    #[serde(default)]
    pub dpad_down: usize,
    #[serde(default)]
    pub dpad_left: usize,
    #[serde(default)]
    pub dpad_right: usize,
    #[serde(default)]
    pub back: usize,
    #[serde(default)]
    pub start: usize,
    #[serde(default)]
    pub action_bottom: usize,
    #[serde(default)]
    pub action_right: usize,
    #[serde(default)]
    pub action_left: usize,
    #[serde(default)]
    pub action_top: usize,
}

/// Raw axis index for each logical axis.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct AxisMap {
    #[serde(default)]
    pub left_stick_x: usize,
    #[serde(default)]
    pub left_stick_y: usize,
    #[serde(default)]
    pub right_stick_x: usize,
    #[serde(default)]
    pub right_stick_y: usize,
    #[serde(default)]
    pub dpad_x: usize,
    #[serde(default)]
    pub dpad_y: usize,
    #[serde(default)]
    pub left_trigger: usize,
    #[serde(default)]
    pub right_trigger: usize,
}

/// One gamepad model's complete mapping description.
///
/// Immutable at runtime; the handler holds a shared list and assigns entries
/// to physical slots as devices come and go.
///
/// # Examples
///
/// ```
/// use bindkit::gamepad::GamepadProfile;
///
/// let profile: GamepadProfile = toml::from_str(r#"
///     name = "Test Pad"
///     aliases = ["Test Pad (USB)"]
///     platforms = ["Linux", "Windows"]
///     dpad_type = "Axis"
///
///     [buttons]
///     action_bottom = 0
///
///     [axes]
///     left_stick_x = 0
///     dpad_x = 6
///     dpad_y = 7
/// "#).unwrap();
///
/// assert!(profile.matches("Test Pad (USB)"));
/// assert_eq!(profile.axes.dpad_x, 6);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GamepadProfile {
    /// Human-readable profile name (used in diagnostics only).
    pub name: String,

    /// Device names this profile applies to, matched exactly.
    pub aliases: Vec<String>,

    /// Platforms on which the mapping is valid.
    pub platforms: Vec<Platform>,

    /// How this device reports its D-pad.
    pub dpad_type: DPadType,

    #[serde(default)]
    pub buttons: ButtonMap,

    #[serde(default)]
    pub axes: AxisMap,
}

impl GamepadProfile {
    /// Load a profile from a TOML asset file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read, the TOML is malformed, or
    /// validation fails.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let profile: GamepadProfile = toml::from_str(&contents)?;
        profile.validate()?;
        Ok(profile)
    }

    /// Whether `device_name` is one of this profile's aliases.
    #[must_use]
    pub fn matches(&self, device_name: &str) -> bool {
        self.aliases.iter().any(|alias| alias == device_name)
    }

    /// Whether this profile supports `platform`.
    #[must_use]
    pub fn supports(&self, platform: Platform) -> bool {
        self.platforms.contains(&platform)
    }

    /// Raw button index for a logical button, or `None` for
    /// [`GamepadButton::None`].
    #[must_use]
    pub fn button_index(&self, button: GamepadButton) -> Option<usize> {
        match button {
            GamepadButton::LeftStick => Some(self.buttons.left_stick),
            GamepadButton::RightStick => Some(self.buttons.right_stick),
            GamepadButton::LeftBumper => Some(self.buttons.left_bumper),
            GamepadButton::RightBumper => Some(self.buttons.right_bumper),
            GamepadButton::DPadUp => Some(self.buttons.dpad_up),
            GamepadButton::DPadDown => Some(self.buttons.dpad_down),
            GamepadButton::DPadLeft => Some(self.buttons.dpad_left),
            GamepadButton::DPadRight => Some(self.buttons.dpad_right),
            GamepadButton::Back => Some(self.buttons.back),
            GamepadButton::Start => Some(self.buttons.start),
            GamepadButton::ActionBottom => Some(self.buttons.action_bottom),
            GamepadButton::ActionRight => Some(self.buttons.action_right),
            GamepadButton::ActionLeft => Some(self.buttons.action_left),
            GamepadButton::ActionTop => Some(self.buttons.action_top),
            GamepadButton::None => None,
        }
    }

    /// Raw axis index for a logical axis, or `None` for [`GamepadAxis::None`].
    /// D-pad axes resolve here too; the handler decides whether to read them
    /// raw or from the synthesized state.
    #[must_use]
    pub fn axis_index(&self, axis: GamepadAxis) -> Option<usize> {
        match axis {
            GamepadAxis::LeftThumbstickX => Some(self.axes.left_stick_x),
            GamepadAxis::LeftThumbstickY => Some(self.axes.left_stick_y),
            GamepadAxis::RightThumbstickX => Some(self.axes.right_stick_x),
            GamepadAxis::RightThumbstickY => Some(self.axes.right_stick_y),
            GamepadAxis::DPadX => Some(self.axes.dpad_x),
            GamepadAxis::DPadY => Some(self.axes.dpad_y),
            GamepadAxis::LeftTrigger => Some(self.axes.left_trigger),
            GamepadAxis::RightTrigger => Some(self.axes.right_trigger),
            GamepadAxis::None => None,
        }
    }

    /// Validate index ranges and matching metadata
    ///
    /// # Errors
    ///
    /// Returns error if the alias or platform list is empty or any raw index
    /// is out of range.
    pub fn validate(&self) -> Result<()> {
        if self.aliases.is_empty() {
            return Err(crate::error::BindkitError::Config(
                toml::de::Error::custom(format!("profile '{}' has no aliases", self.name))
            ));
        }

        if self.platforms.is_empty() {
            return Err(crate::error::BindkitError::Config(
                toml::de::Error::custom(format!("profile '{}' has no platforms", self.name))
            ));
        }

        let buttons = [
            self.buttons.left_stick,
            self.buttons.right_stick,
            self.buttons.left_bumper,
            self.buttons.right_bumper,
            self.buttons.dpad_up,
            self.buttons.dpad_down,
            self.buttons.dpad_left,
            self.buttons.dpad_right,
            self.buttons.back,
            self.buttons.start,
            self.buttons.action_bottom,
            self.buttons.action_right,
            self.buttons.action_left,
            self.buttons.action_top,
        ];
        if buttons.iter().any(|&b| b >= MAX_JOYSTICK_BUTTONS) {
            return Err(crate::error::BindkitError::Config(
                toml::de::Error::custom(format!(
                    "profile '{}' has a button index out of range (max {})",
                    self.name,
                    MAX_JOYSTICK_BUTTONS - 1
                ))
            ));
        }

        let axes = [
            self.axes.left_stick_x,
            self.axes.left_stick_y,
            self.axes.right_stick_x,
            self.axes.right_stick_y,
            self.axes.dpad_x,
            self.axes.dpad_y,
            self.axes.left_trigger,
            self.axes.right_trigger,
        ];
        if axes.iter().any(|&a| a >= MAX_JOYSTICK_AXES) {
            return Err(crate::error::BindkitError::Config(
                toml::de::Error::custom(format!(
                    "profile '{}' has an axis index out of range (max {})",
                    self.name,
                    MAX_JOYSTICK_AXES - 1
                ))
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
pub mod fixtures {
    use super::*;

    /// Fully-populated profile for handler and scheme tests.
    pub fn test_profile(dpad_type: DPadType) -> GamepadProfile {
        GamepadProfile {
            name: "Test Pad".to_string(),
            aliases: vec!["Test Pad (USB)".to_string()],
            platforms: vec![Platform::current()],
            dpad_type,
            buttons: ButtonMap {
                left_stick: 9,
                right_stick: 10,
                left_bumper: 4,
                right_bumper: 5,
                dpad_up: 13,
                dpad_down: 14,
                dpad_left: 11,
                dpad_right: 12,
                back: 6,
                start: 7,
                action_bottom: 0,
                action_right: 1,
                action_left: 2,
                action_top: 3,
            },
            axes: AxisMap {
                left_stick_x: 0,
                left_stick_y: 1,
                right_stick_x: 3,
                right_stick_y: 4,
                dpad_x: 6,
                dpad_y: 7,
                left_trigger: 2,
                right_trigger: 5,
            },
        }
    }
}
