//! # Configuration Module
//!
//! Handles loading and validating runtime configuration from TOML files.

use serde::de::Error;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::keycode::KeyCode;

/// How trigger mid-range calibration is enabled.
///
/// Some drivers report trigger axes over [-1, 1] resting at 0 instead of
/// [0, 1] resting at -1; the handler can detect that and remap. `Auto`
/// enables the workaround only on macOS, where the behavior was observed.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TriggerCalibrationMode {
    Auto,
    On,
    Off,
}

impl TriggerCalibrationMode {
    /// Resolves the mode to a concrete on/off for this build's platform.
    #[must_use]
    pub fn enabled(self) -> bool {
        match self {
            TriggerCalibrationMode::Auto => cfg!(target_os = "macos"),
            TriggerCalibrationMode::On => true,
            TriggerCalibrationMode::Off => false,
        }
    }
}

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub manager: ManagerConfig,

    #[serde(default)]
    pub dpad: DpadConfig,

    #[serde(default)]
    pub scan: ScanConfig,

    #[serde(default)]
    pub triggers: TriggerConfig,
}

/// Player and device polling configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ManagerConfig {
    #[serde(default = "default_num_players")]
    pub num_players: usize,

    #[serde(default = "default_joystick_check_interval_s")]
    pub joystick_check_interval_s: f32,
}

/// Virtual D-pad axis synthesis configuration
#[derive(Debug, Deserialize, Clone)]
pub struct DpadConfig {
    #[serde(default = "default_dpad_gravity")]
    pub gravity: f32,

    #[serde(default = "default_dpad_sensitivity")]
    pub sensitivity: f32,

    #[serde(default = "default_dpad_snap")]
    pub snap: bool,
}

/// Interactive rebind scanning configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ScanConfig {
    #[serde(default = "default_scan_timeout_s")]
    pub timeout_s: f32,

    #[serde(default = "default_cancel_key")]
    pub cancel_key: String,
}

/// Trigger axis handling configuration
#[derive(Debug, Deserialize, Clone)]
pub struct TriggerConfig {
    #[serde(default = "default_midrange_calibration")]
    pub midrange_calibration: TriggerCalibrationMode,
}

// Default value functions
fn default_num_players() -> usize { 2 }
fn default_joystick_check_interval_s() -> f32 { 1.0 }

fn default_dpad_gravity() -> f32 { 3.0 }
fn default_dpad_sensitivity() -> f32 { 3.0 }
fn default_dpad_snap() -> bool { true }

fn default_scan_timeout_s() -> f32 { 5.0 }
fn default_cancel_key() -> String { "Escape".to_string() }

fn default_midrange_calibration() -> TriggerCalibrationMode { TriggerCalibrationMode::Auto }

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            num_players: default_num_players(),
            joystick_check_interval_s: default_joystick_check_interval_s(),
        }
    }
}

impl Default for DpadConfig {
    fn default() -> Self {
        Self {
            gravity: default_dpad_gravity(),
            sensitivity: default_dpad_sensitivity(),
            snap: default_dpad_snap(),
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            timeout_s: default_scan_timeout_s(),
            cancel_key: default_cancel_key(),
        }
    }
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            midrange_calibration: default_midrange_calibration(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            manager: ManagerConfig::default(),
            dpad: DpadConfig::default(),
            scan: ScanConfig::default(),
            triggers: TriggerConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use bindkit::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// The configured cancel key, resolved to a [`KeyCode`].
    ///
    /// Validation guarantees the name parses, so this never falls back at
    /// runtime for a validated config.
    #[must_use]
    pub fn cancel_key(&self) -> KeyCode {
        KeyCode::from_name(&self.scan.cancel_key)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    pub fn validate(&self) -> Result<()> {
        if self.manager.num_players == 0 || self.manager.num_players > 11 {
            return Err(crate::error::BindkitError::Config(
                toml::de::Error::custom("num_players must be between 1 and 11")
            ));
        }

        if self.manager.joystick_check_interval_s <= 0.0
            || self.manager.joystick_check_interval_s > 60.0 {
            return Err(crate::error::BindkitError::Config(
                toml::de::Error::custom("joystick_check_interval_s must be between 0 and 60")
            ));
        }

        if self.dpad.gravity <= 0.0 || self.dpad.gravity > 100.0 {
            return Err(crate::error::BindkitError::Config(
                toml::de::Error::custom("dpad gravity must be between 0 and 100")
            ));
        }

        if self.dpad.sensitivity <= 0.0 || self.dpad.sensitivity > 100.0 {
            return Err(crate::error::BindkitError::Config(
                toml::de::Error::custom("dpad sensitivity must be between 0 and 100")
            ));
        }

        if self.scan.timeout_s <= 0.0 || self.scan.timeout_s > 300.0 {
            return Err(crate::error::BindkitError::Config(
                toml::de::Error::custom("scan timeout_s must be between 0 and 300")
            ));
        }

        if KeyCode::parse(&self.scan.cancel_key).is_none() {
            return Err(crate::error::BindkitError::Config(
                toml::de::Error::custom(format!(
                    "scan cancel_key '{}' is not a known key name",
                    self.scan.cancel_key
                ))
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.manager.num_players, 2);
        assert_eq!(config.dpad.gravity, 3.0);
        assert_eq!(config.dpad.sensitivity, 3.0);
        assert!(config.dpad.snap);
        assert_eq!(config.scan.timeout_s, 5.0);
        assert_eq!(config.cancel_key(), KeyCode::Escape);
    }

    #[test]
    fn test_num_players_zero() {
        let mut config = Config::default();
        config.manager.num_players = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_num_players_too_high() {
        let mut config = Config::default();
        config.manager.num_players = 12;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_joystick_interval_zero() {
        let mut config = Config::default();
        config.manager.joystick_check_interval_s = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_joystick_interval_too_high() {
        let mut config = Config::default();
        config.manager.joystick_check_interval_s = 61.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_dpad_gravity_zero() {
        let mut config = Config::default();
        config.dpad.gravity = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_dpad_sensitivity_negative() {
        let mut config = Config::default();
        config.dpad.sensitivity = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_scan_timeout_zero() {
        let mut config = Config::default();
        config.scan.timeout_s = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_cancel_key() {
        let mut config = Config::default();
        config.scan.cancel_key = "NotAKey".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_trigger_calibration_modes() {
        assert!(TriggerCalibrationMode::On.enabled());
        assert!(!TriggerCalibrationMode::Off.enabled());
        assert_eq!(
            TriggerCalibrationMode::Auto.enabled(),
            cfg!(target_os = "macos")
        );
    }

    #[test]
    fn test_load_config_from_file() {
        use std::io::Write;
        use tempfile::NamedTempFile;

        let toml_content = r#"
[manager]
num_players = 4

[dpad]
gravity = 2.5

[scan]
cancel_key = "Backspace"

[triggers]
midrange_calibration = "off"
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = Config::load(temp_file.path()).unwrap();
        assert_eq!(config.manager.num_players, 4);
        assert_eq!(config.dpad.gravity, 2.5);
        assert_eq!(config.cancel_key(), KeyCode::Backspace);
        assert_eq!(
            config.triggers.midrange_calibration,
            TriggerCalibrationMode::Off
        );
        // Unspecified fields fall back to defaults
        assert_eq!(config.dpad.sensitivity, 3.0);
        assert_eq!(config.scan.timeout_s, 5.0);
    }

    #[test]
    fn test_load_empty_file_uses_defaults() {
        use std::io::Write;
        use tempfile::NamedTempFile;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"").unwrap();
        temp_file.flush().unwrap();

        let config = Config::load(temp_file.path()).unwrap();
        assert_eq!(config.manager.num_players, 2);
    }
}
