//! # Bindkit Demo
//!
//! Drives the input manager's tick loop with a synthetic raw-input source.
//!
//! This binary wires the library together the way a host engine would: load
//! the runtime config, the gamepad profiles and the default control schemes,
//! then tick the manager at a fixed rate and query actions by name. Input
//! comes from a scripted source (periodic key pulses and a slow mouse sweep)
//! so the pipeline can be observed without hardware.

use anyhow::Result;
use tokio::time::{interval, Duration};
use tracing::{info, warn};
use tracing_subscriber;

use bindkit::config::Config;
use bindkit::gamepad::GamepadProfile;
use bindkit::keycode::KeyCode;
use bindkit::manager::InputManager;
use bindkit::source::RawInputSource;

/// Tick rate of the demo loop in Hz
const TICK_RATE_HZ: u32 = 60;

/// Number of ticks between status log messages
const LOG_INTERVAL_TICKS: u64 = 60;

/// Default control schemes shipped with the demo
const DEFAULT_INPUTS_XML: &str = include_str!("../config/default_inputs.xml");

/// Synthetic input: holds D for two seconds out of four, taps Space once a
/// second, and sweeps the mouse X axis sinusoidally.
struct DemoSource {
    elapsed: f32,
}

impl DemoSource {
    fn new() -> Self {
        Self { elapsed: 0.0 }
    }

    fn advance(&mut self, delta_time: f32) {
        self.elapsed += delta_time;
    }
}

impl RawInputSource for DemoSource {
    fn key_held(&self, key: KeyCode) -> bool {
        match key {
            KeyCode::D => self.elapsed % 4.0 < 2.0,
            KeyCode::Space => self.elapsed % 1.0 < 0.1,
            _ => false,
        }
    }

    fn mouse_axis(&self, axis: usize) -> f32 {
        if axis == 0 {
            (self.elapsed * std::f32::consts::TAU / 5.0).sin() * 0.25
        } else {
            0.0
        }
    }

    fn joystick_name(&self, _slot: usize) -> Option<String> {
        None
    }

    fn joystick_button(&self, _slot: usize, _button: usize) -> bool {
        false
    }

    fn joystick_axis(&self, _slot: usize, _axis: usize) -> f32 {
        0.0
    }
}

fn load_profiles(dir: &str) -> Vec<GamepadProfile> {
    let mut profiles = Vec::new();
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            warn!("No gamepad profile directory at {}: {}", dir, err);
            return profiles;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.extension().map(|ext| ext == "toml").unwrap_or(false) {
            match GamepadProfile::load(&path) {
                Ok(profile) => {
                    info!("Loaded gamepad profile: {}", profile.name);
                    profiles.push(profile);
                }
                Err(err) => warn!("Skipping profile {}: {}", path.display(), err),
            }
        }
    }
    profiles
}

/// Main entry point for the Bindkit demo
///
/// Loads configuration, gamepad profiles and the default control schemes,
/// then runs the tick loop at 60Hz until Ctrl+C, logging the live value of
/// the demo actions once a second.
#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into())
        )
        .init();

    info!("Bindkit demo v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = match Config::load("config/default.toml") {
        Ok(config) => config,
        Err(err) => {
            warn!("Couldn't load config/default.toml ({}), using defaults", err);
            Config::default()
        }
    };

    let profiles = load_profiles("config/profiles");
    let mut manager = InputManager::new(config, profiles);

    let default_inputs = std::fs::read_to_string("config/default_inputs.xml")
        .unwrap_or_else(|_| DEFAULT_INPUTS_XML.to_string());
    manager.load_from_str(&default_inputs)?;

    let horizontal = manager.action_id("Horizontal");
    let jump = manager.action_id("Jump");
    let look_x = manager.action_id("Look X");

    let mut source = DemoSource::new();
    let delta_time = 1.0 / TICK_RATE_HZ as f32;
    let mut tick_interval = interval(Duration::from_millis(1000 / TICK_RATE_HZ as u64));

    info!("Starting input tick loop at {}Hz", TICK_RATE_HZ);
    info!("Press Ctrl+C to exit");

    let mut tick_count: u64 = 0;

    // Main tick loop
    loop {
        tokio::select! {
            _ = tick_interval.tick() => {
                source.advance(delta_time);
                manager.tick(delta_time, &source);
                tick_count += 1;

                if tick_count % LOG_INTERVAL_TICKS == 0 {
                    let horizontal_value = horizontal
                        .map(|id| manager.get_axis(0, id))
                        .unwrap_or(0.0);
                    let jump_held = jump
                        .map(|id| manager.get_button(0, id))
                        .unwrap_or(false);
                    let look_value = look_x
                        .map(|id| manager.get_axis(0, id))
                        .unwrap_or(0.0);
                    info!(
                        "Horizontal: {:+.2}  Jump: {}  Look X: {:+.2}  ({})",
                        horizontal_value,
                        jump_held,
                        look_value,
                        manager.gamepad().gamepad_name(0)
                    );
                }
            }

            // Handle Ctrl+C for graceful shutdown
            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down...");
                info!("Total ticks: {}", tick_count);
                break;
            }
        }
    }

    Ok(())
}
