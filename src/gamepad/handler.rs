//! # Gamepad Handler Module
//!
//! Resolves logical gamepad queries against physical slots.
//!
//! ## Responsibilities
//!
//! - Re-enumerate connected devices on a cooperative timer (not every tick)
//!   and assign a matching [`GamepadProfile`] to each slot
//! - Sample raw button state once per tick so button edges can be derived
//! - Synthesize D-pad axes from buttons (Button-type profiles) and D-pad
//!   button edges from axes (Axis-type profiles)
//! - Remap trigger axes on drivers that report them over [-1, 1] resting at 0
//!
//! Every query on an unassigned slot resolves to neutral (`0.0` / `false`);
//! missing hardware is never an error.

use tracing::{error, info};

use super::dpad::{ButtonState, DPadState};
use super::profile::{GamepadProfile, Platform};
use super::{DPadType, GamepadAxis, GamepadButton};
use crate::config::Config;
use crate::scheme::binding::advance_axis;
use crate::source::{RawInputSource, MAX_JOYSTICK_BUTTONS};

/// Axis magnitude at which a D-pad axis counts as a pressed direction.
const DPAD_THRESHOLD: f32 = 0.9;

/// Band around 0 a trigger must leave (negative side) before it counts as
/// observed mid-range.
const TRIGGER_EPSILON: f32 = 0.0001;

/// Per-slot raw button samples for edge derivation.
#[derive(Clone, Copy)]
struct ButtonSamples {
    current: [bool; MAX_JOYSTICK_BUTTONS],
    previous: [bool; MAX_JOYSTICK_BUTTONS],
}

impl Default for ButtonSamples {
    fn default() -> Self {
        Self {
            current: [false; MAX_JOYSTICK_BUTTONS],
            previous: [false; MAX_JOYSTICK_BUTTONS],
        }
    }
}

/// Per-gamepad profile lookup and raw-state resolution engine.
pub struct GamepadHandler {
    profiles: Vec<GamepadProfile>,
    platform: Platform,

    assignments: Vec<Option<usize>>,
    names: Vec<String>,
    dpad: Vec<DPadState>,
    buttons: Vec<ButtonSamples>,
    /// Per slot: [left trigger, right trigger] seen mid-range.
    trigger_midrange: Vec<[bool; 2]>,

    check_interval: f32,
    check_timer: f32,

    dpad_gravity: f32,
    dpad_sensitivity: f32,
    dpad_snap: bool,
    calibrate_triggers: bool,

    max_joysticks: usize,
}

impl GamepadHandler {
    /// Creates a handler for `max_joysticks` slots using the given profiles.
    #[must_use]
    pub fn new(profiles: Vec<GamepadProfile>, max_joysticks: usize, config: &Config) -> Self {
        Self {
            profiles,
            platform: Platform::current(),
            assignments: vec![None; max_joysticks],
            names: vec!["Not Connected".to_string(); max_joysticks],
            dpad: vec![DPadState::default(); max_joysticks],
            buttons: vec![ButtonSamples::default(); max_joysticks],
            trigger_midrange: vec![[false; 2]; max_joysticks],
            check_interval: config.manager.joystick_check_interval_s,
            check_timer: 0.0,
            dpad_gravity: config.dpad.gravity,
            dpad_sensitivity: config.dpad.sensitivity,
            dpad_snap: config.dpad.snap,
            calibrate_triggers: config.triggers.midrange_calibration.enabled(),
            max_joysticks,
        }
    }

    /// Number of gamepad slots this handler tracks.
    #[must_use]
    pub fn num_slots(&self) -> usize {
        self.max_joysticks
    }

    /// Diagnostic name for a slot: `"Not Connected"`, the device name, or
    /// `"<name> [No Profile]"`.
    #[must_use]
    pub fn gamepad_name(&self, slot: usize) -> &str {
        self.names.get(slot).map(String::as_str).unwrap_or("Not Connected")
    }

    /// The profile currently assigned to a slot, if any.
    #[must_use]
    pub fn profile(&self, slot: usize) -> Option<&GamepadProfile> {
        self.assignments
            .get(slot)
            .copied()
            .flatten()
            .map(|idx| &self.profiles[idx])
    }

    /// Whether a slot has a connected device with an assigned profile.
    #[must_use]
    pub fn available(&self, slot: usize) -> bool {
        self.profile(slot).is_some()
    }

    /// Advances the handler by one tick: runs the periodic device check when
    /// due, samples raw buttons, updates trigger calibration flags, then
    /// synthesizes D-pad state.
    pub fn on_update<S: RawInputSource>(&mut self, delta_time: f32, source: &S) {
        if self.check_timer <= 0.0 {
            self.refresh_assignments(source);
            self.check_timer = self.check_interval;
        }
        self.check_timer -= delta_time;

        self.sample_buttons(source);

        if self.calibrate_triggers {
            self.update_trigger_flags(source);
        }

        for slot in 0..self.max_joysticks {
            let Some(profile) = self.profile(slot) else {
                continue;
            };
            let dpad_type = profile.dpad_type;
            let buttons = profile.buttons;
            let axes = profile.axes;

            match dpad_type {
                DPadType::Button => {
                    // mimic axis values
                    let samples = self.buttons[slot];
                    let x = advance_axis(
                        self.dpad[slot].axes.0,
                        samples.current[buttons.dpad_right],
                        samples.current[buttons.dpad_left],
                        delta_time,
                        self.dpad_sensitivity,
                        self.dpad_gravity,
                        self.dpad_snap,
                    );
                    let y = advance_axis(
                        self.dpad[slot].axes.1,
                        samples.current[buttons.dpad_up],
                        samples.current[buttons.dpad_down],
                        delta_time,
                        self.dpad_sensitivity,
                        self.dpad_gravity,
                        self.dpad_snap,
                    );
                    self.dpad[slot].axes = (x, y);
                }
                DPadType::Axis => {
                    // mimic button values
                    let x = source.joystick_axis(slot, axes.dpad_x);
                    let y = source.joystick_axis(slot, axes.dpad_y);
                    self.dpad[slot].update_button_states(
                        y >= DPAD_THRESHOLD,
                        y <= -DPAD_THRESHOLD,
                        x <= -DPAD_THRESHOLD,
                        x >= DPAD_THRESHOLD,
                    );
                }
            }
        }
    }

    /// Resolves a logical axis for a slot. Unassigned slots report 0.
    #[must_use]
    pub fn get_axis<S: RawInputSource>(&self, axis: GamepadAxis, slot: usize, source: &S) -> f32 {
        let Some(profile) = self.profile(slot) else {
            return 0.0;
        };

        match axis {
            GamepadAxis::DPadX if profile.dpad_type == DPadType::Button => self.dpad[slot].axes.0,
            GamepadAxis::DPadY if profile.dpad_type == DPadType::Button => self.dpad[slot].axes.1,
            GamepadAxis::LeftTrigger => {
                self.trigger_axis(slot, 0, source.joystick_axis(slot, profile.axes.left_trigger))
            }
            GamepadAxis::RightTrigger => {
                self.trigger_axis(slot, 1, source.joystick_axis(slot, profile.axes.right_trigger))
            }
            GamepadAxis::None => 0.0,
            _ => match profile.axis_index(axis) {
                Some(index) => source.joystick_axis(slot, index),
                None => 0.0,
            },
        }
    }

    /// Dead-zone-discretised axis read: -1, 0 or +1.
    #[must_use]
    pub fn get_axis_raw<S: RawInputSource>(
        &self,
        axis: GamepadAxis,
        slot: usize,
        dead_zone: f32,
        source: &S,
    ) -> f32 {
        let value = self.get_axis(axis, slot, source);
        if value.abs() <= dead_zone || value == 0.0 {
            0.0
        } else {
            value.signum()
        }
    }

    /// Whether a logical button is held.
    #[must_use]
    pub fn get_button(&self, button: GamepadButton, slot: usize) -> bool {
        self.button_query(button, slot, |s, b| s.current[b], ButtonState::Pressed)
    }

    /// Whether a logical button was pressed this tick.
    #[must_use]
    pub fn get_button_down(&self, button: GamepadButton, slot: usize) -> bool {
        self.button_query(
            button,
            slot,
            |s, b| s.current[b] && !s.previous[b],
            ButtonState::JustPressed,
        )
    }

    /// Whether a logical button was released this tick.
    #[must_use]
    pub fn get_button_up(&self, button: GamepadButton, slot: usize) -> bool {
        self.button_query(
            button,
            slot,
            |s, b| !s.current[b] && s.previous[b],
            ButtonState::JustReleased,
        )
    }

    fn button_query(
        &self,
        button: GamepadButton,
        slot: usize,
        raw: impl Fn(&ButtonSamples, usize) -> bool,
        dpad_state_check: ButtonState,
    ) -> bool {
        let Some(profile) = self.profile(slot) else {
            return false;
        };

        let dpad_direction = match button {
            GamepadButton::DPadUp => Some(self.dpad[slot].up),
            GamepadButton::DPadDown => Some(self.dpad[slot].down),
            GamepadButton::DPadLeft => Some(self.dpad[slot].left),
            GamepadButton::DPadRight => Some(self.dpad[slot].right),
            _ => None,
        };

        match dpad_direction {
            // D-pad on an Axis-type profile answers from the edge tracker
            Some(state) if profile.dpad_type == DPadType::Axis => state == dpad_state_check,
            _ => match profile.button_index(button) {
                Some(index) => raw(&self.buttons[slot], index),
                None => false,
            },
        }
    }

    fn refresh_assignments<S: RawInputSource>(&mut self, source: &S) {
        for slot in 0..self.max_joysticks {
            let name = source.joystick_name(slot).filter(|n| !n.is_empty());

            match name {
                Some(name) => {
                    if self.assignments[slot].is_none() {
                        let matched = self
                            .profiles
                            .iter()
                            .position(|p| p.matches(&name) && p.supports(self.platform));

                        match matched {
                            Some(idx) => {
                                info!(
                                    "Assigned profile {} for joystick: {}",
                                    self.profiles[idx].name, name
                                );
                                self.assignments[slot] = Some(idx);
                                self.names[slot] = name;
                            }
                            None => {
                                error!("Can't find profile for joystick: {}", name);
                                self.names[slot] = format!("{} [No Profile]", name);
                            }
                        }
                    } else {
                        self.names[slot] = name;
                    }
                }
                None => {
                    self.assignments[slot] = None;
                    self.names[slot] = "Not Connected".to_string();
                }
            }
        }
    }

    fn sample_buttons<S: RawInputSource>(&mut self, source: &S) {
        for slot in 0..self.max_joysticks {
            let samples = &mut self.buttons[slot];
            samples.previous = samples.current;

            if self.assignments[slot].is_some() {
                for button in 0..MAX_JOYSTICK_BUTTONS {
                    samples.current[button] = source.joystick_button(slot, button);
                }
            } else {
                samples.current = [false; MAX_JOYSTICK_BUTTONS];
            }
        }
    }

    fn update_trigger_flags<S: RawInputSource>(&mut self, source: &S) {
        for slot in 0..self.max_joysticks {
            let Some(profile) = self.profile(slot) else {
                continue;
            };
            let indices = [profile.axes.left_trigger, profile.axes.right_trigger];

            for (trigger, &axis_index) in indices.iter().enumerate() {
                if self.trigger_midrange[slot][trigger] {
                    continue;
                }
                let raw = source.joystick_axis(slot, axis_index);
                if raw > -DPAD_THRESHOLD && raw < -TRIGGER_EPSILON {
                    self.trigger_midrange[slot][trigger] = true;
                }
            }
        }
    }

    /// Trigger read-out. Without calibration the raw value passes through;
    /// with it, the axis reports 0 until observed mid-range and [-1, 1]
    /// remaps to [0, 1] afterwards.
    fn trigger_axis(&self, slot: usize, trigger: usize, raw: f32) -> f32 {
        if !self.calibrate_triggers {
            return raw;
        }
        if self.trigger_midrange[slot][trigger] {
            (raw + 1.0) * 0.5
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TriggerCalibrationMode;
    use crate::gamepad::profile::fixtures::test_profile;
    use crate::source::doubles::ScriptedSource;

    fn handler_with(dpad_type: DPadType) -> GamepadHandler {
        GamepadHandler::new(vec![test_profile(dpad_type)], 2, &Config::default())
    }

    fn connected_source() -> ScriptedSource {
        let mut source = ScriptedSource::new(2);
        source.connect(0, "Test Pad (USB)");
        source
    }

    // ==================== Assignment Tests ====================

    #[test]
    fn test_assignment_on_first_tick() {
        let source = connected_source();
        let mut handler = handler_with(DPadType::Axis);

        assert!(!handler.available(0));
        handler.on_update(0.02, &source);
        assert!(handler.available(0));
        assert!(!handler.available(1));
        assert_eq!(handler.gamepad_name(0), "Test Pad (USB)");
        assert_eq!(handler.gamepad_name(1), "Not Connected");
    }

    #[test]
    fn test_assignment_refresh_respects_interval() {
        let mut source = ScriptedSource::new(2);
        let mut handler = handler_with(DPadType::Axis);

        handler.on_update(0.02, &source); // first check: nothing connected
        source.connect(0, "Test Pad (USB)");

        handler.on_update(0.02, &source); // interval not elapsed yet
        assert!(!handler.available(0));

        handler.on_update(1.1, &source); // push the timer past the interval
        handler.on_update(0.02, &source);
        assert!(handler.available(0));
    }

    #[test]
    fn test_unknown_device_gets_no_profile_marker() {
        let mut source = ScriptedSource::new(2);
        source.connect(0, "Mystery Pad");
        let mut handler = handler_with(DPadType::Axis);

        handler.on_update(0.02, &source);
        assert!(!handler.available(0));
        assert_eq!(handler.gamepad_name(0), "Mystery Pad [No Profile]");
    }

    #[test]
    fn test_disconnect_clears_assignment() {
        let mut source = connected_source();
        let mut handler = handler_with(DPadType::Axis);

        handler.on_update(0.02, &source);
        assert!(handler.available(0));

        source.disconnect(0);
        handler.on_update(1.1, &source);
        handler.on_update(0.02, &source);
        assert!(!handler.available(0));
        assert_eq!(handler.gamepad_name(0), "Not Connected");
    }

    // ==================== Unassigned Slot Tests ====================

    #[test]
    fn test_unassigned_slot_neutral_queries() {
        let source = ScriptedSource::new(2);
        let mut handler = handler_with(DPadType::Axis);
        handler.on_update(0.02, &source);

        for &axis in GamepadAxis::ALL {
            assert_eq!(handler.get_axis(axis, 0, &source), 0.0);
        }
        for &button in GamepadButton::ALL {
            assert!(!handler.get_button(button, 0));
            assert!(!handler.get_button_down(button, 0));
            assert!(!handler.get_button_up(button, 0));
        }
    }

    #[test]
    fn test_out_of_range_slot_neutral_queries() {
        let source = ScriptedSource::new(2);
        let handler = handler_with(DPadType::Axis);
        assert_eq!(
            handler.get_axis(GamepadAxis::LeftThumbstickX, 9, &source),
            0.0
        );
        assert!(!handler.get_button(GamepadButton::Start, 9));
    }

    // ==================== Axis / Button Resolution Tests ====================

    #[test]
    fn test_thumbstick_axis_resolution() {
        let mut source = connected_source();
        let mut handler = handler_with(DPadType::Axis);
        handler.on_update(0.02, &source);

        source.set_axis(0, 3, -0.75); // right_stick_x raw index in the fixture
        assert_eq!(
            handler.get_axis(GamepadAxis::RightThumbstickX, 0, &source),
            -0.75
        );
    }

    #[test]
    fn test_button_resolution_and_edges() {
        let mut source = connected_source();
        let mut handler = handler_with(DPadType::Axis);
        handler.on_update(0.02, &source);

        source.set_button(0, 7, true); // start raw index in the fixture
        handler.on_update(0.02, &source);
        assert!(handler.get_button(GamepadButton::Start, 0));
        assert!(handler.get_button_down(GamepadButton::Start, 0));

        handler.on_update(0.02, &source);
        assert!(handler.get_button(GamepadButton::Start, 0));
        assert!(!handler.get_button_down(GamepadButton::Start, 0));

        source.set_button(0, 7, false);
        handler.on_update(0.02, &source);
        assert!(!handler.get_button(GamepadButton::Start, 0));
        assert!(handler.get_button_up(GamepadButton::Start, 0));
    }

    #[test]
    fn test_get_axis_raw_discretises() {
        let mut source = connected_source();
        let mut handler = handler_with(DPadType::Axis);
        handler.on_update(0.02, &source);

        source.set_axis(0, 0, 0.05);
        assert_eq!(
            handler.get_axis_raw(GamepadAxis::LeftThumbstickX, 0, 0.1, &source),
            0.0
        );

        source.set_axis(0, 0, 0.7);
        assert_eq!(
            handler.get_axis_raw(GamepadAxis::LeftThumbstickX, 0, 0.1, &source),
            1.0
        );

        source.set_axis(0, 0, -0.7);
        assert_eq!(
            handler.get_axis_raw(GamepadAxis::LeftThumbstickX, 0, 0.1, &source),
            -1.0
        );
    }

    // ==================== D-Pad Synthesis Tests ====================

    #[test]
    fn test_dpad_axis_from_buttons() {
        // Button-type profile: holding right ramps DPadX toward +1 at the
        // configured sensitivity (3.0), each tick adding sensitivity * dt.
        let mut source = connected_source();
        let mut handler = handler_with(DPadType::Button);
        handler.on_update(0.02, &source);

        source.set_button(0, 12, true); // dpad_right raw index
        let dt = 1.0 / 30.0;
        let mut expected = 0.0;
        for _ in 0..10 {
            handler.on_update(dt, &source);
            expected = (expected + 3.0 * dt).min(1.0);
            let actual = handler.get_axis(GamepadAxis::DPadX, 0, &source);
            assert!((actual - expected).abs() < 1e-5);
        }

        // 1/3 second of further input saturates the axis
        for _ in 0..10 {
            handler.on_update(dt, &source);
        }
        assert_eq!(handler.get_axis(GamepadAxis::DPadX, 0, &source), 1.0);

        // Releasing relaxes back at gravity
        source.set_button(0, 12, false);
        handler.on_update(dt, &source);
        let value = handler.get_axis(GamepadAxis::DPadX, 0, &source);
        assert!(value < 1.0 && value > 0.0);
    }

    #[test]
    fn test_dpad_buttons_from_axis() {
        // Axis-type profile: 0.95 on the D-pad X axis drives the 4-state
        // tracker through JustPressed -> Pressed, then JustReleased on drop.
        let mut source = connected_source();
        let mut handler = handler_with(DPadType::Axis);
        handler.on_update(0.02, &source);

        source.set_axis(0, 6, 0.95); // dpad_x raw index
        handler.on_update(0.02, &source);
        assert!(handler.get_button_down(GamepadButton::DPadRight, 0));
        assert!(!handler.get_button(GamepadButton::DPadRight, 0));

        handler.on_update(0.02, &source);
        assert!(handler.get_button(GamepadButton::DPadRight, 0));
        assert!(!handler.get_button_down(GamepadButton::DPadRight, 0));

        source.set_axis(0, 6, 0.2); // below the 0.9 threshold
        handler.on_update(0.02, &source);
        assert!(handler.get_button_up(GamepadButton::DPadRight, 0));
        assert!(!handler.get_button(GamepadButton::DPadRight, 0));
    }

    #[test]
    fn test_dpad_axis_type_reads_raw_axis() {
        let mut source = connected_source();
        let mut handler = handler_with(DPadType::Axis);
        handler.on_update(0.02, &source);

        source.set_axis(0, 6, 0.4);
        assert_eq!(handler.get_axis(GamepadAxis::DPadX, 0, &source), 0.4);
    }

    // ==================== Trigger Calibration Tests ====================

    fn calibrating_handler() -> GamepadHandler {
        let mut config = Config::default();
        config.triggers.midrange_calibration = TriggerCalibrationMode::On;
        GamepadHandler::new(vec![test_profile(DPadType::Axis)], 2, &config)
    }

    #[test]
    fn test_trigger_reports_zero_until_midrange_seen() {
        let mut source = connected_source();
        source.set_axis(0, 2, -1.0); // left_trigger resting at -1
        let mut handler = calibrating_handler();
        handler.on_update(0.02, &source);

        assert_eq!(handler.get_axis(GamepadAxis::LeftTrigger, 0, &source), 0.0);
    }

    #[test]
    fn test_trigger_remaps_after_midrange_seen() {
        let mut source = connected_source();
        let mut handler = calibrating_handler();
        handler.on_update(0.02, &source);

        // Trigger observed mid-range: squeezed to raw -0.5
        source.set_axis(0, 2, -0.5);
        handler.on_update(0.02, &source);
        assert!(
            (handler.get_axis(GamepadAxis::LeftTrigger, 0, &source) - 0.25).abs() < 1e-6
        );

        // Fully pressed: raw 1.0 -> 1.0
        source.set_axis(0, 2, 1.0);
        handler.on_update(0.02, &source);
        assert_eq!(handler.get_axis(GamepadAxis::LeftTrigger, 0, &source), 1.0);

        // Released: raw -1.0 -> 0.0
        source.set_axis(0, 2, -1.0);
        handler.on_update(0.02, &source);
        assert_eq!(handler.get_axis(GamepadAxis::LeftTrigger, 0, &source), 0.0);
    }

    #[test]
    fn test_trigger_passthrough_without_calibration() {
        let mut config = Config::default();
        config.triggers.midrange_calibration = TriggerCalibrationMode::Off;
        let mut handler =
            GamepadHandler::new(vec![test_profile(DPadType::Axis)], 2, &config);

        let mut source = connected_source();
        source.set_axis(0, 2, 0.6);
        handler.on_update(0.02, &source);
        assert_eq!(handler.get_axis(GamepadAxis::LeftTrigger, 0, &source), 0.6);
    }

    #[test]
    fn test_trigger_flags_tracked_per_trigger() {
        let mut source = connected_source();
        let mut handler = calibrating_handler();
        handler.on_update(0.02, &source);

        // Only the left trigger is seen mid-range
        source.set_axis(0, 2, -0.5);
        source.set_axis(0, 5, -1.0); // right_trigger resting
        handler.on_update(0.02, &source);

        assert!(handler.get_axis(GamepadAxis::LeftTrigger, 0, &source) > 0.0);
        assert_eq!(handler.get_axis(GamepadAxis::RightTrigger, 0, &source), 0.0);
    }
}
