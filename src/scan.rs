//! # Scan Module
//!
//! Transient state machine that captures the next raw input event for
//! interactive rebinding.
//!
//! `Idle -> Scanning -> Idle`. While scanning, every tick sweeps the raw
//! devices for candidate events matching the requested flags (key releases,
//! logical joystick button presses, logical joystick axes crossing the
//! deflection threshold) and offers each to the caller-supplied predicate.
//! The first accepted candidate ends the scan and is handed back to the
//! driving caller; a timeout or the cancel key ends the scan without one.
//! Only one scan may be active at a time.

use tracing::warn;

use crate::gamepad::{GamepadAxis, GamepadButton, GamepadHandler};
use crate::keycode::KeyCode;
use crate::source::RawInputSource;

/// Axis deflection at which a joystick axis becomes a scan candidate.
const SCAN_AXIS_THRESHOLD: f32 = 0.9;

/// Bitmask of raw event categories a scan listens for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScanFlags(u8);

impl ScanFlags {
    /// Listens for nothing.
    pub const NONE: ScanFlags = ScanFlags(0);
    /// Key release events.
    pub const KEY: ScanFlags = ScanFlags(1);
    /// Logical joystick button presses.
    pub const JOYSTICK_BUTTON: ScanFlags = ScanFlags(1 << 1);
    /// Logical joystick axes crossing the deflection threshold.
    pub const JOYSTICK_AXIS: ScanFlags = ScanFlags(1 << 2);

    /// Whether every flag in `other` is set in `self`.
    #[must_use]
    pub fn contains(self, other: ScanFlags) -> bool {
        self.0 & other.0 == other.0
    }

    /// Whether no flag is set.
    #[must_use]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl std::ops::BitOr for ScanFlags {
    type Output = ScanFlags;

    fn bitor(self, rhs: ScanFlags) -> ScanFlags {
        ScanFlags(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for ScanFlags {
    fn bitor_assign(&mut self, rhs: ScanFlags) {
        self.0 |= rhs.0;
    }
}

/// One candidate raw input event offered to the scan predicate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScanResult {
    /// The single category this candidate belongs to.
    pub flags: ScanFlags,
    /// The released key (`KEY` candidates).
    pub key: KeyCode,
    /// The slot the joystick event came from.
    pub joystick: usize,
    /// The pressed logical button (`JOYSTICK_BUTTON` candidates).
    pub gamepad_button: GamepadButton,
    /// The deflected logical axis (`JOYSTICK_AXIS` candidates).
    pub gamepad_axis: GamepadAxis,
    /// The deflected axis value, sign included.
    pub axis_value: f32,
}

impl Default for ScanResult {
    fn default() -> Self {
        Self {
            flags: ScanFlags::NONE,
            key: KeyCode::None,
            joystick: 0,
            gamepad_button: GamepadButton::None,
            gamepad_axis: GamepadAxis::None,
            axis_value: 0.0,
        }
    }
}

/// Predicate deciding whether a candidate completes the scan.
pub type ScanHandler = Box<dyn FnMut(&ScanResult) -> bool>;

/// Callback invoked whenever a scan ends, successfully or not.
pub type ScanCompleted = Box<dyn FnOnce()>;

/// The interactive scan state machine.
#[derive(Default)]
pub struct ScanService {
    scanning: bool,
    flags: ScanFlags,
    start_time: f32,
    on_candidate: Option<ScanHandler>,
    on_complete: Option<ScanCompleted>,
    held_keys: Vec<KeyCode>,
}

impl ScanService {
    /// Creates an idle scan service.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a scan is currently active.
    #[must_use]
    pub fn is_scanning(&self) -> bool {
        self.scanning
    }

    /// Begins a scan at time `now`. Returns `false` (and changes nothing)
    /// when a scan is already active.
    ///
    /// A `None` predicate accepts the first candidate unconditionally.
    pub fn start(
        &mut self,
        now: f32,
        flags: ScanFlags,
        on_candidate: Option<ScanHandler>,
        on_complete: Option<ScanCompleted>,
    ) -> bool {
        if self.scanning {
            warn!("An input scan is already in progress");
            return false;
        }

        self.scanning = true;
        self.flags = flags;
        self.start_time = now;
        self.on_candidate = on_candidate;
        self.on_complete = on_complete;
        self.held_keys.clear();
        true
    }

    /// Ends the scan without a candidate, firing the completion callback.
    /// No-op while idle.
    pub fn stop(&mut self) {
        if !self.scanning {
            return;
        }
        self.scanning = false;
        self.on_candidate = None;
        self.held_keys.clear();
        if let Some(on_complete) = self.on_complete.take() {
            on_complete();
        }
    }

    /// Drives the scan by one tick.
    ///
    /// Returns the accepted candidate when the scan completes successfully
    /// this tick; timeout and cancel paths return `None` (the completion
    /// callback still fires).
    pub fn update<S: RawInputSource>(
        &mut self,
        now: f32,
        cancel_key: KeyCode,
        timeout: f32,
        num_joysticks: usize,
        source: &S,
        gamepad: &GamepadHandler,
    ) -> Option<ScanResult> {
        if !self.scanning {
            return None;
        }

        if now - self.start_time >= timeout {
            self.stop();
            return None;
        }

        let cancel_pressed =
            source.key_held(cancel_key) && !self.held_keys.contains(&cancel_key);
        if cancel_pressed {
            self.stop();
            return None;
        }

        let accepted = self.scan_candidates(num_joysticks, source, gamepad);
        self.refresh_held_keys(source);

        if let Some(result) = accepted {
            self.scanning = false;
            self.on_candidate = None;
            self.held_keys.clear();
            if let Some(on_complete) = self.on_complete.take() {
                on_complete();
            }
            return Some(result);
        }
        None
    }

    fn scan_candidates<S: RawInputSource>(
        &mut self,
        num_joysticks: usize,
        source: &S,
        gamepad: &GamepadHandler,
    ) -> Option<ScanResult> {
        let mut candidates = Vec::new();

        if self.flags.contains(ScanFlags::KEY) {
            for &key in &self.held_keys {
                if !source.key_held(key) {
                    candidates.push(ScanResult {
                        flags: ScanFlags::KEY,
                        key,
                        ..ScanResult::default()
                    });
                }
            }
        }

        if self.flags.contains(ScanFlags::JOYSTICK_BUTTON) {
            for slot in 0..num_joysticks {
                for &button in GamepadButton::ALL {
                    if gamepad.get_button_down(button, slot) {
                        candidates.push(ScanResult {
                            flags: ScanFlags::JOYSTICK_BUTTON,
                            joystick: slot,
                            gamepad_button: button,
                            ..ScanResult::default()
                        });
                    }
                }
            }
        }

        if self.flags.contains(ScanFlags::JOYSTICK_AXIS) {
            for slot in 0..num_joysticks {
                for &axis in GamepadAxis::ALL {
                    let value = gamepad.get_axis(axis, slot, source);
                    if value.abs() >= SCAN_AXIS_THRESHOLD {
                        candidates.push(ScanResult {
                            flags: ScanFlags::JOYSTICK_AXIS,
                            joystick: slot,
                            gamepad_axis: axis,
                            axis_value: value,
                            ..ScanResult::default()
                        });
                    }
                }
            }
        }

        let mut handler = self.on_candidate.take();
        let mut accepted = None;
        for candidate in candidates {
            let accept = match handler.as_mut() {
                Some(handler) => handler(&candidate),
                None => true,
            };
            if accept {
                accepted = Some(candidate);
                break;
            }
        }
        self.on_candidate = handler;
        accepted
    }

    fn refresh_held_keys<S: RawInputSource>(&mut self, source: &S) {
        self.held_keys.clear();
        for &key in KeyCode::ALL {
            if key != KeyCode::None && source.key_held(key) {
                self.held_keys.push(key);
            }
        }
    }
}
