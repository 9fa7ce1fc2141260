//! Trait abstraction for the host's raw input devices to enable testing
//!
//! The host engine (or windowing layer) owns the actual keyboard, mouse and
//! joystick hardware. Everything in this crate reads devices exclusively
//! through [`RawInputSource`], a snapshot-style polling seam: the trait
//! reports *current* state only, and all edge detection (pressed this tick,
//! released this tick) is derived internally by comparing against the
//! previous tick's samples.

use crate::keycode::KeyCode;

/// Highest raw button index a joystick may report, exclusive.
pub const MAX_JOYSTICK_BUTTONS: usize = 20;

/// Highest raw axis index a joystick may report, exclusive.
pub const MAX_JOYSTICK_AXES: usize = 28;

/// Number of mouse axes (X delta, Y delta, scroll delta).
pub const MAX_MOUSE_AXES: usize = 3;

/// Snapshot view of the host's input devices.
///
/// Implementations must be cheap to query; every method may be called many
/// times per tick. Absent hardware reports neutral values (`false` / `0.0` /
/// `None`) rather than failing.
pub trait RawInputSource {
    /// Whether `key` is currently held down.
    fn key_held(&self, key: KeyCode) -> bool;

    /// This frame's delta for a mouse axis (0 = X, 1 = Y, 2 = scroll).
    /// Out-of-range indices report 0.
    fn mouse_axis(&self, axis: usize) -> f32;

    /// The reported device name for a joystick slot, or `None` when nothing
    /// is connected there.
    fn joystick_name(&self, slot: usize) -> Option<String>;

    /// Whether raw button `button` on joystick `slot` is currently held.
    fn joystick_button(&self, slot: usize, button: usize) -> bool;

    /// Current value of raw axis `axis` on joystick `slot`, in [-1, 1].
    fn joystick_axis(&self, slot: usize, axis: usize) -> f32;
}
