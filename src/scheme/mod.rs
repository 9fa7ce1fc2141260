//! # Scheme Module
//!
//! The binding/action/scheme data model and its per-tick resolution.
//!
//! This module handles:
//! - Bindings: one raw-input source plus a read-out policy
//! - Actions: named collections of bindings with first-non-neutral values
//!   and OR-aggregated button edges
//! - Control schemes: complete named input profiles owning their actions

pub mod action;
pub mod binding;
pub mod control_scheme;

pub use action::InputAction;
pub use binding::{InputBinding, InputType};
pub use control_scheme::ControlScheme;
