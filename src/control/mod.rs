// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Motion Control
//!
//! Everything between "go to this pose" and the step pulses.
//!
//! ## Modules
//!
//! - [`pulse`] - Step counting shared with the timer's compare interrupt.
//! - [`homing`] - Limit-switch homing with per-joint debounce.
//! - [`motion`] - Absolute joint moves with rounding-error carry and obstruction hold.
//! - [`spline`] - Cubic Hermite path planning through joint-space waypoints.

pub mod homing;
pub mod motion;
pub mod pulse;
pub mod spline;

pub use homing::{HomingError, HomingState, SeekState, SwitchDebounce};
pub use motion::{MotionError, MotionState, MoveOutcome, StepMove};
pub use pulse::{PulseError, PulseEvent, PulseGenerator};
pub use spline::{PlanError, PlanReport, Samples, SplinePlanner, Tangent};
