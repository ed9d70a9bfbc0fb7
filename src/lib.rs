// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # SCARA Plotter Firmware
//!
//! Motion-control core for a two-joint SCARA pen plotter, written in Rust, targeting an
//! STM32F767 MCU. Two stepper joints are driven by timer-generated step pulses, homed against limit
//! switches, and moved along smooth cubic Hermite paths between joint-space waypoints. A servo lifts
//! and lowers the pen, and an ultrasonic ranger pauses motion while something is in the way.
//!
//! ## Crate Structure
//!
//! | Module | Purpose |
//! | ------ | -------- |
//! | [`hw`] | Hardware seams (step timer, clock) and STM32F7 bindings behind the `board` feature |
//! | [`drivers`] | Device-level drivers (DRV8825 pair, limit switches, pen servo, HC-SR04) |
//! | [`control`] | Pulse generator, homing, joint motion, spline planning |
//! | [`kinematics`] | Cartesian to joint-space conversion for the arm geometry |
//! | [`config`] | Tuned constants and runtime configuration |
//!
//! Everything except the `board` bindings builds on the host, so the control logic is tested
//! against simulated hardware with `cargo test`.

#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

pub mod config;
pub mod control;
pub mod drivers;
pub mod hw;
pub mod kinematics;
pub mod plotter;
pub mod waypoint;

pub use config::PlotterConfig;
pub use control::{
    HomingError, HomingState, MotionError, MoveOutcome, PlanError, PlanReport, PulseGenerator,
    SplinePlanner,
};
pub use plotter::Plotter;
pub use waypoint::{PenState, Waypoint};
