// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Device-Specific Drivers
//!
//! This module contains device-specific drivers that sit above the raw `hw/` layer and below the
//! control logic. All of them are written against `embedded-hal` traits.
//!
//! ## Existing drivers
//!
//! - [`drv8825`] – TI DRV8825 step/dir stepper driver pair with shared enable
//! - [`limit_switch`] – Joint home switch
//! - [`servo`] – Pen-lift hobby servo on a 50 Hz PWM channel
//! - [`hcsr04`] – HC-SR04 ultrasonic ranger used for obstruction detection

pub mod drv8825;
pub mod hcsr04;
pub mod limit_switch;
pub mod servo;

pub use drv8825::Drv8825Pair;
pub use hcsr04::{EchoTimer, Hcsr04, ObstructionSensor};
pub use limit_switch::LimitSwitch;
pub use servo::PenServo;
