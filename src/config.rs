// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Tuned constants and the runtime configuration built from them.
//!
//! The constants are the values the plotter was calibrated with. [`PlotterConfig::default`] packs
//! them into a struct so a caller can override individual fields (tests shorten the deadlines).

use crate::hw::{Axis, Level};

/// Full steps per revolution of both joint motors.
pub const MOTOR_STEPS_PER_REV: f32 = 200.0;
/// DRV8825 microstep setting.
pub const MICROSTEPS: f32 = 32.0;

pub const STEPS_PER_DEG_1: f32 = MOTOR_STEPS_PER_REV * MICROSTEPS / 360.0;
pub const STEPS_PER_DEG_2: f32 = MOTOR_STEPS_PER_REV * MICROSTEPS / 360.0;

/// Mechanical angle of joint 2 when the logical angle is zero.
pub const JOINT2_ZERO_DEG: f32 = 0.0;

pub const HOMING_FREQ_HZ: u32 = 4_000;
pub const DRAW_FREQ_HZ: u32 = 2_000;

pub const HOMING_TIMEOUT_MS: u32 = 3_000;
pub const DRAW_TIMEOUT_MS: u32 = 3_000;

pub const SWITCH_DEBOUNCE_MS: u32 = 5;
pub const SWITCH_STABLE_COUNT: u8 = 3;
/// Poll period while waiting for the limit switches to be released before homing.
pub const SWITCH_RELEASE_POLL_MS: u32 = 10;
/// Poll period for the limit switches while the joints are driving home.
pub const SWITCH_SEEK_POLL_MS: u32 = 1;
/// Time for the servo to lift the pen before homing moves the arm.
pub const PEN_SETTLE_MS: u32 = 150;

pub const PEN_UP_US: u16 = 2_000;
pub const PEN_DOWN_US: u16 = 1_000;
pub const SERVO_MIN_US: u16 = 1_000;
pub const SERVO_MAX_US: u16 = 2_000;
/// 50 Hz servo frame.
pub const SERVO_PERIOD_US: u16 = 20_000;

/// Step timer tick rate after prescaling.
pub const STEP_TIMER_CLOCK_HZ: u32 = 1_000_000;

pub const MAX_PLAN_POINTS: usize = 5_000;
pub const SPLINE_MAX_SUBDIV: u32 = 48;
pub const SPLINE_RES_DEG: f32 = 0.05;
pub const SPLINE_TENSION: f32 = 0.75;

/// Anything closer than this to the ultrasonic ranger holds motion.
pub const OBSTRUCTION_THRESHOLD_MM: f32 = 35.0;
/// Deadline for each HC-SR04 echo edge.
pub const ECHO_TIMEOUT_US: u32 = 100_000;

/// Calibration of one joint.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct JointConfig {
    pub steps_per_deg: f32,
    /// Mechanical angle corresponding to logical zero.
    pub zero_offset_deg: f32,
    /// Direction line level that moves the joint toward positive logical angles.
    pub positive_dir: Level,
    /// Direction line level that drives the joint toward its limit switch.
    pub home_dir: Level,
}

impl JointConfig {
    /// Direction line level for a move of `steps` (zero counts as positive).
    pub fn dir_for(&self, steps: i32) -> Level {
        if steps >= 0 {
            self.positive_dir
        } else {
            self.positive_dir.inverted()
        }
    }
}

/// Spline planner tuning.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SplineConfig {
    pub tension: f32,
    /// Largest single-joint change between consecutive samples, in degrees.
    pub resolution_deg: f32,
    pub max_subdivisions: u32,
}

impl SplineConfig {
    /// Tangent weight factor derived from the tension.
    #[inline]
    pub fn tangent_factor(&self) -> f32 {
        0.5 * (1.0 - self.tension)
    }
}

impl Default for SplineConfig {
    fn default() -> Self {
        Self {
            tension: SPLINE_TENSION,
            resolution_deg: SPLINE_RES_DEG,
            max_subdivisions: SPLINE_MAX_SUBDIV,
        }
    }
}

/// Runtime configuration for the whole plotter.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PlotterConfig {
    pub joint1: JointConfig,
    pub joint2: JointConfig,
    pub homing_freq_hz: u32,
    pub draw_freq_hz: u32,
    pub homing_timeout_ms: u32,
    pub draw_timeout_ms: u32,
    pub switch_debounce_ms: u32,
    pub switch_stable_count: u8,
    pub switch_release_poll_ms: u32,
    pub switch_seek_poll_ms: u32,
    pub pen_settle_ms: u32,
    pub pen_up_us: u16,
    pub pen_down_us: u16,
    pub spline: SplineConfig,
}

impl PlotterConfig {
    #[inline]
    pub fn joint(&self, axis: Axis) -> &JointConfig {
        match axis {
            Axis::One => &self.joint1,
            Axis::Two => &self.joint2,
        }
    }

    /// Builder-style override of the draw deadline.
    pub fn with_draw_timeout_ms(mut self, ms: u32) -> Self {
        self.draw_timeout_ms = ms;
        self
    }

    /// Builder-style override of the homing deadline.
    pub fn with_homing_timeout_ms(mut self, ms: u32) -> Self {
        self.homing_timeout_ms = ms;
        self
    }
}

impl Default for PlotterConfig {
    fn default() -> Self {
        Self {
            joint1: JointConfig {
                steps_per_deg: STEPS_PER_DEG_1,
                zero_offset_deg: 0.0,
                positive_dir: Level::High,
                home_dir: Level::High,
            },
            // Joint 2 is driven through a linkage that reverses its sense of rotation.
            joint2: JointConfig {
                steps_per_deg: STEPS_PER_DEG_2,
                zero_offset_deg: JOINT2_ZERO_DEG,
                positive_dir: Level::Low,
                home_dir: Level::High,
            },
            homing_freq_hz: HOMING_FREQ_HZ,
            draw_freq_hz: DRAW_FREQ_HZ,
            homing_timeout_ms: HOMING_TIMEOUT_MS,
            draw_timeout_ms: DRAW_TIMEOUT_MS,
            switch_debounce_ms: SWITCH_DEBOUNCE_MS,
            switch_stable_count: SWITCH_STABLE_COUNT,
            switch_release_poll_ms: SWITCH_RELEASE_POLL_MS,
            switch_seek_poll_ms: SWITCH_SEEK_POLL_MS,
            pen_settle_ms: PEN_SETTLE_MS,
            pen_up_us: PEN_UP_US,
            pen_down_us: PEN_DOWN_US,
            spline: SplineConfig::default(),
        }
    }
}
