// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Moving both joints to an absolute pose.
//!
//! Angles are converted to whole steps relative to the previous commanded pose. The fractional
//! part lost to rounding is carried into the next move, so the commanded and the true position
//! never drift apart by more than half a step no matter how many moves are made.

use embedded_hal::{
    digital::v2::{InputPin, OutputPin},
    PwmPin,
};
#[allow(unused_imports)]
use micromath::F32Ext;

use crate::config::JointConfig;
use crate::control::PulseError;
use crate::drivers::ObstructionSensor;
use crate::hw::{elapsed_ms, Axis, Clock, StepTimer};
use crate::plotter::Plotter;
use crate::waypoint::PenState;

/// Signed step counts for one move.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct StepMove {
    pub steps1: i32,
    pub steps2: i32,
}

impl StepMove {
    #[inline]
    pub fn steps(&self, axis: Axis) -> i32 {
        match axis {
            Axis::One => self.steps1,
            Axis::Two => self.steps2,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.steps1 == 0 && self.steps2 == 0
    }
}

/// How a move ended.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MoveOutcome {
    /// Both joints rounded to zero steps; the timer was never started.
    Idle,
    Completed,
    /// The draw deadline passed. The pose was resynchronized to the steps actually delivered.
    TimedOut { undelivered: [u32; 2] },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotionError {
    /// A joint was still delivering a previous move.
    Busy(Axis),
}

impl From<PulseError> for MotionError {
    fn from(e: PulseError) -> Self {
        match e {
            PulseError::Busy(axis) => MotionError::Busy(axis),
        }
    }
}

/// Logical pose of the arm and the rounding error carried per joint.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct MotionState {
    prev_theta1: f32,
    prev_theta2: f32,
    err1: f32,
    err2: f32,
}

impl MotionState {
    pub const fn new() -> Self {
        Self {
            prev_theta1: 0.0,
            prev_theta2: 0.0,
            err1: 0.0,
            err2: 0.0,
        }
    }

    /// Back to the homed reference: zero pose, nothing carried.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Last commanded logical angle of `axis`, in degrees.
    #[inline]
    pub fn prev_theta(&self, axis: Axis) -> f32 {
        match axis {
            Axis::One => self.prev_theta1,
            Axis::Two => self.prev_theta2,
        }
    }

    /// Rounding error carried into the next move of `axis`, in degrees.
    #[inline]
    pub fn carried_error(&self, axis: Axis) -> f32 {
        match axis {
            Axis::One => self.err1,
            Axis::Two => self.err2,
        }
    }

    /// Step counts that take the arm from the previous pose to the target, updating the carried
    /// error. The previous pose is left alone until [`commit`](Self::commit).
    pub fn plan_move(
        &mut self,
        theta1: f32,
        theta2: f32,
        joint1: &JointConfig,
        joint2: &JointConfig,
    ) -> StepMove {
        StepMove {
            steps1: joint_steps(self.prev_theta1, theta1, &mut self.err1, joint1),
            steps2: joint_steps(self.prev_theta2, theta2, &mut self.err2, joint2),
        }
    }

    pub fn commit(&mut self, theta1: f32, theta2: f32) {
        self.prev_theta1 = theta1;
        self.prev_theta2 = theta2;
    }

    /// Move the logical pose by the steps that were actually delivered and drop the carry.
    ///
    /// Must be applied to the state as it was before the interrupted move was planned.
    pub fn resync(&mut self, delivered: StepMove, joint1: &JointConfig, joint2: &JointConfig) {
        self.prev_theta1 += delivered.steps1 as f32 / joint1.steps_per_deg - self.err1;
        self.prev_theta2 += delivered.steps2 as f32 / joint2.steps_per_deg - self.err2;
        self.err1 = 0.0;
        self.err2 = 0.0;
    }
}

fn joint_steps(prev: f32, target: f32, err: &mut f32, joint: &JointConfig) -> i32 {
    let mech_prev = prev + joint.zero_offset_deg;
    let mech_target = target + joint.zero_offset_deg;

    let exact = (mech_target - mech_prev + *err) * joint.steps_per_deg;
    let steps = exact.round();
    *err = (exact - steps) / joint.steps_per_deg;
    steps as i32
}

/// Steps actually emitted when `undelivered` of `planned` were left.
fn delivered(planned: i32, undelivered: u32) -> i32 {
    let done = planned.unsigned_abs().saturating_sub(undelivered) as i32;
    if planned < 0 {
        -done
    } else {
        done
    }
}

impl<'a, EN, DIR1, DIR2, LIM1, LIM2, PWM, TIM, CLK, SENSE>
    Plotter<'a, EN, DIR1, DIR2, LIM1, LIM2, PWM, TIM, CLK, SENSE>
where
    EN: OutputPin,
    DIR1: OutputPin,
    DIR2: OutputPin,
    LIM1: InputPin,
    LIM2: InputPin,
    PWM: PwmPin<Duty = u16>,
    TIM: StepTimer,
    CLK: Clock,
    SENSE: ObstructionSensor,
{
    /// Set the pen and drive both joints to an absolute pose, blocking until the move finishes.
    ///
    /// A move that rounds to zero steps on both joints only updates the pose. A move that misses
    /// the draw deadline is halted, raises the fault flag and still returns `Ok`. After every move
    /// that ran the timer, this waits for as long as the obstruction sensor reports something in
    /// the way.
    pub fn command_pose(
        &mut self,
        theta1: f32,
        theta2: f32,
        pen: PenState,
    ) -> Result<MoveOutcome, MotionError> {
        for axis in Axis::BOTH {
            if self.pulses.is_armed(axis) {
                return Err(MotionError::Busy(axis));
            }
        }

        let pulse_us = if pen.is_up() {
            self.config.pen_up_us
        } else {
            self.config.pen_down_us
        };
        self.move_servo_pulse(pulse_us);

        let before = self.motion;
        let mv = self
            .motion
            .plan_move(theta1, theta2, &self.config.joint1, &self.config.joint2);

        for axis in Axis::BOTH {
            let dir = self.config.joint(axis).dir_for(mv.steps(axis));
            self.steppers.set_direction(axis, dir);
        }

        if mv.is_empty() {
            self.motion.commit(theta1, theta2);
            return Ok(MoveOutcome::Idle);
        }

        let mut active = [false; 2];
        for axis in Axis::BOTH {
            active[axis.index()] = self.pulses.arm(axis, mv.steps(axis))?;
        }

        self.timer.set_frequency(self.config.draw_freq_hz);
        for axis in Axis::BOTH {
            if active[axis.index()] {
                self.timer.start_channel(axis);
            }
        }
        self.timer.start_base();

        let start = self.clock.now_ms();
        let mut outcome = MoveOutcome::Completed;
        while !self.pulses.is_idle() {
            if elapsed_ms(self.clock.now_ms(), start) > self.config.draw_timeout_ms {
                self.halt_timer();
                let undelivered = self.pulses.abort();

                self.motion = before;
                self.motion.resync(
                    StepMove {
                        steps1: delivered(mv.steps1, undelivered[0]),
                        steps2: delivered(mv.steps2, undelivered[1]),
                    },
                    &self.config.joint1,
                    &self.config.joint2,
                );
                self.fault = true;
                warn!(
                    "move timed out with {} / {} steps undelivered",
                    undelivered[0],
                    undelivered[1]
                );
                outcome = MoveOutcome::TimedOut { undelivered };
                break;
            }
            self.clock.sleep();
        }
        self.timer.stop_base();

        self.wait_while_obstructed();

        if outcome == MoveOutcome::Completed {
            self.motion.commit(theta1, theta2);
        }
        Ok(outcome)
    }

    fn wait_while_obstructed(&mut self) {
        if !self.sensor.obstruction() {
            return;
        }

        let start = self.clock.now_ms();
        warn!("obstruction detected, holding");
        while self.sensor.obstruction() {
            self.clock.sleep();
        }
        info!(
            "obstruction cleared after {} ms",
            elapsed_ms(self.clock.now_ms(), start)
        );
    }
}
