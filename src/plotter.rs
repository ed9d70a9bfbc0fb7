// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! The plotter: both joints, the pen, the step timer and the sensors behind one owner.
//!
//! Homing lives in [`crate::control::homing`], single moves in [`crate::control::motion`] and path
//! execution in [`crate::control::spline`]; each adds its own `impl Plotter` block.

use embedded_hal::{
    digital::v2::{InputPin, OutputPin},
    PwmPin,
};

use crate::config::PlotterConfig;
use crate::control::{HomingState, MotionState, PulseGenerator};
use crate::drivers::{Drv8825Pair, LimitSwitch, ObstructionSensor, PenServo};
use crate::hw::{Axis, Clock, StepTimer};

/// Two-joint SCARA plotter.
///
/// `pulses` is shared with the step timer's interrupt handler, which must forward every compare
/// event to [`PulseGenerator::on_compare_event`].
pub struct Plotter<'a, EN, DIR1, DIR2, LIM1, LIM2, PWM, TIM, CLK, SENSE> {
    pub(crate) steppers: Drv8825Pair<EN, DIR1, DIR2>,
    pub(crate) limit1: LimitSwitch<LIM1>,
    pub(crate) limit2: LimitSwitch<LIM2>,
    pub(crate) pen: PenServo<PWM>,
    pub(crate) timer: TIM,
    pub(crate) clock: CLK,
    pub(crate) sensor: SENSE,
    pub(crate) pulses: &'a PulseGenerator,
    pub(crate) motion: MotionState,
    pub(crate) config: PlotterConfig,
    pub(crate) homing: HomingState,
    pub(crate) fault: bool,
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
    /// Assemble the plotter. Outputs stay disabled and the timer stopped until homing.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        steppers: Drv8825Pair<EN, DIR1, DIR2>,
        limit1: LimitSwitch<LIM1>,
        limit2: LimitSwitch<LIM2>,
        pen: PenServo<PWM>,
        mut timer: TIM,
        clock: CLK,
        sensor: SENSE,
        pulses: &'a PulseGenerator,
        config: PlotterConfig,
    ) -> Self {
        timer.stop_base();
        for axis in Axis::BOTH {
            timer.halt_channel(axis);
        }

        Self {
            steppers,
            limit1,
            limit2,
            pen,
            timer,
            clock,
            sensor,
            pulses,
            motion: MotionState::new(),
            config,
            homing: HomingState::Idle,
            fault: false,
        }
    }

    /// Energize both stepper drivers.
    pub fn enable(&mut self) {
        self.steppers.enable();
    }

    /// De-energize both stepper drivers. The joints can be moved by hand afterwards, so the
    /// position reference is only trustworthy again after homing.
    pub fn disable(&mut self) {
        self.steppers.disable();
    }

    /// Command the pen servo; the width is clamped to the safe window. Returns the applied width.
    pub fn move_servo_pulse(&mut self, pulse_us: u16) -> u16 {
        self.pen.set_pulse_us(pulse_us)
    }

    /// Set by a failed homing or a move that missed its deadline; cleared only by homing.
    #[inline]
    pub fn fault(&self) -> bool {
        self.fault
    }

    #[inline]
    pub fn homing_state(&self) -> HomingState {
        self.homing
    }

    #[inline]
    pub fn motion(&self) -> &MotionState {
        &self.motion
    }

    #[inline]
    pub fn config(&self) -> &PlotterConfig {
        &self.config
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.steppers.is_enabled()
    }

    pub(crate) fn switch_pressed(&self, axis: Axis) -> bool {
        match axis {
            Axis::One => self.limit1.is_pressed(),
            Axis::Two => self.limit2.is_pressed(),
        }
    }

    /// Stop both channels with their step lines low, then the counting base.
    pub(crate) fn halt_timer(&mut self) {
        for axis in Axis::BOTH {
            self.timer.halt_channel(axis);
        }
        self.timer.stop_base();
    }
}
