// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Homing against the joint limit switches.
//!
//! Sequence: lift the pen, wait for both switches to read released, then drive both joints toward
//! their switches at the homing rate. Each joint stops on its own once its switch reads pressed for
//! a run of consecutive samples. The whole run shares one deadline. Only a successful run resets
//! the position reference; a failed one leaves it untouched and raises the fault flag.

use embedded_hal::{
    digital::v2::{InputPin, OutputPin},
    PwmPin,
};

use crate::drivers::ObstructionSensor;
use crate::hw::{elapsed_ms, Axis, Clock, StepTimer};
use crate::plotter::Plotter;

/// Where the homing sequence is.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HomingState {
    /// Never homed since power-up.
    Idle,
    PenUp,
    WaitSwitchesReleased,
    /// Both joints seeking; no switch press being confirmed.
    DriveHome,
    /// At least one joint is confirming a switch press.
    PerAxisDebounce,
    Done,
    TimeoutError,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HomingError {
    /// A limit switch never read released.
    SwitchesStuck,
    /// The deadline passed before both joints reached their switches.
    Timeout {
        joint1_homed: bool,
        joint2_homed: bool,
    },
}

impl HomingState {
    /// Drive-phase state for the current per-joint debounce progress.
    pub fn driving(debounce: &[SwitchDebounce]) -> Self {
        if debounce.iter().any(SwitchDebounce::is_debouncing) {
            HomingState::PerAxisDebounce
        } else {
            HomingState::DriveHome
        }
    }
}

/// Per-joint progress toward its switch.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SeekState {
    Seeking,
    /// Switch read pressed; counting consecutive confirming samples.
    Debouncing(u8),
    Homed,
}

/// Debounce for one limit switch while its joint is seeking.
///
/// A raw press starts a run; `required` further pressed samples confirm it. A released sample in
/// the middle of the run sends the joint back to seeking.
#[derive(Copy, Clone, Debug)]
pub struct SwitchDebounce {
    state: SeekState,
    required: u8,
}

impl SwitchDebounce {
    pub const fn new(required: u8) -> Self {
        Self {
            state: SeekState::Seeking,
            required,
        }
    }

    /// Feed one raw sample. Once homed the joint stays homed.
    pub fn update(&mut self, pressed: bool) -> SeekState {
        self.state = match (self.state, pressed) {
            (SeekState::Homed, _) => SeekState::Homed,
            (_, false) => SeekState::Seeking,
            (SeekState::Seeking, true) if self.required == 0 => SeekState::Homed,
            (SeekState::Seeking, true) => SeekState::Debouncing(0),
            (SeekState::Debouncing(n), true) => {
                let n = n.saturating_add(1);
                if n >= self.required {
                    SeekState::Homed
                } else {
                    SeekState::Debouncing(n)
                }
            }
        };
        self.state
    }

    #[inline]
    pub fn state(&self) -> SeekState {
        self.state
    }

    #[inline]
    pub fn is_homed(&self) -> bool {
        self.state == SeekState::Homed
    }

    #[inline]
    pub fn is_debouncing(&self) -> bool {
        matches!(self.state, SeekState::Debouncing(_))
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
    /// Run the homing sequence. Blocks until both joints are home or the deadline passes.
    ///
    /// Clears the fault flag on entry. On success the logical pose is reset to zero with no carried
    /// rounding error; on failure the fault flag is set and the previous pose is kept.
    pub fn home(&mut self) -> Result<(), HomingError> {
        self.fault = false;

        self.enter(HomingState::PenUp);
        self.enable();
        self.move_servo_pulse(self.config.pen_up_us);
        self.clock.delay_ms(self.config.pen_settle_ms);

        self.enter(HomingState::WaitSwitchesReleased);
        let start = self.clock.now_ms();
        while self.switch_pressed(Axis::One) || self.switch_pressed(Axis::Two) {
            if elapsed_ms(self.clock.now_ms(), start) > self.config.homing_timeout_ms {
                return Err(self.fail_homing(HomingError::SwitchesStuck));
            }
            self.clock.delay_ms(self.config.switch_release_poll_ms);
        }

        self.enter(HomingState::DriveHome);
        for axis in Axis::BOTH {
            let dir = self.config.joint(axis).home_dir;
            self.steppers.set_direction(axis, dir);
        }
        self.timer.set_frequency(self.config.homing_freq_hz);
        for axis in Axis::BOTH {
            self.timer.start_channel(axis);
        }
        self.timer.start_base();

        let mut debounce = [SwitchDebounce::new(self.config.switch_stable_count); 2];
        let start = self.clock.now_ms();
        let result = loop {
            for axis in Axis::BOTH {
                let d = &mut debounce[axis.index()];
                if d.is_homed() {
                    continue;
                }
                if d.update(self.switch_pressed(axis)) == SeekState::Homed {
                    self.timer.halt_channel(axis);
                    debug!(
                        "homing: {} at switch after {} ms",
                        axis,
                        elapsed_ms(self.clock.now_ms(), start)
                    );
                }
            }

            let homed = [debounce[0].is_homed(), debounce[1].is_homed()];
            if homed[0] && homed[1] {
                break Ok(());
            }
            if elapsed_ms(self.clock.now_ms(), start) > self.config.homing_timeout_ms {
                break Err(HomingError::Timeout {
                    joint1_homed: homed[0],
                    joint2_homed: homed[1],
                });
            }

            let state = HomingState::driving(&debounce);
            if state != self.homing {
                self.enter(state);
            }
            let poll_ms = if state == HomingState::PerAxisDebounce {
                self.config.switch_debounce_ms
            } else {
                self.config.switch_seek_poll_ms
            };
            self.clock.delay_ms(poll_ms);
        };

        self.halt_timer();

        match result {
            Ok(()) => {
                self.motion.reset();
                self.enter(HomingState::Done);
                Ok(())
            }
            Err(e) => Err(self.fail_homing(e)),
        }
    }

    fn enter(&mut self, state: HomingState) {
        trace!("homing: {} -> {}", self.homing, state);
        self.homing = state;
        if state == HomingState::Done {
            info!("homing: done");
        }
    }

    fn fail_homing(&mut self, err: HomingError) -> HomingError {
        self.halt_timer();
        self.fault = true;
        self.enter(HomingState::TimeoutError);
        error!("homing failed: {}", err);
        err
    }
}
