// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Hobby servo lifting and lowering the pen.
//!
//! Pulse widths are always clamped to [`SERVO_MIN_US`]..=[`SERVO_MAX_US`] before reaching the PWM
//! channel, whatever the caller asks for.

use embedded_hal::PwmPin;

use crate::config::{SERVO_MAX_US, SERVO_MIN_US, SERVO_PERIOD_US};

/// Clamp a requested pulse width into the actuator-safe window.
#[inline]
pub fn clamp_pulse_us(us: u16) -> u16 {
    us.clamp(SERVO_MIN_US, SERVO_MAX_US)
}

pub struct PenServo<PWM> {
    pwm: PWM,
    period_us: u16,
    pulse_us: u16,
}

impl<PWM> PenServo<PWM>
where
    PWM: PwmPin<Duty = u16>,
{
    /// Enable the channel. The PWM frame must be [`SERVO_PERIOD_US`] long.
    pub fn new(mut pwm: PWM) -> Self {
        pwm.set_duty(0);
        pwm.enable();
        Self {
            pwm,
            period_us: SERVO_PERIOD_US,
            pulse_us: 0,
        }
    }

    /// Command a pulse width, clamped to the safe window. Returns the width actually applied.
    pub fn set_pulse_us(&mut self, us: u16) -> u16 {
        let us = clamp_pulse_us(us);
        let max = self.pwm.get_max_duty() as u32;
        let duty = (us as u32 * max / self.period_us as u32) as u16;
        self.pwm.set_duty(duty);
        self.pulse_us = us;
        us
    }

    /// Last applied pulse width, 0 before the first command.
    #[inline]
    pub fn pulse_us(&self) -> u16 {
        self.pulse_us
    }

    pub fn free(self) -> PWM {
        self.pwm
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Channel {
        duty: u16,
        max: u16,
        enabled: bool,
    }

    impl PwmPin for Channel {
        type Duty = u16;
        fn disable(&mut self) {
            self.enabled = false;
        }
        fn enable(&mut self) {
            self.enabled = true;
        }
        fn get_duty(&self) -> u16 {
            self.duty
        }
        fn get_max_duty(&self) -> u16 {
            self.max
        }
        fn set_duty(&mut self, duty: u16) {
            self.duty = duty;
        }
    }

    fn servo(max: u16) -> PenServo<Channel> {
        PenServo::new(Channel {
            duty: 123,
            max,
            enabled: false,
        })
    }

    #[test]
    fn out_of_range_requests_are_clamped() {
        let mut s = servo(20_000);
        assert_eq!(s.set_pulse_us(500), 1_000);
        assert_eq!(s.free().duty, 1_000);

        let mut s = servo(20_000);
        assert_eq!(s.set_pulse_us(2_600), 2_000);
        assert_eq!(s.pulse_us(), 2_000);
        assert_eq!(s.free().duty, 2_000);
    }

    #[test]
    fn duty_scales_with_channel_resolution() {
        let mut s = servo(40_000);
        assert_eq!(s.set_pulse_us(1_500), 1_500);
        let ch = s.free();
        assert!(ch.enabled);
        assert_eq!(ch.duty, 3_000);
    }
}
