// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! HC-SR04 ultrasonic ranger used as the plotter's obstruction sensor.
//!
//! A 10 µs trigger pulse starts a ping; the module then holds ECHO high for the round-trip time
//! of the sound. Each echo edge has a deadline so a missing module or a lost echo never hangs the
//! caller.

use embedded_hal::digital::v2::{InputPin, OutputPin};

use crate::config::{ECHO_TIMEOUT_US, OBSTRUCTION_THRESHOLD_MM};

/// Speed of sound in mm per µs at room temperature.
const SOUND_MM_PER_US: f32 = 0.343;
const TRIGGER_SETTLE_US: u32 = 2;
const TRIGGER_PULSE_US: u32 = 10;

/// Anything that can tell whether the drawing area is blocked.
pub trait ObstructionSensor {
    /// Fresh reading: true while something is too close to move.
    fn obstruction(&mut self) -> bool;
}

/// Free-running tick source for echo timing (the DWT cycle counter on the board).
pub trait EchoTimer {
    /// Current tick count; wraps.
    fn ticks(&self) -> u32;

    fn ticks_per_us(&self) -> u32;

    fn delay_us(&mut self, us: u32);
}

pub struct Hcsr04<TRIG, ECHO, T> {
    trig: TRIG,
    echo: ECHO,
    timer: T,
    threshold_mm: f32,
}

impl<TRIG, ECHO, T> Hcsr04<TRIG, ECHO, T>
where
    TRIG: OutputPin,
    ECHO: InputPin,
    T: EchoTimer,
{
    pub fn new(mut trig: TRIG, echo: ECHO, timer: T) -> Self {
        trig.set_low().ok();
        Self {
            trig,
            echo,
            timer,
            threshold_mm: OBSTRUCTION_THRESHOLD_MM,
        }
    }

    /// Override the obstruction distance.
    pub fn with_threshold_mm(mut self, mm: f32) -> Self {
        self.threshold_mm = mm;
        self
    }

    /// Ping once and return the distance in mm, or `None` if no echo arrived in time.
    pub fn distance_mm(&mut self) -> Option<f32> {
        self.trig.set_low().ok();
        self.timer.delay_us(TRIGGER_SETTLE_US);
        self.trig.set_high().ok();
        self.timer.delay_us(TRIGGER_PULSE_US);
        self.trig.set_low().ok();

        let timeout = ECHO_TIMEOUT_US * self.timer.ticks_per_us();

        let t0 = self.timer.ticks();
        self.wait_echo(true, t0, timeout)?;
        let start = self.timer.ticks();
        self.wait_echo(false, start, timeout)?;
        let end = self.timer.ticks();

        let echo_us = end.wrapping_sub(start) as f32 / self.timer.ticks_per_us() as f32;
        Some(echo_us * SOUND_MM_PER_US / 2.0)
    }

    fn wait_echo(&mut self, high: bool, since: u32, timeout: u32) -> Option<()> {
        loop {
            if self.echo.is_high().unwrap_or(false) == high {
                return Some(());
            }
            if self.timer.ticks().wrapping_sub(since) > timeout {
                return None;
            }
        }
    }
}

impl<TRIG, ECHO, T> ObstructionSensor for Hcsr04<TRIG, ECHO, T>
where
    TRIG: OutputPin,
    ECHO: InputPin,
    T: EchoTimer,
{
    fn obstruction(&mut self) -> bool {
        match self.distance_mm() {
            Some(d) => d > 0.0 && d < self.threshold_mm,
            None => false,
        }
    }
}
