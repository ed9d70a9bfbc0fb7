// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Hardware seams.
//!
//! The control layer talks to the MCU only through [`StepTimer`] and [`Clock`] plus the
//! `embedded-hal` pin traits. The STM32F7 implementations live in the submodules gated behind the
//! `board` feature.

#[cfg(feature = "board")]
pub mod clock;
#[cfg(feature = "board")]
pub mod console;
pub mod led;
#[cfg(feature = "board")]
pub mod pins;
#[cfg(feature = "board")]
pub mod servo_pwm;
#[cfg(feature = "board")]
pub mod step_timer;

#[cfg(feature = "board")]
pub use clock::{DwtEchoTimer, SysTickClock};
#[cfg(feature = "board")]
pub use console::Console;
pub use led::Led;
#[cfg(feature = "board")]
pub use servo_pwm::ServoPwm;
#[cfg(feature = "board")]
pub use step_timer::Tim3StepTimer;

/// One of the two arm joints, and the timer channel that steps it.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Axis {
    One,
    Two,
}

impl Axis {
    pub const BOTH: [Axis; 2] = [Axis::One, Axis::Two];

    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Axis::One => 0,
            Axis::Two => 1,
        }
    }
}

/// Logic level of a digital line.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Level {
    High,
    Low,
}

impl Level {
    #[inline]
    pub const fn inverted(self) -> Self {
        match self {
            Level::High => Level::Low,
            Level::Low => Level::High,
        }
    }

    #[inline]
    pub const fn is_high(self) -> bool {
        matches!(self, Level::High)
    }
}

/// Output-compare timer producing the step pulses for both joints.
///
/// One counting base is shared by two channels. Each compare event toggles the channel's step
/// line, so a full step takes two events.
pub trait StepTimer {
    /// Reprogram the shared base so each channel emits `freq_hz` full steps per second.
    fn set_frequency(&mut self, freq_hz: u32);

    /// Clear the channel's pending flag, enable its compare interrupt and start toggling.
    fn start_channel(&mut self, axis: Axis);

    /// Disable the channel's compare interrupt, stop toggling and force its step line low.
    ///
    /// Must be callable from the compare interrupt itself.
    fn halt_channel(&mut self, axis: Axis);

    /// Clear all pending flags, reset the counter and start counting.
    fn start_base(&mut self);

    fn stop_base(&mut self);
}

/// Millisecond time base.
pub trait Clock {
    /// Monotonic milliseconds; wraps, so compare with [`elapsed_ms`].
    fn now_ms(&self) -> u32;

    fn delay_ms(&mut self, ms: u32);

    /// Wait for the next interrupt.
    fn sleep(&mut self);
}

/// Milliseconds from `since` to `now`, tolerant of counter wraparound.
#[inline]
pub fn elapsed_ms(now: u32, since: u32) -> u32 {
    now.wrapping_sub(since)
}

/// Auto-reload and compare values for a step frequency.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TimerSettings {
    pub auto_reload: u32,
    pub compare: u32,
}

impl TimerSettings {
    /// Smallest full pulse period, in timer ticks.
    pub const MIN_PERIOD_TICKS: u32 = 4;

    /// Settings for `freq_hz` full pulses per second on a timer ticking at `clock_hz`.
    ///
    /// The base period is half the pulse period because every compare event toggles the line.
    pub fn for_frequency(freq_hz: u32, clock_hz: u32) -> Self {
        let full = (clock_hz / freq_hz.max(1)).max(Self::MIN_PERIOD_TICKS);
        let auto_reload = full / 2 - 1;
        Self {
            auto_reload,
            compare: (auto_reload + 1) / 2,
        }
    }
}
