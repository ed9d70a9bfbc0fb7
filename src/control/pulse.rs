// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Interrupt-driven step pulse counting.
//!
//! The motion code arms an axis with a step count, then the timer's compare interrupt consumes it:
//! each compare event toggles a phase flag and every high-to-low transition counts one full step.
//! When the count reaches zero the interrupt halts that channel and disarms the axis.
//!
//! Each axis is a single-producer/single-consumer cell. The foreground writes the count and phase
//! only while the axis is disarmed, and the interrupt touches them only while it is armed, so the
//! `armed` flag (release on arm, acquire on read) is the whole handoff.

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use crate::hw::{Axis, StepTimer};

/// Arming failed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PulseError {
    /// The axis is still delivering a previous move.
    Busy(Axis),
}

/// What a compare event did.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PulseEvent {
    /// The axis was not armed; nothing happened.
    Ignored,
    /// Low-to-high half of a step.
    Rising,
    /// A full step completed and `remaining` are left.
    Stepped { remaining: u32 },
    /// The last step completed and the channel was halted.
    Finished,
}

struct PulseChannel {
    remaining: AtomicU32,
    high: AtomicBool,
    armed: AtomicBool,
}

impl PulseChannel {
    const fn new() -> Self {
        Self {
            remaining: AtomicU32::new(0),
            high: AtomicBool::new(false),
            armed: AtomicBool::new(false),
        }
    }
}

/// Step counters for both joints, shared between the motion code and the timer interrupt.
///
/// Lives in a `static` on the board so the interrupt handler can reach it.
pub struct PulseGenerator {
    channels: [PulseChannel; 2],
}

impl Default for PulseGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl PulseGenerator {
    pub const fn new() -> Self {
        Self {
            channels: [PulseChannel::new(), PulseChannel::new()],
        }
    }

    #[inline]
    fn channel(&self, axis: Axis) -> &PulseChannel {
        &self.channels[axis.index()]
    }

    /// Load `|steps|` pulses for `axis` with the step line starting low.
    ///
    /// Returns `Ok(true)` when the axis has work and its channel must be started, `Ok(false)` for a
    /// zero count, which leaves the axis disarmed.
    pub fn arm(&self, axis: Axis, steps: i32) -> Result<bool, PulseError> {
        let ch = self.channel(axis);
        if ch.armed.load(Ordering::Acquire) {
            return Err(PulseError::Busy(axis));
        }

        let count = steps.unsigned_abs();
        ch.remaining.store(count, Ordering::Relaxed);
        ch.high.store(false, Ordering::Relaxed);
        if count == 0 {
            return Ok(false);
        }

        ch.armed.store(true, Ordering::Release);
        Ok(true)
    }

    /// Consume one compare event for `axis`. Called from the timer interrupt.
    pub fn on_compare_event<T: StepTimer>(&self, axis: Axis, timer: &mut T) -> PulseEvent {
        let ch = self.channel(axis);
        if !ch.armed.load(Ordering::Acquire) {
            return PulseEvent::Ignored;
        }

        let was_high = ch.high.fetch_xor(true, Ordering::Relaxed);
        if !was_high {
            return PulseEvent::Rising;
        }

        let remaining = ch.remaining.load(Ordering::Relaxed).saturating_sub(1);
        ch.remaining.store(remaining, Ordering::Relaxed);
        if remaining > 0 {
            return PulseEvent::Stepped { remaining };
        }

        timer.halt_channel(axis);
        ch.armed.store(false, Ordering::Release);
        PulseEvent::Finished
    }

    #[inline]
    pub fn is_armed(&self, axis: Axis) -> bool {
        self.channel(axis).armed.load(Ordering::Acquire)
    }

    /// True once neither axis has steps outstanding.
    #[inline]
    pub fn is_idle(&self) -> bool {
        !self.is_armed(Axis::One) && !self.is_armed(Axis::Two)
    }

    /// Steps not yet delivered on `axis`.
    #[inline]
    pub fn remaining(&self, axis: Axis) -> u32 {
        self.channel(axis).remaining.load(Ordering::Relaxed)
    }

    /// Disarm both axes and return the undelivered step counts.
    ///
    /// The caller must have halted the timer channels first so the interrupt no longer runs for
    /// them.
    pub fn abort(&self) -> [u32; 2] {
        let mut left = [0; 2];
        for axis in Axis::BOTH {
            let ch = self.channel(axis);
            ch.armed.store(false, Ordering::Release);
            left[axis.index()] = ch.remaining.swap(0, Ordering::Relaxed);
            ch.high.store(false, Ordering::Relaxed);
        }
        left
    }
}
