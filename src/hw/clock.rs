// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! SysTick millisecond clock and DWT cycle-counter echo timer.
//!
//! The binary's `SysTick` exception handler must call [`on_systick`].

use core::sync::atomic::{AtomicU32, Ordering};

use cortex_m::peripheral::{syst::SystClkSource, DCB, DWT, SYST};

use crate::drivers::EchoTimer;
use crate::hw::{elapsed_ms, Clock};

static MILLIS: AtomicU32 = AtomicU32::new(0);

/// Advance the millisecond counter. Call from the SysTick exception.
#[inline]
pub fn on_systick() {
    MILLIS.fetch_add(1, Ordering::Relaxed);
}

pub struct SysTickClock {
    _syst: SYST,
}

impl SysTickClock {
    /// Start SysTick at 1 kHz from the core clock.
    pub fn new(mut syst: SYST, sysclk_hz: u32) -> Self {
        syst.set_clock_source(SystClkSource::Core);
        syst.set_reload(sysclk_hz / 1_000 - 1);
        syst.clear_current();
        syst.enable_counter();
        syst.enable_interrupt();
        Self { _syst: syst }
    }
}

impl Clock for SysTickClock {
    #[inline]
    fn now_ms(&self) -> u32 {
        MILLIS.load(Ordering::Relaxed)
    }

    fn delay_ms(&mut self, ms: u32) {
        let start = self.now_ms();
        while elapsed_ms(self.now_ms(), start) < ms {
            cortex_m::asm::wfi();
        }
    }

    #[inline]
    fn sleep(&mut self) {
        cortex_m::asm::wfi();
    }
}

pub struct DwtEchoTimer {
    ticks_per_us: u32,
}

impl DwtEchoTimer {
    /// Start the cycle counter.
    pub fn new(dcb: &mut DCB, dwt: &mut DWT, sysclk_hz: u32) -> Self {
        dcb.enable_trace();
        DWT::unlock();
        dwt.enable_cycle_counter();
        Self {
            ticks_per_us: (sysclk_hz / 1_000_000).max(1),
        }
    }
}

impl EchoTimer for DwtEchoTimer {
    #[inline]
    fn ticks(&self) -> u32 {
        DWT::cycle_count()
    }

    #[inline]
    fn ticks_per_us(&self) -> u32 {
        self.ticks_per_us
    }

    fn delay_us(&mut self, us: u32) {
        let start = DWT::cycle_count();
        let ticks = us * self.ticks_per_us;
        while DWT::cycle_count().wrapping_sub(start) < ticks {}
    }
}
