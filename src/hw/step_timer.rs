// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! TIM3 output-compare step generator.
//!
//! CH1 (PB4) steps joint 1 and CH2 (PB5) steps joint 2. Both channels run in toggle mode off one
//! counting base ticking at [`STEP_TIMER_CLOCK_HZ`], so each compare match is half a step. A halted
//! channel is held in forced-inactive mode, which pins its step line low.
//!
//! Register read-modify-writes happen inside a critical section because the compare interrupt
//! halts channels on its own.

use cortex_m::interrupt;
use stm32f7xx_hal::pac;

use crate::config::{DRAW_FREQ_HZ, STEP_TIMER_CLOCK_HZ};
use crate::hw::{Axis, StepTimer, TimerSettings};

const SR_CC1IF: u32 = 1 << 1;
const SR_CC2IF: u32 = 1 << 2;
const DIER_CC1IE: u32 = 1 << 1;
const DIER_CC2IE: u32 = 1 << 2;
const CCER_CC1E: u32 = 1 << 0;
const CCER_CC1P: u32 = 1 << 1;
const CCER_CC2E: u32 = 1 << 4;
const CCER_CC2P: u32 = 1 << 5;
const EGR_UG: u32 = 1 << 0;

const OC1M_SHIFT: u32 = 4;
const OC2M_SHIFT: u32 = 12;
const OCM_MASK: u32 = 0b111;
const OCM_TOGGLE: u32 = 0b011;
const OCM_FORCE_INACTIVE: u32 = 0b100;

/// TIM3 is 16-bit.
const MAX_RELOAD: u32 = 0xFFFF;

#[inline]
fn regs() -> &'static pac::tim3::RegisterBlock {
    unsafe { &*pac::TIM3::ptr() }
}

fn flag(axis: Axis) -> u32 {
    match axis {
        Axis::One => SR_CC1IF,
        Axis::Two => SR_CC2IF,
    }
}

fn irq_enable(axis: Axis) -> u32 {
    match axis {
        Axis::One => DIER_CC1IE,
        Axis::Two => DIER_CC2IE,
    }
}

fn set_mode(axis: Axis, mode: u32) {
    let shift = match axis {
        Axis::One => OC1M_SHIFT,
        Axis::Two => OC2M_SHIFT,
    };
    regs()
        .ccmr1_output()
        .modify(|r, w| unsafe { w.bits((r.bits() & !(OCM_MASK << shift)) | (mode << shift)) });
}

pub struct Tim3StepTimer {
    _private: (),
}

impl Tim3StepTimer {
    /// Take TIM3 and configure both channels, halted. `timer_clock_hz` is the APB1 timer clock.
    pub fn new(_tim: pac::TIM3, timer_clock_hz: u32) -> Self {
        let rcc = unsafe { &*pac::RCC::ptr() };
        rcc.apb1enr.modify(|_, w| w.tim3en().set_bit());

        let tim = regs();

        // Disable counter while configuring
        tim.cr1.modify(|_, w| w.cen().clear_bit());
        tim.dier.write(|w| unsafe { w.bits(0) });

        // Prescale down to the step timer tick
        let psc = (timer_clock_hz / STEP_TIMER_CLOCK_HZ).max(1) - 1;
        tim.psc.write(|w| unsafe { w.bits(psc) });

        // CH1/CH2 as outputs, held low until started
        tim.ccmr1_output().write(|w| unsafe {
            w.bits((OCM_FORCE_INACTIVE << OC1M_SHIFT) | (OCM_FORCE_INACTIVE << OC2M_SHIFT))
        });

        // Active high, both outputs driven
        tim.ccer.modify(|r, w| unsafe {
            w.bits((r.bits() & !(CCER_CC1P | CCER_CC2P)) | CCER_CC1E | CCER_CC2E)
        });

        // Latch the prescaler, then drop the update flag it raises
        tim.egr.write(|w| unsafe { w.bits(EGR_UG) });
        tim.sr.write(|w| unsafe { w.bits(0) });

        let mut timer = Self { _private: () };
        timer.set_frequency(DRAW_FREQ_HZ);
        timer
    }

    /// Second handle on the already configured timer, for the compare interrupt.
    ///
    /// # Safety
    /// [`Tim3StepTimer::new`] must have run. The handle must only be used from the TIM3 interrupt
    /// while the owner keeps to foreground code.
    pub unsafe fn steal() -> Self {
        Self { _private: () }
    }

    /// Read and clear the pending compare events of the enabled channels.
    pub fn take_compare_events(&mut self) -> [bool; 2] {
        let tim = regs();
        let pending = tim.sr.read().bits() & tim.dier.read().bits() & (SR_CC1IF | SR_CC2IF);
        tim.sr.write(|w| unsafe { w.bits(!pending) });
        [pending & SR_CC1IF != 0, pending & SR_CC2IF != 0]
    }
}

impl StepTimer for Tim3StepTimer {
    fn set_frequency(&mut self, freq_hz: u32) {
        let s = TimerSettings::for_frequency(freq_hz, STEP_TIMER_CLOCK_HZ);
        let tim = regs();
        tim.arr.write(|w| unsafe { w.bits(s.auto_reload.min(MAX_RELOAD)) });
        tim.ccr1.write(|w| unsafe { w.bits(s.compare.min(MAX_RELOAD)) });
        tim.ccr2.write(|w| unsafe { w.bits(s.compare.min(MAX_RELOAD)) });
    }

    fn start_channel(&mut self, axis: Axis) {
        interrupt::free(|_| {
            let tim = regs();
            tim.sr.write(|w| unsafe { w.bits(!flag(axis)) });
            set_mode(axis, OCM_TOGGLE);
            tim.dier
                .modify(|r, w| unsafe { w.bits(r.bits() | irq_enable(axis)) });
        });
    }

    fn halt_channel(&mut self, axis: Axis) {
        interrupt::free(|_| {
            let tim = regs();
            tim.dier
                .modify(|r, w| unsafe { w.bits(r.bits() & !irq_enable(axis)) });
            set_mode(axis, OCM_FORCE_INACTIVE);
            tim.sr.write(|w| unsafe { w.bits(!flag(axis)) });
        });
    }

    fn start_base(&mut self) {
        let tim = regs();
        tim.sr.write(|w| unsafe { w.bits(0) });
        tim.cnt.write(|w| unsafe { w.bits(0) });
        tim.cr1.modify(|_, w| w.cen().set_bit());
    }

    fn stop_base(&mut self) {
        regs().cr1.modify(|_, w| w.cen().clear_bit());
    }
}
