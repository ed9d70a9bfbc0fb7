// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! TIM1 CH2 (PE11) servo PWM: 50 Hz frame, 1 µs per duty count.

use embedded_hal::PwmPin;
use stm32f7xx_hal::pac;

use crate::config::SERVO_PERIOD_US;

const PWM_TICK_HZ: u32 = 1_000_000;

const CCER_CC2E: u32 = 1 << 4;
const OC2M_SHIFT: u32 = 12;
const OC2PE: u32 = 1 << 11;
const OCM_PWM1: u32 = 0b110;
const BDTR_MOE: u32 = 1 << 15;
const CR1_ARPE: u32 = 1 << 7;
const EGR_UG: u32 = 1 << 0;

pub struct ServoPwm {
    tim: pac::TIM1,
}

impl ServoPwm {
    /// Take TIM1 and start the frame with a zero-width pulse. `timer_clock_hz` is the APB2 timer
    /// clock.
    pub fn tim1(tim: pac::TIM1, timer_clock_hz: u32) -> Self {
        let rcc = unsafe { &*pac::RCC::ptr() };
        rcc.apb2enr.modify(|_, w| w.tim1en().set_bit());

        // Disable counter while configuring
        tim.cr1.modify(|_, w| w.cen().clear_bit());

        let psc = (timer_clock_hz / PWM_TICK_HZ).max(1) - 1;
        tim.psc.write(|w| unsafe { w.bits(psc) });
        tim.arr.write(|w| unsafe { w.bits(SERVO_PERIOD_US as u32 - 1) });
        tim.ccr2.write(|w| unsafe { w.bits(0) });

        // CH2 PWM mode 1 with preload
        tim.ccmr1_output().modify(|r, w| unsafe {
            w.bits((r.bits() & !(0b111 << OC2M_SHIFT)) | (OCM_PWM1 << OC2M_SHIFT) | OC2PE)
        });

        // Advanced timer: outputs need the main enable
        tim.bdtr.modify(|r, w| unsafe { w.bits(r.bits() | BDTR_MOE) });

        tim.cr1.modify(|r, w| unsafe { w.bits(r.bits() | CR1_ARPE) });
        tim.egr.write(|w| unsafe { w.bits(EGR_UG) });
        tim.cr1.modify(|_, w| w.cen().set_bit());

        Self { tim }
    }
}

impl PwmPin for ServoPwm {
    type Duty = u16;

    fn disable(&mut self) {
        self.tim
            .ccer
            .modify(|r, w| unsafe { w.bits(r.bits() & !CCER_CC2E) });
    }

    fn enable(&mut self) {
        self.tim
            .ccer
            .modify(|r, w| unsafe { w.bits(r.bits() | CCER_CC2E) });
    }

    fn get_duty(&self) -> u16 {
        self.tim.ccr2.read().bits() as u16
    }

    fn get_max_duty(&self) -> u16 {
        SERVO_PERIOD_US
    }

    fn set_duty(&mut self, duty: u16) {
        self.tim.ccr2.write(|w| unsafe { w.bits(duty as u32) });
    }
}
