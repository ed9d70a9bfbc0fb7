// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Pin definitions for the plotter on a NUCLEO-F767ZI.

use stm32f7xx_hal::{
    gpio::{gpioa, gpiob, gpiod, gpioe, gpiof, Alternate, Floating, Input, Output, PullUp, PushPull},
    pac,
    prelude::*,
};

pub struct BoardPins {
    pub leds: Leds,
    pub usart3: Usart3Pins,
    pub steppers: StepperPins,
    pub limits: LimitPins,
    pub servo: ServoPins,
    pub sonar: SonarPins,
}

pub struct Leds {
    pub green: gpiob::PB0<Output<PushPull>>, // LD1
    pub blue: gpiob::PB7<Output<PushPull>>,  // LD2
    pub red: gpiob::PB14<Output<PushPull>>,  // LD3
}

pub struct Usart3Pins {
    pub tx: gpiod::PD8<Alternate<7>>,
    pub rx: gpiod::PD9<Alternate<7>>,
}

/// DRV8825 control lines. The step lines belong to TIM3.
pub struct StepperPins {
    pub enable: gpioa::PA0<Output<PushPull>>,
    pub dir1: gpiod::PD14<Output<PushPull>>,
    pub dir2: gpiod::PD15<Output<PushPull>>,
    pub step1: gpiob::PB4<Alternate<2>>, // TIM3_CH1
    pub step2: gpiob::PB5<Alternate<2>>, // TIM3_CH2
}

/// Switches to ground, pulled up: low when pressed.
pub struct LimitPins {
    pub joint1: gpiof::PF13<Input<PullUp>>,
    pub joint2: gpiof::PF14<Input<PullUp>>,
}

pub struct ServoPins {
    pub pwm: gpioe::PE11<Alternate<1>>, // TIM1_CH2
}

pub struct SonarPins {
    pub trig: gpiod::PD0<Output<PushPull>>,
    pub echo: gpiod::PD1<Input<Floating>>,
}

impl BoardPins {
    pub fn new(
        gpioa: pac::GPIOA,
        gpiob: pac::GPIOB,
        gpiod: pac::GPIOD,
        gpioe: pac::GPIOE,
        gpiof: pac::GPIOF,
    ) -> Self {
        let gpioa = gpioa.split();
        let gpiob = gpiob.split();
        let gpiod = gpiod.split();
        let gpioe = gpioe.split();
        let gpiof = gpiof.split();

        Self {
            leds: Leds {
                green: gpiob.pb0.into_push_pull_output(),
                blue: gpiob.pb7.into_push_pull_output(),
                red: gpiob.pb14.into_push_pull_output(),
            },

            usart3: Usart3Pins {
                tx: gpiod.pd8.into_alternate::<7>(),
                rx: gpiod.pd9.into_alternate::<7>(),
            },

            steppers: StepperPins {
                enable: gpioa.pa0.into_push_pull_output(),
                dir1: gpiod.pd14.into_push_pull_output(),
                dir2: gpiod.pd15.into_push_pull_output(),
                step1: gpiob.pb4.into_alternate::<2>(),
                step2: gpiob.pb5.into_alternate::<2>(),
            },

            limits: LimitPins {
                joint1: gpiof.pf13.into_pull_up_input(),
                joint2: gpiof.pf14.into_pull_up_input(),
            },

            servo: ServoPins {
                pwm: gpioe.pe11.into_alternate::<1>(),
            },

            sonar: SonarPins {
                trig: gpiod.pd0.into_push_pull_output(),
                echo: gpiod.pd1.into_floating_input(),
            },
        }
    }
}
