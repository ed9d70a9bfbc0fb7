// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Plotter firmware entry point: bring up the board, home, draw the demo square, park.

#![no_main]
#![no_std]

#[cfg(feature = "defmt")]
use defmt_rtt as _;
use panic_halt as _;

use cortex_m_rt::{entry, exception};
use hal::{
    pac::{self, interrupt},
    prelude::*,
    serial::{Config, Serial},
};
use stm32f7xx_hal as hal;

use scara_plotter::{
    config::{PlotterConfig, MAX_PLAN_POINTS},
    control::{PulseGenerator, SplinePlanner},
    drivers::{Drv8825Pair, Hcsr04, LimitSwitch, PenServo},
    hw::{
        clock, pins::BoardPins, Axis, Console, DwtEchoTimer, Led, Level, ServoPwm, SysTickClock,
        Tim3StepTimer,
    },
    kinematics::{CartesianPoint, ScaraGeometry},
    PenState, Plotter, Waypoint,
};

/// Step counters shared with the TIM3 compare interrupt.
static PULSES: PulseGenerator = PulseGenerator::new();

/// Demo drawing: a 2 in square in arm coordinates (inches).
const SQUARE: [CartesianPoint; 6] = [
    CartesianPoint { x: -5.0, y: 6.0, pen: PenState::Up },
    CartesianPoint { x: -5.0, y: 6.0, pen: PenState::Down },
    CartesianPoint { x: -3.0, y: 6.0, pen: PenState::Down },
    CartesianPoint { x: -3.0, y: 8.0, pen: PenState::Down },
    CartesianPoint { x: -5.0, y: 8.0, pen: PenState::Down },
    CartesianPoint { x: -5.0, y: 6.0, pen: PenState::Down },
];

#[entry]
fn main() -> ! {
    // Peripherals
    let dp = pac::Peripherals::take().unwrap();
    let mut cp = cortex_m::Peripherals::take().unwrap();

    // Clocks
    let rcc = dp.RCC.constrain();
    let clocks = rcc.cfgr.freeze();
    let sysclk = clocks.sysclk().raw();

    // GPIO
    let pins = BoardPins::new(dp.GPIOA, dp.GPIOB, dp.GPIOD, dp.GPIOE, dp.GPIOF);
    let mut led_homed = Led::active_high(pins.leds.green);
    let mut led_run = Led::active_high(pins.leds.blue);
    let mut led_fault = Led::active_high(pins.leds.red);
    let _step_lines = (pins.steppers.step1, pins.steppers.step2);
    let _servo_line = pins.servo.pwm;

    // USART3 (ST-LINK VCP)
    let usart_cfg = Config {
        baud_rate: 115_200.bps(),
        ..Default::default()
    };
    let serial = Serial::new(dp.USART3, (pins.usart3.tx, pins.usart3.rx), &clocks, usart_cfg);
    let mut console = Console::new(serial);

    // Timers. APB prescalers are 1 after freeze(), so every timer runs at sysclk.
    let timer = Tim3StepTimer::new(dp.TIM3, sysclk);
    let pen = PenServo::new(ServoPwm::tim1(dp.TIM1, sysclk));
    let clock = SysTickClock::new(cp.SYST, sysclk);
    let echo_timer = DwtEchoTimer::new(&mut cp.DCB, &mut cp.DWT, sysclk);

    let steppers = Drv8825Pair::new(
        pins.steppers.enable,
        pins.steppers.dir1,
        pins.steppers.dir2,
        Level::High,
    );
    let sonar = Hcsr04::new(pins.sonar.trig, pins.sonar.echo, echo_timer);

    let mut plotter = Plotter::new(
        steppers,
        LimitSwitch::active_low(pins.limits.joint1),
        LimitSwitch::active_low(pins.limits.joint2),
        pen,
        timer,
        clock,
        sonar,
        &PULSES,
        PlotterConfig::default(),
    );

    unsafe { cortex_m::peripheral::NVIC::unmask(pac::Interrupt::TIM3) };

    console.println("scara-plotter: homing");
    led_run.on();

    let homed = plotter.home();
    console.report_homing(&homed);

    if homed.is_ok() {
        led_homed.on();
        let geometry = ScaraGeometry::default();
        let mut plan = [Waypoint::up(0.0, 0.0); SQUARE.len() + 1];
        let mut reachable = true;
        for (slot, point) in plan.iter_mut().zip(SQUARE.iter()) {
            match geometry.waypoint(point) {
                Ok(wp) => *slot = wp,
                Err(_) => reachable = false,
            }
        }

        if reachable {
            let planner =
                cortex_m::singleton!(: SplinePlanner<MAX_PLAN_POINTS> = SplinePlanner::new())
                    .unwrap();
            let result = plotter.run_plan(planner, &plan);
            console.report_plan(&result);
        } else {
            console.println("plan: demo drawing out of reach");
        }

        if let Ok(outcome) = plotter.command_pose(0.0, 0.0, PenState::Up) {
            console.report_move(outcome);
        }
    }

    plotter.disable();
    led_run.off();
    if plotter.fault() {
        led_fault.on();
        console.println("scara-plotter: FAULT");
    } else {
        console.println("scara-plotter: done");
    }
    console.flush();

    loop {
        cortex_m::asm::wfi();
    }
}

#[interrupt]
fn TIM3() {
    // The foreground handle only changes TIM3 inside critical sections.
    let mut timer = unsafe { Tim3StepTimer::steal() };
    let [cc1, cc2] = timer.take_compare_events();
    if cc1 {
        PULSES.on_compare_event(Axis::One, &mut timer);
    }
    if cc2 {
        PULSES.on_compare_event(Axis::Two, &mut timer);
    }
}

#[exception]
fn SysTick() {
    clock::on_systick();
}
