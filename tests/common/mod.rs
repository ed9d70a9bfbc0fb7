// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Simulated plotter hardware.
//!
//! Time is a shared microsecond counter. `SimClock::sleep` stands in for the MCU waking on an
//! interrupt: while the step timer runs it advances half a step period and delivers one compare
//! event to every running channel, otherwise it advances one SysTick (1 ms).

#![allow(dead_code)]

use std::{
    cell::{Cell, RefCell},
    convert::Infallible,
    rc::Rc,
};

use embedded_hal::{
    digital::v2::{InputPin, OutputPin},
    PwmPin,
};
use scara_plotter::{
    config::{PlotterConfig, SERVO_PERIOD_US, STEP_TIMER_CLOCK_HZ},
    drivers::{Drv8825Pair, LimitSwitch, ObstructionSensor, PenServo},
    hw::{Axis, Clock, Level, StepTimer, TimerSettings},
    Plotter, PulseGenerator,
};

pub type Now = Rc<Cell<u64>>;

fn now_ms(now: &Now) -> u64 {
    now.get() / 1_000
}

#[derive(Debug, Default)]
pub struct TimerLog {
    pub freq_hz: u32,
    pub base_running: bool,
    pub base_starts: u32,
    pub first_base_start_us: Option<u64>,
    pub running: [bool; 2],
    pub starts: [u32; 2],
    /// Every halt as (axis index, time in µs).
    pub halts: Vec<(usize, u64)>,
    /// Compare events delivered per channel.
    pub edges: [u32; 2],
    /// Stop delivering compare events.
    pub stalled: bool,
    /// Stall once this many events have been delivered in total.
    pub stall_after_edges: Option<u32>,
}

impl TimerLog {
    pub fn first_halt_after(&self, axis: Axis, since_us: u64) -> Option<u64> {
        self.halts
            .iter()
            .find(|(i, t)| *i == axis.index() && *t >= since_us)
            .map(|(_, t)| *t)
    }

    fn delivering(&self) -> bool {
        let total = self.edges[0] + self.edges[1];
        let stalled = self.stalled || self.stall_after_edges.map_or(false, |n| total >= n);
        self.base_running && !stalled && (self.running[0] || self.running[1])
    }
}

pub struct SimTimer {
    log: Rc<RefCell<TimerLog>>,
    now: Now,
}

impl StepTimer for SimTimer {
    fn set_frequency(&mut self, freq_hz: u32) {
        self.log.borrow_mut().freq_hz = freq_hz;
    }

    fn start_channel(&mut self, axis: Axis) {
        let mut log = self.log.borrow_mut();
        log.running[axis.index()] = true;
        log.starts[axis.index()] += 1;
    }

    fn halt_channel(&mut self, axis: Axis) {
        let mut log = self.log.borrow_mut();
        log.running[axis.index()] = false;
        log.halts.push((axis.index(), self.now.get()));
    }

    fn start_base(&mut self) {
        let mut log = self.log.borrow_mut();
        log.base_running = true;
        log.base_starts += 1;
        log.first_base_start_us.get_or_insert(self.now.get());
    }

    fn stop_base(&mut self) {
        self.log.borrow_mut().base_running = false;
    }
}

pub struct SimClock<'a> {
    now: Now,
    log: Rc<RefCell<TimerLog>>,
    pulses: &'a PulseGenerator,
}

impl Clock for SimClock<'_> {
    fn now_ms(&self) -> u32 {
        now_ms(&self.now) as u32
    }

    fn delay_ms(&mut self, ms: u32) {
        self.now.set(self.now.get() + ms as u64 * 1_000);
    }

    fn sleep(&mut self) {
        let (delivering, running, freq_hz) = {
            let log = self.log.borrow();
            (log.delivering(), log.running, log.freq_hz)
        };
        if !delivering {
            self.now.set(self.now.get() + 1_000);
            return;
        }

        let half_period_us =
            TimerSettings::for_frequency(freq_hz, STEP_TIMER_CLOCK_HZ).auto_reload as u64 + 1;
        self.now.set(self.now.get() + half_period_us);

        for axis in Axis::BOTH {
            if running[axis.index()] {
                self.log.borrow_mut().edges[axis.index()] += 1;
                let mut timer = SimTimer {
                    log: self.log.clone(),
                    now: self.now.clone(),
                };
                self.pulses.on_compare_event(axis, &mut timer);
            }
        }
    }
}

#[derive(Clone, Default)]
pub struct SimPin(pub Rc<Cell<bool>>);

impl SimPin {
    pub fn is_high(&self) -> bool {
        self.0.get()
    }
}

impl OutputPin for SimPin {
    type Error = Infallible;

    fn set_low(&mut self) -> Result<(), Infallible> {
        self.0.set(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.0.set(true);
        Ok(())
    }
}

/// Active-low switch whose pressed state is a function of time in ms.
pub struct SimSwitch {
    now: Now,
    pressed: Box<dyn Fn(u64) -> bool>,
}

impl InputPin for SimSwitch {
    type Error = Infallible;

    fn is_high(&self) -> Result<bool, Infallible> {
        Ok(!(self.pressed)(now_ms(&self.now)))
    }

    fn is_low(&self) -> Result<bool, Infallible> {
        Ok((self.pressed)(now_ms(&self.now)))
    }
}

#[derive(Clone, Default)]
pub struct SimPwm {
    pub duty: Rc<Cell<u16>>,
}

impl PwmPin for SimPwm {
    type Duty = u16;

    fn disable(&mut self) {}

    fn enable(&mut self) {}

    fn get_duty(&self) -> u16 {
        self.duty.get()
    }

    /// 1 µs per count.
    fn get_max_duty(&self) -> u16 {
        SERVO_PERIOD_US
    }

    fn set_duty(&mut self, duty: u16) {
        self.duty.set(duty);
    }
}

/// Reports an obstruction until a fixed time.
pub struct SimSensor {
    now: Now,
    blocked_until_ms: u64,
    pub polls: Rc<Cell<u32>>,
}

impl ObstructionSensor for SimSensor {
    fn obstruction(&mut self) -> bool {
        self.polls.set(self.polls.get() + 1);
        now_ms(&self.now) < self.blocked_until_ms
    }
}

pub type SimPlotter<'a> = Plotter<
    'a,
    SimPin,
    SimPin,
    SimPin,
    SimSwitch,
    SimSwitch,
    SimPwm,
    SimTimer,
    SimClock<'a>,
    SimSensor,
>;

pub struct Rig<'a> {
    pub plotter: SimPlotter<'a>,
    pub now: Now,
    pub timer: Rc<RefCell<TimerLog>>,
    pub enable: SimPin,
    pub dir: [SimPin; 2],
    pub pen_duty: Rc<Cell<u16>>,
    pub sensor_polls: Rc<Cell<u32>>,
}

impl Rig<'_> {
    pub fn now_ms(&self) -> u64 {
        now_ms(&self.now)
    }

    pub fn dir_level(&self, axis: Axis) -> Level {
        if self.dir[axis.index()].is_high() {
            Level::High
        } else {
            Level::Low
        }
    }
}

pub struct RigBuilder {
    switch1: Box<dyn Fn(u64) -> bool>,
    switch2: Box<dyn Fn(u64) -> bool>,
    blocked_until_ms: u64,
    config: PlotterConfig,
}

impl RigBuilder {
    /// Switches never pressed, nothing in the way, default configuration.
    pub fn new() -> Self {
        Self {
            switch1: Box::new(|_| false),
            switch2: Box::new(|_| false),
            blocked_until_ms: 0,
            config: PlotterConfig::default(),
        }
    }

    pub fn switches(
        mut self,
        joint1: impl Fn(u64) -> bool + 'static,
        joint2: impl Fn(u64) -> bool + 'static,
    ) -> Self {
        self.switch1 = Box::new(joint1);
        self.switch2 = Box::new(joint2);
        self
    }

    pub fn blocked_until_ms(mut self, ms: u64) -> Self {
        self.blocked_until_ms = ms;
        self
    }

    pub fn config(mut self, config: PlotterConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self, pulses: &PulseGenerator) -> Rig<'_> {
        let now: Now = Rc::new(Cell::new(0));
        let log = Rc::new(RefCell::new(TimerLog::default()));

        let enable = SimPin::default();
        let dir = [SimPin::default(), SimPin::default()];
        let pwm = SimPwm::default();
        let pen_duty = pwm.duty.clone();
        let sensor_polls = Rc::new(Cell::new(0));

        let plotter = Plotter::new(
            Drv8825Pair::new(enable.clone(), dir[0].clone(), dir[1].clone(), Level::High),
            LimitSwitch::active_low(SimSwitch {
                now: now.clone(),
                pressed: self.switch1,
            }),
            LimitSwitch::active_low(SimSwitch {
                now: now.clone(),
                pressed: self.switch2,
            }),
            PenServo::new(pwm),
            SimTimer {
                log: log.clone(),
                now: now.clone(),
            },
            SimClock {
                now: now.clone(),
                log: log.clone(),
                pulses,
            },
            SimSensor {
                now: now.clone(),
                blocked_until_ms: self.blocked_until_ms,
                polls: sensor_polls.clone(),
            },
            pulses,
            self.config,
        );

        Rig {
            plotter,
            now,
            timer: log,
            enable,
            dir,
            pen_duty,
            sensor_polls,
        }
    }
}
