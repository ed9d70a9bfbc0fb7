// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Pair of TI DRV8825 step/dir stepper drivers.
//!
//! Both drivers share one enable line. Each joint has its own direction line; the step lines are
//! owned by the step timer, not by this driver.

use embedded_hal::digital::v2::OutputPin;

use crate::hw::{Axis, Level};

pub struct Drv8825Pair<EN, DIR1, DIR2> {
    enable: EN,
    dir1: DIR1,
    dir2: DIR2,
    enable_level: Level,
    enabled: bool,
    dir: [Level; 2],
}

impl<EN, DIR1, DIR2> Drv8825Pair<EN, DIR1, DIR2>
where
    EN: OutputPin,
    DIR1: OutputPin,
    DIR2: OutputPin,
{
    /// Wrap the enable and direction lines, leaving the drivers disabled.
    ///
    /// `enable_level` is the level of the shared enable line that powers the outputs.
    pub fn new(enable: EN, dir1: DIR1, dir2: DIR2, enable_level: Level) -> Self {
        let mut pair = Self {
            enable,
            dir1,
            dir2,
            enable_level,
            enabled: true,
            dir: [Level::Low; 2],
        };
        pair.disable();
        pair.set_direction(Axis::One, Level::Low);
        pair.set_direction(Axis::Two, Level::Low);
        pair
    }

    pub fn enable(&mut self) {
        drive(&mut self.enable, self.enable_level);
        self.enabled = true;
    }

    pub fn disable(&mut self) {
        drive(&mut self.enable, self.enable_level.inverted());
        self.enabled = false;
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Drive the direction line of `axis`.
    pub fn set_direction(&mut self, axis: Axis, level: Level) {
        match axis {
            Axis::One => drive(&mut self.dir1, level),
            Axis::Two => drive(&mut self.dir2, level),
        }
        self.dir[axis.index()] = level;
    }

    /// Last level written to the direction line of `axis`.
    #[inline]
    pub fn direction(&self, axis: Axis) -> Level {
        self.dir[axis.index()]
    }
}

fn drive<P: OutputPin>(pin: &mut P, level: Level) {
    match level {
        Level::High => pin.set_high().ok(),
        Level::Low => pin.set_low().ok(),
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use std::{cell::Cell, rc::Rc};

    #[derive(Clone, Default)]
    struct Line(Rc<Cell<bool>>);

    impl OutputPin for Line {
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

    #[test]
    fn starts_disabled_and_follows_enable_level() {
        let en = Line::default();
        let mut pair = Drv8825Pair::new(en.clone(), Line::default(), Line::default(), Level::High);
        assert!(!pair.is_enabled());
        assert!(!en.0.get());

        pair.enable();
        assert!(en.0.get());

        let en_low = Line::default();
        let mut pair = Drv8825Pair::new(en_low.clone(), Line::default(), Line::default(), Level::Low);
        assert!(en_low.0.get());
        pair.enable();
        assert!(!en_low.0.get());
    }

    #[test]
    fn direction_lines_are_independent() {
        let (d1, d2) = (Line::default(), Line::default());
        let mut pair = Drv8825Pair::new(Line::default(), d1.clone(), d2.clone(), Level::High);
        pair.set_direction(Axis::Two, Level::High);
        assert!(!d1.0.get());
        assert!(d2.0.get());
        assert_eq!(pair.direction(Axis::Two), Level::High);
    }
}
