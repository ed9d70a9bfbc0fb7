// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Mechanical limit switch used as a joint's home reference.

use embedded_hal::digital::v2::InputPin;

use crate::hw::Level;

pub struct LimitSwitch<PIN> {
    pin: PIN,
    pressed: Level,
}

impl<PIN: InputPin> LimitSwitch<PIN> {
    /// `pressed` is the level the input reads while the switch is closed.
    pub fn new(pin: PIN, pressed: Level) -> Self {
        Self { pin, pressed }
    }

    /// Switch wired to ground with a pull-up: reads low when pressed.
    pub fn active_low(pin: PIN) -> Self {
        Self::new(pin, Level::Low)
    }

    /// Raw, undebounced state. A read error counts as released.
    pub fn is_pressed(&self) -> bool {
        let level = match self.pressed {
            Level::High => self.pin.is_high(),
            Level::Low => self.pin.is_low(),
        };
        level.unwrap_or(false)
    }
}
