// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! USART status console.
//!
//! Note: When using `writeln!`, be sure to include `\r` (CR) in the format string to ensure correct
//! line endings on the terminal.
//!
//! To access the terminal on the host machine, connect to the debug USB port and use
//! ```text
//! $ screen /dev/tty.usbmodem* 115200
//! ```

use core::fmt;
use nb::block;

use stm32f7xx_hal::{
    prelude::*,
    serial::{Instance, Pins, Serial, Tx},
};

use crate::control::{HomingError, MoveOutcome, PlanError, PlanReport};

pub struct Console<U: Instance> {
    tx: Tx<U>,
}

impl<U: Instance> Console<U> {
    pub fn new<PINS: Pins<U>>(serial: Serial<U, PINS>) -> Self {
        let (tx, _rx) = serial.split();
        Self { tx }
    }

    #[inline]
    pub fn write_byte(&mut self, b: u8) {
        let _ = block!(self.tx.write(b));
    }

    pub fn write_str(&mut self, s: &str) {
        for &b in s.as_bytes() {
            self.write_byte(b);
        }
    }

    /// Write string and CRLF terminator.
    #[inline]
    pub fn println(&mut self, s: &str) {
        self.write_str(s);
        self.write_str("\r\n");
    }

    /// Block until the hardware TX FIFO/drain is flushed.
    #[inline]
    pub fn flush(&mut self) {
        let _ = block!(self.tx.flush());
    }

    pub fn report_homing(&mut self, result: &Result<(), HomingError>) {
        let _ = match result {
            Ok(()) => fmt::Write::write_str(self, "homing: ok\r\n"),
            Err(HomingError::SwitchesStuck) => {
                fmt::Write::write_str(self, "homing: FAILED, limit switch stuck pressed\r\n")
            }
            Err(HomingError::Timeout {
                joint1_homed,
                joint2_homed,
            }) => fmt::Write::write_fmt(
                self,
                format_args!(
                    "homing: FAILED, timeout (joint1 homed: {}, joint2 homed: {})\r\n",
                    joint1_homed, joint2_homed
                ),
            ),
        };
    }

    pub fn report_plan(&mut self, result: &Result<PlanReport, PlanError>) {
        let _ = match result {
            Ok(r) => fmt::Write::write_fmt(
                self,
                format_args!(
                    "plan: {} samples, {} idle, {} timed out\r\n",
                    r.samples, r.idle, r.timeouts
                ),
            ),
            Err(e) => fmt::Write::write_fmt(self, format_args!("plan: rejected ({:?})\r\n", e)),
        };
    }

    pub fn report_move(&mut self, outcome: MoveOutcome) {
        let _ = fmt::Write::write_fmt(self, format_args!("move: {:?}\r\n", outcome));
    }
}

// Implement `core::fmt::Write` so we can use `write!` / `writeln!` on `Console`.
impl<U: Instance> fmt::Write for Console<U> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        Console::write_str(self, s);
        Ok(())
    }
}
