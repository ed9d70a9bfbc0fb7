// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Joint-space waypoints.

/// Pen position carried by every waypoint.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PenState {
    Up,
    Down,
}

impl PenState {
    /// Interpret a raw pen flag: any non-zero value lifts the pen.
    #[inline]
    pub const fn from_flag(flag: i32) -> Self {
        if flag != 0 {
            PenState::Up
        } else {
            PenState::Down
        }
    }

    #[inline]
    pub const fn is_up(self) -> bool {
        matches!(self, PenState::Up)
    }
}

/// A target pose: both joint angles in logical degrees plus the pen state.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Waypoint {
    pub theta1_deg: f32,
    pub theta2_deg: f32,
    pub pen: PenState,
}

impl Waypoint {
    pub const fn new(theta1_deg: f32, theta2_deg: f32, pen: PenState) -> Self {
        Self {
            theta1_deg,
            theta2_deg,
            pen,
        }
    }

    pub const fn up(theta1_deg: f32, theta2_deg: f32) -> Self {
        Self::new(theta1_deg, theta2_deg, PenState::Up)
    }

    pub const fn down(theta1_deg: f32, theta2_deg: f32) -> Self {
        Self::new(theta1_deg, theta2_deg, PenState::Down)
    }
}
