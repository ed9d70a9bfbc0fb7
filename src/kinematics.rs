// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Cartesian drawing coordinates to joint-space waypoints.
//!
//! The arm is a planar two-link chain. Lengths are in inches, angles in degrees. Joint 2's zero sits
//! [`ScaraGeometry::elbow_offset_deg`] away from the straight-arm position, and both joint angles
//! are reported as non-positive so that positive motor motion matches the arm's CCW convention.

#[allow(unused_imports)]
use micromath::F32Ext;

use crate::waypoint::{PenState, Waypoint};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum KinematicsError {
    /// The point is closer than `|l1 - l2|` or farther than `l1 + l2` from the shoulder.
    OutOfReach,
}

/// A point of the drawing in arm coordinates.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CartesianPoint {
    pub x: f32,
    pub y: f32,
    pub pen: PenState,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ScaraGeometry {
    /// Shoulder to elbow.
    pub l1: f32,
    /// Elbow to pen.
    pub l2: f32,
    pub elbow_offset_deg: f32,
}

impl Default for ScaraGeometry {
    fn default() -> Self {
        Self {
            l1: 5.816,
            l2: 5.931,
            elbow_offset_deg: 147.5,
        }
    }
}

impl ScaraGeometry {
    /// Joint angles `(theta1, theta2)` in degrees that put the pen at `(x, y)`.
    pub fn inverse(&self, x: f32, y: f32) -> Result<(f32, f32), KinematicsError> {
        let (l1, l2) = (self.l1, self.l2);
        let r2 = x * x + y * y;
        let c = (r2 - l1 * l1 - l2 * l2) / (2.0 * l1 * l2);
        if !(c.abs() <= 1.0) {
            return Err(KinematicsError::OutOfReach);
        }

        let s = (1.0 - c * c).sqrt();
        let t2 = s.atan2(c) - self.elbow_offset_deg.to_radians();
        let t1 = y.atan2(x) - (l2 * s).atan2(l1 + l2 * c);

        Ok((-t1.to_degrees().abs(), -t2.to_degrees().abs()))
    }

    /// Waypoint for a Cartesian point.
    pub fn waypoint(&self, p: &CartesianPoint) -> Result<Waypoint, KinematicsError> {
        let (theta1, theta2) = self.inverse(p.x, p.y)?;
        Ok(Waypoint::new(theta1, theta2, p.pen))
    }
}

/// Drop points closer than `min_dist` to the last kept one, compacting `points` in place.
///
/// Pen-up points are always kept. Returns the number of points kept at the front of the slice.
pub fn downsample_by_distance(points: &mut [CartesianPoint], min_dist: f32) -> usize {
    if points.is_empty() || !(min_dist > 0.0) {
        return points.len();
    }

    let mut kept = 1;
    for i in 1..points.len() {
        let p = points[i];
        let last = points[kept - 1];
        let (dx, dy) = (p.x - last.x, p.y - last.y);
        if (dx * dx + dy * dy).sqrt() >= min_dist || p.pen.is_up() {
            points[kept] = p;
            kept += 1;
        }
    }
    kept
}
