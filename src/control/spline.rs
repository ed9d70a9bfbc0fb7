// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Smooth joint-space paths through a list of waypoints.
//!
//! Each waypoint gets a tangent from its neighbours, weighted by how far away the next point is
//! relative to the previous one (a centripetal-style cubic Hermite spline). Every segment is then
//! sampled densely enough that no joint moves more than about [`SplineConfig::resolution_deg`]
//! between consecutive samples, capped at [`SplineConfig::max_subdivisions`], and each sample is
//! sent to [`Plotter::command_pose`].
//!
//! All storage is fixed-size: the tangent buffer lives in a [`SplinePlanner`] sized at compile time
//! and is reused for every plan.

use embedded_hal::{
    digital::v2::{InputPin, OutputPin},
    PwmPin,
};
#[allow(unused_imports)]
use micromath::F32Ext;

use crate::config::SplineConfig;
use crate::control::{MotionError, MoveOutcome};
use crate::drivers::ObstructionSensor;
use crate::hw::{Clock, StepTimer};
use crate::plotter::Plotter;
use crate::waypoint::Waypoint;

/// Distances below this count as coincident points.
pub const NEGLIGIBLE_DISTANCE: f32 = 1e-6;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PlanError {
    /// A path needs at least two waypoints.
    TooFewPoints { len: usize },
    /// More waypoints than the planner's tangent buffer holds.
    TooManyPoints { len: usize, capacity: usize },
    Motion(MotionError),
}

impl From<MotionError> for PlanError {
    fn from(e: MotionError) -> Self {
        PlanError::Motion(e)
    }
}

/// Summary of an executed plan.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PlanReport {
    /// Samples sent to the joints.
    pub samples: usize,
    /// Samples that rounded to no motion.
    pub idle: usize,
    /// Samples that missed the draw deadline.
    pub timeouts: usize,
}

/// Joint-space velocity at a waypoint, in degrees per unit segment parameter.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Tangent {
    pub dtheta1: f32,
    pub dtheta2: f32,
}

impl Tangent {
    pub const ZERO: Tangent = Tangent {
        dtheta1: 0.0,
        dtheta2: 0.0,
    };
}

/// Euclidean distance between two waypoints in joint space.
#[inline]
pub fn joint_distance(a: &Waypoint, b: &Waypoint) -> f32 {
    let d1 = b.theta1_deg - a.theta1_deg;
    let d2 = b.theta2_deg - a.theta2_deg;
    (d1 * d1 + d2 * d2).sqrt()
}

/// Cubic Hermite interpolation between `p0` and `p1` with end tangents `m0`, `m1`.
#[inline]
pub fn hermite(p0: f32, p1: f32, m0: f32, m1: f32, t: f32) -> f32 {
    let t2 = t * t;
    let t3 = t2 * t;
    let h00 = 2.0 * t3 - 3.0 * t2 + 1.0;
    let h10 = t3 - 2.0 * t2 + t;
    let h01 = -2.0 * t3 + 3.0 * t2;
    let h11 = t3 - t2;
    h00 * p0 + h10 * m0 + h01 * p1 + h11 * m1
}

/// Tangent at `points[i]`; the endpoints use themselves as their missing neighbour.
///
/// Zero when both neighbours coincide with the point.
pub fn tangent_at(points: &[Waypoint], i: usize, factor: f32) -> Tangent {
    let here = &points[i];
    let prev = &points[i.saturating_sub(1)];
    let next = &points[(i + 1).min(points.len() - 1)];

    let d_prev = joint_distance(prev, here);
    let d_next = joint_distance(here, next);
    let denom = d_prev + d_next;
    if denom < NEGLIGIBLE_DISTANCE {
        return Tangent::ZERO;
    }

    let w = factor * d_next / denom;
    Tangent {
        dtheta1: w * (next.theta1_deg - prev.theta1_deg),
        dtheta2: w * (next.theta2_deg - prev.theta2_deg),
    }
}

/// Largest single-joint angle change between two waypoints.
#[inline]
pub fn max_joint_delta(a: &Waypoint, b: &Waypoint) -> f32 {
    let d1 = (b.theta1_deg - a.theta1_deg).abs();
    let d2 = (b.theta2_deg - a.theta2_deg).abs();
    d1.max(d2)
}

/// Number of steps the segment `a`..`b` is cut into: `ceil(max_joint_delta / resolution)`, at
/// least 1 and at most the configured cap.
pub fn subdivisions(a: &Waypoint, b: &Waypoint, cfg: &SplineConfig) -> u32 {
    let n = (max_joint_delta(a, b) / cfg.resolution_deg).ceil();
    let max = cfg.max_subdivisions.max(1);
    if !(n >= 1.0) {
        1
    } else if n >= max as f32 {
        max
    } else {
        n as u32
    }
}

/// Owns the tangent buffer for paths of up to `N` waypoints.
pub struct SplinePlanner<const N: usize> {
    tangents: [Tangent; N],
}

impl<const N: usize> Default for SplinePlanner<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> SplinePlanner<N> {
    pub const fn new() -> Self {
        Self {
            tangents: [Tangent::ZERO; N],
        }
    }

    #[inline]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Validate `points`, compute their tangents and return the sample sequence.
    ///
    /// Samples run from the first waypoint to the last; every segment after the first skips its
    /// starting sample since the previous segment already ended there.
    pub fn plan<'p>(
        &'p mut self,
        points: &'p [Waypoint],
        cfg: &SplineConfig,
    ) -> Result<Samples<'p>, PlanError> {
        if points.len() < 2 {
            return Err(PlanError::TooFewPoints { len: points.len() });
        }
        if points.len() > N {
            return Err(PlanError::TooManyPoints {
                len: points.len(),
                capacity: N,
            });
        }

        let factor = cfg.tangent_factor();
        for (i, slot) in self.tangents[..points.len()].iter_mut().enumerate() {
            *slot = tangent_at(points, i, factor);
        }

        Ok(Samples {
            points,
            tangents: &self.tangents[..points.len()],
            cfg: *cfg,
            seg: 0,
            step: 0,
            subdiv: subdivisions(&points[0], &points[1], cfg),
        })
    }
}

/// Iterator over the interpolated poses of a planned path.
pub struct Samples<'p> {
    points: &'p [Waypoint],
    tangents: &'p [Tangent],
    cfg: SplineConfig,
    seg: usize,
    step: u32,
    subdiv: u32,
}

impl<'p> Samples<'p> {
    #[inline]
    pub fn tangents(&self) -> &'p [Tangent] {
        self.tangents
    }
}

impl Iterator for Samples<'_> {
    type Item = Waypoint;

    fn next(&mut self) -> Option<Waypoint> {
        if self.seg + 1 >= self.points.len() {
            return None;
        }
        if self.step > self.subdiv {
            self.seg += 1;
            if self.seg + 1 >= self.points.len() {
                return None;
            }
            self.subdiv = subdivisions(&self.points[self.seg], &self.points[self.seg + 1], &self.cfg);
            self.step = 1;
        }

        let (p0, p1) = (&self.points[self.seg], &self.points[self.seg + 1]);
        let (m0, m1) = (self.tangents[self.seg], self.tangents[self.seg + 1]);
        let t = self.step as f32 / self.subdiv as f32;
        self.step += 1;

        Some(Waypoint {
            theta1_deg: hermite(p0.theta1_deg, p1.theta1_deg, m0.dtheta1, m1.dtheta1, t),
            theta2_deg: hermite(p0.theta2_deg, p1.theta2_deg, m0.dtheta2, m1.dtheta2, t),
            pen: if t < 0.5 { p0.pen } else { p1.pen },
        })
    }
}

impl<'a, EN, DIR1, DIR2, LIM1, LIM2, PWM, TIM, CLK, SENSE>
    Plotter<'a, EN, DIR1, DIR2, LIM1, LIM2, PWM, TIM, CLK, SENSE>
where
    EN: OutputPin,
    DIR1: OutputPin,
    DIR2: OutputPin,
    LIM1: InputPin,
    LIM2: InputPin,
    PWM: PwmPin<Duty = u16>,
    TIM: StepTimer,
    CLK: Clock,
    SENSE: ObstructionSensor,
{
    /// Plan a smooth path through `points` and execute it sample by sample.
    ///
    /// Nothing moves if the path is rejected. A sample that misses the draw deadline is counted
    /// in the report and the path continues.
    pub fn run_plan<const N: usize>(
        &mut self,
        planner: &mut SplinePlanner<N>,
        points: &[Waypoint],
    ) -> Result<PlanReport, PlanError> {
        let cfg = self.config.spline;
        let samples = planner.plan(points, &cfg)?;
        info!("plan: {} waypoints", points.len());

        let mut report = PlanReport::default();
        for wp in samples {
            match self.command_pose(wp.theta1_deg, wp.theta2_deg, wp.pen)? {
                MoveOutcome::Idle => report.idle += 1,
                MoveOutcome::Completed => {}
                MoveOutcome::TimedOut { .. } => report.timeouts += 1,
            }
            report.samples += 1;
        }

        info!(
            "plan: {} samples, {} timed out",
            report.samples, report.timeouts
        );
        Ok(report)
    }
}
