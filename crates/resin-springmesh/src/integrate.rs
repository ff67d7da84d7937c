//! Guarded explicit integration.
//!
//! Velocity is advanced from the accumulated force, the new position is
//! staged in `predicted_position`, and the committed velocity is then
//! re-derived from the staged displacement with a small damping factor.
//! Non-finite or runaway values are absorbed per point for one tick.

use std::ops::Add;

use glam::Vec3;

use crate::dispatch;
use crate::point::Point;

/// Hard speed cap in units per second.
pub const MAX_SPEED: f32 = 50.0;

/// Staged positions at or beyond this distance from the origin are rejected.
pub const MAX_POSITION: f32 = 100_000.0;

/// Velocity retained when re-deriving it from the staged displacement.
pub const VELOCITY_RETENTION: f32 = 0.98;

/// What happened to one point during integration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegrationOutcome {
    /// Fixed point; only its force was cleared.
    Fixed,
    /// Position committed normally.
    Committed,
    /// Staged position was non-finite; force and velocity were zeroed.
    NumericReset,
    /// New staged position was rejected; velocity was zeroed.
    RunawayRejected,
}

/// Per-pass tallies of integration outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IntegrationStats {
    /// Points reset because their staged position was non-finite.
    pub numeric_resets: usize,
    /// Points whose new staged position was rejected.
    pub runaway_rejections: usize,
}

impl Add for IntegrationStats {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            numeric_resets: self.numeric_resets + rhs.numeric_resets,
            runaway_rejections: self.runaway_rejections + rhs.runaway_rejections,
        }
    }
}

impl From<IntegrationOutcome> for IntegrationStats {
    fn from(outcome: IntegrationOutcome) -> Self {
        match outcome {
            IntegrationOutcome::NumericReset => Self {
                numeric_resets: 1,
                ..Default::default()
            },
            IntegrationOutcome::RunawayRejected => Self {
                runaway_rejections: 1,
                ..Default::default()
            },
            IntegrationOutcome::Fixed | IntegrationOutcome::Committed => Self::default(),
        }
    }
}

/// Scales `v` down to `MAX_SPEED` if it is faster.
pub fn clamp_speed(v: Vec3) -> Vec3 {
    if v.length_squared() > MAX_SPEED * MAX_SPEED {
        v.normalize_or_zero() * MAX_SPEED
    } else {
        v
    }
}

/// Integrates one point. `dt` must be positive and finite.
pub fn integrate_point(point: &mut Point, dt: f32) -> IntegrationOutcome {
    if point.fixed {
        point.force = Vec3::ZERO;
        return IntegrationOutcome::Fixed;
    }

    if !point.predicted_position.is_finite() {
        point.force = Vec3::ZERO;
        point.velocity = Vec3::ZERO;
        // Re-stage from the committed position so the point moves again next tick.
        if point.position.is_finite() {
            point.predicted_position = point.position;
        }
        return IntegrationOutcome::NumericReset;
    }

    if point.force.is_finite() {
        let acceleration = point.force / point.effective_mass();
        point.velocity = clamp_speed(point.velocity + acceleration * dt);
    }

    let mut outcome = IntegrationOutcome::Committed;
    let predicted = point.position + point.velocity * dt;
    if predicted.is_finite() && predicted.length() < MAX_POSITION {
        point.predicted_position = predicted;
    } else {
        point.velocity = Vec3::ZERO;
        outcome = IntegrationOutcome::RunawayRejected;
    }

    point.force = Vec3::ZERO;

    let velocity = (point.predicted_position - point.position) / dt * VELOCITY_RETENTION;
    point.velocity = clamp_speed(velocity);
    point.position = point.predicted_position;

    outcome
}

/// Integrates every point.
pub fn integrate(points: &mut [Point], dt: f32) -> IntegrationStats {
    dispatch::sum_mut(points, |point| {
        IntegrationStats::from(integrate_point(point, dt))
    })
}
