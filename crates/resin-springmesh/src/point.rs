//! Simulated mass points.

use glam::Vec3;

use crate::config::PointDefaults;

/// A mass node in the spring network.
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    /// Committed position.
    pub position: Vec3,
    /// Velocity in units per second.
    pub velocity: Vec3,
    /// Force accumulator, cleared once per tick by integration.
    pub force: Vec3,
    /// Mass. Integration never divides by less than 1.
    pub mass: f32,
    /// Fixed points never move.
    pub fixed: bool,
    /// Restitution against the ground (0-1).
    pub bounciness: f32,
    /// Friction against the ground (0-1).
    pub friction: f32,
    /// Integration staging position.
    pub predicted_position: Vec3,
    /// Position at creation.
    pub initial_position: Vec3,
}

impl Point {
    /// Creates a free point at rest.
    pub fn new(position: Vec3, mass: f32) -> Self {
        let defaults = PointDefaults::default();
        Self {
            position,
            velocity: Vec3::ZERO,
            force: Vec3::ZERO,
            mass,
            fixed: false,
            bounciness: defaults.bounciness,
            friction: defaults.friction,
            predicted_position: position,
            initial_position: position,
        }
    }

    /// Creates a fixed point.
    pub fn fixed(position: Vec3) -> Self {
        Self {
            fixed: true,
            ..Self::new(position, PointDefaults::default().mass)
        }
    }

    /// Creates a point with the given material.
    pub fn with_defaults(position: Vec3, defaults: &PointDefaults) -> Self {
        Self {
            bounciness: defaults.bounciness.clamp(0.0, 1.0),
            friction: defaults.friction.clamp(0.0, 1.0),
            ..Self::new(position, defaults.mass)
        }
    }

    /// Sets ground material values, clamped to [0, 1].
    pub fn with_material(mut self, bounciness: f32, friction: f32) -> Self {
        self.bounciness = bounciness.clamp(0.0, 1.0);
        self.friction = friction.clamp(0.0, 1.0);
        self
    }

    /// Mass used for acceleration.
    pub fn effective_mass(&self) -> f32 {
        self.mass.max(1.0)
    }

    /// Returns the point to its creation state.
    pub fn reset(&mut self) {
        self.position = self.initial_position;
        self.predicted_position = self.initial_position;
        self.velocity = Vec3::ZERO;
        self.force = Vec3::ZERO;
    }
}
