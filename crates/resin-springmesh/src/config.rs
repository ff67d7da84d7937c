//! Simulation and setup configuration.
//!
//! Configs are plain values passed into each tick; nothing is looked up
//! from global state.

use glam::Vec3;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// World gravity.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GravityConfig {
    /// Acceleration applied to every unfixed point.
    pub acceleration: Vec3,
}

impl Default for GravityConfig {
    fn default() -> Self {
        Self {
            acceleration: Vec3::new(0.0, -9.81, 0.0),
        }
    }
}

impl GravityConfig {
    /// Creates a gravity config from an acceleration vector.
    pub fn new(acceleration: Vec3) -> Self {
        Self { acceleration }
    }
}

/// Flat ground plane at a fixed height.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GroundConfig {
    /// Height of the plane along Y.
    pub level: f32,
    /// Ground restitution (0-1).
    pub bounce: f32,
    /// Ground friction (0-1).
    pub friction: f32,
}

impl Default for GroundConfig {
    fn default() -> Self {
        Self {
            level: 0.0,
            bounce: 0.5,
            friction: 0.5,
        }
    }
}

impl GroundConfig {
    /// Creates a ground plane at the given height with default materials.
    pub fn at(level: f32) -> Self {
        Self {
            level,
            ..Default::default()
        }
    }
}

/// Hard distance bounds applied after integration.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SurfaceBoundConfig {
    /// Allowed compression as a fraction of rest length (0-1).
    pub shrink: f32,
    /// Allowed extension as a fraction of rest length (0-1).
    pub stretch: f32,
}

impl Default for SurfaceBoundConfig {
    fn default() -> Self {
        Self {
            shrink: 0.1,
            stretch: 0.1,
        }
    }
}

impl SurfaceBoundConfig {
    /// Creates bounds, clamping both fractions to [0, 1].
    pub fn new(shrink: f32, stretch: f32) -> Self {
        Self {
            shrink: shrink.clamp(0.0, 1.0),
            stretch: stretch.clamp(0.0, 1.0),
        }
    }

    /// Bounds that pin every connection to its rest length.
    pub fn rigid() -> Self {
        Self::new(0.0, 0.0)
    }

    /// Returns `(min, max)` allowed distances for a rest length.
    pub fn limits(&self, rest_length: f32) -> (f32, f32) {
        (
            rest_length * (1.0 - self.shrink),
            rest_length * (1.0 + self.stretch),
        )
    }
}

/// How spring forces are scattered onto shared points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ForceScatter {
    /// Evaluate connections in parallel, then gather per point over its
    /// incident connections.
    #[default]
    Gather,
    /// Evaluate and scatter connections one at a time.
    Sequential,
}

/// Per-tick simulation settings.
///
/// A `None` pass config disables that pass for the tick.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimulationConfig {
    /// Gravity, if any.
    pub gravity: Option<GravityConfig>,
    /// Ground plane, if any.
    pub ground: Option<GroundConfig>,
    /// Surface bound pass; disabled unless set.
    pub surface_bound: Option<SurfaceBoundConfig>,
    /// Spring force scatter strategy.
    pub force_scatter: ForceScatter,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            gravity: Some(GravityConfig::default()),
            ground: Some(GroundConfig::default()),
            surface_bound: None,
            force_scatter: ForceScatter::default(),
        }
    }
}

impl SimulationConfig {
    /// A config with every optional pass disabled.
    pub fn empty() -> Self {
        Self {
            gravity: None,
            ground: None,
            surface_bound: None,
            force_scatter: ForceScatter::default(),
        }
    }

    /// Sets gravity.
    pub fn with_gravity(mut self, gravity: GravityConfig) -> Self {
        self.gravity = Some(gravity);
        self
    }

    /// Sets the ground plane.
    pub fn with_ground(mut self, ground: GroundConfig) -> Self {
        self.ground = Some(ground);
        self
    }

    /// Enables the surface bound pass.
    pub fn with_surface_bound(mut self, bound: SurfaceBoundConfig) -> Self {
        self.surface_bound = Some(bound);
        self
    }

    /// Sets the spring force scatter strategy.
    pub fn with_force_scatter(mut self, scatter: ForceScatter) -> Self {
        self.force_scatter = scatter;
        self
    }
}

/// Material values given to points created from mesh vertices.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PointDefaults {
    /// Point mass.
    pub mass: f32,
    /// Restitution (0-1).
    pub bounciness: f32,
    /// Friction (0-1).
    pub friction: f32,
}

impl Default for PointDefaults {
    fn default() -> Self {
        Self {
            mass: 1.0,
            bounciness: 0.5,
            friction: 0.5,
        }
    }
}

/// Where a mesh edge's rest length comes from.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RestLength {
    /// Same rest length for every edge.
    Fixed(f32),
    /// Edge length measured at setup.
    FromGeometry,
}

/// Spring values given to connections created from mesh edges.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ConnectionDefaults {
    /// Rest length policy.
    pub rest_length: RestLength,
    /// Hooke spring constant.
    pub spring_constant: f32,
    /// Damper constant along the spring axis.
    pub damper_constant: f32,
}

impl Default for ConnectionDefaults {
    fn default() -> Self {
        Self {
            rest_length: RestLength::Fixed(1.0),
            spring_constant: 100.0,
            damper_constant: 10.0,
        }
    }
}

/// Parameters for building a simulation from a render mesh.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MeshSetup {
    /// Per-point material.
    pub point: PointDefaults,
    /// Per-edge spring.
    pub connection: ConnectionDefaults,
}
