//! Point and connection arenas plus the per-tick pipeline.

use glam::Vec3;
use tracing::{debug, trace, warn};

use crate::collision::collide_ground;
use crate::config::SimulationConfig;
use crate::connection::{Connection, ConnectionParams, ConnectionWaves, Incidence};
use crate::error::{SetupError, SetupResult};
use crate::forces::{accumulate_spring_forces, apply_gravity};
use crate::integrate::integrate;
use crate::point::Point;
use crate::surface::apply_surface_bound;

/// Summary of one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickReport {
    /// The tick was skipped because `dt` was unusable.
    pub skipped: bool,
    /// Connections whose endpoints coincided.
    pub degenerate_connections: usize,
    /// Points resolved against the ground.
    pub ground_contacts: usize,
    /// Points reset for a non-finite staged position.
    pub numeric_resets: usize,
    /// Points whose new staged position was rejected.
    pub runaway_rejections: usize,
    /// Surface bound corrections applied.
    pub bound_corrections: usize,
}

impl TickReport {
    /// Returns true if any point needed a numeric fail-safe this tick.
    pub fn absorbed_instability(&self) -> bool {
        self.numeric_resets > 0 || self.runaway_rejections > 0
    }
}

#[derive(Debug, Clone, Default)]
struct Topology {
    incidence: Incidence,
    waves: ConnectionWaves,
}

impl Topology {
    fn build(points: usize, connections: &[Connection]) -> Self {
        let topology = Self {
            incidence: Incidence::build(points, connections),
            waves: ConnectionWaves::build(points, connections),
        };
        debug!(
            points,
            connections = connections.len(),
            waves = topology.waves.len(),
            "built spring topology"
        );
        topology
    }
}

/// A mass-spring network.
///
/// Points and connections are addressed by stable indices; connections never
/// own points.
#[derive(Debug, Clone, Default)]
pub struct SpringMesh {
    points: Vec<Point>,
    connections: Vec<Connection>,
    topology: Option<Topology>,
}

impl SpringMesh {
    /// Creates an empty network.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty network with reserved capacity.
    pub fn with_capacity(points: usize, connections: usize) -> Self {
        Self {
            points: Vec::with_capacity(points),
            connections: Vec::with_capacity(connections),
            topology: None,
        }
    }

    /// Adds a point and returns its index.
    pub fn add_point(&mut self, point: Point) -> usize {
        let index = self.points.len();
        self.points.push(point);
        self.topology = None;
        index
    }

    /// Connects two existing points and returns the connection index.
    pub fn add_connection(
        &mut self,
        a: usize,
        b: usize,
        params: ConnectionParams,
    ) -> SetupResult<usize> {
        let count = self.points.len();
        for index in [a, b] {
            if index >= count {
                return Err(SetupError::PointOutOfBounds { index, count });
            }
        }
        params.validate()?;

        let index = self.connections.len();
        self.connections.push(Connection::new(a, b, params));
        self.topology = None;
        Ok(index)
    }

    /// Fixes points in place. Out-of-range indices are ignored.
    pub fn fix_points(&mut self, indices: &[usize]) {
        for &i in indices {
            if let Some(point) = self.points.get_mut(i) {
                point.fixed = true;
            }
        }
    }

    /// Releases fixed points. Out-of-range indices are ignored.
    pub fn unfix_points(&mut self, indices: &[usize]) {
        for &i in indices {
            if let Some(point) = self.points.get_mut(i) {
                point.fixed = false;
            }
        }
    }

    /// Returns every point to its initial position at rest.
    pub fn reset(&mut self) {
        for point in &mut self.points {
            point.reset();
        }
    }

    /// Returns the number of points.
    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    /// Returns the number of connections.
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Gets a point by index.
    pub fn point(&self, index: usize) -> Option<&Point> {
        self.points.get(index)
    }

    /// Gets a mutable point by index.
    pub fn point_mut(&mut self, index: usize) -> Option<&mut Point> {
        self.points.get_mut(index)
    }

    /// Returns all points.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Returns all connections.
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// Committed point positions, in point order.
    pub fn positions(&self) -> Vec<Vec3> {
        self.points.iter().map(|p| p.position).collect()
    }

    /// Writes committed positions into `out`, reusing its allocation.
    pub fn write_positions(&self, out: &mut Vec<Vec3>) {
        out.clear();
        out.extend(self.points.iter().map(|p| p.position));
    }

    /// Number of race-free connection waves.
    pub fn wave_count(&mut self) -> usize {
        let points = self.points.len();
        self.topology
            .get_or_insert_with(|| Topology::build(points, &self.connections))
            .waves
            .len()
    }

    /// Advances the simulation by one tick.
    ///
    /// Passes run in order, each completing before the next starts:
    /// gravity, spring forces, ground collision, integration and, if
    /// enabled, surface bounds. A missing pass config skips that pass.
    /// A non-positive or non-finite `dt` skips the whole tick.
    pub fn tick(&mut self, config: &SimulationConfig, dt: f32) -> TickReport {
        if !(dt.is_finite() && dt > 0.0) {
            warn!(dt, "skipping tick with unusable time step");
            return TickReport {
                skipped: true,
                ..Default::default()
            };
        }

        let point_count = self.points.len();
        let topology = self
            .topology
            .get_or_insert_with(|| Topology::build(point_count, &self.connections));
        let points = &mut self.points;
        let connections = &self.connections;
        let mut report = TickReport::default();

        if let Some(gravity) = &config.gravity {
            apply_gravity(points, gravity, dt);
        }

        report.degenerate_connections = accumulate_spring_forces(
            points,
            connections,
            &topology.incidence,
            config.force_scatter,
        );

        if let Some(ground) = &config.ground {
            report.ground_contacts = collide_ground(points, ground);
        }

        let stats = integrate(points, dt);
        report.numeric_resets = stats.numeric_resets;
        report.runaway_rejections = stats.runaway_rejections;

        if let Some(bound) = &config.surface_bound {
            report.bound_corrections =
                apply_surface_bound(points, connections, &topology.waves, bound);
        }

        if report.absorbed_instability() {
            debug!(
                resets = report.numeric_resets,
                rejections = report.runaway_rejections,
                "absorbed numeric instability"
            );
        }
        trace!(?report, "tick");

        report
    }

    /// Advances `n` ticks and returns the last report.
    pub fn ticks(&mut self, config: &SimulationConfig, dt: f32, n: usize) -> TickReport {
        let mut report = TickReport::default();
        for _ in 0..n {
            report = self.tick(config, dt);
        }
        report
    }
}
