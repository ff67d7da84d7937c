//! Gravity and spring force passes.

use glam::Vec3;

use crate::config::{ForceScatter, GravityConfig};
use crate::connection::{Connection, Incidence};
use crate::dispatch;
use crate::point::Point;

/// Adds `gravity * dt` to the velocity of every unfixed point.
pub fn apply_gravity(points: &mut [Point], gravity: &GravityConfig, dt: f32) {
    let dv = gravity.acceleration * dt;
    dispatch::for_each_mut(points, |point| {
        if !point.fixed {
            point.velocity += dv;
        }
    });
}

/// Spring plus damping force a connection exerts on its `a` endpoint.
///
/// Endpoint `b` receives the negation. Returns `None` when the endpoints
/// coincide, since the spring axis is undefined.
pub fn spring_force(a: &Point, b: &Point, connection: &Connection) -> Option<Vec3> {
    let delta = b.position - a.position;
    let distance = delta.length();
    if !(distance > 0.0) {
        return None;
    }
    let direction = delta / distance;

    let stretch = distance - connection.rest_length;
    let spring = direction * (connection.spring_constant * stretch);

    let relative_velocity = b.velocity - a.velocity;
    let damping = direction * (connection.damper_constant * relative_velocity.dot(direction));

    Some(spring + damping)
}

/// Accumulates spring forces into the point force fields.
///
/// Returns the number of degenerate connections skipped.
pub fn accumulate_spring_forces(
    points: &mut [Point],
    connections: &[Connection],
    incidence: &Incidence,
    scatter: ForceScatter,
) -> usize {
    match scatter {
        ForceScatter::Gather => gather(points, connections, incidence),
        ForceScatter::Sequential => scatter_sequential(points, connections),
    }
}

fn gather(points: &mut [Point], connections: &[Connection], incidence: &Incidence) -> usize {
    let forces: Vec<Option<Vec3>> = {
        let points: &[Point] = points;
        dispatch::map(connections, |c| spring_force(&points[c.a], &points[c.b], c))
    };
    let skipped = forces.iter().filter(|f| f.is_none()).count();

    dispatch::for_each_indexed_mut(points, |i, point| {
        for &(ci, sign) in incidence.of(i) {
            if let Some(force) = forces[ci] {
                point.force += force * sign;
            }
        }
    });

    skipped
}

fn scatter_sequential(points: &mut [Point], connections: &[Connection]) -> usize {
    let mut skipped = 0;
    for c in connections {
        match spring_force(&points[c.a], &points[c.b], c) {
            Some(force) => {
                points[c.a].force += force;
                points[c.b].force -= force;
            }
            None => skipped += 1,
        }
    }
    skipped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::ConnectionParams;

    fn pair(distance: f32) -> (Vec<Point>, Vec<Connection>) {
        let points = vec![
            Point::new(Vec3::ZERO, 1.0),
            Point::new(Vec3::new(distance, 0.0, 0.0), 1.0),
        ];
        let params = ConnectionParams::new(1.0, 100.0, 0.0);
        let connections = vec![Connection::new(0, 1, params)];
        (points, connections)
    }

    #[test]
    fn test_gravity_skips_fixed() {
        let mut points = vec![Point::new(Vec3::ZERO, 1.0), Point::fixed(Vec3::X)];
        apply_gravity(&mut points, &GravityConfig::default(), 0.5);

        assert!((points[0].velocity.y + 4.905).abs() < 1e-5);
        assert_eq!(points[1].velocity, Vec3::ZERO);
    }

    #[test]
    fn test_stretched_spring_pulls_together() {
        let (points, connections) = pair(2.0);
        let force = spring_force(&points[0], &points[1], &connections[0]).unwrap();

        // Stretched by 1.0 with k = 100: A is pulled toward B.
        assert!((force - Vec3::new(100.0, 0.0, 0.0)).length() < 1e-4);
    }

    #[test]
    fn test_compressed_spring_pushes_apart() {
        let (points, connections) = pair(0.5);
        let force = spring_force(&points[0], &points[1], &connections[0]).unwrap();
        assert!(force.x < 0.0);
    }

    #[test]
    fn test_damping_along_axis_only() {
        let (mut points, _) = pair(1.0);
        points[1].velocity = Vec3::new(2.0, 3.0, 0.0);
        let connection = Connection::new(0, 1, ConnectionParams::new(1.0, 0.0, 10.0));

        let force = spring_force(&points[0], &points[1], &connection).unwrap();

        // Only the x component of relative velocity lies along the spring.
        assert!((force - Vec3::new(20.0, 0.0, 0.0)).length() < 1e-4);
    }

    #[test]
    fn test_coincident_points_skipped() {
        let (mut points, connections) = pair(0.0);
        let incidence = Incidence::build(2, &connections);

        let skipped =
            accumulate_spring_forces(&mut points, &connections, &incidence, ForceScatter::Gather);

        assert_eq!(skipped, 1);
        assert_eq!(points[0].force, Vec3::ZERO);
        assert_eq!(points[1].force, Vec3::ZERO);
    }

    #[test]
    fn test_equal_and_opposite() {
        let mut points = vec![
            Point::new(Vec3::new(0.0, 0.0, 0.0), 1.0),
            Point::new(Vec3::new(1.3, 0.2, -0.4), 1.0),
        ];
        points[0].velocity = Vec3::new(0.5, -1.0, 0.25);
        points[1].velocity = Vec3::new(-2.0, 0.3, 1.0);
        let connections = vec![Connection::new(0, 1, ConnectionParams::new(0.8, 50.0, 4.0))];
        let incidence = Incidence::build(2, &connections);

        accumulate_spring_forces(&mut points, &connections, &incidence, ForceScatter::Gather);

        assert!((points[0].force + points[1].force).length() < 1e-5);
        assert!(points[0].force.length() > 0.0);
    }

    #[test]
    fn test_scatter_strategies_agree() {
        // Shared endpoints: a small triangle fan.
        let positions = [
            Vec3::ZERO,
            Vec3::new(1.5, 0.0, 0.0),
            Vec3::new(0.0, 1.2, 0.3),
            Vec3::new(-0.7, -0.4, 1.1),
        ];
        let base: Vec<Point> = positions
            .iter()
            .enumerate()
            .map(|(i, &p)| {
                let mut point = Point::new(p, 1.0);
                point.velocity = Vec3::new(i as f32, -(i as f32) * 0.5, 0.2);
                point
            })
            .collect();
        let params = ConnectionParams::new(1.0, 80.0, 5.0);
        let connections = vec![
            Connection::new(0, 1, params),
            Connection::new(0, 2, params),
            Connection::new(0, 3, params),
            Connection::new(1, 2, params),
            Connection::new(2, 3, params),
            Connection::new(1, 2, params),
        ];
        let incidence = Incidence::build(4, &connections);

        let mut gathered = base.clone();
        accumulate_spring_forces(
            &mut gathered,
            &connections,
            &incidence,
            ForceScatter::Gather,
        );
        let mut sequential = base;
        accumulate_spring_forces(
            &mut sequential,
            &connections,
            &incidence,
            ForceScatter::Sequential,
        );

        let mut total = Vec3::ZERO;
        for (g, s) in gathered.iter().zip(&sequential) {
            assert!((g.force - s.force).length() < 1e-3);
            total += g.force;
        }
        // Internal forces cancel across the whole network.
        assert!(total.length() < 1e-3);
    }
}
