//! Hard min/max distance correction per connection.
//!
//! Unlike the spring pass this moves positions directly. Velocities are left
//! as integration produced them.

use glam::Vec3;

use crate::config::SurfaceBoundConfig;
use crate::connection::{Connection, ConnectionWaves};
use crate::dispatch;
use crate::point::Point;

/// Signed amount by which `distance` lies outside `[min, max]`.
pub fn bound_error(distance: f32, min: f32, max: f32) -> f32 {
    if distance > max {
        distance - max
    } else if distance < min {
        distance - min
    } else {
        0.0
    }
}

/// Half-correction to add to `a` and subtract from `b`, if any.
pub fn bound_correction(
    a: Vec3,
    b: Vec3,
    connection: &Connection,
    bound: &SurfaceBoundConfig,
) -> Option<Vec3> {
    let (min, max) = bound.limits(connection.rest_length);
    let delta = b - a;
    let error = bound_error(delta.length(), min, max);
    if error == 0.0 {
        return None;
    }
    let direction = delta.normalize_or_zero();
    if direction == Vec3::ZERO {
        return None;
    }
    Some(direction * error * 0.5)
}

/// Applies bounds wave by wave. Returns the number of corrections made.
///
/// Corrections within a wave are computed in parallel against the positions
/// left by the previous wave. No point appears twice in a wave, so applying
/// them is order-independent. Fixed endpoints are never displaced.
pub fn apply_surface_bound(
    points: &mut [Point],
    connections: &[Connection],
    waves: &ConnectionWaves,
    bound: &SurfaceBoundConfig,
) -> usize {
    let mut applied = 0;
    for wave in waves.waves() {
        let corrections: Vec<Option<Vec3>> = {
            let points: &[Point] = points;
            dispatch::map(wave, |&ci| {
                let c = &connections[ci];
                bound_correction(points[c.a].position, points[c.b].position, c, bound)
            })
        };

        for (&ci, correction) in wave.iter().zip(corrections) {
            let Some(half) = correction else {
                continue;
            };
            let c = &connections[ci];
            displace(&mut points[c.a], half);
            displace(&mut points[c.b], -half);
            applied += 1;
        }
    }
    applied
}

fn displace(point: &mut Point, offset: Vec3) {
    if point.fixed {
        return;
    }
    point.position += offset;
    point.predicted_position = point.position;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::ConnectionParams;

    const RIGID: SurfaceBoundConfig = SurfaceBoundConfig {
        shrink: 0.0,
        stretch: 0.0,
    };

    fn connection(a: usize, b: usize) -> Connection {
        Connection::new(a, b, ConnectionParams::new(1.0, 100.0, 10.0))
    }

    #[test]
    fn test_bound_error() {
        assert_eq!(bound_error(1.0, 0.9, 1.1), 0.0);
        assert!((bound_error(1.5, 0.9, 1.1) - 0.4).abs() < 1e-6);
        assert!((bound_error(0.5, 0.9, 1.1) + 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_rigid_bound_restores_rest_length() {
        for distance in [0.2, 0.999, 1.0, 1.7, 25.0] {
            let start = Vec3::new(0.3, 1.0, -2.0);
            let end = start + Vec3::new(0.6, 0.0, 0.8) * distance;
            let mut points = vec![Point::new(start, 1.0), Point::new(end, 1.0)];
            let connections = vec![connection(0, 1)];
            let waves = ConnectionWaves::build(2, &connections);

            apply_surface_bound(&mut points, &connections, &waves, &RIGID);

            let d = (points[1].position - points[0].position).length();
            assert!((d - 1.0).abs() < 1e-5, "distance {} -> {}", distance, d);
        }
    }

    #[test]
    fn test_correction_is_symmetric() {
        let mut points = vec![
            Point::new(Vec3::ZERO, 1.0),
            Point::new(Vec3::new(3.0, 0.0, 0.0), 1.0),
        ];
        let connections = vec![connection(0, 1)];
        let waves = ConnectionWaves::build(2, &connections);

        apply_surface_bound(&mut points, &connections, &waves, &RIGID);

        assert!((points[0].position.x - 1.0).abs() < 1e-5);
        assert!((points[1].position.x - 2.0).abs() < 1e-5);
        assert_eq!(points[0].predicted_position, points[0].position);
    }

    #[test]
    fn test_within_bounds_untouched() {
        let mut points = vec![
            Point::new(Vec3::ZERO, 1.0),
            Point::new(Vec3::new(1.05, 0.0, 0.0), 1.0),
        ];
        let connections = vec![connection(0, 1)];
        let waves = ConnectionWaves::build(2, &connections);

        let applied = apply_surface_bound(
            &mut points,
            &connections,
            &waves,
            &SurfaceBoundConfig::default(),
        );

        assert_eq!(applied, 0);
        assert_eq!(points[1].position.x, 1.05);
    }

    #[test]
    fn test_velocity_not_rederived() {
        let mut points = vec![
            Point::new(Vec3::ZERO, 1.0),
            Point::new(Vec3::new(2.0, 0.0, 0.0), 1.0),
        ];
        points[1].velocity = Vec3::new(5.0, 0.0, 0.0);
        let connections = vec![connection(0, 1)];
        let waves = ConnectionWaves::build(2, &connections);

        apply_surface_bound(&mut points, &connections, &waves, &RIGID);

        assert_eq!(points[0].velocity, Vec3::ZERO);
        assert_eq!(points[1].velocity, Vec3::new(5.0, 0.0, 0.0));
    }

    #[test]
    fn test_fixed_endpoint_stays() {
        let mut points = vec![
            Point::fixed(Vec3::ZERO),
            Point::new(Vec3::new(3.0, 0.0, 0.0), 1.0),
        ];
        let connections = vec![connection(0, 1)];
        let waves = ConnectionWaves::build(2, &connections);

        apply_surface_bound(&mut points, &connections, &waves, &RIGID);

        assert_eq!(points[0].position, Vec3::ZERO);
        assert!((points[1].position.x - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_disjoint_connections_all_exact() {
        // Three independent segments at assorted lengths.
        let mut points = Vec::new();
        let mut connections = Vec::new();
        for (i, len) in [0.1f32, 2.0, 7.5].into_iter().enumerate() {
            let origin = Vec3::new(0.0, i as f32 * 10.0, 0.0);
            points.push(Point::new(origin, 1.0));
            points.push(Point::new(origin + Vec3::new(0.0, 0.0, len), 1.0));
            connections.push(connection(2 * i, 2 * i + 1));
        }
        let waves = ConnectionWaves::build(points.len(), &connections);
        assert_eq!(waves.len(), 1);

        apply_surface_bound(&mut points, &connections, &waves, &RIGID);

        for c in &connections {
            let d = (points[c.b].position - points[c.a].position).length();
            assert!((d - 1.0).abs() < 1e-5);
        }
    }
}
