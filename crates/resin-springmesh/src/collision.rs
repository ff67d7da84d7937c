//! Ground plane collision.

use crate::config::GroundConfig;
use crate::dispatch;
use crate::point::Point;

/// Restitution and friction for a point against the ground.
///
/// Bounce blends by arithmetic mean, friction by geometric mean.
pub fn combined_material(point: &Point, ground: &GroundConfig) -> (f32, f32) {
    let bounce = (point.bounciness + ground.bounce) * 0.5;
    let friction = (point.friction * ground.friction).max(0.0).sqrt();
    (bounce, friction)
}

/// Resolves a single point against the ground. Returns true on contact.
///
/// Fixed points are never moved, even below the plane.
pub fn collide_point(point: &mut Point, ground: &GroundConfig) -> bool {
    if point.fixed || !(point.position.y < ground.level) {
        return false;
    }
    let (bounce, friction) = combined_material(point, ground);

    point.position.y = ground.level;
    point.velocity.x *= friction;
    point.velocity.y = -point.velocity.y * bounce;
    point.velocity.z *= friction;
    true
}

/// Resolves every point below the ground plane. Returns the contact count.
pub fn collide_ground(points: &mut [Point], ground: &GroundConfig) -> usize {
    dispatch::sum_mut(points, |point| usize::from(collide_point(point, ground)))
}
