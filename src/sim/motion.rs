//! Integration and wall reflection
//!
//! Entities bounce elastically off the world edges. X and Y are handled
//! independently, so a corner hit reflects both components in one step.

use glam::Vec2;

use super::state::Entity;
use crate::Rect;

/// Clamp one axis so the circle stays inside `[lo, hi]`.
/// Returns the clamped coordinate and whether a wall was hit.
#[inline]
fn clamp_axis(value: f32, radius: f32, lo: f32, hi: f32) -> (f32, bool) {
    if value - radius < lo {
        (lo + radius, true)
    } else if value + radius > hi {
        (hi - radius, true)
    } else {
        (value, false)
    }
}

/// Advance one entity by `vel * speed_scale * dt`, reflecting off the walls
pub fn step_entity(entity: &mut Entity, bounds: &Rect, speed_scale: f32, dt: f32) {
    let mut pos = entity.pos + entity.vel * speed_scale * dt;
    let max = bounds.max();

    let (x, hit_x) = clamp_axis(pos.x, entity.radius, bounds.min.x, max.x);
    if hit_x {
        pos.x = x;
        entity.vel.x = -entity.vel.x;
    }

    let (y, hit_y) = clamp_axis(pos.y, entity.radius, bounds.min.y, max.y);
    if hit_y {
        pos.y = y;
        entity.vel.y = -entity.vel.y;
    }

    entity.pos = pos;
}

/// Advance every entity with a fixed speed scale
pub fn step_all<'a>(
    entities: impl IntoIterator<Item = &'a mut Entity>,
    bounds: &Rect,
    speed_scale: f32,
    dt: f32,
) {
    for entity in entities {
        step_entity(entity, bounds, speed_scale, dt);
    }
}

/// Advance every entity with the speed scale multiplied by `radius / base_radius`,
/// so fused (larger) entities move faster.
pub fn step_all_size_scaled<'a>(
    entities: impl IntoIterator<Item = &'a mut Entity>,
    bounds: &Rect,
    speed_scale: f32,
    base_radius: f32,
    dt: f32,
) {
    for entity in entities {
        let scale = speed_scale * (entity.radius / base_radius);
        step_entity(entity, bounds, scale, dt);
    }
}

/// Move the player along an input direction. The direction is normalized
/// (diagonals are not faster) and the player is clamped to the world without
/// bouncing.
pub fn move_player(player: &mut Entity, direction: Vec2, speed: f32, bounds: &Rect, dt: f32) {
    let dir = direction.normalize_or_zero();
    let pos = player.pos + dir * speed * dt;
    let max = bounds.max();
    let (x, _) = clamp_axis(pos.x, player.radius, bounds.min.x, max.x);
    let (y, _) = clamp_axis(pos.y, player.radius, bounds.min.y, max.y);
    player.pos = Vec2::new(x, y);
}
