//! Seeded enemy placement

use glam::Vec2;
use rand::Rng;

use crate::Rect;

/// A circular no-spawn zone
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SafeZone {
    pub center: Vec2,
    pub radius: f32,
}

/// Uniform position inside `bounds`, resampled while inside `avoid`.
///
/// The caller guarantees the zone does not cover the whole rectangle
/// (`Tuning::validate` enforces this for the world).
pub fn sample_position<R: Rng>(rng: &mut R, bounds: &Rect, avoid: Option<SafeZone>) -> Vec2 {
    let max = bounds.max();
    loop {
        let pos = Vec2::new(
            rng.random_range(bounds.min.x..max.x),
            rng.random_range(bounds.min.y..max.y),
        );
        match avoid {
            Some(zone) if pos.distance(zone.center) < zone.radius => continue,
            _ => return pos,
        }
    }
}

/// Velocity with each component uniform in `[-range, range)`
pub fn sample_velocity<R: Rng>(rng: &mut R, range: f32) -> Vec2 {
    if range <= 0.0 {
        return Vec2::ZERO;
    }
    Vec2::new(rng.random_range(-range..range), rng.random_range(-range..range))
}

/// Accumulates simulated time and fires once per interval
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SpawnTimer {
    pub elapsed: f32,
}

impl SpawnTimer {
    /// Advance by `dt`. Returns `true` (and restarts) when the interval has
    /// elapsed and `can_spawn` allows it; otherwise the time keeps piling up.
    pub fn tick(&mut self, dt: f32, interval: f32, can_spawn: bool) -> bool {
        self.elapsed += dt;
        if self.elapsed >= interval && can_spawn {
            self.elapsed = 0.0;
            true
        } else {
            false
        }
    }

    pub fn reset(&mut self) {
        self.elapsed = 0.0;
    }
}
