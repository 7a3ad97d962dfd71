//! Quad Fusion - quadtree-accelerated circle collision and fusion
//!
//! Core modules:
//! - `sim`: Deterministic simulation (spatial index, motion, detection, fusion)
//! - `settings`: Data-driven tunables loaded from JSON
//! - `hud`: Presentation helpers (stage palette, time formatting)

pub mod hud;
pub mod settings;
pub mod sim;

pub use settings::{ConfigError, Tuning};

use glam::Vec2;

/// Simulation configuration constants
pub mod consts {
    /// Fixed frame step used by the headless driver (60 Hz)
    pub const FRAME_DT: f32 = 1.0 / 60.0;

    /// World dimensions
    pub const WORLD_WIDTH: f32 = 800.0;
    pub const WORLD_HEIGHT: f32 = 600.0;

    /// Quadtree node capacity before subdivision
    pub const NODE_CAPACITY: usize = 4;
    /// Deepest subdivision level; leaves at this depth overflow instead of splitting
    pub const MAX_DEPTH: u32 = 12;

    /// Base entity radius
    pub const ENTITY_RADIUS: f32 = 6.0;
    /// Side of the square query rectangle, as a multiple of the entity radius
    pub const QUERY_SCALE: f32 = 4.0;
    /// Velocity units are multiplied by this before integrating (pixels/s)
    pub const SPEED_SCALE: f32 = 100.0;

    /// Fusion requires center distance below this fraction of the radius sum
    pub const FUSION_THRESHOLD: f32 = 0.9;
    /// Highest fusion tier
    pub const MAX_FUSION_STAGE: u8 = 5;

    /// Arcade population
    pub const MAX_ENEMIES: usize = 80;
    pub const ARCADE_INITIAL_ENEMIES: usize = 45;
    /// Seconds of simulated time between arcade spawns
    pub const SPAWN_INTERVAL: f32 = 3.0;
    /// Enemies never spawn closer than this to the world center
    pub const SAFE_RADIUS: f32 = 100.0;
    /// Enemy velocity components are drawn from [-range, range)
    pub const ARCADE_VELOCITY_RANGE: f32 = 50.0 / 80.0;

    /// Player defaults
    pub const PLAYER_RADIUS_SCALE: f32 = 1.5;
    pub const PLAYER_SPEED: f32 = 200.0;
    /// Side of the square searched around the player for lethal contacts
    pub const PLAYER_QUERY_SIDE: f32 = 200.0;

    /// Debug (free-roaming) mode population
    pub const DEBUG_ENTITY_COUNT: usize = 80;
    pub const DEBUG_VELOCITY_RANGE: f32 = 1.0;
}

/// Axis-aligned rectangle with a top-left origin (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            min: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    /// Square of side `side` centered on `center`
    pub fn from_center(center: Vec2, side: f32) -> Self {
        let half = side / 2.0;
        Self {
            min: center - Vec2::splat(half),
            size: Vec2::splat(side),
        }
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        self.min + self.size
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.size.x
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.size.y
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.min + self.size * 0.5
    }

    /// Half-open point containment: a point on a shared edge belongs to
    /// exactly one of two adjacent rectangles.
    #[inline]
    pub fn contains(&self, p: Vec2) -> bool {
        let max = self.max();
        p.x >= self.min.x && p.x < max.x && p.y >= self.min.y && p.y < max.y
    }

    /// Interiors overlap (touching edges do not count)
    #[inline]
    pub fn intersects(&self, other: &Rect) -> bool {
        let a = self.max();
        let b = other.max();
        self.min.x < b.x && other.min.x < a.x && self.min.y < b.y && other.min.y < a.y
    }

    /// Four exact quadrants in NW, NE, SW, SE order
    pub fn quadrants(&self) -> [Rect; 4] {
        let half = self.size * 0.5;
        let (x, y) = (self.min.x, self.min.y);
        [
            Rect::new(x, y, half.x, half.y),
            Rect::new(x + half.x, y, half.x, half.y),
            Rect::new(x, y + half.y, half.x, half.y),
            Rect::new(x + half.x, y + half.y, half.x, half.y),
        ]
    }
}

/// The default playfield
pub fn default_world() -> Rect {
    Rect::new(0.0, 0.0, consts::WORLD_WIDTH, consts::WORLD_HEIGHT)
}

/// Circles overlap strictly (tangent circles do not)
#[inline]
pub fn circles_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    a.distance(b) < ra + rb
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_contains_half_open() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(r.contains(Vec2::new(0.0, 0.0)));
        assert!(r.contains(Vec2::new(9.99, 5.0)));
        assert!(!r.contains(Vec2::new(10.0, 5.0)));
        assert!(!r.contains(Vec2::new(5.0, -0.01)));
    }

    #[test]
    fn test_quadrants_partition_parent() {
        let r = Rect::new(0.0, 0.0, 800.0, 600.0);
        let [nw, ne, sw, se] = r.quadrants();
        assert_eq!(nw, Rect::new(0.0, 0.0, 400.0, 300.0));
        assert_eq!(ne, Rect::new(400.0, 0.0, 400.0, 300.0));
        assert_eq!(sw, Rect::new(0.0, 300.0, 400.0, 300.0));
        assert_eq!(se, Rect::new(400.0, 300.0, 400.0, 300.0));

        // The shared center point lands in exactly one quadrant
        let center = r.center();
        let owners = r.quadrants().iter().filter(|q| q.contains(center)).count();
        assert_eq!(owners, 1);
    }

    #[test]
    fn test_rect_intersects() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(a.intersects(&Rect::new(5.0, 5.0, 10.0, 10.0)));
        assert!(!a.intersects(&Rect::new(10.0, 0.0, 5.0, 5.0)));
        assert!(a.intersects(&Rect::from_center(Vec2::new(0.0, 0.0), 4.0)));
    }

    #[test]
    fn test_circles_overlap() {
        assert!(circles_overlap(Vec2::ZERO, 6.0, Vec2::new(4.0, 0.0), 6.0));
        assert!(!circles_overlap(Vec2::ZERO, 6.0, Vec2::new(12.0, 0.0), 6.0));
    }
}
