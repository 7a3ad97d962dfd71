//! Overlap detection through the spatial index
//!
//! The index only answers "whose position is inside this square". Every
//! candidate is confirmed with an exact circle test before it counts.

use glam::Vec2;

use super::quadtree::QuadTree;
use super::state::EntityStore;
use crate::Rect;

/// Distance test used to flag two enemies as colliding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DetectionRule {
    /// Overlap when center distance < r1 + r2
    #[default]
    SumOfRadii,
    /// Overlap when center distance < 2 × the querying entity's radius
    /// (uniform-size debug population)
    TwiceRadius,
}

impl DetectionRule {
    #[inline]
    fn overlaps(self, a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
        let dist = a.distance(b);
        match self {
            DetectionRule::SumOfRadii => dist < ra + rb,
            DetectionRule::TwiceRadius => dist < 2.0 * ra,
        }
    }
}

/// Flag every overlapping enemy pair as colliding.
///
/// Each enemy queries a square of side `query_scale × radius` around itself.
/// Returns the number of overlaps observed; a pair is usually seen from both
/// sides and counted twice.
pub fn detect_collisions(
    store: &mut EntityStore,
    tree: &QuadTree,
    rule: DetectionRule,
    query_scale: f32,
) -> usize {
    let mut candidates = Vec::new();
    let mut overlaps = 0;

    for i in 0..store.len() {
        let (pos, radius) = {
            let e = &store.enemies()[i];
            (e.pos, e.radius)
        };
        let range = Rect::from_center(pos, radius * query_scale);
        store.query(tree, &range, &mut candidates);

        for &j in &candidates {
            if j == i {
                continue;
            }
            let other = &store.enemies()[j];
            if rule.overlaps(pos, radius, other.pos, other.radius) {
                for slot in [i, j] {
                    if let Some(e) = store.enemy_mut(slot) {
                        e.colliding = true;
                    }
                }
                overlaps += 1;
            }
        }
    }

    overlaps
}

/// Check the player against nearby enemies (sum of radii).
///
/// Searches a square of side `query_side` centered on the player. On the
/// first overlap the player is flagged as colliding and `true` is returned.
/// Without a player this is always `false`.
pub fn player_hit(store: &mut EntityStore, tree: &QuadTree, query_side: f32) -> bool {
    let Some((pos, radius)) = store.player.as_ref().map(|p| (p.pos, p.radius)) else {
        return false;
    };

    let mut candidates = Vec::new();
    store.query(tree, &Rect::from_center(pos, query_side), &mut candidates);

    let hit = candidates.iter().any(|&j| {
        let enemy = &store.enemies()[j];
        crate::circles_overlap(pos, radius, enemy.pos, enemy.radius)
    });

    if hit {
        if let Some(player) = &mut store.player {
            player.colliding = true;
        }
    }
    hit
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world() -> Rect {
        Rect::new(0.0, 0.0, 800.0, 600.0)
    }

    fn indexed(store: &EntityStore) -> QuadTree {
        let mut tree = QuadTree::new(world(), 4);
        store.build_index(&mut tree, world());
        tree
    }

    #[test]
    fn test_close_pair_flags_both() {
        let mut store = EntityStore::new();
        store.spawn_enemy(Vec2::new(100.0, 100.0), 6.0, Vec2::new(1.0, 0.0));
        store.spawn_enemy(Vec2::new(104.0, 100.0), 6.0, Vec2::new(-1.0, 0.0));
        store.spawn_enemy(Vec2::new(300.0, 300.0), 6.0, Vec2::ZERO);
        let tree = indexed(&store);

        let overlaps = detect_collisions(&mut store, &tree, DetectionRule::TwiceRadius, 4.0);
        assert_eq!(overlaps, 2);
        assert!(store.enemies()[0].colliding);
        assert!(store.enemies()[1].colliding);
        assert!(!store.enemies()[2].colliding);
    }

    #[test]
    fn test_rule_thresholds_differ() {
        // Radii 6 and 2, centers 10 apart: TwiceRadius(6) says yes for the big one,
        // SumOfRadii (8) says no
        let mut store = EntityStore::new();
        store.spawn_enemy(Vec2::new(100.0, 100.0), 6.0, Vec2::ZERO);
        store.spawn_enemy(Vec2::new(110.0, 100.0), 2.0, Vec2::ZERO);
        let tree = indexed(&store);

        assert_eq!(detect_collisions(&mut store, &tree, DetectionRule::SumOfRadii, 4.0), 0);
        assert!(!store.enemies()[0].colliding);

        assert_eq!(detect_collisions(&mut store, &tree, DetectionRule::TwiceRadius, 4.0), 1);
        assert!(store.enemies()[0].colliding && store.enemies()[1].colliding);
    }

    #[test]
    fn test_candidate_outside_query_square_is_ignored() {
        // Overlapping circles, but the small query square does not reach the other center
        let mut store = EntityStore::new();
        store.spawn_enemy(Vec2::new(100.0, 100.0), 6.0, Vec2::ZERO);
        store.spawn_enemy(Vec2::new(111.0, 100.0), 6.0, Vec2::ZERO);
        let tree = indexed(&store);

        assert_eq!(detect_collisions(&mut store, &tree, DetectionRule::SumOfRadii, 1.0), 0);
        assert_eq!(detect_collisions(&mut store, &tree, DetectionRule::SumOfRadii, 4.0), 2);
    }

    #[test]
    fn test_player_hit() {
        let mut store = EntityStore::new();
        store.set_player(Vec2::new(400.0, 300.0), 9.0);
        store.spawn_enemy(Vec2::new(450.0, 300.0), 6.0, Vec2::ZERO);
        let tree = indexed(&store);
        assert!(!player_hit(&mut store, &tree, 200.0));
        assert!(!store.player.as_ref().is_some_and(|p| p.colliding));

        store.spawn_enemy(Vec2::new(410.0, 300.0), 6.0, Vec2::ZERO);
        let tree = indexed(&store);
        assert!(player_hit(&mut store, &tree, 200.0));
        assert!(store.player.as_ref().is_some_and(|p| p.colliding));
        // Detection never removes anything
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_player_hit_without_player() {
        let mut store = EntityStore::new();
        store.spawn_enemy(Vec2::new(410.0, 300.0), 6.0, Vec2::ZERO);
        let tree = indexed(&store);
        assert!(!player_hit(&mut store, &tree, 200.0));
    }
}
