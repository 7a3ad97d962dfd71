//! Per-frame simulation step
//!
//! Frame order is fixed: move, rebuild the index, query it, mutate the
//! entity set, and rebuild again before anything else reads the index.

use glam::Vec2;
use rand_pcg::Pcg32;

use super::fusion::{FusionParams, resolve_fusions};
use super::motion::{move_player, step_all, step_all_size_scaled};
use super::proximity::{DetectionRule, detect_collisions, player_hit};
use super::quadtree::QuadTree;
use super::spawn::{SafeZone, SpawnTimer, sample_position, sample_velocity};
use super::state::{Entity, EntityStore, RngState};
use crate::{Rect, Tuning};

/// Player input for one arcade frame
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ArcadeInput {
    /// Raw movement direction (normalized by the step, zero = stand still)
    pub direction: Vec2,
}

/// What happened during one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameReport {
    /// Overlaps flagged by the collision detector
    pub collisions: usize,
    pub fusions: usize,
    pub removed: usize,
    pub spawned: usize,
    /// Entities the index refused (out of bounds)
    pub unindexed: usize,
    pub game_over: bool,
}

/// Free-roaming population with overlap highlighting and no player
#[derive(Debug, Clone)]
pub struct DebugSim {
    pub tuning: Tuning,
    pub store: EntityStore,
    pub rng_state: RngState,
    tree: QuadTree,
    rng: Pcg32,
}

impl DebugSim {
    pub fn new(tuning: Tuning, seed: u64) -> Self {
        let rng_state = RngState::new(seed);
        let tree = QuadTree::with_max_depth(tuning.world(), tuning.node_capacity, tuning.max_depth);
        let mut sim = Self {
            rng: rng_state.to_rng(),
            rng_state,
            store: EntityStore::new(),
            tree,
            tuning,
        };
        sim.populate();
        sim
    }

    fn populate(&mut self) {
        let world = self.tuning.world();
        for _ in 0..self.tuning.debug_entity_count {
            let pos = sample_position(&mut self.rng, &world, None);
            let vel = sample_velocity(&mut self.rng, self.tuning.debug_velocity_range);
            self.store.spawn_enemy(pos, self.tuning.entity_radius, vel);
        }
        self.store.build_index(&mut self.tree, world);
        log::info!("Debug mode: {} entities", self.store.len());
    }

    /// Advance one frame
    pub fn step(&mut self, dt: f32) -> FrameReport {
        let dt = dt.max(0.0);
        let world = self.tuning.world();

        self.store.clear_colliding();
        step_all(self.store.enemies_mut(), &world, self.tuning.speed_scale, dt);

        let indexed = self.store.build_index(&mut self.tree, world);
        let collisions = detect_collisions(
            &mut self.store,
            &self.tree,
            DetectionRule::TwiceRadius,
            self.tuning.query_scale,
        );

        FrameReport {
            collisions,
            unindexed: self.store.len() - indexed,
            ..Default::default()
        }
    }

    pub fn entities(&self) -> &[Entity] {
        self.store.enemies()
    }

    /// Node boundaries of the index as of the last step
    pub fn debug_rects(&self) -> Vec<Rect> {
        self.tree.debug_rects()
    }

    pub fn tree(&self) -> &QuadTree {
        &self.tree
    }
}

/// Survival round: dodge a growing, fusing swarm
#[derive(Debug, Clone)]
pub struct ArcadeSim {
    pub tuning: Tuning,
    pub store: EntityStore,
    pub rng_state: RngState,
    pub game_over: bool,
    /// Seconds survived this round (stops at game over)
    pub survival_time: f32,
    pub spawn_timer: SpawnTimer,
    tree: QuadTree,
    rng: Pcg32,
}

impl ArcadeSim {
    pub fn new(tuning: Tuning, seed: u64) -> Self {
        let rng_state = RngState::new(seed);
        let tree = QuadTree::with_max_depth(tuning.world(), tuning.node_capacity, tuning.max_depth);
        let mut sim = Self {
            rng: rng_state.to_rng(),
            rng_state,
            store: EntityStore::new(),
            game_over: false,
            survival_time: 0.0,
            spawn_timer: SpawnTimer::default(),
            tree,
            tuning,
        };
        sim.populate();
        sim
    }

    fn safe_zone(&self) -> SafeZone {
        SafeZone {
            center: self.tuning.world().center(),
            radius: self.tuning.safe_radius,
        }
    }

    fn populate(&mut self) {
        let world = self.tuning.world();
        self.store.set_player(world.center(), self.tuning.player_radius());
        for _ in 0..self.tuning.initial_enemies {
            self.spawn_enemy();
        }
        self.store.build_index(&mut self.tree, world);
        log::info!("Arcade round started with {} enemies", self.store.len());
    }

    fn spawn_enemy(&mut self) -> u32 {
        let zone = self.safe_zone();
        let pos = sample_position(&mut self.rng, &self.tuning.world(), Some(zone));
        let vel = sample_velocity(&mut self.rng, self.tuning.arcade_velocity_range);
        let id = self.store.spawn_enemy(pos, self.tuning.entity_radius, vel);
        log::debug!("spawned enemy {} at ({:.1}, {:.1})", id, pos.x, pos.y);
        id
    }

    /// Advance one frame. Once the round is over only the transient
    /// collision flags are touched.
    pub fn step(&mut self, dt: f32, input: &ArcadeInput) -> FrameReport {
        let dt = dt.max(0.0);
        let world = self.tuning.world();

        self.store.clear_colliding();
        if self.game_over {
            return FrameReport {
                game_over: true,
                ..Default::default()
            };
        }

        self.survival_time += dt;

        if let Some(player) = &mut self.store.player {
            move_player(player, input.direction, self.tuning.player_speed, &world, dt);
        }

        let can_spawn = self.store.len() < self.tuning.max_enemies;
        let spawned = if self.spawn_timer.tick(dt, self.tuning.spawn_interval, can_spawn) {
            self.spawn_enemy();
            1
        } else {
            0
        };

        step_all_size_scaled(
            self.store.enemies_mut(),
            &world,
            self.tuning.speed_scale,
            self.tuning.entity_radius,
            dt,
        );

        self.store.build_index(&mut self.tree, world);
        let params = FusionParams {
            threshold: self.tuning.fusion_threshold,
            max_stage: self.tuning.max_fusion_stage,
            query_scale: self.tuning.query_scale,
        };
        let fusion = resolve_fusions(&mut self.store, &self.tree, &params);

        // The entity set changed shape; the old tree names the wrong slots
        let indexed = self.store.build_index(&mut self.tree, world);

        let hit = player_hit(&mut self.store, &self.tree, self.tuning.player_query_side);
        if hit {
            self.game_over = true;
            log::info!("Game over after {:.2}s", self.survival_time);
        }

        FrameReport {
            collisions: usize::from(hit),
            fusions: fusion.fusions,
            removed: fusion.removed,
            spawned,
            unindexed: self.store.len() - indexed,
            game_over: self.game_over,
        }
    }

    pub fn entities(&self) -> &[Entity] {
        self.store.enemies()
    }

    pub fn player(&self) -> Option<&Entity> {
        self.store.player.as_ref()
    }

    pub fn debug_rects(&self) -> Vec<Rect> {
        self.tree.debug_rects()
    }

    pub fn tree(&self) -> &QuadTree {
        &self.tree
    }

    /// Highest fusion stage among live enemies
    pub fn max_stage(&self) -> u8 {
        self.store.enemies().iter().map(|e| e.fusion_stage).max().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::FRAME_DT;

    #[test]
    fn test_debug_population() {
        let sim = DebugSim::new(Tuning::default(), 7);
        assert_eq!(sim.entities().len(), 80);
        assert!(sim.store.player.is_none());
        assert!(sim.entities().iter().all(|e| e.radius == 6.0));
    }

    #[test]
    fn test_debug_step_keeps_population() {
        let mut sim = DebugSim::new(Tuning::default(), 7);
        for _ in 0..120 {
            let report = sim.step(FRAME_DT);
            assert_eq!(report.removed, 0);
            assert_eq!(report.unindexed, 0);
        }
        assert_eq!(sim.entities().len(), 80);
        assert_eq!(sim.tree().len(), 80);
    }

    #[test]
    fn test_debug_collision_flags_are_per_frame() {
        let tuning = Tuning {
            debug_entity_count: 0,
            ..Tuning::default()
        };
        let mut sim = DebugSim::new(tuning, 7);
        // Overlapping pair flying apart at 2 × 100 units/s
        sim.store.spawn_enemy(Vec2::new(400.0, 300.0), 6.0, Vec2::new(-1.0, 0.0));
        sim.store.spawn_enemy(Vec2::new(404.0, 300.0), 6.0, Vec2::new(1.0, 0.0));

        let report = sim.step(FRAME_DT);
        assert_eq!(report.collisions, 2);
        assert!(sim.entities().iter().all(|e| e.colliding));

        // 0.1 s later the centers are over 27 apart, beyond 2 × radius
        let report = sim.step(0.1);
        assert_eq!(report.collisions, 0);
        assert!(sim.entities().iter().all(|e| !e.colliding));
    }

    #[test]
    fn test_arcade_collision_flags_are_per_frame() {
        let tuning = Tuning {
            initial_enemies: 0,
            ..Tuning::default()
        };
        let mut sim = ArcadeSim::new(tuning, 13);
        sim.store.spawn_enemy(Vec2::new(100.0, 100.0), 6.0, Vec2::ZERO);
        for e in sim.store.enemies_mut() {
            e.colliding = true;
        }
        if let Some(p) = sim.store.player.as_mut() {
            p.colliding = true;
        }

        let report = sim.step(FRAME_DT, &ArcadeInput::default());
        assert!(!report.game_over);
        assert!(!sim.entities()[0].colliding);
        assert!(!sim.player().is_some_and(|p| p.colliding));
    }

    #[test]
    fn test_arcade_initial_state() {
        let sim = ArcadeSim::new(Tuning::default(), 3);
        assert_eq!(sim.entities().len(), 45);
        let player = sim.player().expect("arcade has a player");
        assert_eq!(player.pos, Vec2::new(400.0, 300.0));
        assert!((player.radius - 9.0).abs() < 1e-6);
        for e in sim.entities() {
            assert!(e.pos.distance(player.pos) >= 100.0);
        }
    }

    #[test]
    fn test_arcade_spawns_on_interval() {
        let tuning = Tuning {
            initial_enemies: 0,
            ..Tuning::default()
        };
        let mut sim = ArcadeSim::new(tuning, 5);
        let mut spawned = 0;
        for _ in 0..3 {
            spawned += sim.step(1.0, &ArcadeInput::default()).spawned;
        }
        assert_eq!(spawned, 1);
        assert_eq!(sim.entities().len(), 1);
        assert_eq!(sim.spawn_timer.elapsed, 0.0);
    }

    #[test]
    fn test_negative_dt_is_clamped() {
        let mut sim = ArcadeSim::new(Tuning::default(), 9);
        let before: Vec<Vec2> = sim.entities().iter().map(|e| e.pos).collect();
        sim.step(-1.0, &ArcadeInput::default());
        assert_eq!(sim.survival_time, 0.0);
        // dt 0 moves nothing; only fusion of already-overlapping spawns could change the set
        if sim.entities().len() == before.len() {
            let after: Vec<Vec2> = sim.entities().iter().map(|e| e.pos).collect();
            assert_eq!(before, after);
        }
    }

    #[test]
    fn test_game_over_freezes_round() {
        let tuning = Tuning {
            initial_enemies: 0,
            ..Tuning::default()
        };
        let mut sim = ArcadeSim::new(tuning, 11);
        sim.store.spawn_enemy(Vec2::new(405.0, 300.0), 6.0, Vec2::new(0.1, 0.0));

        let report = sim.step(FRAME_DT, &ArcadeInput::default());
        assert!(report.game_over);
        assert!(sim.game_over);
        assert!(sim.player().is_some_and(|p| p.colliding));

        let time = sim.survival_time;
        let pos = sim.entities()[0].pos;
        let report = sim.step(1.0, &ArcadeInput::default());
        assert!(report.game_over);
        assert_eq!(sim.survival_time, time);
        assert_eq!(sim.entities()[0].pos, pos);
        // Flags are transient even after the round ends
        assert!(!sim.player().is_some_and(|p| p.colliding));
    }

    #[test]
    fn test_arcade_is_deterministic() {
        let mut a = ArcadeSim::new(Tuning::default(), 99999);
        let mut b = ArcadeSim::new(Tuning::default(), 99999);
        let input = ArcadeInput {
            direction: Vec2::new(1.0, 0.0),
        };
        for _ in 0..300 {
            a.step(FRAME_DT, &input);
            b.step(FRAME_DT, &input);
        }
        assert_eq!(a.entities(), b.entities());
        assert_eq!(a.game_over, b.game_over);
    }

    #[test]
    fn test_arcade_stays_in_bounds_and_capped() {
        let tuning = Tuning {
            spawn_interval: 0.0,
            ..Tuning::default()
        };
        let mut sim = ArcadeSim::new(tuning, 21);
        for _ in 0..600 {
            let report = sim.step(FRAME_DT, &ArcadeInput::default());
            assert_eq!(report.unindexed, 0);
            assert!(sim.entities().len() <= 80);
            for e in sim.entities() {
                assert!(e.fusion_stage <= 5);
                assert!(sim.tuning.world().contains(e.pos));
            }
            if report.game_over {
                break;
            }
        }
    }
}
