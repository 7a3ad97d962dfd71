//! Entity storage and core simulation types

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::quadtree::QuadTree;
use crate::Rect;

/// Which side an entity plays on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Enemy,
    Player,
}

/// A circular entity
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    /// Stable id, assigned at creation and never reused by the same store
    pub id: u32,
    pub kind: EntityKind,
    pub pos: Vec2,
    /// Velocity in speed-scale units (multiplied by the speed scale when integrating)
    pub vel: Vec2,
    pub radius: f32,
    /// Set during detection, cleared at the start of every frame
    pub colliding: bool,
    /// Fusion tier (0 = never fused)
    pub fusion_stage: u8,
}

impl Entity {
    pub fn enemy(id: u32, pos: Vec2, radius: f32, vel: Vec2) -> Self {
        debug_assert!(radius > 0.0);
        Self {
            id,
            kind: EntityKind::Enemy,
            pos,
            vel,
            radius,
            colliding: false,
            fusion_stage: 0,
        }
    }

    pub fn player(id: u32, pos: Vec2, radius: f32) -> Self {
        debug_assert!(radius > 0.0);
        Self {
            id,
            kind: EntityKind::Player,
            pos,
            vel: Vec2::ZERO,
            radius,
            colliding: false,
            fusion_stage: 0,
        }
    }

    /// Circle area (conserved by fusion)
    #[inline]
    pub fn area(&self) -> f32 {
        std::f32::consts::PI * self.radius * self.radius
    }
}

/// Owner of every live entity: an ordered enemy list plus an optional player.
///
/// Any change to which enemies exist (spawn, compaction, clear) bumps the
/// store epoch. A [`QuadTree`] built from the store remembers the epoch, and
/// [`EntityStore::query`] refuses to read a tree from an older epoch.
/// The enemy list itself is private: callers can edit enemies in place but
/// only the store can add or remove slots.
#[derive(Debug, Clone)]
pub struct EntityStore {
    enemies: Vec<Entity>,
    pub player: Option<Entity>,
    epoch: u64,
    next_id: u32,
}

impl EntityStore {
    pub fn new() -> Self {
        Self {
            enemies: Vec::new(),
            player: None,
            epoch: 0,
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Structural generation counter
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Append an enemy and return its id
    pub fn spawn_enemy(&mut self, pos: Vec2, radius: f32, vel: Vec2) -> u32 {
        let id = self.next_entity_id();
        self.enemies.push(Entity::enemy(id, pos, radius, vel));
        self.epoch += 1;
        id
    }

    /// Replace the player singleton
    pub fn set_player(&mut self, pos: Vec2, radius: f32) -> u32 {
        let id = self.next_entity_id();
        self.player = Some(Entity::player(id, pos, radius));
        id
    }

    /// Drop every entity (ids keep counting up)
    pub fn clear(&mut self) {
        self.enemies.clear();
        self.player = None;
        self.epoch += 1;
    }

    /// Enemies in slot order
    pub fn enemies(&self) -> &[Entity] {
        &self.enemies
    }

    /// In-place access to every enemy. The iterator cannot change the slot count.
    pub fn enemies_mut(&mut self) -> std::slice::IterMut<'_, Entity> {
        self.enemies.iter_mut()
    }

    pub fn enemy_mut(&mut self, slot: usize) -> Option<&mut Entity> {
        self.enemies.get_mut(slot)
    }

    pub fn len(&self) -> usize {
        self.enemies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.enemies.is_empty()
    }

    /// Reset the per-frame collision flag on every entity
    pub fn clear_colliding(&mut self) {
        for e in &mut self.enemies {
            e.colliding = false;
        }
        if let Some(player) = &mut self.player {
            player.colliding = false;
        }
    }

    /// Remove enemies whose slot is `false` in `alive`, keeping survivor order.
    /// Returns the number removed.
    pub fn compact(&mut self, alive: &[bool]) -> usize {
        assert_eq!(alive.len(), self.enemies.len(), "liveness mask out of sync with store");
        let before = self.enemies.len();
        let mut slot = 0;
        self.enemies.retain(|_| {
            let keep = alive[slot];
            slot += 1;
            keep
        });
        let removed = before - self.enemies.len();
        if removed > 0 {
            self.epoch += 1;
        }
        removed
    }

    /// Rebuild `tree` over `bounds` from the current enemy positions.
    /// Returns how many enemies were actually indexed.
    pub fn build_index(&self, tree: &mut QuadTree, bounds: Rect) -> usize {
        tree.reset(bounds);
        let mut indexed = 0;
        for (slot, e) in self.enemies.iter().enumerate() {
            if tree.insert(slot, e.pos) {
                indexed += 1;
            }
        }
        if indexed < self.enemies.len() {
            log::warn!(
                "{} of {} enemies outside world bounds, left unindexed",
                self.enemies.len() - indexed,
                self.enemies.len()
            );
        }
        tree.set_source_epoch(self.epoch);
        indexed
    }

    /// Range query against a tree built from this store.
    ///
    /// # Panics
    /// If the tree was not built from the store's current epoch; slot handles
    /// from a stale tree would name the wrong entities.
    pub fn query(&self, tree: &QuadTree, range: &Rect, found: &mut Vec<usize>) {
        assert_eq!(
            tree.source_epoch(),
            Some(self.epoch),
            "spatial index queried after the entity set changed"
        );
        found.clear();
        tree.query_range_into(range, found);
    }
}

impl Default for EntityStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Seed a simulation was started from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RngState {
    pub seed: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    pub fn to_rng(&self) -> Pcg32 {
        Pcg32::seed_from_u64(self.seed)
    }
}
