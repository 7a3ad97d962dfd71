//! Pairwise enemy fusion
//!
//! Two enemies that overlap deeply enough merge into one: the survivor takes
//! the combined area, the midpoint, the mean velocity and the next stage up.
//! The absorbed enemy is dropped from the store once the pass completes.

use super::quadtree::QuadTree;
use super::state::{Entity, EntityStore};
use crate::Rect;
use crate::consts::{FUSION_THRESHOLD, MAX_FUSION_STAGE, QUERY_SCALE};

/// Fusion policy knobs
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FusionParams {
    /// Fuse when center distance < `threshold × (r1 + r2)`
    pub threshold: f32,
    pub max_stage: u8,
    /// Query square side as a multiple of the absorbing enemy's radius
    pub query_scale: f32,
}

impl Default for FusionParams {
    fn default() -> Self {
        Self {
            threshold: FUSION_THRESHOLD,
            max_stage: MAX_FUSION_STAGE,
            query_scale: QUERY_SCALE,
        }
    }
}

/// Outcome of one fusion pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FusionReport {
    /// Pairs merged
    pub fusions: usize,
    /// Enemies removed by compaction (equals `fusions`)
    pub removed: usize,
}

/// Merge `other` into `survivor`. Area is conserved, not radius.
pub fn fuse_pair(survivor: &mut Entity, other: &Entity, max_stage: u8) {
    survivor.radius = (survivor.radius * survivor.radius + other.radius * other.radius).sqrt();
    survivor.pos = (survivor.pos + other.pos) * 0.5;
    survivor.vel = (survivor.vel + other.vel) * 0.5;
    let stage = survivor.fusion_stage.max(other.fusion_stage);
    survivor.fusion_stage = if stage < max_stage { stage + 1 } else { stage };
}

/// Run one fusion pass over the enemies indexed in `tree`, then compact.
///
/// Enemies are visited in store order. A survivor keeps absorbing every live
/// overlapping candidate from its own query, so several merges can chain in
/// one pass. After compaction the tree is stale and must be rebuilt before
/// the next query.
pub fn resolve_fusions(
    store: &mut EntityStore,
    tree: &QuadTree,
    params: &FusionParams,
) -> FusionReport {
    let count = store.len();
    let mut alive = vec![true; count];
    let mut candidates = Vec::new();
    let mut fusions = 0;

    for i in 0..count {
        if !alive[i] {
            continue;
        }
        let query = {
            let e = &store.enemies()[i];
            Rect::from_center(e.pos, e.radius * params.query_scale)
        };
        store.query(tree, &query, &mut candidates);

        for &j in &candidates {
            if j == i || !alive[j] {
                continue;
            }
            let other = store.enemies()[j].clone();
            let Some(survivor) = store.enemy_mut(i) else {
                break;
            };
            let dist = survivor.pos.distance(other.pos);
            if dist < (survivor.radius + other.radius) * params.threshold {
                fuse_pair(survivor, &other, params.max_stage);
                alive[j] = false;
                fusions += 1;
                log::debug!(
                    "enemy {} absorbed {} (radius {:.2}, stage {})",
                    survivor.id,
                    other.id,
                    survivor.radius,
                    survivor.fusion_stage
                );
            }
        }
    }

    let removed = store.compact(&alive);
    FusionReport { fusions, removed }
}
