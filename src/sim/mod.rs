//! Deterministic simulation module
//!
//! All simulation logic lives here. This module must stay pure and deterministic:
//! - Seeded RNG only
//! - Stable iteration order (store order, survivors keep their relative order)
//! - The spatial index is rebuilt before every query pass that follows a
//!   structural change to the entity set
//! - No rendering or platform dependencies

pub mod fusion;
pub mod motion;
pub mod proximity;
pub mod quadtree;
pub mod screen;
pub mod spawn;
pub mod state;
pub mod tick;

pub use fusion::{FusionParams, FusionReport, fuse_pair, resolve_fusions};
pub use motion::{move_player, step_all, step_all_size_scaled, step_entity};
pub use proximity::{DetectionRule, detect_collisions, player_hit};
pub use quadtree::QuadTree;
pub use screen::{App, FrameView, Screen, ScreenEvent};
pub use spawn::{SafeZone, SpawnTimer, sample_position, sample_velocity};
pub use state::{Entity, EntityKind, EntityStore, RngState};
pub use tick::{ArcadeInput, ArcadeSim, DebugSim, FrameReport};
