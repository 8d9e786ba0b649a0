//! Deterministic game core
//!
//! Everything here is free of rendering and platform dependencies:
//! - Time only advances through `Game::tick`
//! - Layout randomness is seeded per level; ambient randomness is injected
//! - Deferred work goes through the `Scheduler`, never wall-clock timers

pub mod catalog;
pub mod collision;
pub mod generator;
pub mod level;
pub mod progression;
pub mod resolver;
pub mod scheduler;
pub mod state;
pub mod tick;

pub use catalog::{CATALOG_LEN, catalog_level};
pub use collision::{Aabb, boxes_overlap, circle_near_box};
pub use generator::{LayoutRng, LevelParams, generate_level};
pub use level::{Collectible, Hazard, LevelDescriptor, Platform, PlatformColor};
pub use progression::{LevelStats, Progression, ProgressionState, Task, TransitionTimings};
pub use resolver::{HazardOutcome, ResolveReport, check_level_completion, resolve_collisions};
pub use scheduler::{Scheduler, TaskId};
pub use state::{FadeDirection, GameEvent, GameState, Modal, Player};
pub use tick::Game;
