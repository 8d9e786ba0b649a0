//! SnackRun - level progression core for a 2D browser platformer
//!
//! Core modules:
//! - `sim`: Simulation (collision outcomes, level generation, progression)
//! - `shop`: Upgrade tiers bought with coins
//! - `persistence`: Progression snapshot load/save
//! - `settings`: Tuning and preferences

pub mod persistence;
pub mod settings;
pub mod shop;
pub mod sim;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use settings::{HazardSpawnTiming, Settings};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Canvas dimensions (world units are canvas pixels, y grows downward)
    pub const CANVAS_WIDTH: f32 = 800.0;
    pub const CANVAS_HEIGHT: f32 = 600.0;

    /// Player box (position is bottom-centre)
    pub const PLAYER_WIDTH: f32 = 40.0;
    pub const PLAYER_HEIGHT: f32 = 60.0;
    pub const PLAYER_START_X: f32 = 400.0;
    pub const PLAYER_START_Y: f32 = 500.0;
    pub const PLAYER_START_HEALTH: u8 = 3;

    /// Collectibles and hazards share one radius
    pub const ENTITY_RADIUS: f32 = 15.0;
    pub const PLATFORM_HEIGHT: f32 = 20.0;

    /// Score per collectible picked up
    pub const COLLECTIBLE_SCORE: u64 = 10;
    /// Coin reward when a level does not carry its own
    pub const DEFAULT_COIN_REWARD: u32 = 5;

    /// Seconds between level completion and the start of the transition
    pub const LEVEL_COMPLETE_DELAY: f64 = 3.0;
    /// Fade durations (seconds)
    pub const FADE_OUT_DURATION: f64 = 1.0;
    pub const FADE_IN_DURATION: f64 = 1.0;
    /// Pause on the opaque screen after the next level is loaded
    pub const MIDPOINT_PAUSE: f64 = 0.5;
    /// Default notification lifetime (seconds)
    pub const NOTIFICATION_DURATION: f32 = 3.0;
}

/// Euclidean distance between two points
#[inline]
pub fn distance(a: Vec2, b: Vec2) -> f32 {
    a.distance(b)
}

/// Clamp a point into the canvas, keeping `margin` units from every edge
#[inline]
pub fn clamp_to_canvas(p: Vec2, margin: f32) -> Vec2 {
    use consts::{CANVAS_HEIGHT, CANVAS_WIDTH};
    Vec2::new(
        p.x.clamp(margin, CANVAS_WIDTH - margin),
        p.y.clamp(margin, CANVAS_HEIGHT - margin),
    )
}
