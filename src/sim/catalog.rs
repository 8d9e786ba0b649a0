//! Hand-authored levels played before procedural generation takes over

use glam::Vec2;

use super::level::{LevelDescriptor, Platform, PlatformColor};
use crate::consts::PLATFORM_HEIGHT;

/// Number of hand-authored levels
pub const CATALOG_LEN: u32 = 3;

struct CatalogEntry {
    collectibles: usize,
    hazards: usize,
    platforms: &'static [(f32, f32, f32)],
    collectible_locations: &'static [(f32, f32)],
    message: &'static str,
    coin_reward: u32,
}

const CATALOG: [CatalogEntry; CATALOG_LEN as usize] = [
    // Easy introduction
    CatalogEntry {
        collectibles: 5,
        hazards: 2,
        platforms: &[
            (200.0, 450.0, 200.0),
            (500.0, 350.0, 150.0),
            (100.0, 250.0, 150.0),
        ],
        collectible_locations: &[
            (300.0, 420.0),
            (550.0, 320.0),
            (150.0, 220.0),
            (400.0, 150.0),
            (700.0, 500.0),
        ],
        message: "Grab every snack and watch out for bombs!",
        coin_reward: 5,
    },
    // Stepping stones
    CatalogEntry {
        collectibles: 8,
        hazards: 4,
        platforms: &[
            (100.0, 500.0, 100.0),
            (300.0, 450.0, 100.0),
            (500.0, 400.0, 100.0),
            (700.0, 350.0, 100.0),
            (500.0, 250.0, 100.0),
            (300.0, 200.0, 100.0),
        ],
        collectible_locations: &[
            (150.0, 470.0),
            (350.0, 420.0),
            (550.0, 370.0),
            (750.0, 320.0),
            (550.0, 220.0),
            (350.0, 170.0),
            (450.0, 100.0),
            (250.0, 550.0),
        ],
        message: "Stepping stones - mind the gaps.",
        coin_reward: 7,
    },
    // Complex layout
    CatalogEntry {
        collectibles: 12,
        hazards: 6,
        platforms: &[
            (150.0, 500.0, 100.0),
            (400.0, 450.0, 250.0),
            (200.0, 350.0, 100.0),
            (600.0, 350.0, 100.0),
            (350.0, 250.0, 150.0),
            (50.0, 200.0, 100.0),
            (650.0, 200.0, 100.0),
            (400.0, 120.0, 100.0),
        ],
        collectible_locations: &[
            (200.0, 470.0),
            (450.0, 420.0),
            (600.0, 420.0),
            (250.0, 320.0),
            (650.0, 320.0),
            (400.0, 220.0),
            (100.0, 170.0),
            (700.0, 170.0),
            (450.0, 90.0),
            (300.0, 150.0),
            (550.0, 150.0),
            (350.0, 550.0),
        ],
        message: "The climb gets tricky from here.",
        coin_reward: 10,
    },
];

/// Look up a hand-authored level (1-based)
pub fn catalog_level(level_number: u32) -> Option<LevelDescriptor> {
    if level_number == 0 || level_number > CATALOG_LEN {
        return None;
    }
    let entry = &CATALOG[(level_number - 1) as usize];

    Some(LevelDescriptor {
        platforms: entry
            .platforms
            .iter()
            .map(|&(x, y, w)| Platform::new(x, y, w, PLATFORM_HEIGHT, PlatformColor::Purple))
            .collect(),
        collectible_count: entry.collectibles,
        hazard_count: entry.hazards,
        collectible_locations: Some(
            entry
                .collectible_locations
                .iter()
                .map(|&(x, y)| Vec2::new(x, y))
                .collect(),
        ),
        hazard_spawn_points: None,
        message: entry.message.to_string(),
        coin_reward: entry.coin_reward,
    })
}
