//! Level blueprints and the live entities spawned from them

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use crate::consts::*;

/// Platform palette, one colour per difficulty band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlatformColor {
    #[default]
    Purple,
    Blue,
    Orange,
    Crimson,
}

impl PlatformColor {
    /// Colour band for a difficulty in [0, 10]
    pub fn for_difficulty(difficulty: u32) -> Self {
        match difficulty {
            0..=3 => PlatformColor::Purple,
            4..=6 => PlatformColor::Blue,
            7..=8 => PlatformColor::Orange,
            _ => PlatformColor::Crimson,
        }
    }

    pub fn hex(&self) -> &'static str {
        match self {
            PlatformColor::Purple => "#8e44ad",
            PlatformColor::Blue => "#2980b9",
            PlatformColor::Orange => "#d35400",
            PlatformColor::Crimson => "#c0392b",
        }
    }
}

/// Static support surface; `pos` is the top-left corner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    pub pos: Vec2,
    pub width: f32,
    pub height: f32,
    pub color: PlatformColor,
}

impl Platform {
    pub fn new(x: f32, y: f32, width: f32, height: f32, color: PlatformColor) -> Self {
        Self {
            pos: Vec2::new(x, y),
            width,
            height,
            color,
        }
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::new(
            self.pos.x,
            self.pos.y,
            self.pos.x + self.width,
            self.pos.y + self.height,
        )
    }

    /// Point centred on the top surface, `lift` units above it
    pub fn top_center(&self, lift: f32) -> Vec2 {
        Vec2::new(self.pos.x + self.width / 2.0, self.pos.y - lift)
    }
}

/// Immutable blueprint for a level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelDescriptor {
    pub platforms: Vec<Platform>,
    pub collectible_count: usize,
    pub hazard_count: usize,
    pub collectible_locations: Option<Vec<Vec2>>,
    pub hazard_spawn_points: Option<Vec<Vec2>>,
    pub message: String,
    pub coin_reward: u32,
}

impl LevelDescriptor {
    /// Location lists, when present, cover the requested counts
    pub fn is_consistent(&self) -> bool {
        let collectibles_ok = self
            .collectible_locations
            .as_ref()
            .is_none_or(|locs| locs.len() >= self.collectible_count);
        let hazards_ok = self
            .hazard_spawn_points
            .as_ref()
            .is_none_or(|pts| pts.len() >= self.hazard_count);
        collectibles_ok && hazards_ok
    }
}

/// An item the player gathers ("snack")
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collectible {
    pub pos: Vec2,
    pub radius: f32,
    pub collected: bool,
}

impl Collectible {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            radius: ENTITY_RADIUS,
            collected: false,
        }
    }

    /// Mark as collected. Returns false if it already was.
    pub fn collect(&mut self) -> bool {
        if self.collected {
            return false;
        }
        self.collected = true;
        true
    }
}

/// An obstacle that costs a life on contact ("bomb")
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hazard {
    pub pos: Vec2,
    pub radius: f32,
    pub active: bool,
    /// Spawned during play rather than at level load
    pub is_dynamic: bool,
}

impl Hazard {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            radius: ENTITY_RADIUS,
            active: true,
            is_dynamic: false,
        }
    }

    pub fn dynamic(pos: Vec2) -> Self {
        Self {
            is_dynamic: true,
            ..Self::new(pos)
        }
    }

    /// Deactivate. Returns false if it was already spent.
    pub fn trigger(&mut self) -> bool {
        if !self.active {
            return false;
        }
        self.active = false;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_once() {
        let mut c = Collectible::new(Vec2::new(10.0, 10.0));
        assert!(c.collect());
        assert!(!c.collect());
        assert!(c.collected);
    }

    #[test]
    fn test_trigger_once() {
        let mut h = Hazard::dynamic(Vec2::ZERO);
        assert!(h.is_dynamic);
        assert!(h.trigger());
        assert!(!h.trigger());
        assert!(!h.active);
    }

    #[test]
    fn test_color_bands() {
        assert_eq!(PlatformColor::for_difficulty(0), PlatformColor::Purple);
        assert_eq!(PlatformColor::for_difficulty(3), PlatformColor::Purple);
        assert_eq!(PlatformColor::for_difficulty(4), PlatformColor::Blue);
        assert_eq!(PlatformColor::for_difficulty(6), PlatformColor::Blue);
        assert_eq!(PlatformColor::for_difficulty(8), PlatformColor::Orange);
        assert_eq!(PlatformColor::for_difficulty(9), PlatformColor::Crimson);
        assert_eq!(PlatformColor::for_difficulty(10), PlatformColor::Crimson);
    }

    #[test]
    fn test_descriptor_consistency() {
        let mut level = LevelDescriptor {
            platforms: Vec::new(),
            collectible_count: 2,
            hazard_count: 1,
            collectible_locations: Some(vec![Vec2::ZERO]),
            hazard_spawn_points: None,
            message: String::new(),
            coin_reward: 5,
        };
        assert!(!level.is_consistent());
        level.collectible_locations = Some(vec![Vec2::ZERO, Vec2::ONE]);
        assert!(level.is_consistent());
    }
}
