//! Live game state and the events handed to the presentation layer
//!
//! `GameState` is the one active level plus the player. Loading a level
//! replaces its entity lists; score, coins and health carry over.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::{Aabb, boxes_overlap};
use super::generator::{HAZARD_COLLECTIBLE_CLEARANCE, HAZARD_SPACING};
use super::level::{Collectible, Hazard, LevelDescriptor, Platform};
use crate::consts::*;
use crate::{clamp_to_canvas, distance};

/// Samples tried per fallback entity when a level lacks explicit positions
const LOADER_PLACEMENT_ATTEMPTS: u32 = 50;
/// Spacing between snacks dropped on the ground by the loader
const LOADER_SNACK_SPACING: f32 = 60.0;
/// Margin kept around platforms by loader-placed bombs
const LOADER_PLATFORM_MARGIN: f32 = 20.0;

/// Overlays that suspend gameplay while open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Modal {
    Shop,
    Tutorial,
}

/// Fade direction requested from the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FadeDirection {
    /// Towards an opaque screen
    Out,
    /// Back to the scene
    In,
}

/// Fire-and-forget notifications for rendering and audio
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Notification { text: String, duration: f32 },
    ScorePopup { pos: Vec2, amount: u64 },
    CoinPopup { pos: Vec2, amount: u32 },
    Fade { direction: FadeDirection, duration: f32 },
    LevelLoaded { level: u32 },
    /// Same level respawned after a lost life
    LevelRestarted { level: u32 },
    LevelComplete { level: u32 },
    LifeLost { remaining: u8 },
    GameOver { score: u64 },
    HazardSpawned { pos: Vec2 },
    /// Progression changed in a way worth persisting
    ProgressCheckpoint,
}

impl GameEvent {
    pub fn notify(text: impl Into<String>) -> Self {
        GameEvent::Notification {
            text: text.into(),
            duration: NOTIFICATION_DURATION,
        }
    }
}

/// The player character; `pos` is the bottom-centre of its box
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub vel: Vec2,
    pub width: f32,
    pub height: f32,
    pub health: u8,
    pub jump_power: f32,
    pub move_speed: f32,
    /// Last horizontal heading (+1 right, -1 left)
    pub facing: f32,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            pos: Vec2::new(PLAYER_START_X, PLAYER_START_Y),
            vel: Vec2::ZERO,
            width: PLAYER_WIDTH,
            height: PLAYER_HEIGHT,
            health: PLAYER_START_HEALTH,
            jump_power: 550.0,
            move_speed: 300.0,
            facing: 1.0,
        }
    }
}

impl Player {
    pub fn bounds(&self) -> Aabb {
        Aabb::new(
            self.pos.x - self.width / 2.0,
            self.pos.y - self.height,
            self.pos.x + self.width / 2.0,
            self.pos.y,
        )
    }

    /// Horizontal heading, from velocity when moving
    pub fn heading(&self) -> f32 {
        if self.vel.x > 0.0 {
            1.0
        } else if self.vel.x < 0.0 {
            -1.0
        } else {
            self.facing.signum()
        }
    }

    /// Put the player back at the spawn point, at rest
    pub fn respawn(&mut self) {
        self.pos = Vec2::new(PLAYER_START_X, PLAYER_START_Y);
        self.vel = Vec2::ZERO;
    }
}

/// The active level plus the player's running totals
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub player: Player,
    pub platforms: Vec<Platform>,
    pub collectibles: Vec<Collectible>,
    pub hazards: Vec<Hazard>,
    pub score: u64,
    pub coins: u32,
    /// 1-based; 0 until the first level is loaded
    pub current_level: u32,
    /// Reward configured by the loaded level
    pub level_coin_reward: Option<u32>,
    pub level_message: String,
    pub level_complete: bool,
    pub game_over: bool,
    pub modal: Option<Modal>,
    /// Seconds of play on the current level
    pub level_time: f32,
    /// Score when the current level was first entered
    level_start_score: u64,
    /// Coins awarded since the current level was first entered
    level_coins_earned: u32,
    /// Snacks eaten since the current level was first entered, across reloads
    level_pickups: usize,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState {
    pub fn new() -> Self {
        Self {
            player: Player::default(),
            platforms: Vec::new(),
            collectibles: Vec::new(),
            hazards: Vec::new(),
            score: 0,
            coins: 0,
            current_level: 0,
            level_coin_reward: None,
            level_message: String::new(),
            level_complete: false,
            game_over: false,
            modal: None,
            level_time: 0.0,
            level_start_score: 0,
            level_coins_earned: 0,
            level_pickups: 0,
        }
    }

    /// Collectibles not yet picked up
    pub fn remaining_collectibles(&self) -> usize {
        self.collectibles.iter().filter(|c| !c.collected).count()
    }

    /// Gameplay is suspended (overlay, finished level or run)
    pub fn is_suspended(&self) -> bool {
        self.game_over || self.level_complete || self.modal.is_some()
    }

    /// Score earned since the current level was first entered
    pub fn level_score(&self) -> u64 {
        self.score.saturating_sub(self.level_start_score)
    }

    /// Coins awarded since the current level was first entered; shop
    /// spending does not reduce it
    pub fn level_coins(&self) -> u32 {
        self.level_coins_earned
    }

    /// Snacks eaten since the current level was first entered
    pub fn level_collected(&self) -> usize {
        self.level_pickups
    }

    /// Score a snack pickup
    pub fn record_pickup(&mut self) {
        self.score += COLLECTIBLE_SCORE;
        self.level_pickups += 1;
    }

    pub fn award_coins(&mut self, amount: u32) {
        self.coins = self.coins.saturating_add(amount);
        self.level_coins_earned = self.level_coins_earned.saturating_add(amount);
        log::info!("Awarded {} coins. Total: {}", amount, self.coins);
    }

    /// Replace the live level with fresh entities from `level`
    ///
    /// Reloading the same level number keeps the per-level counters, so the
    /// snacks eaten on a failed attempt still count towards that level.
    pub fn spawn_level<R: Rng + ?Sized>(
        &mut self,
        level_number: u32,
        level: &LevelDescriptor,
        rng: &mut R,
    ) {
        if level_number != self.current_level {
            self.level_start_score = self.score;
            self.level_coins_earned = 0;
            self.level_pickups = 0;
        }

        self.current_level = level_number;
        self.level_complete = false;
        self.game_over = false;
        self.level_time = 0.0;
        self.level_coin_reward = Some(level.coin_reward);
        self.level_message = level.message.clone();
        self.player.respawn();

        self.platforms = level.platforms.clone();
        self.collectibles = collectible_positions(level, &self.platforms, rng)
            .into_iter()
            .map(Collectible::new)
            .collect();
        let snack_positions: Vec<Vec2> = self.collectibles.iter().map(|c| c.pos).collect();
        self.hazards = hazard_positions(level, &self.platforms, &snack_positions, rng)
            .into_iter()
            .map(Hazard::new)
            .collect();

        log::info!(
            "Loaded level {} with {} snacks, {} bombs and {} platforms",
            level_number,
            self.collectibles.len(),
            self.hazards.len(),
            self.platforms.len()
        );
    }
}

fn collectible_positions<R: Rng + ?Sized>(
    level: &LevelDescriptor,
    platforms: &[Platform],
    rng: &mut R,
) -> Vec<Vec2> {
    if let Some(locations) = &level.collectible_locations {
        if locations.len() >= level.collectible_count {
            return locations[..level.collectible_count].to_vec();
        }
    }

    // Platforms first, then the ground
    let mut placed: Vec<Vec2> = platforms
        .iter()
        .take(level.collectible_count)
        .map(|p| p.top_center(20.0))
        .collect();

    while placed.len() < level.collectible_count {
        let mut best = None::<(Vec2, f32)>;
        for _ in 0..LOADER_PLACEMENT_ATTEMPTS {
            let x = 20.0 + rng.random::<f32>() * (CANVAS_WIDTH - 40.0);
            let candidate = Vec2::new(x, CANVAS_HEIGHT - 30.0);
            let clearance = placed
                .iter()
                .map(|&c| distance(c, candidate))
                .fold(f32::INFINITY, f32::min);
            if best.is_none_or(|(_, d)| clearance > d) {
                best = Some((candidate, clearance));
            }
            if clearance >= LOADER_SNACK_SPACING {
                break;
            }
        }
        match best {
            Some((pos, _)) => placed.push(pos),
            None => break,
        }
    }

    placed
}

fn hazard_positions<R: Rng + ?Sized>(
    level: &LevelDescriptor,
    platforms: &[Platform],
    snacks: &[Vec2],
    rng: &mut R,
) -> Vec<Vec2> {
    if let Some(points) = &level.hazard_spawn_points {
        if points.len() >= level.hazard_count {
            return points[..level.hazard_count].to_vec();
        }
    }

    let mut placed: Vec<Vec2> = Vec::with_capacity(level.hazard_count);
    for i in 0..level.hazard_count {
        let spot = (0..LOADER_PLACEMENT_ATTEMPTS)
            .map(|_| {
                let x = 20.0 + rng.random::<f32>() * (CANVAS_WIDTH - 40.0);
                // Every third bomb floats, still within jumping reach
                let y = if i > 0 && i % 3 == 0 {
                    100.0 + rng.random::<f32>() * (CANVAS_HEIGHT - 200.0)
                } else {
                    CANVAS_HEIGHT - 20.0
                };
                clamp_to_canvas(Vec2::new(x, y), ENTITY_RADIUS)
            })
            .find(|&pos| {
                let zone = Aabb::around_circle(pos, LOADER_PLATFORM_MARGIN);
                !platforms.iter().any(|p| boxes_overlap(&zone, &p.bounds()))
                    && snacks
                        .iter()
                        .all(|&s| distance(s, pos) >= HAZARD_COLLECTIBLE_CLEARANCE)
                    && placed.iter().all(|&h| distance(h, pos) >= HAZARD_SPACING)
            });

        match spot {
            Some(pos) => placed.push(pos),
            None => log::debug!("Loader dropped bomb {} on level with no free spot", i),
        }
    }

    placed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::catalog::catalog_level;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_player_bounds() {
        let player = Player::default();
        let b = player.bounds();
        assert_eq!(b, Aabb::new(380.0, 440.0, 420.0, 500.0));
    }

    #[test]
    fn test_spawn_catalog_level() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut state = GameState::new();
        let level = catalog_level(1).unwrap();
        state.spawn_level(1, &level, &mut rng);

        assert_eq!(state.current_level, 1);
        assert_eq!(state.collectibles.len(), 5);
        assert_eq!(state.platforms.len(), 3);
        assert!(state.hazards.len() <= 2);
        assert_eq!(state.level_coin_reward, Some(5));
        for h in &state.hazards {
            for c in &state.collectibles {
                assert!(distance(h.pos, c.pos) >= HAZARD_COLLECTIBLE_CLEARANCE);
            }
        }
    }

    #[test]
    fn test_reload_keeps_level_baseline() {
        let mut rng = Pcg32::seed_from_u64(2);
        let mut state = GameState::new();
        let level = catalog_level(2).unwrap();
        state.spawn_level(2, &level, &mut rng);
        for _ in 0..3 {
            state.record_pickup();
        }
        state.spawn_level(2, &level, &mut rng);
        assert_eq!(state.level_score(), 30);
        assert_eq!(state.level_collected(), 3);

        state.spawn_level(3, &catalog_level(3).unwrap(), &mut rng);
        assert_eq!(state.level_score(), 0);
        assert_eq!(state.level_collected(), 0);
        assert_eq!(state.score, 30);
    }

    #[test]
    fn test_level_coins_ignore_spending() {
        let mut rng = Pcg32::seed_from_u64(4);
        let mut state = GameState::new();
        state.coins = 20;
        state.spawn_level(2, &catalog_level(2).unwrap(), &mut rng);
        state.coins -= 15;
        state.award_coins(7);
        assert_eq!(state.coins, 12);
        assert_eq!(state.level_coins(), 7);

        state.spawn_level(3, &catalog_level(3).unwrap(), &mut rng);
        assert_eq!(state.level_coins(), 0);
    }

    #[test]
    fn test_fallback_snack_placement() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut level = catalog_level(1).unwrap();
        level.collectible_locations = None;
        let mut state = GameState::new();
        state.spawn_level(1, &level, &mut rng);

        assert_eq!(state.collectibles.len(), 5);
        // Three on platforms, two on the ground
        assert_eq!(state.collectibles[0].pos, level.platforms[0].top_center(20.0));
        assert!((state.collectibles[4].pos.y - (CANVAS_HEIGHT - 30.0)).abs() < 0.001);
    }

    #[test]
    fn test_heading() {
        let mut player = Player::default();
        assert_eq!(player.heading(), 1.0);
        player.vel.x = -10.0;
        assert_eq!(player.heading(), -1.0);
    }
}
