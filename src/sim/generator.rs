//! Procedural level generation for levels past the catalog
//!
//! Platform layout is a pure function of the level number: it draws from a
//! `Pcg32` seeded with `level_number * 1337`. Collectible and hazard placement
//! draw from the caller's RNG, so live play varies while tests can pin it.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::level::{LevelDescriptor, Platform, PlatformColor};
use crate::consts::*;
use crate::{clamp_to_canvas, distance};

/// Difficulty cap
pub const MAX_DIFFICULTY: u32 = 10;
/// Platform count cap
pub const MAX_PLATFORMS: usize = 12;

/// Minimum spacing between floating collectibles
pub const COLLECTIBLE_SPACING: f32 = 70.0;
/// Samples tried per floating collectible before settling for the best one
pub const COLLECTIBLE_PLACEMENT_ATTEMPTS: u32 = 30;
/// Clearance between a hazard and any collectible
pub const HAZARD_COLLECTIBLE_CLEARANCE: f32 = 60.0;
/// Clearance between two hazards placed in the same call
pub const HAZARD_SPACING: f32 = 50.0;
/// Samples tried per hazard before it is dropped
pub const HAZARD_PLACEMENT_ATTEMPTS: u32 = 20;

/// Height above a platform's top surface for collectibles placed on it
const ON_PLATFORM_LIFT: f32 = 30.0;
/// Height above a platform's top surface for hazards placed on it
const HAZARD_PLATFORM_LIFT: f32 = 25.0;
/// Vertical band platforms are laid out in
const PLATFORM_MIN_Y: f32 = 100.0;
const PLATFORM_MAX_Y: f32 = 520.0;

/// Flavor text, indexed by difficulty
pub const LEVEL_MESSAGES: [&str; 11] = [
    "Fresh snacks ahead!",
    "The pantry opens up.",
    "Mind your step.",
    "Higher shelves, tastier snacks.",
    "Bombs are getting bolder.",
    "Keep moving, keep munching.",
    "The kitchen is heating up!",
    "Only the nimble eat tonight.",
    "Chaos in the cupboards!",
    "Snack master territory.",
    "Legendary feast - survive it!",
];

/// Difficulty tier for a level number: `min(10, floor(n / 2))`
pub fn difficulty_for_level(level_number: u32) -> u32 {
    (level_number / 2).min(MAX_DIFFICULTY)
}

/// `min(12, 4 + floor(0.8 d))`
pub fn platform_count(difficulty: u32) -> usize {
    (4 + (difficulty * 4 / 5) as usize).min(MAX_PLATFORMS)
}

/// `5 + floor(1.5 d)`
pub fn collectible_count(difficulty: u32) -> usize {
    5 + (difficulty * 3 / 2) as usize
}

/// Requested hazards: `3 + floor(1.8 d)`
pub fn hazard_budget(difficulty: u32) -> usize {
    3 + (difficulty * 9 / 5) as usize
}

/// `5 + floor(0.5 d)`
pub fn coin_reward(difficulty: u32) -> u32 {
    5 + difficulty / 2
}

/// Platform width range `(max(50, 150 - 10d), min(250, 300 - 15d))`
pub fn platform_width_range(difficulty: u32) -> (f32, f32) {
    let d = difficulty as f32;
    let min = (150.0 - 10.0 * d).max(50.0);
    let max = (300.0 - 15.0 * d).min(250.0);
    (min, max)
}

/// Share of collectibles placed on platforms, in percent: `max(20, 80 - 7d)`
pub fn on_platform_percent(difficulty: u32) -> usize {
    80usize.saturating_sub(7 * difficulty as usize).max(20)
}

/// Flavor message for a difficulty
pub fn level_message(difficulty: u32) -> &'static str {
    LEVEL_MESSAGES[(difficulty as usize).min(LEVEL_MESSAGES.len() - 1)]
}

/// Platform arrangement by difficulty tier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutPattern {
    /// Evenly spaced, climbing left to right
    Staircase,
    /// Low/high pairs in vertical sections
    Sectioned,
    /// Anywhere in the platform band
    Scattered,
}

impl LayoutPattern {
    pub fn for_difficulty(difficulty: u32) -> Self {
        match difficulty {
            0..=3 => LayoutPattern::Staircase,
            4..=6 => LayoutPattern::Sectioned,
            _ => LayoutPattern::Scattered,
        }
    }
}

/// All generation parameters derived from a level number
#[derive(Debug, Clone, PartialEq)]
pub struct LevelParams {
    pub level_number: u32,
    pub difficulty: u32,
    pub platform_count: usize,
    pub min_platform_width: f32,
    pub max_platform_width: f32,
    pub collectible_count: usize,
    pub hazard_budget: usize,
    pub on_platform_collectibles: usize,
    pub coin_reward: u32,
    pub pattern: LayoutPattern,
    pub color: PlatformColor,
}

impl LevelParams {
    pub fn for_level(level_number: u32) -> Self {
        let difficulty = difficulty_for_level(level_number);
        let (min_platform_width, max_platform_width) = platform_width_range(difficulty);
        let collectibles = collectible_count(difficulty);
        Self {
            level_number,
            difficulty,
            platform_count: platform_count(difficulty),
            min_platform_width,
            max_platform_width,
            collectible_count: collectibles,
            hazard_budget: hazard_budget(difficulty),
            on_platform_collectibles: collectibles * on_platform_percent(difficulty) / 100,
            coin_reward: coin_reward(difficulty),
            pattern: LayoutPattern::for_difficulty(difficulty),
            color: PlatformColor::for_difficulty(difficulty),
        }
    }
}

/// Deterministic per-level layout sequence
pub struct LayoutRng {
    rng: Pcg32,
    draws: u32,
}

impl LayoutRng {
    pub const SEED_FACTOR: u64 = 1337;

    pub fn for_level(level_number: u32) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(level_number as u64 * Self::SEED_FACTOR),
            draws: 0,
        }
    }

    /// Next value in [0, 1)
    pub fn next_unit(&mut self) -> f32 {
        self.draws += 1;
        self.rng.random::<f32>()
    }

    /// Value in [lo, hi); returns `lo` when the range is empty
    pub fn range(&mut self, lo: f32, hi: f32) -> f32 {
        let t = self.next_unit();
        if hi <= lo { lo } else { lo + t * (hi - lo) }
    }

    /// Number of values drawn so far
    pub fn draws(&self) -> u32 {
        self.draws
    }
}

/// Uniform sample in [lo, hi) from an ambient RNG, `lo` when empty
fn sample<R: Rng + ?Sized>(rng: &mut R, lo: f32, hi: f32) -> f32 {
    let t = rng.random::<f32>();
    if hi <= lo { lo } else { lo + t * (hi - lo) }
}

/// Generate a level past the catalog
pub fn generate_level<R: Rng + ?Sized>(level_number: u32, rng: &mut R) -> LevelDescriptor {
    let params = LevelParams::for_level(level_number);
    let platforms = generate_platforms(&params);
    let collectibles = place_collectibles(&params, &platforms, rng);
    let hazards = place_hazards(&params, &platforms, &collectibles, rng);

    log::info!(
        "Generated level {}: difficulty={}, platforms={}, snacks={}, bombs={}/{}",
        level_number,
        params.difficulty,
        platforms.len(),
        collectibles.len(),
        hazards.len(),
        params.hazard_budget
    );

    LevelDescriptor {
        platforms,
        collectible_count: collectibles.len(),
        hazard_count: hazards.len(),
        collectible_locations: Some(collectibles),
        hazard_spawn_points: Some(hazards),
        message: level_message(params.difficulty).to_string(),
        coin_reward: params.coin_reward,
    }
}

/// Platform layout for a level (pure in `params.level_number`)
pub fn generate_platforms(params: &LevelParams) -> Vec<Platform> {
    let mut layout = LayoutRng::for_level(params.level_number);
    let n = params.platform_count;
    let mut platforms = Vec::with_capacity(n);

    for i in 0..n {
        let width = layout
            .range(params.min_platform_width, params.max_platform_width)
            .clamp(1.0, CANVAS_WIDTH);

        let (x, y) = match params.pattern {
            LayoutPattern::Staircase => {
                let step_x = (CANVAS_WIDTH - 100.0) / n as f32;
                let step_y = (PLATFORM_MAX_Y - PLATFORM_MIN_Y) / n as f32;
                let x = 50.0 + i as f32 * step_x + layout.range(-15.0, 15.0);
                let y = PLATFORM_MAX_Y - i as f32 * step_y + layout.range(-10.0, 10.0);
                (x, y)
            }
            LayoutPattern::Sectioned => {
                let sections = n.div_ceil(2);
                let section_w = CANVAS_WIDTH / sections as f32;
                let section = (i / 2) as f32;
                let x = section * section_w + layout.range(0.0, (section_w - width).max(0.0));
                let y = if i % 2 == 0 {
                    layout.range(400.0, PLATFORM_MAX_Y)
                } else {
                    layout.range(200.0, 350.0)
                };
                (x, y)
            }
            LayoutPattern::Scattered => {
                let x = layout.range(0.0, CANVAS_WIDTH - width);
                let y = layout.range(PLATFORM_MIN_Y, PLATFORM_MAX_Y);
                (x, y)
            }
        };

        let x = x.clamp(0.0, CANVAS_WIDTH - width);
        let y = y.clamp(PLATFORM_MIN_Y, PLATFORM_MAX_Y);
        platforms.push(Platform::new(x, y, width, PLATFORM_HEIGHT, params.color));
    }

    platforms
}

fn place_collectibles<R: Rng + ?Sized>(
    params: &LevelParams,
    platforms: &[Platform],
    rng: &mut R,
) -> Vec<Vec2> {
    let mut placed: Vec<Vec2> = Vec::with_capacity(params.collectible_count);
    let on_platform = if platforms.is_empty() {
        0
    } else {
        params.on_platform_collectibles.min(params.collectible_count)
    };

    for _ in 0..on_platform {
        let p = &platforms[rng.random_range(0..platforms.len())];
        let inset = (p.width / 2.0).min(20.0);
        let x = sample(rng, p.pos.x + inset, p.pos.x + p.width - inset);
        let pos = Vec2::new(x, p.pos.y - ON_PLATFORM_LIFT);
        placed.push(clamp_to_canvas(pos, ENTITY_RADIUS));
    }

    for _ in on_platform..params.collectible_count {
        let mut best = None::<(Vec2, f32)>;
        for _ in 0..COLLECTIBLE_PLACEMENT_ATTEMPTS {
            let candidate = Vec2::new(
                sample(rng, 30.0, CANVAS_WIDTH - 30.0),
                sample(rng, 80.0, PLATFORM_MAX_Y - 20.0),
            );
            let clearance = placed
                .iter()
                .map(|&c| distance(c, candidate))
                .fold(f32::INFINITY, f32::min);
            if best.is_none_or(|(_, d)| clearance > d) {
                best = Some((candidate, clearance));
            }
            if clearance >= COLLECTIBLE_SPACING {
                break;
            }
        }
        if let Some((pos, clearance)) = best {
            if clearance < COLLECTIBLE_SPACING {
                log::debug!(
                    "Snack placement budget spent, accepting clearance {:.1}",
                    clearance
                );
            }
            placed.push(pos);
        }
    }

    placed
}

fn ground_spot<R: Rng + ?Sized>(rng: &mut R) -> Vec2 {
    Vec2::new(
        sample(rng, 20.0, CANVAS_WIDTH - 20.0),
        CANVAS_HEIGHT - 20.0,
    )
}

fn hazard_candidate<R: Rng + ?Sized>(
    difficulty: u32,
    platforms: &[Platform],
    collectibles: &[Vec2],
    rng: &mut R,
) -> Vec2 {
    let pos = match LayoutPattern::for_difficulty(difficulty) {
        LayoutPattern::Staircase => ground_spot(rng),
        LayoutPattern::Sectioned => {
            if !platforms.is_empty() && rng.random_bool(0.5) {
                let p = &platforms[rng.random_range(0..platforms.len())];
                let x = sample(rng, p.pos.x, p.pos.x + p.width);
                Vec2::new(x, p.pos.y - HAZARD_PLATFORM_LIFT)
            } else {
                ground_spot(rng)
            }
        }
        LayoutPattern::Scattered => {
            if !collectibles.is_empty() && rng.random_bool(0.3) {
                let anchor = collectibles[rng.random_range(0..collectibles.len())];
                let angle = sample(rng, 0.0, std::f32::consts::TAU);
                let reach = sample(rng, 65.0, 110.0);
                anchor + Vec2::new(angle.cos(), angle.sin()) * reach
            } else {
                Vec2::new(
                    sample(rng, 20.0, CANVAS_WIDTH - 20.0),
                    sample(rng, 80.0, CANVAS_HEIGHT - 20.0),
                )
            }
        }
    };

    clamp_to_canvas(pos, ENTITY_RADIUS)
}

/// Hazard placement is valid when it keeps its distance from snacks and other bombs
pub fn hazard_position_valid(pos: Vec2, collectibles: &[Vec2], hazards: &[Vec2]) -> bool {
    collectibles
        .iter()
        .all(|&c| distance(c, pos) >= HAZARD_COLLECTIBLE_CLEARANCE)
        && hazards.iter().all(|&h| distance(h, pos) >= HAZARD_SPACING)
}

fn place_hazards<R: Rng + ?Sized>(
    params: &LevelParams,
    platforms: &[Platform],
    collectibles: &[Vec2],
    rng: &mut R,
) -> Vec<Vec2> {
    let mut placed: Vec<Vec2> = Vec::with_capacity(params.hazard_budget);

    for i in 0..params.hazard_budget {
        let spot = (0..HAZARD_PLACEMENT_ATTEMPTS)
            .map(|_| hazard_candidate(params.difficulty, platforms, collectibles, rng))
            .find(|&pos| hazard_position_valid(pos, collectibles, &placed));

        match spot {
            Some(pos) => placed.push(pos),
            None => log::debug!(
                "Dropped bomb {} on level {}: no valid spot in {} attempts",
                i,
                params.level_number,
                HAZARD_PLACEMENT_ATTEMPTS
            ),
        }
    }

    placed
}
