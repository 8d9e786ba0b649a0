//! Level progression: difficulty scaling, guarded level transitions and
//! in-level bomb spawning once the catalog is exhausted.
//!
//! A transition runs as a small state machine over scheduled tasks:
//!
//! ```text
//! Idle --start_transition--> FadingOut --FadeOutComplete (midpoint)--> Holding
//!      <--FadeInComplete-- FadingIn <--MidpointPauseComplete--
//! ```
//!
//! `ProgressionState::in_transition` is set for the whole sequence and is the
//! only guard against a second transition starting.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::catalog::{CATALOG_LEN, catalog_level};
use super::generator::generate_level;
use super::level::{Hazard, LevelDescriptor, Platform};
use super::scheduler::Scheduler;
use super::state::{FadeDirection, GameEvent, Player};
use crate::consts::*;
use crate::settings::{HazardSpawnTiming, Settings};
use crate::{clamp_to_canvas, distance};

/// Base per-frame chance of a dynamic bomb at full ramp
pub const BASE_SPAWN_CHANCE: f64 = 0.002;
/// Seconds of play before the spawn chance reaches its full value
pub const SPAWN_RAMP_SECONDS: f32 = 30.0;
/// Frame rate the per-frame chance was tuned for
pub const REFERENCE_FPS: f64 = 60.0;
/// Dynamic bombs keep this far from active bombs
pub const DYNAMIC_HAZARD_SPACING: f32 = 60.0;
/// Strategy picks tried before falling back to a random spot
pub const SPAWN_POSITION_ATTEMPTS: u32 = 10;

/// Persistent progression record, stored as a flat snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressionState {
    pub total_score: u64,
    pub highest_level_reached: u32,
    pub total_collectibles_collected: u64,
    pub total_currency_earned: u64,
    pub difficulty_multiplier: f32,
    pub hazard_spawn_rate_multiplier: f32,
    pub in_transition: bool,
    pub dynamic_level_mode_active: bool,
}

impl Default for ProgressionState {
    fn default() -> Self {
        Self {
            total_score: 0,
            highest_level_reached: 1,
            total_collectibles_collected: 0,
            total_currency_earned: 0,
            difficulty_multiplier: 1.0,
            hazard_spawn_rate_multiplier: 1.0,
            in_transition: false,
            dynamic_level_mode_active: false,
        }
    }
}

/// Results of a finished level, folded into the running totals
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LevelStats {
    pub score: u64,
    pub collectibles: u64,
    pub currency: u64,
}

/// Delayed work owned by the game loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    /// Level cleared; start moving on after the completion delay
    BeginTransition { from: u32, to: u32 },
    FadeOutComplete,
    MidpointPauseComplete,
    FadeInComplete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionStage {
    FadingOut,
    /// Screen is opaque, next level loaded
    Holding,
    FadingIn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: u32,
    pub to: u32,
    pub stage: TransitionStage,
}

/// What the caller must do after a transition task fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionStep {
    /// Load `to` now; the screen is opaque
    Midpoint { to: u32 },
    /// Transition over, gameplay resumes
    Finished { to: u32 },
}

/// Phase durations in seconds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionTimings {
    pub fade_out: f64,
    pub pause: f64,
    pub fade_in: f64,
}

impl Default for TransitionTimings {
    fn default() -> Self {
        Self {
            fade_out: FADE_OUT_DURATION,
            pause: MIDPOINT_PAUSE,
            fade_in: FADE_IN_DURATION,
        }
    }
}

impl From<&Settings> for TransitionTimings {
    fn from(settings: &Settings) -> Self {
        Self {
            fade_out: settings.fade_out_seconds,
            pause: settings.midpoint_pause_seconds,
            fade_in: settings.fade_in_seconds,
        }
    }
}

/// Owns `ProgressionState` and the transition in flight
#[derive(Debug, Clone, Default)]
pub struct Progression {
    state: ProgressionState,
    transition: Option<Transition>,
    timings: TransitionTimings,
}

impl Progression {
    pub fn new(state: ProgressionState, timings: TransitionTimings) -> Self {
        Self {
            state,
            transition: None,
            timings,
        }
    }

    pub fn state(&self) -> &ProgressionState {
        &self.state
    }

    /// Phase durations for transitions started from now on
    pub fn set_timings(&mut self, timings: TransitionTimings) {
        self.timings = timings;
    }

    pub fn transition(&self) -> Option<&Transition> {
        self.transition.as_ref()
    }

    pub fn in_transition(&self) -> bool {
        self.state.in_transition
    }

    /// Resolve a level and update the difficulty scaling for it
    ///
    /// Returns `None` (and changes nothing) for level 0.
    pub fn set_level<R: Rng + ?Sized>(
        &mut self,
        level_number: u32,
        rng: &mut R,
    ) -> Option<LevelDescriptor> {
        if level_number == 0 {
            log::warn!("Invalid level number: {}", level_number);
            return None;
        }

        let s = &mut self.state;
        s.highest_level_reached = s.highest_level_reached.max(level_number);
        s.difficulty_multiplier = 1.0 + (level_number - 1) as f32 * 0.1;
        if level_number > 3 {
            s.hazard_spawn_rate_multiplier = 1.0 + (level_number - 3) as f32 * 0.2;
        }

        if level_number <= CATALOG_LEN {
            return catalog_level(level_number);
        }

        if !s.dynamic_level_mode_active {
            log::info!("Catalog finished, switching to generated levels");
            s.dynamic_level_mode_active = true;
        }
        Some(generate_level(level_number, rng))
    }

    /// Begin the fade-out / load / fade-in sequence
    ///
    /// Returns false, leaving everything untouched, if a transition is
    /// already running.
    pub fn start_transition(
        &mut self,
        from: u32,
        to: u32,
        stats: LevelStats,
        scheduler: &mut Scheduler<Task>,
        events: &mut Vec<GameEvent>,
    ) -> bool {
        if self.state.in_transition {
            log::warn!(
                "Transition {} -> {} rejected: already transitioning",
                from,
                to
            );
            return false;
        }
        self.state.in_transition = true;
        self.transition = Some(Transition {
            from,
            to,
            stage: TransitionStage::FadingOut,
        });

        self.state.total_score += stats.score;
        self.state.total_collectibles_collected += stats.collectibles;
        self.state.total_currency_earned += stats.currency;

        log::info!(
            "Level {} complete (+{} score, {} snacks, {} coins), moving to level {}",
            from,
            stats.score,
            stats.collectibles,
            stats.currency,
            to
        );
        events.push(GameEvent::notify(format!(
            "Level {} complete! Get ready for level {}",
            from, to
        )));
        events.push(GameEvent::Fade {
            direction: FadeDirection::Out,
            duration: self.timings.fade_out as f32,
        });
        scheduler.schedule(self.timings.fade_out, Task::FadeOutComplete);
        true
    }

    /// Advance the transition for a fired task
    pub fn handle_task(
        &mut self,
        task: Task,
        scheduler: &mut Scheduler<Task>,
        events: &mut Vec<GameEvent>,
    ) -> Option<TransitionStep> {
        let Some(transition) = self.transition.as_mut() else {
            log::warn!("Ignoring {:?}: no transition running", task);
            return None;
        };

        match (task, transition.stage) {
            (Task::FadeOutComplete, TransitionStage::FadingOut) => {
                transition.stage = TransitionStage::Holding;
                scheduler.schedule(self.timings.pause, Task::MidpointPauseComplete);
                Some(TransitionStep::Midpoint { to: transition.to })
            }
            (Task::MidpointPauseComplete, TransitionStage::Holding) => {
                transition.stage = TransitionStage::FadingIn;
                events.push(GameEvent::Fade {
                    direction: FadeDirection::In,
                    duration: self.timings.fade_in as f32,
                });
                scheduler.schedule(self.timings.fade_in, Task::FadeInComplete);
                None
            }
            (Task::FadeInComplete, TransitionStage::FadingIn) => {
                let to = transition.to;
                self.transition = None;
                self.state.in_transition = false;
                Some(TransitionStep::Finished { to })
            }
            (task, stage) => {
                log::warn!("Ignoring {:?} during {:?}", task, stage);
                None
            }
        }
    }

    /// Abort any running transition (full game reset)
    pub fn cancel_transition(&mut self) -> bool {
        let was_running = self.transition.take().is_some() || self.state.in_transition;
        self.state.in_transition = false;
        if was_running {
            log::info!("Transition cancelled");
        }
        was_running
    }

    /// Per-frame roll for a dynamic bomb
    ///
    /// `dt` only matters for `HazardSpawnTiming::PerSecond`, which rescales the
    /// per-frame chance so the expected spawn rate matches 60 FPS at any
    /// frame rate.
    pub fn should_spawn_dynamic_hazard<R: Rng + ?Sized>(
        &self,
        elapsed_level_time: f32,
        dt: f32,
        timing: HazardSpawnTiming,
        rng: &mut R,
    ) -> bool {
        if self.state.in_transition || !self.state.dynamic_level_mode_active {
            return false;
        }
        let chance = spawn_chance(
            self.state.hazard_spawn_rate_multiplier,
            elapsed_level_time,
            dt,
            timing,
        );
        chance > 0.0 && rng.random_bool(chance)
    }
}

/// Chance of a dynamic bomb this frame, in [0, 1]
pub fn spawn_chance(
    rate_multiplier: f32,
    elapsed_level_time: f32,
    dt: f32,
    timing: HazardSpawnTiming,
) -> f64 {
    let ramp = (elapsed_level_time / SPAWN_RAMP_SECONDS).clamp(0.0, 1.0) as f64;
    let per_frame = BASE_SPAWN_CHANCE * rate_multiplier as f64 * ramp;
    let chance = match timing {
        HazardSpawnTiming::PerFrame => per_frame,
        HazardSpawnTiming::PerSecond => {
            let frames = dt.max(0.0) as f64 * REFERENCE_FPS;
            1.0 - (1.0 - per_frame.clamp(0.0, 1.0)).powf(frames)
        }
    };
    if chance.is_finite() {
        chance.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Where a dynamic bomb may appear
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnStrategy {
    AheadOfPlayer,
    AbovePlayer,
    OnPlatform,
    Anywhere,
}

impl SpawnStrategy {
    const ALL: [SpawnStrategy; 4] = [
        SpawnStrategy::AheadOfPlayer,
        SpawnStrategy::AbovePlayer,
        SpawnStrategy::OnPlatform,
        SpawnStrategy::Anywhere,
    ];

    pub fn weight(&self, has_platforms: bool) -> u32 {
        match self {
            SpawnStrategy::AheadOfPlayer => 3,
            SpawnStrategy::AbovePlayer => 2,
            SpawnStrategy::OnPlatform => {
                if has_platforms {
                    4
                } else {
                    0
                }
            }
            SpawnStrategy::Anywhere => 1,
        }
    }

    /// Weighted pick
    pub fn pick<R: Rng + ?Sized>(has_platforms: bool, rng: &mut R) -> Self {
        let total: u32 = Self::ALL.iter().map(|s| s.weight(has_platforms)).sum();
        let mut roll = rng.random_range(0..total);
        for strategy in Self::ALL {
            let w = strategy.weight(has_platforms);
            if roll < w {
                return strategy;
            }
            roll -= w;
        }
        SpawnStrategy::Anywhere
    }
}

fn uniform<R: Rng + ?Sized>(rng: &mut R, lo: f32, hi: f32) -> f32 {
    lo + rng.random::<f32>() * (hi - lo)
}

fn anywhere<R: Rng + ?Sized>(rng: &mut R) -> Vec2 {
    Vec2::new(
        uniform(rng, 50.0, CANVAS_WIDTH - 50.0),
        uniform(rng, 80.0, CANVAS_HEIGHT - 20.0),
    )
}

fn strategy_position<R: Rng + ?Sized>(
    strategy: SpawnStrategy,
    player: &Player,
    platforms: &[Platform],
    rng: &mut R,
) -> Vec2 {
    let pos = match strategy {
        SpawnStrategy::AheadOfPlayer => Vec2::new(
            player.pos.x + player.heading() * uniform(rng, 150.0, 250.0),
            player.pos.y - 20.0,
        ),
        SpawnStrategy::AbovePlayer => Vec2::new(
            player.pos.x + uniform(rng, -50.0, 50.0),
            player.pos.y - player.height - uniform(rng, 120.0, 200.0),
        ),
        SpawnStrategy::OnPlatform => match platforms {
            [] => anywhere(rng),
            _ => {
                let p = &platforms[rng.random_range(0..platforms.len())];
                Vec2::new(uniform(rng, p.pos.x, p.pos.x + p.width), p.pos.y - 25.0)
            }
        },
        SpawnStrategy::Anywhere => anywhere(rng),
    };
    clamp_to_canvas(pos, ENTITY_RADIUS)
}

/// Search for a dynamic bomb spot at least `DYNAMIC_HAZARD_SPACING` from
/// every active bomb, giving up after `SPAWN_POSITION_ATTEMPTS` candidates
pub fn find_dynamic_hazard_spot<R: Rng + ?Sized>(
    player: &Player,
    platforms: &[Platform],
    hazards: &[Hazard],
    rng: &mut R,
) -> Option<Vec2> {
    (0..SPAWN_POSITION_ATTEMPTS)
        .map(|_| {
            let strategy = SpawnStrategy::pick(!platforms.is_empty(), rng);
            strategy_position(strategy, player, platforms, rng)
        })
        .find(|&pos| {
            hazards
                .iter()
                .filter(|h| h.active)
                .all(|h| distance(h.pos, pos) >= DYNAMIC_HAZARD_SPACING)
        })
}

/// Pick a spot for a dynamic bomb away from the active ones, falling back to
/// a random spot when the field is too crowded
pub fn dynamic_hazard_spawn_position<R: Rng + ?Sized>(
    player: &Player,
    platforms: &[Platform],
    hazards: &[Hazard],
    rng: &mut R,
) -> Vec2 {
    find_dynamic_hazard_spot(player, platforms, hazards, rng).unwrap_or_else(|| {
        log::debug!("Dynamic bomb spot budget spent, using a random spot");
        clamp_to_canvas(anywhere(rng), ENTITY_RADIUS)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::level::PlatformColor;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn rng() -> Pcg32 {
        Pcg32::seed_from_u64(42)
    }

    fn progression() -> Progression {
        Progression::new(ProgressionState::default(), TransitionTimings::default())
    }

    #[test]
    fn test_set_level_scaling() {
        let mut p = progression();
        let level = p.set_level(2, &mut rng()).unwrap();
        assert_eq!(level.collectible_count, 8);
        assert!((p.state().difficulty_multiplier - 1.1).abs() < 1e-5);
        assert_eq!(p.state().hazard_spawn_rate_multiplier, 1.0);
        assert!(!p.state().dynamic_level_mode_active);

        p.set_level(5, &mut rng()).unwrap();
        assert!((p.state().hazard_spawn_rate_multiplier - 1.4).abs() < 1e-5);
        assert!(p.state().dynamic_level_mode_active);
        assert_eq!(p.state().highest_level_reached, 5);

        // Going back keeps the spawn rate and the high-water mark
        p.set_level(2, &mut rng()).unwrap();
        assert!((p.state().hazard_spawn_rate_multiplier - 1.4).abs() < 1e-5);
        assert_eq!(p.state().highest_level_reached, 5);
        assert!(p.state().dynamic_level_mode_active);
    }

    #[test]
    fn test_set_level_zero_is_noop() {
        let mut p = progression();
        let before = p.state().clone();
        assert!(p.set_level(0, &mut rng()).is_none());
        assert_eq!(p.state(), &before);
    }

    #[test]
    fn test_transition_sequence() {
        let mut p = progression();
        let mut sched = Scheduler::new();
        let mut events = Vec::new();
        let stats = LevelStats {
            score: 50,
            collectibles: 5,
            currency: 5,
        };

        assert!(p.start_transition(1, 2, stats, &mut sched, &mut events));
        assert!(p.in_transition());
        assert_eq!(p.state().total_score, 50);
        assert!(events.iter().any(|e| matches!(
            e,
            GameEvent::Fade { direction: FadeDirection::Out, .. }
        )));

        let mut midpoints = 0;
        let mut finished = false;
        for _ in 0..100 {
            for task in sched.advance(0.1) {
                match p.handle_task(task, &mut sched, &mut events) {
                    Some(TransitionStep::Midpoint { to }) => {
                        assert_eq!(to, 2);
                        assert!(p.in_transition());
                        midpoints += 1;
                    }
                    Some(TransitionStep::Finished { to }) => {
                        assert_eq!(to, 2);
                        finished = true;
                    }
                    None => {}
                }
            }
        }
        assert_eq!(midpoints, 1);
        assert!(finished);
        assert!(!p.in_transition());
        assert!(p.transition().is_none());
    }

    #[test]
    fn test_duplicate_transition_rejected() {
        let mut p = progression();
        let mut sched = Scheduler::new();
        let mut events = Vec::new();
        let stats = LevelStats {
            score: 10,
            collectibles: 1,
            currency: 5,
        };
        assert!(p.start_transition(1, 2, stats, &mut sched, &mut events));
        let snapshot = p.state().clone();
        let pending = sched.pending();

        assert!(!p.start_transition(1, 2, stats, &mut sched, &mut events));
        assert_eq!(p.state(), &snapshot);
        assert_eq!(sched.pending(), pending);

        let midpoints = sched
            .advance(10.0)
            .into_iter()
            .filter_map(|t| p.handle_task(t, &mut sched, &mut events))
            .filter(|s| matches!(s, TransitionStep::Midpoint { .. }))
            .count();
        assert_eq!(midpoints, 1);
    }

    #[test]
    fn test_cancel_transition() {
        let mut p = progression();
        let mut sched = Scheduler::new();
        let mut events = Vec::new();
        p.start_transition(1, 2, LevelStats::default(), &mut sched, &mut events);
        assert!(p.cancel_transition());
        assert!(!p.in_transition());
        // A stale task after cancellation does nothing
        assert_eq!(p.handle_task(Task::FadeOutComplete, &mut sched, &mut events), None);
        assert!(!p.cancel_transition());
    }

    #[test]
    fn test_no_dynamic_spawn_outside_dynamic_mode() {
        let p = progression();
        let mut r = rng();
        for _ in 0..1000 {
            assert!(!p.should_spawn_dynamic_hazard(60.0, 1.0, HazardSpawnTiming::PerFrame, &mut r));
        }
    }

    #[test]
    fn test_no_dynamic_spawn_during_transition() {
        let mut p = progression();
        p.set_level(10, &mut rng());
        let mut sched = Scheduler::new();
        let mut events = Vec::new();
        p.start_transition(10, 11, LevelStats::default(), &mut sched, &mut events);
        let mut r = rng();
        for _ in 0..1000 {
            let timing = HazardSpawnTiming::PerSecond;
            assert!(!p.should_spawn_dynamic_hazard(60.0, 1.0, timing, &mut r));
        }
    }

    #[test]
    fn test_spawn_chance() {
        // Ramp: half way through the ramp is half the chance
        let c = spawn_chance(1.0, 15.0, 1.0 / 60.0, HazardSpawnTiming::PerFrame);
        assert!((c - 0.001).abs() < 1e-9);
        let c = spawn_chance(2.0, 100.0, 1.0 / 60.0, HazardSpawnTiming::PerFrame);
        assert!((c - 0.004).abs() < 1e-9);
        assert_eq!(spawn_chance(1.0, 0.0, 1.0, HazardSpawnTiming::PerSecond), 0.0);

        // Per-second timing: one 60 FPS frame matches the per-frame chance,
        // a 30 FPS frame carries roughly twice the chance
        let at_60 = spawn_chance(1.0, 30.0, 1.0 / 60.0, HazardSpawnTiming::PerSecond);
        let at_30 = spawn_chance(1.0, 30.0, 1.0 / 30.0, HazardSpawnTiming::PerSecond);
        assert!((at_60 - 0.002).abs() < 1e-6);
        assert!((at_30 - 2.0 * 0.002).abs() < 1e-5);
    }

    #[test]
    fn test_strategy_weights() {
        assert_eq!(SpawnStrategy::OnPlatform.weight(false), 0);
        let mut r = rng();
        for _ in 0..500 {
            assert_ne!(SpawnStrategy::pick(false, &mut r), SpawnStrategy::OnPlatform);
        }
    }

    #[test]
    fn test_spawn_position_inside_canvas() {
        let player = Player::default();
        let hazards = vec![Hazard::new(Vec2::new(600.0, 480.0))];
        let mut r = rng();
        for _ in 0..200 {
            let pos = dynamic_hazard_spawn_position(&player, &[], &hazards, &mut r);
            assert!(pos.x >= ENTITY_RADIUS && pos.x <= CANVAS_WIDTH - ENTITY_RADIUS);
            assert!(pos.y >= ENTITY_RADIUS && pos.y <= CANVAS_HEIGHT - ENTITY_RADIUS);
        }
    }

    /// Bombs on a 40-unit grid covering the canvas
    fn bomb_grid() -> Vec<Hazard> {
        let mut hazards = Vec::new();
        let mut x = 0.0;
        while x <= CANVAS_WIDTH {
            let mut y = 0.0;
            while y <= CANVAS_HEIGHT {
                hazards.push(Hazard::new(Vec2::new(x, y)));
                y += 40.0;
            }
            x += 40.0;
        }
        hazards
    }

    #[test]
    fn test_spawn_position_terminates_when_crowded() {
        // No strategy can find a free spot between active bombs
        let hazards = bomb_grid();
        let player = Player::default();
        let mut r = rng();
        assert_eq!(find_dynamic_hazard_spot(&player, &[], &hazards, &mut r), None);
        let pos = dynamic_hazard_spawn_position(&player, &[], &hazards, &mut r);
        assert!(pos.x.is_finite() && pos.y.is_finite());
    }

    #[test]
    fn test_spawn_spot_keeps_clear_of_active_bombs() {
        let player = Player::default();
        let platforms = [Platform::new(
            500.0,
            350.0,
            150.0,
            PLATFORM_HEIGHT,
            PlatformColor::Blue,
        )];
        let hazards = vec![
            Hazard::new(Vec2::new(600.0, 480.0)),
            Hazard::new(Vec2::new(400.0, 300.0)),
            Hazard::new(Vec2::new(575.0, 325.0)),
            Hazard::dynamic(Vec2::new(200.0, 480.0)),
        ];
        let mut r = rng();
        let mut found = 0;
        for _ in 0..200 {
            if let Some(pos) = find_dynamic_hazard_spot(&player, &platforms, &hazards, &mut r) {
                found += 1;
                for h in &hazards {
                    assert!(distance(pos, h.pos) >= DYNAMIC_HAZARD_SPACING);
                }
            }
        }
        assert!(found > 0);
    }

    #[test]
    fn test_spawn_spot_ignores_spent_bombs() {
        let mut hazards = bomb_grid();
        for h in &mut hazards {
            h.trigger();
        }
        let player = Player::default();
        let mut r = rng();
        for _ in 0..50 {
            assert!(find_dynamic_hazard_spot(&player, &[], &hazards, &mut r).is_some());
        }
    }

    #[test]
    fn test_state_serde_defaults() {
        let state: ProgressionState =
            serde_json::from_str(r#"{"total_score": 120}"#).unwrap();
        assert_eq!(state.total_score, 120);
        assert_eq!(state.highest_level_reached, 1);
        assert_eq!(state.hazard_spawn_rate_multiplier, 1.0);
    }
}
