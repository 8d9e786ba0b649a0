//! Per-frame game loop driver
//!
//! `Game` owns everything the core mutates: the live level, the progression
//! record, the task queue and the ambient RNG. The host calls `tick` once per
//! rendered frame and drains events for presentation.

use rand::Rng;

use super::level::Hazard;
use super::progression::{
    LevelStats, Progression, ProgressionState, Task, TransitionStep, TransitionTimings,
    dynamic_hazard_spawn_position,
};
use super::resolver::{HazardOutcome, resolve_collisions};
use super::scheduler::Scheduler;
use super::state::{GameEvent, GameState, Modal};
use crate::persistence::{PersistenceError, SnapshotStore, save_progression_snapshot};
use crate::settings::Settings;

/// The game core, independent of rendering and input
pub struct Game<R: Rng> {
    state: GameState,
    progression: Progression,
    scheduler: Scheduler<Task>,
    settings: Settings,
    rng: R,
    events: Vec<GameEvent>,
    /// `level_time` of the last dynamic bomb
    last_dynamic_spawn: Option<f32>,
}

impl<R: Rng> Game<R> {
    /// Create a game from saved progression; call `start` to load level 1
    pub fn new(settings: Settings, progress: ProgressionState, rng: R) -> Self {
        let settings = settings.effective();
        let mut state = GameState::new();
        state.player.health = settings.starting_health;
        if settings.show_tutorial {
            state.modal = Some(Modal::Tutorial);
        }

        Self {
            state,
            progression: Progression::new(progress, TransitionTimings::from(&settings)),
            scheduler: Scheduler::new(),
            settings,
            rng,
            events: Vec::new(),
            last_dynamic_spawn: None,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Direct access for the host's player physics and input handling
    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn progression(&self) -> &Progression {
        &self.progression
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Swap in new preferences. Health and the tutorial only apply to the
    /// next run; timings apply from the next transition.
    pub fn apply_settings(&mut self, settings: Settings) {
        let settings = settings.effective();
        self.progression.set_timings(TransitionTimings::from(&settings));
        self.settings = settings;
        log::info!("Settings applied");
    }

    /// Tasks still waiting on the clock
    pub fn pending_tasks(&self) -> usize {
        self.scheduler.pending()
    }

    /// Load the first level
    pub fn start(&mut self) {
        self.load_level(1);
    }

    /// Replace the active level. Invalid numbers leave the current level in place.
    pub fn load_level(&mut self, level_number: u32) -> bool {
        let Some(level) = self.progression.set_level(level_number, &mut self.rng) else {
            log::warn!(
                "Cannot load level {}; staying on level {}",
                level_number,
                self.state.current_level
            );
            return false;
        };

        self.state.spawn_level(level_number, &level, &mut self.rng);
        self.last_dynamic_spawn = None;
        self.events.push(GameEvent::LevelLoaded {
            level: level_number,
        });
        if level_number > 1 {
            self.events
                .push(GameEvent::notify(format!("Starting Level {}!", level_number)));
        }
        self.events.push(GameEvent::ProgressCheckpoint);
        true
    }

    /// Respawn the current level after a lost life; score and health carry over
    fn restart_level(&mut self) {
        let level_number = self.state.current_level;
        let Some(level) = self.progression.set_level(level_number, &mut self.rng) else {
            return;
        };
        self.state.spawn_level(level_number, &level, &mut self.rng);
        self.last_dynamic_spawn = None;
        self.events.push(GameEvent::LevelRestarted {
            level: level_number,
        });
    }

    /// Advance one frame of `dt` seconds
    pub fn tick(&mut self, dt: f32) {
        let dt = dt.max(0.0);

        for task in self.scheduler.advance(dt as f64) {
            self.dispatch(task);
        }

        if self.progression.in_transition() || self.state.modal.is_some() {
            return;
        }

        if !self.state.game_over && !self.state.level_complete {
            self.state.level_time += dt;
        }

        let report = resolve_collisions(
            &mut self.state,
            self.settings.level_complete_delay,
            &mut self.scheduler,
            &mut self.events,
        );
        if let Some(HazardOutcome::LifeLost { .. }) = report.hazard {
            self.restart_level();
            return;
        }

        self.spawn_dynamic_hazard(dt);
    }

    fn dispatch(&mut self, task: Task) {
        match task {
            Task::BeginTransition { from, to } => {
                let stats = LevelStats {
                    score: self.state.level_score(),
                    collectibles: self.state.level_collected() as u64,
                    currency: self.state.level_coins() as u64,
                };
                self.progression.start_transition(
                    from,
                    to,
                    stats,
                    &mut self.scheduler,
                    &mut self.events,
                );
            }
            task => {
                match self
                    .progression
                    .handle_task(task, &mut self.scheduler, &mut self.events)
                {
                    Some(TransitionStep::Midpoint { to }) => {
                        self.load_level(to);
                    }
                    Some(TransitionStep::Finished { to }) => {
                        log::info!("Transition finished, playing level {}", to);
                        self.events.push(GameEvent::ProgressCheckpoint);
                    }
                    None => {}
                }
            }
        }
    }

    fn spawn_dynamic_hazard(&mut self, dt: f32) {
        if self.state.is_suspended() {
            return;
        }
        let now = self.state.level_time;
        if let Some(last) = self.last_dynamic_spawn {
            if now - last < self.settings.min_dynamic_hazard_interval {
                return;
            }
        }
        if !self.progression.should_spawn_dynamic_hazard(
            now,
            dt,
            self.settings.hazard_spawn_timing,
            &mut self.rng,
        ) {
            return;
        }

        let pos = dynamic_hazard_spawn_position(
            &self.state.player,
            &self.state.platforms,
            &self.state.hazards,
            &mut self.rng,
        );
        self.state.hazards.push(Hazard::dynamic(pos));
        self.last_dynamic_spawn = Some(now);
        self.events.push(GameEvent::HazardSpawned { pos });
        log::debug!("Dynamic bomb spawned at {:.0}, {:.0}", pos.x, pos.y);
    }

    /// Open an overlay; gameplay pauses until it closes
    pub fn open_modal(&mut self, modal: Modal) {
        self.state.modal = Some(modal);
    }

    pub fn close_modal(&mut self) {
        self.state.modal = None;
    }

    /// Start the run over from level 1, dropping anything still scheduled
    pub fn reset(&mut self) {
        let cancelled = self.scheduler.pending();
        self.scheduler.clear();
        self.progression.cancel_transition();

        let mut state = GameState::new();
        state.player.health = self.settings.starting_health;
        self.state = state;
        self.last_dynamic_spawn = None;
        log::info!("Game reset ({} scheduled tasks cancelled)", cancelled);

        self.load_level(1);
    }

    /// Hand pending presentation events to the caller
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Persist the progression record
    pub fn save_progress<S: SnapshotStore + ?Sized>(
        &self,
        store: &mut S,
    ) -> Result<(), PersistenceError> {
        save_progression_snapshot(store, self.progression.state())
    }
}
