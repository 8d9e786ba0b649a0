//! Per-frame pickup and bomb outcomes
//!
//! Snacks and bombs are tested against the player's box with
//! `circle_near_box`. Every entity flips state at most once, so running the
//! resolver twice on the same frame never double-scores.

use super::collision::circle_near_box;
use super::progression::Task;
use super::scheduler::Scheduler;
use super::state::{GameEvent, GameState};
use crate::consts::*;

/// Outcome of a bomb hit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HazardOutcome {
    /// Health dropped; the current level must be reloaded
    LifeLost { remaining: u8 },
    /// Last life gone
    GameOver,
}

/// What happened during one resolver pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveReport {
    pub collected: usize,
    pub hazard: Option<HazardOutcome>,
    pub level_completed: bool,
}

/// Apply pickups and bomb hits for the current frame
///
/// No-op while the game is over, the level is complete or an overlay is open.
/// At most one bomb hit is resolved per pass: a hit either ends the run or
/// asks the caller to reload the level.
pub fn resolve_collisions(
    state: &mut GameState,
    completion_delay: f64,
    scheduler: &mut Scheduler<Task>,
    events: &mut Vec<GameEvent>,
) -> ResolveReport {
    let mut report = ResolveReport::default();
    if state.is_suspended() {
        return report;
    }

    let player_box = state.player.bounds();

    for i in 0..state.collectibles.len() {
        let snack = &mut state.collectibles[i];
        if snack.collected || !circle_near_box(snack.pos, snack.radius, &player_box) {
            continue;
        }
        snack.collect();
        let pos = snack.pos;

        state.record_pickup();
        report.collected += 1;
        events.push(GameEvent::ScorePopup {
            pos,
            amount: COLLECTIBLE_SCORE,
        });
        log::debug!("Snack collected! Score: {}", state.score);

        if check_level_completion(state, completion_delay, scheduler, events) {
            report.level_completed = true;
        }
    }

    if state.level_complete {
        return report;
    }

    let hit = state
        .hazards
        .iter_mut()
        .find(|h| h.active && circle_near_box(h.pos, h.radius, &player_box));
    if let Some(hazard) = hit {
        hazard.trigger();
        report.hazard = Some(apply_hazard_hit(state, events));
    }

    report
}

fn apply_hazard_hit(state: &mut GameState, events: &mut Vec<GameEvent>) -> HazardOutcome {
    let player = &mut state.player;
    if player.health > 1 {
        player.health -= 1;
        let remaining = player.health;
        log::info!("BOOM! Life lost, {} remaining", remaining);
        events.push(GameEvent::LifeLost { remaining });
        events.push(GameEvent::notify(format!(
            "Life lost! {} remaining.",
            remaining
        )));
        HazardOutcome::LifeLost { remaining }
    } else {
        player.health = 0;
        state.game_over = true;
        log::info!("BOOM! Game over with score {}", state.score);
        events.push(GameEvent::GameOver { score: state.score });
        HazardOutcome::GameOver
    }
}

/// Mark the level complete once every snack is gone
///
/// Fires once per level: awards the level's coins and schedules the move to
/// the next level after `completion_delay` seconds.
pub fn check_level_completion(
    state: &mut GameState,
    completion_delay: f64,
    scheduler: &mut Scheduler<Task>,
    events: &mut Vec<GameEvent>,
) -> bool {
    if state.level_complete || state.remaining_collectibles() > 0 {
        return false;
    }

    state.level_complete = true;
    let reward = state.level_coin_reward.unwrap_or(DEFAULT_COIN_REWARD);
    state.award_coins(reward);

    let level = state.current_level;
    log::info!("Level {} complete!", level);
    events.push(GameEvent::LevelComplete { level });
    events.push(GameEvent::CoinPopup {
        pos: state.player.pos,
        amount: reward,
    });
    scheduler.schedule(
        completion_delay,
        Task::BeginTransition {
            from: level,
            to: level.saturating_add(1),
        },
    );
    true
}
