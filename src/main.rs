//! SnackRun native entry point
//!
//! The playable game runs in the browser. Natively this runs a headless
//! autopilot through the level progression, which is handy for watching the
//! core's logs and checking generated levels.
//!
//! Usage: `snack-run [target_level] [seed]`

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use glam::Vec2;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;
    use snack_run::Settings;
    use snack_run::persistence::{MemoryStore, load_progression_snapshot};
    use snack_run::sim::{Game, GameEvent};

    const FRAME: f32 = 1.0 / 60.0;
    /// Frames between autopilot hops
    const HOP_INTERVAL: u32 = 20;
    const MAX_FRAMES: u32 = 60 * 60 * 30;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let target_level: u32 = args.next().and_then(|a| a.parse().ok()).unwrap_or(6);
    let seed: u64 = match args.next().and_then(|a| a.parse().ok()) {
        Some(seed) => seed,
        None => std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0),
    };
    log::info!("SnackRun autopilot to level {} (seed {})", target_level, seed);

    let mut store = MemoryStore::default();
    let settings = Settings {
        show_tutorial: false,
        ..Settings::load()
    };
    let mut game = Game::new(
        settings,
        load_progression_snapshot(&store),
        Pcg32::seed_from_u64(seed),
    );
    game.start();

    let mut frame = 0;
    while frame < MAX_FRAMES {
        if frame % HOP_INTERVAL == 0 && !game.state().is_suspended() {
            // Hop onto the nearest snack still in play
            let state = game.state();
            let here = state.player.pos;
            let height = state.player.height;
            let nearest = state
                .collectibles
                .iter()
                .filter(|c| !c.collected)
                .min_by(|a, b| a.pos.distance(here).total_cmp(&b.pos.distance(here)))
                .map(|c| c.pos);
            if let Some(pos) = nearest {
                game.state_mut().player.pos = Vec2::new(pos.x, pos.y + height / 2.0);
            }
        }

        game.tick(FRAME);
        frame += 1;

        for event in game.drain_events() {
            match event {
                GameEvent::ProgressCheckpoint => {
                    if let Err(e) = game.save_progress(&mut store) {
                        log::error!("Checkpoint save failed: {}", e);
                    }
                }
                GameEvent::Notification { text, .. } => log::info!("[notice] {}", text),
                _ => {}
            }
        }

        let state = game.state();
        if state.game_over {
            log::info!("Run ended on level {} with score {}", state.current_level, state.score);
            break;
        }
        if state.current_level >= target_level && !game.progression().in_transition() {
            log::info!("Reached level {} with score {}", state.current_level, state.score);
            break;
        }
    }

    let progress = game.progression().state();
    log::info!(
        "Highest level {}, total score {}, snacks {}, coins earned {}",
        progress.highest_level_reached,
        progress.total_score,
        progress.total_collectibles_collected,
        progress.total_currency_earned
    );
    if let Some(json) = store.contents() {
        println!("{}", json);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is `web::start`, this is just to satisfy the compiler
}
