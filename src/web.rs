//! Browser bindings
//!
//! The page owns rendering, input and player physics. It drives the core once
//! per animation frame and reads back state and events as JSON.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use wasm_bindgen::prelude::*;

use crate::persistence::{LocalStorageStore, load_progression_snapshot};
use crate::settings::Settings;
use crate::shop::{self, Upgrade};
use crate::sim::{Game, GameEvent};

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    if let Err(e) = console_log::init_with_level(log::Level::Info) {
        web_sys::console::warn_1(&format!("Logger already initialized: {}", e).into());
    }
    log::info!("SnackRun core loaded");
}

/// Game handle exported to JavaScript
#[wasm_bindgen]
pub struct SnackRun {
    game: Game<Pcg32>,
    store: LocalStorageStore,
    events: Vec<GameEvent>,
}

#[wasm_bindgen]
impl SnackRun {
    #[wasm_bindgen(constructor)]
    pub fn new() -> SnackRun {
        let store = LocalStorageStore::default();
        let progress = load_progression_snapshot(&store);
        let rng = Pcg32::from_rng(&mut rand::rng());

        let mut game = Game::new(Settings::load(), progress, rng);
        game.start();

        let mut run = SnackRun {
            game,
            store,
            events: Vec::new(),
        };
        run.collect_events();
        run
    }

    /// Advance one frame
    pub fn tick(&mut self, dt: f32) {
        self.game.tick(dt);
        self.collect_events();
    }

    /// Sync the player body after the page's physics step
    pub fn set_player(&mut self, x: f32, y: f32, vx: f32, vy: f32) {
        let player = &mut self.game.state_mut().player;
        player.pos = Vec2::new(x, y);
        player.vel = Vec2::new(vx, vy);
        if vx != 0.0 {
            player.facing = vx.signum();
        }
    }

    pub fn load_level(&mut self, level: u32) -> bool {
        let loaded = self.game.load_level(level);
        self.collect_events();
        loaded
    }

    pub fn reset(&mut self) {
        self.game.reset();
        self.collect_events();
    }

    pub fn toggle_shop(&mut self) -> bool {
        shop::toggle_shop(self.game.state_mut())
    }

    pub fn close_modal(&mut self) {
        self.game.close_modal();
    }

    /// Buy the next tier; `upgrade` is "jump" or "speed"
    pub fn purchase(&mut self, upgrade: &str) -> Result<String, JsValue> {
        let upgrade = match upgrade {
            "jump" => Upgrade::JumpPower,
            "speed" => Upgrade::MoveSpeed,
            other => return Err(JsValue::from_str(&format!("Unknown upgrade: {}", other))),
        };
        shop::purchase(self.game.state_mut(), upgrade)
            .map(|tier| tier.description.to_string())
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Live level and player state
    pub fn state_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.game.state()).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    pub fn progress_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.game.progression().state())
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    pub fn settings_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.game.settings())
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Replace and persist the preferences; missing fields take defaults
    pub fn set_settings_json(&mut self, json: &str) -> Result<(), JsValue> {
        let settings: Settings =
            serde_json::from_str(json).map_err(|e| JsValue::from_str(&e.to_string()))?;
        settings.save();
        self.game.apply_settings(settings);
        Ok(())
    }

    /// Events since the last call, oldest first
    pub fn drain_events_json(&mut self) -> Result<String, JsValue> {
        let events = std::mem::take(&mut self.events);
        serde_json::to_string(&events).map_err(|e| JsValue::from_str(&e.to_string()))
    }
}

impl Default for SnackRun {
    fn default() -> Self {
        Self::new()
    }
}

impl SnackRun {
    /// Buffer new events and persist progress at checkpoints
    fn collect_events(&mut self) {
        let events = self.game.drain_events();
        if events.contains(&GameEvent::ProgressCheckpoint) {
            if let Err(e) = self.game.save_progress(&mut self.store) {
                log::error!("Checkpoint save failed: {}", e);
            }
        }
        self.events.extend(events);
    }
}
