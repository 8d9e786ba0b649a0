//! Game tuning and preferences
//!
//! Persisted separately from the progression snapshot in LocalStorage.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// How the per-frame dynamic bomb chance relates to wall-clock time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum HazardSpawnTiming {
    /// Raw per-frame roll; faster displays spawn more bombs
    PerFrame,
    /// Rescaled by frame time so the rate matches 60 FPS everywhere
    #[default]
    PerSecond,
}

impl HazardSpawnTiming {
    pub fn as_str(&self) -> &'static str {
        match self {
            HazardSpawnTiming::PerFrame => "per-frame",
            HazardSpawnTiming::PerSecond => "per-second",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "per-frame" | "frame" => Some(HazardSpawnTiming::PerFrame),
            "per-second" | "second" => Some(HazardSpawnTiming::PerSecond),
            _ => None,
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Run ===
    /// Health at the start of a run
    pub starting_health: u8,
    /// Open the tutorial overlay on a fresh start
    pub show_tutorial: bool,

    // === Transitions ===
    /// Delay between clearing a level and the fade-out
    pub level_complete_delay: f64,
    pub fade_out_seconds: f64,
    pub midpoint_pause_seconds: f64,
    pub fade_in_seconds: f64,

    // === Dynamic bombs ===
    pub hazard_spawn_timing: HazardSpawnTiming,
    /// Minimum seconds between two dynamic bombs
    pub min_dynamic_hazard_interval: f32,

    // === Accessibility ===
    /// Reduced motion (instant fades)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            starting_health: PLAYER_START_HEALTH,
            show_tutorial: true,

            level_complete_delay: LEVEL_COMPLETE_DELAY,
            fade_out_seconds: FADE_OUT_DURATION,
            midpoint_pause_seconds: MIDPOINT_PAUSE,
            fade_in_seconds: FADE_IN_DURATION,

            hazard_spawn_timing: HazardSpawnTiming::PerSecond,
            min_dynamic_hazard_interval: 2.0,

            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Settings with fades collapsed for reduced motion
    pub fn effective(&self) -> Self {
        let mut settings = self.clone();
        if settings.reduced_motion {
            settings.fade_out_seconds = 0.0;
            settings.fade_in_seconds = 0.0;
        }
        settings.starting_health = settings.starting_health.max(1);
        settings
    }

    /// LocalStorage key
    #[cfg(target_arch = "wasm32")]
    const STORAGE_KEY: &'static str = "snack_run_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match serde_json::from_str(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Ignoring unreadable settings: {}", e),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        let Some(storage) = storage else {
            log::warn!("LocalStorage not available, settings not saved");
            return;
        };
        let json = match serde_json::to_string(self) {
            Ok(json) => json,
            Err(e) => {
                log::warn!("Could not serialize settings: {}", e);
                return;
            }
        };
        match storage.set_item(Self::STORAGE_KEY, &json) {
            Ok(()) => log::info!("Settings saved"),
            Err(_) => log::warn!("LocalStorage refused the settings write"),
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reduced_motion_collapses_fades() {
        let settings = Settings {
            reduced_motion: true,
            ..Default::default()
        };
        let eff = settings.effective();
        assert_eq!(eff.fade_out_seconds, 0.0);
        assert_eq!(eff.fade_in_seconds, 0.0);
        assert_eq!(eff.midpoint_pause_seconds, MIDPOINT_PAUSE);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{"hazard_spawn_timing": "PerFrame"}"#).unwrap();
        assert_eq!(settings.hazard_spawn_timing, HazardSpawnTiming::PerFrame);
        assert_eq!(settings.starting_health, PLAYER_START_HEALTH);
    }

    #[test]
    fn test_timing_names() {
        assert_eq!(
            HazardSpawnTiming::from_str("Per-Frame"),
            Some(HazardSpawnTiming::PerFrame)
        );
        assert_eq!(HazardSpawnTiming::PerSecond.as_str(), "per-second");
        assert_eq!(HazardSpawnTiming::from_str("sometimes"), None);
    }
}
