//! Progression snapshot persistence
//!
//! Features:
//! - Flat JSON record of `ProgressionState`
//! - Pluggable stores (in-memory, LocalStorage on web)
//! - Missing or corrupt snapshots fall back to a fresh state

pub mod store;

pub use store::{MemoryStore, SnapshotStore};
#[cfg(target_arch = "wasm32")]
pub use store::LocalStorageStore;

use crate::sim::progression::ProgressionState;

/// Errors raised by snapshot stores and codecs
#[derive(Debug)]
pub enum PersistenceError {
    /// The backing store is missing or refused the operation
    Unavailable(String),
    Serialization(serde_json::Error),
}

impl std::fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PersistenceError::Unavailable(msg) => write!(f, "Storage unavailable: {}", msg),
            PersistenceError::Serialization(e) => write!(f, "Serialization error: {}", e),
        }
    }
}

impl std::error::Error for PersistenceError {}

impl From<serde_json::Error> for PersistenceError {
    fn from(err: serde_json::Error) -> Self {
        PersistenceError::Serialization(err)
    }
}

/// Parse a snapshot; the transition flag is never carried across sessions
pub fn decode_snapshot(json: &str) -> Result<ProgressionState, PersistenceError> {
    let mut state: ProgressionState = serde_json::from_str(json)?;
    state.in_transition = false;
    state.highest_level_reached = state.highest_level_reached.max(1);
    Ok(state)
}

pub fn encode_snapshot(state: &ProgressionState) -> Result<String, PersistenceError> {
    Ok(serde_json::to_string(state)?)
}

/// Load progression, defaulting on absence or any failure
pub fn load_progression_snapshot<S: SnapshotStore + ?Sized>(store: &S) -> ProgressionState {
    let json = match store.read() {
        Ok(Some(json)) => json,
        Ok(None) => {
            log::info!("No saved progress found, starting fresh");
            return ProgressionState::default();
        }
        Err(e) => {
            log::warn!("Could not read saved progress: {}", e);
            return ProgressionState::default();
        }
    };

    match decode_snapshot(&json) {
        Ok(state) => {
            log::info!(
                "Loaded progress: highest level {}, total score {}",
                state.highest_level_reached,
                state.total_score
            );
            state
        }
        Err(e) => {
            log::warn!("Discarding corrupt progress snapshot: {}", e);
            ProgressionState::default()
        }
    }
}

/// Save progression; failures are logged and returned
pub fn save_progression_snapshot<S: SnapshotStore + ?Sized>(
    store: &mut S,
    state: &ProgressionState,
) -> Result<(), PersistenceError> {
    let json = encode_snapshot(state)?;
    store.write(&json).inspect_err(|e| {
        log::warn!("Could not save progress: {}", e);
    })?;
    log::debug!("Progress saved (highest level {})", state.highest_level_reached);
    Ok(())
}
