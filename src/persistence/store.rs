//! Key/value backends for the progression snapshot

use super::PersistenceError;

/// A single-slot text store
pub trait SnapshotStore {
    /// Stored snapshot, `None` if nothing was saved yet
    fn read(&self) -> Result<Option<String>, PersistenceError>;
    fn write(&mut self, json: &str) -> Result<(), PersistenceError>;
}

/// In-process store (native runs and tests)
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    contents: Option<String>,
    unavailable: bool,
}

impl MemoryStore {
    pub fn with_contents(json: &str) -> Self {
        Self {
            contents: Some(json.to_string()),
            unavailable: false,
        }
    }

    /// A store that fails every operation
    pub fn unavailable() -> Self {
        Self {
            contents: None,
            unavailable: true,
        }
    }

    pub fn contents(&self) -> Option<&str> {
        self.contents.as_deref()
    }
}

impl SnapshotStore for MemoryStore {
    fn read(&self) -> Result<Option<String>, PersistenceError> {
        if self.unavailable {
            return Err(PersistenceError::Unavailable("memory store disabled".into()));
        }
        Ok(self.contents.clone())
    }

    fn write(&mut self, json: &str) -> Result<(), PersistenceError> {
        if self.unavailable {
            return Err(PersistenceError::Unavailable("memory store disabled".into()));
        }
        self.contents = Some(json.to_string());
        Ok(())
    }
}

/// Browser LocalStorage slot
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone)]
pub struct LocalStorageStore {
    key: String,
}

#[cfg(target_arch = "wasm32")]
impl LocalStorageStore {
    pub const DEFAULT_KEY: &'static str = "snack_run_progress";

    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    fn storage() -> Result<web_sys::Storage, PersistenceError> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .ok_or_else(|| PersistenceError::Unavailable("LocalStorage not available".into()))
    }
}

#[cfg(target_arch = "wasm32")]
impl Default for LocalStorageStore {
    fn default() -> Self {
        Self::new(Self::DEFAULT_KEY)
    }
}

#[cfg(target_arch = "wasm32")]
impl SnapshotStore for LocalStorageStore {
    fn read(&self) -> Result<Option<String>, PersistenceError> {
        Self::storage()?
            .get_item(&self.key)
            .map_err(|_| PersistenceError::Unavailable(format!("read of {} refused", self.key)))
    }

    fn write(&mut self, json: &str) -> Result<(), PersistenceError> {
        Self::storage()?
            .set_item(&self.key, json)
            .map_err(|_| PersistenceError::Unavailable(format!("write of {} refused", self.key)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_overwrites() {
        let mut store = MemoryStore::default();
        assert_eq!(store.read().unwrap(), None);
        store.write("a").unwrap();
        store.write("b").unwrap();
        assert_eq!(store.contents(), Some("b"));
    }
}
