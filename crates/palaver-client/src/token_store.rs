//! Durable credential slot.
//!
//! A single key-value slot addressed by the fixed key `access_token`: read
//! on startup, written on login, cleared on logout or decode failure. The
//! store performs no well-formedness validation; a poisoned token is
//! detected (and the slot cleared) by credential decoding, not here.

use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, PoisonError},
};

use crate::error::StoreError;

/// Fixed key addressing the credential slot.
const TOKEN_KEY: &str = "access_token";

/// Durable token slot.
///
/// Synchronous by design (Sans-IO compliance at the state machine layer);
/// implementations typically share state via `Arc`, so clones address the
/// same slot.
pub trait TokenStore: Clone + Send + Sync + 'static {
    /// Persist the token, replacing any previous value.
    fn save(&self, token: &str) -> Result<(), StoreError>;

    /// Read the stored token. `None` if the slot is empty.
    fn load(&self) -> Result<Option<String>, StoreError>;

    /// Empty the slot. Idempotent.
    fn clear(&self) -> Result<(), StoreError>;
}

/// File-backed token slot under a configurable directory.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    /// Create a store writing to `<dir>/access_token`.
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self { path: dir.as_ref().join(TOKEN_KEY) }
    }

    /// Path of the underlying slot file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn save(&self, token: &str) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(fs::write(&self.path, token)?)
    }

    fn load(&self) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(token) => Ok(Some(token)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn clear(&self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory token slot for tests and simulation.
#[derive(Debug, Clone, Default)]
pub struct MemoryTokenStore {
    slot: Arc<Mutex<Option<String>>>,
}

impl MemoryTokenStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for MemoryTokenStore {
    fn save(&self, token: &str) -> Result<(), StoreError> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(token.to_owned());
        Ok(())
    }

    fn load(&self) -> Result<Option<String>, StoreError> {
        Ok(self.slot.lock().unwrap_or_else(PoisonError::into_inner).clone())
    }

    fn clear(&self) -> Result<(), StoreError> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path());

        assert_eq!(store.load().unwrap(), None);

        store.save("abc.def.ghi").unwrap();
        assert_eq!(store.load().unwrap(), Some("abc.def.ghi".to_owned()));

        // A second instance over the same directory sees the token.
        let reopened = FileTokenStore::new(dir.path());
        assert_eq!(reopened.load().unwrap(), Some("abc.def.ghi".to_owned()));

        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn file_store_clear_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path());

        store.clear().unwrap();
        store.save("t").unwrap();
        store.clear().unwrap();
        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn save_replaces_previous_value() {
        let store = MemoryTokenStore::new();
        store.save("first").unwrap();
        store.save("second").unwrap();
        assert_eq!(store.load().unwrap(), Some("second".to_owned()));
    }

    #[test]
    fn memory_store_clones_share_the_slot() {
        let store = MemoryTokenStore::new();
        let clone = store.clone();
        store.save("t").unwrap();
        assert_eq!(clone.load().unwrap(), Some("t".to_owned()));
        clone.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
    }
}
