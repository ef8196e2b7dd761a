//! `localStorage` progress backend

use gloo::storage::{errors::StorageError, LocalStorage, Storage};
use vsl_core::{Error, ProgressRecord, ProgressStorage, Result};

/// Progress records in `window.localStorage`.
///
/// Sandboxed iframes and some private modes throw on access; the backend
/// then reports every operation as unavailable and the player treats that
/// as "no saved progress".
#[derive(Debug, Clone, Copy)]
pub struct BrowserStorage {
    available: bool,
}

impl BrowserStorage {
    pub fn new() -> Self {
        let available = web_sys::window()
            .and_then(|w| w.local_storage().ok().flatten())
            .is_some();
        if !available {
            tracing::warn!("localStorage unavailable, progress will not persist");
        }
        Self { available }
    }

    fn check(&self) -> Result<()> {
        if self.available {
            Ok(())
        } else {
            Err(Error::StorageUnavailable("localStorage is not accessible".into()))
        }
    }
}

impl Default for BrowserStorage {
    fn default() -> Self {
        Self::new()
    }
}

fn map_error(err: StorageError) -> Error {
    match err {
        StorageError::SerdeError(e) => Error::Serialization(e),
        other => Error::StorageWrite(other.to_string()),
    }
}

impl ProgressStorage for BrowserStorage {
    fn read(&self, key: &str) -> Result<Option<ProgressRecord>> {
        self.check()?;
        match LocalStorage::get::<ProgressRecord>(key) {
            Ok(record) => Ok(Some(record)),
            Err(StorageError::KeyNotFound(_)) => Ok(None),
            Err(e) => Err(map_error(e)),
        }
    }

    fn write(&self, key: &str, record: &ProgressRecord) -> Result<()> {
        self.check()?;
        LocalStorage::set(key, record).map_err(map_error)
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.check()?;
        LocalStorage::delete(key);
        Ok(())
    }
}
