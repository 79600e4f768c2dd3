use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tempfile::NamedTempFile;
use tracing::{debug, info};

use super::types::Session;
use crate::error::StorageError;

/// Durable home for the session across restarts.
///
/// `save` replaces the whole record; `clear` removes token and user together.
pub trait SessionStore: Send + Sync {
    fn load(&self) -> Result<Session, StorageError>;
    fn save(&self, session: &Session) -> Result<(), StorageError>;
    fn clear(&self) -> Result<(), StorageError>;
}

impl<S: SessionStore + ?Sized> SessionStore for Box<S> {
    fn load(&self) -> Result<Session, StorageError> {
        (**self).load()
    }

    fn save(&self, session: &Session) -> Result<(), StorageError> {
        (**self).save(session)
    }

    fn clear(&self) -> Result<(), StorageError> {
        (**self).clear()
    }
}

/// JSON file with two entries, `authToken` and `user`.
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<data_dir>/fraudfinder/session.json`
    pub fn default_location() -> Result<Self, StorageError> {
        let dir = dirs::data_dir().ok_or(StorageError::NoDataDir)?;
        Ok(Self::new(dir.join("fraudfinder").join("session.json")))
    }

    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join("session.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Session, StorageError> {
        if !self.path.exists() {
            debug!("No persisted session at {:?}", self.path);
            return Ok(Session::default());
        }
        let content = std::fs::read_to_string(&self.path)?;
        let session: Session = serde_json::from_str(&content)?;
        Ok(session)
    }

    fn save(&self, session: &Session) -> Result<(), StorageError> {
        let json = serde_json::to_string_pretty(session)?;
        let parent = self.path.parent().ok_or(StorageError::NoDataDir)?;
        std::fs::create_dir_all(parent)?;

        // Temp file in the same directory so the rename stays on one filesystem
        let mut temp = NamedTempFile::new_in(parent)?;
        temp.write_all(json.as_bytes())?;
        temp.flush()?;
        temp.persist(&self.path)?;

        info!("Persisted session to {:?}", self.path);
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                info!("Removed persisted session at {:?}", self.path);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-process store. Clones share the same slot, so a second manager can be
/// restored from what the first one persisted.
#[derive(Clone, Default)]
pub struct MemorySessionStore {
    slot: Arc<Mutex<Option<Session>>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// What is currently persisted, if anything.
    pub fn snapshot(&self) -> Option<Session> {
        self.slot.lock().ok().and_then(|slot| slot.clone())
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Session, StorageError> {
        let slot = self.slot.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(slot.clone().unwrap_or_default())
    }

    fn save(&self, session: &Session) -> Result<(), StorageError> {
        let mut slot = self.slot.lock().map_err(|_| StorageError::Poisoned)?;
        *slot = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        let mut slot = self.slot.lock().map_err(|_| StorageError::Poisoned)?;
        *slot = None;
        Ok(())
    }
}
