//! Local persistence for the admin session and the login cooldown.
//!
//! Plays the role browser local storage plays for a web front end: one small
//! document holding the bearer token, the cached profile and the time until
//! which login is blocked.

use chrono::{DateTime, Utc};
use ecocharge_types::AdminSession;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ClientError;

/// Everything the client keeps between runs.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredState {
    /// Cached admin session, if logged in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<AdminSession>,
    /// Login is refused locally until this instant
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cooldown_until: Option<DateTime<Utc>>,
}

/// Storage backend for [`StoredState`].
///
/// Implementors only provide whole-document access; the field helpers are
/// built on [`SessionStore::modify`], which must apply the closure atomically
/// with respect to other callers of the same store.
pub trait SessionStore: Send + Sync {
    /// Read the current state.
    fn load(&self) -> Result<StoredState, ClientError>;

    /// Apply `update` to the current state and persist the result.
    fn modify(
        &self,
        update: &mut dyn FnMut(&mut StoredState),
    ) -> Result<StoredState, ClientError>;

    fn load_session(&self) -> Result<Option<AdminSession>, ClientError> {
        Ok(self.load()?.session)
    }

    fn save_session(&self, session: &AdminSession) -> Result<(), ClientError> {
        self.modify(&mut |state: &mut StoredState| state.session = Some(session.clone())).map(drop)
    }

    fn clear_session(&self) -> Result<(), ClientError> {
        self.modify(&mut |state: &mut StoredState| state.session = None).map(drop)
    }

    fn load_cooldown(&self) -> Result<Option<DateTime<Utc>>, ClientError> {
        Ok(self.load()?.cooldown_until)
    }

    fn save_cooldown(&self, until: DateTime<Utc>) -> Result<(), ClientError> {
        self.modify(&mut |state: &mut StoredState| state.cooldown_until = Some(until)).map(drop)
    }

    fn clear_cooldown(&self) -> Result<(), ClientError> {
        self.modify(&mut |state: &mut StoredState| state.cooldown_until = None).map(drop)
    }
}

/// In-process store; nothing survives the process.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    state: Mutex<StoredState>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing session.
    pub fn with_session(session: AdminSession) -> Self {
        Self { state: Mutex::new(StoredState { session: Some(session), cooldown_until: None }) }
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<StoredState, ClientError> {
        Ok(self.state.lock().clone())
    }

    fn modify(
        &self,
        update: &mut dyn FnMut(&mut StoredState),
    ) -> Result<StoredState, ClientError> {
        let mut state = self.state.lock();
        update(&mut state);
        Ok(state.clone())
    }
}

/// JSON file store (`session.json` in the data directory).
///
/// Writes go through a temp file and a rename so a crash never leaves a
/// half-written session behind. A corrupt file is treated as empty.
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), lock: Mutex::new(()) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<StoredState, ClientError> {
        if !self.path.exists() {
            return Ok(StoredState::default());
        }
        let content = fs::read_to_string(&self.path)
            .map_err(|e| ClientError::Storage(format!("Failed to read session file: {}", e)))?;
        match serde_json::from_str(&content) {
            Ok(state) => Ok(state),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), "Ignoring corrupt session file: {}", e);
                Ok(StoredState::default())
            },
        }
    }

    fn write(&self, state: &StoredState) -> Result<(), ClientError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                ClientError::Storage(format!("Failed to create data directory: {}", e))
            })?;
        }
        let temp_path = self.path.with_extension("json.tmp");
        let content = serde_json::to_string_pretty(state)
            .map_err(|e| ClientError::Storage(format!("Failed to serialize session: {}", e)))?;
        fs::write(&temp_path, content)
            .map_err(|e| ClientError::Storage(format!("Failed to write session file: {}", e)))?;
        fs::rename(&temp_path, &self.path)
            .map_err(|e| ClientError::Storage(format!("Failed to save session file: {}", e)))
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<StoredState, ClientError> {
        let _guard = self.lock.lock();
        self.read()
    }

    fn modify(
        &self,
        update: &mut dyn FnMut(&mut StoredState),
    ) -> Result<StoredState, ClientError> {
        let _guard = self.lock.lock();
        let mut state = self.read()?;
        update(&mut state);
        self.write(&state)?;
        Ok(state)
    }
}
