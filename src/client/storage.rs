//! Durable client-side session storage
//!
//! The persisted document holds two keys, `token` (the credential) and
//! `user` (the cached profile snapshot). They are written together and
//! cleared together.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::client::credentials::Credential;
use crate::shared::User;

/// What survives a process restart
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PersistedSession {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<Credential>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
}

impl PersistedSession {
    pub fn is_empty(&self) -> bool {
        self.token.is_none() && self.user.is_none()
    }
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("session storage I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("session storage is corrupt: {0}")]
    Json(#[from] serde_json::Error),
}

/// Backing store for [`PersistedSession`]
pub trait SessionStorage: Send + Sync {
    fn load(&self) -> Result<PersistedSession, StorageError>;
    fn save(&self, session: &PersistedSession) -> Result<(), StorageError>;
    fn clear(&self) -> Result<(), StorageError>;
}

/// JSON file storage, one document per client installation
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStorage for FileStorage {
    fn load(&self) -> Result<PersistedSession, StorageError> {
        match std::fs::read(&self.path) {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(PersistedSession::default()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, session: &PersistedSession) -> Result<(), StorageError> {
        if session.is_empty() {
            return self.clear();
        }
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        // write-then-rename so a crash never leaves half a document
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_vec_pretty(session)?)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-process storage, used by tests and ephemeral sessions
#[derive(Debug, Default)]
pub struct MemoryStorage {
    inner: Mutex<PersistedSession>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with an already persisted session
    pub fn with_session(session: PersistedSession) -> Self {
        Self {
            inner: Mutex::new(session),
        }
    }

    /// Copy of what is currently stored
    pub fn snapshot(&self) -> PersistedSession {
        self.inner
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

impl SessionStorage for MemoryStorage {
    fn load(&self) -> Result<PersistedSession, StorageError> {
        Ok(self.snapshot())
    }

    fn save(&self, session: &PersistedSession) -> Result<(), StorageError> {
        if let Ok(mut guard) = self.inner.lock() {
            *guard = session.clone();
        }
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        if let Ok(mut guard) = self.inner.lock() {
            *guard = PersistedSession::default();
        }
        Ok(())
    }
}
