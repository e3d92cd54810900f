/**
 * Credential Store
 *
 * Single owner of the session credential and the cached user profile.
 * Every `set`/`clear` is written through to durable storage and is visible
 * to the next `current()` call; the gateway reads the credential here on
 * every request instead of keeping its own copy.
 */

use std::fmt;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::client::storage::{PersistedSession, SessionStorage};
use crate::shared::{AuthResponse, User};

/// Opaque bearer token plus what is needed to renew it
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Credential {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl Credential {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: None,
            expires_at: None,
        }
    }

    pub fn with_refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
        self.refresh_token = Some(refresh_token.into());
        self
    }

    /// Value of the `Authorization` header
    pub fn authorization(&self) -> String {
        format!("Bearer {}", self.access_token)
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|exp| exp <= now)
    }
}

impl From<&AuthResponse> for Credential {
    fn from(response: &AuthResponse) -> Self {
        Self {
            access_token: response.token.clone(),
            refresh_token: response.refresh_token.clone(),
            expires_at: response.expires_at,
        }
    }
}

// tokens never end up in logs
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

struct Inner {
    storage: Arc<dyn SessionStorage>,
    session: RwLock<PersistedSession>,
    identity: watch::Sender<Option<User>>,
}

/// Shared handle to the credential; clones refer to the same store
#[derive(Clone)]
pub struct CredentialStore {
    inner: Arc<Inner>,
}

impl CredentialStore {
    /// Open the store, loading whatever the storage persisted
    ///
    /// A corrupt or unreadable document is discarded: the client starts
    /// without a session instead of failing.
    pub fn open(storage: Arc<dyn SessionStorage>) -> Self {
        let mut session = match storage.load() {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!("Discarding unreadable session storage: {}", e);
                if let Err(e) = storage.clear() {
                    tracing::warn!("Failed to clear session storage: {}", e);
                }
                PersistedSession::default()
            }
        };

        // a profile without a credential is stale
        if session.token.is_none() {
            session.user = None;
        }

        let (identity, _) = watch::channel(session.user.clone());
        tracing::debug!(
            has_credential = session.token.is_some(),
            "Credential store opened"
        );

        Self {
            inner: Arc::new(Inner {
                storage,
                session: RwLock::new(session),
                identity,
            }),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, PersistedSession> {
        self.inner
            .session
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, PersistedSession> {
        self.inner
            .session
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn persist(&self, session: &PersistedSession) {
        if let Err(e) = self.inner.storage.save(session) {
            tracing::warn!("Failed to persist session: {}", e);
        }
    }

    /// Replace the current credential
    pub fn set(&self, credential: Credential) {
        let mut session = self.write();
        session.token = Some(credential);
        self.persist(&session);
    }

    /// Replace the cached user profile
    pub fn set_user(&self, user: User) {
        {
            let mut session = self.write();
            session.user = Some(user.clone());
            self.persist(&session);
        }
        self.inner.identity.send_replace(Some(user));
    }

    /// Remove credential and cached user from memory and storage
    pub fn clear(&self) {
        {
            let mut session = self.write();
            *session = PersistedSession::default();
            if let Err(e) = self.inner.storage.clear() {
                tracing::warn!("Failed to clear session storage: {}", e);
            }
        }
        self.inner.identity.send_replace(None);
    }

    /// Clear only while `rejected` is still the current credential
    ///
    /// Returns false when the store was already cleared or a newer
    /// credential was set since `rejected` was read.
    pub fn clear_if_current(&self, rejected: &Credential) -> bool {
        {
            let mut session = self.write();
            let is_current = session
                .token
                .as_ref()
                .is_some_and(|current| current.access_token == rejected.access_token);
            if !is_current {
                return false;
            }
            *session = PersistedSession::default();
            if let Err(e) = self.inner.storage.clear() {
                tracing::warn!("Failed to clear session storage: {}", e);
            }
        }
        self.inner.identity.send_replace(None);
        true
    }

    /// The credential, or `None`
    pub fn current(&self) -> Option<Credential> {
        self.read().token.clone()
    }

    pub fn has_credential(&self) -> bool {
        self.read().token.is_some()
    }

    pub fn cached_user(&self) -> Option<User> {
        self.read().user.clone()
    }

    /// Receiver notified whenever the cached identity changes
    pub fn on_identity_change(&self) -> watch::Receiver<Option<User>> {
        self.inner.identity.subscribe()
    }
}

impl fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let session = self.read();
        f.debug_struct("CredentialStore")
            .field("credential", &session.token)
            .field("user", &session.user.as_ref().map(|u| &u.email))
            .finish()
    }
}
