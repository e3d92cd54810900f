/**
 * Session Context
 *
 * Explicitly constructed holder of the current identity. Consumers get a
 * reference to it; nothing reaches it through globals.
 *
 * State machine:
 *
 * ```text
 * Uninitialized --init--> Loading --+--> Ready(Some(user))
 *                                   +--> Ready(None)
 * Ready(_) --login/register ok--> Ready(Some(user))
 * Ready(_) --logout--> Ready(None)
 * any --teardown--> Uninitialized
 * ```
 *
 * A credential dropped by the gateway after an unrecoverable 401 shows up
 * here as `Ready(None)`.
 */

use std::sync::Arc;

use tokio::sync::watch;

use crate::client::error::GatewayError;
use crate::client::provider::CredentialProvider;
use crate::shared::{RegisterRequest, User};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Uninitialized,
    Loading,
    Ready(Option<User>),
}

impl SessionState {
    /// Protected content may only render once this is true
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    pub fn user(&self) -> Option<&User> {
        match self {
            Self::Ready(Some(user)) => Some(user),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user().is_some()
    }
}

pub struct SessionContext {
    provider: Arc<dyn CredentialProvider>,
    state: watch::Sender<SessionState>,
    identity: watch::Receiver<Option<User>>,
}

impl SessionContext {
    pub fn new(provider: Arc<dyn CredentialProvider>) -> Self {
        let identity = provider.on_identity_change();
        let (state, _) = watch::channel(SessionState::Uninitialized);
        Self {
            provider,
            state,
            identity,
        }
    }

    /// Restore the persisted session, if any
    pub async fn init(&self) -> SessionState {
        self.transition(SessionState::Loading);

        let next = match self.provider.current_identity().await {
            Ok(Some(user)) => {
                tracing::info!("Restored session for {}", user.email);
                SessionState::Ready(Some(user))
            }
            Ok(None) => SessionState::Ready(None),
            Err(e) => {
                tracing::warn!("Could not resolve stored session, starting signed out: {}", e);
                self.provider.clear_local();
                SessionState::Ready(None)
            }
        };

        self.transition(next.clone());
        next
    }

    /// On failure the state is left as it was
    pub async fn login(&self, email: &str, password: &str) -> Result<User, GatewayError> {
        let user = self.provider.login(email, password).await?;
        self.transition(SessionState::Ready(Some(user.clone())));
        Ok(user)
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<User, GatewayError> {
        let user = self.provider.register(request).await?;
        self.transition(SessionState::Ready(Some(user.clone())));
        Ok(user)
    }

    /// Always ends signed out; a failing backend call is only logged
    pub async fn logout(&self) {
        if let Err(e) = self.provider.logout().await {
            tracing::warn!("Backend logout failed, clearing local session anyway: {}", e);
        }
        self.provider.clear_local();
        self.transition(SessionState::Ready(None));
    }

    pub fn teardown(&self) {
        self.transition(SessionState::Uninitialized);
    }

    /// Current state, with a gateway-forced logout folded in
    pub fn state(&self) -> SessionState {
        let current = self.state.borrow().clone();
        if let SessionState::Ready(Some(_)) = current {
            if self.identity.borrow().is_none() {
                tracing::info!("Session ended by the gateway");
                self.transition(SessionState::Ready(None));
                return SessionState::Ready(None);
            }
        }
        current
    }

    pub fn user(&self) -> Option<User> {
        self.state().user().cloned()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Wait for the next state or identity change
    pub async fn changed(&self) -> SessionState {
        let mut state = self.state.subscribe();
        let mut identity = self.provider.on_identity_change();
        tokio::select! {
            _ = state.changed() => {}
            _ = identity.changed() => {}
        }
        self.state()
    }

    fn transition(&self, next: SessionState) {
        let previous = self.state.send_replace(next);
        tracing::debug!(
            from = ?variant(&previous),
            to = ?variant(&self.state.borrow()),
            "Session state"
        );
    }
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("state", &variant(&self.state.borrow()))
            .finish()
    }
}

fn variant(state: &SessionState) -> &'static str {
    match state {
        SessionState::Uninitialized => "uninitialized",
        SessionState::Loading => "loading",
        SessionState::Ready(Some(_)) => "ready(user)",
        SessionState::Ready(None) => "ready(none)",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::Role;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use uuid::Uuid;

    fn user(email: &str) -> User {
        User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            name: "Test".to_string(),
            role: Role::Worker,
            created_at: None,
            last_login_at: None,
        }
    }

    /// Scripted provider
    struct FakeProvider {
        identity: watch::Sender<Option<User>>,
        stored: Mutex<Option<Result<User, u16>>>,
        logout_fails: bool,
    }

    impl FakeProvider {
        fn new(stored: Option<Result<User, u16>>) -> Self {
            let (identity, _) = watch::channel(None);
            Self {
                identity,
                stored: Mutex::new(stored),
                logout_fails: false,
            }
        }
    }

    #[async_trait]
    impl CredentialProvider for FakeProvider {
        async fn login(&self, email: &str, password: &str) -> Result<User, GatewayError> {
            if password == "correctpw" {
                let user = user(email);
                self.identity.send_replace(Some(user.clone()));
                Ok(user)
            } else {
                Err(GatewayError::Unauthorized {
                    message: "Invalid credentials".to_string(),
                })
            }
        }

        async fn register(&self, request: &RegisterRequest) -> Result<User, GatewayError> {
            self.login(&request.email, "correctpw").await
        }

        async fn logout(&self) -> Result<(), GatewayError> {
            if self.logout_fails {
                Err(GatewayError::Server {
                    status: 503,
                    message: "unavailable".to_string(),
                })
            } else {
                Ok(())
            }
        }

        async fn current_identity(&self) -> Result<Option<User>, GatewayError> {
            match self.stored.lock().unwrap().clone() {
                None => Ok(None),
                Some(Ok(user)) => {
                    self.identity.send_replace(Some(user.clone()));
                    Ok(Some(user))
                }
                Some(Err(status)) => Err(GatewayError::Server {
                    status,
                    message: "boom".to_string(),
                }),
            }
        }

        fn clear_local(&self) {
            *self.stored.lock().unwrap() = None;
            self.identity.send_replace(None);
        }

        fn on_identity_change(&self) -> watch::Receiver<Option<User>> {
            self.identity.subscribe()
        }
    }

    #[tokio::test]
    async fn test_starts_uninitialized() {
        let session = SessionContext::new(Arc::new(FakeProvider::new(None)));
        assert_eq!(session.state(), SessionState::Uninitialized);
        assert!(!session.state().is_ready());
    }

    #[tokio::test]
    async fn test_init_without_credential() {
        let session = SessionContext::new(Arc::new(FakeProvider::new(None)));
        assert_eq!(session.init().await, SessionState::Ready(None));
    }

    #[tokio::test]
    async fn test_init_restores_user() {
        let stored = user("user@example.com");
        let session = SessionContext::new(Arc::new(FakeProvider::new(Some(Ok(stored.clone())))));
        assert_eq!(session.init().await, SessionState::Ready(Some(stored)));
    }

    #[tokio::test]
    async fn test_init_failure_downgrades_to_signed_out() {
        let provider = Arc::new(FakeProvider::new(Some(Err(500))));
        let session = SessionContext::new(provider.clone());
        assert_eq!(session.init().await, SessionState::Ready(None));
        assert!(provider.stored.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_failed_login_keeps_state() {
        let session = SessionContext::new(Arc::new(FakeProvider::new(None)));
        session.init().await;

        let err = session.login("user@example.com", "wrong").await.unwrap_err();
        assert_eq!(err.user_message(), "Invalid credentials");
        assert_eq!(session.state(), SessionState::Ready(None));
    }

    #[tokio::test]
    async fn test_logout_survives_backend_failure() {
        let mut provider = FakeProvider::new(None);
        provider.logout_fails = true;
        let session = SessionContext::new(Arc::new(provider));
        session.init().await;
        session.login("user@example.com", "correctpw").await.unwrap();

        session.logout().await;
        assert_eq!(session.state(), SessionState::Ready(None));
    }

    #[tokio::test]
    async fn test_forced_logout_is_reflected() {
        let provider = Arc::new(FakeProvider::new(None));
        let session = SessionContext::new(provider.clone());
        session.init().await;
        session.login("user@example.com", "correctpw").await.unwrap();
        assert!(session.state().is_authenticated());

        provider.clear_local();
        assert_eq!(session.state(), SessionState::Ready(None));
        assert_eq!(*session.subscribe().borrow(), SessionState::Ready(None));
    }

    #[tokio::test]
    async fn test_changed_wakes_on_forced_logout() {
        let provider = Arc::new(FakeProvider::new(None));
        let session = Arc::new(SessionContext::new(provider.clone()));
        session.init().await;
        session.login("user@example.com", "correctpw").await.unwrap();

        let waiter = tokio::spawn({
            let session = session.clone();
            async move { session.changed().await }
        });
        tokio::task::yield_now().await;

        provider.clear_local();
        let state = tokio::time::timeout(std::time::Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(state, SessionState::Ready(None));
    }

    #[tokio::test]
    async fn test_teardown() {
        let session = SessionContext::new(Arc::new(FakeProvider::new(None)));
        session.init().await;
        session.teardown();
        assert_eq!(session.state(), SessionState::Uninitialized);
    }
}
