//! Credential provider capability
//!
//! The session context only talks to a [`CredentialProvider`]. The token
//! backend in this crate is [`TokenProvider`]; an external identity provider
//! plugs in by implementing the same trait.

use async_trait::async_trait;
use tokio::sync::watch;

use crate::client::error::GatewayError;
use crate::client::gateway::ApiGateway;
use crate::shared::{RegisterRequest, User};

#[async_trait]
pub trait CredentialProvider: Send + Sync {
    async fn login(&self, email: &str, password: &str) -> Result<User, GatewayError>;

    async fn register(&self, request: &RegisterRequest) -> Result<User, GatewayError>;

    /// End the session on the identity backend
    async fn logout(&self) -> Result<(), GatewayError>;

    /// Resolve who the stored credential belongs to
    ///
    /// `Ok(None)` when there is no credential at all.
    async fn current_identity(&self) -> Result<Option<User>, GatewayError>;

    /// Drop the local credential and cached profile
    fn clear_local(&self);

    fn on_identity_change(&self) -> watch::Receiver<Option<User>>;
}

/// Provider backed by the event board's own token endpoints
#[derive(Debug, Clone)]
pub struct TokenProvider {
    gateway: ApiGateway,
}

impl TokenProvider {
    pub fn new(gateway: ApiGateway) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl CredentialProvider for TokenProvider {
    async fn login(&self, email: &str, password: &str) -> Result<User, GatewayError> {
        self.gateway.login(email, password).await
    }

    async fn register(&self, request: &RegisterRequest) -> Result<User, GatewayError> {
        self.gateway.register(request).await
    }

    async fn logout(&self) -> Result<(), GatewayError> {
        self.gateway.logout().await
    }

    async fn current_identity(&self) -> Result<Option<User>, GatewayError> {
        if !self.gateway.credentials().has_credential() {
            return Ok(None);
        }
        self.gateway.me().await.map(Some)
    }

    fn clear_local(&self) {
        self.gateway.credentials().clear();
    }

    fn on_identity_change(&self) -> watch::Receiver<Option<User>> {
        self.gateway.credentials().on_identity_change()
    }
}
