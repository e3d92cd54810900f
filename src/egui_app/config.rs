use std::sync::Arc;

use crate::client::{
    ApiGateway, CredentialStore, FileStorage, GatewayError, SessionStorage, UnauthorizedHandler,
};
use crate::shared::config::{AppConfig, AppConfigBuilder, ConfigError};

/// Desktop client configuration.
#[derive(Debug, Clone)]
pub struct Config {
    app: AppConfig,
}

impl Config {
    /// Load from `EVENTBOARD_CONFIG` and the environment
    pub fn load() -> Result<Self, ConfigError> {
        Ok(Self {
            app: AppConfig::from_env()?,
        })
    }

    pub fn with_builder(builder: AppConfigBuilder) -> Result<Self, ConfigError> {
        Ok(Self {
            app: builder.build()?,
        })
    }

    pub fn server_url(&self) -> &str {
        &self.app.server_url
    }

    /// Durable storage for the `token` and `user` entries
    pub fn session_storage(&self) -> Arc<dyn SessionStorage> {
        Arc::new(FileStorage::new(self.app.storage_path.clone()))
    }

    /// Gateway over the persisted credential, with `on_unauthorized` installed
    pub fn build_gateway(
        &self,
        on_unauthorized: UnauthorizedHandler,
    ) -> Result<ApiGateway, GatewayError> {
        ApiGateway::from_config(&self.app)
            .credentials(CredentialStore::open(self.session_storage()))
            .unauthorized_handler(on_unauthorized)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(dir: &tempfile::TempDir) -> Config {
        Config::with_builder(
            AppConfig::builder()
                .server_url("http://127.0.0.1:5000/")
                .storage_path(dir.path().join("session.json")),
        )
        .unwrap()
    }

    #[test]
    fn test_server_url_is_normalized() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(config(&dir).server_url(), "http://127.0.0.1:5000");
    }

    #[test]
    fn test_invalid_url_rejected() {
        let result = Config::with_builder(AppConfig::builder().server_url("not a url"));
        assert!(matches!(result, Err(ConfigError::InvalidUrl(_))));
    }

    #[test]
    fn test_gateway_starts_without_credential() {
        let dir = tempfile::tempdir().unwrap();
        let gateway = config(&dir).build_gateway(Arc::new(|| {})).unwrap();
        assert!(!gateway.credentials().has_credential());
        assert_eq!(gateway.base_url(), "http://127.0.0.1:5000");
    }
}
