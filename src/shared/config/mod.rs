//! Application configuration module
//!
//! Client-side configuration: where the API lives, where the session is
//! persisted, and whether the gateway refreshes credentials on a 401.
//!
//! Values come from an optional TOML file (`EVENTBOARD_CONFIG`) and are
//! then overridden by environment variables:
//!
//! | key                    | env                        | default                      |
//! |------------------------|----------------------------|------------------------------|
//! | `server_url`           | `EVENTBOARD_API_URL`       | `http://localhost:5000`      |
//! | `storage_path`         | `EVENTBOARD_SESSION_FILE`  | `<data dir>/eventboard/session.json` |
//! | `refresh`              | `EVENTBOARD_REFRESH`       | `on`                         |
//! | `request_timeout_secs` | `EVENTBOARD_TIMEOUT_SECS`  | `30`                         |

use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;
use thiserror::Error;

/// Default server URL
pub const DEFAULT_SERVER_URL: &str = "http://localhost:5000";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// How the gateway reacts to a 401 on an authenticated call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefreshPolicy {
    /// One transparent refresh-and-retry per request
    #[default]
    #[serde(alias = "on")]
    Refresh,
    /// Drop the credential immediately
    #[serde(alias = "off")]
    NoRefresh,
}

impl FromStr for RefreshPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "on" | "true" | "1" | "refresh" => Ok(Self::Refresh),
            "off" | "false" | "0" | "norefresh" | "no_refresh" => Ok(Self::NoRefresh),
            other => Err(ConfigError::InvalidValue {
                key: "refresh",
                value: other.to_string(),
            }),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Base address of the API
    pub server_url: String,
    /// File holding the persisted session (`token` and `user`)
    pub storage_path: PathBuf,
    pub refresh_policy: RefreshPolicy,
    pub request_timeout_secs: u64,
}

impl AppConfig {
    /// Create a new AppConfigBuilder
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }

    /// Load from `EVENTBOARD_CONFIG` (if set) and the environment
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut builder = match std::env::var("EVENTBOARD_CONFIG") {
            Ok(path) => AppConfigBuilder::from_file(Path::new(&path))?,
            Err(_) => AppConfigBuilder::default(),
        };

        if let Ok(url) = std::env::var("EVENTBOARD_API_URL") {
            builder = builder.server_url(url);
        }
        if let Ok(path) = std::env::var("EVENTBOARD_SESSION_FILE") {
            builder = builder.storage_path(PathBuf::from(path));
        }
        if let Ok(policy) = std::env::var("EVENTBOARD_REFRESH") {
            builder = builder.refresh_policy(policy.parse()?);
        }
        if let Ok(secs) = std::env::var("EVENTBOARD_TIMEOUT_SECS") {
            let secs = secs.parse().map_err(|_| ConfigError::InvalidValue {
                key: "request_timeout_secs",
                value: secs.clone(),
            })?;
            builder = builder.request_timeout_secs(secs);
        }

        builder.build()
    }

    /// Default location of the session file
    pub fn default_storage_path() -> PathBuf {
        let mut path = dirs::data_dir().unwrap_or_else(std::env::temp_dir);
        path.push("eventboard");
        path.push("session.json");
        path
    }
}

/// On-disk shape of the TOML config file
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    server_url: Option<String>,
    storage_path: Option<PathBuf>,
    refresh: Option<RefreshPolicy>,
    request_timeout_secs: Option<u64>,
}

/// Builder for AppConfig
#[derive(Debug, Default)]
pub struct AppConfigBuilder {
    server_url: Option<String>,
    storage_path: Option<PathBuf>,
    refresh_policy: Option<RefreshPolicy>,
    request_timeout_secs: Option<u64>,
}

impl AppConfigBuilder {
    /// Start from the values of a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let file: FileConfig = toml::from_str(text)?;
        Ok(Self {
            server_url: file.server_url,
            storage_path: file.storage_path,
            refresh_policy: file.refresh,
            request_timeout_secs: file.request_timeout_secs,
        })
    }

    /// Set the server URL
    pub fn server_url(mut self, url: impl Into<String>) -> Self {
        self.server_url = Some(url.into());
        self
    }

    pub fn storage_path(mut self, path: PathBuf) -> Self {
        self.storage_path = Some(path);
        self
    }

    pub fn refresh_policy(mut self, policy: RefreshPolicy) -> Self {
        self.refresh_policy = Some(policy);
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout_secs = Some(secs);
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<AppConfig, ConfigError> {
        let server_url = self
            .server_url
            .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let parsed = reqwest::Url::parse(&server_url)
            .map_err(|_| ConfigError::InvalidUrl(server_url.clone()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidUrl(server_url));
        }

        let request_timeout_secs = self.request_timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS);
        if request_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "request_timeout_secs",
                value: "0".to_string(),
            });
        }

        Ok(AppConfig {
            server_url,
            storage_path: self
                .storage_path
                .unwrap_or_else(AppConfig::default_storage_path),
            refresh_policy: self.refresh_policy.unwrap_or_default(),
            request_timeout_secs,
        })
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Toml(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_builder_defaults() {
        let config = AppConfig::builder().build().unwrap();
        assert_eq!(config.server_url, DEFAULT_SERVER_URL);
        assert_eq!(config.refresh_policy, RefreshPolicy::Refresh);
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let config = AppConfig::builder()
            .server_url("http://127.0.0.1:5000/")
            .build()
            .unwrap();
        assert_eq!(config.server_url, "http://127.0.0.1:5000");
    }

    #[test]
    fn test_invalid_url_rejected() {
        let result = AppConfig::builder().server_url("not a url").build();
        assert!(matches!(result, Err(ConfigError::InvalidUrl(_))));

        let result = AppConfig::builder().server_url("ftp://example.com").build();
        assert!(matches!(result, Err(ConfigError::InvalidUrl(_))));
    }

    #[test]
    fn test_from_toml() {
        let builder = AppConfigBuilder::from_toml_str(
            r#"
            server_url = "https://events.example.org"
            refresh = "off"
            request_timeout_secs = 5
            "#,
        )
        .unwrap();
        let config = builder.build().unwrap();
        assert_eq!(config.server_url, "https://events.example.org");
        assert_eq!(config.refresh_policy, RefreshPolicy::NoRefresh);
        assert_eq!(config.request_timeout_secs, 5);
    }

    #[test]
    fn test_refresh_policy_parse() {
        assert_eq!("on".parse::<RefreshPolicy>().unwrap(), RefreshPolicy::Refresh);
        assert_eq!("OFF".parse::<RefreshPolicy>().unwrap(), RefreshPolicy::NoRefresh);
        assert!("sometimes".parse::<RefreshPolicy>().is_err());
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        std::env::set_var("EVENTBOARD_API_URL", "http://10.0.0.2:8080");
        std::env::set_var("EVENTBOARD_REFRESH", "off");
        let config = AppConfig::from_env().unwrap();
        std::env::remove_var("EVENTBOARD_API_URL");
        std::env::remove_var("EVENTBOARD_REFRESH");

        assert_eq!(config.server_url, "http://10.0.0.2:8080");
        assert_eq!(config.refresh_policy, RefreshPolicy::NoRefresh);
    }
}
