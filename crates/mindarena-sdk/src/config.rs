//! Client configuration
//!
//! Defaults suit a local development backend. `from_env` layers environment
//! variables (and a `.env` file, if present) on top.

use crate::credentials::{CredentialStore, FileCredentialStore};
use crate::error::{SdkError, SdkResult};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Default API endpoint
pub const DEFAULT_ENDPOINT: &str = "http://localhost:8000/api";

/// Blanket timeout applied to every request
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default capacity of the telemetry queue
pub const DEFAULT_TELEMETRY_BUFFER: usize = 256;

pub const ENV_API_URL: &str = "MINDARENA_API_URL";
pub const ENV_TIMEOUT_SECS: &str = "MINDARENA_TIMEOUT_SECS";
pub const ENV_CREDENTIALS: &str = "MINDARENA_CREDENTIALS";

/// SDK configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API endpoint (no trailing slash)
    pub endpoint: String,
    /// Request timeout
    pub timeout: Duration,
    /// Where login persists the token and identity
    pub credentials_path: PathBuf,
    /// Telemetry events buffered before new ones are dropped
    pub telemetry_buffer: usize,
    /// User-Agent header
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: DEFAULT_TIMEOUT,
            credentials_path: default_credentials_path(),
            telemetry_buffer: DEFAULT_TELEMETRY_BUFFER,
            user_agent: format!("mindarena-sdk/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientConfig {
    /// Load from the process environment (after reading `.env` if present)
    pub fn from_env() -> SdkResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> SdkResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup(ENV_API_URL) {
            config = config.with_endpoint(&url);
        }

        if let Some(secs) = lookup(ENV_TIMEOUT_SECS) {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                SdkError::Config(format!("{} must be a whole number of seconds, got {:?}", ENV_TIMEOUT_SECS, secs))
            })?;
            config.timeout = Duration::from_secs(secs);
        }

        if let Some(path) = lookup(ENV_CREDENTIALS) {
            config.credentials_path = PathBuf::from(path);
        }

        config.validate()?;
        Ok(config)
    }

    /// Point at another endpoint
    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.trim().trim_end_matches('/').to_string();
        self
    }

    /// File-backed store at `credentials_path`
    pub fn credential_store(&self) -> Arc<dyn CredentialStore> {
        Arc::new(FileCredentialStore::new(self.credentials_path.clone()))
    }

    /// Reject configurations no request could succeed with
    pub fn validate(&self) -> SdkResult<()> {
        if !(self.endpoint.starts_with("http://") || self.endpoint.starts_with("https://")) {
            return Err(SdkError::Config(format!(
                "endpoint must be an http(s) URL, got {:?}",
                self.endpoint
            )));
        }
        if self.timeout.is_zero() {
            return Err(SdkError::Config("timeout must be greater than zero".to_string()));
        }
        if self.telemetry_buffer == 0 {
            return Err(SdkError::Config("telemetry buffer must hold at least one event".to_string()));
        }
        Ok(())
    }
}

fn default_credentials_path() -> PathBuf {
    dirs_next::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("mindarena")
        .join("credentials.json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_config_default() {
        let config = ClientConfig::default();
        assert_eq!(config.endpoint, "http://localhost:8000/api");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.credentials_path.ends_with("mindarena/credentials.json"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_from_lookup() {
        let config = ClientConfig::from_lookup(lookup(&[
            (ENV_API_URL, "https://arena.example.com/api/"),
            (ENV_TIMEOUT_SECS, "5"),
            (ENV_CREDENTIALS, "/tmp/creds.json"),
        ]))
        .unwrap();

        assert_eq!(config.endpoint, "https://arena.example.com/api");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.credentials_path, PathBuf::from("/tmp/creds.json"));
    }

    #[test]
    fn test_config_rejects_bad_values() {
        assert!(matches!(
            ClientConfig::from_lookup(lookup(&[(ENV_TIMEOUT_SECS, "soon")])),
            Err(SdkError::Config(_))
        ));
        assert!(matches!(
            ClientConfig::from_lookup(lookup(&[(ENV_API_URL, "ftp://arena")])),
            Err(SdkError::Config(_))
        ));
        assert!(matches!(
            ClientConfig::from_lookup(lookup(&[(ENV_TIMEOUT_SECS, "0")])),
            Err(SdkError::Config(_))
        ));
    }
}
