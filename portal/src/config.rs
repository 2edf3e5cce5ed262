//! Portal configuration from environment variables

use crate::core::error::{PortalError, Result};
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:3001";

/// Client configuration
#[derive(Debug, Clone)]
pub struct PortalConfig {
    /// Backend origin for the API client and raw downloads
    pub api_base_url: String,
    /// Notification push channel URL
    pub ws_url: String,
    /// Per-request timeout
    pub http_timeout: Duration,
    /// Persisted access/refresh token file
    pub token_file: PathBuf,
    /// Log directory (daily rotation)
    pub log_dir: PathBuf,
    /// Log level filter used when `RUST_LOG` is unset
    pub log_level: String,
    /// Quiet period before a trade preview is requested
    pub preview_debounce: Duration,
    /// Investment list auto-refresh period
    pub refresh_interval: Duration,
    /// Number of notifications fetched on load
    pub notification_limit: u32,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            ws_url: derive_ws_url(DEFAULT_API_BASE_URL),
            http_timeout: Duration::from_secs(10),
            token_file: PathBuf::from(".portal/tokens.json"),
            log_dir: PathBuf::from("logs"),
            log_level: "portal=info,warn".to_string(),
            preview_debounce: Duration::from_millis(300),
            refresh_interval: Duration::from_secs(300),
            notification_limit: 20,
        }
    }
}

impl PortalConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup (the environment in production).
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let api_base_url = lookup("API_BASE_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or(defaults.api_base_url);
        let ws_url = lookup("PORTAL_WS_URL").unwrap_or_else(|| derive_ws_url(&api_base_url));

        Ok(Self {
            ws_url,
            http_timeout: Duration::from_secs(parse_or(&lookup, "PORTAL_HTTP_TIMEOUT_SECS", 10)?),
            token_file: lookup("PORTAL_TOKEN_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.token_file),
            log_dir: lookup("PORTAL_LOG_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.log_dir),
            log_level: lookup("RUST_LOG").unwrap_or(defaults.log_level),
            preview_debounce: Duration::from_millis(parse_or(&lookup, "PORTAL_PREVIEW_DEBOUNCE_MS", 300)?),
            refresh_interval: Duration::from_secs(parse_or(&lookup, "PORTAL_REFRESH_INTERVAL_SECS", 300)?),
            notification_limit: parse_or(&lookup, "PORTAL_NOTIFICATION_LIMIT", 20)?,
            api_base_url,
        })
    }

    /// Absolute URL for an API path such as `/api/users/profile`.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base_url, path)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| PortalError::Config(format!("{} must be a number, got {:?}", key, raw))),
        None => Ok(default),
    }
}

/// `http://host` → `ws://host/api/ws/notifications`
fn derive_ws_url(api_base_url: &str) -> String {
    api_base_url
        .replacen("https://", "wss://", 1)
        .replacen("http://", "ws://", 1)
        + "/api/ws/notifications"
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_environment_is_empty() {
        let config = PortalConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.api_base_url, "http://127.0.0.1:3001");
        assert_eq!(config.ws_url, "ws://127.0.0.1:3001/api/ws/notifications");
        assert_eq!(config.refresh_interval, Duration::from_secs(300));
        assert_eq!(config.notification_limit, 20);
    }

    #[test]
    fn test_ws_url_follows_api_scheme() {
        let config = PortalConfig::from_lookup(lookup_from(&[("API_BASE_URL", "https://api.example.com/")])).unwrap();
        assert_eq!(config.api_base_url, "https://api.example.com");
        assert_eq!(config.ws_url, "wss://api.example.com/api/ws/notifications");
        assert_eq!(config.url("/api/auth/login"), "https://api.example.com/api/auth/login");
    }

    #[test]
    fn test_invalid_number_is_config_error() {
        let result = PortalConfig::from_lookup(lookup_from(&[("PORTAL_HTTP_TIMEOUT_SECS", "soon")]));
        assert!(matches!(result, Err(PortalError::Config(_))));
    }
}
