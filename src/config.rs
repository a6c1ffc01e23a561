//! Server configuration: TOML file + environment overrides.
//!
//! Secrets (signing keys, SMTP password) can always be supplied via
//! environment variables so the config file never has to hold them:
//! - `TIMEWISE_SESSION_KEY`
//! - `TIMEWISE_RESET_KEY`
//! - `TIMEWISE_SMTP_PASSWORD`

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default expiry for reset assertions: one hour.
pub const DEFAULT_RESET_TTL_SECS: u64 = 3600;

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub smtp: Option<SmtpConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Public base URL used when building reset links
    /// (e.g. "https://timewise.example.com").
    pub base_url: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 3000,
            base_url: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
    pub path: PathBuf,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("timewise.db"),
            max_connections: 8,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthConfig {
    /// Session-signing key. Overridden by `TIMEWISE_SESSION_KEY`.
    pub session_key: Option<String>,
    /// Reset-signing key, distinct from the session key so a reset token can
    /// never replay as a session. Overridden by `TIMEWISE_RESET_KEY`.
    pub reset_key: Option<String>,
    pub reset_ttl_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_key: None,
            reset_key: None,
            reset_ttl_secs: DEFAULT_RESET_TTL_SECS,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SmtpConfig {
    pub host: String,
    pub username: String,
    /// Overridden by `TIMEWISE_SMTP_PASSWORD`.
    #[serde(default)]
    pub password: Option<String>,
    pub from_address: String,
}

impl Config {
    /// Load from a TOML file, then apply environment overrides.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let mut config: Config = toml::from_str(&raw)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Defaults plus environment overrides, for running without a file.
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    fn apply_env_overrides(&mut self) {
        if let Some(key) = non_empty_env("TIMEWISE_SESSION_KEY") {
            self.auth.session_key = Some(key);
        }
        if let Some(key) = non_empty_env("TIMEWISE_RESET_KEY") {
            self.auth.reset_key = Some(key);
        }
        if let Some(password) = non_empty_env("TIMEWISE_SMTP_PASSWORD") {
            if let Some(smtp) = self.smtp.as_mut() {
                smtp.password = Some(password);
            }
        }
    }

    /// Base URL for links in outbound mail; falls back to the bind address.
    pub fn public_base_url(&self) -> String {
        self.server.base_url.clone().unwrap_or_else(|| {
            format!("http://{}:{}", self.server.host, self.server.port)
        })
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = Config::default();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.auth.reset_ttl_secs, DEFAULT_RESET_TTL_SECS);
        assert!(config.smtp.is_none());
    }

    #[test]
    fn parses_full_toml() {
        let raw = r#"
            [server]
            host = "0.0.0.0"
            port = 8080
            base_url = "https://timewise.example.com"

            [database]
            path = "/var/lib/timewise/data.db"
            max_connections = 4

            [auth]
            session_key = "session-secret"
            reset_key = "reset-secret"
            reset_ttl_secs = 900

            [smtp]
            host = "smtp.example.com"
            username = "noreply@example.com"
            from_address = "TimeWise <noreply@example.com>"
        "#;
        let config: Config = toml::from_str(raw).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.auth.reset_ttl_secs, 900);
        assert_eq!(config.smtp.unwrap().host, "smtp.example.com");
        assert_eq!(
            config.server.base_url.as_deref(),
            Some("https://timewise.example.com")
        );
    }

    #[test]
    fn base_url_falls_back_to_bind_address() {
        let config = Config::default();
        assert_eq!(config.public_base_url(), "http://127.0.0.1:3000");
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let raw = r#"
            [server]
            hostt = "typo"
        "#;
        assert!(toml::from_str::<Config>(raw).is_err());
    }
}
