//! Proxy configuration, read from `REDACTKIT_*` environment variables.

use crate::error::{ProxyError, ProxyResult};
use redactkit_core::StaticModePolicy;
use std::net::SocketAddr;
use std::time::Duration;

const DEFAULT_PORT: u16 = 8088;
const DEFAULT_REMOTE_TIMEOUT_MS: u64 = 10_000;

/// When the remote, AI-assisted path is used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteMode {
    Off,
    On,
    /// Remote only for these scope ids.
    Scopes(Vec<String>),
}

impl RemoteMode {
    fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "" | "off" | "false" | "0" | "local" => Self::Off,
            "on" | "true" | "1" | "remote" => Self::On,
            _ => Self::Scopes(
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect(),
            ),
        }
    }

    pub fn policy(&self) -> StaticModePolicy {
        match self {
            Self::Off => StaticModePolicy::local(),
            Self::On => StaticModePolicy::remote(),
            Self::Scopes(scopes) => StaticModePolicy::remote_for_scopes(scopes.iter().cloned()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProxyConfig {
    pub bind_addr: SocketAddr,
    /// Endpoint of the remote redaction service, if any.
    pub remote_url: Option<String>,
    pub remote_mode: RemoteMode,
    pub remote_timeout: Duration,
    pub enable_ai: bool,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], DEFAULT_PORT)),
            remote_url: None,
            remote_mode: RemoteMode::Off,
            remote_timeout: Duration::from_millis(DEFAULT_REMOTE_TIMEOUT_MS),
            enable_ai: true,
        }
    }
}

impl ProxyConfig {
    /// Load from the process environment.
    pub fn from_env() -> ProxyResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load through an arbitrary key lookup (tests pass a closure over a map).
    pub fn from_lookup<F>(lookup: F) -> ProxyResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let bind_addr = match lookup("REDACTKIT_BIND_ADDR") {
            Some(raw) => raw.trim().parse().map_err(|_| {
                ProxyError::Config(format!("REDACTKIT_BIND_ADDR is not a socket address: {raw}"))
            })?,
            None => defaults.bind_addr,
        };

        let remote_url = lookup("REDACTKIT_REMOTE_URL")
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty());

        let remote_mode = lookup("REDACTKIT_REMOTE_MODE")
            .map(|raw| RemoteMode::parse(&raw))
            .unwrap_or(defaults.remote_mode);

        let remote_timeout = match lookup("REDACTKIT_REMOTE_TIMEOUT_MS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|_| {
                    ProxyError::Config(format!("REDACTKIT_REMOTE_TIMEOUT_MS is not a number: {raw}"))
                })?,
            None => defaults.remote_timeout,
        };

        let enable_ai = match lookup("REDACTKIT_ENABLE_AI") {
            Some(raw) => parse_bool(&raw).ok_or_else(|| {
                ProxyError::Config(format!("REDACTKIT_ENABLE_AI is not a boolean: {raw}"))
            })?,
            None => defaults.enable_ai,
        };

        Ok(Self {
            bind_addr,
            remote_url,
            remote_mode,
            remote_timeout,
            enable_ai,
        })
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> ProxyResult<ProxyConfig> {
        let env: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        ProxyConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.bind_addr.port(), 8088);
        assert_eq!(config.remote_url, None);
        assert_eq!(config.remote_mode, RemoteMode::Off);
        assert_eq!(config.remote_timeout, Duration::from_secs(10));
        assert!(config.enable_ai);
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("REDACTKIT_BIND_ADDR", "0.0.0.0:9000"),
            ("REDACTKIT_REMOTE_URL", "http://redactor.internal/v1/redact"),
            ("REDACTKIT_REMOTE_MODE", "tenant-a, tenant-b"),
            ("REDACTKIT_REMOTE_TIMEOUT_MS", "250"),
            ("REDACTKIT_ENABLE_AI", "no"),
        ])
        .unwrap();
        assert_eq!(config.bind_addr.port(), 9000);
        assert_eq!(config.remote_url.as_deref(), Some("http://redactor.internal/v1/redact"));
        assert_eq!(
            config.remote_mode,
            RemoteMode::Scopes(vec!["tenant-a".into(), "tenant-b".into()])
        );
        assert_eq!(config.remote_timeout, Duration::from_millis(250));
        assert!(!config.enable_ai);
    }

    #[test]
    fn test_invalid_values_are_config_errors() {
        assert!(matches!(load(&[("REDACTKIT_BIND_ADDR", "nowhere")]), Err(ProxyError::Config(_))));
        let slow = load(&[("REDACTKIT_REMOTE_TIMEOUT_MS", "soon")]);
        assert!(matches!(slow, Err(ProxyError::Config(_))));
        assert!(matches!(load(&[("REDACTKIT_ENABLE_AI", "maybe")]), Err(ProxyError::Config(_))));
    }

    #[test]
    fn test_remote_mode_policy() {
        use redactkit_core::ModePolicy;
        assert!(!RemoteMode::parse("off").policy().is_remote_mode_enabled(None));
        assert!(RemoteMode::parse("ON").policy().is_remote_mode_enabled(None));
        let scoped = RemoteMode::parse("beta").policy();
        assert!(scoped.is_remote_mode_enabled(Some("beta")));
        assert!(!scoped.is_remote_mode_enabled(Some("prod")));
    }
}
