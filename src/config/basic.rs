use axum_extra::extract::cookie::Key;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};

use crate::error::CinelogError;

/// Basic (core) configuration managed by Figment.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BasicConfig {
    /// HTTP server listen address (e.g., "0.0.0.0", "127.0.0.1").
    /// TOML: `basic.listen_addr`. Default: `0.0.0.0`.
    #[serde(default = "default_listen_ip")]
    pub listen_addr: IpAddr,

    /// HTTP server listen port.
    /// TOML: `basic.listen_port`. Default: `8188`.
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    /// Database URL for SQLite.
    /// TOML: `basic.database_url`. Default: `sqlite://reviews.db`.
    #[serde(default)]
    pub database_url: String,

    /// Log level for tracing subscriber initialization (e.g., "error", "warn", "info", "debug", "trace").
    /// TOML: `basic.loglevel`. Default: `info`.
    #[serde(default)]
    pub loglevel: String,

    /// Base64 master key for the encrypted flash cookie (at least 64 bytes once decoded).
    /// TOML: `basic.cookie_secret`. Default: unset, a random key is generated per process.
    #[serde(default)]
    pub cookie_secret: Option<String>,

    /// Mark flash cookies `Secure`; enable when served over HTTPS.
    /// TOML: `basic.secure_cookie`. Default: `false`.
    #[serde(default)]
    pub secure_cookie: bool,
}

impl Default for BasicConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_ip(),
            listen_port: default_listen_port(),
            database_url: "sqlite://reviews.db".to_string(),
            loglevel: "info".to_string(),
            cookie_secret: None,
            secure_cookie: false,
        }
    }
}

impl BasicConfig {
    /// Resolves the cookie key: decoded `cookie_secret` if configured, random otherwise.
    /// A blank secret counts as unset.
    pub fn cookie_key(&self) -> Result<Key, CinelogError> {
        let Some(secret) = self
            .cookie_secret
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        else {
            return Ok(Key::generate());
        };
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(secret)
            .map_err(|e| {
                CinelogError::InvalidConfig(format!("basic.cookie_secret is not base64: {e}"))
            })?;
        Key::try_from(bytes.as_slice()).map_err(|_| {
            CinelogError::InvalidConfig(format!(
                "basic.cookie_secret must decode to at least 64 bytes, got {}",
                bytes.len()
            ))
        })
    }
}

/// Default IP address for the HTTP server listen address.
fn default_listen_ip() -> IpAddr {
    Ipv4Addr::new(0, 0, 0, 0).into()
}

/// Default port for the HTTP server.
fn default_listen_port() -> u16 {
    8188
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cookie_key_rejects_short_secret() {
        let cfg = BasicConfig {
            cookie_secret: Some(base64::engine::general_purpose::STANDARD.encode([7u8; 16])),
            ..Default::default()
        };
        assert!(matches!(
            cfg.cookie_key(),
            Err(CinelogError::InvalidConfig(_))
        ));
    }

    #[test]
    fn cookie_key_accepts_long_secret() {
        let cfg = BasicConfig {
            cookie_secret: Some(base64::engine::general_purpose::STANDARD.encode([7u8; 64])),
            ..Default::default()
        };
        assert!(cfg.cookie_key().is_ok());
    }

    #[test]
    fn blank_cookie_secret_is_unset() {
        for blank in ["", "   "] {
            let cfg = BasicConfig {
                cookie_secret: Some(blank.to_string()),
                ..Default::default()
            };
            assert!(cfg.cookie_key().is_ok(), "secret {blank:?} should fall back");
        }
    }

    #[test]
    fn cookie_key_rejects_garbage() {
        let cfg = BasicConfig {
            cookie_secret: Some("not base64 !!".to_string()),
            ..Default::default()
        };
        assert!(cfg.cookie_key().is_err());
    }
}
