// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names and default values used
//! throughout the application. Configuration is loaded from the environment
//! once at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |
//! | `JWT_SIGNING_CERT_PATH` | PEM file with signing certificate(s) | unset |
//! | `JWT_SIGNING_CERT_SUBJECT` | Keep only the certificate with this subject | unset |
//! | `JWT_SYMMETRIC_KEY` | Base64 shared HMAC key | unset |
//! | `JWT_COOKIE_NAME` | Cookie checked when no Authorization header is sent | `ut` |
//! | `JWT_ISSUER` | Canonical issuer, informational | unset |
//! | `JWT_ALLOWED_AUDIENCES` | Comma-separated canonical audiences, informational | empty |
//! | `JWT_CLOCK_SKEW_SECS` | Tolerance for `exp` / `nbf` | `60` |
//! | `JWT_REQUIRE_EXPIRATION` | Reject tokens without `exp` | `false` |
//! | `JWT_EXPIRED_STATUS` | Status code for expired tokens | `440` |
//! | `TLS_CERT_PATH` | PEM certificate chain for HTTPS | unset (plain HTTP) |
//! | `TLS_KEY_PATH` | PEM private key for HTTPS | unset |
//!
//! At least one of `JWT_SIGNING_CERT_PATH` and `JWT_SYMMETRIC_KEY` must be set.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use axum::http::StatusCode;

use crate::auth::{
    anchors::TrustAnchorError, credential::DEFAULT_TOKEN_COOKIE, error::DEFAULT_EXPIRED_STATUS,
    validator::DEFAULT_CLOCK_SKEW,
};

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";
pub const SIGNING_CERT_PATH_ENV: &str = "JWT_SIGNING_CERT_PATH";
pub const SIGNING_CERT_SUBJECT_ENV: &str = "JWT_SIGNING_CERT_SUBJECT";
pub const SYMMETRIC_KEY_ENV: &str = "JWT_SYMMETRIC_KEY";
pub const COOKIE_NAME_ENV: &str = "JWT_COOKIE_NAME";
pub const ISSUER_ENV: &str = "JWT_ISSUER";
pub const ALLOWED_AUDIENCES_ENV: &str = "JWT_ALLOWED_AUDIENCES";
pub const CLOCK_SKEW_ENV: &str = "JWT_CLOCK_SKEW_SECS";
pub const REQUIRE_EXPIRATION_ENV: &str = "JWT_REQUIRE_EXPIRATION";
pub const EXPIRED_STATUS_ENV: &str = "JWT_EXPIRED_STATUS";
pub const TLS_CERT_PATH_ENV: &str = "TLS_CERT_PATH";
pub const TLS_KEY_PATH_ENV: &str = "TLS_KEY_PATH";

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;

/// Configuration errors, all fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {var}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
    #[error("{0} and {1} must be set together")]
    Incomplete(&'static str, &'static str),
    #[error("no trust anchor configured; set JWT_SIGNING_CERT_PATH and/or JWT_SYMMETRIC_KEY")]
    NoTrustAnchors,
    #[error(transparent)]
    TrustAnchor(#[from] TrustAnchorError),
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Certificate and key files for HTTPS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsFiles {
    pub cert_path: PathBuf,
    pub key_path: PathBuf,
}

/// Settings of the authentication gate.
#[derive(Clone)]
pub struct AuthSettings {
    pub signing_cert_path: Option<PathBuf>,
    pub signing_cert_subject: Option<String>,
    /// Base64 shared key
    pub symmetric_key: Option<String>,
    pub cookie_name: String,
    pub issuer: Option<String>,
    pub allowed_audiences: Vec<String>,
    pub clock_skew: Duration,
    pub require_expiration: bool,
    pub expired_status: StatusCode,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            signing_cert_path: None,
            signing_cert_subject: None,
            symmetric_key: None,
            cookie_name: DEFAULT_TOKEN_COOKIE.to_string(),
            issuer: None,
            allowed_audiences: Vec::new(),
            clock_skew: DEFAULT_CLOCK_SKEW,
            require_expiration: false,
            expired_status: StatusCode::from_u16(DEFAULT_EXPIRED_STATUS)
                .unwrap_or(StatusCode::UNAUTHORIZED),
        }
    }
}

// Keeps the shared key out of logs.
impl std::fmt::Debug for AuthSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSettings")
            .field("signing_cert_path", &self.signing_cert_path)
            .field("signing_cert_subject", &self.signing_cert_subject)
            .field(
                "symmetric_key",
                &self.symmetric_key.as_ref().map(|_| "<redacted>"),
            )
            .field("cookie_name", &self.cookie_name)
            .field("issuer", &self.issuer)
            .field("allowed_audiences", &self.allowed_audiences)
            .field("clock_skew", &self.clock_skew)
            .field("require_expiration", &self.require_expiration)
            .field("expired_status", &self.expired_status)
            .finish()
    }
}

/// Complete server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub log_format: LogFormat,
    pub tls: Option<TlsFiles>,
    pub auth: AuthSettings,
}

impl ServerConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read configuration through `lookup`; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| {
            lookup(var)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = AuthSettings::default();

        let port = match get(PORT_ENV) {
            Some(v) => parse(PORT_ENV, &v)?,
            None => DEFAULT_PORT,
        };

        let log_format = match get(LOG_FORMAT_ENV).as_deref() {
            None => LogFormat::Pretty,
            Some(v) if v.eq_ignore_ascii_case("pretty") => LogFormat::Pretty,
            Some(v) if v.eq_ignore_ascii_case("json") => LogFormat::Json,
            Some(v) => return Err(invalid(LOG_FORMAT_ENV, v, "expected `json` or `pretty`")),
        };

        let tls = match (get(TLS_CERT_PATH_ENV), get(TLS_KEY_PATH_ENV)) {
            (Some(cert), Some(key)) => Some(TlsFiles {
                cert_path: cert.into(),
                key_path: key.into(),
            }),
            (None, None) => None,
            _ => return Err(ConfigError::Incomplete(TLS_CERT_PATH_ENV, TLS_KEY_PATH_ENV)),
        };

        let clock_skew = match get(CLOCK_SKEW_ENV) {
            Some(v) => Duration::from_secs(parse(CLOCK_SKEW_ENV, &v)?),
            None => defaults.clock_skew,
        };

        let require_expiration = match get(REQUIRE_EXPIRATION_ENV) {
            Some(v) => parse_bool(REQUIRE_EXPIRATION_ENV, &v)?,
            None => defaults.require_expiration,
        };

        let expired_status = match get(EXPIRED_STATUS_ENV) {
            Some(v) => {
                let code: u16 = parse(EXPIRED_STATUS_ENV, &v)?;
                StatusCode::from_u16(code)
                    .map_err(|e| invalid(EXPIRED_STATUS_ENV, &v, e))?
            }
            None => defaults.expired_status,
        };

        let auth = AuthSettings {
            signing_cert_path: get(SIGNING_CERT_PATH_ENV).map(PathBuf::from),
            signing_cert_subject: get(SIGNING_CERT_SUBJECT_ENV),
            symmetric_key: get(SYMMETRIC_KEY_ENV),
            cookie_name: get(COOKIE_NAME_ENV).unwrap_or(defaults.cookie_name),
            issuer: get(ISSUER_ENV),
            allowed_audiences: get(ALLOWED_AUDIENCES_ENV)
                .map(|v| {
                    v.split(',')
                        .map(str::trim)
                        .filter(|a| !a.is_empty())
                        .map(String::from)
                        .collect()
                })
                .unwrap_or_default(),
            clock_skew,
            require_expiration,
            expired_status,
        };

        if auth.signing_cert_path.is_none() && auth.symmetric_key.is_none() {
            return Err(ConfigError::NoTrustAnchors);
        }

        Ok(Self {
            host: get(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            log_format,
            tls,
            auth,
        })
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse().map_err(|e| invalid(HOST_ENV, &addr, e))
    }
}

fn invalid(var: &'static str, value: &str, reason: impl std::fmt::Display) -> ConfigError {
    ConfigError::Invalid {
        var,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn parse<T>(var: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.parse().map_err(|e| invalid(var, value, e))
}

fn parse_bool(var: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        _ => Err(invalid(var, value, "expected a boolean")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|var| map.get(var).cloned())
    }

    #[test]
    fn defaults_with_shared_key() {
        let cfg = config(&[(SYMMETRIC_KEY_ENV, "c2VjcmV0")]).unwrap();
        assert_eq!(cfg.host, "0.0.0.0");
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.log_format, LogFormat::Pretty);
        assert!(cfg.tls.is_none());
        assert_eq!(cfg.auth.cookie_name, "ut");
        assert_eq!(cfg.auth.clock_skew, Duration::from_secs(60));
        assert!(!cfg.auth.require_expiration);
        assert_eq!(cfg.auth.expired_status.as_u16(), 440);
        assert_eq!(cfg.bind_addr().unwrap().port(), 8080);
    }

    #[test]
    fn reads_every_auth_setting() {
        let cfg = config(&[
            (SIGNING_CERT_PATH_ENV, "/etc/jwt/signing.pem"),
            (SIGNING_CERT_SUBJECT_ENV, "CN=JwtAuthForWebAPI Example"),
            (COOKIE_NAME_ENV, "session"),
            (ISSUER_ENV, "corp"),
            (ALLOWED_AUDIENCES_ENV, "http://www.example.com, ,http://api.example.com"),
            (CLOCK_SKEW_ENV, "300"),
            (REQUIRE_EXPIRATION_ENV, "true"),
            (EXPIRED_STATUS_ENV, "401"),
            (LOG_FORMAT_ENV, "JSON"),
        ])
        .unwrap();
        assert_eq!(
            cfg.auth.signing_cert_path,
            Some(PathBuf::from("/etc/jwt/signing.pem"))
        );
        assert_eq!(
            cfg.auth.signing_cert_subject.as_deref(),
            Some("CN=JwtAuthForWebAPI Example")
        );
        assert_eq!(cfg.auth.cookie_name, "session");
        assert_eq!(cfg.auth.issuer.as_deref(), Some("corp"));
        assert_eq!(
            cfg.auth.allowed_audiences,
            vec!["http://www.example.com", "http://api.example.com"]
        );
        assert_eq!(cfg.auth.clock_skew, Duration::from_secs(300));
        assert!(cfg.auth.require_expiration);
        assert_eq!(cfg.auth.expired_status, StatusCode::UNAUTHORIZED);
        assert_eq!(cfg.log_format, LogFormat::Json);
    }

    #[test]
    fn requires_a_trust_anchor() {
        assert!(matches!(config(&[]), Err(ConfigError::NoTrustAnchors)));
        assert!(matches!(
            config(&[(SYMMETRIC_KEY_ENV, "   ")]),
            Err(ConfigError::NoTrustAnchors)
        ));
    }

    #[test]
    fn rejects_invalid_values() {
        let key = (SYMMETRIC_KEY_ENV, "c2VjcmV0");
        assert!(matches!(
            config(&[key, (PORT_ENV, "eighty")]),
            Err(ConfigError::Invalid { var: PORT_ENV, .. })
        ));
        assert!(matches!(
            config(&[key, (EXPIRED_STATUS_ENV, "1000")]),
            Err(ConfigError::Invalid { var: EXPIRED_STATUS_ENV, .. })
        ));
        assert!(matches!(
            config(&[key, (REQUIRE_EXPIRATION_ENV, "maybe")]),
            Err(ConfigError::Invalid { .. })
        ));
        assert!(matches!(
            config(&[key, (LOG_FORMAT_ENV, "xml")]),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn tls_paths_come_in_pairs() {
        let key = (SYMMETRIC_KEY_ENV, "c2VjcmV0");
        assert!(matches!(
            config(&[key, (TLS_CERT_PATH_ENV, "/tls/cert.pem")]),
            Err(ConfigError::Incomplete(..))
        ));
        let cfg = config(&[
            key,
            (TLS_CERT_PATH_ENV, "/tls/cert.pem"),
            (TLS_KEY_PATH_ENV, "/tls/key.pem"),
        ])
        .unwrap();
        assert_eq!(cfg.tls.unwrap().key_path, PathBuf::from("/tls/key.pem"));
    }

    #[test]
    fn debug_redacts_shared_key() {
        let cfg = config(&[(SYMMETRIC_KEY_ENV, "c2VjcmV0")]).unwrap();
        let printed = format!("{:?}", cfg.auth);
        assert!(!printed.contains("c2VjcmV0"));
        assert!(printed.contains("<redacted>"));
    }
}
