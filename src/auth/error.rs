// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Status returned for expired tokens unless configured otherwise.
///
/// 440 is not a registered HTTP status; clients rely on it to tell
/// "log in again" apart from "credentials rejected".
pub const DEFAULT_EXPIRED_STATUS: u16 = 440;

/// Text that every expired-token response body contains.
pub const TOKEN_EXPIRED_MESSAGE: &str = "Security token expired exception";

/// Authentication error type.
///
/// Every variant is an expected outcome of looking at a request, none of
/// them is a server fault. `TokenExpired` is kept apart from the rest
/// because it maps to its own status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Neither an Authorization header nor the token cookie was sent
    MissingCredential,
    /// Authorization header present but not `Bearer <token>`
    InvalidAuthHeader,
    /// Token could not be parsed, or lacks a required claim
    MalformedToken,
    /// Token declares an algorithm no trust anchor can verify
    UnsupportedAlgorithm(String),
    /// No configured trust anchor verifies the signature
    InvalidSignature,
    /// Token `nbf` lies in the future
    TokenNotYetValid,
    /// Token `exp` lies in the past
    TokenExpired { expired_at: DateTime<Utc> },
    /// Identity lacks the role the resource requires
    InsufficientPermissions,
}

#[derive(Serialize)]
struct AuthErrorBody {
    error: String,
    error_code: String,
}

impl AuthError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MissingCredential => "missing_credential",
            AuthError::InvalidAuthHeader => "invalid_auth_header",
            AuthError::MalformedToken => "malformed_token",
            AuthError::UnsupportedAlgorithm(_) => "unsupported_algorithm",
            AuthError::InvalidSignature => "invalid_signature",
            AuthError::TokenNotYetValid => "token_not_yet_valid",
            AuthError::TokenExpired { .. } => "token_expired",
            AuthError::InsufficientPermissions => "insufficient_permissions",
        }
    }

    /// Get the HTTP status code for this error.
    ///
    /// Expired tokens get [`DEFAULT_EXPIRED_STATUS`]; use
    /// [`AuthError::with_expired_status`] to override it.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::TokenExpired { .. } => expired_status_default(),
            _ => StatusCode::UNAUTHORIZED,
        }
    }

    /// Whether this is the expired-token outcome.
    pub fn is_expired(&self) -> bool {
        matches!(self, AuthError::TokenExpired { .. })
    }

    /// Attach the status that expired tokens should be answered with.
    pub fn with_expired_status(self, expired_status: StatusCode) -> AuthRejection {
        AuthRejection {
            error: self,
            expired_status,
        }
    }
}

fn expired_status_default() -> StatusCode {
    // 440 is inside the 100..=999 range StatusCode accepts.
    StatusCode::from_u16(DEFAULT_EXPIRED_STATUS).unwrap_or(StatusCode::UNAUTHORIZED)
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::MissingCredential => {
                write!(f, "Authorization header or token cookie is required")
            }
            AuthError::InvalidAuthHeader => {
                write!(f, "Invalid authorization header format (expected 'Bearer <token>')")
            }
            AuthError::MalformedToken => write!(f, "Token is malformed"),
            AuthError::UnsupportedAlgorithm(alg) => {
                write!(f, "Token signing algorithm {alg} is not accepted")
            }
            AuthError::InvalidSignature => write!(f, "Token signature is invalid"),
            AuthError::TokenNotYetValid => write!(f, "Token is not yet valid"),
            AuthError::TokenExpired { expired_at } => write!(
                f,
                "{TOKEN_EXPIRED_MESSAGE}: token expired at {}",
                expired_at.to_rfc3339()
            ),
            AuthError::InsufficientPermissions => {
                write!(f, "Insufficient permissions for this operation")
            }
        }
    }
}

impl std::error::Error for AuthError {}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        self.with_expired_status(status).into_response()
    }
}

/// An [`AuthError`] paired with the configured expired-token status.
///
/// This is what extractors and middleware reject with, so the 440
/// convention can be changed per deployment.
#[derive(Debug)]
pub struct AuthRejection {
    pub error: AuthError,
    pub expired_status: StatusCode,
}

impl AuthRejection {
    pub fn status_code(&self) -> StatusCode {
        if self.error.is_expired() {
            self.expired_status
        } else {
            self.error.status_code()
        }
    }
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(AuthErrorBody {
            error: self.error.to_string(),
            error_code: self.error.error_code().to_string(),
        });
        (status, body).into_response()
    }
}
