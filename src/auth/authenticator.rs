// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! The authentication pipeline.
//!
//! extract credential → verify signature → validate lifetime → decide.
//! Each step returns `Result` and the first failure ends the request.

use axum::http::{HeaderMap, StatusCode};
use chrono::{DateTime, Utc};

use super::{
    anchors::TrustAnchors,
    credential::extract_credential,
    error::AuthRejection,
    validator::ClaimsValidator,
    AuthError, AuthenticatedUser, TokenClaims, TokenVerifier,
};
use crate::config::{AuthSettings, ConfigError};

/// Authenticates requests against the configured trust anchors.
///
/// Built once at startup and shared read-only by every request.
#[derive(Debug, Clone)]
pub struct Authenticator {
    verifier: TokenVerifier,
    validator: ClaimsValidator,
    cookie_name: String,
    issuer: Option<String>,
    allowed_audiences: Vec<String>,
    expired_status: StatusCode,
}

impl Authenticator {
    pub fn new(verifier: TokenVerifier, settings: &AuthSettings) -> Self {
        Self {
            verifier,
            validator: ClaimsValidator::new(settings.clock_skew, settings.require_expiration),
            cookie_name: settings.cookie_name.clone(),
            issuer: settings.issuer.clone(),
            allowed_audiences: settings.allowed_audiences.clone(),
            expired_status: settings.expired_status,
        }
    }

    /// Load the trust anchors named by `settings` and build the pipeline.
    pub fn from_settings(settings: &AuthSettings) -> Result<Self, ConfigError> {
        let mut anchors = TrustAnchors::new();
        if let Some(path) = &settings.signing_cert_path {
            anchors =
                anchors.with_certificates_file(path, settings.signing_cert_subject.as_deref())?;
        }
        if let Some(key) = &settings.symmetric_key {
            anchors = anchors.with_shared_key_base64(key)?;
        }
        if anchors.is_empty() {
            return Err(ConfigError::NoTrustAnchors);
        }
        Ok(Self::new(TokenVerifier::new(anchors), settings))
    }

    pub fn anchors(&self) -> &TrustAnchors {
        self.verifier.anchors()
    }

    /// Authenticate a request by its headers.
    pub fn authenticate(&self, headers: &HeaderMap) -> Result<AuthenticatedUser, AuthError> {
        self.authenticate_at(headers, Utc::now())
    }

    pub fn authenticate_at(
        &self,
        headers: &HeaderMap,
        now: DateTime<Utc>,
    ) -> Result<AuthenticatedUser, AuthError> {
        let credential =
            extract_credential(headers, &self.cookie_name)?.ok_or(AuthError::MissingCredential)?;
        let claims = self.verifier.verify(&credential.token)?;
        self.note_foreign_claims(&claims);
        let user = self.validator.validate_at(claims, now)?;

        tracing::debug!(
            user = %user.name,
            source = %credential.source,
            "Request authenticated"
        );
        Ok(user)
    }

    /// Turn a failure into the response the client gets.
    pub fn reject(&self, error: AuthError) -> AuthRejection {
        tracing::info!(error_code = error.error_code(), "Authentication failed: {error}");
        error.with_expired_status(self.expired_status)
    }

    // Audience and issuer are never enforced, only reported.
    fn note_foreign_claims(&self, claims: &TokenClaims) {
        if !self.allowed_audiences.is_empty()
            && !claims
                .aud
                .iter()
                .any(|aud| self.allowed_audiences.iter().any(|a| a == aud))
        {
            tracing::debug!(
                audience = ?claims.aud,
                "Accepting token issued for another audience"
            );
        }
        if let (Some(expected), Some(actual)) = (&self.issuer, &claims.iss) {
            if expected != actual {
                tracing::debug!(issuer = %actual, "Accepting token from another issuer");
            }
        }
    }
}
