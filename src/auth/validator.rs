// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Time-bound validation of verified claims.

use std::time::Duration;

use chrono::{DateTime, Utc};

use super::{AuthError, AuthenticatedUser, TokenClaims};

/// Default clock skew tolerance (60 seconds).
pub const DEFAULT_CLOCK_SKEW: Duration = Duration::from_secs(60);

/// Checks `exp` and `nbf` against the current time.
#[derive(Debug, Clone)]
pub struct ClaimsValidator {
    leeway: Duration,
    require_expiration: bool,
}

impl Default for ClaimsValidator {
    fn default() -> Self {
        Self {
            leeway: DEFAULT_CLOCK_SKEW,
            require_expiration: false,
        }
    }
}

impl ClaimsValidator {
    pub fn new(leeway: Duration, require_expiration: bool) -> Self {
        Self {
            leeway,
            require_expiration,
        }
    }

    /// Validate against `now`.
    ///
    /// Expiry is checked before not-before, so a token that is both expired
    /// and immature reports as expired.
    pub fn validate_at(
        &self,
        claims: TokenClaims,
        now: DateTime<Utc>,
    ) -> Result<AuthenticatedUser, AuthError> {
        let now = now.timestamp();
        let leeway = i64::try_from(self.leeway.as_secs()).unwrap_or(i64::MAX);

        match claims.exp {
            Some(exp) if now > exp.saturating_add(leeway) => {
                return Err(AuthError::TokenExpired {
                    expired_at: DateTime::from_timestamp(exp, 0).unwrap_or_default(),
                });
            }
            None if self.require_expiration => return Err(AuthError::MalformedToken),
            _ => {}
        }

        if let Some(nbf) = claims.nbf {
            if now.saturating_add(leeway) < nbf {
                return Err(AuthError::TokenNotYetValid);
            }
        }

        Ok(AuthenticatedUser::from_claims(claims))
    }
}
