// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token signature verification.
//!
//! The token's own `alg` header picks the trust mechanism: `HS*` tokens are
//! checked against shared keys, `RS*`/`PS*`/`ES*` tokens against certificate
//! keys. Only the signature is checked here; `exp`/`nbf` are left to the
//! claims validator so that a bad signature never reaches it.
//!
//! Audience and issuer are deliberately not enforced.

use jsonwebtoken::{decode, decode_header, errors::ErrorKind, Algorithm, Validation};

use super::anchors::{KeyFamily, TrustAnchors};
use super::{AuthError, TokenClaims};

/// Verifies token signatures against a fixed set of trust anchors.
#[derive(Debug, Clone)]
pub struct TokenVerifier {
    anchors: TrustAnchors,
}

impl TokenVerifier {
    pub fn new(anchors: TrustAnchors) -> Self {
        Self { anchors }
    }

    pub fn anchors(&self) -> &TrustAnchors {
        &self.anchors
    }

    /// Verify the signature and return the token's claims.
    ///
    /// When several anchors could have signed the token, the first one that
    /// verifies wins. A token no anchor verifies is `InvalidSignature`.
    pub fn verify(&self, token: &str) -> Result<TokenClaims, AuthError> {
        let header = decode_header(token).map_err(|_| AuthError::MalformedToken)?;

        let family = KeyFamily::for_algorithm(header.alg)
            .ok_or_else(|| AuthError::UnsupportedAlgorithm(format!("{:?}", header.alg)))?;

        let hint = header.x5t_s256.as_deref().or(header.kid.as_deref());
        let candidates = self.anchors.candidates(family, hint);
        if candidates.is_empty() {
            tracing::debug!(alg = ?header.alg, "No trust anchor for token algorithm");
            return Err(AuthError::InvalidSignature);
        }

        let validation = signature_only(header.alg);
        for anchor in candidates {
            match decode::<TokenClaims>(token, anchor.decoding_key(), &validation) {
                Ok(data) => return Ok(data.claims),
                Err(e) => match e.kind() {
                    ErrorKind::InvalidToken
                    | ErrorKind::Base64(_)
                    | ErrorKind::Json(_)
                    | ErrorKind::Utf8(_) => return Err(AuthError::MalformedToken),
                    _ => {
                        tracing::trace!(anchor = ?anchor, error = %e, "Anchor rejected token");
                    }
                },
            }
        }

        Err(AuthError::InvalidSignature)
    }
}

/// Validation that checks the signature and nothing else.
fn signature_only(alg: Algorithm) -> Validation {
    let mut validation = Validation::new(alg);
    validation.validate_exp = false;
    validation.validate_nbf = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();
    validation
}
