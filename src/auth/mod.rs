// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! JWT bearer authentication with two kinds of trust anchor.
//!
//! ## Auth Flow
//!
//! 1. The client sends `Authorization: Bearer <JWT>`, or, without any
//!    Authorization header, the JWT in the `ut` cookie
//! 2. The server:
//!    - Picks the trust anchor kind from the token's `alg`
//!      (`HS*` → shared key, `RS*`/`PS*`/`ES*` → signing certificate)
//!    - Verifies the signature, then `exp` and `nbf`
//!    - Extracts name, given name, surname and roles
//! 3. Expired tokens are answered with status 440 and a
//!    `Security token expired exception` message; every other failure is 401
//!
//! ## Security
//!
//! - Signature checks happen before any claim is looked at
//! - Audience and issuer are reported, never enforced
//! - Clock skew tolerance defaults to 60 seconds
//! - Trust anchors are loaded once and never refreshed

pub mod anchors;
pub mod authenticator;
pub mod claims;
pub mod credential;
pub mod error;
pub mod extractor;
pub mod middleware;
pub mod roles;
pub mod validator;
pub mod verifier;

#[cfg(test)]
pub(crate) mod testutil;

pub use anchors::{TrustAnchor, TrustAnchorError, TrustAnchors};
pub use authenticator::Authenticator;
pub use claims::{AuthenticatedUser, TokenClaims};
pub use credential::{Credential, CredentialSource};
pub use error::{AuthError, AuthRejection};
pub use extractor::{Auth, OptionalAuth};
pub use middleware::{require_auth, require_roles};
pub use roles::RoleRequirement;
pub use validator::ClaimsValidator;
pub use verifier::TokenVerifier;
