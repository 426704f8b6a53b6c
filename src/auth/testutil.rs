// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Test fixtures: key material and token minting.

use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};

use super::{
    claims::ClaimValues, anchors::TrustAnchors, Authenticator, TokenClaims, TokenVerifier,
};
use crate::config::AuthSettings;

pub const SIGNING_CERT_PEM: &str = include_str!("../../testdata/signing_cert.pem");
pub const SIGNING_KEY_PEM: &str = include_str!("../../testdata/signing_key.pem");
pub const OTHER_CERT_PEM: &str = include_str!("../../testdata/other_cert.pem");
pub const OTHER_KEY_PEM: &str = include_str!("../../testdata/other_key.pem");
pub const EC_SIGNING_CERT_PEM: &str = include_str!("../../testdata/ec_signing_cert.pem");
pub const EC_SIGNING_KEY_PEM: &str = include_str!("../../testdata/ec_signing_key.pem");
/// P-384 key with no certificate, for curve mismatch cases.
pub const P384_KEY_PEM: &str = include_str!("../../testdata/p384_key.pem");

pub const SIGNING_CERT_SUBJECT: &str = "CN=JwtAuthForWebAPI Example";

/// UTF-16LE `abcdefghijklmnopqrstuvwxyz012345`, base64 encoded.
pub const SYMMETRIC_KEY_B64: &str =
    "YQBiAGMAZABlAGYAZwBoAGkAagBrAGwAbQBuAG8AcABxAHIAcwB0AHUAdgB3AHgAeQB6ADAAMQAyADMANAA1AA==";

/// Bob's claims, valid for the next hour.
pub fn bob_claims(audience: &str) -> TokenClaims {
    let now = Utc::now();
    claims_with_lifetime(audience, now - Duration::minutes(1), now + Duration::hours(1))
}

pub fn claims_with_lifetime(
    audience: &str,
    not_before: DateTime<Utc>,
    expires: DateTime<Utc>,
) -> TokenClaims {
    TokenClaims {
        unique_name: Some("bsmith".into()),
        given_name: Some("Bob".into()),
        family_name: Some("Smith".into()),
        role: ClaimValues::from("Customer Service"),
        iss: Some("corp".into()),
        aud: ClaimValues::from(audience),
        nbf: Some(not_before.timestamp()),
        exp: Some(expires.timestamp()),
        iat: Some(not_before.timestamp()),
        ..Default::default()
    }
}

pub fn mint_with_header(header: Header, claims: &TokenClaims, key: &EncodingKey) -> String {
    encode(&header, claims, key).unwrap()
}

pub fn mint_hs256(claims: &TokenClaims) -> String {
    let secret = STANDARD.decode(SYMMETRIC_KEY_B64).unwrap();
    mint_with_header(
        Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(&secret),
    )
}

pub fn mint_rs256(claims: &TokenClaims) -> String {
    mint_with_header(
        Header::new(Algorithm::RS256),
        claims,
        &EncodingKey::from_rsa_pem(SIGNING_KEY_PEM.as_bytes()).unwrap(),
    )
}

pub fn mint_rs256_with_other_key(claims: &TokenClaims) -> String {
    mint_with_header(
        Header::new(Algorithm::RS256),
        claims,
        &EncodingKey::from_rsa_pem(OTHER_KEY_PEM.as_bytes()).unwrap(),
    )
}

pub fn mint_es256(claims: &TokenClaims) -> String {
    mint_with_header(
        Header::new(Algorithm::ES256),
        claims,
        &EncodingKey::from_ec_pem(EC_SIGNING_KEY_PEM.as_bytes()).unwrap(),
    )
}

/// The signing certificate plus the shared key.
pub fn test_anchors() -> TrustAnchors {
    TrustAnchors::new()
        .with_certificates_pem(SIGNING_CERT_PEM.as_bytes(), Some(SIGNING_CERT_SUBJECT))
        .unwrap()
        .with_shared_key_base64(SYMMETRIC_KEY_B64)
        .unwrap()
}

pub fn test_settings() -> AuthSettings {
    AuthSettings {
        issuer: Some("corp".into()),
        allowed_audiences: vec!["http://www.example.com".into()],
        ..AuthSettings::default()
    }
}

pub fn test_authenticator() -> Authenticator {
    Authenticator::new(TokenVerifier::new(test_anchors()), &test_settings())
}
