// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JWT claims and authenticated user representation.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use utoipa::ToSchema;

/// Claim value that may be sent as a single string or as an array.
///
/// `role` and `aud` are both used either way by token issuers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClaimValues(Vec<String>);

impl ClaimValues {
    pub fn new(values: Vec<String>) -> Self {
        Self(values)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, value: &str) -> bool {
        self.0.iter().any(|v| v == value)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl From<&str> for ClaimValues {
    fn from(value: &str) -> Self {
        Self(vec![value.to_string()])
    }
}

impl Serialize for ClaimValues {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0.as_slice() {
            [single] => serializer.serialize_str(single),
            many => many.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for ClaimValues {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum OneOrMany {
            One(String),
            Many(Vec<String>),
        }

        Ok(match OneOrMany::deserialize(deserializer)? {
            OneOrMany::One(value) => Self(vec![value]),
            OneOrMany::Many(values) => Self(values),
        })
    }
}

/// Claims carried by a verified token.
///
/// Short JWT claim names are primary; the long WS-Federation claim URIs
/// some issuers emit are accepted as aliases. Anything else is kept in
/// `extra` untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,

    /// Caller name (`unique_name`)
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        alias = "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/name"
    )]
    pub unique_name: Option<String>,

    /// OIDC display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        alias = "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/givenname"
    )]
    pub given_name: Option<String>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        alias = "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/surname"
    )]
    pub family_name: Option<String>,

    #[serde(
        default,
        skip_serializing_if = "ClaimValues::is_empty",
        alias = "http://schemas.microsoft.com/ws/2008/06/identity/claims/role"
    )]
    pub role: ClaimValues,

    /// Issuer (informational only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,

    /// Audience (informational only, never enforced)
    #[serde(default, skip_serializing_if = "ClaimValues::is_empty")]
    pub aud: ClaimValues,

    /// Not before (Unix seconds)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbf: Option<i64>,

    /// Expiration (Unix seconds)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,

    /// Issued at (Unix seconds)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl TokenClaims {
    /// Caller name: `unique_name`, else `name`, else `sub`.
    pub fn caller_name(&self) -> Option<&str> {
        self.unique_name
            .as_deref()
            .or(self.name.as_deref())
            .or(self.sub.as_deref())
    }
}

/// Authenticated user information extracted from a verified token.
///
/// Inserted into the request extensions once the token passed every check;
/// downstream authorization reads roles from here.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AuthenticatedUser {
    /// Caller name
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub given_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub surname: Option<String>,

    pub roles: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,

    pub audiences: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,

    /// Every claim of the token, as verified
    #[serde(skip)]
    pub claims: TokenClaims,
}

impl AuthenticatedUser {
    /// Build the identity from verified claims.
    pub fn from_claims(claims: TokenClaims) -> Self {
        Self {
            name: claims.caller_name().unwrap_or_default().to_string(),
            given_name: claims.given_name.clone(),
            surname: claims.family_name.clone(),
            roles: claims.role.clone().into_vec(),
            issuer: claims.iss.clone(),
            audiences: claims.aud.clone().into_vec(),
            expires_at: claims.exp.and_then(|exp| DateTime::from_timestamp(exp, 0)),
            claims,
        }
    }

    /// Exact, case-sensitive role membership.
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}
