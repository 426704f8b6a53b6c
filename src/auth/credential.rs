// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Locating the bearer token on a request.
//!
//! The `Authorization: Bearer <token>` header wins whenever an
//! Authorization header is present at all. Only when the header is absent
//! is the token cookie consulted. A header that is present but unusable is
//! rejected outright instead of falling back to the cookie.

use axum::http::{
    header::{AUTHORIZATION, COOKIE},
    HeaderMap,
};
use cookie::Cookie;

use super::AuthError;

/// Default name of the cookie that may carry the token.
pub const DEFAULT_TOKEN_COOKIE: &str = "ut";

const BEARER_SCHEME: &str = "bearer";

/// Where a credential was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    Header,
    Cookie,
}

impl std::fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CredentialSource::Header => write!(f, "header"),
            CredentialSource::Cookie => write!(f, "cookie"),
        }
    }
}

/// A candidate token and where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub token: String,
    pub source: CredentialSource,
}

/// Find the request's credential.
///
/// Returns `Ok(None)` when the request carries neither an Authorization
/// header nor the token cookie.
pub fn extract_credential(
    headers: &HeaderMap,
    cookie_name: &str,
) -> Result<Option<Credential>, AuthError> {
    if let Some(value) = headers.get(AUTHORIZATION) {
        let value = value.to_str().map_err(|_| AuthError::InvalidAuthHeader)?;
        let token = bearer_token(value).ok_or(AuthError::InvalidAuthHeader)?;
        return Ok(Some(Credential {
            token: token.to_string(),
            source: CredentialSource::Header,
        }));
    }

    Ok(cookie_token(headers, cookie_name).map(|token| Credential {
        token,
        source: CredentialSource::Cookie,
    }))
}

/// Split `Bearer <token>`; the scheme is matched case-insensitively.
fn bearer_token(value: &str) -> Option<&str> {
    let (scheme, token) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case(BEARER_SCHEME) {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

fn cookie_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|c| c.name() == cookie_name && !c.value().is_empty())
        .map(|c| c.value().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.append(
                axum::http::HeaderName::from_bytes(name.as_bytes()).unwrap(),
                HeaderValue::from_str(value).unwrap(),
            );
        }
        map
    }

    #[test]
    fn no_header_and_no_cookie_is_no_credential() {
        let result = extract_credential(&HeaderMap::new(), DEFAULT_TOKEN_COOKIE);
        assert_eq!(result, Ok(None));
    }

    #[test]
    fn bearer_header_is_used() {
        let map = headers(&[("authorization", "Bearer abc.def.ghi")]);
        let credential = extract_credential(&map, DEFAULT_TOKEN_COOKIE)
            .unwrap()
            .unwrap();
        assert_eq!(credential.token, "abc.def.ghi");
        assert_eq!(credential.source, CredentialSource::Header);
    }

    #[test]
    fn bearer_scheme_is_case_insensitive() {
        let map = headers(&[("authorization", "bearer   abc.def.ghi ")]);
        let credential = extract_credential(&map, DEFAULT_TOKEN_COOKIE)
            .unwrap()
            .unwrap();
        assert_eq!(credential.token, "abc.def.ghi");
    }

    #[test]
    fn cookie_is_used_without_header() {
        let map = headers(&[("cookie", "theme=dark; ut=cookie.token.value")]);
        let credential = extract_credential(&map, DEFAULT_TOKEN_COOKIE)
            .unwrap()
            .unwrap();
        assert_eq!(credential.token, "cookie.token.value");
        assert_eq!(credential.source, CredentialSource::Cookie);
    }

    #[test]
    fn cookie_name_is_configurable() {
        let map = headers(&[("cookie", "ut=ignored; session=abc")]);
        let credential = extract_credential(&map, "session").unwrap().unwrap();
        assert_eq!(credential.token, "abc");
    }

    #[test]
    fn cookie_found_across_multiple_cookie_headers() {
        let map = headers(&[("cookie", "a=1"), ("cookie", "ut=from.second.header")]);
        let credential = extract_credential(&map, DEFAULT_TOKEN_COOKIE)
            .unwrap()
            .unwrap();
        assert_eq!(credential.token, "from.second.header");
    }

    #[test]
    fn empty_cookie_is_no_credential() {
        let map = headers(&[("cookie", "ut=")]);
        assert_eq!(extract_credential(&map, DEFAULT_TOKEN_COOKIE), Ok(None));
    }

    #[test]
    fn header_takes_precedence_over_cookie() {
        let map = headers(&[
            ("authorization", "Bearer header.token"),
            ("cookie", "ut=cookie.token"),
        ]);
        let credential = extract_credential(&map, DEFAULT_TOKEN_COOKIE)
            .unwrap()
            .unwrap();
        assert_eq!(credential.token, "header.token");
    }

    #[test]
    fn unusable_header_does_not_fall_back_to_cookie() {
        for header in ["Basic dXNlcjpwYXNz", "Bearer", "Bearer    ", "garbage"] {
            let map = headers(&[("authorization", header), ("cookie", "ut=cookie.token")]);
            assert_eq!(
                extract_credential(&map, DEFAULT_TOKEN_COOKIE),
                Err(AuthError::InvalidAuthHeader),
                "{header}"
            );
        }
    }

    #[test]
    fn non_ascii_header_is_invalid() {
        let mut map = HeaderMap::new();
        map.insert(
            AUTHORIZATION,
            HeaderValue::from_bytes(b"Bearer \xfftoken").unwrap(),
        );
        assert_eq!(
            extract_credential(&map, DEFAULT_TOKEN_COOKIE),
            Err(AuthError::InvalidAuthHeader)
        );
    }
}
