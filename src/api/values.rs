// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Sample values endpoints guarded by the authentication layer.

use axum::{extract::Path, http::StatusCode, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    auth::{Auth, AuthenticatedUser, OptionalAuth},
    error::ApiError,
};

/// Role allowed to delete values.
pub const ADMINISTRATOR_ROLE: &str = "Administrator";

const VALUES: [&str; 2] = ["value1", "value2"];

/// Response for GET /api/values
#[derive(Debug, Serialize, ToSchema)]
pub struct ValuesResponse {
    /// Name of the authenticated caller
    pub caller: String,
    pub values: Vec<String>,
}

/// Response for GET /api/values/{id}
#[derive(Debug, Serialize, ToSchema)]
pub struct ValueResponse {
    pub caller: String,
    pub id: usize,
    pub value: String,
}

/// Response for POST /api/values
#[derive(Debug, Serialize, ToSchema)]
pub struct CreatedValue {
    pub value: String,
    /// Caller name, when the request happened to carry a valid token
    pub submitted_by: Option<String>,
}

/// List values together with the caller's name.
#[utoipa::path(
    get,
    path = "/api/values",
    tag = "Values",
    security(("bearer" = []), ("cookie" = [])),
    responses(
        (status = 200, description = "Values", body = ValuesResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 440, description = "Token expired"),
    )
)]
pub async fn list_values(Auth(user): Auth) -> Json<ValuesResponse> {
    Json(ValuesResponse {
        caller: user.name,
        values: VALUES.iter().map(|v| v.to_string()).collect(),
    })
}

/// Get a single value (1-based id).
#[utoipa::path(
    get,
    path = "/api/values/{id}",
    tag = "Values",
    params(("id" = usize, Path, description = "Value id, starting at 1")),
    security(("bearer" = []), ("cookie" = [])),
    responses(
        (status = 200, description = "Value", body = ValueResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "No such value"),
    )
)]
pub async fn get_value(
    Auth(user): Auth,
    Path(id): Path<usize>,
) -> Result<Json<ValueResponse>, ApiError> {
    let value = id
        .checked_sub(1)
        .and_then(|index| VALUES.get(index))
        .ok_or_else(|| ApiError::not_found(format!("value {id} not found")))?;

    Ok(Json(ValueResponse {
        caller: user.name,
        id,
        value: value.to_string(),
    }))
}

/// Echo a posted value. Open to anonymous callers.
#[utoipa::path(
    post,
    path = "/api/values",
    tag = "Values",
    request_body(content = String, content_type = "text/plain"),
    responses(
        (status = 200, description = "Accepted value", body = CreatedValue),
        (status = 400, description = "Empty value"),
    )
)]
pub async fn create_value(
    OptionalAuth(user): OptionalAuth,
    body: String,
) -> Result<Json<CreatedValue>, ApiError> {
    let value = body.trim();
    if value.is_empty() {
        return Err(ApiError::bad_request("value must not be empty"));
    }
    Ok(Json(CreatedValue {
        value: value.to_string(),
        submitted_by: user.map(|u| u.name),
    }))
}

/// Delete a value. Requires the `Administrator` role.
#[utoipa::path(
    delete,
    path = "/api/values/{id}",
    tag = "Values",
    params(("id" = usize, Path, description = "Value id")),
    security(("bearer" = []), ("cookie" = [])),
    responses(
        (status = 204, description = "Deleted"),
        (status = 401, description = "Missing token or role"),
    )
)]
pub async fn delete_value(Auth(user): Auth, Path(id): Path<usize>) -> StatusCode {
    tracing::info!(user = %user.name, id, "Value deleted");
    StatusCode::NO_CONTENT
}

/// Identity of the caller, as the authentication layer saw it.
#[utoipa::path(
    get,
    path = "/api/me",
    tag = "Values",
    security(("bearer" = []), ("cookie" = [])),
    responses(
        (status = 200, description = "Caller identity", body = AuthenticatedUser),
        (status = 401, description = "Missing or invalid token"),
    )
)]
pub async fn me(Auth(user): Auth) -> Json<AuthenticatedUser> {
    Json(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::TokenClaims;

    fn bob() -> AuthenticatedUser {
        AuthenticatedUser::from_claims(TokenClaims {
            unique_name: Some("bsmith".into()),
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn list_values_includes_caller() {
        let Json(response) = list_values(Auth(bob())).await;
        assert_eq!(response.caller, "bsmith");
        assert_eq!(response.values, vec!["value1", "value2"]);
    }

    #[tokio::test]
    async fn get_value_is_one_based() {
        let Json(response) = get_value(Auth(bob()), Path(2)).await.unwrap();
        assert_eq!(response.value, "value2");

        let err = get_value(Auth(bob()), Path(0)).await.unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        let err = get_value(Auth(bob()), Path(3)).await.unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn create_value_rejects_empty_body() {
        let err = create_value(OptionalAuth(None), "  ".into())
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);

        let Json(created) = create_value(OptionalAuth(None), "some new value".into())
            .await
            .unwrap();
        assert_eq!(created.value, "some new value");
        assert_eq!(created.submitted_by, None);
    }

    #[tokio::test]
    async fn create_value_records_known_caller() {
        let Json(created) = create_value(OptionalAuth(Some(bob())), "v".into())
            .await
            .unwrap();
        assert_eq!(created.submitted_by.as_deref(), Some("bsmith"));
    }
}
