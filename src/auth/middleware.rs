// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication middleware for Axum.
//!
//! Apply [`require_auth`] to the routes that need a caller and
//! [`require_roles`] inside it for routes that also need a role:
//!
//! ```rust,ignore
//! let app = Router::new()
//!     .route(
//!         "/admin",
//!         delete(handler).route_layer(axum::middleware::from_fn_with_state(
//!             RoleRequirement::role("Administrator"),
//!             require_roles,
//!         )),
//!     )
//!     .route_layer(axum::middleware::from_fn_with_state(state.clone(), require_auth));
//! ```
//!
//! Routes without these layers are anonymous; nothing here inspects them.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::{AuthError, AuthenticatedUser, RoleRequirement};
use crate::state::AppState;

/// Authenticate the request or answer it with the rejection.
///
/// On success the [`AuthenticatedUser`] is added to the request extensions.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    match state.authenticator.authenticate(request.headers()) {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(e) => state.authenticator.reject(e).into_response(),
    }
}

/// Let the request through only if the authenticated user holds a required role.
///
/// Must run inside [`require_auth`]. A missing role is answered with 401.
pub async fn require_roles(
    State(requirement): State<RoleRequirement>,
    request: Request,
    next: Next,
) -> Response {
    let Some(user) = request.extensions().get::<AuthenticatedUser>() else {
        return AuthError::MissingCredential.into_response();
    };

    if !requirement.is_satisfied_by(user) {
        tracing::info!(
            user = %user.name,
            required = %requirement,
            "Caller lacks required role"
        );
        return AuthError::InsufficientPermissions.into_response();
    }

    next.run(request).await
}
