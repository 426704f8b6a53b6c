// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::auth::anchors::KeyFamily;
use crate::state::AppState;

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub trust_anchors: TrustAnchorSummary,
}

/// How many trust anchors of each kind are loaded.
#[derive(Debug, Serialize, ToSchema)]
pub struct TrustAnchorSummary {
    pub rsa_certificates: usize,
    pub ec_certificates: usize,
    pub shared_keys: usize,
}

/// Liveness probe handler.
///
/// Anchors are loaded before the server starts, so a running process is
/// always able to verify tokens.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is alive", body = HealthResponse)
    )
)]
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let anchors = state.authenticator.anchors();
    Json(HealthResponse {
        status: "ok".to_string(),
        trust_anchors: TrustAnchorSummary {
            rsa_certificates: anchors.count(KeyFamily::Rsa),
            ec_certificates: anchors.count(KeyFamily::Ec),
            shared_keys: anchors.count(KeyFamily::Hmac),
        },
    })
}
