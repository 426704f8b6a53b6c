// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    middleware::from_fn_with_state,
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::{require_auth, require_roles, AuthenticatedUser, RoleRequirement},
    state::AppState,
};

pub mod health;
pub mod values;

pub fn router(state: AppState) -> Router {
    let authenticated = from_fn_with_state(state.clone(), require_auth);
    let administrators = from_fn_with_state(
        RoleRequirement::role(values::ADMINISTRATOR_ROLE),
        require_roles,
    );

    let api_routes = Router::new()
        .route(
            "/values",
            get(values::list_values)
                .route_layer(authenticated.clone())
                .merge(post(values::create_value)),
        )
        .route(
            "/values/{id}",
            get(values::get_value)
                .merge(delete(values::delete_value).route_layer(administrators))
                .route_layer(authenticated.clone()),
        )
        .route("/me", get(values::me).route_layer(authenticated));

    let app = Router::new()
        .nest("/api", api_routes)
        .route("/health", get(health::health))
        .with_state(state);

    // Outermost layer last: request ids are assigned before tracing starts.
    Router::new()
        .merge(app)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        values::list_values,
        values::get_value,
        values::create_value,
        values::delete_value,
        values::me
    ),
    components(
        schemas(
            health::HealthResponse,
            health::TrustAnchorSummary,
            values::ValuesResponse,
            values::ValueResponse,
            values::CreatedValue,
            AuthenticatedUser
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Liveness"),
        (name = "Values", description = "Sample resources behind the JWT gate")
    )
)]
struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
            components.add_security_scheme(
                "cookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(
                    crate::auth::credential::DEFAULT_TOKEN_COOKIE,
                ))),
            );
        }
    }
}
