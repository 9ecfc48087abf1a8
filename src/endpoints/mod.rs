pub mod companies;
pub mod funding_pools;
pub mod investments;
pub mod invitations;
pub mod uploads;
pub mod users;
pub mod webhooks;

use axum::{middleware as axum_middleware, Router};

use crate::config::CONFIG;
use crate::middleware::{require_admin, require_auth};
use crate::state::AppState;

/// Create the main API router
pub fn create_router(state: AppState) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", axum::routing::get(health_check))
        .route("/version", axum::routing::get(get_version))
        .nest("/v1/users", users::public_routes(state.clone()))
        .nest("/v1/companies", companies::public_routes(state.clone()))
        .nest(
            "/v1/funding-pools",
            funding_pools::public_routes(state.clone()),
        )
        .nest(
            "/v1/investments",
            investments::public_routes(state.clone()),
        )
        .nest("/v1/webhooks", webhooks::public_routes(state.clone()));

    // Routes for any authenticated account
    let protected_routes = Router::new()
        .nest("/v1/users", users::protected_routes(state.clone()))
        .nest(
            "/v1/companies",
            companies::protected_routes(state.clone()),
        )
        .nest(
            "/v1/investments",
            investments::protected_routes(state.clone()),
        )
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ));

    // Admin-only management routes
    let admin_routes = Router::new()
        .nest("/v1/users", users::admin_routes(state.clone()))
        .nest("/v1/companies", companies::admin_routes(state.clone()))
        .nest(
            "/v1/funding-pools",
            funding_pools::admin_routes(state.clone()),
        )
        .nest(
            "/v1/investments",
            investments::admin_routes(state.clone()),
        )
        .nest(
            "/v1/invitations",
            invitations::admin_routes(state.clone()),
        )
        .layer(axum_middleware::from_fn_with_state(state, require_admin));

    public_routes.merge(protected_routes).merge(admin_routes)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

/// Version info endpoint
async fn get_version() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "version": CONFIG.version,
        "backend": "rust"
    }))
}
