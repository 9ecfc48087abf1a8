//! Authentication middleware for API routes.
//!
//! Resolves the caller from a Bearer token (header or `?token=` query
//! fallback) and stores the user in request extensions. The admin variant
//! additionally requires the admin role.

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::EntityTrait;

use crate::models::prelude::*;
use crate::models::user;
use crate::services::security::decode_token;
use crate::state::AppState;

/// Authenticated user stored in request extensions
#[derive(Clone)]
pub struct AuthenticatedUser(pub user::Model);

/// Auth middleware that validates Bearer tokens and attaches the user.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let user = match resolve_user(&state, extract_token(&req), false).await {
        Ok(u) => u,
        Err(resp) => return resp,
    };

    req.extensions_mut().insert(AuthenticatedUser(user));
    next.run(req).await
}

/// Auth middleware that additionally requires the admin role.
pub async fn require_admin(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let user = match resolve_user(&state, extract_token(&req), true).await {
        Ok(u) => u,
        Err(resp) => return resp,
    };

    if !user.is_admin() {
        return error_response(
            StatusCode::FORBIDDEN,
            "You don't have permission for this action!",
        );
    }

    req.extensions_mut().insert(AuthenticatedUser(user));
    next.run(req).await
}

/// Token from the Authorization header, falling back to a `token` query
/// parameter (used by document download links).
fn extract_token(req: &Request) -> Option<String> {
    if let Some(auth_header) = req.headers().get(AUTHORIZATION) {
        if let Ok(auth_str) = auth_header.to_str() {
            if let Some(token) = auth_str.strip_prefix("Bearer ") {
                return Some(token.to_string());
            }
        }
    }

    let query = req.uri().query()?;
    query.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        (key == "token" && !value.is_empty()).then(|| value.to_string())
    })
}

/// Resolve the calling user. Failure statuses distinguish the failure
/// kind: 400 missing token, 500 undecodable token, 404 unknown user (500
/// on the admin paths, which never leak whether an account exists).
async fn resolve_user(
    state: &AppState,
    token: Option<String>,
    admin_gate: bool,
) -> Result<user::Model, Response> {
    let token = match token {
        Some(t) => t,
        None => {
            return Err(error_response(
                StatusCode::BAD_REQUEST,
                "Token is not provided!",
            ));
        }
    };

    let claims = match decode_token(&token) {
        Ok(c) => c,
        Err(e) => {
            return Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &format!("Invalid token: {}", e),
            ));
        }
    };

    let user_id: i64 = match claims.sub.parse() {
        Ok(id) => id,
        Err(_) => {
            return Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Invalid token subject",
            ));
        }
    };

    let found_user = match User::find_by_id(user_id).one(&state.db).await {
        Ok(u) => u,
        Err(e) => {
            return Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &format!("Database error: {}", e),
            ));
        }
    };

    found_user.ok_or_else(|| {
        if admin_gate {
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "User not found!")
        } else {
            error_response(StatusCode::NOT_FOUND, "User not found!")
        }
    })
}

/// Create a JSON error response in the application's error shape.
fn error_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(serde_json::json!({
            "detail": message
        })),
    )
        .into_response()
}

