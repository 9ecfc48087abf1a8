use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::models::prelude::*;
use crate::models::user;
use crate::state::AppState;

/// Provider callbacks. Unauthenticated: the provider addresses the session
/// by the identification id it issued.
pub fn public_routes(state: AppState) -> Router {
    Router::new()
        .route("/{identification_id}/receive", post(receive_kyc_result))
        .with_state(state)
}

const EVENT_CROSS_CHECKED: &str = "CROSS_CHECKED";
const REQUEST_STATUS_AUTO_FINISH: &str = "AUTO_FINISH";
const REQUEST_STATUS_MANUAL_FINISH: &str = "MANUAL_FINISH";

/// Payload the verification provider posts when a session finishes. Field
/// names are the provider's, PascalCase included.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct KycResultPayload {
    #[serde(rename = "Event")]
    pub event: String,
    #[serde(rename = "RequestStatus")]
    pub request_status: Option<String>,
}

/// Record the outcome of an identity-verification session. The user passes
/// only when the documents were cross-checked and the request finished,
/// automatically or after manual review; any other combination records a
/// fail and the user may start over.
#[utoipa::path(
    post,
    path = "/v1/webhooks/{identification_id}/receive",
    tag = "Webhooks",
    params(
        ("identification_id" = String, Path, description = "Verification session id issued by the provider"),
    ),
    request_body = KycResultPayload,
    responses(
        (status = 200, description = "Outcome recorded"),
        (status = 404, description = "No user holds this session"),
        (status = 409, description = "User already passed KYC")
    )
)]
async fn receive_kyc_result(
    State(state): State<AppState>,
    Path(identification_id): Path<String>,
    Json(payload): Json<KycResultPayload>,
) -> Result<StatusCode> {
    let found = User::find()
        .filter(user::Column::IdentificationId.eq(&identification_id))
        .one(&state.db)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!(
                "Could not find user with {} identification id",
                identification_id
            ))
        })?;

    if found.kyc_passed {
        return Err(AppError::Conflict(format!(
            "{} already passed KYC successfully",
            found.email
        )));
    }

    let passed = payload.event == EVENT_CROSS_CHECKED
        && matches!(
            payload.request_status.as_deref(),
            Some(REQUEST_STATUS_AUTO_FINISH) | Some(REQUEST_STATUS_MANUAL_FINISH)
        );

    tracing::info!(
        identification_id,
        event = %payload.event,
        request_status = ?payload.request_status,
        passed,
        "KYC result received"
    );

    let mut active: user::ActiveModel = found.into();
    active.kyc_passed = Set(passed);
    active.updated_at = Set(Utc::now());
    active.update(&state.db).await?;

    Ok(StatusCode::OK)
}
