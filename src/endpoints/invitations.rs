use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use sea_orm::{EntityTrait, PaginatorTrait, QuerySelect};
use serde::Serialize;
use serde_json::json;

use crate::error::{AppError, Result};
use crate::middleware::Pagination;
use crate::models::prelude::*;
use crate::models::{invitation, user};
use crate::state::AppState;

pub fn admin_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(list_invitations))
        .route("/{id}", delete(delete_invitation))
        .with_state(state)
}

/// A referral record with the referring user attached.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvitationWithSender {
    #[serde(flatten)]
    pub invitation: invitation::Model,
    pub sender: Option<user::Model>,
}

async fn list_invitations(
    State(state): State<AppState>,
    pagination: Pagination,
) -> Result<Json<serde_json::Value>> {
    let count = Invitation::find().count(&state.db).await?;
    let rows = Invitation::find()
        .find_also_related(User)
        .offset(pagination.start_index)
        .limit(pagination.sql_limit())
        .all(&state.db)
        .await?;

    let data: Vec<InvitationWithSender> = rows
        .into_iter()
        .map(|(invitation, sender)| InvitationWithSender { invitation, sender })
        .collect();

    Ok(Json(json!({ "data": data, "count": count })))
}

async fn delete_invitation(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    let deleted = Invitation::delete_by_id(id).exec(&state.db).await?;
    if deleted.rows_affected == 0 {
        return Err(AppError::NotFound(
            "Invitation does not exist!".to_string(),
        ));
    }

    Ok(StatusCode::NO_CONTENT)
}
