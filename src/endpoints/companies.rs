use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, PaginatorTrait, QueryFilter,
    QuerySelect, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::endpoints::uploads;
use crate::error::{AppError, Result};
use crate::middleware::Pagination;
use crate::models::company::{CompanyDetails, FundingTeam, SocialLinks};
use crate::models::prelude::*;
use crate::models::{company, funding_pool};
use crate::state::AppState;

pub fn public_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(list_companies))
        .route("/{id}", get(get_company))
        .with_state(state)
}

pub fn protected_routes(state: AppState) -> Router {
    Router::new()
        .route("/{id}", put(update_company))
        .with_state(state)
}

pub fn admin_routes(state: AppState) -> Router {
    Router::new()
        .route("/", post(create_company))
        .route("/file", post(uploads::upload_file))
        .route("/{id}", delete(delete_company))
        .with_state(state)
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCompanyRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub website_url: Option<String>,
    pub icon_url: Option<String>,
    pub details: Option<CompanyDetails>,
    pub funding_team: Option<FundingTeam>,
    pub social_media: Option<SocialLinks>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCompanyRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub website_url: Option<String>,
    pub icon_url: Option<String>,
    pub details: Option<CompanyDetails>,
    pub funding_team: Option<FundingTeam>,
    pub social_media: Option<SocialLinks>,
}

/// A company with every deal it has raised through.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyWithPools {
    #[serde(flatten)]
    pub company: company::Model,
    pub funding_pools: Vec<funding_pool::Model>,
}

// ============================================================================
// Handlers
// ============================================================================

async fn list_companies(
    State(state): State<AppState>,
    pagination: Pagination,
) -> Result<Json<serde_json::Value>> {
    let count = Company::find().count(&state.db).await?;
    let companies = Company::find()
        .offset(pagination.start_index)
        .limit(pagination.sql_limit())
        .all(&state.db)
        .await?;

    let mut data = Vec::with_capacity(companies.len());
    for company in companies {
        let funding_pools = company.find_related(FundingPool).all(&state.db).await?;
        data.push(CompanyWithPools {
            company,
            funding_pools,
        });
    }

    Ok(Json(json!({ "data": data, "count": count })))
}

async fn get_company(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<company::Model>> {
    let found = Company::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Company does not exist!".to_string()))?;

    Ok(Json(found))
}

async fn create_company(
    State(state): State<AppState>,
    Json(req): Json<CreateCompanyRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>)> {
    let Some(name) = req.name.filter(|n| !n.is_empty()) else {
        return Err(AppError::BadRequest(
            "Submit all required parameters".to_string(),
        ));
    };

    let new_company = company::ActiveModel {
        name: Set(name),
        description: Set(req.description),
        category: Set(req.category),
        website_url: Set(req.website_url),
        icon_url: Set(req.icon_url),
        details: Set(req.details.unwrap_or_default()),
        funding_team: Set(req.funding_team.unwrap_or_default()),
        social_media: Set(req.social_media.unwrap_or_default()),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    let created = new_company.insert(&state.db).await?;

    Ok((StatusCode::CREATED, Json(json!({ "data": created }))))
}

async fn update_company(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateCompanyRequest>,
) -> Result<Json<serde_json::Value>> {
    let found = Company::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Company does not exist!".to_string()))?;

    let mut active: company::ActiveModel = found.into();
    if let Some(name) = req.name {
        active.name = Set(name);
    }
    if req.description.is_some() {
        active.description = Set(req.description);
    }
    if req.category.is_some() {
        active.category = Set(req.category);
    }
    if req.website_url.is_some() {
        active.website_url = Set(req.website_url);
    }
    if req.icon_url.is_some() {
        active.icon_url = Set(req.icon_url);
    }
    if let Some(details) = req.details {
        active.details = Set(details);
    }
    if let Some(team) = req.funding_team {
        active.funding_team = Set(team);
    }
    if let Some(links) = req.social_media {
        active.social_media = Set(links);
    }
    let updated = active.update(&state.db).await?;

    Ok(Json(json!({ "data": updated })))
}

/// Remove a company together with its funding pools, then clean up the
/// uploaded images. Image deletion is best-effort: a stray object in the
/// bucket must not resurrect the company.
async fn delete_company(State(state): State<AppState>, Path(id): Path<i64>) -> Result<StatusCode> {
    let found = Company::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Company does not exist!".to_string()))?;

    let mut image_urls: Vec<String> = Vec::new();
    if let Some(icon) = &found.icon_url {
        image_urls.push(icon.clone());
    }
    for member in &found.funding_team.0 {
        if let Some(image) = &member.image {
            image_urls.push(image.clone());
        }
    }

    let txn = state.db.begin().await?;
    FundingPool::delete_many()
        .filter(funding_pool::Column::CompanyId.eq(found.id))
        .exec(&txn)
        .await?;
    Company::delete_by_id(found.id).exec(&txn).await?;
    txn.commit().await?;

    for url in image_urls {
        if let Err(e) = state.storage.delete(&url).await {
            tracing::warn!(url, error = %e, "failed to delete company image from storage");
        }
    }

    Ok(StatusCode::NO_CONTENT)
}
