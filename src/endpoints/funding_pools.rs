use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use chrono::Utc;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeSet;

use crate::error::{AppError, Result};
use crate::middleware::Pagination;
use crate::models::funding_pool::{Backers, PoolStatus, SaftFiles};
use crate::models::prelude::*;
use crate::models::{company, funding_pool};
use crate::services::lifecycle::{self, FeaturedKind, PoolFilter};
use crate::state::{AppState, DbConn};

pub fn public_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(list_pools))
        .route("/featured/projects", get(featured_projects))
        .route("/search", get(search_pools))
        .route("/company/{company_id}", get(company_pools))
        .route("/past-deals/companies", get(past_deal_companies))
        .route("/{slug}", get(get_pool_by_slug))
        .with_state(state)
}

/// Pool management. The position-1 wildcard routes take the numeric pool id.
pub fn admin_routes(state: AppState) -> Router {
    Router::new()
        .route("/", post(create_pool))
        .route("/{slug}", put(update_pool).delete(delete_pool))
        .route("/{slug}/fundraising-contract", post(add_fundraising_contract))
        .route("/{slug}/safts", get(list_pool_safts))
        .with_state(state)
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
pub struct PoolListQuery {
    pub filter: Option<PoolFilter>,
}

#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
pub struct FeaturedQuery {
    pub filter: Option<FeaturedKind>,
    pub limit: Option<u64>,
}

#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
pub struct PoolSearchQuery {
    pub slug: Option<String>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePoolRequest {
    pub slug: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub company_id: Option<i64>,
    pub status: Option<PoolStatus>,
    pub auction_start: Option<i64>,
    pub auction_end: Option<i64>,
    pub capacity: Option<f64>,
    pub min_amount: Option<f64>,
    pub max_amount: Option<f64>,
    pub price_per_token: Option<f64>,
    pub vesting: Option<String>,
    pub sale_type: Option<String>,
    pub template_id: Option<String>,
    pub wallet_address: Option<String>,
    pub referrer_fee: Option<f64>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePoolRequest {
    pub slug: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<PoolStatus>,
    pub auction_start: Option<i64>,
    pub auction_end: Option<i64>,
    pub capacity: Option<f64>,
    pub min_amount: Option<f64>,
    pub max_amount: Option<f64>,
    pub price_per_token: Option<f64>,
    pub vesting: Option<String>,
    pub sale_type: Option<String>,
    pub template_id: Option<String>,
    pub wallet_address: Option<String>,
    pub referrer_fee: Option<f64>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FundraisingContractRequest {
    pub contract_address: String,
}

/// A deal with its company attached.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PoolWithCompany {
    #[serde(flatten)]
    pub funding_pool: funding_pool::Model,
    pub company: Option<company::Model>,
}

/// Summary card for a company whose auctions have all run their course.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PastDealCompany {
    pub id: i64,
    pub name: String,
    pub icon_url: Option<String>,
}

fn with_company(rows: Vec<(funding_pool::Model, Option<company::Model>)>) -> Vec<PoolWithCompany> {
    rows.into_iter()
        .map(|(funding_pool, company)| PoolWithCompany {
            funding_pool,
            company,
        })
        .collect()
}

// ============================================================================
// Listings
// ============================================================================

/// Browse the deals, newest first. Without a filter every pool is returned,
/// drafts included; the named filters are the storefront views.
#[utoipa::path(
    get,
    path = "/v1/funding-pools",
    tag = "FundingPools",
    params(
        ("filter" = Option<String>, Query, description = "All, Finished Deals, Upcoming Deals or Live Deals"),
        ("limit" = Option<u64>, Query, description = "Page size, 0 for all"),
        ("startIndex" = Option<u64>, Query, description = "Rows to skip"),
    ),
    responses(
        (status = 200, body = serde_json::Value)
    )
)]
async fn list_pools(
    State(state): State<AppState>,
    Query(q): Query<PoolListQuery>,
    pagination: Pagination,
) -> Result<Json<serde_json::Value>> {
    let now = lifecycle::now_millis();

    let mut query = FundingPool::find();
    if let Some(filter) = q.filter {
        query = query.filter(filter.condition(now));
    }

    let count = query.clone().count(&state.db).await?;
    let rows = query
        .order_by_desc(funding_pool::Column::CreatedAt)
        .find_also_related(Company)
        .offset(pagination.start_index)
        .limit(pagination.sql_limit())
        .all(&state.db)
        .await?;

    Ok(Json(json!({ "data": with_company(rows), "count": count })))
}

async fn featured_page(
    db: &DbConn,
    condition: Condition,
    limit: Option<u64>,
) -> Result<(Vec<PoolWithCompany>, u64)> {
    let query = FundingPool::find().filter(condition);
    let count = query.clone().count(db).await?;
    let rows = query.find_also_related(Company).limit(limit).all(db).await?;
    Ok((with_company(rows), count))
}

/// Landing-page carousel. `All` answers with the ongoing and upcoming
/// sets side by side so the page renders both rows from a single call.
#[utoipa::path(
    get,
    path = "/v1/funding-pools/featured/projects",
    tag = "FundingPools",
    params(
        ("filter" = Option<String>, Query, description = "Ongoing, Upcoming or All"),
        ("limit" = Option<u64>, Query, description = "Cap per list"),
    ),
    responses(
        (status = 200, body = serde_json::Value)
    )
)]
async fn featured_projects(
    State(state): State<AppState>,
    Query(q): Query<FeaturedQuery>,
) -> Result<Json<serde_json::Value>> {
    let now = lifecycle::now_millis();

    match q.filter.unwrap_or_default() {
        FeaturedKind::All => {
            let (ongoing, ongoing_count) =
                featured_page(&state.db, PoolFilter::Live.condition(now), q.limit).await?;
            let (upcoming, upcoming_count) =
                featured_page(&state.db, PoolFilter::Upcoming.condition(now), q.limit).await?;

            Ok(Json(json!({
                "data": { "ongoing": ongoing, "upcoming": upcoming },
                "ongoingCount": ongoing_count,
                "upcomingCount": upcoming_count,
            })))
        }
        kind => {
            let (data, count) = featured_page(&state.db, kind.condition(now), q.limit).await?;
            Ok(Json(json!({ "data": data, "count": count })))
        }
    }
}

/// Case-insensitive substring search on the slug.
#[utoipa::path(
    get,
    path = "/v1/funding-pools/search",
    tag = "FundingPools",
    params(
        ("slug" = Option<String>, Query, description = "Slug fragment to match"),
    ),
    responses(
        (status = 200, body = serde_json::Value)
    )
)]
async fn search_pools(
    State(state): State<AppState>,
    Query(q): Query<PoolSearchQuery>,
    pagination: Pagination,
) -> Result<Json<serde_json::Value>> {
    let mut query = FundingPool::find();

    if let Some(slug) = q.slug.as_deref().filter(|s| !s.is_empty()) {
        query = query.filter(
            Expr::expr(Func::lower(Expr::col((
                funding_pool::Entity,
                funding_pool::Column::Slug,
            ))))
            .like(format!("%{}%", slug.to_lowercase())),
        );
    }

    let count = query.clone().count(&state.db).await?;
    let data = query
        .offset(pagination.start_index)
        .limit(pagination.sql_limit())
        .all(&state.db)
        .await?;

    Ok(Json(json!({ "data": data, "count": count })))
}

#[utoipa::path(
    get,
    path = "/v1/funding-pools/company/{company_id}",
    tag = "FundingPools",
    params(
        ("company_id" = i64, Path, description = "Company id"),
    ),
    responses(
        (status = 200, body = serde_json::Value)
    )
)]
async fn company_pools(
    State(state): State<AppState>,
    Path(company_id): Path<i64>,
    pagination: Pagination,
) -> Result<Json<serde_json::Value>> {
    let query = FundingPool::find().filter(funding_pool::Column::CompanyId.eq(company_id));

    let count = query.clone().count(&state.db).await?;
    let rows = query
        .order_by_desc(funding_pool::Column::CreatedAt)
        .find_also_related(Company)
        .offset(pagination.start_index)
        .limit(pagination.sql_limit())
        .all(&state.db)
        .await?;

    Ok(Json(json!({ "data": with_company(rows), "count": count })))
}

/// Companies whose auctions have all ended, shown as the track record.
#[utoipa::path(
    get,
    path = "/v1/funding-pools/past-deals/companies",
    tag = "FundingPools",
    responses(
        (status = 200, body = serde_json::Value),
        (status = 404, description = "No auction has ended yet")
    )
)]
async fn past_deal_companies(State(state): State<AppState>) -> Result<Json<serde_json::Value>> {
    let now = lifecycle::now_millis();

    let pools = FundingPool::find()
        .filter(funding_pool::Column::AuctionEnd.lte(now))
        .all(&state.db)
        .await?;

    let company_ids: BTreeSet<i64> = pools.iter().map(|p| p.company_id).collect();
    if company_ids.is_empty() {
        return Err(AppError::NotFound("pastDeals not found".to_string()));
    }

    let companies = Company::find()
        .filter(company::Column::Id.is_in(company_ids))
        .all(&state.db)
        .await?;

    let data: Vec<PastDealCompany> = companies
        .into_iter()
        .map(|c| PastDealCompany {
            id: c.id,
            name: c.name,
            icon_url: c.icon_url,
        })
        .collect();

    Ok(Json(json!({ "data": data })))
}

/// Deal detail page. `canInvest` tells the client whether to render the
/// invest button without re-deriving the window rules.
#[utoipa::path(
    get,
    path = "/v1/funding-pools/{slug}",
    tag = "FundingPools",
    params(
        ("slug" = String, Path, description = "Pool slug"),
    ),
    responses(
        (status = 200, body = serde_json::Value),
        (status = 404, description = "Unknown slug")
    )
)]
async fn get_pool_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<serde_json::Value>> {
    let row = FundingPool::find()
        .filter(funding_pool::Column::Slug.eq(&slug))
        .find_also_related(Company)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("FundingPool does not exist!".to_string()))?;

    let can_invest = lifecycle::is_investable(&row.0, lifecycle::now_millis());
    let (funding_pool, company) = row;

    Ok(Json(json!({
        "data": PoolWithCompany { funding_pool, company },
        "canInvest": can_invest,
    })))
}

// ============================================================================
// Administration
// ============================================================================

#[utoipa::path(
    post,
    path = "/v1/funding-pools",
    tag = "FundingPools",
    request_body = CreatePoolRequest,
    responses(
        (status = 201, body = serde_json::Value),
        (status = 409, description = "Slug already taken")
    )
)]
async fn create_pool(
    State(state): State<AppState>,
    Json(req): Json<CreatePoolRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>)> {
    let (Some(slug), Some(title), Some(company_id)) =
        (req.slug.clone(), req.title.clone(), req.company_id)
    else {
        return Err(AppError::BadRequest(
            "Submit all required parameters".to_string(),
        ));
    };
    let slug = slug.trim().to_lowercase();
    if slug.is_empty() {
        return Err(AppError::BadRequest(
            "Submit all required parameters".to_string(),
        ));
    }

    let company = Company::find_by_id(company_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Company does not exist!".to_string()))?;

    let duplicate = FundingPool::find()
        .filter(funding_pool::Column::Slug.eq(&slug))
        .one(&state.db)
        .await?;
    if duplicate.is_some() {
        return Err(AppError::Conflict(format!(
            "FundingPool with {} slug already exists",
            slug
        )));
    }

    let new_pool = funding_pool::ActiveModel {
        slug: Set(slug),
        title: Set(title),
        description: Set(req.description),
        company_id: Set(company.id),
        status: Set(req.status.unwrap_or(PoolStatus::Draft)),
        auction_start: Set(req.auction_start.unwrap_or_else(lifecycle::now_millis)),
        auction_end: Set(req.auction_end.unwrap_or_default()),
        capacity: Set(req.capacity.unwrap_or_default()),
        min_amount: Set(req.min_amount.unwrap_or_default()),
        max_amount: Set(req.max_amount.unwrap_or_default()),
        price_per_token: Set(req.price_per_token),
        vesting: Set(req.vesting),
        sale_type: Set(req.sale_type),
        template_id: Set(req.template_id),
        wallet_address: Set(req.wallet_address),
        contract_address: Set(None),
        referrer_fee: Set(req.referrer_fee),
        backers: Set(Backers::default()),
        saft_files: Set(SaftFiles::default()),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    let created = new_pool.insert(&state.db).await?;

    Ok((StatusCode::CREATED, Json(json!({ "data": created }))))
}

#[utoipa::path(
    put,
    path = "/v1/funding-pools/{id}",
    tag = "FundingPools",
    params(
        ("id" = i64, Path, description = "Pool id"),
    ),
    request_body = UpdatePoolRequest,
    responses(
        (status = 200, body = serde_json::Value),
        (status = 404, description = "Unknown pool")
    )
)]
async fn update_pool(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdatePoolRequest>,
) -> Result<Json<serde_json::Value>> {
    let found = FundingPool::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("FundingPools does not exist!".to_string()))?;

    let mut active: funding_pool::ActiveModel = found.into();
    if let Some(slug) = req.slug {
        active.slug = Set(slug.trim().to_lowercase());
    }
    if let Some(title) = req.title {
        active.title = Set(title);
    }
    if req.description.is_some() {
        active.description = Set(req.description);
    }
    if let Some(status) = req.status {
        active.status = Set(status);
    }
    if let Some(start) = req.auction_start {
        active.auction_start = Set(start);
    }
    if let Some(end) = req.auction_end {
        active.auction_end = Set(end);
    }
    if let Some(capacity) = req.capacity {
        active.capacity = Set(capacity);
    }
    if let Some(min) = req.min_amount {
        active.min_amount = Set(min);
    }
    if let Some(max) = req.max_amount {
        active.max_amount = Set(max);
    }
    if req.price_per_token.is_some() {
        active.price_per_token = Set(req.price_per_token);
    }
    if req.vesting.is_some() {
        active.vesting = Set(req.vesting);
    }
    if req.sale_type.is_some() {
        active.sale_type = Set(req.sale_type);
    }
    if req.template_id.is_some() {
        active.template_id = Set(req.template_id);
    }
    if req.wallet_address.is_some() {
        active.wallet_address = Set(req.wallet_address);
    }
    if req.referrer_fee.is_some() {
        active.referrer_fee = Set(req.referrer_fee);
    }
    let updated = active.update(&state.db).await?;

    Ok(Json(json!({ "data": updated })))
}

/// Record the deployed fundraising contract. Going LIVE stays a separate,
/// deliberate status update.
#[utoipa::path(
    post,
    path = "/v1/funding-pools/{id}/fundraising-contract",
    tag = "FundingPools",
    params(
        ("id" = i64, Path, description = "Pool id"),
    ),
    request_body = FundraisingContractRequest,
    responses(
        (status = 200, body = serde_json::Value),
        (status = 404, description = "Unknown pool")
    )
)]
async fn add_fundraising_contract(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<FundraisingContractRequest>,
) -> Result<Json<serde_json::Value>> {
    let found = FundingPool::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("FundingPools does not exist!".to_string()))?;

    let mut active: funding_pool::ActiveModel = found.into();
    active.contract_address = Set(Some(req.contract_address));
    let updated = active.update(&state.db).await?;

    Ok(Json(json!({ "data": updated })))
}

#[utoipa::path(
    delete,
    path = "/v1/funding-pools/{id}",
    tag = "FundingPools",
    params(
        ("id" = i64, Path, description = "Pool id"),
    ),
    responses(
        (status = 204, description = "Pool deleted"),
        (status = 404, description = "Unknown pool")
    )
)]
async fn delete_pool(State(state): State<AppState>, Path(id): Path<i64>) -> Result<StatusCode> {
    let deleted = FundingPool::delete_by_id(id).exec(&state.db).await?;
    if deleted.rows_affected == 0 {
        return Err(AppError::NotFound(
            "FundingPools does not exist!".to_string(),
        ));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Download every signed SAFT registered on the pool, as base64 PDFs.
/// Slots registered without a document are skipped.
#[utoipa::path(
    get,
    path = "/v1/funding-pools/{id}/safts",
    tag = "FundingPools",
    params(
        ("id" = i64, Path, description = "Pool id"),
    ),
    responses(
        (status = 200, body = serde_json::Value),
        (status = 404, description = "Unknown pool or missing document")
    )
)]
async fn list_pool_safts(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>> {
    let pool = FundingPool::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("FundingPools does not exist!".to_string()))?;

    let mut saft_pdfs: Vec<String> = Vec::new();
    for file in pool.saft_files.0.iter().filter(|f| !f.saft_id.is_empty()) {
        let pdf = state.esign.download_document(&file.saft_id).await?;
        if pdf.is_empty() {
            return Err(AppError::NotFound(
                "No Saft pdf found for this investment".to_string(),
            ));
        }
        saft_pdfs.push(pdf);
    }

    Ok(Json(json!({ "data": saft_pdfs })))
}
