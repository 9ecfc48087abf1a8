use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QuerySelect, Set,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::{AppError, Result};
use crate::middleware::{AuthenticatedUser, Pagination};
use crate::models::prelude::*;
use crate::models::{funding_pool, investment, user};
use crate::services::esign::Signer;
use crate::services::lifecycle::{self, RegisterInvestment, RegisterOutcome};
use crate::state::AppState;

pub fn public_routes(state: AppState) -> Router {
    Router::new()
        .route("/search", get(search_investments))
        .with_state(state)
}

pub fn protected_routes(state: AppState) -> Router {
    Router::new()
        .route("/verify", post(verify_signature))
        .route("/sign/{template_id}", post(sign_investment))
        .route("/company/{company_id}", post(register_investment))
        .route("/{id}/invest", put(make_investment))
        .route("/{id}/gas-price", put(update_gas))
        .route("/amount-summary/{slug}", get(amount_summary))
        .route("/exist", get(investment_exists))
        .route("/check/{company_id}", get(check_company_investment))
        .with_state(state)
}

pub fn admin_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(list_investments).delete(delete_investment))
        .with_state(state)
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterInvestmentRequest {
    pub funding_pool_id: Option<i64>,
    pub invested_amount: Option<f64>,
    pub saft_id: Option<String>,
    pub procedure_id: Option<String>,
    pub signature_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MakeInvestmentRequest {
    pub transaction_hash: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GasRequest {
    pub gas: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInvestmentRequest {
    pub amount_invested: f64,
    pub wallet: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifySignatureRequest {
    pub signature_id: String,
    pub code: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExistQuery {
    pub funding_pool_id: i64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentSearchQuery {
    pub company_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteInvestmentQuery {
    pub id: i64,
    pub user_id: i64,
    pub saft_id: String,
}

/// One ledger row with the investor attached.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentWithUser {
    #[serde(flatten)]
    pub investment: investment::Model,
    pub user: Option<user::Model>,
}

fn with_user(rows: Vec<(investment::Model, Option<user::Model>)>) -> Vec<InvestmentWithUser> {
    rows.into_iter()
        .map(|(investment, user)| InvestmentWithUser { investment, user })
        .collect()
}

// ============================================================================
// Investment Lifecycle
// ============================================================================

/// Register the caller's investment intent against a pool of the company.
/// Retrying before payment returns the open investment instead of a new one.
async fn register_investment(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(company_id): Path<i64>,
    Json(req): Json<RegisterInvestmentRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>)> {
    let Some(funding_pool_id) = req.funding_pool_id else {
        return Err(AppError::BadRequest(
            "Submit all required parameters".to_string(),
        ));
    };

    let outcome = lifecycle::register_investment(
        &state.db,
        &auth_user.0,
        RegisterInvestment {
            company_id,
            funding_pool_id,
            invested_amount: req.invested_amount.unwrap_or_default(),
            saft_id: req.saft_id,
            procedure_id: req.procedure_id,
            signature_id: req.signature_id,
        },
    )
    .await?;

    match outcome {
        RegisterOutcome::Created(inv) => {
            Ok((StatusCode::CREATED, Json(json!({ "data": inv }))))
        }
        RegisterOutcome::Existing(inv) => Ok((StatusCode::OK, Json(json!({ "data": inv })))),
    }
}

/// Confirm the on-chain payment for an open investment.
async fn make_investment(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(id): Path<i64>,
    Json(req): Json<MakeInvestmentRequest>,
) -> Result<Json<serde_json::Value>> {
    let investment = lifecycle::confirm_investment(
        &state.db,
        &auth_user.0,
        id,
        req.transaction_hash.as_deref().unwrap_or_default(),
    )
    .await?;

    Ok(Json(json!({ "data": investment })))
}

/// Record the gas spent on the payment transaction.
async fn update_gas(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(id): Path<i64>,
    Json(req): Json<GasRequest>,
) -> Result<Json<serde_json::Value>> {
    let found = Investment::find_by_id(id)
        .filter(investment::Column::UserId.eq(auth_user.0.id))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Investment not found!".to_string()))?;

    let mut active: investment::ActiveModel = found.into();
    active.gas = Set(Some(req.gas));
    let updated = active.update(&state.db).await?;

    Ok(Json(json!({ "data": updated })))
}

/// Does the caller hold an open investment for this pool?
async fn investment_exists(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Query(q): Query<ExistQuery>,
) -> Result<Json<serde_json::Value>> {
    let probe = lifecycle::investment_exists(&state.db, &auth_user.0, q.funding_pool_id).await?;

    Ok(Json(json!({
        "exists": probe.exists,
        "data": probe.investment,
    })))
}

/// 204 when the caller has ever invested in the company, 404 otherwise.
async fn check_company_investment(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(company_id): Path<i64>,
) -> Result<StatusCode> {
    let found = Investment::find()
        .filter(investment::Column::UserId.eq(auth_user.0.id))
        .filter(investment::Column::CompanyId.eq(company_id))
        .one(&state.db)
        .await?;

    if found.is_none() {
        return Err(AppError::NotFound("Investment not found!".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Total the caller has put into a deal, across all of their investments.
async fn amount_summary(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(slug): Path<String>,
) -> Result<Json<serde_json::Value>> {
    let pool = FundingPool::find()
        .filter(funding_pool::Column::Slug.eq(&slug))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("FundingPool does not exist!".to_string()))?;

    let amount: f64 = Investment::find()
        .filter(investment::Column::UserId.eq(auth_user.0.id))
        .filter(investment::Column::FundingPoolId.eq(pool.id))
        .all(&state.db)
        .await?
        .iter()
        .map(|inv| inv.amount_invested)
        .sum();

    Ok(Json(json!({ "amount": amount })))
}

// ============================================================================
// SAFT Signing
// ============================================================================

/// Run the e-signature flow for the caller: fill the SAFT template, open a
/// procedure, attach the document, add the caller as signer and start it.
/// The returned triple is what investment registration persists.
async fn sign_investment(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(template_id): Path<String>,
    Json(req): Json<SignInvestmentRequest>,
) -> Result<Json<serde_json::Value>> {
    let user = &auth_user.0;
    let first_name = user.name.clone().unwrap_or_else(|| "name".to_string());
    let last_name = user.surname.clone().unwrap_or_else(|| "surname".to_string());

    let fill_payload = json!({
        "title": user.id.to_string(),
        "data": {
            "name": { "firstName": first_name, "lastName": last_name },
            "email": user.email,
            "dateOfSignature": "",
            "amountInvested": req.amount_invested.to_string(),
            "walletOfInvestment": req.wallet,
            "nationality": user.nationality,
            "id": user.id.to_string(),
        },
    });
    let filled_pdf = state.esign.fill_document(&template_id, &fill_payload).await?;

    let procedure_id = state
        .esign
        .create_procedure(&user.id.to_string(), "SAFT signature")
        .await?;
    let file_id = state
        .esign
        .add_file("saft.pdf", &filled_pdf, &procedure_id)
        .await?;

    let signer = Signer {
        first_name,
        last_name,
        email: user.email.clone(),
        phone: None,
    };
    let signature_id = state
        .esign
        .add_signer(&procedure_id, &file_id, &signer)
        .await?;
    state.esign.start_procedure(&procedure_id).await?;

    Ok(Json(json!({
        "data": {
            "signatureId": signature_id,
            "procedureId": procedure_id,
            "file": filled_pdf,
            "fileId": file_id,
        },
    })))
}

/// Check the email code the signer typed against the provider.
async fn verify_signature(
    State(state): State<AppState>,
    Extension(_auth_user): Extension<AuthenticatedUser>,
    Json(req): Json<VerifySignatureRequest>,
) -> Result<Json<serde_json::Value>> {
    state.esign.verify_code(&req.signature_id, &req.code).await?;

    Ok(Json(json!({ "message": "Code verified" })))
}

// ============================================================================
// Search & Administration
// ============================================================================

/// Case-insensitive substring search on the invested company's name, with
/// the investor attached.
async fn search_investments(
    State(state): State<AppState>,
    Query(q): Query<InvestmentSearchQuery>,
    pagination: Pagination,
) -> Result<Json<serde_json::Value>> {
    let mut query = Investment::find();

    if let Some(name) = q.company_name.as_deref().filter(|n| !n.is_empty()) {
        query = query.filter(
            Expr::expr(Func::lower(Expr::col((
                investment::Entity,
                investment::Column::CompanyName,
            ))))
            .like(format!("%{}%", name.to_lowercase())),
        );
    }

    let count = query.clone().count(&state.db).await?;
    let rows = query
        .find_also_related(User)
        .offset(pagination.start_index)
        .limit(pagination.sql_limit())
        .all(&state.db)
        .await?;

    Ok(Json(json!({ "data": with_user(rows), "count": count })))
}

async fn list_investments(
    State(state): State<AppState>,
    pagination: Pagination,
) -> Result<Json<serde_json::Value>> {
    let count = Investment::find().count(&state.db).await?;
    let rows = Investment::find()
        .find_also_related(User)
        .offset(pagination.start_index)
        .limit(pagination.sql_limit())
        .all(&state.db)
        .await?;

    Ok(Json(json!({ "data": with_user(rows), "count": count })))
}

/// Remove an investment and pull its SAFT slot and backer entry from every
/// pool carrying both.
async fn delete_investment(
    State(state): State<AppState>,
    Query(q): Query<DeleteInvestmentQuery>,
) -> Result<Json<serde_json::Value>> {
    let report = lifecycle::delete_investment(&state.db, q.id, q.user_id, &q.saft_id).await?;

    Ok(Json(json!({
        "deletedCount": report.deleted_count,
        "modifiedPools": report.modified_pools,
    })))
}
