//! Funding-pool eligibility rules and the investment lifecycle engine.
//!
//! A (user, pool) pair moves through: no slot -> pending signature (an
//! e-signature procedure produced a `(saftId, procedureId, signatureId)`
//! triple) -> pending payment (the investment is registered and a valid
//! SAFT slot is held) -> confirmed (the payment transaction hash is
//! recorded and the slot is invalidated). The administrative delete removes
//! the investment and pulls the slot and the backer entry from every pool
//! matching the compound condition.
//!
//! The pool row (its embedded `saft_files` and `backers` lists) is the
//! shared mutable resource across concurrent investors; writes are
//! last-write-wins. Each transition runs in a transaction so a single
//! request never tears the ledger and the pool apart.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, Set, TransactionTrait,
};
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::models::funding_pool::{PoolStatus, SaftFile};
use crate::models::prelude::*;
use crate::state::DbConn;

/// Current time as epoch milliseconds, the unit auction windows use.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// A pool accepts investments at `now` iff it is LIVE, the auction window
/// contains `now`, and the on-chain contract address has been set.
pub fn is_investable(pool: &funding_pool::Model, now: i64) -> bool {
    pool.status == PoolStatus::Live
        && pool.auction_start <= now
        && now <= pool.auction_end
        && pool
            .contract_address
            .as_deref()
            .is_some_and(|addr| !addr.is_empty())
}

/// Listing filter. The predicates are non-exclusive: a COMING SOON pool
/// whose auction start is already past still counts as upcoming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, utoipa::ToSchema)]
pub enum PoolFilter {
    #[default]
    #[serde(rename = "All")]
    All,
    #[serde(rename = "Finished Deals")]
    Finished,
    #[serde(rename = "Upcoming Deals")]
    Upcoming,
    #[serde(rename = "Live Deals")]
    Live,
}

impl PoolFilter {
    /// Pure form of the predicate, used by tests and in-memory checks.
    pub fn matches(&self, pool: &funding_pool::Model, now: i64) -> bool {
        match self {
            PoolFilter::All => pool.status != PoolStatus::Draft,
            PoolFilter::Finished => {
                pool.auction_end <= now
                    && pool.status != PoolStatus::ComingSoon
                    && pool.status != PoolStatus::Draft
            }
            PoolFilter::Upcoming => {
                (pool.auction_start >= now && pool.status != PoolStatus::Draft)
                    || pool.status == PoolStatus::ComingSoon
            }
            PoolFilter::Live => {
                pool.auction_end >= now
                    && pool.auction_start <= now
                    && pool.status == PoolStatus::Live
            }
        }
    }

    /// Same predicate as a query condition.
    pub fn condition(&self, now: i64) -> Condition {
        use funding_pool::Column;
        match self {
            PoolFilter::All => Condition::all().add(Column::Status.ne(PoolStatus::Draft)),
            PoolFilter::Finished => Condition::all()
                .add(Column::AuctionEnd.lte(now))
                .add(Column::Status.is_not_in([PoolStatus::ComingSoon, PoolStatus::Draft])),
            PoolFilter::Upcoming => Condition::any()
                .add(
                    Condition::all()
                        .add(Column::AuctionStart.gte(now))
                        .add(Column::Status.ne(PoolStatus::Draft)),
                )
                .add(Column::Status.eq(PoolStatus::ComingSoon)),
            PoolFilter::Live => Condition::all()
                .add(Column::AuctionEnd.gte(now))
                .add(Column::AuctionStart.lte(now))
                .add(Column::Status.eq(PoolStatus::Live)),
        }
    }
}

/// Featured-projects selector for the landing page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, utoipa::ToSchema)]
pub enum FeaturedKind {
    #[serde(rename = "Ongoing")]
    Ongoing,
    #[serde(rename = "Upcoming")]
    Upcoming,
    #[default]
    #[serde(rename = "All")]
    All,
}

impl FeaturedKind {
    pub fn condition(&self, now: i64) -> Condition {
        match self {
            FeaturedKind::Ongoing => PoolFilter::Live.condition(now),
            FeaturedKind::Upcoming => PoolFilter::Upcoming.condition(now),
            FeaturedKind::All => Condition::any()
                .add(PoolFilter::Live.condition(now))
                .add(PoolFilter::Upcoming.condition(now)),
        }
    }
}

/// First valid slot for the user, in list order. Logs when the
/// at-most-one-valid-slot invariant is found violated.
fn active_slot(pool: &funding_pool::Model, user_id: i64) -> Option<SaftFile> {
    let valid = pool.saft_files.valid_count_for(user_id);
    if valid > 1 {
        tracing::warn!(
            pool_id = pool.id,
            user_id,
            valid,
            "multiple valid SAFT slots for one user on one pool; using the first"
        );
    }
    pool.saft_files.active_slot(user_id).cloned()
}

pub struct RegisterInvestment {
    pub company_id: i64,
    pub funding_pool_id: i64,
    pub invested_amount: f64,
    pub saft_id: Option<String>,
    pub procedure_id: Option<String>,
    pub signature_id: Option<String>,
}

pub enum RegisterOutcome {
    /// A fresh investment was created and a SAFT slot appended.
    Created(investment::Model),
    /// The user already has an open investment for this company; returned
    /// as-is without touching the pool.
    Existing(investment::Model),
}

/// Register an investment intent against a funding pool.
///
/// Re-registering before confirmation is idempotent and returns the open
/// investment. A zero or negative amount is rejected before anything is
/// written.
pub async fn register_investment(
    db: &DbConn,
    user: &user::Model,
    req: RegisterInvestment,
) -> Result<RegisterOutcome> {
    let company = Company::find_by_id(req.company_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Company not found!".to_string()))?;

    let txn = db.begin().await?;

    let pool = FundingPool::find_by_id(req.funding_pool_id)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Funding pool not found!".to_string()))?;

    let slot = active_slot(&pool, user.id);

    // Backer registration is idempotent.
    let mut backers = pool.backers.clone();
    let is_new_backer = !backers.0.contains(&user.id);
    if is_new_backer {
        backers.0.push(user.id);
    }

    // An open (unconfirmed) investment against the active slot means the
    // caller retried before paying; hand the existing record back. When no
    // slot is held the key degrades to the empty sentinel, which matches
    // unsigned registrations.
    let slot_saft_id = slot.as_ref().map(|s| s.saft_id.clone()).unwrap_or_default();
    let existing = Investment::find()
        .filter(investment::Column::SuccessfullyCompleted.eq(false))
        .filter(investment::Column::CompanyId.eq(company.id))
        .filter(investment::Column::UserId.eq(user.id))
        .filter(investment::Column::SaftId.eq(slot_saft_id))
        .one(&txn)
        .await?;

    if let Some(inv) = existing {
        if is_new_backer {
            let mut pool_active: funding_pool::ActiveModel = pool.into();
            pool_active.backers = Set(backers);
            pool_active.update(&txn).await?;
        }
        txn.commit().await?;
        return Ok(RegisterOutcome::Existing(inv));
    }

    if req.invested_amount <= 0.0 {
        return Err(AppError::BadRequest("Amount is invalid!".to_string()));
    }

    // At most one valid slot per (pool, user): a leftover valid slot with no
    // open investment is a broken sequence, not a fresh registration.
    if slot.is_some() {
        tracing::warn!(
            pool_id = pool.id,
            user_id = user.id,
            "valid SAFT slot without an open investment; refusing a second allocation"
        );
        return Err(AppError::Conflict(
            "A valid SAFT already exists for this pool".to_string(),
        ));
    }

    let now = Utc::now();
    let investment = investment::ActiveModel {
        user_id: Set(user.id),
        funding_pool_id: Set(pool.id),
        company_id: Set(company.id),
        company_name: Set(company.name.clone()),
        company_image: Set(company.icon_url.clone()),
        amount_invested: Set(req.invested_amount),
        saft_id: Set(req.saft_id.clone().unwrap_or_default()),
        investment_date: Set(now),
        payment_date: Set(None),
        transaction_hash: Set(None),
        gas: Set(None),
        successfully_completed: Set(false),
        verified: Set(false),
        ..Default::default()
    };
    let investment = investment.insert(&txn).await?;

    let mut saft_files = pool.saft_files.clone();
    saft_files.0.push(SaftFile {
        saft_id: req.saft_id.unwrap_or_default(),
        procedure_id: req.procedure_id,
        signature_id: req.signature_id,
        owner_id: user.id,
        is_valid: true,
        created_at: now.timestamp_millis(),
    });

    let mut pool_active: funding_pool::ActiveModel = pool.into();
    pool_active.backers = Set(backers);
    pool_active.saft_files = Set(saft_files);
    pool_active.update(&txn).await?;

    txn.commit().await?;
    Ok(RegisterOutcome::Created(investment))
}

/// Confirm an open investment with its on-chain transaction hash and
/// invalidate the caller's active SAFT slot on the pool.
pub async fn confirm_investment(
    db: &DbConn,
    user: &user::Model,
    investment_id: i64,
    transaction_hash: &str,
) -> Result<investment::Model> {
    if transaction_hash.trim().is_empty() {
        return Err(AppError::BadRequest("Transaction failed!".to_string()));
    }

    let txn = db.begin().await?;

    let investment = Investment::find_by_id(investment_id)
        .filter(investment::Column::UserId.eq(user.id))
        .filter(investment::Column::SuccessfullyCompleted.eq(false))
        .one(&txn)
        .await?
        .ok_or_else(|| {
            AppError::Conflict(
                "Your investment has not been successfully completed before!".to_string(),
            )
        })?;

    let pool = FundingPool::find_by_id(investment.funding_pool_id)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Funding pool not found!".to_string()))?;

    let mut updated: investment::ActiveModel = investment.into();
    updated.successfully_completed = Set(true);
    updated.payment_date = Set(Some(Utc::now()));
    updated.transaction_hash = Set(Some(transaction_hash.to_string()));
    let investment = updated.update(&txn).await?;

    let mut saft_files = pool.saft_files.clone();
    match saft_files
        .0
        .iter_mut()
        .find(|f| f.owner_id == user.id && f.is_valid)
    {
        Some(slot) => slot.is_valid = false,
        None => {
            tracing::warn!(
                pool_id = pool.id,
                user_id = user.id,
                "confirmed investment had no valid SAFT slot to invalidate"
            );
        }
    }

    let mut pool_active: funding_pool::ActiveModel = pool.into();
    pool_active.saft_files = Set(saft_files);
    pool_active.update(&txn).await?;

    txn.commit().await?;
    Ok(investment)
}

pub struct DeleteReport {
    pub deleted_count: u64,
    pub modified_pools: u64,
}

/// Administrative deletion: remove the investment, then pull the SAFT
/// entries with `saft_id` and the user from `backers` across every pool
/// where both are present.
pub async fn delete_investment(
    db: &DbConn,
    investment_id: i64,
    user_id: i64,
    saft_id: &str,
) -> Result<DeleteReport> {
    let txn = db.begin().await?;

    let deleted = Investment::delete_by_id(investment_id).exec(&txn).await?;
    if deleted.rows_affected == 0 {
        return Err(AppError::NotFound("Investment not found!".to_string()));
    }

    // Bulk pull across all pools matching the compound condition. The JSON
    // lists live inside the row, so the scan and the rewrite happen here.
    let pools = FundingPool::find().all(&txn).await?;
    let mut modified_pools = 0;
    for pool in pools {
        let has_backer = pool.backers.0.contains(&user_id);
        let has_saft = pool.saft_files.0.iter().any(|f| f.saft_id == saft_id);
        if !has_backer || !has_saft {
            continue;
        }

        let mut backers = pool.backers.clone();
        backers.0.retain(|id| *id != user_id);
        let mut saft_files = pool.saft_files.clone();
        saft_files.0.retain(|f| f.saft_id != saft_id);

        let mut pool_active: funding_pool::ActiveModel = pool.into();
        pool_active.backers = Set(backers);
        pool_active.saft_files = Set(saft_files);
        pool_active.update(&txn).await?;
        modified_pools += 1;
    }

    txn.commit().await?;
    Ok(DeleteReport {
        deleted_count: deleted.rows_affected,
        modified_pools,
    })
}

pub struct ExistenceProbe {
    pub exists: bool,
    pub investment: Option<investment::Model>,
}

/// Read-only probe: does the caller hold an open investment for this
/// pool, keyed on their active slot?
pub async fn investment_exists(
    db: &DbConn,
    user: &user::Model,
    funding_pool_id: i64,
) -> Result<ExistenceProbe> {
    let pool = FundingPool::find_by_id(funding_pool_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Funding pool not found!".to_string()))?;

    let slot_saft_id = active_slot(&pool, user.id)
        .map(|s| s.saft_id)
        .unwrap_or_default();

    let investment = Investment::find()
        .filter(investment::Column::SuccessfullyCompleted.eq(false))
        .filter(investment::Column::CompanyId.eq(pool.company_id))
        .filter(investment::Column::UserId.eq(user.id))
        .filter(investment::Column::SaftId.eq(slot_saft_id))
        .one(db)
        .await?;

    Ok(ExistenceProbe {
        exists: investment.is_some(),
        investment,
    })
}
