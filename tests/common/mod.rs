//! Test helpers and utilities for unit and integration testing.
//!
//! This module provides common utilities for setting up test environments,
//! creating mock data, and testing database operations.

#![allow(dead_code)]

use sea_orm::{ActiveModelTrait, Database, DatabaseConnection, Set};
use sea_orm_migration::MigratorTrait;

use passpad::migrations::Migrator;
use passpad::models::funding_pool::{Backers, PoolStatus, SaftFiles};
use passpad::models::user::{UserRole, WalletAddresses};
use passpad::models::{company, funding_pool, user};
use passpad::services::security::{create_access_token, hash_password};
use passpad::services::{EsignClient, KycClient, Mailer, StorageClient};
use passpad::state::AppState;

/// Create an in-memory SQLite database for testing
pub async fn create_test_db() -> DatabaseConnection {
    // Use simple in-memory SQLite - each connection gets its own database
    let db_url = "sqlite::memory:";

    let db = Database::connect(db_url)
        .await
        .expect("Failed to create test database");

    // Run migrations using the Migrator
    Migrator::up(&db, None)
        .await
        .expect("Failed to run test migrations");

    db
}

/// Application state over the given database. Provider clients point at an
/// unroutable address, so any test that accidentally reaches a provider
/// fails fast instead of calling out.
pub fn build_test_state(db: DatabaseConnection) -> AppState {
    AppState::new(
        db,
        EsignClient::new("http://127.0.0.1:1", "test-key"),
        KycClient::new("http://127.0.0.1:1", "test-key", "http://127.0.0.1:1/start"),
        StorageClient::new("http://127.0.0.1:1", "test-bucket"),
        Mailer::disabled(),
    )
}

/// Create a basic test user and return the user model
pub async fn create_test_user(
    db: &DatabaseConnection,
    email: &str,
    password: &str,
) -> user::Model {
    create_user_with_role(db, email, password, UserRole::Basic).await
}

/// Create an admin test user and return the user model
pub async fn create_test_admin(
    db: &DatabaseConnection,
    email: &str,
    password: &str,
) -> user::Model {
    create_user_with_role(db, email, password, UserRole::Admin).await
}

async fn create_user_with_role(
    db: &DatabaseConnection,
    email: &str,
    password: &str,
    role: UserRole,
) -> user::Model {
    let now = chrono::Utc::now();

    let new_user = user::ActiveModel {
        name: Set(Some("Test".to_string())),
        surname: Set(Some("User".to_string())),
        email: Set(email.to_string()),
        hashed_password: Set(hash_password(password).unwrap()),
        role: Set(role),
        wallet_addresses: Set(WalletAddresses::default()),
        kyc_passed: Set(false),
        referral_code: Set(format!("REF-{}", email)),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    new_user.insert(db).await.unwrap()
}

/// Bearer token for the given user
pub fn token_for(user: &user::Model) -> String {
    create_access_token(user).unwrap()
}

/// Create a test company and return the company model
pub async fn create_test_company(db: &DatabaseConnection, name: &str) -> company::Model {
    let new_company = company::ActiveModel {
        name: Set(name.to_string()),
        description: Set(Some(format!("{} does things", name))),
        category: Set(Some("DeFi".to_string())),
        website_url: Set(Some(format!("https://{}.example.com", name.to_lowercase()))),
        icon_url: Set(None),
        details: Set(Default::default()),
        funding_team: Set(Default::default()),
        social_media: Set(Default::default()),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    new_company.insert(db).await.unwrap()
}

/// Create a test funding pool and return the pool model
pub async fn create_test_pool(
    db: &DatabaseConnection,
    company_id: i64,
    slug: &str,
    status: PoolStatus,
    auction_start: i64,
    auction_end: i64,
    contract_address: Option<&str>,
) -> funding_pool::Model {
    let new_pool = funding_pool::ActiveModel {
        slug: Set(slug.to_string()),
        title: Set(format!("{} round", slug)),
        description: Set(Some("A test deal".to_string())),
        company_id: Set(company_id),
        status: Set(status),
        auction_start: Set(auction_start),
        auction_end: Set(auction_end),
        capacity: Set(100_000.0),
        min_amount: Set(100.0),
        max_amount: Set(10_000.0),
        price_per_token: Set(Some(0.05)),
        vesting: Set(Some("10% TGE, 6 months linear".to_string())),
        sale_type: Set(Some("NORMAL".to_string())),
        template_id: Set(None),
        wallet_address: Set(None),
        contract_address: Set(contract_address.map(|s| s.to_string())),
        referrer_fee: Set(None),
        backers: Set(Backers::default()),
        saft_files: Set(SaftFiles::default()),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    new_pool.insert(db).await.unwrap()
}

/// Epoch milliseconds for "now", shifted by the given number of hours.
pub fn hours_from_now(hours: i64) -> i64 {
    chrono::Utc::now().timestamp_millis() + hours * 60 * 60 * 1000
}
