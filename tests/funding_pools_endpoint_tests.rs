//! Funding-pool endpoint integration tests
//!
//! Covers:
//! - `GET /v1/funding-pools` — storefront filters
//! - `GET /v1/funding-pools/featured/projects`
//! - `GET /v1/funding-pools/search` / `GET /v1/funding-pools/company/{id}`
//! - `GET /v1/funding-pools/past-deals/companies`
//! - `GET /v1/funding-pools/{slug}` — detail page with `canInvest`
//! - `POST|PUT|DELETE /v1/funding-pools` — admin management
//! - `POST /v1/funding-pools/{id}/fundraising-contract`

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use tower::util::ServiceExt;

mod common;
use common::{
    build_test_state, create_test_admin, create_test_company, create_test_db, create_test_pool,
    create_test_user, hours_from_now, token_for,
};

use passpad::endpoints::create_router;
use passpad::models::funding_pool::PoolStatus;

// ============================================================================
// Helpers
// ============================================================================

async fn send(
    app: axum::Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().uri(uri).method(method);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }

    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}

fn slugs(body: &serde_json::Value) -> Vec<String> {
    body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["slug"].as_str().unwrap().to_string())
        .collect()
}

/// One company with a pool in each lifecycle stage.
async fn seed_storefront(db: &sea_orm::DatabaseConnection) -> i64 {
    let company = create_test_company(db, "Acme").await;
    create_test_pool(
        db,
        company.id,
        "draft-deal",
        PoolStatus::Draft,
        hours_from_now(-2),
        hours_from_now(2),
        None,
    )
    .await;
    create_test_pool(
        db,
        company.id,
        "live-deal",
        PoolStatus::Live,
        hours_from_now(-1),
        hours_from_now(24),
        Some("0xlive"),
    )
    .await;
    create_test_pool(
        db,
        company.id,
        "upcoming-deal",
        PoolStatus::Live,
        hours_from_now(5),
        hours_from_now(48),
        None,
    )
    .await;
    create_test_pool(
        db,
        company.id,
        "announced-deal",
        PoolStatus::ComingSoon,
        hours_from_now(-10),
        hours_from_now(10),
        None,
    )
    .await;
    create_test_pool(
        db,
        company.id,
        "finished-deal",
        PoolStatus::Live,
        hours_from_now(-48),
        hours_from_now(-24),
        Some("0xdone"),
    )
    .await;
    company.id
}

// ============================================================================
// Storefront listing
// ============================================================================

#[tokio::test]
async fn test_unfiltered_list_includes_drafts() {
    let db = create_test_db().await;
    seed_storefront(&db).await;
    let app = create_router(build_test_state(db));

    let (status, body) = send(app, "GET", "/v1/funding-pools", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 5);
    assert!(slugs(&body).contains(&"draft-deal".to_string()));
    assert!(
        body["data"][0]["company"]["name"] == "Acme",
        "listing rows carry the company"
    );
}

#[tokio::test]
async fn test_all_filter_hides_drafts() {
    let db = create_test_db().await;
    seed_storefront(&db).await;
    let app = create_router(build_test_state(db));

    let (status, body) = send(app, "GET", "/v1/funding-pools?filter=All", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 4);
    assert!(!slugs(&body).contains(&"draft-deal".to_string()));
}

#[tokio::test]
async fn test_live_filter_selects_open_windows() {
    let db = create_test_db().await;
    seed_storefront(&db).await;
    let app = create_router(build_test_state(db));

    let (_, body) = send(
        app,
        "GET",
        "/v1/funding-pools?filter=Live%20Deals",
        None,
        None,
    )
    .await;

    assert_eq!(slugs(&body), vec!["live-deal"]);
}

#[tokio::test]
async fn test_upcoming_filter_includes_announced_with_past_start() {
    let db = create_test_db().await;
    seed_storefront(&db).await;
    let app = create_router(build_test_state(db));

    let (_, body) = send(
        app,
        "GET",
        "/v1/funding-pools?filter=Upcoming%20Deals",
        None,
        None,
    )
    .await;

    let found = slugs(&body);
    assert!(found.contains(&"upcoming-deal".to_string()));
    assert!(
        found.contains(&"announced-deal".to_string()),
        "COMING SOON stays upcoming even after its start date"
    );
    assert!(!found.contains(&"live-deal".to_string()));
}

#[tokio::test]
async fn test_finished_filter_excludes_announced() {
    let db = create_test_db().await;
    seed_storefront(&db).await;
    let app = create_router(build_test_state(db));

    let (_, body) = send(
        app,
        "GET",
        "/v1/funding-pools?filter=Finished%20Deals",
        None,
        None,
    )
    .await;

    assert_eq!(slugs(&body), vec!["finished-deal"]);
}

#[tokio::test]
async fn test_unknown_filter_is_rejected() {
    let db = create_test_db().await;
    let app = create_router(build_test_state(db));

    let (status, _) = send(app, "GET", "/v1/funding-pools?filter=Bogus", None, None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ============================================================================
// Featured projects
// ============================================================================

#[tokio::test]
async fn test_featured_all_returns_both_rows() {
    let db = create_test_db().await;
    seed_storefront(&db).await;
    let app = create_router(build_test_state(db));

    let (status, body) = send(
        app,
        "GET",
        "/v1/funding-pools/featured/projects?filter=All",
        None,
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ongoingCount"], 1);
    assert_eq!(body["upcomingCount"], 2);
    assert_eq!(body["data"]["ongoing"][0]["slug"], "live-deal");
    assert_eq!(body["data"]["upcoming"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_featured_defaults_to_all() {
    let db = create_test_db().await;
    seed_storefront(&db).await;
    let app = create_router(build_test_state(db));

    let (status, body) = send(
        app,
        "GET",
        "/v1/funding-pools/featured/projects",
        None,
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["ongoing"].is_array());
    assert!(body["data"]["upcoming"].is_array());
}

#[tokio::test]
async fn test_featured_ongoing_with_limit() {
    let db = create_test_db().await;
    let company_id = seed_storefront(&db).await;
    create_test_pool(
        &db,
        company_id,
        "second-live",
        PoolStatus::Live,
        hours_from_now(-3),
        hours_from_now(3),
        Some("0xlive2"),
    )
    .await;
    let app = create_router(build_test_state(db));

    let (status, body) = send(
        app,
        "GET",
        "/v1/funding-pools/featured/projects?filter=Ongoing&limit=1",
        None,
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2, "count ignores the page limit");
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

// ============================================================================
// Search & company listing
// ============================================================================

#[tokio::test]
async fn test_search_by_slug_fragment() {
    let db = create_test_db().await;
    seed_storefront(&db).await;
    let app = create_router(build_test_state(db));

    let (status, body) = send(
        app,
        "GET",
        "/v1/funding-pools/search?slug=LIVE",
        None,
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["slug"], "live-deal");
}

#[tokio::test]
async fn test_company_pools_listing() {
    let db = create_test_db().await;
    let company_id = seed_storefront(&db).await;
    let other = create_test_company(&db, "Globex").await;
    create_test_pool(
        &db,
        other.id,
        "globex-deal",
        PoolStatus::Live,
        hours_from_now(-1),
        hours_from_now(1),
        None,
    )
    .await;
    let app = create_router(build_test_state(db));

    let (status, body) = send(
        app,
        "GET",
        &format!("/v1/funding-pools/company/{}", company_id),
        None,
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 5);
    assert!(!slugs(&body).contains(&"globex-deal".to_string()));
}

// ============================================================================
// Past deals
// ============================================================================

#[tokio::test]
async fn test_past_deals_empty_is_not_found() {
    let db = create_test_db().await;
    let company = create_test_company(&db, "Acme").await;
    create_test_pool(
        &db,
        company.id,
        "still-running",
        PoolStatus::Live,
        hours_from_now(-1),
        hours_from_now(1),
        None,
    )
    .await;
    let app = create_router(build_test_state(db));

    let (status, body) = send(
        app,
        "GET",
        "/v1/funding-pools/past-deals/companies",
        None,
        None,
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "pastDeals not found");
}

#[tokio::test]
async fn test_past_deals_lists_each_company_once() {
    let db = create_test_db().await;
    let company = create_test_company(&db, "Acme").await;
    for slug in ["ended-one", "ended-two"] {
        create_test_pool(
            &db,
            company.id,
            slug,
            PoolStatus::Live,
            hours_from_now(-48),
            hours_from_now(-24),
            None,
        )
        .await;
    }
    let app = create_router(build_test_state(db));

    let (status, body) = send(
        app,
        "GET",
        "/v1/funding-pools/past-deals/companies",
        None,
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 1, "two ended pools, one company card");
    assert_eq!(data[0]["name"], "Acme");
    assert!(data[0].get("iconUrl").is_some());
}

// ============================================================================
// Detail page
// ============================================================================

#[tokio::test]
async fn test_pool_by_slug_reports_investable() {
    let db = create_test_db().await;
    seed_storefront(&db).await;
    let app = create_router(build_test_state(db));

    let (status, body) = send(app, "GET", "/v1/funding-pools/live-deal", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["canInvest"], true);
    assert_eq!(body["data"]["slug"], "live-deal");
    assert_eq!(body["data"]["company"]["name"], "Acme");
}

#[tokio::test]
async fn test_pool_by_slug_not_investable_cases() {
    let db = create_test_db().await;
    seed_storefront(&db).await;
    let app = create_router(build_test_state(db));

    // Open window but DRAFT status.
    let (_, body) = send(
        app.clone(),
        "GET",
        "/v1/funding-pools/draft-deal",
        None,
        None,
    )
    .await;
    assert_eq!(body["canInvest"], false);

    // LIVE status but the window has not opened and no contract is set.
    let (_, body) = send(app, "GET", "/v1/funding-pools/upcoming-deal", None, None).await;
    assert_eq!(body["canInvest"], false);
}

#[tokio::test]
async fn test_pool_by_unknown_slug() {
    let db = create_test_db().await;
    let app = create_router(build_test_state(db));

    let (status, body) = send(app, "GET", "/v1/funding-pools/nope", None, None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "FundingPool does not exist!");
}

// ============================================================================
// Administration
// ============================================================================

#[tokio::test]
async fn test_create_pool_requires_admin() {
    let db = create_test_db().await;
    let basic = create_test_user(&db, "basic@example.com", "hunter2").await;
    let token = token_for(&basic);
    let app = create_router(build_test_state(db));

    let (status, _) = send(
        app,
        "POST",
        "/v1/funding-pools",
        Some(&token),
        Some(serde_json::json!({ "slug": "x", "title": "X", "companyId": 1 })),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_create_pool_validates_input() {
    let db = create_test_db().await;
    let admin = create_test_admin(&db, "root@example.com", "hunter2").await;
    let company = create_test_company(&db, "Acme").await;
    let token = token_for(&admin);
    let app = create_router(build_test_state(db));

    // Missing title.
    let (status, body) = send(
        app.clone(),
        "POST",
        "/v1/funding-pools",
        Some(&token),
        Some(serde_json::json!({ "slug": "acme-seed", "companyId": company.id })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Submit all required parameters");

    // Unknown company.
    let (status, body) = send(
        app,
        "POST",
        "/v1/funding-pools",
        Some(&token),
        Some(serde_json::json!({ "slug": "acme-seed", "title": "Seed", "companyId": 99999 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Company does not exist!");
}

#[tokio::test]
async fn test_create_pool_normalizes_slug_and_defaults_to_draft() {
    let db = create_test_db().await;
    let admin = create_test_admin(&db, "root@example.com", "hunter2").await;
    let company = create_test_company(&db, "Acme").await;
    let token = token_for(&admin);
    let app = create_router(build_test_state(db));

    let (status, body) = send(
        app.clone(),
        "POST",
        "/v1/funding-pools",
        Some(&token),
        Some(serde_json::json!({
            "slug": "  Acme-SEED ",
            "title": "Acme Seed",
            "companyId": company.id
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["slug"], "acme-seed");
    assert_eq!(body["data"]["status"], "DRAFT");
    assert_eq!(body["data"]["backers"], serde_json::json!([]));

    // The normalized slug collides with itself.
    let (status, body) = send(
        app,
        "POST",
        "/v1/funding-pools",
        Some(&token),
        Some(serde_json::json!({
            "slug": "ACME-seed",
            "title": "Again",
            "companyId": company.id
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["detail"], "FundingPool with acme-seed slug already exists");
}

#[tokio::test]
async fn test_update_pool_keeps_omitted_fields() {
    let db = create_test_db().await;
    let admin = create_test_admin(&db, "root@example.com", "hunter2").await;
    let company = create_test_company(&db, "Acme").await;
    let pool = create_test_pool(
        &db,
        company.id,
        "acme-seed",
        PoolStatus::Draft,
        hours_from_now(1),
        hours_from_now(48),
        None,
    )
    .await;
    let token = token_for(&admin);
    let app = create_router(build_test_state(db));

    let (status, body) = send(
        app.clone(),
        "PUT",
        &format!("/v1/funding-pools/{}", pool.id),
        Some(&token),
        Some(serde_json::json!({ "status": "LIVE", "minAmount": 250.0 })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "LIVE");
    assert_eq!(body["data"]["minAmount"], 250.0);
    assert_eq!(body["data"]["slug"], "acme-seed", "slug survives a partial update");

    let (status, body) = send(
        app,
        "PUT",
        "/v1/funding-pools/99999",
        Some(&token),
        Some(serde_json::json!({ "title": "Ghost" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "FundingPools does not exist!");
}

#[tokio::test]
async fn test_fundraising_contract_only_sets_address() {
    let db = create_test_db().await;
    let admin = create_test_admin(&db, "root@example.com", "hunter2").await;
    let company = create_test_company(&db, "Acme").await;
    let pool = create_test_pool(
        &db,
        company.id,
        "acme-seed",
        PoolStatus::Draft,
        hours_from_now(1),
        hours_from_now(48),
        None,
    )
    .await;
    let token = token_for(&admin);
    let app = create_router(build_test_state(db));

    let (status, body) = send(
        app,
        "POST",
        &format!("/v1/funding-pools/{}/fundraising-contract", pool.id),
        Some(&token),
        Some(serde_json::json!({ "contractAddress": "0xfeed" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["contractAddress"], "0xfeed");
    assert_eq!(
        body["data"]["status"], "DRAFT",
        "recording the contract must not flip the status"
    );
}

#[tokio::test]
async fn test_delete_pool() {
    let db = create_test_db().await;
    let admin = create_test_admin(&db, "root@example.com", "hunter2").await;
    let company = create_test_company(&db, "Acme").await;
    let pool = create_test_pool(
        &db,
        company.id,
        "acme-seed",
        PoolStatus::Draft,
        hours_from_now(1),
        hours_from_now(48),
        None,
    )
    .await;
    let token = token_for(&admin);
    let app = create_router(build_test_state(db));

    let (status, _) = send(
        app.clone(),
        "DELETE",
        &format!("/v1/funding-pools/{}", pool.id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(
        app,
        "DELETE",
        &format!("/v1/funding-pools/{}", pool.id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "FundingPools does not exist!");
}
