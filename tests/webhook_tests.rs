//! KYC webhook integration tests
//!
//! Covers `POST /v1/webhooks/{identification_id}/receive`: the pass rule
//! (cross-checked documents plus a finished request), fail recording, and
//! the guards around unknown or already-passed sessions.

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use sea_orm::{ActiveModelTrait, DatabaseConnection, IntoActiveModel, Set};
use tower::util::ServiceExt;

mod common;
use common::{build_test_state, create_test_db, create_test_user};

use passpad::endpoints::create_router;
use passpad::models::prelude::User;
use passpad::models::user;

async fn post_result(
    app: axum::Router,
    identification_id: &str,
    payload: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .uri(format!("/v1/webhooks/{}/receive", identification_id))
        .method("POST")
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}

/// A user with an open verification session.
async fn user_with_session(db: &DatabaseConnection, identification_id: &str) -> user::Model {
    let account = create_test_user(db, "applicant@example.com", "hunter2").await;
    let mut active = account.into_active_model();
    active.identification_id = Set(Some(identification_id.to_string()));
    active.update(db).await.unwrap()
}

async fn kyc_state(db: &DatabaseConnection, id: i64) -> bool {
    User::find_by_id(id)
        .one(db)
        .await
        .unwrap()
        .unwrap()
        .kyc_passed
}

#[tokio::test]
async fn test_unknown_session_is_rejected() {
    let db = create_test_db().await;
    let app = create_router(build_test_state(db));

    let (status, body) = post_result(
        app,
        "ghost-session",
        serde_json::json!({ "Event": "CROSS_CHECKED", "RequestStatus": "AUTO_FINISH" }),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body["detail"],
        "Could not find user with ghost-session identification id"
    );
}

#[tokio::test]
async fn test_cross_checked_auto_finish_passes() {
    let db = create_test_db().await;
    let account = user_with_session(&db, "session-1").await;
    let app = create_router(build_test_state(db.clone()));

    let (status, _) = post_result(
        app,
        "session-1",
        serde_json::json!({ "Event": "CROSS_CHECKED", "RequestStatus": "AUTO_FINISH" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(kyc_state(&db, account.id).await);
}

#[tokio::test]
async fn test_manual_finish_also_passes() {
    let db = create_test_db().await;
    let account = user_with_session(&db, "session-1").await;
    let app = create_router(build_test_state(db.clone()));

    let (status, _) = post_result(
        app,
        "session-1",
        serde_json::json!({ "Event": "CROSS_CHECKED", "RequestStatus": "MANUAL_FINISH" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(kyc_state(&db, account.id).await);
}

#[tokio::test]
async fn test_unfinished_request_records_a_fail() {
    let db = create_test_db().await;
    let account = user_with_session(&db, "session-1").await;
    let app = create_router(build_test_state(db.clone()));

    let (status, _) = post_result(
        app,
        "session-1",
        serde_json::json!({ "Event": "CROSS_CHECKED", "RequestStatus": "REJECTED" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "a fail is still recorded");
    assert!(!kyc_state(&db, account.id).await);
}

#[tokio::test]
async fn test_other_event_records_a_fail() {
    let db = create_test_db().await;
    let account = user_with_session(&db, "session-1").await;
    let app = create_router(build_test_state(db.clone()));

    let (status, _) = post_result(
        app,
        "session-1",
        serde_json::json!({ "Event": "DOCUMENT_UPLOADED", "RequestStatus": "AUTO_FINISH" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(!kyc_state(&db, account.id).await);
}

#[tokio::test]
async fn test_missing_request_status_records_a_fail() {
    let db = create_test_db().await;
    let account = user_with_session(&db, "session-1").await;
    let app = create_router(build_test_state(db.clone()));

    let (status, _) = post_result(
        app,
        "session-1",
        serde_json::json!({ "Event": "CROSS_CHECKED" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(!kyc_state(&db, account.id).await);
}

#[tokio::test]
async fn test_already_passed_session_conflicts() {
    let db = create_test_db().await;
    user_with_session(&db, "session-1").await;
    let app = create_router(build_test_state(db));

    let pass = serde_json::json!({ "Event": "CROSS_CHECKED", "RequestStatus": "AUTO_FINISH" });
    post_result(app.clone(), "session-1", pass.clone()).await;

    let (status, body) = post_result(app, "session-1", pass).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(
        body["detail"],
        "applicant@example.com already passed KYC successfully"
    );
}

#[tokio::test]
async fn test_failed_session_may_retry() {
    let db = create_test_db().await;
    let account = user_with_session(&db, "session-1").await;
    let app = create_router(build_test_state(db.clone()));

    post_result(
        app.clone(),
        "session-1",
        serde_json::json!({ "Event": "CROSS_CHECKED", "RequestStatus": "REJECTED" }),
    )
    .await;

    // A failed session does not lock the user out of a second attempt.
    let (status, _) = post_result(
        app,
        "session-1",
        serde_json::json!({ "Event": "CROSS_CHECKED", "RequestStatus": "MANUAL_FINISH" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(kyc_state(&db, account.id).await);
}
