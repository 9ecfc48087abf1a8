//! Invitation admin endpoint integration tests
//!
//! Covers `GET /v1/invitations` and `DELETE /v1/invitations/{id}`.

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use tower::util::ServiceExt;

mod common;
use common::{build_test_state, create_test_admin, create_test_db, create_test_user, token_for};

use passpad::endpoints::create_router;

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

/// Sign up a referred account so an invitation row exists.
async fn seed_invitation(app: &axum::Router, referral_code: &str, email: &str) {
    let (status, _) = send(
        app.clone(),
        "POST",
        "/v1/users/signup",
        None,
        Some(serde_json::json!({
            "email": email,
            "password": "hunter2",
            "referralCode": referral_code
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_list_requires_admin() {
    let db = create_test_db().await;
    let basic = create_test_user(&db, "basic@example.com", "hunter2").await;
    let token = token_for(&basic);
    let app = create_router(build_test_state(db));

    let (status, _) = send(app, "GET", "/v1/invitations", Some(&token), None).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_list_attaches_sender() {
    let db = create_test_db().await;
    let admin = create_test_admin(&db, "root@example.com", "hunter2").await;
    let inviter = create_test_user(&db, "inviter@example.com", "hunter2").await;
    let token = token_for(&admin);
    let app = create_router(build_test_state(db));
    seed_invitation(&app, &inviter.referral_code, "invited@example.com").await;

    let (status, body) = send(app, "GET", "/v1/invitations", Some(&token), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["recipientEmail"], "invited@example.com");
    assert_eq!(body["data"][0]["referralCode"], inviter.referral_code);
    assert_eq!(body["data"][0]["sender"]["email"], "inviter@example.com");
}

#[tokio::test]
async fn test_delete_invitation() {
    let db = create_test_db().await;
    let admin = create_test_admin(&db, "root@example.com", "hunter2").await;
    let inviter = create_test_user(&db, "inviter@example.com", "hunter2").await;
    let token = token_for(&admin);
    let app = create_router(build_test_state(db));
    seed_invitation(&app, &inviter.referral_code, "invited@example.com").await;

    let (_, body) = send(app.clone(), "GET", "/v1/invitations", Some(&token), None).await;
    let id = body["data"][0]["id"].as_i64().unwrap();

    let (status, _) = send(
        app.clone(),
        "DELETE",
        &format!("/v1/invitations/{}", id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(
        app,
        "DELETE",
        &format!("/v1/invitations/{}", id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Invitation does not exist!");
}
