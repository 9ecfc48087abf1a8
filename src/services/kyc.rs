//! Identity-verification provider client. Opens verification sessions and
//! fetches verified media for review; the pass/fail decision itself arrives
//! through the webhook endpoint.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::{AppError, Result};
use crate::models::user;

#[derive(Clone)]
pub struct KycClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    start_url: String,
}

/// An opened verification session: the id the webhook will reference and
/// the URL the client is redirected to.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KycSession {
    pub identification_id: String,
    pub url: String,
}

#[derive(Deserialize)]
struct SessionResponse {
    id: String,
}

impl KycClient {
    pub fn new(base_url: &str, api_key: &str, start_url: &str) -> Self {
        Self {
            http: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .unwrap_or_default(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            start_url: start_url.trim_end_matches('/').to_string(),
        }
    }

    async fn check(resp: reqwest::Response, context: &str) -> Result<reqwest::Response> {
        if resp.status().is_success() {
            return Ok(resp);
        }
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        Err(AppError::Upstream(format!(
            "KYC provider error ({}): {} {}",
            context, status, body
        )))
    }

    /// Open a verification session for the user.
    pub async fn start_verification(&self, user: &user::Model) -> Result<KycSession> {
        let resp = self
            .http
            .post(format!("{}/identity-verifications", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&json!({
                "externalReferenceId": user.id.to_string(),
                "email": user.email,
                "firstName": user.name,
                "lastName": user.surname,
            }))
            .send()
            .await?;
        let resp = Self::check(resp, "start verification").await?;
        let body: SessionResponse = resp.json().await?;
        let url = format!("{}/{}", self.start_url, body.id);
        Ok(KycSession {
            identification_id: body.id,
            url,
        })
    }

    /// Fetch verified data or media for a finished session, passed through
    /// as-is for review.
    pub async fn fetch_verified_data(
        &self,
        identification_id: &str,
        kind: &str,
    ) -> Result<serde_json::Value> {
        let resp = self
            .http
            .get(format!(
                "{}/identifications/{}/{}",
                self.base_url, identification_id, kind
            ))
            .bearer_auth(&self.api_key)
            .send()
            .await?;
        let resp = Self::check(resp, "fetch verified data").await?;
        let body: serde_json::Value = resp.json().await?;
        Ok(body)
    }
}
