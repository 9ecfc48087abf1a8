//! E-signature provider client.
//!
//! The sign flow composes these calls: fill the SAFT template with the
//! investor's data, create a procedure, attach the filled file, add the
//! investor as signer, then start the procedure. The resulting
//! `(saftId, procedureId, signatureId)` triple is what the investment
//! registration persists against the pool.

use base64::Engine as _;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::{AppError, Result};

#[derive(Clone)]
pub struct EsignClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

/// Signer identity forwarded to the provider.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Signer {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Deserialize)]
struct IdResponse {
    id: String,
}

#[derive(Deserialize)]
struct ContentResponse {
    /// Base64-encoded document body.
    content: String,
}

impl EsignClient {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            http: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .unwrap_or_default(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn check(resp: reqwest::Response, context: &str) -> Result<reqwest::Response> {
        if resp.status().is_success() {
            return Ok(resp);
        }
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        Err(AppError::Upstream(format!(
            "E-sign provider error ({}): {} {}",
            context, status, body
        )))
    }

    /// Fill the document template. The provider answers with the raw PDF;
    /// the bytes are returned base64-encoded for the file upload that
    /// follows.
    pub async fn fill_document(
        &self,
        template_id: &str,
        payload: &serde_json::Value,
    ) -> Result<String> {
        let resp = self
            .http
            .post(self.url(&format!("/templates/{}/fill", template_id)))
            .bearer_auth(&self.api_key)
            .json(payload)
            .send()
            .await?;
        let resp = Self::check(resp, "fill document").await?;
        let bytes = resp.bytes().await?;
        Ok(base64::engine::general_purpose::STANDARD.encode(&bytes))
    }

    pub async fn create_procedure(&self, name: &str, description: &str) -> Result<String> {
        let resp = self
            .http
            .post(self.url("/procedures"))
            .bearer_auth(&self.api_key)
            .json(&json!({
                "name": name,
                "description": description,
                "start": false,
            }))
            .send()
            .await?;
        let resp = Self::check(resp, "create procedure").await?;
        let body: IdResponse = resp.json().await?;
        Ok(body.id)
    }

    /// Attach a filled document to a procedure; returns the file id (the
    /// `saftId` the rest of the system tracks).
    pub async fn add_file(
        &self,
        name: &str,
        content_base64: &str,
        procedure_id: &str,
    ) -> Result<String> {
        let resp = self
            .http
            .post(self.url("/files"))
            .bearer_auth(&self.api_key)
            .json(&json!({
                "name": name,
                "content": content_base64,
                "procedure": procedure_id,
            }))
            .send()
            .await?;
        let resp = Self::check(resp, "add file").await?;
        let body: IdResponse = resp.json().await?;
        Ok(body.id)
    }

    /// Add the investor as signer on the file; returns the member id (the
    /// `signatureId` used later for code verification).
    pub async fn add_signer(
        &self,
        procedure_id: &str,
        file_id: &str,
        signer: &Signer,
    ) -> Result<String> {
        let resp = self
            .http
            .post(self.url("/members"))
            .bearer_auth(&self.api_key)
            .json(&json!({
                "firstname": signer.first_name,
                "lastname": signer.last_name,
                "email": signer.email,
                "phone": signer.phone,
                "procedure": procedure_id,
                "fileObjects": [{
                    "file": file_id,
                    "page": 1,
                    "position": "230,499,464,589",
                }],
            }))
            .send()
            .await?;
        let resp = Self::check(resp, "add signer").await?;
        let body: IdResponse = resp.json().await?;
        Ok(body.id)
    }

    pub async fn start_procedure(&self, procedure_id: &str) -> Result<()> {
        let resp = self
            .http
            .put(self.url(&format!("/procedures/{}", procedure_id)))
            .bearer_auth(&self.api_key)
            .json(&json!({ "start": true }))
            .send()
            .await?;
        Self::check(resp, "start procedure").await?;
        Ok(())
    }

    /// Verify the email code the signer received. A 4xx from the provider
    /// means the code itself was wrong, not that the provider is down.
    pub async fn verify_code(&self, signature_id: &str, code: &str) -> Result<()> {
        let resp = self
            .http
            .put(self.url(&format!("/authentications/email/{}", signature_id)))
            .bearer_auth(&self.api_key)
            .json(&json!({ "code": code }))
            .send()
            .await?;
        if resp.status().is_client_error() {
            return Err(AppError::BadRequest("Incorrect code".to_string()));
        }
        Self::check(resp, "verify code").await?;
        Ok(())
    }

    /// Download a document by file id; returns base64 content.
    pub async fn download_document(&self, file_id: &str) -> Result<String> {
        let resp = self
            .http
            .get(self.url(&format!("/files/{}/download", file_id)))
            .query(&[("alt", "media")])
            .bearer_auth(&self.api_key)
            .send()
            .await?;
        let resp = Self::check(resp, "download document").await?;
        let body: ContentResponse = resp.json().await?;
        Ok(body.content)
    }
}
