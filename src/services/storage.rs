//! Object storage client. Uploads land under the configured bucket and are
//! addressed by the public URL; deletes are tolerant of already-missing
//! objects so cascade cleanups never fail a request.

use uuid::Uuid;

use crate::error::{AppError, Result};

#[derive(Clone)]
pub struct StorageClient {
    http: reqwest::Client,
    base_url: String,
    bucket: String,
}

impl StorageClient {
    pub fn new(base_url: &str, bucket: &str) -> Self {
        Self {
            http: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(60))
                .build()
                .unwrap_or_default(),
            base_url: base_url.trim_end_matches('/').to_string(),
            bucket: bucket.to_string(),
        }
    }

    fn public_url(&self, object_name: &str) -> String {
        format!("{}/{}/{}", self.base_url, self.bucket, object_name)
    }

    /// Object name from a public URL produced by `store`, if the URL points
    /// into this bucket.
    fn object_name<'a>(&self, url: &'a str) -> Option<&'a str> {
        let prefix = format!("{}/{}/", self.base_url, self.bucket);
        url.strip_prefix(prefix.as_str())
    }

    /// Upload a file; returns its public URL. The stored name is prefixed
    /// with a UUID so repeated uploads of the same filename never collide.
    pub async fn store(&self, file_name: &str, content_type: &str, bytes: Vec<u8>) -> Result<String> {
        let object_name = format!("{}-{}", Uuid::new_v4(), file_name);
        let resp = self
            .http
            .post(format!(
                "{}/upload/storage/v1/b/{}/o",
                self.base_url, self.bucket
            ))
            .query(&[("uploadType", "media"), ("name", object_name.as_str())])
            .header("Content-Type", content_type)
            .body(bytes)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(AppError::Upstream(format!(
                "Storage upload failed: {} {}",
                status, body
            )));
        }

        Ok(self.public_url(&object_name))
    }

    /// Delete an uploaded object by its public URL. Missing objects and
    /// foreign URLs are not errors.
    pub async fn delete(&self, url: &str) -> Result<()> {
        let object_name = match self.object_name(url) {
            Some(name) if !name.is_empty() => name,
            _ => {
                tracing::debug!(url, "skipping delete of URL outside the bucket");
                return Ok(());
            }
        };

        let resp = self
            .http
            .delete(format!(
                "{}/storage/v1/b/{}/o/{}",
                self.base_url, self.bucket, object_name
            ))
            .send()
            .await?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(());
        }
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(AppError::Upstream(format!(
                "Storage delete failed: {} {}",
                status, body
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_name_extraction() {
        let client = StorageClient::new("https://storage.googleapis.com", "passpad-uploads");
        assert_eq!(
            client.object_name("https://storage.googleapis.com/passpad-uploads/abc-logo.png"),
            Some("abc-logo.png")
        );
        assert_eq!(
            client.object_name("https://elsewhere.example.com/other/abc.png"),
            None
        );
    }
}
