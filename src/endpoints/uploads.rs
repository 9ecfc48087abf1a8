//! Shared multipart upload handler, mounted by the user and company routers.

use axum::extract::{Multipart, State};

use crate::error::{AppError, Result};
use crate::state::AppState;

/// Store the `file` field of a multipart upload and return its public URL
/// as a plain text body.
pub async fn upload_file(State(state): State<AppState>, mut multipart: Multipart) -> Result<String> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart payload: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().unwrap_or("upload.bin").to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to read upload: {}", e)))?;

        let url = state
            .storage
            .store(&file_name, &content_type, bytes.to_vec())
            .await?;
        return Ok(url);
    }

    Err(AppError::BadRequest(
        "No file field in the upload".to_string(),
    ))
}
