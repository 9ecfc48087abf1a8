//! Pagination extractor shared by the list endpoints.
//!
//! Query parameters: `limit` (0..=100, default 10, 0 means unbounded),
//! `offset` (>= 0, default 0, only feeds the reported page number) and
//! `startIndex` (>= 0, default 0, the number of rows skipped).

use axum::extract::{FromRequestParts, Query};
use axum::http::request::Parts;
use serde::Deserialize;
use validator::Validate;

use crate::error::AppError;

const DEFAULT_LIMIT: i64 = 10;

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
struct RawPagination {
    #[validate(range(min = 0, max = 100))]
    limit: Option<i64>,
    #[validate(range(min = 0))]
    offset: Option<i64>,
    #[validate(range(min = 0))]
    start_index: Option<i64>,
}

/// Validated pagination window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub limit: u64,
    pub offset: u64,
    pub start_index: u64,
    /// 1-based page derived from offset/limit, reported back to clients.
    pub page: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT as u64,
            offset: 0,
            start_index: 0,
            page: 1,
        }
    }
}

impl Pagination {
    /// Limit for the query builder; `None` when the client asked for all
    /// rows with `limit=0`.
    pub fn sql_limit(&self) -> Option<u64> {
        (self.limit > 0).then_some(self.limit)
    }
}

impl<S> FromRequestParts<S> for Pagination
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Query(raw): Query<RawPagination> = Query::try_from_uri(&parts.uri)
            .map_err(|e| AppError::BadRequest(format!("Invalid pagination parameters: {}", e)))?;

        raw.validate().map_err(|e| {
            AppError::BadRequest(format!("Invalid pagination parameters: {}", e))
        })?;

        let limit = raw.limit.unwrap_or(DEFAULT_LIMIT);
        let offset = raw.offset.unwrap_or(0);
        let start_index = raw.start_index.unwrap_or(0);

        let page = if limit > 0 { offset / limit + 1 } else { 1 };

        Ok(Pagination {
            limit: limit as u64,
            offset: offset as u64,
            start_index: start_index as u64,
            page: page as u64,
        })
    }
}
