//! Shared video records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::error::{AppError, AppResult};

/// `addedBy` used when the client leaves it out.
pub const ANONYMOUS: &str = "Anonymous";

/// A persisted video link, as stored and as sent to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub id: i64,
    pub url: String,
    pub title: String,
    pub added_by: String,
    pub added_at: DateTime<Utc>,
}

/// Body of `POST /records`.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateRecordRequest {
    #[validate(required(message = "url is required"), length(min = 1, message = "url is required"))]
    pub url: Option<String>,
    #[validate(required(message = "title is required"), length(min = 1, message = "title is required"))]
    pub title: Option<String>,
    #[serde(default)]
    pub added_by: Option<String>,
}

/// Validated input for the record store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecord {
    pub url: String,
    pub title: String,
    pub added_by: String,
}

impl NewRecord {
    pub fn new(url: impl Into<String>, title: impl Into<String>, added_by: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            added_by: added_by.into(),
        }
    }
}

impl TryFrom<CreateRecordRequest> for NewRecord {
    type Error = AppError;

    fn try_from(body: CreateRecordRequest) -> AppResult<Self> {
        body.validate().map_err(|e| AppError::Validation(e.to_string()))?;
        let url = body.url.unwrap_or_default().trim().to_string();
        let title = body.title.unwrap_or_default().trim().to_string();
        if url.is_empty() {
            return Err(AppError::Validation("url is required".to_string()));
        }
        if title.is_empty() {
            return Err(AppError::Validation("title is required".to_string()));
        }
        let added_by = body
            .added_by
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| ANONYMOUS.to_string());
        Ok(NewRecord { url, title, added_by })
    }
}
