//! HTTP handlers: shared records and health.

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use crate::config::HeartbeatConfig;
use crate::error::AppError;
use crate::models::record::{CreateRecordRequest, NewRecord, Record};
use crate::repositories::RecordStore;
use crate::services::SessionCoordinator;

/// Shared application state for HTTP and WS.
#[derive(Clone)]
pub struct AppState {
    pub coordinator: SessionCoordinator,
    pub store: Arc<dyn RecordStore>,
    pub heartbeat: HeartbeatConfig,
}

impl AppState {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            coordinator: SessionCoordinator::new(),
            store,
            heartbeat: HeartbeatConfig::default(),
        }
    }

    pub fn with_heartbeat(mut self, heartbeat: HeartbeatConfig) -> Self {
        self.heartbeat = heartbeat;
        self
    }

    pub fn coordinator(&self) -> &SessionCoordinator {
        &self.coordinator
    }

    pub fn store(&self) -> &dyn RecordStore {
        self.store.as_ref()
    }
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub limit: Option<u32>,
}

/// GET /records — stored records, newest first.
pub async fn list_records(
    State(state): State<AppState>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Vec<Record>>, AppError> {
    let Query(params) = params?;
    let records = state.store().list(params.limit).await?;
    Ok(Json(records))
}

/// POST /records — store a record, then push it to every connection.
pub async fn create_record(
    State(state): State<AppState>,
    body: Result<Json<CreateRecordRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Record>), AppError> {
    let Json(body) = body?;
    let new_record = NewRecord::try_from(body)?;
    let record = state.store().append(new_record).await.map_err(|e| {
        warn!(error = %e, "record append failed");
        e
    })?;
    state.coordinator().broadcast_record_created(&record).await;
    Ok((StatusCode::CREATED, Json(record)))
}

/// DELETE /records/:id — remove a record, then push the removal to every connection.
pub async fn delete_record(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    let id = parse_record_id(&raw_id)?;
    let removed = state.store().remove(id).await.map_err(|e| {
        warn!(record_id = id, error = %e, "record delete failed");
        e
    })?;
    if !removed {
        return Ok((
            StatusCode::NOT_FOUND,
            Json(json!({ "success": false, "id": id })),
        ));
    }
    state.coordinator().broadcast_record_removed(id).await;
    Ok((StatusCode::OK, Json(json!({ "success": true, "id": id }))))
}

pub(crate) fn parse_record_id(raw: &str) -> Result<i64, AppError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| AppError::Validation(format!("Malformed record id: {}", raw)))
}

/// GET /health: liveness check with connection counts.
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    let connections = state.coordinator().connection_count().await;
    let online = state.coordinator().roster().await.len();
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "service": "gamesquad",
            "connections": connections,
            "online": online
        })),
    )
}

#[cfg(test)]
mod tests {
    use super::parse_record_id;

    #[test]
    fn parse_record_id_accepts_integers() {
        assert_eq!(parse_record_id("42").unwrap(), 42);
        assert_eq!(parse_record_id(" 7 ").unwrap(), 7);
    }

    #[test]
    fn parse_record_id_rejects_garbage() {
        assert!(parse_record_id("abc").is_err());
        assert!(parse_record_id("").is_err());
        assert!(parse_record_id("1.5").is_err());
    }
}
