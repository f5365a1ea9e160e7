//! SQLite-backed record store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument};

use crate::db::{self, DbPool};
use crate::error::AppResult;
use crate::models::record::{NewRecord, Record};

use super::RecordStore;

#[derive(Clone)]
pub struct SqlRecordStore {
    pool: DbPool,
}

impl SqlRecordStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecordStore for SqlRecordStore {
    #[instrument(skip(self))]
    async fn append(&self, record: NewRecord) -> AppResult<Record> {
        let row = db::record_create(&self.pool, &record, Utc::now()).await?;
        info!(record_id = row.id, added_by = %row.added_by, "record stored");
        Ok(row)
    }

    async fn list(&self, limit: Option<u32>) -> AppResult<Vec<Record>> {
        db::records_list(&self.pool, limit).await
    }

    #[instrument(skip(self))]
    async fn remove(&self, id: i64) -> AppResult<bool> {
        let removed = db::record_delete(&self.pool, id).await?;
        debug!(record_id = id, removed, "record delete");
        Ok(removed)
    }

    async fn remove_older_than(&self, cutoff: DateTime<Utc>) -> AppResult<Vec<i64>> {
        db::records_delete_older_than(&self.pool, cutoff).await
    }
}
