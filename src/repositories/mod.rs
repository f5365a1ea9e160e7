//! Record store: where shared video records live.

mod memory_repo;
mod sql_repo;

pub use memory_repo::MemoryRecordStore;
pub use sql_repo::SqlRecordStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::AppResult;
use crate::models::record::{NewRecord, Record};

/// Persistence seam for shared records. The session coordinator never calls this;
/// HTTP handlers do, and only broadcast after it succeeds.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Store a record, assigning `id` and `added_at`.
    async fn append(&self, record: NewRecord) -> AppResult<Record>;

    /// Records newest first, at most `limit` of them.
    async fn list(&self, limit: Option<u32>) -> AppResult<Vec<Record>>;

    /// Remove by id. `Ok(false)` when no such record exists.
    async fn remove(&self, id: i64) -> AppResult<bool>;

    /// Remove records added before `cutoff`, returning the removed ids.
    async fn remove_older_than(&self, cutoff: DateTime<Utc>) -> AppResult<Vec<i64>>;
}
