//! In-memory record store for tests and throwaway runs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::error::AppResult;
use crate::models::record::{NewRecord, Record};

use super::RecordStore;

#[derive(Default)]
struct Inner {
    next_id: i64,
    records: Vec<Record>,
}

/// Keeps records in insertion order; nothing survives a restart.
#[derive(Default)]
pub struct MemoryRecordStore {
    inner: Mutex<Inner>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed with existing records. New ids continue after the largest seeded id.
    pub fn with_records(records: Vec<Record>) -> Self {
        let next_id = records.iter().map(|r| r.id).max().unwrap_or(0);
        Self {
            inner: Mutex::new(Inner { next_id, records }),
        }
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn append(&self, record: NewRecord) -> AppResult<Record> {
        let mut inner = self.inner.lock().await;
        inner.next_id += 1;
        let stored = Record {
            id: inner.next_id,
            url: record.url,
            title: record.title,
            added_by: record.added_by,
            added_at: Utc::now(),
        };
        inner.records.push(stored.clone());
        Ok(stored)
    }

    async fn list(&self, limit: Option<u32>) -> AppResult<Vec<Record>> {
        let inner = self.inner.lock().await;
        let mut out = inner.records.clone();
        out.sort_by(|a, b| b.added_at.cmp(&a.added_at).then(b.id.cmp(&a.id)));
        if let Some(limit) = limit {
            out.truncate(limit as usize);
        }
        Ok(out)
    }

    async fn remove(&self, id: i64) -> AppResult<bool> {
        let mut inner = self.inner.lock().await;
        let before = inner.records.len();
        inner.records.retain(|r| r.id != id);
        Ok(inner.records.len() != before)
    }

    async fn remove_older_than(&self, cutoff: DateTime<Utc>) -> AppResult<Vec<i64>> {
        let mut inner = self.inner.lock().await;
        let removed = inner
            .records
            .iter()
            .filter(|r| r.added_at < cutoff)
            .map(|r| r.id)
            .collect();
        inner.records.retain(|r| r.added_at >= cutoff);
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[tokio::test]
    async fn seeded_ids_continue() {
        let store = MemoryRecordStore::with_records(vec![Record {
            id: 41,
            url: "u".into(),
            title: "t".into(),
            added_by: "alice".into(),
            added_at: Utc::now() - Duration::days(60),
        }]);
        let rec = store.append(NewRecord::new("u2", "t2", "bob")).await.unwrap();
        assert_eq!(rec.id, 42);

        let list = store.list(None).await.unwrap();
        assert_eq!(list.iter().map(|r| r.id).collect::<Vec<_>>(), vec![42, 41]);

        let removed = store.remove_older_than(Utc::now() - Duration::days(30)).await.unwrap();
        assert_eq!(removed, vec![41]);
        assert!(!store.remove(41).await.unwrap());
        assert!(store.remove(42).await.unwrap());
    }
}
