//! Periodic pruning of old records.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::error::AppResult;
use crate::repositories::RecordStore;
use crate::services::session::SessionCoordinator;

/// Delete records older than `max_age_days` and tell every client about each removal.
pub async fn prune_once(
    store: &dyn RecordStore,
    coordinator: &SessionCoordinator,
    max_age_days: u32,
) -> AppResult<usize> {
    let cutoff = Utc::now() - chrono::Duration::days(i64::from(max_age_days));
    let removed = store.remove_older_than(cutoff).await?;
    for id in &removed {
        coordinator.broadcast_record_removed(*id).await;
    }
    if !removed.is_empty() {
        info!(count = removed.len(), max_age_days, "pruned old records");
    }
    Ok(removed.len())
}

/// Run `prune_once` every `interval`. Returns `None` when retention is disabled (`max_age_days == 0`).
pub fn spawn_retention(
    store: Arc<dyn RecordStore>,
    coordinator: SessionCoordinator,
    max_age_days: u32,
    interval: Duration,
) -> Option<JoinHandle<()>> {
    if max_age_days == 0 {
        return None;
    }
    Some(tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            if let Err(e) = prune_once(store.as_ref(), &coordinator, max_age_days).await {
                warn!(error = %e, "record pruning failed");
            }
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::event::ServerEvent;
    use crate::models::presence::ConnectionId;
    use crate::models::record::Record;
    use crate::repositories::MemoryRecordStore;
    use tokio::sync::mpsc;

    fn record(id: i64, age_days: i64) -> Record {
        Record {
            id,
            url: format!("https://youtu.be/{id}"),
            title: "clip".into(),
            added_by: "alice".into(),
            added_at: Utc::now() - chrono::Duration::days(age_days),
        }
    }

    #[tokio::test]
    async fn prune_removes_old_and_broadcasts_each() {
        let store = MemoryRecordStore::with_records(vec![record(1, 45), record(2, 1), record(3, 31)]);
        let coordinator = SessionCoordinator::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        coordinator.register(ConnectionId::new("a"), tx).await;

        let count = prune_once(&store, &coordinator, 30).await.unwrap();
        assert_eq!(count, 2);

        let mut removed = Vec::new();
        while let Ok(frame) = rx.try_recv() {
            match serde_json::from_str::<ServerEvent>(&frame).unwrap() {
                ServerEvent::RecordRemoved { id } => removed.push(id),
                other => panic!("unexpected {:?}", other),
            }
        }
        removed.sort();
        assert_eq!(removed, vec![1, 3]);
        assert_eq!(store.list(None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn disabled_retention_spawns_nothing() {
        let store: Arc<dyn RecordStore> = Arc::new(MemoryRecordStore::new());
        assert!(spawn_retention(store, SessionCoordinator::new(), 0, Duration::from_secs(1)).is_none());
    }
}
