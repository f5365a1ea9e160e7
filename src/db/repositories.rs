//! Record queries.

use crate::error::AppResult;
use crate::models::record::{NewRecord, Record};
use chrono::{DateTime, Utc};

use super::DbPool;

pub async fn record_create(
    pool: &DbPool,
    record: &NewRecord,
    added_at: DateTime<Utc>,
) -> AppResult<Record> {
    let row = sqlx::query_as::<_, Record>(
        r#"
        INSERT INTO records (url, title, added_by, added_at)
        VALUES (?, ?, ?, ?)
        RETURNING id, url, title, added_by, added_at
        "#,
    )
    .bind(&record.url)
    .bind(&record.title)
    .bind(&record.added_by)
    .bind(added_at)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// Newest first. `None` returns every record.
pub async fn records_list(pool: &DbPool, limit: Option<u32>) -> AppResult<Vec<Record>> {
    let limit = limit.map(i64::from).unwrap_or(-1);
    let rows = sqlx::query_as::<_, Record>(
        r#"
        SELECT id, url, title, added_by, added_at
        FROM records
        ORDER BY julianday(added_at) DESC, id DESC
        LIMIT ?
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn record_delete(pool: &DbPool, id: i64) -> AppResult<bool> {
    let r = sqlx::query("DELETE FROM records WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(r.rows_affected() > 0)
}

/// Delete records added before `cutoff`, returning their ids.
pub async fn records_delete_older_than(
    pool: &DbPool,
    cutoff: DateTime<Utc>,
) -> AppResult<Vec<i64>> {
    let ids = sqlx::query_scalar::<_, i64>(
        "DELETE FROM records WHERE julianday(added_at) < julianday(?) RETURNING id",
    )
    .bind(cutoff)
    .fetch_all(pool)
    .await?;
    Ok(ids)
}
