//! Database operations for `import_runs`.

use chrono::{DateTime, Utc};
use katalog_core::ImportOutcome;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// A row from the `import_runs` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ImportRunRow {
    pub id: i64,
    pub public_id: Uuid,
    /// One of `cli`, `api`, `scheduler`.
    pub trigger_source: String,
    pub dry_run: bool,
    /// One of `running`, `succeeded`, `failed`.
    pub status: String,
    pub message: Option<String>,
    /// Serialized `ImportStats`; `{}` while the run is still going.
    pub stats: serde_json::Value,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Records a new run in `running` status.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails, including an unknown
/// `trigger_source`.
pub async fn create_import_run(
    pool: &PgPool,
    trigger_source: &str,
    dry_run: bool,
) -> Result<ImportRunRow, DbError> {
    let row = sqlx::query_as::<_, ImportRunRow>(
        "INSERT INTO import_runs (public_id, trigger_source, dry_run, status) \
         VALUES ($1, $2, $3, 'running') \
         RETURNING id, public_id, trigger_source, dry_run, status, message, stats, \
                   started_at, completed_at, created_at",
    )
    .bind(Uuid::new_v4())
    .bind(trigger_source)
    .bind(dry_run)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Moves a `running` run to `succeeded` or `failed` according to `outcome`,
/// storing its message and stats.
///
/// # Errors
///
/// Returns [`DbError::InvalidImportRunTransition`] if the run is not
/// `running`, or [`DbError::Sqlx`] if the update fails.
pub async fn finish_import_run(
    pool: &PgPool,
    id: i64,
    outcome: &ImportOutcome,
) -> Result<(), DbError> {
    let status = if outcome.succeeded {
        "succeeded"
    } else {
        "failed"
    };

    let result = sqlx::query(
        "UPDATE import_runs \
         SET status = $1, message = $2, stats = $3, completed_at = NOW() \
         WHERE id = $4 AND status = 'running'",
    )
    .bind(status)
    .bind(&outcome.message)
    .bind(Json(&outcome.stats))
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidImportRunTransition {
            id,
            expected_status: "running",
        });
    }

    Ok(())
}

/// # Errors
///
/// Returns [`DbError::NotFound`] if no run has this id, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn get_import_run(pool: &PgPool, id: i64) -> Result<ImportRunRow, DbError> {
    let row = sqlx::query_as::<_, ImportRunRow>(
        "SELECT id, public_id, trigger_source, dry_run, status, message, stats, \
                started_at, completed_at, created_at \
         FROM import_runs \
         WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)?;

    Ok(row)
}

/// Returns the most recent `limit` runs, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_import_runs(pool: &PgPool, limit: i64) -> Result<Vec<ImportRunRow>, DbError> {
    let rows = sqlx::query_as::<_, ImportRunRow>(
        "SELECT id, public_id, trigger_source, dry_run, status, message, stats, \
                started_at, completed_at, created_at \
         FROM import_runs \
         ORDER BY created_at DESC, id DESC \
         LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
