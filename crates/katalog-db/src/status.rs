//! Database operations for `status`.

use chrono::{DateTime, Utc};
use sqlx::{PgExecutor, PgPool};

use crate::DbError;

/// A row from the `status` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StatusRow {
    pub id_status: i64,
    pub nama_status: String,
    pub created_at: DateTime<Utc>,
}

/// Returns every status ordered by id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_status(pool: &PgPool) -> Result<Vec<StatusRow>, DbError> {
    let rows = sqlx::query_as::<_, StatusRow>(
        "SELECT id_status, nama_status, created_at \
         FROM status \
         ORDER BY id_status",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// # Errors
///
/// Returns [`DbError::NotFound`] if no status has this id, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn get_status(pool: &PgPool, id: i64) -> Result<StatusRow, DbError> {
    let row = sqlx::query_as::<_, StatusRow>(
        "SELECT id_status, nama_status, created_at \
         FROM status \
         WHERE id_status = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)?;

    Ok(row)
}

/// Looks up a status by name, ignoring case and surrounding whitespace.
///
/// Returns `None` when no status matches. If several match, the lowest id wins.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn find_status_by_name(pool: &PgPool, name: &str) -> Result<Option<StatusRow>, DbError> {
    let row = sqlx::query_as::<_, StatusRow>(
        "SELECT id_status, nama_status, created_at \
         FROM status \
         WHERE LOWER(nama_status) = LOWER(btrim($1)) \
         ORDER BY id_status \
         LIMIT 1",
    )
    .bind(name)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Accepts a pool or an open transaction.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn status_exists<'e>(
    executor: impl PgExecutor<'e>,
    id: i64,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM status WHERE id_status = $1)")
        .bind(id)
        .fetch_one(executor)
        .await
}
