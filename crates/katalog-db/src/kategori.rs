//! Database operations for `kategori`.

use chrono::{DateTime, Utc};
use sqlx::{PgExecutor, PgPool};

use crate::DbError;

/// A row from the `kategori` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct KategoriRow {
    pub id_kategori: i64,
    pub nama_kategori: String,
    pub created_at: DateTime<Utc>,
}

/// Returns every category ordered by id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_kategori(pool: &PgPool) -> Result<Vec<KategoriRow>, DbError> {
    let rows = sqlx::query_as::<_, KategoriRow>(
        "SELECT id_kategori, nama_kategori, created_at \
         FROM kategori \
         ORDER BY id_kategori",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// # Errors
///
/// Returns [`DbError::NotFound`] if no category has this id, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn get_kategori(pool: &PgPool, id: i64) -> Result<KategoriRow, DbError> {
    let row = sqlx::query_as::<_, KategoriRow>(
        "SELECT id_kategori, nama_kategori, created_at \
         FROM kategori \
         WHERE id_kategori = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)?;

    Ok(row)
}

/// Accepts a pool or an open transaction.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn kategori_exists<'e>(
    executor: impl PgExecutor<'e>,
    id: i64,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM kategori WHERE id_kategori = $1)")
        .bind(id)
        .fetch_one(executor)
        .await
}
