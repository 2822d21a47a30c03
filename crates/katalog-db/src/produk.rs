//! Database operations for `produk`.
//!
//! Reads join the category and status names so callers never need a second
//! round trip. Writes check nothing beyond what the schema enforces; the API
//! layer validates references before calling in.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgExecutor, PgPool};

use crate::DbError;

const SELECT_PRODUK: &str = "SELECT p.id_produk, p.nama_produk, p.harga, \
            p.kategori_id, k.nama_kategori, p.status_id, s.nama_status, \
            p.created_at, p.updated_at \
     FROM produk p \
     JOIN kategori k ON k.id_kategori = p.kategori_id \
     JOIN status s ON s.id_status = p.status_id";

/// A `produk` row joined with its category and status names.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProdukRow {
    pub id_produk: i64,
    pub nama_produk: String,
    pub harga: Decimal,
    pub kategori_id: i64,
    pub nama_kategori: String,
    pub status_id: i64,
    pub nama_status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Optional equality filters for [`list_produk`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProdukFilter {
    pub kategori_id: Option<i64>,
    pub status_id: Option<i64>,
}

/// Column values for a create or a full update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProdukWrite {
    pub nama_produk: String,
    pub harga: Decimal,
    pub kategori_id: i64,
    pub status_id: i64,
}

/// Lists products ordered by id, narrowed by `filter`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_produk(pool: &PgPool, filter: &ProdukFilter) -> Result<Vec<ProdukRow>, DbError> {
    let sql = format!(
        "{SELECT_PRODUK} \
         WHERE ($1::BIGINT IS NULL OR p.kategori_id = $1) \
           AND ($2::BIGINT IS NULL OR p.status_id = $2) \
         ORDER BY p.id_produk"
    );
    let rows = sqlx::query_as::<_, ProdukRow>(&sql)
        .bind(filter.kategori_id)
        .bind(filter.status_id)
        .fetch_all(pool)
        .await?;

    Ok(rows)
}

/// # Errors
///
/// Returns [`DbError::NotFound`] if no product has this id, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn get_produk(pool: &PgPool, id: i64) -> Result<ProdukRow, DbError> {
    let sql = format!("{SELECT_PRODUK} WHERE p.id_produk = $1");
    let row = sqlx::query_as::<_, ProdukRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(DbError::NotFound)?;

    Ok(row)
}

/// Inserts a product with an id drawn from the identity sequence.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails, including foreign-key and
/// length violations.
pub async fn create_produk(pool: &PgPool, produk: &ProdukWrite) -> Result<ProdukRow, DbError> {
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO produk (nama_produk, harga, kategori_id, status_id) \
         VALUES ($1, $2, $3, $4) \
         RETURNING id_produk",
    )
    .bind(&produk.nama_produk)
    .bind(produk.harga)
    .bind(produk.kategori_id)
    .bind(produk.status_id)
    .fetch_one(pool)
    .await?;

    get_produk(pool, id).await
}

/// Replaces every writable column of an existing product.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no product has this id, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn update_produk(
    pool: &PgPool,
    id: i64,
    produk: &ProdukWrite,
) -> Result<ProdukRow, DbError> {
    let result = sqlx::query(
        "UPDATE produk \
         SET nama_produk = $1, harga = $2, kategori_id = $3, status_id = $4, \
             updated_at = NOW() \
         WHERE id_produk = $5",
    )
    .bind(&produk.nama_produk)
    .bind(produk.harga)
    .bind(produk.kategori_id)
    .bind(produk.status_id)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }

    get_produk(pool, id).await
}

/// # Errors
///
/// Returns [`DbError::NotFound`] if no product has this id, or
/// [`DbError::Sqlx`] if the delete fails.
pub async fn delete_produk(pool: &PgPool, id: i64) -> Result<(), DbError> {
    let result = sqlx::query("DELETE FROM produk WHERE id_produk = $1")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }

    Ok(())
}

/// Accepts a pool or an open transaction.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn produk_exists<'e>(
    executor: impl PgExecutor<'e>,
    id: i64,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM produk WHERE id_produk = $1)")
        .bind(id)
        .fetch_one(executor)
        .await
}
