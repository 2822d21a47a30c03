//! Applies a [`NormalizedPayload`] to the catalog tables.
//!
//! The whole payload is applied inside one transaction. Imports only ever add
//! rows: an id that already exists is counted as skipped and left untouched.
//! Concurrent imports serialize on a transaction-scoped advisory lock, and
//! inserts use `ON CONFLICT DO NOTHING`, so two runs can never race on an id.

use katalog_core::{
    EntityCounts, ImportMode, ImportOutcome, ImportStats, NamedItem, NormalizedPayload, ProdukItem,
    SkipReason,
};
use sqlx::{PgConnection, PgPool};

use crate::kategori::kategori_exists;
use crate::produk::produk_exists;
use crate::status::status_exists;
use crate::DbError;

/// Advisory lock key shared by every import run ("KATALOG" in ASCII).
const IMPORT_LOCK_KEY: i64 = 0x004B_4154_414C_4F47;

#[derive(Debug, Clone, Copy)]
enum NamedTable {
    Kategori,
    Status,
}

impl NamedTable {
    fn label(self) -> &'static str {
        match self {
            Self::Kategori => "kategori",
            Self::Status => "status",
        }
    }

    fn insert_sql(self) -> &'static str {
        match self {
            Self::Kategori => {
                "INSERT INTO kategori (id_kategori, nama_kategori) VALUES ($1, $2) \
                 ON CONFLICT (id_kategori) DO NOTHING"
            }
            Self::Status => {
                "INSERT INTO status (id_status, nama_status) VALUES ($1, $2) \
                 ON CONFLICT (id_status) DO NOTHING"
            }
        }
    }
}

/// Applies `payload` in the order categories, statuses, products.
///
/// Never returns an error: database failures roll the transaction back and
/// produce a failed [`ImportOutcome`] carrying the counts reached so far.
pub async fn apply_import(
    pool: &PgPool,
    payload: &NormalizedPayload,
    mode: ImportMode,
) -> ImportOutcome {
    let mut stats = ImportStats::default();

    match run_import(pool, payload, mode, &mut stats).await {
        Ok(()) => {
            let outcome = ImportOutcome::completed(stats, mode);
            tracing::info!(
                dry_run = mode.is_dry_run(),
                kategori_created = stats.kategori.created,
                status_created = stats.status.created,
                produk_created = stats.produk.created,
                skipped = stats.total_skipped(),
                "{}",
                outcome.message
            );
            outcome
        }
        Err(e) => {
            tracing::error!(error = %e, "import failed, transaction rolled back");
            ImportOutcome::failed(format!("Import failed: {e}"), stats, mode)
        }
    }
}

async fn run_import(
    pool: &PgPool,
    payload: &NormalizedPayload,
    mode: ImportMode,
    stats: &mut ImportStats,
) -> Result<(), DbError> {
    let mut tx = pool.begin().await?;

    sqlx::query("SELECT pg_advisory_xact_lock($1)")
        .bind(IMPORT_LOCK_KEY)
        .execute(&mut *tx)
        .await?;

    apply_named(
        &mut tx,
        NamedTable::Kategori,
        &payload.kategori,
        &mut stats.kategori,
    )
    .await?;
    apply_named(&mut tx, NamedTable::Status, &payload.status, &mut stats.status).await?;
    apply_produk(&mut tx, &payload.produk, &mut stats.produk).await?;

    match mode {
        ImportMode::Commit => {
            // setval is not transactional, so a dry run must not touch sequences.
            resync_sequences(&mut tx).await?;
            tx.commit().await?;
        }
        ImportMode::DryRun => tx.rollback().await?,
    }

    Ok(())
}

async fn apply_named(
    conn: &mut PgConnection,
    table: NamedTable,
    items: &[NamedItem],
    counts: &mut EntityCounts,
) -> Result<(), DbError> {
    for item in items {
        let screened = match item.screen() {
            Ok(screened) => screened,
            Err(reason) => {
                skip(counts, table.label(), item.id, reason);
                continue;
            }
        };

        let inserted = sqlx::query(table.insert_sql())
            .bind(screened.id)
            .bind(&screened.name)
            .execute(&mut *conn)
            .await?
            .rows_affected()
            == 1;

        if inserted {
            counts.created += 1;
        } else {
            skip(counts, table.label(), item.id, SkipReason::AlreadyExists);
        }
    }

    Ok(())
}

async fn apply_produk(
    conn: &mut PgConnection,
    items: &[ProdukItem],
    counts: &mut EntityCounts,
) -> Result<(), DbError> {
    for item in items {
        let produk = match item.screen() {
            Ok(produk) => produk,
            Err(reason) => {
                skip(counts, "produk", item.id, reason);
                continue;
            }
        };

        if produk_exists(&mut *conn, produk.id).await? {
            skip(counts, "produk", item.id, SkipReason::AlreadyExists);
            continue;
        }
        if !kategori_exists(&mut *conn, produk.category_id).await? {
            skip(counts, "produk", item.id, SkipReason::UnknownKategori);
            continue;
        }
        if !status_exists(&mut *conn, produk.status_id).await? {
            skip(counts, "produk", item.id, SkipReason::UnknownStatus);
            continue;
        }

        let inserted = sqlx::query(
            "INSERT INTO produk (id_produk, nama_produk, harga, kategori_id, status_id) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (id_produk) DO NOTHING",
        )
        .bind(produk.id)
        .bind(&produk.name)
        .bind(produk.price)
        .bind(produk.category_id)
        .bind(produk.status_id)
        .execute(&mut *conn)
        .await?
        .rows_affected()
            == 1;

        if inserted {
            counts.created += 1;
        } else {
            skip(counts, "produk", item.id, SkipReason::AlreadyExists);
        }
    }

    Ok(())
}

/// Moves each identity sequence past the largest stored id.
async fn resync_sequences(conn: &mut PgConnection) -> Result<(), DbError> {
    for (table, column) in [
        ("kategori", "id_kategori"),
        ("status", "id_status"),
        ("produk", "id_produk"),
    ] {
        let sql = format!(
            "SELECT setval(pg_get_serial_sequence('{table}', '{column}'), \
                           COALESCE(MAX({column}), 1), \
                           MAX({column}) IS NOT NULL) \
             FROM {table}"
        );
        sqlx::query(&sql).execute(&mut *conn).await?;
    }

    Ok(())
}

fn skip(counts: &mut EntityCounts, kind: &'static str, id: Option<i64>, reason: SkipReason) {
    counts.skipped += 1;
    tracing::debug!(kind, id = ?id, %reason, "import item skipped");
}
