//! Live integration tests for katalog-db using `#[sqlx::test]`.
//!
//! Each test gets a fresh, fully-migrated Postgres database spun up by the
//! sqlx test harness. The `migrations` path is relative to the crate root
//! (`crates/katalog-db/`), so `"../../migrations"` resolves to the workspace
//! migration directory.

use katalog_core::{
    EntityCounts, ImportMode, ImportOutcome, ImportStats, NamedItem, NormalizedPayload, ProdukItem,
};
use katalog_db::{
    apply_import, create_import_run, create_produk, delete_produk, find_status_by_name,
    finish_import_run, get_import_run, get_produk, list_import_runs, list_kategori, list_produk,
    list_status, update_produk, DbError, ProdukFilter, ProdukWrite,
};
use rust_decimal::Decimal;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn produk(id: i64, name: &str, price: &str, kategori: i64, status: i64) -> ProdukItem {
    ProdukItem {
        id: Some(id),
        name: Some(name.to_string()),
        price: Some(price.to_string()),
        category_id: Some(kategori),
        status_id: Some(status),
    }
}

fn sample_payload() -> NormalizedPayload {
    NormalizedPayload {
        kategori: vec![NamedItem::new(1, "ATK"), NamedItem::new(2, "L QUEENLY")],
        status: vec![
            NamedItem::new(1, "bisa dijual"),
            NamedItem::new(2, "tidak bisa dijual"),
        ],
        produk: vec![
            produk(6, "Kertas A4", "12500", 1, 1),
            produk(9, "ALCOHOL GEL POLISH CLEANSER GP-CLN01", "12500", 2, 2),
            produk(11, "Pena", "3000", 1, 2),
        ],
    }
}

async fn count(pool: &sqlx::PgPool, table: &str) -> i64 {
    sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(pool)
        .await
        .unwrap_or_else(|e| panic!("count {table} failed: {e}"))
}

fn counts(created: u32, skipped: u32) -> EntityCounts {
    EntityCounts { created, skipped }
}

// ---------------------------------------------------------------------------
// Section 1: apply_import
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn import_single_product_creates_three_rows(pool: sqlx::PgPool) {
    let payload = NormalizedPayload {
        kategori: vec![NamedItem::new(1, "ATK")],
        status: vec![NamedItem::new(1, "bisa dijual")],
        produk: vec![produk(6, "Kertas A4", "12500", 1, 1)],
    };

    let outcome = apply_import(&pool, &payload, ImportMode::Commit).await;

    assert!(outcome.succeeded, "import failed: {}", outcome.message);
    assert_eq!(
        outcome.message,
        "Import successful. Created 3 records (Kategori: 1, Status: 1, Produk: 1)"
    );

    let row = get_produk(&pool, 6).await.expect("produk 6 should exist");
    assert_eq!(row.nama_produk, "Kertas A4");
    assert_eq!(row.harga, Decimal::new(12500, 0));
    assert_eq!(row.nama_kategori, "ATK");
    assert_eq!(row.nama_status, "bisa dijual");
}

#[sqlx::test(migrations = "../../migrations")]
async fn import_is_idempotent(pool: sqlx::PgPool) {
    let payload = sample_payload();

    let first = apply_import(&pool, &payload, ImportMode::Commit).await;
    assert!(first.succeeded, "first import failed: {}", first.message);
    assert_eq!(first.stats.total_created(), 7);

    let second = apply_import(&pool, &payload, ImportMode::Commit).await;
    assert!(second.succeeded, "second import failed: {}", second.message);
    assert_eq!(
        second.stats,
        ImportStats {
            kategori: counts(0, 2),
            status: counts(0, 2),
            produk: counts(0, 3),
        }
    );

    assert_eq!(count(&pool, "kategori").await, 2);
    assert_eq!(count(&pool, "status").await, 2);
    assert_eq!(count(&pool, "produk").await, 3);
}

#[sqlx::test(migrations = "../../migrations")]
async fn existing_rows_are_never_overwritten(pool: sqlx::PgPool) {
    apply_import(&pool, &sample_payload(), ImportMode::Commit).await;

    let mut renamed = sample_payload();
    renamed.kategori[0] = NamedItem::new(1, "RENAMED");
    renamed.produk[0] = produk(6, "Kertas A3", "99999", 1, 1);
    apply_import(&pool, &renamed, ImportMode::Commit).await;

    let kategori = list_kategori(&pool).await.expect("list kategori");
    assert_eq!(kategori[0].nama_kategori, "ATK");
    let row = get_produk(&pool, 6).await.expect("produk 6");
    assert_eq!(row.nama_produk, "Kertas A4");
    assert_eq!(row.harga, Decimal::new(12500, 0));
}

#[sqlx::test(migrations = "../../migrations")]
async fn product_with_missing_reference_is_skipped(pool: sqlx::PgPool) {
    let mut payload = sample_payload();
    payload.produk.push(produk(20, "Orphan kategori", "100", 99, 1));
    payload.produk.push(produk(21, "Orphan status", "100", 1, 99));

    let outcome = apply_import(&pool, &payload, ImportMode::Commit).await;

    assert!(outcome.succeeded, "import failed: {}", outcome.message);
    assert_eq!(outcome.stats.produk, counts(3, 2));
    assert!(matches!(get_produk(&pool, 20).await, Err(DbError::NotFound)));
    assert!(matches!(get_produk(&pool, 21).await, Err(DbError::NotFound)));
}

#[sqlx::test(migrations = "../../migrations")]
async fn product_may_reference_rows_from_an_earlier_run(pool: sqlx::PgPool) {
    apply_import(&pool, &sample_payload(), ImportMode::Commit).await;

    let payload = NormalizedPayload {
        kategori: vec![],
        status: vec![],
        produk: vec![produk(30, "Tinta Hitam", "45000", 2, 1)],
    };
    let outcome = apply_import(&pool, &payload, ImportMode::Commit).await;

    assert_eq!(outcome.stats.produk, counts(1, 0));
    assert_eq!(
        get_produk(&pool, 30).await.expect("produk 30").nama_kategori,
        "L QUEENLY"
    );
}

#[sqlx::test(migrations = "../../migrations")]
async fn database_fault_rolls_back_everything(pool: sqlx::PgPool) {
    let mut payload = sample_payload();
    // produk.nama_produk is VARCHAR(200).
    payload.produk.push(produk(40, &"x".repeat(201), "100", 1, 1));

    let outcome = apply_import(&pool, &payload, ImportMode::Commit).await;

    assert!(!outcome.succeeded);
    assert!(
        outcome.message.starts_with("Import failed: "),
        "unexpected message: {}",
        outcome.message
    );
    // Counts reached before the fault are reported but not persisted.
    assert_eq!(outcome.stats.kategori.created, 2);
    assert_eq!(outcome.stats.produk.created, 3);

    assert_eq!(count(&pool, "kategori").await, 0);
    assert_eq!(count(&pool, "status").await, 0);
    assert_eq!(count(&pool, "produk").await, 0);
}

#[sqlx::test(migrations = "../../migrations")]
async fn unparseable_price_skips_only_that_product(pool: sqlx::PgPool) {
    let mut payload = sample_payload();
    payload.produk.insert(1, produk(50, "Harga rusak", "abc", 1, 1));
    payload.produk.push(produk(51, "Harga minus", "-5", 1, 1));

    let outcome = apply_import(&pool, &payload, ImportMode::Commit).await;

    assert!(outcome.succeeded, "import failed: {}", outcome.message);
    assert_eq!(outcome.stats.produk, counts(3, 2));
    assert_eq!(count(&pool, "produk").await, 3);
}

#[sqlx::test(migrations = "../../migrations")]
async fn falsy_items_are_skipped(pool: sqlx::PgPool) {
    let payload = NormalizedPayload {
        kategori: vec![
            NamedItem::new(1, "ATK"),
            NamedItem::new(0, "Zero id"),
            NamedItem::new(3, "   "),
            NamedItem::default(),
        ],
        status: vec![NamedItem::new(1, "bisa dijual")],
        produk: vec![
            produk(6, "Kertas A4", "12500", 1, 1),
            produk(7, "", "100", 1, 1),
            ProdukItem {
                price: None,
                ..produk(8, "No price", "0", 1, 1)
            },
            produk(9, "Free sample", "0", 1, 1),
        ],
    };

    let outcome = apply_import(&pool, &payload, ImportMode::Commit).await;

    assert!(outcome.succeeded, "import failed: {}", outcome.message);
    assert_eq!(outcome.stats.kategori, counts(1, 3));
    assert_eq!(outcome.stats.produk, counts(2, 2));
    assert_eq!(
        get_produk(&pool, 9).await.expect("produk 9").harga,
        Decimal::ZERO
    );
}

#[sqlx::test(migrations = "../../migrations")]
async fn dry_run_reports_counts_without_writing(pool: sqlx::PgPool) {
    let outcome = apply_import(&pool, &sample_payload(), ImportMode::DryRun).await;

    assert!(outcome.succeeded, "dry run failed: {}", outcome.message);
    assert!(outcome.dry_run);
    assert_eq!(
        outcome.message,
        "Dry run complete. Would create 7 records (Kategori: 2, Status: 2, Produk: 3)"
    );
    assert_eq!(count(&pool, "kategori").await, 0);
    assert_eq!(count(&pool, "produk").await, 0);

    let committed = apply_import(&pool, &sample_payload(), ImportMode::Commit).await;
    assert_eq!(committed.stats, outcome.stats);
}

#[sqlx::test(migrations = "../../migrations")]
async fn import_advances_identity_sequences(pool: sqlx::PgPool) {
    apply_import(&pool, &sample_payload(), ImportMode::Commit).await;

    let created = create_produk(
        &pool,
        &ProdukWrite {
            nama_produk: "Created via API".to_string(),
            harga: Decimal::new(1000, 0),
            kategori_id: 1,
            status_id: 1,
        },
    )
    .await
    .expect("create_produk after import should not collide");

    assert_eq!(created.id_produk, 12);
}

// ---------------------------------------------------------------------------
// Section 2: catalog reads and writes
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn find_status_by_name_ignores_case(pool: sqlx::PgPool) {
    apply_import(&pool, &sample_payload(), ImportMode::Commit).await;

    let found = find_status_by_name(&pool, " Bisa Dijual ")
        .await
        .expect("query")
        .expect("status should match");
    assert_eq!(found.id_status, 1);

    let missing = find_status_by_name(&pool, "dijual kembali")
        .await
        .expect("query");
    assert!(missing.is_none());

    assert_eq!(list_status(&pool).await.expect("list status").len(), 2);
}

#[sqlx::test(migrations = "../../migrations")]
async fn list_produk_applies_filters(pool: sqlx::PgPool) {
    apply_import(&pool, &sample_payload(), ImportMode::Commit).await;

    let all = list_produk(&pool, &ProdukFilter::default())
        .await
        .expect("list all");
    assert_eq!(
        all.iter().map(|p| p.id_produk).collect::<Vec<_>>(),
        vec![6, 9, 11]
    );

    let by_kategori = list_produk(
        &pool,
        &ProdukFilter {
            kategori_id: Some(1),
            status_id: None,
        },
    )
    .await
    .expect("list by kategori");
    assert_eq!(by_kategori.len(), 2);

    let both = list_produk(
        &pool,
        &ProdukFilter {
            kategori_id: Some(1),
            status_id: Some(2),
        },
    )
    .await
    .expect("list by both");
    assert_eq!(both.len(), 1);
    assert_eq!(both[0].nama_produk, "Pena");
}

#[sqlx::test(migrations = "../../migrations")]
async fn update_and_delete_produk(pool: sqlx::PgPool) {
    apply_import(&pool, &sample_payload(), ImportMode::Commit).await;

    let updated = update_produk(
        &pool,
        6,
        &ProdukWrite {
            nama_produk: "Kertas A4 80gsm".to_string(),
            harga: Decimal::new(13_500, 0),
            kategori_id: 2,
            status_id: 2,
        },
    )
    .await
    .expect("update");
    assert_eq!(updated.nama_produk, "Kertas A4 80gsm");
    assert_eq!(updated.nama_kategori, "L QUEENLY");

    delete_produk(&pool, 6).await.expect("delete");
    assert!(matches!(
        delete_produk(&pool, 6).await,
        Err(DbError::NotFound)
    ));
    assert!(matches!(
        update_produk(&pool, 6, &updated_write()).await,
        Err(DbError::NotFound)
    ));
}

fn updated_write() -> ProdukWrite {
    ProdukWrite {
        nama_produk: "Ghost".to_string(),
        harga: Decimal::ONE,
        kategori_id: 1,
        status_id: 1,
    }
}

// ---------------------------------------------------------------------------
// Section 3: import run history
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn import_run_lifecycle(pool: sqlx::PgPool) {
    let run = create_import_run(&pool, "cli", true)
        .await
        .expect("create_import_run");
    assert_eq!(run.status, "running");
    assert!(run.dry_run);

    let outcome = ImportOutcome::completed(
        ImportStats {
            kategori: counts(2, 0),
            status: counts(2, 0),
            produk: counts(3, 1),
        },
        ImportMode::DryRun,
    );
    finish_import_run(&pool, run.id, &outcome)
        .await
        .expect("finish_import_run");

    let finished = get_import_run(&pool, run.id).await.expect("get_import_run");
    assert_eq!(finished.status, "succeeded");
    assert_eq!(finished.message.as_deref(), Some(outcome.message.as_str()));
    assert_eq!(finished.stats["produk"]["skipped"], 1);
    assert!(finished.completed_at.is_some());

    let again = finish_import_run(&pool, run.id, &outcome).await;
    assert!(matches!(
        again,
        Err(DbError::InvalidImportRunTransition { expected_status: "running", .. })
    ));
}

#[sqlx::test(migrations = "../../migrations")]
async fn failed_outcome_marks_run_failed(pool: sqlx::PgPool) {
    let run = create_import_run(&pool, "scheduler", false)
        .await
        .expect("create_import_run");
    let outcome = ImportOutcome::failed(
        "API Error: Username salah",
        ImportStats::default(),
        ImportMode::Commit,
    );
    finish_import_run(&pool, run.id, &outcome)
        .await
        .expect("finish_import_run");

    let runs = list_import_runs(&pool, 10).await.expect("list_import_runs");
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].status, "failed");
    assert_eq!(runs[0].trigger_source, "scheduler");
}

#[sqlx::test(migrations = "../../migrations")]
async fn unknown_trigger_source_is_rejected(pool: sqlx::PgPool) {
    let result = create_import_run(&pool, "cron", false).await;
    assert!(matches!(result, Err(DbError::Sqlx(_))));
}
