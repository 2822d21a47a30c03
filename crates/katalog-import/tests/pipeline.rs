//! End-to-end import tests: wiremock stands in for the feed and
//! `#[sqlx::test]` provides a fresh migrated database per test.

use katalog_core::{EntityCounts, ImportMode};
use katalog_fastprint::FastprintClient;
use katalog_import::{
    run_json_import, run_json_import_tracked, run_remote_import, run_remote_import_tracked,
    TriggerSource,
};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const FEED_PATH: &str = "/tes/api_tes_programmer";

fn feed_client(server: &MockServer) -> FastprintClient {
    FastprintClient::with_base_url(
        &format!("{}{FEED_PATH}", server.uri()),
        5,
        "katalog-test/0.1",
    )
    .expect("client construction should not fail")
}

fn feed_body() -> serde_json::Value {
    serde_json::json!({
        "error": 0,
        "version": "200623.0.1",
        "data": [
            {"id_produk": "6", "nama_produk": "Kertas A4", "kategori": "ATK",
             "harga": "12500", "status": "bisa dijual"},
            {"id_produk": "9", "nama_produk": "Tinta Hitam", "kategori": "ATK",
             "harga": "abc", "status": "bisa dijual"},
            {"id_produk": "10", "nama_produk": "Spidol", "kategori": "",
             "harga": "7000", "status": "habis"},
            {"id_produk": "11", "nama_produk": "Pena", "kategori": "ALAT TULIS",
             "harga": "3000", "status": "tidak bisa dijual"}
        ]
    })
}

async fn mount_feed(server: &MockServer, body: serde_json::Value) {
    Mock::given(method("POST"))
        .and(path(FEED_PATH))
        .and(body_string_contains("username=tesprogrammer"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

async fn count(pool: &sqlx::PgPool, table: &str) -> i64 {
    sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(pool)
        .await
        .unwrap_or_else(|e| panic!("count {table} failed: {e}"))
}

#[sqlx::test(migrations = "../../migrations")]
async fn remote_import_applies_normalized_feed(pool: sqlx::PgPool) {
    let server = MockServer::start().await;
    mount_feed(&server, feed_body()).await;

    let outcome = run_remote_import(&pool, &feed_client(&server), ImportMode::Commit).await;

    assert!(outcome.succeeded, "import failed: {}", outcome.message);
    assert_eq!(
        outcome.message,
        "Import successful. Created 6 records (Kategori: 2, Status: 2, Produk: 2)"
    );
    assert_eq!(
        outcome.stats.produk,
        EntityCounts {
            created: 2,
            skipped: 1
        }
    );
    assert_eq!(count(&pool, "produk").await, 2);

    let rerun = run_remote_import(&pool, &feed_client(&server), ImportMode::Commit).await;
    assert!(rerun.succeeded);
    assert_eq!(rerun.stats.total_created(), 0);
}

#[sqlx::test(migrations = "../../migrations")]
async fn remote_api_error_fails_without_writing(pool: sqlx::PgPool) {
    let server = MockServer::start().await;
    mount_feed(
        &server,
        serde_json::json!({"error": 1, "ket": "Username atau password salah"}),
    )
    .await;

    let outcome = run_remote_import(&pool, &feed_client(&server), ImportMode::Commit).await;

    assert!(!outcome.succeeded);
    assert_eq!(outcome.message, "API Error: Username atau password salah");
    assert_eq!(count(&pool, "kategori").await, 0);
}

#[sqlx::test(migrations = "../../migrations")]
async fn remote_http_failure_is_reported(pool: sqlx::PgPool) {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(FEED_PATH))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let outcome = run_remote_import(&pool, &feed_client(&server), ImportMode::Commit).await;

    assert!(!outcome.succeeded);
    assert!(
        outcome.message.starts_with("Failed to fetch data from API: "),
        "unexpected message: {}",
        outcome.message
    );
}

#[sqlx::test(migrations = "../../migrations")]
async fn json_import_rejects_missing_key(pool: sqlx::PgPool) {
    let outcome = run_json_import(
        &pool,
        serde_json::json!({"kategori": [], "status": []}),
        ImportMode::Commit,
    )
    .await;

    assert!(!outcome.succeeded);
    assert_eq!(outcome.message, "Missing required key: 'produk'");
    assert_eq!(outcome.stats.total_created(), 0);
}

#[sqlx::test(migrations = "../../migrations")]
async fn json_import_accepts_table_column_names(pool: sqlx::PgPool) {
    let outcome = run_json_import(
        &pool,
        serde_json::json!({
            "kategori": [{"id_kategori": 1, "nama_kategori": "ATK"}],
            "status": [{"id_status": 1, "nama_status": "bisa dijual"}],
            "produk": [{"id_produk": 6, "nama_produk": "Kertas A4", "harga": "12500",
                        "kategori_id": 1, "status_id": 1}]
        }),
        ImportMode::Commit,
    )
    .await;

    assert!(outcome.succeeded, "import failed: {}", outcome.message);
    assert_eq!(outcome.stats.total_created(), 3);
}

#[sqlx::test(migrations = "../../migrations")]
async fn tracked_run_is_recorded(pool: sqlx::PgPool) {
    let server = MockServer::start().await;
    mount_feed(&server, feed_body()).await;

    let outcome = run_remote_import_tracked(
        &pool,
        &feed_client(&server),
        TriggerSource::Cli,
        ImportMode::DryRun,
    )
    .await;
    assert!(outcome.succeeded, "dry run failed: {}", outcome.message);
    assert_eq!(count(&pool, "produk").await, 0);

    let failed = run_json_import_tracked(
        &pool,
        serde_json::json!([]),
        TriggerSource::Api,
        ImportMode::Commit,
    )
    .await;
    assert_eq!(failed.message, "Data must be a dictionary");

    let runs = katalog_db::list_import_runs(&pool, 10)
        .await
        .expect("list_import_runs");
    assert_eq!(runs.len(), 2);

    let api_run = runs
        .iter()
        .find(|r| r.trigger_source == "api")
        .expect("api run recorded");
    assert_eq!(api_run.status, "failed");

    let cli_run = runs
        .iter()
        .find(|r| r.trigger_source == "cli")
        .expect("cli run recorded");
    assert_eq!(cli_run.status, "succeeded");
    assert!(cli_run.dry_run);
    assert_eq!(cli_run.stats["produk"]["created"], 2);
}
