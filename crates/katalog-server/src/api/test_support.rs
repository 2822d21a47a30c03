//! Helpers shared by the router tests.

use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request},
    response::Response,
    Router,
};
use katalog_fastprint::FastprintClient;
use tower::ServiceExt;

use super::AppState;
use crate::cache::StatusCache;

/// State whose feed client points at nothing; for routes that never fetch.
pub(crate) fn test_state(pool: sqlx::PgPool) -> AppState {
    state_with_feed(pool, "http://127.0.0.1:9/tes/api_tes_programmer")
}

pub(crate) fn state_with_feed(pool: sqlx::PgPool, feed_url: &str) -> AppState {
    AppState {
        pool,
        client: FastprintClient::with_base_url(feed_url, 5, "katalog-test/0.1")
            .expect("client construction should not fail"),
        status_cache: StatusCache::new("bisa dijual", Duration::from_secs(60)),
    }
}

pub(crate) fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

pub(crate) fn json_request(method: Method, uri: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

pub(crate) async fn call(app: Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.expect("response")
}

pub(crate) async fn body_json(response: Response) -> serde_json::Value {
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    serde_json::from_slice(&body).expect("json parse")
}

pub(crate) async fn seed_catalog(pool: &sqlx::PgPool) {
    sqlx::query(
        "INSERT INTO kategori (id_kategori, nama_kategori) VALUES (1, 'ATK'), (2, 'ALAT TULIS')",
    )
    .execute(pool)
    .await
    .expect("insert kategori");
    sqlx::query(
        "INSERT INTO status (id_status, nama_status) \
         VALUES (1, 'bisa dijual'), (2, 'tidak bisa dijual')",
    )
    .execute(pool)
    .await
    .expect("insert status");
    sqlx::query(
        "INSERT INTO produk (id_produk, nama_produk, harga, kategori_id, status_id) \
         VALUES (6, 'Kertas A4', 12500, 1, 1), (11, 'Pena', 3000, 2, 2)",
    )
    .execute(pool)
    .await
    .expect("insert produk");
}
