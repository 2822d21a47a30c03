//! Import triggers and run history.

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use katalog_core::{ImportMode, ImportOutcome};
use katalog_import::{run_json_import_tracked, run_remote_import_tracked, TriggerSource};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::middleware::RequestId;

use super::{map_db_error, normalize_limit, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Default, Deserialize)]
pub(super) struct ImportQuery {
    pub dry_run: Option<bool>,
}

impl ImportQuery {
    fn mode(&self) -> ImportMode {
        ImportMode::from_dry_run(self.dry_run.unwrap_or(false))
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct ImportRunsQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub(super) struct ImportRunItem {
    import_run_id: Uuid,
    trigger_source: String,
    dry_run: bool,
    status: String,
    message: Option<String>,
    stats: serde_json::Value,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

/// POST /api/v1/produk/import
pub(super) async fn import_remote(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<ImportQuery>,
) -> Result<Json<ApiResponse<ImportOutcome>>, ApiError> {
    let mode = query.mode();
    let outcome = run_remote_import_tracked(&state.pool, &state.client, TriggerSource::Api, mode)
        .await;
    finish(&state, req_id, mode, outcome).await
}

/// POST /api/v1/import
///
/// Body is a normalized payload with `kategori`, `status` and `produk` lists.
pub(super) async fn import_payload(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<ImportQuery>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<ApiResponse<ImportOutcome>>, ApiError> {
    let mode = query.mode();
    let outcome = run_json_import_tracked(&state.pool, body, TriggerSource::Api, mode).await;
    finish(&state, req_id, mode, outcome).await
}

async fn finish(
    state: &AppState,
    req_id: RequestId,
    mode: ImportMode,
    outcome: ImportOutcome,
) -> Result<Json<ApiResponse<ImportOutcome>>, ApiError> {
    if !outcome.succeeded {
        return Err(ApiError::new(req_id.0, "import_failed", outcome.message));
    }

    if !mode.is_dry_run() {
        state.status_cache.invalidate().await;
    }

    Ok(Json(ApiResponse {
        data: outcome,
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// GET /api/v1/import-runs
pub(super) async fn list_import_runs(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<ImportRunsQuery>,
) -> Result<Json<ApiResponse<Vec<ImportRunItem>>>, ApiError> {
    let rows = katalog_db::list_import_runs(&state.pool, normalize_limit(query.limit))
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = rows
        .into_iter()
        .map(|row| ImportRunItem {
            import_run_id: row.public_id,
            trigger_source: row.trigger_source,
            dry_run: row.dry_run,
            status: row.status,
            message: row.message,
            stats: row.stats,
            started_at: row.started_at,
            completed_at: row.completed_at,
            created_at: row.created_at,
        })
        .collect();

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}
