use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Serialize)]
pub(super) struct StatusItem {
    id_status: i64,
    nama_status: String,
    created_at: DateTime<Utc>,
}

impl From<katalog_db::StatusRow> for StatusItem {
    fn from(row: katalog_db::StatusRow) -> Self {
        Self {
            id_status: row.id_status,
            nama_status: row.nama_status,
            created_at: row.created_at,
        }
    }
}

pub(super) async fn list_status(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<StatusItem>>>, ApiError> {
    let rows = katalog_db::list_status(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: rows.into_iter().map(StatusItem::from).collect(),
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn get_status(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<StatusItem>>, ApiError> {
    let row = katalog_db::get_status(&state.pool, id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: row.into(),
        meta: ResponseMeta::new(req_id.0),
    }))
}
