use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Serialize)]
pub(super) struct KategoriItem {
    id_kategori: i64,
    nama_kategori: String,
    created_at: DateTime<Utc>,
}

impl From<katalog_db::KategoriRow> for KategoriItem {
    fn from(row: katalog_db::KategoriRow) -> Self {
        Self {
            id_kategori: row.id_kategori,
            nama_kategori: row.nama_kategori,
            created_at: row.created_at,
        }
    }
}

pub(super) async fn list_kategori(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<KategoriItem>>>, ApiError> {
    let rows = katalog_db::list_kategori(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: rows.into_iter().map(KategoriItem::from).collect(),
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn get_kategori(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<KategoriItem>>, ApiError> {
    let row = katalog_db::get_kategori(&state.pool, id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: row.into(),
        meta: ResponseMeta::new(req_id.0),
    }))
}
