//! Product list, detail, and write handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use katalog_core::SkipReason;
use katalog_db::{ProdukFilter, ProdukWrite};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};

const MAX_NAME_CHARS: usize = 200;

// ---------------------------------------------------------------------------
// Query and bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(super) struct ProdukListQuery {
    pub kategori: Option<i64>,
    pub status: Option<i64>,
    pub show: Option<String>,
}

/// Every field is optional so that a missing one is reported as a
/// `validation_error` naming it.
#[derive(Debug, Deserialize)]
pub(super) struct ProdukRequest {
    pub nama_produk: Option<String>,
    pub harga: Option<Decimal>,
    pub kategori_id: Option<i64>,
    pub status_id: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ShowFilter {
    Sellable,
    All,
}

impl ShowFilter {
    /// Anything other than `all` means the sellable view.
    fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("all") => Self::All,
            _ => Self::Sellable,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Sellable => "bisa_dijual",
            Self::All => "all",
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct ProdukItem {
    id_produk: i64,
    nama_produk: String,
    harga: Decimal,
    kategori_id: i64,
    nama_kategori: String,
    status_id: i64,
    nama_status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<katalog_db::ProdukRow> for ProdukItem {
    fn from(row: katalog_db::ProdukRow) -> Self {
        Self {
            id_produk: row.id_produk,
            nama_produk: row.nama_produk,
            harga: row.harga,
            kategori_id: row.kategori_id,
            nama_kategori: row.nama_kategori,
            status_id: row.status_id,
            nama_status: row.nama_status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct ProdukList {
    show_filter: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    warning: Option<String>,
    produk: Vec<ProdukItem>,
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validation_error(req_id: &str, message: impl Into<String>) -> ApiError {
    ApiError::new(req_id, "validation_error", message)
}

fn validate_name(req_id: &str, raw: Option<&str>) -> Result<String, ApiError> {
    let name = raw.map(str::trim).unwrap_or_default();
    if name.is_empty() {
        return Err(validation_error(req_id, "nama_produk must not be blank"));
    }
    if name.chars().count() > MAX_NAME_CHARS {
        return Err(validation_error(
            req_id,
            format!("nama_produk must be at most {MAX_NAME_CHARS} characters"),
        ));
    }
    Ok(name.to_owned())
}

fn validate_harga(req_id: &str, raw: Option<Decimal>) -> Result<Decimal, ApiError> {
    let Some(harga) = raw else {
        return Err(validation_error(req_id, "harga is required"));
    };
    katalog_core::parse_price(&harga.to_string()).map_err(|reason| match reason {
        SkipReason::NegativePrice => validation_error(req_id, "harga must not be negative"),
        _ => validation_error(req_id, "harga is out of range"),
    })
}

async fn validate_request(
    state: &AppState,
    req_id: &str,
    body: &ProdukRequest,
) -> Result<ProdukWrite, ApiError> {
    let nama_produk = validate_name(req_id, body.nama_produk.as_deref())?;
    let harga = validate_harga(req_id, body.harga)?;

    let kategori_id = body
        .kategori_id
        .ok_or_else(|| validation_error(req_id, "kategori_id is required"))?;
    let status_id = body
        .status_id
        .ok_or_else(|| validation_error(req_id, "status_id is required"))?;

    let kategori_found = katalog_db::kategori_exists(&state.pool, kategori_id)
        .await
        .map_err(|e| map_db_error(req_id.to_owned(), &katalog_db::DbError::from(e)))?;
    if !kategori_found {
        return Err(validation_error(
            req_id,
            format!("kategori_id {kategori_id} does not exist"),
        ));
    }

    let status_found = katalog_db::status_exists(&state.pool, status_id)
        .await
        .map_err(|e| map_db_error(req_id.to_owned(), &katalog_db::DbError::from(e)))?;
    if !status_found {
        return Err(validation_error(
            req_id,
            format!("status_id {status_id} does not exist"),
        ));
    }

    Ok(ProdukWrite {
        nama_produk,
        harga,
        kategori_id,
        status_id,
    })
}

fn map_unique_violation(req_id: &str, e: &katalog_db::DbError) -> ApiError {
    if let katalog_db::DbError::Sqlx(sqlx::Error::Database(db_err)) = e {
        if db_err.code().as_deref() == Some("23505") {
            return ApiError::new(req_id, "conflict", "a product with that id already exists");
        }
    }
    map_db_error(req_id.to_owned(), e)
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/produk
///
/// An explicit `status` wins over `show`. Otherwise the sellable view filters
/// on the cached sellable status, and lists everything with a warning when
/// that status does not exist.
pub(super) async fn list_produk(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<ProdukListQuery>,
) -> Result<Json<ApiResponse<ProdukList>>, ApiError> {
    let show = ShowFilter::parse(query.show.as_deref());
    let mut filter = ProdukFilter {
        kategori_id: query.kategori,
        status_id: query.status,
    };
    let mut warning = None;

    if filter.status_id.is_none() && show == ShowFilter::Sellable {
        let sellable = state
            .status_cache
            .resolve(&state.pool)
            .await
            .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
        match sellable {
            Some(status) => filter.status_id = Some(status.id),
            None => {
                let name = state.status_cache.name();
                tracing::warn!(status = name, "sellable status missing, listing all products");
                warning = Some(format!(
                    "Status \"{name}\" tidak ditemukan. Menampilkan semua produk."
                ));
            }
        }
    }

    let rows = katalog_db::list_produk(&state.pool, &filter)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: ProdukList {
            show_filter: show.as_str(),
            warning,
            produk: rows.into_iter().map(ProdukItem::from).collect(),
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// GET /api/v1/produk/{id}
pub(super) async fn get_produk(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<ProdukItem>>, ApiError> {
    let row = katalog_db::get_produk(&state.pool, id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: row.into(),
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// POST /api/v1/produk
pub(super) async fn create_produk(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<ProdukRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ProdukItem>>), ApiError> {
    let rid = &req_id.0;
    let write = validate_request(&state, rid, &body).await?;

    let row = katalog_db::create_produk(&state.pool, &write)
        .await
        .map_err(|e| map_unique_violation(rid, &e))?;

    tracing::info!(id = row.id_produk, name = %row.nama_produk, "product created");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse {
            data: row.into(),
            meta: ResponseMeta::new(req_id.0),
        }),
    ))
}

/// PUT /api/v1/produk/{id}
pub(super) async fn update_produk(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<i64>,
    Json(body): Json<ProdukRequest>,
) -> Result<Json<ApiResponse<ProdukItem>>, ApiError> {
    let rid = &req_id.0;
    let write = validate_request(&state, rid, &body).await?;

    let row = katalog_db::update_produk(&state.pool, id, &write)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;

    tracing::info!(id, "product updated");

    Ok(Json(ApiResponse {
        data: row.into(),
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// DELETE /api/v1/produk/{id}
pub(super) async fn delete_produk(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    katalog_db::delete_produk(&state.pool, id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    tracing::info!(id, "product deleted");
    Ok(StatusCode::NO_CONTENT)
}
