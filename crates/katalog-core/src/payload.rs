//! The normalized import payload and its shape validation.
//!
//! A payload carries three lists (`kategori`, `status`, `produk`). It is
//! produced by the feed normalizer or supplied as raw JSON (file or HTTP
//! body). Raw JSON goes through [`validate_payload`] before anything touches
//! the database; individual entries are decoded leniently so that a bad field
//! becomes a per-item skip rather than a rejected document.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::lenient;

/// The three top-level keys every payload must carry, in processing order.
pub const PAYLOAD_KEYS: [&str; 3] = ["kategori", "status", "produk"];

/// Structural problems with a raw payload.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ShapeError {
    #[error("Data must be a dictionary")]
    NotAnObject,

    #[error("Missing required key: '{0}'")]
    MissingKey(&'static str),

    #[error("'{0}' must be a list")]
    NotAList(&'static str),

    #[error("malformed entry in '{key}': {reason}")]
    MalformedEntry { key: &'static str, reason: String },
}

/// A category or status entry.
///
/// Accepts both the English keys and the table column names
/// (`id_kategori`/`nama_kategori`, `id_status`/`nama_status`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedItem {
    #[serde(
        default,
        alias = "id_kategori",
        alias = "id_status",
        deserialize_with = "lenient::int_or_numeric_string"
    )]
    pub id: Option<i64>,
    #[serde(
        default,
        alias = "nama_kategori",
        alias = "nama_status",
        deserialize_with = "lenient::text_or_number"
    )]
    pub name: Option<String>,
}

impl NamedItem {
    #[must_use]
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            name: Some(name.into()),
        }
    }
}

/// A product entry referencing a category and a status by id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProdukItem {
    #[serde(
        default,
        alias = "id_produk",
        deserialize_with = "lenient::int_or_numeric_string"
    )]
    pub id: Option<i64>,
    #[serde(
        default,
        alias = "nama_produk",
        deserialize_with = "lenient::text_or_number"
    )]
    pub name: Option<String>,
    /// Raw price token, coerced to a decimal only when the item is applied.
    #[serde(
        default,
        alias = "harga",
        deserialize_with = "lenient::text_or_number"
    )]
    pub price: Option<String>,
    #[serde(
        default,
        alias = "kategori_id",
        deserialize_with = "lenient::int_or_numeric_string"
    )]
    pub category_id: Option<i64>,
    #[serde(default, deserialize_with = "lenient::int_or_numeric_string")]
    pub status_id: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedPayload {
    pub kategori: Vec<NamedItem>,
    pub status: Vec<NamedItem>,
    pub produk: Vec<ProdukItem>,
}

impl NormalizedPayload {
    /// Validates the shape of `value` and decodes it.
    ///
    /// # Errors
    ///
    /// Returns the first [`ShapeError`] found by [`validate_payload`], or
    /// [`ShapeError::MalformedEntry`] if a list element is not an object.
    pub fn from_json(value: Value) -> Result<Self, ShapeError> {
        validate_payload(&value)?;
        let Value::Object(mut map) = value else {
            return Err(ShapeError::NotAnObject);
        };

        Ok(Self {
            kategori: take_list(&mut map, "kategori")?,
            status: take_list(&mut map, "status")?,
            produk: take_list(&mut map, "produk")?,
        })
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.kategori.is_empty() && self.status.is_empty() && self.produk.is_empty()
    }
}

/// Checks that `value` is an object holding `kategori`, `status`, and
/// `produk` arrays. Entries themselves are not inspected.
///
/// # Errors
///
/// Returns [`ShapeError::NotAnObject`], [`ShapeError::MissingKey`], or
/// [`ShapeError::NotAList`] naming the first offending key.
pub fn validate_payload(value: &Value) -> Result<(), ShapeError> {
    let Some(map) = value.as_object() else {
        return Err(ShapeError::NotAnObject);
    };

    for key in PAYLOAD_KEYS {
        match map.get(key) {
            None => return Err(ShapeError::MissingKey(key)),
            Some(list) if !list.is_array() => return Err(ShapeError::NotAList(key)),
            Some(_) => {}
        }
    }

    Ok(())
}

fn take_list<T: DeserializeOwned>(
    map: &mut Map<String, Value>,
    key: &'static str,
) -> Result<Vec<T>, ShapeError> {
    let raw = map.remove(key).ok_or(ShapeError::MissingKey(key))?;
    serde_json::from_value(raw).map_err(|e| ShapeError::MalformedEntry {
        key,
        reason: e.to_string(),
    })
}
