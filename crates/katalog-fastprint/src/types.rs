//! Fastprint feed response types.
//!
//! The feed answers every request with a flat envelope:
//! `{"error": 0, "version": "...", "data": [...]}` on success and
//! `{"error": 1, "ket": "..."}` on failure. Record fields arrive as strings,
//! so everything is kept as raw text and interpreted by the normalizer.

use katalog_core::lenient;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ApiEnvelope {
    #[serde(default, deserialize_with = "lenient::int_or_numeric_string")]
    pub error: Option<i64>,
    #[serde(default, deserialize_with = "lenient::text_or_number")]
    pub version: Option<String>,
    /// Human-readable status text; the error message when `error == 1`.
    #[serde(default, deserialize_with = "lenient::text_or_number")]
    pub ket: Option<String>,
    #[serde(default)]
    pub data: Vec<RawProduct>,
}

impl ApiEnvelope {
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.error == Some(1)
    }
}

/// One product record exactly as the feed sent it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct RawProduct {
    #[serde(default, deserialize_with = "lenient::text_or_number")]
    pub id_produk: Option<String>,
    #[serde(default, deserialize_with = "lenient::text_or_number")]
    pub nama_produk: Option<String>,
    /// Category name, not an id.
    #[serde(default, deserialize_with = "lenient::text_or_number")]
    pub kategori: Option<String>,
    #[serde(default, deserialize_with = "lenient::text_or_number")]
    pub harga: Option<String>,
    /// Status name, not an id.
    #[serde(default, deserialize_with = "lenient::text_or_number")]
    pub status: Option<String>,
}
