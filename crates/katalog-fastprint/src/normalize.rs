//! Normalization from the flat feed records to a [`NormalizedPayload`].
//!
//! The feed names categories and statuses instead of referencing them by id,
//! so ids are synthesized here in first-seen order. They are stable within a
//! single run over a single response only.

use std::collections::HashMap;

use katalog_core::{NamedItem, NormalizedPayload, ProdukItem};

use crate::types::{ApiEnvelope, RawProduct};

/// Insertion-ordered name → id registry. Ids start at 1.
#[derive(Debug, Default)]
struct NameRegistry {
    names: Vec<String>,
    ids: HashMap<String, i64>,
}

impl NameRegistry {
    fn register(&mut self, name: &str) -> i64 {
        if let Some(&id) = self.ids.get(name) {
            return id;
        }
        self.names.push(name.to_string());
        let id = i64::try_from(self.names.len()).unwrap_or(i64::MAX);
        self.ids.insert(name.to_string(), id);
        id
    }

    fn into_items(self) -> Vec<NamedItem> {
        self.names
            .into_iter()
            .zip(1_i64..)
            .map(|(name, id)| NamedItem::new(id, name))
            .collect()
    }
}

/// Splits the feed into deduplicated category, status, and product lists.
///
/// Records with a blank category or status are dropped without registering
/// either name. Records whose `id_produk` is not an integer are dropped after
/// their names have been registered.
#[must_use]
pub fn normalize_feed(envelope: &ApiEnvelope) -> NormalizedPayload {
    let mut kategori = NameRegistry::default();
    let mut status = NameRegistry::default();
    let mut produk = Vec::with_capacity(envelope.data.len());

    for record in &envelope.data {
        let (Some(kategori_name), Some(status_name)) = (
            trimmed(record.kategori.as_deref()),
            trimmed(record.status.as_deref()),
        ) else {
            tracing::debug!(
                id_produk = ?record.id_produk,
                "record without kategori or status dropped"
            );
            continue;
        };

        let category_id = kategori.register(kategori_name);
        let status_id = status.register(status_name);

        let Some(id) = parse_id(record) else {
            tracing::debug!(id_produk = ?record.id_produk, "record with unparseable id dropped");
            continue;
        };

        produk.push(ProdukItem {
            id: Some(id),
            name: record.nama_produk.as_deref().map(|n| n.trim().to_string()),
            price: record.harga.clone(),
            category_id: Some(category_id),
            status_id: Some(status_id),
        });
    }

    let payload = NormalizedPayload {
        kategori: kategori.into_items(),
        status: status.into_items(),
        produk,
    };
    tracing::info!(
        kategori = payload.kategori.len(),
        status = payload.status.len(),
        produk = payload.produk.len(),
        "feed normalized"
    );
    payload
}

fn trimmed(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn parse_id(record: &RawProduct) -> Option<i64> {
    record.id_produk.as_deref()?.trim().parse::<i64>().ok()
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
