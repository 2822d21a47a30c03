//! In-process cache for the status the product list treats as sellable.
//!
//! Only hits are stored. An absent status is looked up again on every call so
//! that it is picked up as soon as an import creates it.

use std::sync::Arc;
use std::time::{Duration, Instant};

use katalog_core::AppConfig;
use katalog_db::DbError;
use sqlx::PgPool;
use tokio::sync::RwLock;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SellableStatus {
    pub id: i64,
    pub name: String,
}

#[derive(Debug)]
struct Entry {
    status: SellableStatus,
    stored_at: Instant,
}

#[derive(Debug, Clone)]
pub struct StatusCache {
    name: Arc<str>,
    ttl: Duration,
    slot: Arc<RwLock<Option<Entry>>>,
}

impl StatusCache {
    pub fn new(name: impl Into<String>, ttl: Duration) -> Self {
        Self {
            name: Arc::from(name.into()),
            ttl,
            slot: Arc::new(RwLock::new(None)),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            config.sellable_status_name.clone(),
            Duration::from_secs(config.status_cache_ttl_secs),
        )
    }

    /// The status name this cache resolves.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the stored status if it has not outlived the TTL.
    pub async fn cached(&self) -> Option<SellableStatus> {
        let slot = self.slot.read().await;
        slot.as_ref()
            .filter(|entry| entry.stored_at.elapsed() < self.ttl)
            .map(|entry| entry.status.clone())
    }

    pub async fn store(&self, status: SellableStatus) {
        *self.slot.write().await = Some(Entry {
            status,
            stored_at: Instant::now(),
        });
    }

    pub async fn invalidate(&self) {
        if self.slot.write().await.take().is_some() {
            tracing::debug!(name = %self.name, "sellable status cache invalidated");
        }
    }

    /// Returns the sellable status, from the cache when fresh, otherwise from
    /// the database. `Ok(None)` means no status with that name exists.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the lookup query fails.
    pub async fn resolve(&self, pool: &PgPool) -> Result<Option<SellableStatus>, DbError> {
        if let Some(status) = self.cached().await {
            return Ok(Some(status));
        }

        let Some(row) = katalog_db::find_status_by_name(pool, &self.name).await? else {
            tracing::debug!(name = %self.name, "sellable status not found");
            return Ok(None);
        };

        let status = SellableStatus {
            id: row.id_status,
            name: row.nama_status,
        };
        self.store(status.clone()).await;
        Ok(Some(status))
    }
}
