//! End-to-end import runs.
//!
//! A remote run is fetch, normalize, apply. A JSON run is validate, apply.
//! Every run, whatever goes wrong, ends in an [`ImportOutcome`]. The
//! `*_tracked` variants also record the run in `import_runs`; history writes
//! are best-effort and never change the outcome.

use std::future::Future;

use katalog_core::{ImportMode, ImportOutcome, ImportStats, NormalizedPayload};
use katalog_fastprint::{normalize_feed, FastprintClient, FetchError};
use sqlx::PgPool;

/// Who started an import run. Stored in `import_runs.trigger_source`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerSource {
    Cli,
    Api,
    Scheduler,
}

impl TriggerSource {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cli => "cli",
            Self::Api => "api",
            Self::Scheduler => "scheduler",
        }
    }
}

impl std::fmt::Display for TriggerSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fetches the feed with today's credentials and applies it.
pub async fn run_remote_import(
    pool: &PgPool,
    client: &FastprintClient,
    mode: ImportMode,
) -> ImportOutcome {
    tracing::info!(dry_run = mode.is_dry_run(), "starting product import from remote feed");

    let envelope = match client.fetch().await {
        Ok(envelope) => envelope,
        Err(e) => return fetch_failure(&e, mode),
    };

    let payload = normalize_feed(&envelope);
    apply_logged(pool, &payload, mode).await
}

/// Validates an untyped payload and applies it. Shape errors fail the run
/// before a transaction is opened.
pub async fn run_json_import(
    pool: &PgPool,
    value: serde_json::Value,
    mode: ImportMode,
) -> ImportOutcome {
    match NormalizedPayload::from_json(value) {
        Ok(payload) => apply_logged(pool, &payload, mode).await,
        Err(e) => {
            tracing::warn!(error = %e, "import payload rejected");
            ImportOutcome::failed(e.to_string(), ImportStats::default(), mode)
        }
    }
}

pub async fn run_remote_import_tracked(
    pool: &PgPool,
    client: &FastprintClient,
    trigger: TriggerSource,
    mode: ImportMode,
) -> ImportOutcome {
    track(pool, trigger, mode, run_remote_import(pool, client, mode)).await
}

pub async fn run_json_import_tracked(
    pool: &PgPool,
    value: serde_json::Value,
    trigger: TriggerSource,
    mode: ImportMode,
) -> ImportOutcome {
    track(pool, trigger, mode, run_json_import(pool, value, mode)).await
}

async fn apply_logged(
    pool: &PgPool,
    payload: &NormalizedPayload,
    mode: ImportMode,
) -> ImportOutcome {
    tracing::info!(
        kategori = payload.kategori.len(),
        status = payload.status.len(),
        produk = payload.produk.len(),
        "applying import payload"
    );
    katalog_db::apply_import(pool, payload, mode).await
}

fn fetch_failure(error: &FetchError, mode: ImportMode) -> ImportOutcome {
    let message = match error {
        FetchError::Api(_) => error.to_string(),
        _ => format!("Failed to fetch data from API: {error}"),
    };
    tracing::error!(error = %error, "product feed fetch failed");
    ImportOutcome::failed(message, ImportStats::default(), mode)
}

async fn track<F>(pool: &PgPool, trigger: TriggerSource, mode: ImportMode, run: F) -> ImportOutcome
where
    F: Future<Output = ImportOutcome>,
{
    let run_id = match katalog_db::create_import_run(pool, trigger.as_str(), mode.is_dry_run())
        .await
    {
        Ok(row) => Some(row.id),
        Err(e) => {
            tracing::warn!(error = %e, %trigger, "could not record import run start");
            None
        }
    };

    let outcome = run.await;

    if let Some(id) = run_id {
        if let Err(e) = katalog_db::finish_import_run(pool, id, &outcome).await {
            tracing::warn!(run_id = id, error = %e, "could not record import run result");
        }
    }

    outcome
}
