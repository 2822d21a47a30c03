//! Import, preview, and credential command handlers for the CLI.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::Context;
use chrono::{Local, NaiveDate};
use katalog_core::{AppConfig, FeedConfig, ImportMode, ImportOutcome};
use katalog_fastprint::{Credentials, FastprintClient};
use katalog_import::{run_json_import_tracked, run_remote_import_tracked, TriggerSource};

const RULE_WIDTH: usize = 50;

/// Runs a tracked import from the remote feed, or from `file` when given,
/// and prints the report.
///
/// # Errors
///
/// Returns an error if the payload file cannot be read or parsed, the feed
/// client cannot be built, or the import itself did not succeed.
pub(crate) async fn run_import(
    pool: &sqlx::PgPool,
    config: &AppConfig,
    dry_run: bool,
    file: Option<&Path>,
) -> anyhow::Result<()> {
    let mode = ImportMode::from_dry_run(dry_run);

    println!("Starting product import...");
    println!("{}", "-".repeat(RULE_WIDTH));

    let outcome = match file {
        Some(path) => {
            let raw = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("failed to read {}", path.display()))?;
            let value: serde_json::Value = serde_json::from_str(&raw)
                .with_context(|| format!("{} is not valid JSON", path.display()))?;
            run_json_import_tracked(pool, value, TriggerSource::Cli, mode).await
        }
        None => {
            let client = FastprintClient::from_config(config)?;
            run_remote_import_tracked(pool, &client, TriggerSource::Cli, mode).await
        }
    };

    print!("{}", format_report(&outcome));

    if !outcome.succeeded {
        tracing::error!(
            dry_run = outcome.dry_run,
            message = %outcome.message,
            "import failed"
        );
        anyhow::bail!("import failed");
    }
    tracing::info!(
        dry_run = outcome.dry_run,
        kategori = outcome.stats.kategori.created,
        status = outcome.stats.status.created,
        produk = outcome.stats.produk.created,
        skipped = outcome.stats.produk.skipped,
        "import finished"
    );
    Ok(())
}

/// Renders an outcome the way the import command prints it.
pub(crate) fn format_report(outcome: &ImportOutcome) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", "-".repeat(RULE_WIDTH));

    if !outcome.succeeded {
        let _ = writeln!(out, "\u{2717} {}", outcome.message);
        return out;
    }

    let stats = &outcome.stats;
    let _ = writeln!(out, "\u{2713} {}", outcome.message);
    let _ = writeln!(out);
    let _ = writeln!(out, "Statistics:");
    let _ = writeln!(
        out,
        "  Kategori: {} created, {} skipped",
        stats.kategori.created, stats.kategori.skipped
    );
    let _ = writeln!(
        out,
        "  Status:   {} created, {} skipped",
        stats.status.created, stats.status.skipped
    );
    let _ = writeln!(
        out,
        "  Produk:   {} created, {} skipped",
        stats.produk.created, stats.produk.skipped
    );
    let _ = writeln!(out);
    if outcome.dry_run {
        let _ = writeln!(out, "Dry run complete, no changes were saved.");
    } else {
        let _ = writeln!(out, "Import completed successfully!");
    }
    out
}

pub(crate) fn print_credentials(date: Option<NaiveDate>) {
    let date = date.unwrap_or_else(|| Local::now().date_naive());
    let credentials = Credentials::for_date(date);
    println!("Credentials for {}:", date.format("%Y-%m-%d"));
    println!("  Username: {}", credentials.username);
    println!("  Password: {}", credentials.password);
}

/// Fetches the feed and prints its version, size, and first `limit` records.
///
/// # Errors
///
/// Returns an error if the client cannot be built or the fetch fails.
pub(crate) async fn run_preview(config: &FeedConfig, limit: usize) -> anyhow::Result<()> {
    let client = FastprintClient::from_feed_config(config)?;
    let envelope = client.fetch().await.map_err(|e| {
        tracing::error!(endpoint = %client.endpoint(), error = %e, "preview fetch failed");
        anyhow::Error::new(e).context("failed to fetch data from API")
    })?;
    tracing::info!(
        endpoint = %client.endpoint(),
        version = envelope.version.as_deref().unwrap_or("-"),
        records = envelope.data.len(),
        "preview fetched"
    );

    println!("API Version: {}", envelope.version.as_deref().unwrap_or("-"));
    println!("Total Products: {}", envelope.data.len());

    for (i, record) in envelope.data.iter().take(limit).enumerate() {
        let field = |v: Option<&str>| v.unwrap_or("N/A").to_string();
        println!();
        println!("  {}. {}", i + 1, field(record.nama_produk.as_deref()));
        println!("     ID: {}", field(record.id_produk.as_deref()));
        println!("     Kategori: {}", field(record.kategori.as_deref()));
        println!("     Harga: Rp {}", field(record.harga.as_deref()));
        println!("     Status: {}", field(record.status.as_deref()));
    }

    Ok(())
}
