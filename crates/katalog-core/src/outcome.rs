use serde::{Deserialize, Serialize};

/// Whether an import run keeps its writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportMode {
    #[default]
    Commit,
    /// Performs every check and insert, then rolls back.
    DryRun,
}

impl ImportMode {
    #[must_use]
    pub fn from_dry_run(dry_run: bool) -> Self {
        if dry_run {
            Self::DryRun
        } else {
            Self::Commit
        }
    }

    #[must_use]
    pub fn is_dry_run(self) -> bool {
        matches!(self, Self::DryRun)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityCounts {
    pub created: u32,
    pub skipped: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportStats {
    pub kategori: EntityCounts,
    pub status: EntityCounts,
    pub produk: EntityCounts,
}

impl ImportStats {
    #[must_use]
    pub fn total_created(&self) -> u32 {
        self.kategori.created + self.status.created + self.produk.created
    }

    #[must_use]
    pub fn total_skipped(&self) -> u32 {
        self.kategori.skipped + self.status.skipped + self.produk.skipped
    }
}

/// Result of one import run. Every entry point returns one of these,
/// including runs that failed before touching the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportOutcome {
    pub succeeded: bool,
    pub message: String,
    pub dry_run: bool,
    /// On failure these are the counts reached before the error and were not
    /// persisted.
    pub stats: ImportStats,
}

impl ImportOutcome {
    #[must_use]
    pub fn completed(stats: ImportStats, mode: ImportMode) -> Self {
        let breakdown = format!(
            "(Kategori: {}, Status: {}, Produk: {})",
            stats.kategori.created, stats.status.created, stats.produk.created
        );
        let message = match mode {
            ImportMode::Commit => format!(
                "Import successful. Created {} records {breakdown}",
                stats.total_created()
            ),
            ImportMode::DryRun => format!(
                "Dry run complete. Would create {} records {breakdown}",
                stats.total_created()
            ),
        };

        Self {
            succeeded: true,
            message,
            dry_run: mode.is_dry_run(),
            stats,
        }
    }

    /// `reason` is used verbatim as the message.
    #[must_use]
    pub fn failed(reason: impl Into<String>, stats: ImportStats, mode: ImportMode) -> Self {
        Self {
            succeeded: false,
            message: reason.into(),
            dry_run: mode.is_dry_run(),
            stats,
        }
    }
}
