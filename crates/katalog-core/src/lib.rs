pub mod app_config;
pub mod config;
pub mod lenient;
pub mod outcome;
pub mod payload;
pub mod screen;

use thiserror::Error;

pub use app_config::{AppConfig, Environment, FeedConfig};
pub use config::{load_app_config, load_app_config_from_env, load_feed_config};
pub use outcome::{EntityCounts, ImportMode, ImportOutcome, ImportStats};
pub use payload::{validate_payload, NamedItem, NormalizedPayload, ProdukItem, ShapeError};
pub use screen::{parse_price, NewNamed, NewProduk, SkipReason};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
