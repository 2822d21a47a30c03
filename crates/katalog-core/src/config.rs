use crate::app_config::{AppConfig, Environment, FeedConfig};
use crate::ConfigError;

pub const DEFAULT_API_BASE_URL: &str = "https://recruitment.fastprint.co.id/tes/api_tes_programmer";
pub const DEFAULT_API_USER_AGENT: &str = "katalog/0.1 (product-sync)";
pub const DEFAULT_IMPORT_CRON: &str = "0 0 1 * * *";
pub const DEFAULT_SELLABLE_STATUS: &str = "bisa dijual";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Load only the feed settings, for commands that never touch the database.
///
/// Calls `dotenvy::dotenv().ok()` first, like [`load_app_config`].
/// `DATABASE_URL` is not read.
///
/// # Errors
///
/// Returns `ConfigError` if a feed setting is present but invalid.
pub fn load_feed_config() -> Result<FeedConfig, ConfigError> {
    dotenvy::dotenv().ok();
    build_feed_config(&|key: &str| std::env::var(key))
}

fn build_feed_config<F>(lookup: &F) -> Result<FeedConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let raw_timeout = or_default("KATALOG_API_TIMEOUT_SECS", "30");
    let api_timeout_secs = raw_timeout
        .parse::<u64>()
        .map_err(|e| ConfigError::InvalidEnvVar {
            var: "KATALOG_API_TIMEOUT_SECS".to_string(),
            reason: e.to_string(),
        })?;

    Ok(FeedConfig {
        log_level: or_default("KATALOG_LOG_LEVEL", "info"),
        api_base_url: or_default("KATALOG_API_BASE_URL", DEFAULT_API_BASE_URL),
        api_timeout_secs,
        api_user_agent: or_default("KATALOG_API_USER_AGENT", DEFAULT_API_USER_AGENT),
    })
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so tests can drive it with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let database_url = require("DATABASE_URL")?;
    let env = parse_environment(&or_default("KATALOG_ENV", "development"))?;

    let bind_addr = parse_addr("KATALOG_BIND_ADDR", "0.0.0.0:3000")?;
    let FeedConfig {
        log_level,
        api_base_url,
        api_timeout_secs,
        api_user_agent,
    } = build_feed_config(&lookup)?;

    let db_max_connections = parse_u32("KATALOG_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("KATALOG_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("KATALOG_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let import_cron = parse_cron(&or_default("KATALOG_IMPORT_CRON", DEFAULT_IMPORT_CRON));
    let sellable_status_name = or_default("KATALOG_SELLABLE_STATUS", DEFAULT_SELLABLE_STATUS)
        .trim()
        .to_string();
    if sellable_status_name.is_empty() {
        return Err(ConfigError::InvalidEnvVar {
            var: "KATALOG_SELLABLE_STATUS".to_string(),
            reason: "must not be blank".to_string(),
        });
    }
    let status_cache_ttl_secs = parse_u64("KATALOG_STATUS_CACHE_TTL_SECS", "3600")?;

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        api_base_url,
        api_timeout_secs,
        api_user_agent,
        import_cron,
        sellable_status_name,
        status_cache_ttl_secs,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` for anything other than
/// `development`, `test`, or `production`.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "KATALOG_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

/// `off` (any case) or a blank value disables the scheduled import.
fn parse_cron(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("off") {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
