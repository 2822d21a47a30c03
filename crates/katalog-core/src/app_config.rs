use std::net::SocketAddr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Settings needed to reach the remote feed, without any database settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedConfig {
    pub log_level: String,
    pub api_base_url: String,
    pub api_timeout_secs: u64,
    pub api_user_agent: String,
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    /// Full URL of the remote product feed endpoint.
    pub api_base_url: String,
    pub api_timeout_secs: u64,
    pub api_user_agent: String,
    /// Six-field cron expression for the scheduled sync; `None` disables it.
    pub import_cron: Option<String>,
    /// Status name the product list filters on by default.
    pub sellable_status_name: String,
    pub status_cache_ttl_secs: u64,
}

impl AppConfig {
    #[must_use]
    pub fn feed(&self) -> FeedConfig {
        FeedConfig {
            log_level: self.log_level.clone(),
            api_base_url: self.api_base_url.clone(),
            api_timeout_secs: self.api_timeout_secs,
            api_user_agent: self.api_user_agent.clone(),
        }
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("database_url", &"[redacted]")
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("api_base_url", &self.api_base_url)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("api_user_agent", &self.api_user_agent)
            .field("import_cron", &self.import_cron)
            .field("sellable_status_name", &self.sellable_status_name)
            .field("status_cache_ttl_secs", &self.status_cache_ttl_secs)
            .finish()
    }
}
