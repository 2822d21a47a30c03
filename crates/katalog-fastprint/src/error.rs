use thiserror::Error;

/// Errors returned by the Fastprint feed client.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network, TLS, or timeout failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid feed URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    /// The body was not JSON, or not shaped like the feed envelope.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The feed answered with `"error": 1`; carries the `ket` text.
    #[error("API Error: {0}")]
    Api(String),
}
