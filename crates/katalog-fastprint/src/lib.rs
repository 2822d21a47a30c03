pub mod client;
pub mod credentials;
pub mod error;
pub mod normalize;
pub mod types;

pub use client::FastprintClient;
pub use credentials::Credentials;
pub use error::FetchError;
pub use normalize::normalize_feed;
pub use types::{ApiEnvelope, RawProduct};
