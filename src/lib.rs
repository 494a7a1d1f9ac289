//! CareerViet Harvest: a bounded job-posting harvester
//!
//! This crate crawls careerviet.vn listing pages (English and Vietnamese
//! layouts), follows job-detail links, and extracts normalized job records
//! under a global result quota, a per-seed page budget, and URL deduplication.

pub mod config;
pub mod crawler;
pub mod document;
pub mod extract;
pub mod output;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("HTTP status {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Blocked by target site at {url} (status {status})")]
    Blocked { url: String, status: u16 },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Output sink error: {0}")]
    Sink(String),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Constant source tag attached to every emitted record
pub const SOURCE: &str = "careerviet.vn";

// Re-export commonly used types
pub use config::Config;
pub use output::{JobRecord, RawRecord, RecordSink};
pub use state::CrawlState;
pub use url::{classify, PageRole};
