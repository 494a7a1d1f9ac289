//! Configuration module
//!
//! Handles loading, parsing, and validating TOML configuration files, and
//! derives the seed listing URL from the configured search filters.

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlConfig, HttpConfig, OutputConfig, SearchConfig, ALL_JOBS_URL};

// Re-export parser functions
pub use parser::load_config;
pub use validation::validate;
