//! Citeorder Common Library
//! 
//! Shared code for the citeorder crates including:
//! - Error types and handling
//! - Configuration management
//! - Metrics descriptions

pub mod config;
pub mod errors;
pub mod metrics;

// Re-export commonly used types
pub use errors::{AppError, ErrorCode, Result};
pub use config::AppConfig;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Minimum co-occurrence count used when the caller supplies none
pub const DEFAULT_THRESHOLD: i64 = 5;

/// Default output file for the ranked pair table
pub const DEFAULT_OUTPUT_PATH: &str = "cit_pair_analysis.txt";
