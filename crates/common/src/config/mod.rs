//! Configuration management for citeorder
//!
//! Supports loading configuration from:
//! - Environment variables (prefixed with CITEORDER__)
//! - Configuration files (config.toml, config.yaml)
//! - Default values

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

use crate::{DEFAULT_OUTPUT_PATH, DEFAULT_THRESHOLD};

/// Main application configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// Pair analysis configuration
    pub analysis: AnalysisConfig,

    /// Citation extraction configuration
    pub extraction: ExtractionConfig,

    /// Corpus input / result output configuration
    pub io: IoConfig,

    /// Observability configuration
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AnalysisConfig {
    /// Minimum co-occurrence count for a pair to be reported.
    /// Signed so that a negative value reaches validation instead of failing to parse.
    #[serde(default = "default_threshold")]
    pub threshold: i64,

    /// Aggregate on the rayon pool
    #[serde(default)]
    pub parallel: bool,

    /// Sequences per parallel batch
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ExtractionConfig {
    /// Custom delimiter pattern (regex). `None` uses the built-in bracket styles.
    #[serde(default)]
    pub pattern: Option<String>,

    /// Keep the delimiter characters as part of each token
    #[serde(default)]
    pub keep_delimiters: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IoConfig {
    /// Column holding the document text
    #[serde(default = "default_content_column")]
    pub content_column: String,

    /// Columns that must be present in the input header
    #[serde(default = "default_required_columns")]
    pub required_columns: Vec<String>,

    /// Where the ranked table is written
    #[serde(default = "default_output_path")]
    pub output_path: String,

    /// Number of rows echoed to stdout after ranking
    #[serde(default = "default_preview_rows")]
    pub preview_rows: usize,

    /// Prefix the output with a UTF-8 byte order mark
    #[serde(default = "default_write_bom")]
    pub write_bom: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level (debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub json_logging: bool,

    /// Service name attached to log output
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

// Default value functions
fn default_threshold() -> i64 { DEFAULT_THRESHOLD }
fn default_batch_size() -> usize { 256 }
fn default_content_column() -> String { "content".to_string() }
fn default_required_columns() -> Vec<String> { vec!["book".to_string(), "content".to_string()] }
fn default_output_path() -> String { DEFAULT_OUTPUT_PATH.to_string() }
fn default_preview_rows() -> usize { 5 }
fn default_write_bom() -> bool { true }
fn default_log_level() -> String { "info".to_string() }
fn default_service_name() -> String { "cit-pair".to_string() }

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            parallel: false,
            batch_size: default_batch_size(),
        }
    }
}

impl Default for IoConfig {
    fn default() -> Self {
        Self {
            content_column: default_content_column(),
            required_columns: default_required_columns(),
            output_path: default_output_path(),
            preview_rows: default_preview_rows(),
            write_bom: default_write_bom(),
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logging: false,
            service_name: default_service_name(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment and files
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("CITEORDER_ENV").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            // Start with defaults
            .set_default("analysis.threshold", DEFAULT_THRESHOLD)?
            .set_default("io.output_path", DEFAULT_OUTPUT_PATH)?

            // Load base config file
            .add_source(File::with_name("config/default").required(false))

            // Load environment-specific config
            .add_source(File::with_name(&format!("config/{}", env)).required(false))

            // Load local overrides
            .add_source(File::with_name("config/local").required(false))

            // Load from environment variables with CITEORDER__ prefix
            // e.g., CITEORDER__ANALYSIS__THRESHOLD=3
            .add_source(
                Environment::with_prefix("CITEORDER")
                    .separator("__")
                    .try_parsing(true)
            )

            .build()?;

        config.try_deserialize()
    }

    /// Load from a specific TOML file
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name(path))
            .add_source(
                Environment::with_prefix("CITEORDER")
                    .separator("__")
                    .try_parsing(true)
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.analysis.threshold, 5);
        assert!(!config.analysis.parallel);
        assert_eq!(config.io.output_path, "cit_pair_analysis.txt");
        assert_eq!(config.io.required_columns, vec!["book", "content"]);
        assert!(config.extraction.pattern.is_none());
    }

    #[test]
    fn test_from_file_fills_missing_sections() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[analysis]\nthreshold = 2\nparallel = true\n\n[io]\npreview_rows = 10").unwrap();

        let config = AppConfig::from_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.analysis.threshold, 2);
        assert!(config.analysis.parallel);
        assert_eq!(config.analysis.batch_size, 256);
        assert_eq!(config.io.preview_rows, 10);
        assert_eq!(config.io.content_column, "content");
        assert_eq!(config.observability.log_level, "info");
    }

    #[test]
    fn test_negative_threshold_survives_parsing() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[analysis]\nthreshold = -1").unwrap();

        let config = AppConfig::from_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.analysis.threshold, -1);
    }
}
