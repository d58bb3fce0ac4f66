//! Citeorder CLI
//!
//! Runs a citation pair analysis over a document table:
//! 1. Loads the corpus (CSV / TSV)
//! 2. Extracts citation sequences and aggregates pair statistics
//! 3. Ranks directional rows above the co-occurrence threshold
//! 4. Prints a preview and writes the ranked table

mod loader;
mod writer;

use anyhow::Context;
use citeorder_analysis::CitationOrderAnalyzer;
use citeorder_common::{config::AppConfig, errors::Result, metrics, VERSION};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Rank how often pairs of citations co-occur in a document and which one tends to come first.
#[derive(Parser, Debug)]
#[command(name = "cit-pair", version, about)]
struct Cli {
    /// Document table (.csv, .tsv or .txt) with `book` and `content` columns
    input: PathBuf,

    /// Minimum co-occurrence count for a pair to be reported (default 5)
    #[arg(short, long, allow_negative_numbers = true)]
    threshold: Option<i64>,

    /// Output file for the ranked table
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Custom citation delimiter pattern (regex; first capture group is the token)
    #[arg(long)]
    pattern: Option<String>,

    /// Keep delimiter characters in the extracted tokens
    #[arg(long)]
    keep_delimiters: bool,

    /// Aggregate on all cores
    #[arg(long)]
    parallel: bool,

    /// Keep only the more likely direction of each pair
    #[arg(long)]
    dominant_only: bool,

    /// Number of rows to preview on stdout
    #[arg(long)]
    preview: Option<usize>,

    /// Configuration file (TOML); otherwise config/ and CITEORDER__* variables are used
    #[arg(short, long)]
    config: Option<String>,
}

impl Cli {
    /// Layer command-line flags over the loaded configuration
    fn apply(&self, mut config: AppConfig) -> AppConfig {
        if let Some(threshold) = self.threshold {
            config.analysis.threshold = threshold;
        }
        if let Some(output) = &self.output {
            config.io.output_path = output.display().to_string();
        }
        if let Some(pattern) = &self.pattern {
            config.extraction.pattern = Some(pattern.clone());
        }
        if let Some(preview) = self.preview {
            config.io.preview_rows = preview;
        }
        config.extraction.keep_delimiters |= self.keep_delimiters;
        config.analysis.parallel |= self.parallel;
        config
    }
}

fn main() -> anyhow::Result<ExitCode> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Load configuration
    let config = match &cli.config {
        Some(path) => AppConfig::from_file(path),
        None => AppConfig::load(),
    }
    .context("Failed to load configuration")?;
    let config = cli.apply(config);

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.observability.log_level));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);
    if config.observability.json_logging {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    info!(
        service = %config.observability.service_name,
        "Starting citation pair analysis v{}", VERSION
    );

    match run(&cli, &config) {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(e) => {
            e.log();
            eprintln!("error: {}", e);
            Ok(ExitCode::from(e.exit_code() as u8))
        }
    }
}

fn run(cli: &Cli, config: &AppConfig) -> Result<()> {
    metrics::register_metrics();

    let analyzer = CitationOrderAnalyzer::from_config(&config.analysis, &config.extraction)?;
    let corpus = loader::load_corpus(&cli.input, &config.io)?;
    if corpus.is_empty() {
        warn!(path = %cli.input.display(), "Corpus has no rows");
    }

    let report = analyzer.analyze_texts(corpus.texts());
    let table = if cli.dominant_only {
        report.table.dominant()
    } else {
        report.table
    };

    if table.is_empty() {
        warn!(
            threshold = report.threshold.get(),
            pair_keys = report.pair_keys,
            "No pair met the threshold, nothing written"
        );
        println!("No citation pair reached the threshold ({}).", report.threshold);
        return Ok(());
    }

    println!("Analysis complete: {} relations extracted.", table.len());
    let preview = table.head(config.io.preview_rows);
    if !preview.is_empty() {
        println!("=== Top {} ===", preview.len());
        print!("{}", writer::render_preview(preview));
    }

    let output = Path::new(&config.io.output_path);
    writer::write_table(output, table.rows(), config.io.write_bom)?;

    info!(path = %output.display(), rows = table.len(), "Results saved");
    println!("Results saved to '{}'.", output.display());

    Ok(())
}
