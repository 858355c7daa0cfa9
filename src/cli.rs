//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::config::SourceKind;
use clap::Parser;
use std::path::PathBuf;

/// eferro-picks - static pages for curated five-star talks
///
/// Reads the resources dataset, keeps the five-star English talks and
/// writes the by-speaker and by-topic pages plus JSON summaries.
///
/// Examples:
///   eferro-picks
///   eferro-picks --source sqlite --input database/picks.db
///   eferro-picks --site-dir public --data-dir public/data
///   eferro-picks --dry-run --verbose
///   eferro-picks --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Dataset kind to read (json, sqlite)
    ///
    /// Overrides the `[source] kind` setting of the config file.
    #[arg(short, long, value_name = "KIND")]
    pub source: Option<SourceKind>,

    /// Path of the dataset file
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Table to read from the SQLite snapshot
    #[arg(long, value_name = "NAME")]
    pub table: Option<String>,

    /// Directory for the JSON outputs
    #[arg(long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Directory for the HTML pages
    #[arg(long, value_name = "DIR")]
    pub site_dir: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .picks.toml in the current directory
    #[arg(short, long, value_name = "FILE", env = "PICKS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Only keep talks in this language
    #[arg(long, value_name = "LANG", conflicts_with = "any_language")]
    pub language: Option<String>,

    /// Keep talks in every language
    #[arg(long)]
    pub any_language: bool,

    /// Load and aggregate the dataset without writing any file
    #[arg(long)]
    pub dry_run: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .picks.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.init_config {
            return Ok(());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(ref input) = self.input {
            if input.is_dir() {
                return Err(format!("Input is a directory: {}", input.display()));
            }
        }

        if let Some(ref table) = self.table {
            if table.trim().is_empty() {
                return Err("Table name must not be empty".to_string());
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
