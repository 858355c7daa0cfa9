//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.picks.toml` files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Name of the configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = ".picks.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Dataset location.
    #[serde(default)]
    pub source: SourceConfig,

    /// Record predicates.
    #[serde(default)]
    pub filter: FilterConfig,

    /// Output locations.
    #[serde(default)]
    pub output: OutputConfig,

    /// Page text.
    #[serde(default)]
    pub site: SiteConfig,
}

/// Which loader reads the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// JSON array export
    #[default]
    Json,
    /// Local SQLite snapshot
    Sqlite,
}

/// Dataset settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default)]
    pub kind: SourceKind,

    /// Path of the JSON export.
    #[serde(default = "default_json_path")]
    pub json_path: PathBuf,

    /// Path of the SQLite snapshot.
    #[serde(default = "default_sqlite_path")]
    pub sqlite_path: PathBuf,

    /// Table holding the resources.
    #[serde(default = "default_table")]
    pub table: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: SourceKind::default(),
            json_path: default_json_path(),
            sqlite_path: default_sqlite_path(),
            table: default_table(),
        }
    }
}

impl SourceConfig {
    /// The dataset path for the selected kind.
    pub fn path(&self) -> &Path {
        match self.kind {
            SourceKind::Json => &self.json_path,
            SourceKind::Sqlite => &self.sqlite_path,
        }
    }
}

fn default_json_path() -> PathBuf {
    PathBuf::from("database/Resources.json")
}

fn default_sqlite_path() -> PathBuf {
    PathBuf::from("database/picks.db")
}

fn default_table() -> String {
    "Resources".to_string()
}

/// Which records count as picks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    #[serde(default = "default_resource_type")]
    pub resource_type: String,

    #[serde(default = "default_rating")]
    pub rating: u8,

    /// Required language; empty accepts every language.
    #[serde(default = "default_language")]
    pub language: String,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            resource_type: default_resource_type(),
            rating: default_rating(),
            language: default_language(),
        }
    }
}

fn default_resource_type() -> String {
    "talk".to_string()
}

fn default_rating() -> u8 {
    5
}

fn default_language() -> String {
    "English".to_string()
}

/// Output file settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory for the JSON files.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Directory for the HTML pages.
    #[serde(default = "default_site_dir")]
    pub site_dir: PathBuf,

    #[serde(default = "default_talks_file")]
    pub talks_file: String,

    #[serde(default = "default_stats_file")]
    pub stats_file: String,

    #[serde(default = "default_by_speaker_file")]
    pub by_speaker_file: String,

    #[serde(default = "default_index_file")]
    pub index_file: String,

    #[serde(default = "default_by_topic_page")]
    pub by_topic_page: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            site_dir: default_site_dir(),
            talks_file: default_talks_file(),
            stats_file: default_stats_file(),
            by_speaker_file: default_by_speaker_file(),
            index_file: default_index_file(),
            by_topic_page: default_by_topic_page(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("database")
}

fn default_site_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_talks_file() -> String {
    "awesome-talks.json".to_string()
}

fn default_stats_file() -> String {
    "awesome-talks-stats.json".to_string()
}

fn default_by_speaker_file() -> String {
    "awesome-talks-by-speaker.json".to_string()
}

fn default_index_file() -> String {
    "index.html".to_string()
}

fn default_by_topic_page() -> String {
    "index-by-topic.html".to_string()
}

/// Page text settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    #[serde(default = "default_title")]
    pub title: String,

    /// Heading of the by-speaker page.
    #[serde(default = "default_heading")]
    pub heading: String,

    /// Heading of the by-topic page.
    #[serde(default = "default_topic_heading")]
    pub topic_heading: String,

    /// Raw HTML blocks placed under the heading, in order.
    #[serde(default)]
    pub intro: Vec<String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            heading: default_heading(),
            topic_heading: default_topic_heading(),
            intro: Vec::new(),
        }
    }
}

fn default_title() -> String {
    "eferro's picks".to_string()
}

fn default_heading() -> String {
    "Recommended Talks".to_string()
}

fn default_topic_heading() -> String {
    "Recommended Talks by Topic".to_string()
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Pick the configuration for a run.
    ///
    /// An explicit path must load. Otherwise `default_path` is used when it
    /// exists, and the built-in defaults when it doesn't. A file that exists
    /// but can't be parsed is an error either way.
    pub fn resolve(explicit: Option<&Path>, default_path: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            info!("Loading config from: {}", path.display());
            return Self::load(path);
        }

        if default_path.exists() {
            let config = Self::load(default_path)?;
            info!("Loaded default config from {}", default_path.display());
            Ok(config)
        } else {
            debug!("No config file found, using defaults");
            Ok(Self::default())
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// Only arguments that were actually given override the file.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(kind) = args.source {
            self.source.kind = kind;
        }

        if let Some(ref input) = args.input {
            match self.source.kind {
                SourceKind::Json => self.source.json_path = input.clone(),
                SourceKind::Sqlite => self.source.sqlite_path = input.clone(),
            }
        }

        if let Some(ref table) = args.table {
            self.source.table = table.clone();
        }

        if args.any_language {
            self.filter.language.clear();
        } else if let Some(ref language) = args.language {
            self.filter.language = language.clone();
        }

        if let Some(ref dir) = args.data_dir {
            self.output.data_dir = dir.clone();
        }
        if let Some(ref dir) = args.site_dir {
            self.output.site_dir = dir.clone();
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
