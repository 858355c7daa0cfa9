//! Dataset loaders.
//!
//! Both loaders produce the same `RawRecord` rows; which one runs is a
//! configuration choice.

pub mod json;
pub mod sqlite;

pub use json::JsonSource;
pub use sqlite::SqliteSource;

use crate::config::{SourceConfig, SourceKind};
use crate::error::Result;
use crate::models::RawRecord;

/// A place raw resource records can be read from.
pub trait TalkSource {
    /// Read every record, in source order.
    fn load(&self) -> Result<Vec<RawRecord>>;

    /// Human readable location, for logs.
    fn describe(&self) -> String;
}

/// Build the loader selected by the configuration.
pub fn from_config(config: &SourceConfig) -> Box<dyn TalkSource> {
    match config.kind {
        SourceKind::Json => Box::new(JsonSource::new(config.json_path.clone())),
        SourceKind::Sqlite => Box::new(SqliteSource::new(
            config.sqlite_path.clone(),
            config.table.clone(),
        )),
    }
}
