//! Error types for the picks pipeline.
//!
//! Every failure is fatal for the run; the variants only exist so the
//! diagnostic says which stage broke and on what input.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Broad class of a pipeline failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The dataset could not be read or has the wrong shape.
    Load,
    /// A field value could not be interpreted.
    Parse,
    /// An output file could not be produced.
    Write,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Load => write!(f, "load error"),
            ErrorKind::Parse => write!(f, "parse error"),
            ErrorKind::Write => write!(f, "write error"),
        }
    }
}

#[derive(Debug, Error)]
pub enum PicksError {
    #[error("cannot read dataset {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed dataset {}: {source}", path.display())]
    MalformedJson {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("cannot query store {}: {source}", path.display())]
    Store {
        path: PathBuf,
        source: rusqlite::Error,
    },

    #[error("store {} does not exist", path.display())]
    MissingStore { path: PathBuf },

    #[error("table {table} is missing required columns: {}", missing.join(", "))]
    MissingColumns { table: String, missing: Vec<String> },

    #[error("record {record}: invalid {field} {value:?}: {reason}")]
    Parse {
        record: String,
        field: String,
        value: String,
        reason: String,
    },

    #[error("cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot serialize {}: {source}", path.display())]
    Serialize {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl PicksError {
    /// Classify the error into load, parse or write.
    pub fn kind(&self) -> ErrorKind {
        match self {
            PicksError::Read { .. }
            | PicksError::MalformedJson { .. }
            | PicksError::Store { .. }
            | PicksError::MissingStore { .. }
            | PicksError::MissingColumns { .. } => ErrorKind::Load,
            PicksError::Parse { .. } => ErrorKind::Parse,
            PicksError::Write { .. } | PicksError::Serialize { .. } => ErrorKind::Write,
        }
    }

    pub(crate) fn parse(
        record: impl Into<String>,
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl fmt::Display,
    ) -> Self {
        PicksError::Parse {
            record: record.into(),
            field: field.into(),
            value: value.into(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PicksError>;
