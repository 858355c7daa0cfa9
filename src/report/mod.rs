//! Output generation.
//!
//! HTML pages and JSON summaries are built as strings and then written
//! whole, overwriting whatever a previous run left behind.

pub mod html;
pub mod json;

pub use html::{generate_speaker_page, generate_topic_page};
pub use json::{generate_by_speaker_json, generate_stats_json, generate_talks_json};

use crate::error::{PicksError, Result};
use std::path::Path;
use tracing::debug;

/// Write one output file, creating its directory when missing.
pub fn write_output(path: &Path, content: &str) -> Result<()> {
    let write_error = |source: std::io::Error| PicksError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(write_error)?;
    }

    std::fs::write(path, content).map_err(write_error)?;
    debug!("Wrote {} ({} bytes)", path.display(), content.len());
    Ok(())
}
