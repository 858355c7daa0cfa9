//! JSON export loader.

use super::TalkSource;
use crate::error::{PicksError, Result};
use crate::models::RawRecord;
use serde_json::Value;
use std::path::PathBuf;
use tracing::debug;

/// Reads a JSON array of resource objects.
#[derive(Debug, Clone)]
pub struct JsonSource {
    path: PathBuf,
}

impl JsonSource {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl TalkSource for JsonSource {
    fn load(&self) -> Result<Vec<RawRecord>> {
        let content = std::fs::read_to_string(&self.path).map_err(|source| PicksError::Read {
            path: self.path.clone(),
            source,
        })?;

        let malformed = |source: serde_json::Error| PicksError::MalformedJson {
            path: self.path.clone(),
            source,
        };

        let values: Vec<Value> = serde_json::from_str(&content).map_err(malformed)?;
        let records = values
            .iter()
            .map(RawRecord::from_json)
            .collect::<serde_json::Result<Vec<_>>>()
            .map_err(malformed)?;

        let odd = records.iter().filter(|r| r.malformed.is_some()).count();
        if odd > 0 {
            debug!("{} records have fields of an unexpected type", odd);
        }

        debug!("Read {} records from {}", records.len(), self.path.display());
        Ok(records)
    }

    fn describe(&self) -> String {
        format!("json:{}", self.path.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use tempfile::TempDir;

    #[test]
    fn test_load_fixture() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Resources.json");
        std::fs::write(&path, include_str!("../../fixtures/Resources.json")).unwrap();

        let records = JsonSource::new(path).load().unwrap();
        assert_eq!(records.len(), 9);
        assert_eq!(records[0].resource_type.as_deref(), Some("talk"));
    }

    #[test]
    fn test_load_empty_array() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.json");
        std::fs::write(&path, "[]").unwrap();

        assert!(JsonSource::new(path).load().unwrap().is_empty());
    }

    #[test]
    fn test_missing_file_is_load_error() {
        let dir = TempDir::new().unwrap();
        let err = JsonSource::new(dir.path().join("nope.json"))
            .load()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Load);
    }

    #[test]
    fn test_odd_fields_on_other_resources_do_not_fail_the_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("mixed.json");
        std::fs::write(
            &path,
            r#"[{"airtable_id": "recTalk", "Resource type": "talk", "Rating": 5, "Language": "English"},
                {"airtable_id": "recBook", "Resource type": "book", "Duration": "n/a", "Topics_Names": "craft"}]"#,
        )
        .unwrap();

        let records = JsonSource::new(path).load().unwrap();
        assert_eq!(records.len(), 2);
        assert!(records[0].malformed.is_none());
        assert_eq!(records[1].malformed.as_ref().map(|b| b.field.as_str()), Some("Duration"));
    }

    #[test]
    fn test_non_object_element_is_load_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("numbers.json");
        std::fs::write(&path, "[1, 2]").unwrap();

        let err = JsonSource::new(path).load().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Load);
    }

    #[test]
    fn test_non_array_is_load_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("object.json");
        std::fs::write(&path, r#"{"Name": "not a list"}"#).unwrap();

        let err = JsonSource::new(path).load().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Load);
        assert!(err.to_string().contains("malformed dataset"));
    }
}
