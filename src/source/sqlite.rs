//! SQLite snapshot loader.
//!
//! The snapshot stores list fields as text (`["a", "b"]` or `a, b`), so
//! this loader also owns the list-field parser.

use super::TalkSource;
use crate::error::{PicksError, Result};
use crate::models::{whole_rating, BadField, RawRecord};
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags, Row};
use std::path::PathBuf;
use tracing::debug;

/// Columns the projection query cannot do without.
const REQUIRED_COLUMNS: [&str; 10] = [
    "airtable_id",
    "Name",
    "Url",
    "Duration",
    "Topics_Names",
    "Speakers_Names",
    "Description",
    "Rating",
    "Resource type",
    "Language",
];

/// Projected only when the table has it.
const CREATED_COLUMN: &str = "Created";

/// Reads resource rows from a table of a SQLite database.
#[derive(Debug, Clone)]
pub struct SqliteSource {
    path: PathBuf,
    table: String,
}

impl SqliteSource {
    pub fn new(path: PathBuf, table: String) -> Self {
        Self { path, table }
    }

    fn store_error(&self, source: rusqlite::Error) -> PicksError {
        PicksError::Store {
            path: self.path.clone(),
            source,
        }
    }

    fn table_columns(&self, conn: &Connection) -> Result<Vec<String>> {
        let pragma = format!("PRAGMA table_info({})", quote_ident(&self.table));
        let mut stmt = conn.prepare(&pragma).map_err(|e| self.store_error(e))?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(1))
            .map_err(|e| self.store_error(e))?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| self.store_error(e))?;
        Ok(names)
    }
}

impl TalkSource for SqliteSource {
    fn load(&self) -> Result<Vec<RawRecord>> {
        if !self.path.is_file() {
            return Err(PicksError::MissingStore {
                path: self.path.clone(),
            });
        }

        let conn = Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| self.store_error(e))?;

        let columns = self.table_columns(&conn)?;
        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|&&required| !columns.iter().any(|c| c == required))
            .map(|c| c.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(PicksError::MissingColumns {
                table: self.table.clone(),
                missing,
            });
        }

        let with_created = columns.iter().any(|c| c == CREATED_COLUMN);
        let query = projection_query(&self.table, with_created);
        debug!("Projection query: {}", query);

        let mut stmt = conn.prepare(&query).map_err(|e| self.store_error(e))?;
        let rows = stmt
            .query_map([], |row| StoreRow::from_sql_row(row, with_created))
            .map_err(|e| self.store_error(e))?;

        let mut records = Vec::new();
        for row in rows {
            let row = row.map_err(|e| self.store_error(e))?;
            records.push(row.into_record());
        }

        debug!("Read {} rows from {}", records.len(), self.describe());
        Ok(records)
    }

    fn describe(&self) -> String {
        format!("sqlite:{}#{}", self.path.display(), self.table)
    }
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn projection_query(table: &str, with_created: bool) -> String {
    let mut columns: Vec<String> = REQUIRED_COLUMNS.iter().map(|c| quote_ident(c)).collect();
    if with_created {
        columns.push(quote_ident(CREATED_COLUMN));
    }
    format!(
        "SELECT {} FROM {} ORDER BY rowid",
        columns.join(", "),
        quote_ident(table)
    )
}

/// A projected row, with list fields still in their text form.
struct StoreRow {
    id: Option<String>,
    name: Option<String>,
    url: Option<String>,
    duration: Option<f64>,
    topics: Option<String>,
    speakers: Option<String>,
    description: Option<String>,
    rating: Option<f64>,
    resource_type: Option<String>,
    language: Option<String>,
    created: Option<String>,
}

impl StoreRow {
    fn from_sql_row(row: &Row<'_>, with_created: bool) -> rusqlite::Result<Self> {
        Ok(Self {
            id: text_value(row.get_ref(0)?),
            name: text_value(row.get_ref(1)?),
            url: text_value(row.get_ref(2)?),
            duration: number_value(row.get_ref(3)?),
            topics: text_value(row.get_ref(4)?),
            speakers: text_value(row.get_ref(5)?),
            description: text_value(row.get_ref(6)?),
            rating: number_value(row.get_ref(7)?),
            resource_type: text_value(row.get_ref(8)?),
            language: text_value(row.get_ref(9)?),
            created: if with_created {
                text_value(row.get_ref(10)?)
            } else {
                None
            },
        })
    }

    fn into_record(self) -> RawRecord {
        let mut malformed = None;
        let mut list = |field, value: Option<&str>| {
            parse_list_field(field, value).unwrap_or_else(|bad| {
                malformed.get_or_insert(bad);
                Vec::new()
            })
        };
        let topics = list("Topics_Names", self.topics.as_deref());
        let speakers = list("Speakers_Names", self.speakers.as_deref());

        RawRecord {
            id: self.id,
            name: self.name,
            url: self.url,
            duration: self.duration.map(|d| d.max(0.0) as u32),
            topics,
            speakers,
            description: self.description,
            rating: self.rating.and_then(whole_rating),
            resource_type: self.resource_type,
            language: self.language,
            created: self.created,
            malformed,
        }
    }
}

fn text_value(value: ValueRef<'_>) -> Option<String> {
    match value {
        ValueRef::Null => None,
        ValueRef::Integer(i) => Some(i.to_string()),
        ValueRef::Real(f) => Some(f.to_string()),
        ValueRef::Text(t) | ValueRef::Blob(t) => Some(String::from_utf8_lossy(t).into_owned()),
    }
}

fn number_value(value: ValueRef<'_>) -> Option<f64> {
    match value {
        ValueRef::Integer(i) => Some(i as f64),
        ValueRef::Real(f) => Some(f),
        ValueRef::Text(t) => std::str::from_utf8(t).ok()?.trim().parse().ok(),
        ValueRef::Null | ValueRef::Blob(_) => None,
    }
}

/// Split a stored list field into names.
///
/// Accepts a JSON array of strings or the loose `[a, "b"]` / `a, b` forms.
/// A value that opens a bracket without closing it is rejected.
pub fn parse_list_field(field: &str, value: Option<&str>) -> std::result::Result<Vec<String>, BadField> {
    let text = match value.map(str::trim) {
        None | Some("") => return Ok(Vec::new()),
        Some(text) => text,
    };

    if text.starts_with('[') {
        if let Ok(names) = serde_json::from_str::<Vec<String>>(text) {
            return Ok(names
                .into_iter()
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty())
                .collect());
        }
        if !text.ends_with(']') {
            return Err(BadField {
                field: field.to_string(),
                value: text.to_string(),
                reason: "unterminated list".to_string(),
            });
        }
    }

    let cleaned = text.replace(['[', ']', '"'], "");
    Ok(cleaned
        .split(',')
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(String::from)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use rusqlite::params;
    use tempfile::TempDir;

    fn create_store(dir: &TempDir, with_created: bool) -> PathBuf {
        let path = dir.path().join("picks.db");
        let conn = Connection::open(&path).unwrap();
        let created = if with_created { ", Created TEXT" } else { "" };
        conn.execute_batch(&format!(
            r#"CREATE TABLE Resources(
                airtable_id TEXT, Name TEXT, Url TEXT, Duration INTEGER,
                Topics_Names TEXT, Speakers_Names TEXT, Description TEXT,
                Rating INTEGER, "Resource type" TEXT, Language TEXT{created});"#
        ))
        .unwrap();
        path
    }

    #[test]
    fn test_load_rows_in_order() {
        let dir = TempDir::new().unwrap();
        let path = create_store(&dir, true);
        let conn = Connection::open(&path).unwrap();
        conn.execute(
            r#"INSERT INTO Resources VALUES(?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)"#,
            params![
                "rec1",
                "Hammock Driven Development",
                "https://example.com/hdd",
                2391,
                r#"["thinking", "problem solving"]"#,
                r#"["Rich Hickey"]"#,
                "Step away from the computer",
                5,
                "talk",
                "English",
                "2019-05-10T10:00:00.000Z"
            ],
        )
        .unwrap();
        conn.execute(
            r#"INSERT INTO Resources(airtable_id, Name, Rating, "Resource type", Duration)
               VALUES('rec2', 'Refactoring', 4.0, 'book', NULL)"#,
            [],
        )
        .unwrap();
        drop(conn);

        let records = SqliteSource::new(path, "Resources".to_string()).load().unwrap();
        assert_eq!(records.len(), 2);

        let first = &records[0];
        assert_eq!(first.id.as_deref(), Some("rec1"));
        assert_eq!(first.duration, Some(2391));
        assert_eq!(first.topics, vec!["thinking", "problem solving"]);
        assert_eq!(first.speakers, vec!["Rich Hickey"]);
        assert_eq!(first.rating, Some(5));
        assert_eq!(first.created.as_deref(), Some("2019-05-10T10:00:00.000Z"));

        let second = &records[1];
        assert_eq!(second.rating, Some(4));
        assert!(second.duration.is_none());
        assert!(second.topics.is_empty());
    }

    #[test]
    fn test_created_column_is_optional() {
        let dir = TempDir::new().unwrap();
        let path = create_store(&dir, false);
        let conn = Connection::open(&path).unwrap();
        conn.execute(
            r#"INSERT INTO Resources(airtable_id, Speakers_Names, Rating, "Resource type")
               VALUES('rec1', 'Kent Beck, Cynthia Andres', 5, 'talk')"#,
            [],
        )
        .unwrap();
        drop(conn);

        let records = SqliteSource::new(path, "Resources".to_string()).load().unwrap();
        assert_eq!(records[0].speakers, vec!["Kent Beck", "Cynthia Andres"]);
        assert!(records[0].created.is_none());
    }

    #[test]
    fn test_missing_columns_are_listed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("partial.db");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch("CREATE TABLE Resources(airtable_id TEXT, Name TEXT, Url TEXT);")
            .unwrap();
        drop(conn);

        let err = SqliteSource::new(path, "Resources".to_string())
            .load()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Load);
        match err {
            PicksError::MissingColumns { missing, .. } => {
                assert_eq!(missing.len(), 7);
                assert!(missing.contains(&"Resource type".to_string()));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_store_is_not_created() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent.db");

        let err = SqliteSource::new(path.clone(), "Resources".to_string())
            .load()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Load);
        assert!(!path.exists());
    }

    #[test]
    fn test_parse_list_field_forms() {
        let parse = |v| parse_list_field("Topics_Names", v).unwrap();

        assert!(parse(None).is_empty());
        assert!(parse(Some("  ")).is_empty());
        assert!(parse(Some("[]")).is_empty());
        assert_eq!(parse(Some(r#"["a", "b"]"#)), vec!["a", "b"]);
        assert_eq!(parse(Some(r#"["Smith, John"]"#)), vec!["Smith, John"]);
        assert_eq!(parse(Some("[a, b]")), vec!["a", "b"]);
        assert_eq!(parse(Some("a, ,b")), vec!["a", "b"]);
    }

    #[test]
    fn test_parse_list_field_unterminated() {
        let bad = parse_list_field("Speakers_Names", Some(r#"["a", "b""#)).unwrap_err();
        assert_eq!(bad.field, "Speakers_Names");

        let err = bad.into_error("rec7");
        assert_eq!(err.kind(), ErrorKind::Parse);
        assert!(err.to_string().contains("rec7"));
    }

    #[test]
    fn test_bad_rows_are_flagged_not_fatal() {
        let dir = TempDir::new().unwrap();
        let path = create_store(&dir, false);
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(
            r#"INSERT INTO Resources(airtable_id, Topics_Names, Rating, "Resource type")
               VALUES('recBook', '["craft', 5, 'book');
               INSERT INTO Resources(airtable_id, Rating, "Resource type")
               VALUES('recHalf', 4.5, 'talk');"#,
        )
        .unwrap();
        drop(conn);

        let records = SqliteSource::new(path, "Resources".to_string()).load().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(
            records[0].malformed.as_ref().map(|b| b.field.as_str()),
            Some("Topics_Names")
        );
        assert!(records[1].rating.is_none());
    }

    #[test]
    fn test_projection_query_quotes_identifiers() {
        let query = projection_query("Res\"ources", false);
        assert!(query.contains(r#""Resource type""#));
        assert!(query.contains(r#"FROM "Res""ources""#));
        assert!(!query.contains("Created"));
    }
}
