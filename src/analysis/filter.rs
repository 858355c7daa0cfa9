//! Record selection.

use crate::config::FilterConfig;
use crate::error::Result;
use crate::models::{RawRecord, Talk};
use tracing::debug;

/// Check a raw record against the configured predicates.
///
/// An empty configured language accepts every language.
pub fn matches(record: &RawRecord, filter: &FilterConfig) -> bool {
    if record.resource_type.as_deref() != Some(filter.resource_type.as_str()) {
        return false;
    }

    if record.rating != Some(i64::from(filter.rating)) {
        return false;
    }

    filter.language.is_empty() || record.language.as_deref() == Some(filter.language.as_str())
}

/// Keep the matching records, in order, as typed talks.
pub fn select_talks(records: Vec<RawRecord>, filter: &FilterConfig) -> Result<Vec<Talk>> {
    let total = records.len();

    let talks = records
        .into_iter()
        .filter(|r| matches(r, filter))
        .map(Talk::from_raw)
        .collect::<Result<Vec<_>>>()?;

    debug!("Selected {} of {} records", talks.len(), total);
    Ok(talks)
}

/// Stable sort by creation time, oldest first.
///
/// Talks without a timestamp keep their relative order after the dated ones.
pub fn sort_by_created(talks: &mut [Talk]) {
    talks.sort_by_key(|t| (t.created.is_none(), t.created));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::parse_timestamp;

    fn record(kind: &str, rating: i64, language: &str, created: &str) -> RawRecord {
        RawRecord {
            id: Some(format!("{kind}-{rating}-{language}-{created}")),
            rating: Some(rating),
            resource_type: Some(kind.to_string()),
            language: Some(language.to_string()),
            created: Some(created.to_string()),
            ..RawRecord::default()
        }
    }

    #[test]
    fn test_matches_all_predicates() {
        let filter = FilterConfig::default();
        let ts = "2021-01-01T00:00:00.000Z";

        assert!(matches(&record("talk", 5, "English", ts), &filter));
        assert!(!matches(&record("book", 5, "English", ts), &filter));
        assert!(!matches(&record("talk", 4, "English", ts), &filter));
        assert!(!matches(&record("talk", 5, "Spanish", ts), &filter));
        assert!(!matches(&RawRecord::default(), &filter));
    }

    #[test]
    fn test_fractional_rating_is_rejected() {
        let half: RawRecord = serde_json::from_str(
            r#"{"Resource type": "talk", "Rating": 4.5, "Language": "English"}"#,
        )
        .unwrap();
        let whole: RawRecord = serde_json::from_str(
            r#"{"Resource type": "talk", "Rating": 5.0, "Language": "English"}"#,
        )
        .unwrap();

        let filter = FilterConfig::default();
        assert!(!matches(&half, &filter));
        assert!(matches(&whole, &filter));
    }

    #[test]
    fn test_empty_language_accepts_any() {
        let filter = FilterConfig {
            language: String::new(),
            ..FilterConfig::default()
        };
        let mut spanish = record("talk", 5, "Spanish", "2021-01-01T00:00:00.000Z");
        assert!(matches(&spanish, &filter));

        spanish.language = None;
        assert!(matches(&spanish, &filter));
    }

    #[test]
    fn test_select_preserves_order() {
        let records = vec![
            record("talk", 5, "English", "2021-01-01T00:00:00.000Z"),
            record("talk", 3, "English", "2019-01-01T00:00:00.000Z"),
            record("talk", 5, "English", "2020-01-01T00:00:00.000Z"),
        ];

        let talks = select_talks(records, &FilterConfig::default()).unwrap();
        assert_eq!(talks.len(), 2);
        assert!(talks[0].id.contains("2021"));
        assert!(talks[1].id.contains("2020"));
    }

    #[test]
    fn test_select_empty_input() {
        let talks = select_talks(Vec::new(), &FilterConfig::default()).unwrap();
        assert!(talks.is_empty());
    }

    #[test]
    fn test_bad_timestamp_only_fails_for_selected_records() {
        let records = vec![record("book", 5, "English", "not a date")];
        assert!(select_talks(records, &FilterConfig::default()).unwrap().is_empty());

        let records = vec![record("talk", 5, "English", "not a date")];
        assert!(select_talks(records, &FilterConfig::default()).is_err());
    }

    #[test]
    fn test_sort_by_created() {
        let mut talks = select_talks(
            vec![
                record("talk", 5, "English", "2021-01-01T00:00:00.000Z"),
                record("talk", 5, "English", ""),
                record("talk", 5, "English", "2020-01-01T00:00:00.000Z"),
            ],
            &FilterConfig::default(),
        )
        .unwrap();

        sort_by_created(&mut talks);

        assert_eq!(
            talks[0].created,
            Some(parse_timestamp("2020-01-01T00:00:00.000Z").unwrap())
        );
        assert_eq!(
            talks[1].created,
            Some(parse_timestamp("2021-01-01T00:00:00.000Z").unwrap())
        );
        assert!(talks[2].created.is_none());
    }
}
