//! Data models for the picks generator.
//!
//! This module contains the raw source record, the typed talk that the
//! rest of the pipeline works on, and the summary statistics.

use crate::error::{PicksError, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// One row of the source dataset, before filtering.
///
/// Every field is optional because the dataset mixes talks with other
/// resource kinds that leave most columns empty.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawRecord {
    #[serde(rename = "airtable_id", alias = "id", default)]
    pub id: Option<String>,

    #[serde(rename = "Name", default)]
    pub name: Option<String>,

    #[serde(rename = "Url", default)]
    pub url: Option<String>,

    /// Duration in whole seconds.
    #[serde(rename = "Duration", default, deserialize_with = "de_seconds")]
    pub duration: Option<u32>,

    #[serde(rename = "Topics_Names", default, deserialize_with = "de_names")]
    pub topics: Vec<String>,

    #[serde(rename = "Speakers_Names", default, deserialize_with = "de_names")]
    pub speakers: Vec<String>,

    #[serde(rename = "Description", default)]
    pub description: Option<String>,

    #[serde(rename = "Rating", default, deserialize_with = "de_rating")]
    pub rating: Option<i64>,

    #[serde(rename = "Resource type", default)]
    pub resource_type: Option<String>,

    #[serde(rename = "Language", default)]
    pub language: Option<String>,

    /// Creation timestamp, still unparsed.
    #[serde(rename = "Created", default)]
    pub created: Option<String>,

    /// First field that could not be read; the record fails only if selected.
    #[serde(skip)]
    pub malformed: Option<BadField>,
}

/// A source field whose value has the wrong shape.
#[derive(Debug, Clone, PartialEq)]
pub struct BadField {
    pub field: String,
    pub value: String,
    pub reason: String,
}

impl BadField {
    pub fn into_error(self, record: impl Into<String>) -> PicksError {
        PicksError::parse(record, self.field, self.value, self.reason)
    }
}

impl RawRecord {
    /// A short label identifying the record in diagnostics.
    pub fn label(&self) -> String {
        self.id
            .clone()
            .or_else(|| self.name.clone())
            .unwrap_or_else(|| "<unnamed>".to_string())
    }

    /// Read one element of a JSON export.
    ///
    /// Fields with an unexpected type are left empty and the first one is
    /// kept in `malformed`, so odd values on records the filter drops never
    /// stop a run. Only a non-object element is an error.
    pub fn from_json(value: &Value) -> serde_json::Result<Self> {
        match (Self::deserialize(value), value.as_object()) {
            (Ok(record), _) => Ok(record),
            (Err(_), Some(object)) => Ok(Self::from_fields(object)),
            (Err(e), None) => Err(e),
        }
    }

    fn from_fields(object: &Map<String, Value>) -> Self {
        let mut kept = Map::new();
        let mut malformed = None;

        for (key, value) in object {
            let single: Map<String, Value> = [(key.clone(), value.clone())].into_iter().collect();
            match Self::deserialize(&Value::Object(single)) {
                Ok(_) => {
                    kept.insert(key.clone(), value.clone());
                }
                Err(e) => {
                    malformed.get_or_insert_with(|| BadField {
                        field: key.clone(),
                        value: value.to_string(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        // Every kept key read fine on its own; the only combined failure is
        // an `id` / `airtable_id` clash, which leaves the record unselectable.
        let mut record = Self::deserialize(&Value::Object(kept)).unwrap_or_default();
        record.malformed = malformed;
        record
    }
}

fn de_seconds<'de, D>(deserializer: D) -> std::result::Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let secs = Option::<f64>::deserialize(deserializer)?;
    Ok(secs.map(|s| s.max(0.0) as u32))
}

fn de_rating<'de, D>(deserializer: D) -> std::result::Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let rating = Option::<f64>::deserialize(deserializer)?;
    Ok(rating.and_then(whole_rating))
}

/// A rating only counts when it is a whole number; `4.5` matches nothing.
pub fn whole_rating(rating: f64) -> Option<i64> {
    (rating.is_finite() && rating.fract() == 0.0).then(|| rating as i64)
}

fn de_names<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// A curated talk that passed the filter.
///
/// Serializes with the source key names so `awesome-talks.json` reads like
/// the dataset it came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Talk {
    #[serde(rename = "airtable_id")]
    pub id: String,

    #[serde(rename = "Name")]
    pub name: String,

    #[serde(rename = "Url")]
    pub url: String,

    #[serde(rename = "Duration", skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,

    #[serde(rename = "Topics_Names")]
    pub topics: Vec<String>,

    #[serde(rename = "Speakers_Names")]
    pub speakers: Vec<String>,

    #[serde(rename = "Description", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(rename = "Rating")]
    pub rating: u8,

    #[serde(rename = "Resource type")]
    pub resource_type: String,

    #[serde(rename = "Language")]
    pub language: String,

    #[serde(
        rename = "Created",
        skip_serializing_if = "Option::is_none",
        serialize_with = "ser_created"
    )]
    pub created: Option<DateTime<Utc>>,
}

fn ser_created<S>(created: &Option<DateTime<Utc>>, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match created {
        Some(ts) => serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, true)),
        None => serializer.serialize_none(),
    }
}

impl Talk {
    /// Build a talk from a record that already passed the filter.
    pub fn from_raw(mut raw: RawRecord) -> Result<Self> {
        if let Some(bad) = raw.malformed.take() {
            return Err(bad.into_error(raw.label()));
        }

        let created = match raw.created.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(text) => Some(parse_timestamp(text).map_err(|e| {
                PicksError::parse(raw.label(), "Created", text, e)
            })?),
        };

        Ok(Self {
            id: raw.id.unwrap_or_default(),
            name: raw.name.unwrap_or_default(),
            url: raw.url.unwrap_or_default(),
            duration: raw.duration,
            topics: raw.topics,
            speakers: raw.speakers,
            description: raw.description.filter(|d| !d.trim().is_empty()),
            rating: raw.rating.unwrap_or_default().clamp(0, 5) as u8,
            resource_type: raw.resource_type.unwrap_or_default(),
            language: raw.language.unwrap_or_default(),
            created,
        })
    }
}

/// Parse an ISO-8601 timestamp such as `2021-01-01T00:00:00.000Z`.
pub fn parse_timestamp(text: &str) -> std::result::Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(text).map(|ts| ts.with_timezone(&Utc))
}

/// Names with their talk counts, most frequent first.
///
/// Serializes as a JSON object whose keys keep the ranking order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ranking(Vec<(String, usize)>);

impl Ranking {
    /// Count how many talks mention each name.
    ///
    /// Each item is the name list of one talk; a name repeated inside one
    /// list counts once. Equal counts keep first-seen order.
    pub fn tally<'a, I>(lists: I) -> Self
    where
        I: IntoIterator<Item = &'a [String]>,
    {
        let mut entries: Vec<(String, usize)> = Vec::new();
        let mut index: HashMap<&'a str, usize> = HashMap::new();

        for names in lists {
            let mut seen_in_talk: Vec<&str> = Vec::new();
            for name in names {
                if seen_in_talk.contains(&name.as_str()) {
                    continue;
                }
                seen_in_talk.push(name);

                match index.get(name.as_str()) {
                    Some(&pos) => entries[pos].1 += 1,
                    None => {
                        index.insert(name, entries.len());
                        entries.push((name.clone(), 1));
                    }
                }
            }
        }

        entries.sort_by_key(|(_, count)| std::cmp::Reverse(*count));
        Self(entries)
    }

    #[allow(dead_code)] // Lookup helper
    pub fn get(&self, name: &str) -> Option<usize> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, c)| *c)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.0.iter().map(|(n, c)| (n.as_str(), *c))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[allow(dead_code)] // Pairs with len()
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sum of all counts.
    pub fn total(&self) -> usize {
        self.0.iter().map(|(_, c)| c).sum()
    }
}

impl Serialize for Ranking {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, count) in &self.0 {
            map.serialize_entry(name, count)?;
        }
        map.end()
    }
}

/// Summary statistics written to `awesome-talks-stats.json`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TalkStats {
    pub total_talks: usize,
    pub talks_per_topic: Ranking,
    pub talks_per_speaker: Ranking,
}

impl TalkStats {
    /// Creates the statistics for a filtered list of talks.
    pub fn from_talks(talks: &[Talk]) -> Self {
        Self {
            total_talks: talks.len(),
            talks_per_topic: crate::analysis::count_by_topic(talks),
            talks_per_speaker: crate::analysis::count_by_speaker(talks),
        }
    }
}
