//! JSON summary generation.

use crate::analysis::SpeakerBucket;
use crate::models::{Talk, TalkStats};
use serde::ser::{Error as _, SerializeMap};
use serde::{Serialize, Serializer};

/// Pretty-print with four-space indentation.
fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<String> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer)?;
    buf.push(b'\n');
    String::from_utf8(buf).map_err(serde_json::Error::custom)
}

/// Generate `awesome-talks.json`: the filtered, sorted talks.
pub fn generate_talks_json(talks: &[Talk]) -> serde_json::Result<String> {
    to_pretty_json(talks)
}

/// Generate `awesome-talks-stats.json`.
pub fn generate_stats_json(stats: &TalkStats) -> serde_json::Result<String> {
    to_pretty_json(stats)
}

/// Speaker buckets serialized as one object, keys in bucket order.
struct BucketMap<'b, 'a>(&'b [SpeakerBucket<'a>]);

impl Serialize for BucketMap<'_, '_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for bucket in self.0 {
            map.serialize_entry(bucket.name(), &bucket.talks)?;
        }
        map.end()
    }
}

/// Generate `awesome-talks-by-speaker.json`, single speakers under `others`.
pub fn generate_by_speaker_json(buckets: &[SpeakerBucket<'_>]) -> serde_json::Result<String> {
    to_pretty_json(&BucketMap(buckets))
}
