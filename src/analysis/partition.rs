//! Splitting speakers into repeat speakers and the "others" bucket.

use super::aggregator::Grouping;
use crate::models::Talk;

/// Key of the bucket that collects single-appearance speakers.
pub const OTHERS_KEY: &str = "others";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketKey<'a> {
    /// A speaker with at least two talks.
    Speaker(&'a str),
    /// Everyone who appears only once.
    Others,
}

#[derive(Debug, Clone)]
pub struct SpeakerBucket<'a> {
    pub key: BucketKey<'a>,
    pub talks: Vec<&'a Talk>,
}

impl<'a> SpeakerBucket<'a> {
    /// The bucket name as it appears in the JSON output.
    pub fn name(&self) -> &'a str {
        match self.key {
            BucketKey::Speaker(name) => name,
            BucketKey::Others => OTHERS_KEY,
        }
    }

    pub fn is_others(&self) -> bool {
        self.key == BucketKey::Others
    }
}

/// Partition the speaker grouping.
///
/// Speakers with two or more talks keep their bucket. The single talks of
/// everyone else are merged, in first-seen order, into one `others` bucket;
/// a talk shared by several such speakers is merged once. Buckets are
/// ordered by size, largest first, and `others` loses ties.
pub fn partition_speakers<'a>(by_speaker: &Grouping<'a>) -> Vec<SpeakerBucket<'a>> {
    let mut buckets = Vec::new();
    let mut others: Vec<&'a Talk> = Vec::new();

    for (speaker, talks) in by_speaker.iter() {
        if talks.len() >= 2 {
            buckets.push(SpeakerBucket {
                key: BucketKey::Speaker(speaker),
                talks: talks.to_vec(),
            });
        } else {
            for &talk in talks {
                if !others.iter().any(|seen| std::ptr::eq(*seen, talk)) {
                    others.push(talk);
                }
            }
        }
    }

    if !others.is_empty() {
        buckets.push(SpeakerBucket {
            key: BucketKey::Others,
            talks: others,
        });
    }

    buckets.sort_by(|a, b| {
        b.talks
            .len()
            .cmp(&a.talks.len())
            .then_with(|| a.is_others().cmp(&b.is_others()))
    });

    buckets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::aggregator::group_by_speaker;
    use crate::models::tests::talk;

    fn summary<'a>(buckets: &[SpeakerBucket<'a>]) -> Vec<(&'a str, Vec<String>)> {
        buckets
            .iter()
            .map(|b| (b.name(), b.talks.iter().map(|t| t.id.clone()).collect()))
            .collect()
    }

    #[test]
    fn test_repeat_speakers_keep_their_bucket() {
        let talks = vec![
            talk("1", &["A"], &["X"]),
            talk("2", &["B"], &["X"]),
            talk("3", &["A"], &["Y"]),
        ];

        let grouping = group_by_speaker(&talks);
        let buckets = partition_speakers(&grouping);

        assert_eq!(
            summary(&buckets),
            vec![
                ("A", vec!["1".to_string(), "3".to_string()]),
                ("others", vec!["2".to_string()]),
            ]
        );
    }

    #[test]
    fn test_others_loses_ties() {
        let talks = vec![
            talk("1", &["Solo1"], &[]),
            talk("2", &["Solo2"], &[]),
            talk("3", &["A"], &[]),
            talk("4", &["A"], &[]),
        ];

        let grouping = group_by_speaker(&talks);
        let buckets = partition_speakers(&grouping);

        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].name(), "A");
        assert!(buckets[1].is_others());
    }

    #[test]
    fn test_larger_others_sorts_first() {
        let talks = vec![
            talk("1", &["A"], &[]),
            talk("2", &["A"], &[]),
            talk("3", &["B"], &[]),
            talk("4", &["C"], &[]),
            talk("5", &["D"], &[]),
        ];

        let grouping = group_by_speaker(&talks);
        let buckets = partition_speakers(&grouping);

        assert!(buckets[0].is_others());
        assert_eq!(buckets[0].talks.len(), 3);
        assert_eq!(buckets[1].name(), "A");
    }

    #[test]
    fn test_shared_talk_merged_once() {
        let talks = vec![talk("1", &["B", "C"], &[]), talk("2", &["D"], &[])];

        let grouping = group_by_speaker(&talks);
        let buckets = partition_speakers(&grouping);

        assert_eq!(
            summary(&buckets),
            vec![("others", vec!["1".to_string(), "2".to_string()])]
        );
    }

    #[test]
    fn test_no_others_bucket_when_everyone_repeats() {
        let talks = vec![talk("1", &["A"], &[]), talk("2", &["A"], &[])];

        let grouping = group_by_speaker(&talks);
        let buckets = partition_speakers(&grouping);

        assert_eq!(buckets.len(), 1);
        assert!(!buckets[0].is_others());
    }

    #[test]
    fn test_empty_grouping() {
        let grouping = Grouping::default();
        assert!(partition_speakers(&grouping).is_empty());
    }
}
