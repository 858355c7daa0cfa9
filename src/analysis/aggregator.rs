//! Talk aggregation and statistics.
//!
//! This module groups filtered talks by speaker and by topic and computes
//! the per-name counts.

use crate::models::{Ranking, Talk, TalkStats};
use std::collections::HashMap;

/// Ordered mapping from a name to the talks that mention it.
///
/// Keys keep first-seen order and each bucket keeps the order of the input
/// talks. Buckets borrow the talks instead of copying them.
#[derive(Debug, Clone, Default)]
pub struct Grouping<'a> {
    groups: Vec<(&'a str, Vec<&'a Talk>)>,
    index: HashMap<&'a str, usize>,
}

impl<'a> Grouping<'a> {
    /// Group talks by the names `names_of` picks out of each one.
    pub fn build<F>(talks: &'a [Talk], names_of: F) -> Self
    where
        F: Fn(&'a Talk) -> &'a [String],
    {
        let mut grouping = Self::default();

        for talk in talks {
            let names = names_of(talk);
            for (pos, name) in names.iter().enumerate() {
                // A name listed twice on one talk only files it once.
                if names[..pos].contains(name) {
                    continue;
                }
                grouping.push(name, talk);
            }
        }

        grouping
    }

    fn push(&mut self, name: &'a str, talk: &'a Talk) {
        match self.index.get(name) {
            Some(&pos) => self.groups[pos].1.push(talk),
            None => {
                self.index.insert(name, self.groups.len());
                self.groups.push((name, vec![talk]));
            }
        }
    }

    /// Talks filed under `name`.
    #[allow(dead_code)] // Lookup helper
    pub fn get(&self, name: &str) -> Option<&[&'a Talk]> {
        self.index
            .get(name)
            .map(|&pos| self.groups[pos].1.as_slice())
    }

    /// Groups in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &[&'a Talk])> + '_ {
        self.groups.iter().map(|(name, talks)| (*name, talks.as_slice()))
    }

    /// Groups ordered by talk count, largest first; ties keep first-seen order.
    pub fn by_count(&self) -> Vec<(&'a str, &[&'a Talk])> {
        let mut groups: Vec<_> = self.iter().collect();
        groups.sort_by_key(|(_, talks)| std::cmp::Reverse(talks.len()));
        groups
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    #[allow(dead_code)] // Pairs with len()
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Group talks by speaker; a talk with several speakers lands in each bucket.
pub fn group_by_speaker(talks: &[Talk]) -> Grouping<'_> {
    Grouping::build(talks, |t| t.speakers.as_slice())
}

/// Group talks by topic; a talk with several topics lands in each bucket.
pub fn group_by_topic(talks: &[Talk]) -> Grouping<'_> {
    Grouping::build(talks, |t| t.topics.as_slice())
}

/// Talks per topic, most frequent first.
pub fn count_by_topic(talks: &[Talk]) -> Ranking {
    Ranking::tally(talks.iter().map(|t| t.topics.as_slice()))
}

/// Talks per speaker, most frequent first.
pub fn count_by_speaker(talks: &[Talk]) -> Ranking {
    Ranking::tally(talks.iter().map(|t| t.speakers.as_slice()))
}

/// All the aggregates the renderers need, built once per run.
#[derive(Debug, Clone)]
pub struct TalkIndex<'a> {
    pub talks: &'a [Talk],
    pub stats: TalkStats,
    pub by_speaker: Grouping<'a>,
    pub by_topic: Grouping<'a>,
}

impl<'a> TalkIndex<'a> {
    pub fn build(talks: &'a [Talk]) -> Self {
        Self {
            talks,
            stats: TalkStats::from_talks(talks),
            by_speaker: group_by_speaker(talks),
            by_topic: group_by_topic(talks),
        }
    }

    /// Talks with an empty speaker list; they appear in no speaker bucket.
    pub fn talks_without_speakers(&self) -> impl Iterator<Item = &'a Talk> {
        self.talks.iter().filter(|t| t.speakers.is_empty())
    }
}
