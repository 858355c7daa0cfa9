//! The end-to-end batch run: load, filter, sort, group, render, write.

use crate::analysis::{partition_speakers, select_talks, sort_by_created, TalkIndex};
use crate::config::Config;
use crate::error::{PicksError, Result};
use crate::report;
use crate::source;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// What a run produced.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub records_read: usize,
    pub talks_selected: usize,
    pub speakers: usize,
    pub repeat_speakers: usize,
    pub topics: usize,
    /// Files written, in write order. Empty on a dry run.
    pub outputs: Vec<PathBuf>,
}

/// Run the whole pipeline for one configuration.
///
/// With `dry_run` set everything up to rendering happens but no file is
/// touched.
pub fn run(config: &Config, dry_run: bool) -> Result<RunSummary> {
    let loader = source::from_config(&config.source);
    info!("Loading dataset from {}", loader.describe());
    let records = loader.load()?;
    let records_read = records.len();

    let mut talks = select_talks(records, &config.filter)?;
    sort_by_created(&mut talks);
    info!(
        "Selected {} of {} records ({} / rating {} / {})",
        talks.len(),
        records_read,
        config.filter.resource_type,
        config.filter.rating,
        if config.filter.language.is_empty() {
            "any language"
        } else {
            config.filter.language.as_str()
        }
    );

    let index = TalkIndex::build(&talks);
    let buckets = partition_speakers(&index.by_speaker);
    info!(
        "{} speaker attributions across {} speakers, {} topics",
        index.stats.talks_per_speaker.total(),
        index.stats.talks_per_speaker.len(),
        index.stats.talks_per_topic.len()
    );
    for (topic, count) in index.stats.talks_per_topic.iter().take(5) {
        debug!("Top topic {}: {} talks", topic, count);
    }

    let unattributed = index.talks_without_speakers().count();
    if unattributed > 0 {
        warn!(
            "{} talks have no speakers and only appear on the topic page",
            unattributed
        );
    }

    let mut summary = RunSummary {
        records_read,
        talks_selected: talks.len(),
        speakers: index.by_speaker.len(),
        repeat_speakers: buckets.iter().filter(|b| !b.is_others()).count(),
        topics: index.by_topic.len(),
        outputs: Vec::new(),
    };

    if dry_run {
        info!("Dry run, nothing written");
        return Ok(summary);
    }

    let out = &config.output;
    let rendered = [
        json_output(
            out.data_dir.join(&out.talks_file),
            report::generate_talks_json(&talks),
        )?,
        json_output(
            out.data_dir.join(&out.stats_file),
            report::generate_stats_json(&index.stats),
        )?,
        json_output(
            out.data_dir.join(&out.by_speaker_file),
            report::generate_by_speaker_json(&buckets),
        )?,
        (
            out.site_dir.join(&out.index_file),
            report::generate_speaker_page(&config.site, &buckets, &out.by_topic_page),
        ),
        (
            out.site_dir.join(&out.by_topic_page),
            report::generate_topic_page(&config.site, &index.by_topic, &out.index_file),
        ),
    ];

    for (path, content) in rendered {
        report::write_output(&path, &content)?;
        info!("Wrote {}", path.display());
        summary.outputs.push(path);
    }

    debug!("Run summary: {:?}", summary);
    Ok(summary)
}

fn json_output(path: PathBuf, generated: serde_json::Result<String>) -> Result<(PathBuf, String)> {
    match generated {
        Ok(content) => Ok((path, content)),
        Err(source) => Err(PicksError::Serialize { path, source }),
    }
}
