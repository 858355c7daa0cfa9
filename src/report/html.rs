//! HTML page generation.
//!
//! This module renders the two static views of the picks: talks grouped
//! by speaker (`index.html`) and talks grouped by topic.

use crate::analysis::{Grouping, SpeakerBucket};
use crate::config::SiteConfig;
use crate::models::Talk;
use std::collections::HashMap;

/// Label of the `others` bucket on the by-speaker page.
const OTHERS_LABEL: &str = "Other speakers";

/// Format a duration in seconds as `MM:SS`.
///
/// Minutes are not folded into hours. A missing or zero duration gives an
/// empty string.
pub fn format_duration(seconds: Option<u32>) -> String {
    match seconds {
        Some(secs) if secs > 0 => format!("{:02}:{:02}", secs / 60, secs % 60),
        _ => String::new(),
    }
}

/// In-page anchor for a group key: lowercased, spaces and periods to `_`.
pub fn anchor_for(key: &str) -> String {
    key.to_lowercase().replace([' ', '.'], "_")
}

/// Hands out anchors for one page.
///
/// The first key to normalize to an anchor keeps it; later keys that
/// collide get `_2`, `_3`, ... in the order they are claimed.
#[derive(Debug, Default)]
pub struct Anchors {
    taken: HashMap<String, usize>,
}

impl Anchors {
    pub fn claim(&mut self, key: &str) -> String {
        let base = anchor_for(key);
        let mut candidate = base.clone();

        while let Some(uses) = self.taken.get_mut(&candidate) {
            *uses += 1;
            candidate = format!("{}_{}", base, uses);
        }

        self.taken.insert(candidate.clone(), 1);
        candidate
    }
}

/// Escape text for HTML content and double-quoted attributes.
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// One outer list entry of a page.
struct Section<'a> {
    anchor: String,
    label: &'a str,
    talks: &'a [&'a Talk],
    show_speakers: bool,
}

/// Generate the by-speaker page.
///
/// Repeat speakers come first, without repeating the speaker on each
/// talk; the `others` bucket follows in its own list with speaker names.
pub fn generate_speaker_page(site: &SiteConfig, buckets: &[SpeakerBucket<'_>], topic_page: &str) -> String {
    let mut anchors = Anchors::default();

    let mut speakers = Vec::new();
    let mut others = None;
    for bucket in buckets {
        if bucket.is_others() {
            others = Some(bucket);
            continue;
        }
        speakers.push(Section {
            anchor: anchors.claim(bucket.name()),
            label: bucket.name(),
            talks: &bucket.talks,
            show_speakers: false,
        });
    }
    let others = others.map(|bucket| Section {
        anchor: anchors.claim(bucket.name()),
        label: OTHERS_LABEL,
        talks: &bucket.talks,
        show_speakers: true,
    });

    let mut page = String::new();
    page.push_str(&generate_page_header(&site.title, &site.heading, &site.intro));
    page.push_str(&generate_alternate_link(topic_page, "Browse by topic"));
    page.push_str(&generate_navigation(speakers.iter().chain(others.iter())));

    page.push_str(&generate_section_list(&speakers));
    if let Some(others) = others {
        page.push_str("    <br>\n");
        page.push_str("    <br>\n");
        page.push_str(&generate_section_list(std::slice::from_ref(&others)));
    }

    page.push_str(&generate_page_footer());
    page
}

/// Generate the by-topic page, largest topics first.
pub fn generate_topic_page(site: &SiteConfig, by_topic: &Grouping<'_>, speaker_page: &str) -> String {
    let mut anchors = Anchors::default();

    let topics: Vec<Section<'_>> = by_topic
        .by_count()
        .into_iter()
        .map(|(topic, talks)| Section {
            anchor: anchors.claim(topic),
            label: topic,
            talks,
            show_speakers: true,
        })
        .collect();

    let mut page = String::new();
    page.push_str(&generate_page_header(&site.title, &site.topic_heading, &site.intro));
    page.push_str(&generate_alternate_link(speaker_page, "Browse by speaker"));
    page.push_str(&generate_navigation(topics.iter()));
    page.push_str(&generate_section_list(&topics));
    page.push_str(&generate_page_footer());
    page
}

fn generate_page_header(title: &str, heading: &str, intro: &[String]) -> String {
    let mut header = String::new();

    header.push_str("<html>\n");
    header.push_str("  <head>\n");
    header.push_str("    <meta charset=\"utf-8\">\n");
    header.push_str(&format!("    <title>{}</title>\n", escape(title)));
    header.push_str("  </head>\n");
    header.push_str("  <body>\n");
    header.push_str(&format!("    <h1>{}</h1>\n", escape(heading)));

    // Intro blocks are trusted HTML from the config file.
    for block in intro {
        header.push_str(&format!("    {}\n", block.trim()));
    }

    header
}

fn generate_page_footer() -> String {
    "  </body>\n</html>\n".to_string()
}

fn generate_alternate_link(href: &str, label: &str) -> String {
    format!("    <p><a href=\"{}\">{}</a></p>\n", escape(href), label)
}

fn generate_navigation<'s, 'a: 's>(sections: impl Iterator<Item = &'s Section<'a>>) -> String {
    let mut nav = String::new();

    nav.push_str("    <ul class=\"nav\">\n");
    for section in sections {
        nav.push_str(&format!(
            "      <li><a href=\"#{}\">{}</a> ({})</li>\n",
            escape(&section.anchor),
            escape(section.label),
            section.talks.len()
        ));
    }
    nav.push_str("    </ul>\n");

    nav
}

fn generate_section_list(sections: &[Section<'_>]) -> String {
    let mut list = String::new();

    list.push_str("    <ul>\n");
    for section in sections {
        list.push_str(&format!(
            "    <li id=\"{}\">{}</li>\n",
            escape(&section.anchor),
            escape(section.label)
        ));
        list.push_str("      <ul>\n");
        for talk in section.talks {
            list.push_str(&format!(
                "      <li>{}</li>\n",
                generate_talk_line(talk, section.show_speakers)
            ));
        }
        list.push_str("      </ul>\n");
    }
    list.push_str("    </ul>\n");

    list
}

/// Render the inner list content for one talk.
///
/// Link, then speakers, topics, duration and description; empty parts are
/// left out.
pub fn generate_talk_line(talk: &Talk, show_speakers: bool) -> String {
    let mut parts = vec![format!(
        "<a href=\"{}\">{}</a>",
        escape(&talk.url),
        escape(&talk.name)
    )];

    if show_speakers && !talk.speakers.is_empty() {
        parts.push(format!(
            "(<strong>{}</strong>)",
            escape(&talk.speakers.join(", "))
        ));
    }

    if !talk.topics.is_empty() {
        parts.push(format!(
            "<strong>[{}]</strong>",
            escape(&talk.topics.join(", "))
        ));
    }

    let duration = format_duration(talk.duration);
    if !duration.is_empty() {
        parts.push(format!("<strong>[Duration: {}]</strong>", duration));
    }

    if let Some(ref description) = talk.description {
        parts.push(escape(description.trim()));
    }

    parts.join(" ")
}
