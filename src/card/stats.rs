use std::collections::BTreeMap;

use serde::Serialize;

use crate::card::types::{CardRecord, CardSource, ReadingPriority};

/// Summary of the card store, as shown by `carrel stats`.
#[derive(Debug, Serialize)]
pub struct StoreStats {
    pub total_cards: usize,
    pub by_priority: BTreeMap<String, usize>,
    pub by_source: BTreeMap<String, usize>,
    pub mean_relevance: f64,
    pub max_relevance: f64,
    /// Topic tags with their card counts, most frequent first (ties by name).
    pub topic_tags: Vec<(String, usize)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oldest_created: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub newest_created: Option<String>,
}

/// Compute card store statistics.
pub fn store_stats(cards: &[CardRecord]) -> StoreStats {
    let mut by_priority = BTreeMap::new();
    for p in ReadingPriority::ordered() {
        by_priority.insert(p.as_str().to_string(), 0);
    }
    let mut by_source = BTreeMap::new();
    for s in [CardSource::AiAnalyzed, CardSource::MetadataOnly] {
        by_source.insert(s.as_str().to_string(), 0);
    }

    let mut topic_counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut relevance_sum = 0.0;
    let mut max_relevance: f64 = 0.0;
    let mut oldest: Option<String> = None;
    let mut newest: Option<String> = None;

    for card in cards {
        *by_priority
            .entry(card.header.reading_priority.as_str().to_string())
            .or_insert(0) += 1;
        *by_source
            .entry(card.header.source.as_str().to_string())
            .or_insert(0) += 1;
        relevance_sum += card.header.relevance_score;
        max_relevance = max_relevance.max(card.header.relevance_score);
        for tag in &card.header.tags {
            if let Some(topic) = topic_tag_value(tag) {
                *topic_counts.entry(topic).or_insert(0) += 1;
            }
        }
        let created = &card.header.created;
        if !created.is_empty() {
            if oldest.as_deref().map_or(true, |o| created.as_str() < o) {
                oldest = Some(created.clone());
            }
            if newest.as_deref().map_or(true, |n| created.as_str() > n) {
                newest = Some(created.clone());
            }
        }
    }

    let mut topic_tags: Vec<(String, usize)> = topic_counts.into_iter().collect();
    topic_tags.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    let mean_relevance = if cards.is_empty() {
        0.0
    } else {
        relevance_sum / cards.len() as f64
    };

    StoreStats {
        total_cards: cards.len(),
        by_priority,
        by_source,
        mean_relevance,
        max_relevance,
        topic_tags,
        oldest_created: oldest,
        newest_created: newest,
    }
}

/// The value of a `topic:` tag, case-insensitive on the prefix.
///
/// Tags are free-form text, so the prefix check must stay on a char
/// boundary for values that open with multibyte characters.
pub fn topic_tag_value(tag: &str) -> Option<String> {
    const PREFIX: &str = "topic:";
    if tag.len() < PREFIX.len() || !tag.is_char_boundary(PREFIX.len()) {
        return None;
    }
    let (prefix, value) = tag.split_at(PREFIX.len());
    if prefix.eq_ignore_ascii_case(PREFIX) && !value.trim().is_empty() {
        Some(value.trim().to_string())
    } else {
        None
    }
}
