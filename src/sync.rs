//! Card synchronizer: snapshot in, new cards out.
//!
//! One pass per run: diff the snapshot against the stems already on disk,
//! score the survivors, optionally enrich the best ones, and write each new
//! card with a create-only open. Existing cards are never touched, so
//! running the sync twice over an unchanged snapshot creates nothing.

use std::time::Duration;

use anyhow::Result;
use tracing::{info, warn};

use crate::card::store::{CardStore, CreateOutcome};
use crate::card::types::{CardHeader, CardRecord, CardSource};
use crate::card::{frontmatter, safe_filename};
use crate::enrich::{analyze_paper, Analysis, Enricher};
use crate::profile::ResearchProfile;
use crate::relevance::relevance_score;
use crate::zotero::{categorize_tags, BibItem};

/// Knobs for one sync run.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Cap on how many new cards to process this run.
    pub limit: Option<usize>,
    /// Plan and report without writing or enriching.
    pub dry_run: bool,
    /// Pause between enrichment calls (provider rate limits).
    pub pause: Duration,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            limit: None,
            dry_run: false,
            pause: Duration::from_secs(1),
        }
    }
}

/// What happened to one planned card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardOutcome {
    Created,
    DryRun,
    /// Another item in this run already claimed the stem (or a file appeared
    /// underneath us); first write wins.
    Collision,
    WriteFailed,
}

/// One planned card and its fate.
#[derive(Debug, Clone)]
pub struct CardReport {
    pub stem: String,
    pub score: f64,
    pub outcome: CardOutcome,
    pub enriched: bool,
}

/// Counts and per-card outcomes for one sync run.
#[derive(Debug, Default)]
pub struct SyncReport {
    /// Items in the snapshot, before any filtering.
    pub total_items: usize,
    /// Stems already present before the run.
    pub existing_cards: usize,
    /// Items dropped because their title sanitized to nothing.
    pub unnamed: usize,
    /// Items whose card already existed before the run.
    pub skipped_existing: usize,
    /// Items dropped by the limit cap.
    pub over_limit: usize,
    /// Enrichment attempts that fell back to metadata-only.
    pub enrich_failures: usize,
    pub cards: Vec<CardReport>,
}

impl SyncReport {
    pub fn created(&self) -> usize {
        self.count(CardOutcome::Created)
    }

    pub fn collisions(&self) -> usize {
        self.count(CardOutcome::Collision)
    }

    pub fn write_failures(&self) -> usize {
        self.count(CardOutcome::WriteFailed)
    }

    fn count(&self, outcome: CardOutcome) -> usize {
        self.cards.iter().filter(|c| c.outcome == outcome).count()
    }
}

/// Sync the snapshot into the card store.
///
/// `enricher` is `None` for metadata-only mode; when present, each planned
/// card with an abstract is analyzed before writing, and any provider
/// failure downgrades that card to metadata-only rather than aborting.
pub async fn sync(
    store: &CardStore,
    items: Vec<BibItem>,
    profile: &ResearchProfile,
    enricher: Option<&dyn Enricher>,
    options: &SyncOptions,
    today: &str,
) -> Result<SyncReport> {
    let mut report = SyncReport {
        total_items: items.len(),
        ..SyncReport::default()
    };

    let existing = store.existing_stems()?;
    report.existing_cards = existing.len();

    // Diff against the store, score, and order best-first so a limit spends
    // the enrichment budget on the most relevant items.
    let mut planned: Vec<(BibItem, String, f64)> = Vec::new();
    for item in items {
        let stem = safe_filename(&item.title);
        if stem.is_empty() {
            report.unnamed += 1;
            continue;
        }
        if existing.contains(&stem) {
            report.skipped_existing += 1;
            continue;
        }
        let score = relevance_score(&item, profile);
        planned.push((item, stem, score));
    }
    planned.sort_by(|a, b| b.2.partial_cmp(&a.2).unwrap_or(std::cmp::Ordering::Equal));

    if let Some(limit) = options.limit {
        if planned.len() > limit {
            report.over_limit = planned.len() - limit;
            planned.truncate(limit);
        }
    }

    info!(
        snapshot = report.total_items,
        existing = report.existing_cards,
        new = planned.len(),
        dry_run = options.dry_run,
        "planned sync"
    );

    for (item, stem, score) in planned {
        if options.dry_run {
            report.cards.push(CardReport {
                stem,
                score,
                outcome: CardOutcome::DryRun,
                enriched: false,
            });
            continue;
        }

        let mut analysis = None;
        if let Some(enricher) = enricher {
            if !item.abstract_text.is_empty() {
                match analyze_paper(enricher, &item.abstract_text, &profile.text).await {
                    Ok(a) => analysis = Some(a),
                    Err(e) => {
                        warn!(stem = %stem, error = %e, "enrichment failed, using metadata only");
                        report.enrich_failures += 1;
                    }
                }
                tokio::time::sleep(options.pause).await;
            }
        }

        let (header, body) = compose_card(&item, score, analysis.as_ref(), today);
        let enriched = header.source == CardSource::AiAnalyzed;
        let text = frontmatter::serialize(&header, &body);
        let outcome = match store.create(&stem, &text) {
            Ok(CreateOutcome::Created) => CardOutcome::Created,
            Ok(CreateOutcome::AlreadyExists) => {
                warn!(stem = %stem, "duplicate sanitized title, keeping the first card");
                CardOutcome::Collision
            }
            Err(e) => {
                warn!(stem = %stem, error = %e, "card write failed");
                CardOutcome::WriteFailed
            }
        };
        report.cards.push(CardReport {
            stem,
            score,
            outcome,
            enriched,
        });
    }

    Ok(report)
}

/// Build the full card for one snapshot item.
pub fn compose_card(
    item: &BibItem,
    score: f64,
    analysis: Option<&Analysis>,
    today: &str,
) -> (CardHeader, String) {
    let facets = categorize_tags(&item.keywords());
    let mut tags = item.keywords();

    let mut header = CardHeader {
        title: if item.title.is_empty() {
            "Untitled".to_string()
        } else {
            item.title.clone()
        },
        authors: item.authors(),
        year: item.year(),
        journal: item.journal.clone(),
        doi: item.doi.clone(),
        method: facets.method.join(", "),
        measurement: facets.measurement.join(", "),
        population: facets.population.join(", "),
        design: facets.design.join(", "),
        relevance_score: score,
        zotero_key: item.id.clone(),
        card_type: "quickcard".to_string(),
        created: today.to_string(),
        ..CardHeader::default()
    };

    let mut key_claims: &[String] = &[];
    let mut main_finding = "";
    let mut limitations = "";
    let mut relevance_text = "";
    let mut priority_reason = "";
    if let Some(a) = analysis {
        header.method = a.method_type.clone();
        header.measurement = a.measurement_tools.clone();
        header.population = a.population.clone();
        header.design = a.design.clone();
        header.sample_size = a.sample_size.clone();
        header.effect_size = a.effect_size.clone();
        header.reading_priority = a.reading_priority.parse().unwrap_or_default();
        header.source = CardSource::AiAnalyzed;
        for t in &a.suggested_topic_tags {
            let tag = format!("topic:{t}");
            if !tags.contains(&tag) {
                tags.push(tag);
            }
        }
        key_claims = &a.key_claims;
        main_finding = &a.main_finding;
        limitations = &a.limitations;
        relevance_text = &a.relevance_to_my_research;
        priority_reason = &a.priority_reason;
    }
    header.tags = tags;

    let mut body = String::new();
    body.push_str(&format!("\n# {}\n\n", header.title));
    body.push_str(&format!("**Priority:** {}\n", header.reading_priority));
    if !priority_reason.is_empty() {
        body.push_str(&format!("> {priority_reason}\n"));
    }
    body.push('\n');
    body.push_str(&format!("**Authors:** {}\n", header.authors.join("; ")));
    body.push_str(&format!("**Year:** {}\n", header.year));
    if !header.journal.is_empty() {
        body.push_str(&format!("**Journal:** {}\n", header.journal));
    }
    if !header.doi.is_empty() {
        body.push_str(&format!("**DOI:** https://doi.org/{}\n", header.doi));
    }
    body.push_str(&format!("**Relevance:** {score}/100\n"));

    body.push_str("\n## Study Breakdown\n\n");
    body.push_str("| Field | Value |\n|-------|-------|\n");
    for (label, value) in [
        ("Method", &header.method),
        ("N", &header.sample_size),
        ("Population", &header.population),
        ("Design", &header.design),
        ("Measurement", &header.measurement),
        ("Effect Size", &header.effect_size),
    ] {
        let cell = if value.is_empty() { "<!-- fill in -->" } else { value };
        body.push_str(&format!("| **{label}** | {cell} |\n"));
    }

    if !key_claims.is_empty() {
        body.push_str("\n## Key Claims\n\n");
        for (i, claim) in key_claims.iter().enumerate() {
            body.push_str(&format!("{}. {claim}\n", i + 1));
        }
    }
    if !main_finding.is_empty() {
        body.push_str(&format!("\n## Main Finding\n\n{main_finding}\n"));
    }
    if !item.abstract_text.is_empty() {
        body.push_str(&format!("\n## Abstract\n\n{}\n", item.abstract_text));
    }
    body.push_str("\n## Connections to My Research\n\n");
    if relevance_text.is_empty() {
        body.push_str("<!-- how this paper connects to my research -->\n");
    } else {
        body.push_str(relevance_text);
        body.push('\n');
    }
    if !limitations.is_empty() {
        body.push_str(&format!("\n## Limitations\n\n{limitations}\n"));
    }
    body.push_str("\n## My Notes\n\n<!-- notes after reading -->\n");
    body.push_str("\n## Related\n\n<!-- [[related cards]] -->\n");

    (header, body)
}

/// Re-parse helper for reports and tests.
pub fn card_from_text(stem: &str, text: &str) -> CardRecord {
    let (header, body) = frontmatter::parse(text);
    CardRecord {
        stem: stem.to_string(),
        header,
        body: body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::extract_section;
    use crate::card::types::ReadingPriority;

    fn item(title: &str, abstract_text: &str, keywords: &[&str]) -> BibItem {
        serde_json::from_value(serde_json::json!({
            "id": "KEY1",
            "title": title,
            "abstract": abstract_text,
            "keyword": keywords,
        }))
        .unwrap()
    }

    #[test]
    fn metadata_card_uses_facets_and_defaults() {
        let it = item(
            "AI and Anxiety",
            "We studied anxiety.",
            &["m:survey", "pop:adults", "topic:ai"],
        );
        let (header, body) = compose_card(&it, 42.5, None, "2026-08-30");
        assert_eq!(header.method, "survey");
        assert_eq!(header.population, "adults");
        assert_eq!(header.reading_priority, ReadingPriority::ToRead);
        assert_eq!(header.source, CardSource::MetadataOnly);
        assert_eq!(header.relevance_score, 42.5);
        assert_eq!(header.card_type, "quickcard");
        assert_eq!(header.created, "2026-08-30");
        assert_eq!(extract_section(&body, "Abstract"), "We studied anxiety.");
        assert!(body.contains("<!-- fill in -->"), "empty fields become placeholders");
    }

    #[test]
    fn analyzed_card_overrides_fields_and_adds_topic_tags() {
        let it = item("AI and Anxiety", "An abstract.", &["topic:ai"]);
        let analysis = Analysis {
            key_claims: vec!["Claim one".to_string()],
            main_finding: "AI use predicts anxiety".to_string(),
            method_type: "RCT".to_string(),
            sample_size: "N=120".to_string(),
            reading_priority: "must-read".to_string(),
            suggested_topic_tags: vec!["ai".to_string(), "anxiety".to_string()],
            ..Analysis::default()
        };
        let (header, body) = compose_card(&it, 70.0, Some(&analysis), "2026-08-30");
        assert_eq!(header.method, "RCT");
        assert_eq!(header.sample_size, "N=120");
        assert_eq!(header.reading_priority, ReadingPriority::MustRead);
        assert_eq!(header.source, CardSource::AiAnalyzed);
        // "topic:ai" already present, "topic:anxiety" appended once.
        assert_eq!(
            header.tags,
            vec!["topic:ai".to_string(), "topic:anxiety".to_string()]
        );
        assert!(body.contains("1. Claim one"));
        assert!(body.contains("## Main Finding"));
    }

    #[test]
    fn bad_analysis_priority_falls_back_to_default() {
        let it = item("T", "", &[]);
        let analysis = Analysis {
            reading_priority: "someday".to_string(),
            ..Analysis::default()
        };
        let (header, _) = compose_card(&it, 0.0, Some(&analysis), "2026-08-30");
        assert_eq!(header.reading_priority, ReadingPriority::ToRead);
    }

    #[test]
    fn composed_card_round_trips_through_the_codec() {
        let it = item("Round Trip", "Long enough abstract text for the card.", &["m:rct"]);
        let (header, body) = compose_card(&it, 33.3, None, "2026-08-30");
        let text = frontmatter::serialize(&header, &body);
        let record = card_from_text("Round Trip", &text);
        assert_eq!(record.header, header);
        assert_eq!(record.body, body);
    }
}
