//! Profile-relevance scoring for snapshot items.
//!
//! Pure and deterministic: the same item and profile always produce the same
//! score, so re-running a sync never reshuffles an existing plan.

use crate::profile::ResearchProfile;
use crate::zotero::{categorize_tags, BibItem};

/// Per-keyword points, mutually exclusive per keyword (strongest wins).
const TITLE_MATCH: f64 = 4.0;
const KEYWORD_MATCH: f64 = 3.0;
const ABSTRACT_MATCH: f64 = 1.5;

/// Flat bonus per evidence-language term found anywhere in the item text.
const EVIDENCE_BONUS: f64 = 0.75;
/// Flat bonus when the item carries any `m:` method tag.
const METHOD_TAG_BONUS: f64 = 2.0;

/// Evidence-language markers that signal strong study designs.
const EVIDENCE_TERMS: [&str; 5] = [
    "meta-analysis",
    "systematic review",
    "randomized",
    "rct",
    "effect size",
];

/// Scores an item against the research profile on a 0-100 scale.
///
/// Each profile keyword contributes at most one tier: title (+4), else item
/// keywords (+3), else abstract (+1.5), all case-insensitive substring
/// matches. Evidence-language terms add +0.75 apiece and a method tag adds
/// +2. The raw sum is normalized by the maximum attainable points
/// (`keywords * 4 + 2`), scaled to 100, rounded to one decimal, and clamped.
/// An empty keyword set scores 0.
pub fn relevance_score(item: &BibItem, profile: &ResearchProfile) -> f64 {
    if profile.keywords.is_empty() {
        return 0.0;
    }

    let title = item.title.to_lowercase();
    let abstract_text = item.abstract_text.to_lowercase();
    let keywords: Vec<String> = item
        .keywords()
        .iter()
        .map(|k| k.to_lowercase())
        .collect();
    let combined = format!("{title} {abstract_text} {}", keywords.join(" "));

    let mut points = 0.0;
    for term in &profile.keywords {
        if title.contains(term.as_str()) {
            points += TITLE_MATCH;
        } else if keywords.iter().any(|k| k.contains(term.as_str())) {
            points += KEYWORD_MATCH;
        } else if abstract_text.contains(term.as_str()) {
            points += ABSTRACT_MATCH;
        }
    }

    for term in &EVIDENCE_TERMS {
        if combined.contains(term) {
            points += EVIDENCE_BONUS;
        }
    }

    if !categorize_tags(&item.keywords()).method.is_empty() {
        points += METHOD_TAG_BONUS;
    }

    let max_points = profile.keywords.len() as f64 * TITLE_MATCH + METHOD_TAG_BONUS;
    let scaled = points / max_points * 100.0;
    ((scaled * 10.0).round() / 10.0).min(100.0)
}
