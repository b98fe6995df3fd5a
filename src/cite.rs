//! Citation paragraph assembler.
//!
//! Turns the best cards into draft literature-review paragraphs, each backed
//! by ranked evidence sentences from the card's abstract and paired with a
//! row in a CSV citation trace so every drafted claim can be checked against
//! its source sentence later.

use crate::card::extract_section;
use crate::card::types::{CardRecord, ReadingPriority};
use crate::evidence::pick_evidence;

/// Selection knobs for one assembly run.
#[derive(Debug, Clone)]
pub struct CiteOptions {
    /// Lowercased focus terms boosting evidence sentences.
    pub focus: Vec<String>,
    pub max_paragraphs: usize,
    pub min_relevance: f64,
    pub evidence_sentences: usize,
}

impl Default for CiteOptions {
    fn default() -> Self {
        Self {
            focus: Vec::new(),
            max_paragraphs: 12,
            min_relevance: 0.0,
            evidence_sentences: 2,
        }
    }
}

/// One drafted paragraph with its audit fields.
#[derive(Debug, Clone)]
pub struct CitationEntry {
    pub title: String,
    pub stem: String,
    pub year: String,
    pub zotero_key: String,
    pub doi: String,
    pub relevance_score: f64,
    pub citation: String,
    pub apa_reference: String,
    pub paragraph: String,
    pub evidence: Vec<String>,
}

/// Splits a comma-separated `--focus` value into lowercased terms.
pub fn parse_focus_terms(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Assembles citation entries from the card store.
///
/// Cards below `min_relevance` are dropped; the rest are ordered by
/// (must-read, relevance) descending with stable ties, and truncated to
/// `max_paragraphs`. A card with no abstract section and no evidence is
/// skipped entirely.
pub fn assemble(cards: &[CardRecord], options: &CiteOptions) -> Vec<CitationEntry> {
    let mut eligible: Vec<&CardRecord> = cards
        .iter()
        .filter(|c| c.header.relevance_score >= options.min_relevance)
        .collect();
    eligible.sort_by(|a, b| {
        let a_key = (
            a.header.reading_priority == ReadingPriority::MustRead,
            a.header.relevance_score,
        );
        let b_key = (
            b.header.reading_priority == ReadingPriority::MustRead,
            b.header.relevance_score,
        );
        b_key
            .partial_cmp(&a_key)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut entries = Vec::new();
    for card in eligible {
        if entries.len() >= options.max_paragraphs {
            break;
        }
        let abstract_text = extract_section(&card.body, "Abstract");
        let evidence = pick_evidence(&abstract_text, &options.focus, options.evidence_sentences);
        if evidence.is_empty() && abstract_text.is_empty() {
            continue;
        }

        let author = first_author(card);
        let year = if card.header.year.is_empty() {
            "n.d.".to_string()
        } else {
            card.header.year.clone()
        };
        let citation = if card.header.zotero_key.is_empty() {
            format!("({author}, {year})")
        } else {
            format!("[@{}]", card.header.zotero_key)
        };
        let claim = claim_template(&card.header.title, &evidence);
        let paragraph = format!(
            "{claim} In particular, the findings of {author} ({year}) indicate that this \
             mechanism extends to mental-health outcomes {citation}."
        );

        entries.push(CitationEntry {
            title: card.header.title.clone(),
            stem: card.stem.clone(),
            year,
            zotero_key: card.header.zotero_key.clone(),
            doi: card.header.doi.clone(),
            relevance_score: card.header.relevance_score,
            citation,
            apa_reference: format_apa_reference(card),
            paragraph,
            evidence,
        });
    }
    entries
}

/// First-author surname: the authors list when present, else a heuristic
/// parse of a raw `authors` scalar left over from hand-written cards.
fn first_author(card: &CardRecord) -> String {
    if let Some(first) = card.header.authors.first() {
        return surname(first);
    }
    if let Some(raw) = card.header.extra.get("authors") {
        if let Some(first) = raw.split(';').next() {
            let first = first.trim();
            if !first.is_empty() {
                return surname(first);
            }
        }
    }
    "Unknown".to_string()
}

/// `"Cuijpers, Pim"` and `"Pim Cuijpers"` both yield `Cuijpers`.
fn surname(author: &str) -> String {
    let author = author.trim();
    if let Some((family, _)) = author.split_once(',') {
        return family.trim().to_string();
    }
    author
        .split_whitespace()
        .last()
        .unwrap_or("Unknown")
        .to_string()
}

/// `"Cuijpers, Pim"` → `"Cuijpers, P."`; `"Pim Cuijpers"` treated the same.
pub fn format_author_apa(author: &str) -> String {
    let author = author.trim();
    if author.is_empty() {
        return String::new();
    }
    let (family, given) = match author.split_once(',') {
        Some((f, g)) => (f.trim().to_string(), g.trim().to_string()),
        None => {
            let parts: Vec<&str> = author.split_whitespace().collect();
            match parts.as_slice() {
                [single] => return (*single).to_string(),
                [given @ .., family] => ((*family).to_string(), given.join(" ")),
                [] => return String::new(),
            }
        }
    };

    let initials: Vec<String> = given
        .split(|c: char| c.is_whitespace() || c == '-')
        .filter_map(|token| token.chars().next())
        .map(|c| format!("{}.", c.to_uppercase()))
        .collect();
    if initials.is_empty() {
        family
    } else {
        format!("{family}, {}", initials.join(" "))
    }
}

/// Joins APA-formatted authors, `&` before the last when there are several.
pub fn format_authors_apa(authors: &[String]) -> String {
    let formatted: Vec<String> = authors
        .iter()
        .map(|a| format_author_apa(a))
        .filter(|a| !a.is_empty())
        .collect();
    match formatted.as_slice() {
        [] => "Unknown".to_string(),
        [one] => one.clone(),
        [first, second] => format!("{first}, & {second}"),
        [init @ .., last] => format!("{}, & {last}", init.join(", ")),
    }
}

/// APA-style reference line; volume/issue/pages come from the header's
/// unknown-key side-map when a hand edit added them.
pub fn format_apa_reference(card: &CardRecord) -> String {
    let header = &card.header;
    let authors = format_authors_apa(&header.authors);
    let year = if header.year.is_empty() { "n.d." } else { &header.year };
    let title = if header.title.is_empty() { "Untitled" } else { &header.title };

    let mut reference = format!("{authors} ({year}). {title}.");

    if !header.journal.is_empty() {
        let mut journal_part = header.journal.clone();
        let volume = extra(card, "volume");
        let issue = extra(card, "issue");
        let pages = extra(card, "pages").or_else(|| extra(card, "page"));
        if let Some(volume) = volume {
            journal_part.push_str(&format!(", {volume}"));
            if let Some(issue) = issue {
                journal_part.push_str(&format!("({issue})"));
            }
        }
        if let Some(pages) = pages {
            journal_part.push_str(&format!(", {pages}"));
        }
        reference.push_str(&format!(" {journal_part}."));
    }

    if !header.doi.is_empty() {
        if header.doi.starts_with("http") {
            reference.push_str(&format!(" {}", header.doi));
        } else {
            reference.push_str(&format!(" https://doi.org/{}", header.doi));
        }
    }
    reference
}

fn extra(card: &CardRecord, key: &str) -> Option<String> {
    card.header
        .extra
        .get(key)
        .filter(|v| !v.trim().is_empty())
        .map(|v| v.trim().to_string())
}

/// Claim sentence keyed on the evidence language of the top sentence.
fn claim_template(title: &str, evidence: &[String]) -> String {
    let Some(key) = evidence.first() else {
        return format!(
            "Prior work suggests the topic addressed in {title} may be meaningfully linked \
             to mental-health outcomes."
        );
    };
    let key = key.to_lowercase();
    if key.contains("meta-analysis") || key.contains("systematic") {
        "Meta-analytic and systematic-review evidence links this variable to consistent \
         associations with depression and anxiety outcomes."
            .to_string()
    } else if key.contains("random") || key.contains("rct") {
        "Experimental evidence reports that the intervention can improve mental-health \
         indicators."
            .to_string()
    } else {
        "Taken together, prior findings indicate this variable carries meaningful \
         explanatory weight for mental-health outcomes."
            .to_string()
    }
}

/// Renders the markdown paragraph bank.
pub fn render_bank(
    entries: &[CitationEntry],
    section: &str,
    focus: &[String],
    timestamp: &str,
) -> String {
    let mut out = format!(
        "# Paragraph Bank ({section})\n\n> Generated: {timestamp}\n> Focus terms: {}\n\n\
         These paragraphs are drafts. Verify numbers and directions against the \
         original PDFs before using a sentence.\n\n",
        if focus.is_empty() {
            "(none)".to_string()
        } else {
            focus.join(", ")
        }
    );
    for (idx, entry) in entries.iter().enumerate() {
        out.push_str(&format!("## {}. {}\n\n", idx + 1, entry.title));
        out.push_str(&format!("- Draft Paragraph: {}\n", entry.paragraph));
        out.push_str(&format!("- Citation: {}\n", entry.citation));
        out.push_str(&format!("- APA Reference: {}\n", entry.apa_reference));
        if !entry.doi.is_empty() {
            out.push_str(&format!("- DOI: https://doi.org/{}\n", entry.doi));
        }
        out.push_str(&format!("- Source Card: [[cards/{}]]\n", entry.stem));
        out.push_str("- Evidence Snippets:\n");
        if entry.evidence.is_empty() {
            out.push_str("  - (no abstract; check the card's notes)\n");
        } else {
            for ev in &entry.evidence {
                out.push_str(&format!("  - {ev}\n"));
            }
        }
        out.push_str("- Verification: check numbers, effect sizes and directions in the original\n\n");
    }
    out
}

/// Column order of the citation trace, aligned with [`render_trace`].
pub const TRACE_COLUMNS: [&str; 11] = [
    "paragraph_id",
    "title",
    "citation",
    "zotero_key",
    "year",
    "relevance_score",
    "draft_paragraph",
    "apa_reference",
    "evidence_snippet_1",
    "evidence_snippet_2",
    "source_card",
];

/// Renders the CSV citation trace, one row per bank paragraph.
pub fn render_trace(entries: &[CitationEntry]) -> String {
    let mut out = TRACE_COLUMNS.join(",");
    out.push('\n');
    for (idx, entry) in entries.iter().enumerate() {
        let fields = [
            (idx + 1).to_string(),
            entry.title.clone(),
            entry.citation.clone(),
            entry.zotero_key.clone(),
            entry.year.clone(),
            entry.relevance_score.to_string(),
            entry.paragraph.clone(),
            entry.apa_reference.clone(),
            entry.evidence.first().cloned().unwrap_or_default(),
            entry.evidence.get(1).cloned().unwrap_or_default(),
            format!("cards/{}.md", entry.stem),
        ];
        let row: Vec<String> = fields.iter().map(|f| csv_field(f)).collect();
        out.push_str(&row.join(","));
        out.push('\n');
    }
    out
}

/// Quotes a CSV field when it needs it; doubles embedded quotes.
fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
