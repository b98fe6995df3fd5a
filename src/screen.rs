//! Database-export screening.
//!
//! Screens a search-export CSV (Scopus and friends) against the research
//! profile before anything is added to the reference manager. The baseline
//! is a keyword-count rule; an optional LLM pass can refine verdicts in
//! batches, with a failed batch silently keeping its rule-based verdicts.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::enrich::{strip_code_fences, EnrichError, Enricher};
use crate::index::{matches_axis, THEME_AXES};
use crate::profile::ResearchProfile;

/// One row of the export, normalized across vendor header spellings.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExportPaper {
    pub title: String,
    pub authors: String,
    pub abstract_text: String,
    pub year: String,
    pub journal: String,
    pub doi: String,
}

/// Rule-based or LLM relevance verdict for one paper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Relevance {
    High,
    Medium,
    Low,
    Irrelevant,
}

impl Relevance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
            Self::Irrelevant => "irrelevant",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Verdict {
    pub relevance: Relevance,
    pub reason: String,
    pub section_fit: String,
    pub is_counterargument: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScreenedPaper {
    #[serde(flatten)]
    pub paper: ExportPaper,
    #[serde(flatten)]
    pub verdict: Verdict,
}

/// Keyword-hit thresholds for the rule-based verdicts.
const HIGH_HITS: usize = 6;
const MEDIUM_HITS: usize = 3;
const LOW_HITS: usize = 1;

/// Phrases marking a paper as likely counter-evidence.
const COUNTER_TERMS: [&str; 5] = [
    "no effect",
    "null finding",
    "not significant",
    "ineffective",
    "mixed evidence",
];

/// Reads a database-export CSV.
///
/// Accepts the common header spellings (`Title`/`title`/`TI` and so on),
/// quoted fields with embedded commas and newlines, and a UTF-8 BOM. Rows
/// without a title are dropped.
pub fn read_export_csv(path: &Path) -> Result<Vec<ExportPaper>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("cannot read export CSV {}", path.display()))?;
    let raw = raw.strip_prefix('\u{feff}').unwrap_or(&raw);

    let mut records = parse_csv(raw);
    if records.is_empty() {
        return Ok(Vec::new());
    }
    let header = records.remove(0);

    let papers = records
        .into_iter()
        .map(|row| {
            let field = |names: &[&str]| -> String {
                for name in names {
                    if let Some(idx) = header.iter().position(|h| h == name) {
                        if let Some(value) = row.get(idx) {
                            if !value.is_empty() {
                                return value.clone();
                            }
                        }
                    }
                }
                String::new()
            };
            ExportPaper {
                title: field(&["Title", "title", "TI"]),
                authors: field(&["Authors", "authors", "AU"]),
                abstract_text: field(&["Abstract", "abstract", "AB"]),
                year: field(&["Year", "year", "PY"]),
                journal: field(&["Source title", "journal", "SO"]),
                doi: field(&["DOI", "doi", "DI"]),
            }
        })
        .filter(|p| !p.title.is_empty())
        .collect();
    Ok(papers)
}

/// Minimal RFC-4180 parser: quoted fields, doubled quotes, CRLF.
fn parse_csv(raw: &str) -> Vec<Vec<String>> {
    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = raw.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                _ => field.push(c),
            }
            continue;
        }
        match c {
            '"' => in_quotes = true,
            ',' => record.push(std::mem::take(&mut field)),
            '\r' => {}
            '\n' => {
                record.push(std::mem::take(&mut field));
                if !(record.len() == 1 && record[0].is_empty()) {
                    records.push(std::mem::take(&mut record));
                }
                record = Vec::new();
            }
            _ => field.push(c),
        }
    }
    if !field.is_empty() || !record.is_empty() {
        record.push(field);
        records.push(record);
    }
    records
}

/// Rule-based verdict for one paper: count profile keywords hitting the
/// title+abstract, flag counter-evidence phrases, and fit a review section.
pub fn rule_verdict(paper: &ExportPaper, profile: &ResearchProfile) -> Verdict {
    let content = format!(
        "{} {}",
        paper.title.to_lowercase(),
        paper.abstract_text.to_lowercase()
    );
    let hits = profile
        .keywords
        .iter()
        .filter(|k| content.contains(k.as_str()))
        .count();

    let relevance = if hits >= HIGH_HITS {
        Relevance::High
    } else if hits >= MEDIUM_HITS {
        Relevance::Medium
    } else if hits >= LOW_HITS {
        Relevance::Low
    } else {
        Relevance::Irrelevant
    };

    Verdict {
        relevance,
        reason: format!("rule-based: {hits} profile keyword hits"),
        section_fit: section_fit(paper),
        is_counterargument: COUNTER_TERMS.iter().any(|t| content.contains(t)),
    }
}

/// Which thematic axis a paper belongs to; anything ambiguous (zero or
/// several axes) is cross-cutting.
pub fn section_fit(paper: &ExportPaper) -> String {
    let probe = crate::card::types::CardRecord {
        stem: String::new(),
        header: crate::card::types::CardHeader {
            title: format!("{} {}", paper.title, paper.abstract_text),
            ..crate::card::types::CardHeader::default()
        },
        body: String::new(),
    };
    let matched: Vec<&str> = THEME_AXES
        .iter()
        .filter(|axis| matches_axis(&probe, axis))
        .map(|axis| axis.name)
        .collect();
    match matched.as_slice() {
        [one] => (*one).to_string(),
        _ => "Cross-cutting".to_string(),
    }
}

/// Verdict shape the LLM is asked for, 1-based `index` into the batch.
#[derive(Debug, Deserialize)]
struct LlmVerdict {
    #[serde(default)]
    index: usize,
    #[serde(default)]
    relevance: Option<Relevance>,
    #[serde(default)]
    reason: String,
    #[serde(default)]
    section_fit: String,
    #[serde(default)]
    is_counterargument: bool,
}

const SCREEN_SYSTEM_PROMPT: &str =
    "You are a research screening assistant for a psychology graduate student. \
     Evaluate papers for relevance. Respond ONLY with a valid JSON array. \
     No backticks, no markdown.";

/// How much of each abstract goes into the screening prompt.
const ABSTRACT_PROMPT_CHARS: usize = 300;

/// Screens the papers, rule-based first, then overlaying LLM verdicts in
/// batches when an enricher is available. A failed batch keeps its
/// rule-based verdicts and the run continues.
pub async fn screen(
    papers: &[ExportPaper],
    profile: &ResearchProfile,
    enricher: Option<&dyn Enricher>,
    batch_size: usize,
    mut on_batch: impl FnMut(usize),
) -> Vec<ScreenedPaper> {
    let mut screened: Vec<ScreenedPaper> = papers
        .iter()
        .map(|p| ScreenedPaper {
            paper: p.clone(),
            verdict: rule_verdict(p, profile),
        })
        .collect();

    if let Some(enricher) = enricher {
        let batch_size = batch_size.max(1);
        for start in (0..screened.len()).step_by(batch_size) {
            let end = (start + batch_size).min(screened.len());
            match llm_screen_batch(enricher, &papers[start..end], &profile.text).await {
                Ok(verdicts) => {
                    for v in verdicts {
                        let Some(slot) = v
                            .index
                            .checked_sub(1)
                            .map(|i| start + i)
                            .filter(|i| *i < end)
                        else {
                            continue;
                        };
                        let baseline = &mut screened[slot].verdict;
                        if let Some(relevance) = v.relevance {
                            baseline.relevance = relevance;
                        }
                        if !v.reason.is_empty() {
                            baseline.reason = v.reason;
                        }
                        if !v.section_fit.is_empty() {
                            baseline.section_fit = v.section_fit;
                        }
                        baseline.is_counterargument = v.is_counterargument;
                    }
                }
                Err(e) => {
                    warn!(start, end, error = %e, "screening batch failed, keeping rule-based verdicts");
                }
            }
            on_batch(end - start);
        }
    }
    screened
}

async fn llm_screen_batch(
    enricher: &dyn Enricher,
    batch: &[ExportPaper],
    profile_text: &str,
) -> Result<Vec<LlmVerdict>, EnrichError> {
    let mut papers_text = String::new();
    for (i, p) in batch.iter().enumerate() {
        papers_text.push_str(&format!("\n[{}] {}\n", i + 1, p.title));
        if !p.abstract_text.is_empty() {
            let short: String = p.abstract_text.chars().take(ABSTRACT_PROMPT_CHARS).collect();
            papers_text.push_str(&format!("    Abstract: {short}\n"));
        }
    }

    let prompt = format!(
        "My research profile:\n{}\n\n\
         Screen the papers below. For each, judge relevance and reply as a JSON array:\n\
         {}\n\n\
         JSON format (array):\n\
         [\n  {{\"index\": 1, \"relevance\": \"high/medium/low/irrelevant\", \
         \"reason\": \"one line\", \
         \"section_fit\": \"which review section fits\", \
         \"is_counterargument\": false}},\n  ...\n]",
        profile_text.chars().take(2000).collect::<String>(),
        papers_text,
    );

    let raw = enricher.complete(SCREEN_SYSTEM_PROMPT, &prompt).await?;
    serde_json::from_str(strip_code_fences(&raw)).map_err(|e| EnrichError::BadPayload(e.to_string()))
}

/// Tallies by relevance bucket, for the console summary.
pub struct ScreenSummary {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub irrelevant: usize,
    pub counter: usize,
}

pub fn summarize(screened: &[ScreenedPaper]) -> ScreenSummary {
    let count = |r: Relevance| screened.iter().filter(|p| p.verdict.relevance == r).count();
    ScreenSummary {
        high: count(Relevance::High),
        medium: count(Relevance::Medium),
        low: count(Relevance::Low),
        irrelevant: count(Relevance::Irrelevant),
        counter: screened
            .iter()
            .filter(|p| p.verdict.is_counterargument)
            .count(),
    }
}

/// Markdown screening report: high-relevance details, a medium list, and
/// the counter-evidence list.
pub fn render_report(screened: &[ScreenedPaper], source_name: &str, timestamp: &str) -> String {
    let summary = summarize(screened);
    let mut out = format!(
        "# Screening Report\n\n> Source: {source_name}\n> Relevant: {} of {}\n> Date: {timestamp}\n\n",
        summary.high + summary.medium,
        screened.len()
    );

    out.push_str("## High Relevance — add to the reference manager\n\n");
    for p in screened.iter().filter(|p| p.verdict.relevance == Relevance::High) {
        out.push_str(&format!("### {}\n", p.paper.title));
        out.push_str(&format!("- **Authors:** {}\n", blank_question(&p.paper.authors)));
        out.push_str(&format!("- **Year:** {}\n", blank_question(&p.paper.year)));
        out.push_str(&format!("- **Journal:** {}\n", blank_question(&p.paper.journal)));
        if !p.paper.doi.is_empty() {
            out.push_str(&format!("- **DOI:** https://doi.org/{}\n", p.paper.doi));
        }
        out.push_str(&format!("- **Reason:** {}\n", p.verdict.reason));
        out.push_str(&format!("- **Section:** {}\n", p.verdict.section_fit));
        if p.verdict.is_counterargument {
            out.push_str("- **Counter-evidence paper**\n");
        }
        out.push('\n');
    }

    out.push_str("## Medium Relevance — check the abstract first\n\n");
    for p in screened.iter().filter(|p| p.verdict.relevance == Relevance::Medium) {
        out.push_str(&format!(
            "- **{}** ({}) — {}\n",
            p.paper.title,
            blank_question(&p.paper.year),
            p.verdict.reason
        ));
    }

    out.push_str("\n## Counter-Evidence — include these regardless\n\n");
    for p in screened.iter().filter(|p| p.verdict.is_counterargument) {
        out.push_str(&format!(
            "- **{}** ({}) — {}\n",
            p.paper.title,
            blank_question(&p.paper.year),
            p.verdict.reason
        ));
    }
    out
}

fn blank_question(s: &str) -> &str {
    if s.is_empty() {
        "?"
    } else {
        s
    }
}
