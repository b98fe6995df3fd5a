//! CLI `cite` command — assemble a paragraph bank and its citation trace.

use std::fs;

use anyhow::{Context, Result};

use crate::card::store::CardStore;
use crate::cite::{self, CiteOptions};
use crate::config::CarrelConfig;

pub fn cite(
    config: &CarrelConfig,
    focus: Option<&str>,
    section: Option<&str>,
    max: Option<&str>,
    min_relevance: Option<&str>,
) -> Result<()> {
    let store = CardStore::open(config.cards_dir())?;
    let cards = store.read_all()?;

    let section = section.unwrap_or("general");
    let options = CiteOptions {
        focus: focus.map(cite::parse_focus_terms).unwrap_or_default(),
        max_paragraphs: super::parse_or_default(max, "--max", config.cite.max_paragraphs),
        min_relevance: super::parse_or_default(
            min_relevance,
            "--min-relevance",
            config.cite.min_relevance,
        ),
        evidence_sentences: config.cite.evidence_sentences,
    };

    let entries = cite::assemble(&cards, &options);
    if entries.is_empty() {
        println!("No cards qualified (store has {} cards).", cards.len());
        println!("Lower --min-relevance, or sync and enrich more papers first.");
        return Ok(());
    }

    let bank = cite::render_bank(&entries, section, &options.focus, &super::display_timestamp());
    let trace = cite::render_trace(&entries);

    let sections_dir = config.sections_dir();
    fs::create_dir_all(&sections_dir)
        .with_context(|| format!("cannot create {}", sections_dir.display()))?;

    let stamp = super::file_timestamp();
    let bank_path = sections_dir.join(format!("PARAGRAPH_BANK_{section}_{stamp}.md"));
    let trace_path = config.root().join(format!("CITATION_TRACE_{section}_{stamp}.csv"));

    fs::write(&bank_path, bank)
        .with_context(|| format!("cannot write {}", bank_path.display()))?;
    fs::write(&trace_path, trace)
        .with_context(|| format!("cannot write {}", trace_path.display()))?;

    println!("Paragraph bank: {} paragraphs", entries.len());
    println!("  Bank:   {}", bank_path.display());
    println!("  Trace:  {}", trace_path.display());
    println!();
    println!("Verify every number against the original PDF before quoting a draft.");
    Ok(())
}
