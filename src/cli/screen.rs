//! CLI `screen` command — screen a database-export CSV before import.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::CarrelConfig;
use crate::profile::ResearchProfile;
use crate::screen::{self, Relevance};

pub async fn screen(
    config: &CarrelConfig,
    csv_path: &Path,
    enrich: bool,
    write: bool,
) -> Result<()> {
    let papers = screen::read_export_csv(csv_path)?;
    if papers.is_empty() {
        println!("No usable rows in {}.", csv_path.display());
        return Ok(());
    }

    let profile = ResearchProfile::load(&config.profile_path())?;
    let enricher = if enrich {
        super::make_enricher(config)
    } else {
        None
    };

    let pb = if enricher.is_some() {
        let pb = ProgressBar::new(papers.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("  {bar:40.cyan/blue} {pos}/{len} papers")
                .expect("valid template")
                .progress_chars("##-"),
        );
        pb
    } else {
        ProgressBar::hidden()
    };

    let screened = screen::screen(
        &papers,
        &profile,
        enricher.as_deref(),
        config.screen.batch_size,
        |done| pb.inc(done as u64),
    )
    .await;
    pb.finish_and_clear();

    let summary = screen::summarize(&screened);
    let mode = match enricher {
        Some(ref e) => e.name(),
        None => "rule-based",
    };

    println!("Screening ({mode}): {} papers", screened.len());
    println!("{}", "=".repeat(40));
    println!("  High relevance:      {}", summary.high);
    println!("  Medium relevance:    {}", summary.medium);
    println!("  Low relevance:       {}", summary.low);
    println!("  Irrelevant:          {}", summary.irrelevant);
    println!("  Counter-evidence:    {}", summary.counter);
    println!();

    let source_name = csv_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| csv_path.display().to_string());
    let report = screen::render_report(&screened, &source_name, &super::display_timestamp());

    if write {
        let dir = config.screening_dir();
        fs::create_dir_all(&dir).with_context(|| format!("cannot create {}", dir.display()))?;
        let stamp = super::file_timestamp();
        let report_path = dir.join(format!("screening_{stamp}.md"));
        let json_path = dir.join(format!("screening_{stamp}.json"));

        fs::write(&report_path, report)
            .with_context(|| format!("cannot write {}", report_path.display()))?;
        let json = serde_json::to_string_pretty(&screened)
            .context("cannot serialize screening verdicts")?;
        fs::write(&json_path, json)
            .with_context(|| format!("cannot write {}", json_path.display()))?;

        println!("  Report: {}", report_path.display());
        println!("  JSON:   {}", json_path.display());
    } else {
        for p in screened
            .iter()
            .filter(|p| p.verdict.relevance == Relevance::High)
        {
            println!("  HIGH  {}", p.paper.title);
        }
        println!();
        println!("Re-run with --write to save the full report.");
    }
    Ok(())
}
