//! CLI `sync` command — diff the snapshot against the card store and write
//! one card per new paper.

use std::time::Duration;

use anyhow::{Context, Result};

use crate::card::store::CardStore;
use crate::config::CarrelConfig;
use crate::profile::ResearchProfile;
use crate::sync::{self, SyncOptions};
use crate::zotero;

pub async fn sync(
    config: &CarrelConfig,
    limit: Option<&str>,
    enrich: bool,
    write: bool,
) -> Result<()> {
    let snapshot_path = config.snapshot_path();
    let items = zotero::load_snapshot(&snapshot_path).with_context(|| {
        format!(
            "cannot read the library snapshot at {} (export it from the reference manager first)",
            snapshot_path.display()
        )
    })?;

    let profile = ResearchProfile::load(&config.profile_path())?;
    let store = CardStore::open(config.cards_dir())?;

    let enricher = if enrich && write {
        super::make_enricher(config)
    } else {
        None
    };

    let options = SyncOptions {
        limit: super::parse_optional(limit, "--limit"),
        dry_run: !write,
        pause: Duration::from_secs(config.sync.pause_secs),
    };

    let report = sync::sync(
        &store,
        items,
        &profile,
        enricher.as_deref(),
        &options,
        &super::today(),
    )
    .await?;

    println!("Library Sync{}", if write { "" } else { " (dry run)" });
    println!("{}", "=".repeat(40));
    println!("  Snapshot items:      {}", report.total_items);
    println!("  Existing cards:      {}", report.existing_cards);
    println!("  Already carded:      {}", report.skipped_existing);
    if report.unnamed > 0 {
        println!("  Unusable titles:     {}", report.unnamed);
    }
    if report.over_limit > 0 {
        println!("  Deferred by limit:   {}", report.over_limit);
    }
    println!();

    if write {
        println!("  New cards written:   {}", report.created());
        let enriched = report.cards.iter().filter(|c| c.enriched).count();
        if let Some(ref enricher) = enricher {
            println!("  Analyzed ({}):   {}", enricher.name(), enriched);
            if report.enrich_failures > 0 {
                println!("  Fell back to metadata-only: {}", report.enrich_failures);
            }
        }
        if report.collisions() > 0 {
            println!("  Name collisions:     {} (first write kept)", report.collisions());
        }
        if report.write_failures() > 0 {
            println!("  Write failures:      {}", report.write_failures());
        }
    } else {
        println!("  Would create:        {}", report.cards.len());
        for card in &report.cards {
            println!("    {:>5.1}  {}", card.score, card.stem);
        }
        println!();
        println!("Re-run with --write to create these cards.");
    }

    if write && report.created() > 0 {
        println!();
        println!("Run `carrel index` to refresh the index files.");
    }

    Ok(())
}
