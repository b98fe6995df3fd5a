//! CLI `doctor` command — check the workspace layout and print a health report.

use anyhow::Result;

use crate::card::store::CardStore;
use crate::config::CarrelConfig;
use crate::profile::ResearchProfile;
use crate::zotero;

/// Inspect the workspace and report what each command will find.
pub fn doctor(config: &CarrelConfig) -> Result<()> {
    let root = config.root();

    println!("Workspace Health Report");
    println!("=======================");
    println!();
    println!("Root:              {}", root.display());
    if !root.exists() {
        println!("  MISSING — create it and export the library snapshot into it.");
        println!("  Expected layout:");
        println!("    zotero/library.json   reference-manager export");
        println!("    MY_RESEARCH.md        research profile");
        println!("    cards/                paper cards (created by `carrel sync`)");
        return Ok(());
    }
    println!();

    let snapshot = config.snapshot_path();
    match zotero::load_snapshot(&snapshot) {
        Ok(items) => println!("Snapshot:          {} items ({})", items.len(), snapshot.display()),
        Err(e) => {
            println!("Snapshot:          UNREADABLE ({})", snapshot.display());
            println!("  {e:#}");
            println!("  Re-export the library as CSL JSON to that path.");
        }
    }

    let profile_path = config.profile_path();
    if profile_path.exists() {
        match ResearchProfile::load(&profile_path) {
            Ok(profile) => println!(
                "Profile:           {} keywords ({})",
                profile.keywords.len(),
                profile_path.display()
            ),
            Err(e) => println!("Profile:           UNREADABLE ({e:#})"),
        }
    } else {
        println!(
            "Profile:           not found, baseline keywords in use ({})",
            profile_path.display()
        );
    }

    let cards_dir = config.cards_dir();
    if cards_dir.exists() {
        let store = CardStore::open(&cards_dir)?;
        let cards = store.read_all()?;
        println!("Cards:             {} ({})", cards.len(), cards_dir.display());
        let untriaged = cards
            .iter()
            .filter(|c| c.header.reading_priority == crate::card::types::ReadingPriority::ToRead)
            .count();
        if untriaged > 0 {
            println!("  {untriaged} still to-read");
        }
    } else {
        println!("Cards:             none yet (run `carrel sync --write`)");
    }

    for (name, file) in [
        ("Master index", "INDEX_MASTER.md"),
        ("Topic index", "INDEX_TOPIC.md"),
        ("Priority index", "INDEX_PRIORITY.md"),
    ] {
        let path = root.join(file);
        if path.exists() {
            println!("{name:<18} present");
        } else {
            println!("{name:<18} missing (run `carrel index`)");
        }
    }
    println!();

    println!("Enrichment:");
    println!("  Provider:        {}", config.enrich.provider);
    let secrets = config.secrets_path();
    println!(
        "  Secrets file:    {}",
        if secrets.exists() { "present" } else { "absent" }
    );
    for var in ["ANTHROPIC_API_KEY", "OPENAI_API_KEY"] {
        let state = if std::env::var(var).is_ok() { "set" } else { "unset" };
        println!("  {var:<16} {state}");
    }
    println!();
    println!("Without a key, sync and screen run in metadata-only / rule-based mode.");

    Ok(())
}
