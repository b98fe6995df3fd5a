use anyhow::Result;

use crate::card::stats::store_stats;
use crate::card::store::CardStore;
use crate::card::types::{CardSource, ReadingPriority};
use crate::config::CarrelConfig;

/// Display card store statistics in the terminal.
pub fn stats(config: &CarrelConfig) -> Result<()> {
    let store = CardStore::open(config.cards_dir())?;
    let cards = store.read_all()?;
    let stats = store_stats(&cards);

    println!("Card Store Statistics");
    println!("{}", "=".repeat(40));
    println!("  Total cards:         {}", stats.total_cards);
    println!("  Mean relevance:      {:.1}", stats.mean_relevance);
    println!("  Max relevance:       {:.1}", stats.max_relevance);
    println!();

    println!("By Priority:");
    for p in ReadingPriority::ordered() {
        let count = stats.by_priority.get(p.as_str()).copied().unwrap_or(0);
        println!("  {:<16} {}", p.as_str(), count);
    }
    println!();

    println!("By Source:");
    for s in [CardSource::AiAnalyzed, CardSource::MetadataOnly] {
        let count = stats.by_source.get(s.as_str()).copied().unwrap_or(0);
        println!("  {:<16} {}", s.as_str(), count);
    }
    println!();

    if !stats.topic_tags.is_empty() {
        println!("Top Topics:");
        for (tag, count) in stats.topic_tags.iter().take(10) {
            println!("  {:<24} {}", tag, count);
        }
        println!();
    }

    if let Some(ref oldest) = stats.oldest_created {
        println!("Oldest card:           {oldest}");
    }
    if let Some(ref newest) = stats.newest_created {
        println!("Newest card:           {newest}");
    }

    Ok(())
}
