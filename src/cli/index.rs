//! CLI `index` command — rebuild the index documents from the card store.

use anyhow::Result;

use crate::card::store::CardStore;
use crate::config::CarrelConfig;
use crate::index;

pub fn index(config: &CarrelConfig) -> Result<()> {
    let store = CardStore::open(config.cards_dir())?;
    let cards = store.read_all()?;

    index::write_indexes(&config.root(), &cards, &super::display_timestamp())?;

    println!("Rebuilt index files for {} cards:", cards.len());
    println!("  INDEX_MASTER.md     relevance-ranked table of every paper");
    println!("  INDEX_TOPIC.md      papers grouped by topic");
    println!("  INDEX_PRIORITY.md   reading queue by priority tier");
    println!("  COMPARE_DATAVIEW.md templated comparison queries");
    Ok(())
}
