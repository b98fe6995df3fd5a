mod helpers;

use std::time::Duration;

use helpers::{bib_item, Workspace, TEST_PROFILE};

use carrel::card::store::CardStore;
use carrel::cite::{assemble, render_bank, render_trace, CiteOptions, TRACE_COLUMNS};
use carrel::profile::ResearchProfile;
use carrel::sync::{sync, SyncOptions};
use carrel::zotero::load_snapshot;

async fn synced_store(ws: &Workspace) -> CardStore {
    let items = load_snapshot(&ws.snapshot_path()).unwrap();
    let profile = ResearchProfile::load(&ws.profile_path()).unwrap();
    let store = CardStore::open(ws.cards_dir()).unwrap();
    let options = SyncOptions {
        limit: None,
        dry_run: false,
        pause: Duration::ZERO,
    };
    sync(&store, items, &profile, None, &options, "2026-08-30")
        .await
        .unwrap();
    store
}

#[tokio::test]
async fn bank_and_trace_stay_aligned() {
    let ws = Workspace::new();
    ws.write_snapshot(&serde_json::json!([
        bib_item(
            "K1",
            "Anxiety and depression after automation",
            "A meta-analysis of 42 randomized trials found automation exposure predicted anxiety.",
            &[],
        ),
        bib_item(
            "K2",
            "Art therapy and flow states",
            "A randomized controlled trial showed art therapy reduced depression scores.",
            &[],
        ),
    ]));
    ws.write_profile(TEST_PROFILE);
    let store = synced_store(&ws).await;
    let cards = store.read_all().unwrap();

    let entries = assemble(&cards, &CiteOptions::default());
    assert_eq!(entries.len(), 2);

    let bank = render_bank(&entries, "general", &[], "2026-08-30 12:00");
    let trace = render_trace(&entries);

    // One bank block and one trace row per entry, in the same order.
    let lines: Vec<&str> = trace.lines().collect();
    assert_eq!(lines.len(), entries.len() + 1);
    assert_eq!(lines[0], TRACE_COLUMNS.join(","));
    for (i, entry) in entries.iter().enumerate() {
        assert!(bank.contains(&format!("## {}. {}", i + 1, entry.title)));
        assert!(lines[i + 1].starts_with(&format!("{},", i + 1)));
        assert!(lines[i + 1].contains(&entry.zotero_key));
        assert!(lines[i + 1].ends_with(&format!("cards/{}.md", entry.stem)));
    }
}

#[tokio::test]
async fn citations_use_the_item_key_and_apa_formatting() {
    let ws = Workspace::new();
    ws.write_snapshot(&serde_json::json!([bib_item(
        "CUIJ24",
        "Internet interventions for anxiety",
        "A meta-analysis of internet-delivered interventions for anxiety.",
        &[],
    )]));
    ws.write_profile(TEST_PROFILE);
    let store = synced_store(&ws).await;
    let cards = store.read_all().unwrap();

    let entries = assemble(&cards, &CiteOptions::default());
    assert_eq!(entries.len(), 1);
    let entry = &entries[0];

    assert_eq!(entry.citation, "[@CUIJ24]");
    assert!(entry.apa_reference.starts_with("Cuijpers, P. (2024). Internet interventions for anxiety."));
    assert!(entry.apa_reference.contains("Journal of Anxiety Research"));
    assert!(entry.apa_reference.contains("https://doi.org/10.1000/CUIJ24"));
    assert!(entry.paragraph.contains("Cuijpers (2024)"));
    assert!(entry.paragraph.contains("Meta-analytic"), "claim keys on the evidence language");
}

#[tokio::test]
async fn filters_and_caps_apply() {
    let ws = Workspace::new();
    ws.write_snapshot(&serde_json::json!([
        bib_item(
            "HI",
            "Anxiety and depression after automation",
            "A meta-analysis found automation exposure predicted anxiety and depression.",
            &[],
        ),
        bib_item("LO", "Glacier melt rates", "Glaciers are melting faster than projected.", &[]),
    ]));
    ws.write_profile(TEST_PROFILE);
    let store = synced_store(&ws).await;
    let cards = store.read_all().unwrap();

    let strict = assemble(
        &cards,
        &CiteOptions {
            min_relevance: 5.0,
            ..CiteOptions::default()
        },
    );
    assert_eq!(strict.len(), 1);
    assert_eq!(strict[0].zotero_key, "HI");

    let capped = assemble(
        &cards,
        &CiteOptions {
            max_paragraphs: 1,
            ..CiteOptions::default()
        },
    );
    assert_eq!(capped.len(), 1);
    assert_eq!(capped[0].zotero_key, "HI", "the cap keeps the best-ranked card");
}

#[tokio::test]
async fn cards_without_abstracts_are_skipped() {
    let ws = Workspace::new();
    ws.write_snapshot(&serde_json::json!([bib_item(
        "K1",
        "Anxiety without an abstract",
        "",
        &[],
    )]));
    ws.write_profile(TEST_PROFILE);
    let store = synced_store(&ws).await;
    let cards = store.read_all().unwrap();

    let entries = assemble(&cards, &CiteOptions::default());
    assert!(entries.is_empty(), "nothing to quote, nothing to draft");
}

#[tokio::test]
async fn trace_quotes_fields_with_commas() {
    let ws = Workspace::new();
    ws.write_snapshot(&serde_json::json!([bib_item(
        "K1",
        "Anxiety, depression, and automation",
        "A meta-analysis of anxiety, depression, and related outcomes.",
        &[],
    )]));
    ws.write_profile(TEST_PROFILE);
    let store = synced_store(&ws).await;
    let cards = store.read_all().unwrap();

    let entries = assemble(&cards, &CiteOptions::default());
    let trace = render_trace(&entries);
    assert!(trace.contains("\"Anxiety, depression, and automation\""));
}
