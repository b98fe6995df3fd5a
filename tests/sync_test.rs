mod helpers;

use std::time::Duration;

use helpers::{bib_item, CannedEnricher, FailingEnricher, Workspace, TEST_PROFILE};

use carrel::card::store::CardStore;
use carrel::card::types::{CardSource, ReadingPriority};
use carrel::profile::ResearchProfile;
use carrel::sync::{sync, SyncOptions};
use carrel::zotero::load_snapshot;

fn write_options() -> SyncOptions {
    SyncOptions {
        limit: None,
        dry_run: false,
        pause: Duration::ZERO,
    }
}

#[tokio::test]
async fn metadata_only_sync_writes_a_scored_card() {
    let ws = Workspace::new();
    ws.write_snapshot(&serde_json::json!([bib_item(
        "KEY1",
        "AI and Anxiety: A Meta-Analysis",
        "A systematic review of anxiety outcomes after automation exposure.",
        &["m:meta-analysis", "topic:ai"],
    )]));
    ws.write_profile(TEST_PROFILE);

    let items = load_snapshot(&ws.snapshot_path()).unwrap();
    let profile = ResearchProfile::load(&ws.profile_path()).unwrap();
    let store = CardStore::open(ws.cards_dir()).unwrap();

    let report = sync(&store, items, &profile, None, &write_options(), "2026-08-30")
        .await
        .unwrap();

    assert_eq!(report.total_items, 1);
    assert_eq!(report.created(), 1);
    assert_eq!(report.enrich_failures, 0);

    let cards = store.read_all().unwrap();
    assert_eq!(cards.len(), 1);
    let card = &cards[0];
    // The colon is stripped when the title becomes a filename.
    assert_eq!(card.stem, "AI and Anxiety A Meta-Analysis");
    assert_eq!(card.header.title, "AI and Anxiety: A Meta-Analysis");
    assert!(card.header.relevance_score > 0.0);
    assert_eq!(card.header.reading_priority, ReadingPriority::ToRead);
    assert_eq!(card.header.source, CardSource::MetadataOnly);
    assert_eq!(card.header.created, "2026-08-30");
    assert!(card.body.contains("## Abstract"));
    assert!(card.body.contains("## My Notes"));
}

#[tokio::test]
async fn dry_run_plans_but_writes_nothing() {
    let ws = Workspace::new();
    ws.write_snapshot(&serde_json::json!([bib_item("K1", "Anxiety study", "", &[])]));

    let items = load_snapshot(&ws.snapshot_path()).unwrap();
    let profile = ResearchProfile::baseline();
    let store = CardStore::open(ws.cards_dir()).unwrap();

    let options = SyncOptions {
        dry_run: true,
        ..write_options()
    };
    let report = sync(&store, items, &profile, None, &options, "2026-08-30")
        .await
        .unwrap();

    assert_eq!(report.cards.len(), 1);
    assert_eq!(report.created(), 0);
    assert!(store.read_all().unwrap().is_empty());
}

#[tokio::test]
async fn limit_spends_its_budget_on_the_highest_scorers() {
    let ws = Workspace::new();
    ws.write_snapshot(&serde_json::json!([
        bib_item("LOW", "Glacier melt rates", "", &[]),
        bib_item(
            "HIGH",
            "Anxiety and depression after automation",
            "A randomized trial.",
            &["m:rct"],
        ),
    ]));

    let items = load_snapshot(&ws.snapshot_path()).unwrap();
    let profile = ResearchProfile::baseline();
    let store = CardStore::open(ws.cards_dir()).unwrap();

    let options = SyncOptions {
        limit: Some(1),
        ..write_options()
    };
    let report = sync(&store, items, &profile, None, &options, "2026-08-30")
        .await
        .unwrap();

    assert_eq!(report.over_limit, 1);
    assert_eq!(report.created(), 1);
    let cards = store.read_all().unwrap();
    assert_eq!(cards[0].header.zotero_key, "HIGH");
}

#[tokio::test]
async fn enrichment_fills_the_analysis_fields() {
    let ws = Workspace::new();
    ws.write_snapshot(&serde_json::json!([bib_item(
        "K1",
        "App-based CBT for anxiety",
        "A randomized controlled trial of app-delivered CBT.",
        &[],
    )]));

    let items = load_snapshot(&ws.snapshot_path()).unwrap();
    let profile = ResearchProfile::baseline();
    let store = CardStore::open(ws.cards_dir()).unwrap();

    let enricher = CannedEnricher::new(
        r#"{
            "key_claims": ["App CBT reduces anxiety", "Effects persist at follow-up"],
            "main_finding": "App-delivered CBT works.",
            "method_type": "RCT",
            "sample_size": "N=412",
            "reading_priority": "must-read",
            "priority_reason": "Directly tests the core intervention.",
            "suggested_topic_tags": ["digital-cbt"]
        }"#,
    );

    let report = sync(
        &store,
        items,
        &profile,
        Some(&enricher),
        &write_options(),
        "2026-08-30",
    )
    .await
    .unwrap();

    assert_eq!(report.created(), 1);
    assert!(report.cards[0].enriched);

    let card = &store.read_all().unwrap()[0];
    assert_eq!(card.header.source, CardSource::AiAnalyzed);
    assert_eq!(card.header.reading_priority, ReadingPriority::MustRead);
    assert_eq!(card.header.method, "RCT");
    assert_eq!(card.header.sample_size, "N=412");
    assert!(card.header.tags.contains(&"topic:digital-cbt".to_string()));
    assert!(card.body.contains("## Key Claims"));
    assert!(card.body.contains("App CBT reduces anxiety"));
}

#[tokio::test]
async fn enrichment_failure_downgrades_to_metadata_only() {
    let ws = Workspace::new();
    ws.write_snapshot(&serde_json::json!([bib_item(
        "K1",
        "Anxiety study",
        "An abstract so enrichment is attempted.",
        &[],
    )]));

    let items = load_snapshot(&ws.snapshot_path()).unwrap();
    let profile = ResearchProfile::baseline();
    let store = CardStore::open(ws.cards_dir()).unwrap();

    let report = sync(
        &store,
        items,
        &profile,
        Some(&FailingEnricher),
        &write_options(),
        "2026-08-30",
    )
    .await
    .unwrap();

    assert_eq!(report.created(), 1, "a bad provider must not block the card");
    assert_eq!(report.enrich_failures, 1);
    let card = &store.read_all().unwrap()[0];
    assert_eq!(card.header.source, CardSource::MetadataOnly);
}

#[tokio::test]
async fn abstractless_items_skip_the_provider() {
    let ws = Workspace::new();
    ws.write_snapshot(&serde_json::json!([bib_item("K1", "Anxiety study", "", &[])]));

    let items = load_snapshot(&ws.snapshot_path()).unwrap();
    let profile = ResearchProfile::baseline();
    let store = CardStore::open(ws.cards_dir()).unwrap();

    // FailingEnricher would bump enrich_failures if it were called.
    let report = sync(
        &store,
        items,
        &profile,
        Some(&FailingEnricher),
        &write_options(),
        "2026-08-30",
    )
    .await
    .unwrap();

    assert_eq!(report.created(), 1);
    assert_eq!(report.enrich_failures, 0);
}
