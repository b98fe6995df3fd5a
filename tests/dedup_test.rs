mod helpers;

use std::time::Duration;

use helpers::{bib_item, Workspace, TEST_PROFILE};

use carrel::card::store::CardStore;
use carrel::profile::ResearchProfile;
use carrel::sync::{sync, SyncOptions};
use carrel::zotero::load_snapshot;

fn options() -> SyncOptions {
    SyncOptions {
        limit: None,
        dry_run: false,
        pause: Duration::ZERO,
    }
}

#[tokio::test]
async fn second_sync_is_a_no_op() {
    let ws = Workspace::new();
    ws.write_snapshot(&serde_json::json!([
        bib_item("K1", "Anxiety after automation", "", &[]),
        bib_item("K2", "Art therapy outcomes", "", &[]),
    ]));
    ws.write_profile(TEST_PROFILE);

    let profile = ResearchProfile::load(&ws.profile_path()).unwrap();
    let store = CardStore::open(ws.cards_dir()).unwrap();

    let items = load_snapshot(&ws.snapshot_path()).unwrap();
    let first = sync(&store, items, &profile, None, &options(), "2026-08-30")
        .await
        .unwrap();
    assert_eq!(first.created(), 2);

    let items = load_snapshot(&ws.snapshot_path()).unwrap();
    let second = sync(&store, items, &profile, None, &options(), "2026-08-31")
        .await
        .unwrap();
    assert_eq!(second.created(), 0);
    assert_eq!(second.skipped_existing, 2);
    assert_eq!(second.existing_cards, 2);

    // The original cards are untouched, creation date included.
    let cards = store.read_all().unwrap();
    assert_eq!(cards.len(), 2);
    assert!(cards.iter().all(|c| c.header.created == "2026-08-30"));
}

#[tokio::test]
async fn colliding_titles_keep_the_first_card() {
    let ws = Workspace::new();
    // Both titles sanitize to the stem "Anxiety and AI". The second item
    // carries the abstract, so it scores higher and is written first.
    ws.write_snapshot(&serde_json::json!([
        bib_item("PLAIN", "Anxiety and AI?", "", &[]),
        bib_item(
            "SCORED",
            "Anxiety and AI",
            "A meta-analysis of anxiety and artificial intelligence exposure.",
            &[],
        ),
    ]));

    let profile = ResearchProfile::baseline();
    let store = CardStore::open(ws.cards_dir()).unwrap();
    let items = load_snapshot(&ws.snapshot_path()).unwrap();

    let report = sync(&store, items, &profile, None, &options(), "2026-08-30")
        .await
        .unwrap();

    assert_eq!(report.created(), 1);
    assert_eq!(report.collisions(), 1);

    let cards = store.read_all().unwrap();
    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0].header.zotero_key, "SCORED", "first write wins");
}

#[tokio::test]
async fn hand_written_cards_are_never_overwritten() {
    let ws = Workspace::new();
    let store = CardStore::open(ws.cards_dir()).unwrap();
    std::fs::write(
        store.card_path("My Notes on Anxiety"),
        "---\ntitle: My Notes on Anxiety\n---\n\nhand-written\n",
    )
    .unwrap();

    ws.write_snapshot(&serde_json::json!([bib_item(
        "K1",
        "My Notes on Anxiety",
        "",
        &[],
    )]));
    let items = load_snapshot(&ws.snapshot_path()).unwrap();

    let report = sync(
        &store,
        items,
        &ResearchProfile::baseline(),
        None,
        &options(),
        "2026-08-30",
    )
    .await
    .unwrap();

    assert_eq!(report.created(), 0);
    assert_eq!(report.skipped_existing, 1);
    let cards = store.read_all().unwrap();
    assert!(cards[0].body.contains("hand-written"));
}
