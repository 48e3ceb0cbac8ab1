use breakdown_core::{
    process_items, AnkiClient, DedupStore, FeedItem, Fingerprint, ItemError, ItemOutcome,
    MemoryStore, NoteId, Processor, RocksStore, StoreError,
};
use reqwest::Client;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

const FEED: &str = "https://feed";

fn item(link: &str) -> FeedItem {
    FeedItem {
        title: "T".into(),
        link: link.into(),
        categories: vec!["a".into(), "b".into()],
        ..Default::default()
    }
}

async fn anki_ok(server: &MockServer, expected_calls: u64) {
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": 42, "error": null })))
        .expect(expected_calls)
        .mount(server)
        .await;
}

fn anki(server: &MockServer) -> AnkiClient {
    AnkiClient::new(Client::new(), server.uri())
}

struct BrokenLookup;

impl DedupStore for BrokenLookup {
    fn lookup(&self, _key: &Fingerprint) -> Result<Option<Vec<u8>>, StoreError> {
        Err(StoreError::NoHomeDir)
    }

    fn record(&self, _key: &Fingerprint, _value: &[u8]) -> Result<(), StoreError> {
        panic!("record must not be reached when lookup fails");
    }
}

/// Reads from a real store but refuses every write.
struct ReadOnly(MemoryStore);

impl DedupStore for ReadOnly {
    fn lookup(&self, key: &Fingerprint) -> Result<Option<Vec<u8>>, StoreError> {
        self.0.lookup(key)
    }

    fn record(&self, _key: &Fingerprint, _value: &[u8]) -> Result<(), StoreError> {
        Err(StoreError::NoHomeDir)
    }
}

#[tokio::test]
async fn second_run_skips_everything() {
    let server = MockServer::start().await;
    anki_ok(&server, 2).await;

    let store = MemoryStore::in_memory();
    let items = vec![item("https://x/1"), item("https://x/2")];
    let processor = Processor::new(store.clone(), anki(&server), FEED, "Hatena");

    let first = process_items(&processor, &items, Duration::ZERO).await;
    assert_eq!(first.submitted, 2);
    assert_eq!(store.len(), 2);

    let second = process_items(&processor, &items, Duration::ZERO).await;
    assert_eq!(second.submitted, 0);
    assert_eq!(second.skipped, 2);
    assert_eq!(second.total(), 2);
}

#[tokio::test]
async fn same_link_in_two_decks_is_submitted_twice() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "params": { "note": { "deckName": "Hatena" } } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": 1, "error": null })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "params": { "note": { "deckName": "Reading" } } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": 2, "error": null })))
        .expect(1)
        .mount(&server)
        .await;

    let store = MemoryStore::in_memory();
    let link = item("https://x/1");
    let hatena = Processor::new(store.clone(), anki(&server), FEED, "Hatena");
    let reading = Processor::new(store.clone(), anki(&server), FEED, "Reading");

    assert_ne!(hatena.fingerprint(&link), reading.fingerprint(&link));
    assert!(matches!(hatena.process_item(&link).await, ItemOutcome::Submitted(NoteId(1))));
    assert!(matches!(reading.process_item(&link).await, ItemOutcome::Submitted(NoteId(2))));
    assert!(hatena.process_item(&link).await.is_skipped());
    assert!(reading.process_item(&link).await.is_skipped());
}

#[tokio::test]
async fn rejected_note_is_not_recorded_and_is_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "result": null, "error": "deck was not found" })),
        )
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    anki_ok(&server, 1).await;

    let store = MemoryStore::in_memory();
    let processor = Processor::new(store.clone(), anki(&server), FEED, "Hatena");
    let it = item("https://x/1");

    let outcome = processor.process_item(&it).await;
    assert!(outcome.is_failed());
    assert!(matches!(outcome, ItemOutcome::Failed(ItemError::Submit(_))));
    assert!(store.is_empty());

    assert!(processor.process_item(&it).await.is_submitted());
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn transport_failure_is_not_recorded() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(2)
        .mount(&server)
        .await;

    let store = MemoryStore::in_memory();
    let processor = Processor::new(store.clone(), anki(&server), FEED, "Hatena");
    let items = vec![item("https://x/1")];

    let first = process_items(&processor, &items, Duration::ZERO).await;
    assert_eq!(first.failed, 1);
    let second = process_items(&processor, &items, Duration::ZERO).await;
    assert_eq!(second.failed, 1);
    assert!(store.is_empty());
}

#[tokio::test]
async fn lookup_failure_fails_only_that_item() {
    let server = MockServer::start().await;
    anki_ok(&server, 0).await;

    let processor = Processor::new(BrokenLookup, anki(&server), FEED, "Hatena");
    let summary = process_items(
        &processor,
        &[item("https://x/1"), item("https://x/2")],
        Duration::ZERO,
    )
    .await;
    assert_eq!(summary.failed, 2);

    let outcome = processor.process_item(&item("https://x/3")).await;
    assert!(matches!(outcome, ItemOutcome::Failed(ItemError::Lookup(_))));
}

#[tokio::test]
async fn record_failure_reports_the_note_and_resubmits_next_time() {
    let server = MockServer::start().await;
    anki_ok(&server, 2).await;

    let processor = Processor::new(ReadOnly(MemoryStore::in_memory()), anki(&server), FEED, "Hatena");
    let it = item("https://x/1");

    for _ in 0..2 {
        match processor.process_item(&it).await {
            ItemOutcome::Failed(ItemError::Record { note_id, .. }) => assert_eq!(note_id, NoteId(42)),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }
}

#[tokio::test]
async fn empty_stored_value_does_not_count_as_submitted() {
    let server = MockServer::start().await;
    anki_ok(&server, 1).await;

    let store = MemoryStore::in_memory();
    let processor = Processor::new(store.clone(), anki(&server), FEED, "Hatena");
    let it = item("https://x/1");
    store.record(&processor.fingerprint(&it), b"").unwrap();

    assert!(processor.process_item(&it).await.is_submitted());
}

#[tokio::test]
async fn end_to_end_with_rocksdb() {
    let server = MockServer::start().await;
    anki_ok(&server, 1).await;

    let dir = tempfile::tempdir().unwrap();
    let items = vec![item("https://x/1")];
    let key = Fingerprint::for_item("https://feed", "Hatena", "https://x/1");

    {
        let store = RocksStore::open(dir.path()).unwrap();
        assert_eq!(store.path(), dir.path());
        let processor = Processor::new(store, anki(&server), FEED, "Hatena");
        let summary = process_items(&processor, &items, Duration::ZERO).await;
        assert_eq!(summary.submitted, 1);
        assert_eq!(processor.store().lookup(&key).unwrap(), Some(b"42".to_vec()));
    }

    // Reopen, as a second invocation of the program would.
    let store = RocksStore::open(dir.path()).unwrap();
    assert_eq!(store.lookup(&key).unwrap(), Some(b"42".to_vec()));
    let processor = Processor::new(store, anki(&server), FEED, "Hatena");
    let summary = process_items(&processor, &items, Duration::ZERO).await;
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.submitted, 0);
}
