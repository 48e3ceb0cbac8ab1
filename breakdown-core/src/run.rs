use std::time::Duration;

use reqwest::{redirect, Client, ClientBuilder};
use tracing::info;

use crate::anki::AnkiClient;
use crate::config::RunConfig;
use crate::error::RunError;
use crate::feed::{fetch_feed, FeedItem};
use crate::processor::{ItemOutcome, Processor};
use crate::storage::{DedupStore, RocksStore};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub submitted: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl RunSummary {
    pub fn total(&self) -> usize {
        self.submitted + self.skipped + self.failed
    }

    fn count(&mut self, outcome: &ItemOutcome) {
        match outcome {
            ItemOutcome::Submitted(_) => self.submitted += 1,
            ItemOutcome::Skipped => self.skipped += 1,
            ItemOutcome::Failed(_) => self.failed += 1,
        }
    }
}

pub fn build_client(config: &RunConfig) -> Result<Client, RunError> {
    ClientBuilder::new()
        .redirect(redirect::Policy::limited(5))
        .user_agent(config.user_agent.as_str())
        .timeout(config.request_timeout)
        .build()
        .map_err(RunError::Client)
}

/// Feeds every item through `processor`, one after the other, in feed order.
pub async fn process_items<S: DedupStore>(
    processor: &Processor<S>,
    items: &[FeedItem],
    submit_pause: Duration,
) -> RunSummary {
    let mut summary = RunSummary::default();
    for item in items {
        let outcome = processor.process_item(item).await;
        summary.count(&outcome);
        if outcome.is_submitted() && !submit_pause.is_zero() {
            tokio::time::sleep(submit_pause).await;
        }
    }
    summary
}

/// One complete pass: fetch the feed, open the store, submit what is new.
pub async fn run(config: &RunConfig) -> Result<RunSummary, RunError> {
    let client = build_client(config)?;
    let items = fetch_feed(&client, &config.feed_url).await?;
    let store = RocksStore::open(&config.store_path)?;

    let anki = AnkiClient::new(client, config.anki_endpoint.as_str());
    let processor = Processor::new(store, anki, config.feed_url.as_str(), config.deck.as_str());
    let summary = process_items(&processor, &items, config.submit_pause).await;

    info!(
        feed = %config.feed_url,
        deck = %config.deck,
        submitted = summary.submitted,
        skipped = summary.skipped,
        failed = summary.failed,
        "run finished"
    );
    Ok(summary)
}
