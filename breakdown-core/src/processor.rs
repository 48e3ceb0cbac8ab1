use tracing::{info, warn};

use crate::anki::{AnkiClient, NoteId};
use crate::error::ItemError;
use crate::feed::FeedItem;
use crate::fingerprint::Fingerprint;
use crate::note::Note;
use crate::storage::DedupStore;

#[derive(Debug)]
pub enum ItemOutcome {
    /// A record for this item already exists; nothing was sent.
    Skipped,
    Submitted(NoteId),
    Failed(ItemError),
}

impl ItemOutcome {
    pub fn is_skipped(&self) -> bool {
        matches!(self, ItemOutcome::Skipped)
    }

    pub fn is_submitted(&self) -> bool {
        matches!(self, ItemOutcome::Submitted(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, ItemOutcome::Failed(_))
    }
}

/// Sends feed items to Anki at most once per (feed, deck, link).
///
/// A record is written only after AnkiConnect has accepted the note. If that
/// write fails the note exists remotely but not locally, and the next run
/// will add it again.
pub struct Processor<S> {
    store: S,
    anki: AnkiClient,
    feed_url: String,
    deck: String,
}

impl<S: DedupStore> Processor<S> {
    pub fn new(
        store: S,
        anki: AnkiClient,
        feed_url: impl Into<String>,
        deck: impl Into<String>,
    ) -> Self {
        Self {
            store,
            anki,
            feed_url: feed_url.into(),
            deck: deck.into(),
        }
    }

    pub fn fingerprint(&self, item: &FeedItem) -> Fingerprint {
        Fingerprint::for_item(&self.feed_url, &self.deck, &item.link)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub async fn process_item(&self, item: &FeedItem) -> ItemOutcome {
        let key = self.fingerprint(item);

        match self.store.lookup(&key) {
            Ok(Some(value)) if !value.is_empty() => {
                info!(
                    feed = %self.feed_url,
                    deck = %self.deck,
                    link = %item.link,
                    note_id = %String::from_utf8_lossy(&value),
                    "duplicate, skipping"
                );
                return ItemOutcome::Skipped;
            }
            Ok(_) => {}
            Err(err) => {
                warn!(fingerprint = %key, link = %item.link, error = %err, "dedup lookup failed");
                return ItemOutcome::Failed(ItemError::Lookup(err));
            }
        }

        let note = Note::from_item(item, &self.deck);
        let note_id = match self.anki.add_note(&note).await {
            Ok(id) => id,
            Err(err) => {
                warn!(
                    link = %item.link,
                    deck = %self.deck,
                    kind = ?err.kind(),
                    error = %err,
                    "failed to add note"
                );
                return ItemOutcome::Failed(ItemError::Submit(err));
            }
        };

        if let Err(err) = self.store.record(&key, note_id.to_string().as_bytes()) {
            warn!(
                fingerprint = %key,
                link = %item.link,
                %note_id,
                error = %err,
                "note added but not recorded; a later run will add it again"
            );
            return ItemOutcome::Failed(ItemError::Record {
                note_id,
                source: err,
            });
        }

        info!(%note_id, link = %item.link, deck = %self.deck, "note added");
        ItemOutcome::Submitted(note_id)
    }
}
