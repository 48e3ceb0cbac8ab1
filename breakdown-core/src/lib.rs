pub mod anki;
pub mod config;
pub mod error;
pub mod feed;
pub mod fingerprint;
pub mod note;
pub mod processor;
pub mod run;
pub mod storage;

pub use anki::{AnkiClient, NoteId};
pub use config::RunConfig;
pub use error::{AnkiError, ErrorKind, FetchError, ItemError, RunError, StoreError};
pub use feed::{fetch_feed, parse_feed, FeedItem, ProviderExtensions};
pub use fingerprint::Fingerprint;
pub use note::Note;
pub use processor::{ItemOutcome, Processor};
pub use run::{build_client, process_items, run, RunSummary};
pub use storage::{DedupStore, MemoryStore, RocksStore};
