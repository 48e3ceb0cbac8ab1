use reqwest::StatusCode;
use thiserror::Error;

use crate::anki::NoteId;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("feed server answered with HTTP {0}")]
    Status(StatusCode),
    #[error("document is neither RSS ({rss}) nor Atom ({atom})")]
    Parse {
        rss: rss::Error,
        atom: atom_syndication::Error,
    },
}

/// How an [`AnkiError`] should be read by callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request never produced a usable answer.
    Transport,
    /// AnkiConnect answered with a 4xx status.
    BadRequest,
    /// AnkiConnect answered but refused the note.
    Api,
}

#[derive(Debug, Error)]
pub enum AnkiError {
    #[error("addNote request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("addNote non-OK HTTP status {status}: {body}")]
    Server { status: StatusCode, body: String },
    #[error("addNote bad request, HTTP status {status}: {body}")]
    BadRequest { status: StatusCode, body: String },
    #[error("addNote response is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("addNote rejected by AnkiConnect: {0}")]
    Rejected(String),
    #[error("addNote response carries neither result nor error")]
    MissingResult,
}

impl AnkiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AnkiError::BadRequest { .. } => ErrorKind::BadRequest,
            AnkiError::Rejected(_) | AnkiError::MissingResult => ErrorKind::Api,
            AnkiError::Network(_) | AnkiError::Server { .. } | AnkiError::Decode(_) => {
                ErrorKind::Transport
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("rocksdb error: {0}")]
    RocksDb(#[from] rocksdb::Error),
    #[error("could not locate the home directory")]
    NoHomeDir,
}

/// Failure confined to one feed item. The run keeps going.
#[derive(Debug, Error)]
pub enum ItemError {
    #[error("dedup lookup failed: {0}")]
    Lookup(#[source] StoreError),
    #[error("note submission failed: {0}")]
    Submit(#[from] AnkiError),
    #[error("note {note_id} was added but could not be recorded: {source}")]
    Record {
        note_id: NoteId,
        #[source]
        source: StoreError,
    },
}

/// Failure that leaves nothing to process.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("failed to fetch feed: {0}")]
    Fetch(#[from] FetchError),
    #[error("failed to open dedup store: {0}")]
    Store(#[from] StoreError),
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}
