use std::path::PathBuf;
use std::time::Duration;

use crate::error::StoreError;

pub const DEFAULT_DECK: &str = "Hatena";
pub const DEFAULT_ANKI_ENDPOINT: &str = "http://127.0.0.1:8765";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

const STORE_DIR: &str = ".cache/anki-breakdown-hatena-rss";

/// Everything one run needs. Nothing is read from globals.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub feed_url: String,
    pub deck: String,
    pub anki_endpoint: String,
    pub store_path: PathBuf,
    pub user_agent: String,
    pub request_timeout: Duration,
    /// Pause after each successfully added note.
    pub submit_pause: Duration,
}

impl RunConfig {
    /// Builds a configuration with the default endpoint and store location.
    pub fn new(feed_url: impl Into<String>, deck: impl Into<String>) -> Result<Self, StoreError> {
        Ok(Self::with_store_path(feed_url, deck, default_store_path()?))
    }

    pub fn with_store_path(
        feed_url: impl Into<String>,
        deck: impl Into<String>,
        store_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            feed_url: feed_url.into(),
            deck: deck.into(),
            anki_endpoint: DEFAULT_ANKI_ENDPOINT.to_owned(),
            store_path: store_path.into(),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            request_timeout: Duration::from_secs(30),
            submit_pause: Duration::from_millis(100),
        }
    }
}

/// `~/.cache/anki-breakdown-hatena-rss`
pub fn default_store_path() -> Result<PathBuf, StoreError> {
    let home = dirs::home_dir().ok_or(StoreError::NoHomeDir)?;
    Ok(home.join(STORE_DIR))
}
