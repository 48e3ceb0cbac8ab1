use std::fmt;

use sha2::{Digest, Sha256};

/// Dedup key for one (feed, deck, item link) triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    /// SHA-256 of the parts joined with `:`.
    pub fn of(parts: &[&str]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(parts.join(":").as_bytes());
        Self(hasher.finalize().into())
    }

    pub fn for_item(feed_url: &str, deck: &str, link: &str) -> Self {
        Self::of(&[feed_url, deck, link])
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl AsRef<[u8]> for Fingerprint {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}
