use std::collections::BTreeMap;
use std::io::Cursor;

use chrono::{DateTime, FixedOffset};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::FetchError;

/// Namespaced elements the parsers did not map to a known field,
/// keyed by namespace prefix, then by element name.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProviderExtensions(BTreeMap<String, BTreeMap<String, Vec<String>>>);

impl ProviderExtensions {
    pub fn insert(&mut self, prefix: &str, name: &str, value: impl Into<String>) {
        self.0
            .entry(prefix.to_owned())
            .or_default()
            .entry(name.to_owned())
            .or_default()
            .push(value.into());
    }

    /// First value of `<prefix:name>`, if the element exists and has one.
    pub fn first_value(&self, prefix: &str, name: &str) -> Option<&str> {
        self.0
            .get(prefix)?
            .get(name)?
            .first()
            .map(String::as_str)
    }

    /// `<hatena:bookmarkcount>`
    pub fn bookmark_count(&self) -> Option<&str> {
        self.first_value("hatena", "bookmarkcount")
    }

    /// `<hatena:imageurl>`
    pub fn image_url(&self) -> Option<&str> {
        self.first_value("hatena", "imageurl")
    }

    fn from_rss(map: &rss::extension::ExtensionMap) -> Self {
        let mut out = Self::default();
        for (prefix, elements) in map {
            for (name, values) in elements {
                for ext in values {
                    if let Some(value) = ext.value() {
                        out.insert(prefix, name, value);
                    } else if let Some(url) = ext.attrs().get("url") {
                        // media:thumbnail and friends carry their payload as an attribute
                        out.insert(prefix, name, url.as_str());
                    }
                }
            }
        }
        out
    }

    fn from_atom(map: &atom_syndication::extension::ExtensionMap) -> Self {
        let mut out = Self::default();
        for (prefix, elements) in map {
            for (name, values) in elements {
                for ext in values {
                    if let Some(value) = ext.value() {
                        out.insert(prefix, name, value);
                    } else if let Some(url) = ext.attrs().get("url") {
                        out.insert(prefix, name, url.as_str());
                    }
                }
            }
        }
        out
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FeedItem {
    pub title: String,
    pub link: String,
    pub description: Option<String>,
    pub content: Option<String>,
    pub published_at: Option<DateTime<FixedOffset>>,
    pub author: Option<String>,
    pub categories: Vec<String>,
    pub image_url: Option<String>,
    pub extensions: ProviderExtensions,
}

impl FeedItem {
    pub fn from_rss_item(item: &rss::Item) -> Self {
        let dc = item.dublin_core_ext();

        let published_at = item
            .pub_date()
            .and_then(|value| DateTime::parse_from_rfc2822(value).ok())
            .or_else(|| {
                dc.and_then(|dc| dc.dates().first())
                    .and_then(|value| DateTime::parse_from_rfc3339(value).ok())
            });

        let author = dc
            .and_then(|dc| dc.creators().first().cloned())
            .or_else(|| item.author().map(ToOwned::to_owned));

        let mut categories: Vec<String> = item
            .categories()
            .iter()
            .map(|cat| cat.name().to_owned())
            .collect();
        if categories.is_empty() {
            if let Some(dc) = dc {
                categories = dc.subjects().to_vec();
            }
        }

        let extensions = ProviderExtensions::from_rss(item.extensions());

        let image_url = item
            .enclosure()
            .filter(|enc| enc.mime_type().starts_with("image/"))
            .map(|enc| enc.url().to_owned())
            .or_else(|| extensions.image_url().map(ToOwned::to_owned))
            .or_else(|| {
                extensions
                    .first_value("media", "thumbnail")
                    .map(ToOwned::to_owned)
            });

        Self {
            title: item.title().unwrap_or_default().to_owned(),
            link: item.link().unwrap_or_default().to_owned(),
            description: item.description().map(ToOwned::to_owned),
            content: item.content().map(ToOwned::to_owned),
            published_at,
            author,
            categories,
            image_url,
            extensions,
        }
    }

    pub fn from_atom_entry(entry: &atom_syndication::Entry) -> Self {
        let link = entry
            .links()
            .iter()
            .find(|link| link.rel() == "alternate")
            .or_else(|| entry.links().first())
            .map(|link| link.href().to_owned())
            .unwrap_or_default();

        let extensions = ProviderExtensions::from_atom(entry.extensions());

        let image_url = entry
            .links()
            .iter()
            .find(|link| {
                link.rel() == "enclosure"
                    && link
                        .mime_type()
                        .map(|mime| mime.starts_with("image/"))
                        .unwrap_or(false)
            })
            .map(|link| link.href().to_owned())
            .or_else(|| extensions.image_url().map(ToOwned::to_owned))
            .or_else(|| {
                extensions
                    .first_value("media", "thumbnail")
                    .map(ToOwned::to_owned)
            });

        Self {
            title: entry.title().value.clone(),
            link,
            description: entry.summary().map(|text| text.value.clone()),
            content: entry
                .content()
                .and_then(|content| content.value())
                .map(ToOwned::to_owned),
            published_at: entry.published().copied().or(Some(*entry.updated())),
            author: entry.authors().first().map(|person| person.name().to_owned()),
            categories: entry
                .categories()
                .iter()
                .map(|cat| cat.term().to_owned())
                .collect(),
            image_url,
            extensions,
        }
    }
}

/// Parses an RSS (0.9x, 1.0, 2.0) or Atom document, in document order.
pub fn parse_feed(bytes: &[u8]) -> Result<Vec<FeedItem>, FetchError> {
    let rss_err = match rss::Channel::read_from(Cursor::new(bytes)) {
        Ok(channel) => return Ok(channel.items().iter().map(FeedItem::from_rss_item).collect()),
        Err(err) => err,
    };

    match atom_syndication::Feed::read_from(Cursor::new(bytes)) {
        Ok(feed) => Ok(feed.entries().iter().map(FeedItem::from_atom_entry).collect()),
        Err(atom_err) => Err(FetchError::Parse {
            rss: rss_err,
            atom: atom_err,
        }),
    }
}

pub async fn fetch_feed(client: &Client, url: &str) -> Result<Vec<FeedItem>, FetchError> {
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status(status));
    }
    let bytes = response.bytes().await?;
    let items = parse_feed(&bytes)?;
    debug!(feed = %url, items = items.len(), "feed fetched");
    Ok(items)
}
