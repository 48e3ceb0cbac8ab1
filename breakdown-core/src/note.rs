use chrono::Local;

use crate::feed::FeedItem;

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A Basic-model note ready to be sent to AnkiConnect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub deck: String,
    pub front: String,
    pub back: String,
    pub tags: Vec<String>,
}

impl Note {
    pub fn from_item(item: &FeedItem, deck: &str) -> Self {
        Self {
            deck: deck.to_owned(),
            front: render_front(item),
            back: render_back(item),
            tags: item.categories.clone(),
        }
    }
}

/// HTML front of the card. Item text is inserted as-is, without escaping.
pub fn render_front(item: &FeedItem) -> String {
    let image_url = item.image_url.as_deref().unwrap_or_default();
    let categories = item.categories.join(" ");
    let bookmark_count = item.extensions.bookmark_count().unwrap_or_default();
    let published = item
        .published_at
        .map(|at| at.with_timezone(&Local).format(DATE_FORMAT).to_string())
        .unwrap_or_default();
    let author = item.author.as_deref().unwrap_or_default();
    let description = item.description.as_deref().unwrap_or_default();

    format!(
        r#"
<p>Break it down?</p>
<hr />
<br />

<img src="{image_url}" />
<p>{title}</p>{categories}
<p>{link}</p>
<br />
<div style="text-align: left;">
	<p>Bookmark: {bookmark_count} Users</p>
	<p>Date: {published}</p>
  <p>{author}: {description}</p>
</div>
"#,
        title = item.title,
        link = item.link,
    )
}

/// Back of the card: the item's full content, or its description when the
/// feed carries no content element.
pub fn render_back(item: &FeedItem) -> String {
    item.content
        .as_deref()
        .or(item.description.as_deref())
        .unwrap_or_default()
        .to_owned()
}
