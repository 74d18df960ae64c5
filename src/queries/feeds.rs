use async_trait::async_trait;
use feed_rs::{model::Entry, parser};
use log::{debug, warn};
use time::OffsetDateTime;

use crate::{error::FetchError, types::FeedEntry};

/// Source of feed entries. The HTTP implementation is used in production;
/// tests swap in canned feeds.
#[async_trait]
pub trait FeedFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<FeedEntry>, FetchError>;
}

pub struct HttpFeedFetcher {
    client: reqwest::Client,
}

impl HttpFeedFetcher {
    /// The client should carry a timeout; nothing here adds one.
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl FeedFetcher for HttpFeedFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<FeedEntry>, FetchError> {
        let res = self.client.get(url).send().await?;

        if !res.status().is_success() {
            return Err(FetchError::Status(res.status()));
        }

        let content = res.bytes().await?;
        debug!("[Fetch] {} returned {} bytes", url, content.len());

        parse_entries(&content[..])
    }
}

/// Parses RSS or Atom, keeping the order the feed lists entries in.
pub fn parse_entries(content: &[u8]) -> Result<Vec<FeedEntry>, FetchError> {
    let channel = parser::parse(content).map_err(|err| FetchError::Parse(err.to_string()))?;

    Ok(channel.entries.into_iter().map(to_feed_entry).collect())
}

fn to_feed_entry(entry: Entry) -> FeedEntry {
    let link = entry
        .links
        .iter()
        .find(|link| link.rel.as_deref() == Some("alternate"))
        .or_else(|| entry.links.first())
        .map(|link| link.href.clone());

    let published = entry.published.or(entry.updated).and_then(|date| {
        match OffsetDateTime::from_unix_timestamp(date.timestamp()) {
            Ok(published) => Some(published),
            Err(err) => {
                warn!("[Fetch] Published date for {} out of range: {}", entry.id, err);
                None
            }
        }
    });

    let description = entry
        .summary
        .map(|summary| summary.content)
        .or_else(|| entry.content.and_then(|content| content.body));

    FeedEntry {
        title: entry.title.map(|title| title.content),
        author: entry.authors.into_iter().next().map(|author| author.name),
        description,
        link,
        published,
        id: entry.id,
    }
}
