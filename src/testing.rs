use std::{collections::HashMap, path::PathBuf, sync::Mutex};

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    error::{FetchError, SendError},
    queries::{feeds::FeedFetcher, mail::Mailer},
    types::{DeliveryReceipt, FeedEntry, FeedSource},
};

/// A fresh path under the OS temp dir. Nothing is created.
pub fn temp_path(tag: &str) -> PathBuf {
    std::env::temp_dir().join(format!("course-notifier-{tag}-{}", Uuid::new_v4()))
}

pub fn source(label: &str) -> FeedSource {
    FeedSource {
        url: format!("https://example.com/{label}/rss/announcement"),
        label: label.into(),
    }
}

pub fn entry(id: &str, title: &str, published: Option<OffsetDateTime>) -> FeedEntry {
    FeedEntry {
        id: id.into(),
        title: Some(title.into()),
        author: Some("Prof. Silva".into()),
        description: Some("<b>Details</b>".into()),
        link: Some(format!("https://example.com/posts/{id}")),
        published,
    }
}

/// Serves canned entries per url. Urls without entries fail to parse.
#[derive(Default)]
pub struct FakeFetcher {
    feeds: HashMap<String, Vec<FeedEntry>>,
}

impl FakeFetcher {
    pub fn with(mut self, source: &FeedSource, entries: Vec<FeedEntry>) -> Self {
        self.feeds.insert(source.url.clone(), entries);
        self
    }
}

#[async_trait]
impl FeedFetcher for FakeFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<FeedEntry>, FetchError> {
        self.feeds
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::Parse(format!("no feed at {url}")))
    }
}

/// Records every attempted send. Subjects containing `fail_on` are rejected.
#[derive(Default)]
pub struct FakeMailer {
    pub sent: Mutex<Vec<(String, String)>>,
    pub fail_on: Option<String>,
}

impl FakeMailer {
    pub fn failing_on(needle: &str) -> Self {
        Self {
            fail_on: Some(needle.into()),
            ..Default::default()
        }
    }

    pub fn subjects(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|(subject, _)| subject.clone())
            .collect()
    }
}

#[async_trait]
impl Mailer for FakeMailer {
    async fn send(&self, subject: &str, html: &str) -> Result<DeliveryReceipt, SendError> {
        self.sent
            .lock()
            .unwrap()
            .push((subject.to_owned(), html.to_owned()));

        if self.fail_on.as_deref().is_some_and(|n| subject.contains(n)) {
            return Err(SendError::Rejected {
                status: 500,
                body: "boom".into(),
            });
        }

        Ok(DeliveryReceipt {
            status: 202,
            message_id: Some("fake".into()),
        })
    }
}
