use std::fmt;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

pub const NO_AUTHOR: &str = "No author specified";
pub const NO_TITLE: &str = "Untitled";

// Config Types

/// One announcement feed to watch, paired with the label used in subjects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedSource {
    pub url: String,
    pub label: String,
}

/// How identifiers are written to the seen posts file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdScope {
    /// `<feed url>\t<entry id>`, so equal ids on different feeds don't collide.
    #[default]
    PerFeed,
    /// The bare entry id.
    Global,
}

// Feed Types

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEntry {
    pub id: String,
    pub title: Option<String>,
    pub author: Option<String>,
    pub description: Option<String>,
    pub link: Option<String>,
    /// `None` when the feed had no date or one the parser couldn't read.
    pub published: Option<OffsetDateTime>,
}

impl FeedEntry {
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or(NO_TITLE)
    }

    pub fn author(&self) -> &str {
        self.author.as_deref().unwrap_or(NO_AUTHOR)
    }

    pub fn description(&self) -> &str {
        self.description.as_deref().unwrap_or_default()
    }

    pub fn link(&self) -> &str {
        self.link.as_deref().unwrap_or_default()
    }
}

// Mail Types

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReceipt {
    pub status: u16,
    pub message_id: Option<String>,
}

// Report Types

/// Per-entry outcomes for one feed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeedReport {
    pub sent: u32,
    pub send_failed: u32,
    pub skipped_old: u32,
    pub skipped_seen: u32,
    pub skipped_undated: u32,
}

impl FeedReport {
    pub fn notified(&self) -> u32 {
        self.sent + self.send_failed
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CheckReport {
    pub feeds_checked: u32,
    pub feeds_failed: u32,
    pub entries: FeedReport,
}

impl CheckReport {
    pub fn absorb(&mut self, feed: &FeedReport) {
        self.feeds_checked += 1;
        self.entries.sent += feed.sent;
        self.entries.send_failed += feed.send_failed;
        self.entries.skipped_old += feed.skipped_old;
        self.entries.skipped_seen += feed.skipped_seen;
        self.entries.skipped_undated += feed.skipped_undated;
    }

    pub fn feed_failed(&mut self) {
        self.feeds_failed += 1;
    }
}

impl fmt::Display for CheckReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} feeds checked, {} failed; {} sent, {} send failures, {} old, {} already seen, {} undated",
            self.feeds_checked,
            self.feeds_failed,
            self.entries.sent,
            self.entries.send_failed,
            self.entries.skipped_old,
            self.entries.skipped_seen,
            self.entries.skipped_undated,
        )
    }
}
