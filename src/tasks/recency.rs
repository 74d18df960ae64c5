use time::{Duration, OffsetDateTime};

use crate::{error::CheckError, types::FeedEntry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recency {
    Fresh,
    Old,
}

/// Skips entries published more than `max_age` before the check. Stops a
/// newly added feed from mailing out its whole backlog on the first run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecencyFilter {
    max_age: Option<Duration>,
}

impl RecencyFilter {
    pub fn new(max_age: Option<Duration>) -> Self {
        Self { max_age }
    }

    pub fn is_enabled(&self) -> bool {
        self.max_age.is_some()
    }

    /// Undated entries are an error only while the filter is on. Entries
    /// dated in the future count as fresh.
    pub fn check(&self, entry: &FeedEntry, now: OffsetDateTime) -> Result<Recency, CheckError> {
        let Some(max_age) = self.max_age else {
            return Ok(Recency::Fresh);
        };
        let published = entry.published.ok_or(CheckError::MissingTimestamp)?;

        if now - published > max_age {
            Ok(Recency::Old)
        } else {
            Ok(Recency::Fresh)
        }
    }
}
