use time::{OffsetDateTime, UtcOffset, format_description::BorrowedFormatItem, macros::format_description};

use crate::types::FeedEntry;

const SUBJECT_TIME_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

/// The timestamp only keeps mail clients from threading separate
/// announcements together.
pub fn subject(prefix: &str, label: &str, title: &str, at: OffsetDateTime) -> String {
    let at = at.to_offset(UtcOffset::UTC);
    let stamp = at
        .format(SUBJECT_TIME_FORMAT)
        .unwrap_or_else(|_| at.to_string());

    format!("{prefix} - {label} Announcement: {title} ({stamp})")
}

/// Feed fields go in verbatim. Descriptions are HTML already and nothing is
/// escaped, so markup in a feed ends up in the mail as-is.
pub fn html_body(entry: &FeedEntry) -> String {
    format!(
        "<p><strong>Author:</strong> {}</p><p>{}</p><p><a href='{}'>Read more</a></p>",
        entry.author(),
        entry.description(),
        entry.link()
    )
}
