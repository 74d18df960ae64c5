pub mod check_feeds;
pub mod recency;
