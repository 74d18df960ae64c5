use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} must be set")]
    MissingVar(&'static str),

    #[error("{name} has invalid value {value:?}: {reason}")]
    InvalidVar {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("Couldn't read feeds file {}: {source}", path.display())]
    FeedsFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Couldn't parse feeds file: {0}")]
    FeedsJson(#[from] serde_json::Error),

    #[error("Feed url {url:?} is invalid: {source}")]
    FeedUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("No feeds configured")]
    NoFeeds,
}

/// Seen-post file failures. Either one aborts the current feed's check.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Couldn't read seen posts from {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Couldn't append seen post to {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Network request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Feed responded with status {0}")]
    Status(reqwest::StatusCode),

    #[error("Parsing failed: {0}")]
    Parse(String),
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CheckError {
    #[error("entry has no readable published date")]
    MissingTimestamp,
}

#[derive(Error, Debug)]
pub enum SendError {
    #[error("Email request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Email service rejected the message with status {status} and body {body}")]
    Rejected { status: u16, body: String },
}

/// Reasons a single feed's check stops early. The run moves on to the next feed.
#[derive(Error, Debug)]
pub enum FeedError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Fetch(#[from] FetchError),
}
