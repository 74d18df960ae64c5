use std::{env, path::PathBuf, time::Duration as StdDuration};

use time::Duration;
use url::Url;

use crate::{
    error::ConfigError,
    queries::mail::SENDGRID_URL,
    types::{FeedSource, IdScope},
};

pub const DEFAULT_FEEDS_FILE: &str = "feeds.json";
pub const DEFAULT_SEEN_POSTS_FILE: &str = "seen_posts.txt";
pub const DEFAULT_MAX_AGE_HOURS: i64 = 5;
pub const DEFAULT_SUBJECT_PREFIX: &str = "IST";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct MailConfig {
    pub api_key: String,
    pub sender: String,
    pub recipient: String,
    pub endpoint: String,
}

/// Everything a run needs, built once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub feeds: Vec<FeedSource>,
    pub mail: MailConfig,
    pub seen_posts_file: PathBuf,
    /// `None` turns the recency filter off.
    pub max_entry_age: Option<Duration>,
    pub id_scope: IdScope,
    pub subject_prefix: String,
    pub http_timeout: StdDuration,
    /// Cron expression, only honoured with the `scheduler` feature.
    pub schedule: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the config from any variable source. Credentials are checked
    /// before the feeds file is touched.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let require = |name: &'static str| get(name).ok_or(ConfigError::MissingVar(name));

        let mail = MailConfig {
            api_key: require("SENDGRID_API_KEY")?,
            sender: require("SENDER_EMAIL")?,
            recipient: require("RECEIVER_EMAIL")?,
            endpoint: get("MAIL_URL").unwrap_or_else(|| SENDGRID_URL.into()),
        };

        let max_entry_age = match get("MAX_ENTRY_AGE_HOURS") {
            None => Some(Duration::hours(DEFAULT_MAX_AGE_HOURS)),
            Some(value) => match value.trim().parse::<u32>() {
                Ok(0) => None,
                Ok(hours) => Some(Duration::hours(hours.into())),
                Err(err) => {
                    return Err(ConfigError::InvalidVar {
                        name: "MAX_ENTRY_AGE_HOURS",
                        value,
                        reason: err.to_string(),
                    });
                }
            },
        };

        let id_scope = match get("SEEN_ID_SCOPE").as_deref().map(str::trim) {
            None | Some("feed") => IdScope::PerFeed,
            Some("global") => IdScope::Global,
            Some(other) => {
                return Err(ConfigError::InvalidVar {
                    name: "SEEN_ID_SCOPE",
                    value: other.into(),
                    reason: "expected `feed` or `global`".into(),
                });
            }
        };

        let http_timeout = match get("HTTP_TIMEOUT_SECS") {
            None => StdDuration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            Some(value) => match value.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => StdDuration::from_secs(secs),
                Ok(_) => {
                    return Err(ConfigError::InvalidVar {
                        name: "HTTP_TIMEOUT_SECS",
                        value,
                        reason: "must be greater than zero".into(),
                    });
                }
                Err(err) => {
                    return Err(ConfigError::InvalidVar {
                        name: "HTTP_TIMEOUT_SECS",
                        value,
                        reason: err.to_string(),
                    });
                }
            },
        };

        let feeds_file = PathBuf::from(get("FEEDS_FILE").unwrap_or_else(|| DEFAULT_FEEDS_FILE.into()));
        let feeds = load_feeds(&feeds_file)?;

        Ok(Self {
            feeds,
            mail,
            seen_posts_file: get("SEEN_POSTS_FILE")
                .unwrap_or_else(|| DEFAULT_SEEN_POSTS_FILE.into())
                .into(),
            max_entry_age,
            id_scope,
            subject_prefix: get("SUBJECT_PREFIX").unwrap_or_else(|| DEFAULT_SUBJECT_PREFIX.into()),
            http_timeout,
            schedule: get("CHECK_SCHEDULE"),
        })
    }
}

pub fn load_feeds(path: &std::path::Path) -> Result<Vec<FeedSource>, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::FeedsFile {
        path: path.to_owned(),
        source,
    })?;
    parse_feeds(&content)
}

/// Parses a JSON array of `{ "url", "label" }`, keeping file order.
pub fn parse_feeds(content: &str) -> Result<Vec<FeedSource>, ConfigError> {
    let feeds: Vec<FeedSource> = serde_json::from_str(content)?;

    if feeds.is_empty() {
        return Err(ConfigError::NoFeeds);
    }

    for feed in &feeds {
        Url::parse(&feed.url).map_err(|source| ConfigError::FeedUrl {
            url: feed.url.clone(),
            source,
        })?;
    }

    Ok(feeds)
}
