use std::{
    collections::HashSet,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use log::debug;
use tokio::{fs::OpenOptions, io::AsyncWriteExt};

use crate::{
    error::StoreError,
    types::{FeedSource, IdScope},
};

/// Identifiers already notified on, as read from the seen posts file.
#[derive(Debug, Default, Clone)]
pub struct SeenSet {
    keys: HashSet<String>,
}

impl SeenSet {
    /// True if `key` was recorded, or if the bare `entry_id` was (lines
    /// written before ids were scoped per feed).
    pub fn contains(&self, key: &str, entry_id: &str) -> bool {
        self.keys.contains(key) || self.keys.contains(single_line(entry_id).as_str())
    }

    pub fn insert(&mut self, key: String) -> bool {
        self.keys.insert(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl FromIterator<String> for SeenSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            keys: iter.into_iter().collect(),
        }
    }
}

/// Append-only flat file, one key per line. Never rewritten or pruned, so it
/// grows for as long as the notifier runs.
#[derive(Debug, Clone)]
pub struct SeenStore {
    path: PathBuf,
    scope: IdScope,
}

impl SeenStore {
    pub fn new(path: impl Into<PathBuf>, scope: IdScope) -> Self {
        Self {
            path: path.into(),
            scope,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn key_for(&self, source: &FeedSource, entry_id: &str) -> String {
        let id = single_line(entry_id);
        match self.scope {
            IdScope::Global => id,
            IdScope::PerFeed => format!("{}\t{id}", source.url),
        }
    }

    /// A missing file is an empty set. Any other read failure is an error so
    /// the caller doesn't treat every entry as new.
    pub async fn load(&self) -> Result<SeenSet, StoreError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!("[Seen Posts] {} doesn't exist yet", self.path.display());
                return Ok(SeenSet::default());
            }
            Err(source) => {
                return Err(StoreError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        Ok(content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_owned)
            .collect())
    }

    /// Appends without checking for duplicates.
    pub async fn record(&self, key: &str) -> Result<(), StoreError> {
        let write_err = |source| StoreError::Write {
            path: self.path.clone(),
            source,
        };

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(write_err)?;
        file.write_all(format!("{key}\n").as_bytes())
            .await
            .map_err(write_err)?;
        file.flush().await.map_err(write_err)?;

        Ok(())
    }
}

// Keys are stored one per line, so line breaks inside an id can't survive.
fn single_line(id: &str) -> String {
    id.trim().replace(['\r', '\n'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{source, temp_path};

    #[tokio::test]
    async fn missing_file_loads_empty() {
        let store = SeenStore::new(temp_path("seen"), IdScope::Global);
        let seen = store.load().await.unwrap();
        assert!(seen.is_empty());
    }

    #[tokio::test]
    async fn unreadable_path_is_an_error() {
        // A directory can't be read as a file.
        let store = SeenStore::new(std::env::temp_dir(), IdScope::Global);
        assert!(matches!(store.load().await, Err(StoreError::Read { .. })));
    }

    #[tokio::test]
    async fn record_then_load_round_trips_and_collapses_duplicates() {
        let path = temp_path("seen");
        let store = SeenStore::new(path.clone(), IdScope::Global);

        for id in ["a", "b", "c", "b", "a"] {
            store.record(id).await.unwrap();
        }

        let seen = store.load().await.unwrap();
        assert_eq!(seen.len(), 3);
        for id in ["a", "b", "c"] {
            assert!(seen.contains(id, id));
        }
        assert!(!seen.contains("d", "d"));

        tokio::fs::remove_file(path).await.unwrap();
    }

    #[tokio::test]
    async fn file_grows_with_every_record() {
        let path = temp_path("seen");
        let store = SeenStore::new(path.clone(), IdScope::Global);

        store.record("same").await.unwrap();
        store.record("same").await.unwrap();
        store.record("same").await.unwrap();

        let content = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(content, "same\nsame\nsame\n");
        assert_eq!(store.load().await.unwrap().len(), 1);

        tokio::fs::remove_file(path).await.unwrap();
    }

    #[tokio::test]
    async fn load_ignores_blank_lines_and_whitespace() {
        let path = temp_path("seen");
        tokio::fs::write(&path, "one\r\n\n  two  \n").await.unwrap();

        let seen = SeenStore::new(path.clone(), IdScope::Global).load().await.unwrap();
        assert_eq!(seen.len(), 2);
        assert!(seen.contains("one", "one"));
        assert!(seen.contains("two", "two"));

        tokio::fs::remove_file(path).await.unwrap();
    }

    #[test]
    fn per_feed_keys_include_the_feed_url() {
        let feed = source("CCU");
        let per_feed = SeenStore::new("unused", IdScope::PerFeed);
        let global = SeenStore::new("unused", IdScope::Global);

        assert_eq!(
            per_feed.key_for(&feed, "abc123"),
            "https://example.com/CCU/rss/announcement\tabc123"
        );
        assert_eq!(global.key_for(&feed, "abc123"), "abc123");
        assert_eq!(global.key_for(&feed, " multi\nline "), "multi line");
    }

    #[test]
    fn per_feed_keys_dont_collide_across_feeds() {
        let store = SeenStore::new("unused", IdScope::PerFeed);
        let a = source("A");
        let b = source("B");

        let seen: SeenSet = [store.key_for(&a, "42")].into_iter().collect();
        assert!(seen.contains(&store.key_for(&a, "42"), "42"));
        assert!(!seen.contains(&store.key_for(&b, "42"), "42"));
    }

    #[test]
    fn bare_ids_match_any_feed() {
        let store = SeenStore::new("unused", IdScope::PerFeed);
        let seen: SeenSet = ["42".to_string()].into_iter().collect();

        assert!(seen.contains(&store.key_for(&source("A"), "42"), "42"));
        assert!(seen.contains(&store.key_for(&source("B"), "42"), "42"));
    }
}
