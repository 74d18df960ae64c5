use log::{debug, error, info, warn};
use time::OffsetDateTime;
use tokio::sync::Mutex;

use crate::{
    config::Config,
    error::FeedError,
    queries::{feeds::FeedFetcher, mail::Mailer, seen::SeenStore},
    tasks::recency::{Recency, RecencyFilter},
    types::{CheckReport, FeedReport, FeedSource},
    utils::{html_body, subject},
};

/// Polls every configured feed once and mails each new, recent entry.
pub struct Checker<F, M> {
    feeds: Vec<FeedSource>,
    fetcher: F,
    mailer: M,
    store: SeenStore,
    recency: RecencyFilter,
    subject_prefix: String,
    // Held for a whole run so overlapping runs can't interleave load and append.
    run_lock: Mutex<()>,
}

impl<F: FeedFetcher, M: Mailer> Checker<F, M> {
    pub fn new(config: &Config, fetcher: F, mailer: M) -> Self {
        Self {
            feeds: config.feeds.clone(),
            fetcher,
            mailer,
            store: SeenStore::new(config.seen_posts_file.clone(), config.id_scope),
            recency: RecencyFilter::new(config.max_entry_age),
            subject_prefix: config.subject_prefix.clone(),
            run_lock: Mutex::new(()),
        }
    }

    /// Checks feeds one after another in configured order. A failing feed is
    /// logged and skipped; it never stops the rest of the run. Concurrent
    /// calls queue behind each other.
    pub async fn run(&self) -> CheckReport {
        let _guard = self.run_lock.lock().await;
        let start_time = OffsetDateTime::now_utc();
        info!(
            "[Check Feeds] Check started at {} for {} feeds, seen posts in {}",
            start_time,
            self.feeds.len(),
            self.store.path().display()
        );

        if !self.recency.is_enabled() {
            info!("[Check Feeds] Recency filter is off, every unseen entry will be mailed");
        }

        let mut report = CheckReport::default();
        for source in &self.feeds {
            match self.check_feed(source).await {
                Ok(feed_report) => {
                    info!(
                        "[Check Feeds] {} done: {} notified, {} already seen, {} old",
                        source.label,
                        feed_report.notified(),
                        feed_report.skipped_seen,
                        feed_report.skipped_old
                    );
                    report.absorb(&feed_report);
                }
                Err(err) => {
                    error!("[Check Feeds] Check for {} ({}) failed with err {}", source.label, source.url, err);
                    report.feed_failed();
                }
            }
        }

        let now = OffsetDateTime::now_utc();
        info!(
            "[Check Feeds] Finished. Started at {} finished at {} took {}. {}",
            start_time,
            now,
            now - start_time,
            report
        );

        report
    }

    pub async fn check_feed(&self, source: &FeedSource) -> Result<FeedReport, FeedError> {
        self.check_feed_at(source, OffsetDateTime::now_utc()).await
    }

    /// One feed's cycle. `now` drives the age check; subjects are stamped
    /// when each mail goes out.
    ///
    /// Each entry is recorded as seen before its mail goes out, so a failed
    /// send is never retried. A store failure aborts the feed rather than
    /// risk mailing entries it can't remember.
    pub async fn check_feed_at(
        &self,
        source: &FeedSource,
        now: OffsetDateTime,
    ) -> Result<FeedReport, FeedError> {
        let mut seen = self.store.load().await?;
        let entries = self.fetcher.fetch(&source.url).await?;
        debug!(
            "[Check Feeds] {} returned {} entries, {} ids already seen",
            source.label,
            entries.len(),
            seen.len()
        );
        if seen.is_empty() {
            info!("[Check Feeds] No seen posts recorded yet, checking {} from scratch", source.label);
        }

        let mut report = FeedReport::default();
        for entry in entries {
            match self.recency.check(&entry, now) {
                Ok(Recency::Fresh) => {}
                Ok(Recency::Old) => {
                    report.skipped_old += 1;
                    continue;
                }
                Err(err) => {
                    warn!("[Check Feeds] Skipping entry {} from {}: {}", entry.id, source.label, err);
                    report.skipped_undated += 1;
                    continue;
                }
            }

            let key = self.store.key_for(source, &entry.id);
            if seen.contains(&key, &entry.id) {
                report.skipped_seen += 1;
                continue;
            }

            self.store.record(&key).await?;
            // Feeds occasionally repeat an item within one document.
            seen.insert(key);

            let subject = subject(
                &self.subject_prefix,
                &source.label,
                entry.title(),
                OffsetDateTime::now_utc(),
            );
            match self.mailer.send(&subject, &html_body(&entry)).await {
                Ok(receipt) => {
                    info!(
                        "[Check Feeds] Email sent for {} with status {} (message id {})",
                        entry.id,
                        receipt.status,
                        receipt.message_id.as_deref().unwrap_or("none")
                    );
                    report.sent += 1;
                }
                Err(err) => {
                    error!("[Check Feeds] Email for {} failed with err {}", entry.id, err);
                    report.send_failed += 1;
                }
            }
        }

        Ok(report)
    }
}
