use std::sync::Arc;

use anyhow::Context;
use course_notifier::{
    config::Config,
    queries::{feeds::HttpFeedFetcher, mail::SendGridMailer},
    tasks::check_feeds::Checker,
};
use dotenvy::dotenv;
use log::info;

#[cfg(feature = "scheduler")]
use tokio_cron_scheduler::{Job, JobScheduler};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env().context("Couldn't load configuration")?;
    info!("Loaded {} feeds", config.feeds.len());

    let client = reqwest::Client::builder()
        .timeout(config.http_timeout)
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Couldn't build http client")?;

    let checker = Arc::new(Checker::new(
        &config,
        HttpFeedFetcher::new(client.clone()),
        SendGridMailer::new(client, config.mail.clone()),
    ));

    #[cfg(feature = "scheduler")]
    {
        if let Some(schedule) = config.schedule.as_deref() {
            let tmp_checker = Arc::clone(&checker);

            let mut scheduler = JobScheduler::new().await?;
            scheduler
                .add(Job::new_async(schedule, move |_uuid, _l| {
                    let checker = Arc::clone(&tmp_checker);
                    Box::pin(async move {
                        checker.run().await;
                    })
                })?)
                .await?;
            info!("Initialized Feeds Scheduler with {}", schedule);
            scheduler.start().await?;
            info!("Feeds Scheduler Started");

            tokio::signal::ctrl_c().await?;
            info!("Stopping Feeds Scheduler");
            scheduler.shutdown().await?;
            return Ok(());
        }
    }

    #[cfg(not(feature = "scheduler"))]
    {
        if config.schedule.is_some() {
            log::warn!("CHECK_SCHEDULE is set but this build has no scheduler, checking once");
        }
    }

    checker.run().await;

    Ok(())
}
