//! Command-line mail filter.
//!
//! Connects to a JMAP account, queues read/flag/trash mutations for inbox
//! messages addressed to a recipient, and flushes them in one request.
//!
//! Environment:
//!
//! - `JMAPFILTER_USERNAME` / `JMAPFILTER_PASSWORD`: login (required)
//! - `JMAPFILTER_RECIPIENT`: address to match (required)
//! - `JMAPFILTER_DISCOVERY_URL`: discovery URL (optional)
//! - `JMAPFILTER_LIMIT`: inbox messages to inspect (optional)
//! - `JMAPFILTER_ACTIONS`: comma-separated actions out of `seen`, `unseen`,
//!   `flag`, `unflag`, `trash` (default `seen,flag,trash`)

mod rules;

use anyhow::{Context, Result};
use jmapfilter::{Config, Credentials, JmapClient, set_responses};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rules::Rule;

fn env(name: &str) -> Result<String> {
    std::env::var(name).with_context(|| format!("{name} is not set"))
}

fn config_from_env() -> Result<Config> {
    let mut builder = Config::builder();
    if let Ok(url) = std::env::var("JMAPFILTER_DISCOVERY_URL") {
        builder = builder
            .discovery_url(&url)
            .context("invalid JMAPFILTER_DISCOVERY_URL")?;
    }
    if let Ok(limit) = std::env::var("JMAPFILTER_LIMIT") {
        builder = builder.message_limit(limit.parse().context("invalid JMAPFILTER_LIMIT")?);
    }
    Ok(builder.build()?)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "jmapfilter=info,jmapfilter_cli=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let credentials = Credentials::new(env("JMAPFILTER_USERNAME")?, env("JMAPFILTER_PASSWORD")?);
    let recipient = env("JMAPFILTER_RECIPIENT")?;
    let rule = match std::env::var("JMAPFILTER_ACTIONS") {
        Ok(actions) => Rule::new(recipient, rules::parse_actions(&actions)?),
        Err(_) => Rule::read_flag_and_trash(recipient),
    };
    let config = config_from_env()?;

    let client = JmapClient::connect(config, credentials)
        .await
        .context("failed to open JMAP session")?;

    let matched = rule.apply(&client)?;
    info!(matched, queued = client.pending_len(), "Filter applied");

    let responses = client.flush().await.context("failed to submit changes")?;
    let mut updated = 0;
    let mut rejected = 0;
    for set in set_responses(&responses)? {
        updated += set.updated.len();
        rejected += set.not_updated.len();
    }
    info!(updated, rejected, "Done");

    Ok(())
}
