//! # Bridge Runtime
//!
//! Runs one demo session through the callback bridge: a handful of
//! asynchronous calls whose results arrive as dispatched envelopes, plus
//! synchronous reads answered inline.
//!
//! Configure with `BRIDGE_*` environment variables (see `config`) and
//! `RUST_LOG` for log filtering.

use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use bridge_runtime::{load_config, BridgeHost};

const SESSION_CALLS: &[(&str, &str)] = &[
    ("initSession", r#"{"isReferrable":true}"#),
    ("setIdentity", r#"{"userId":"demo-user"}"#),
    ("fetchRewards", r#"{"bucket":"default"}"#),
    ("getCreditHistory", "{}"),
    ("getShortUrl", r#"{"channel":"sms","feature":"share"}"#),
];

const SESSION_READS: &[(&str, &str)] = &[("getCredits", ""), ("getCreditsForBucket", "default")];

const SESSION_TIMEOUT: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .with_thread_ids(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Load configuration
    let config = load_config();

    let mut host = BridgeHost::from_config(&config).context("Failed to build bridge host")?;

    let report = host
        .run_session(SESSION_CALLS, SESSION_READS, SESSION_TIMEOUT)
        .await
        .context("Session did not complete")?;

    for message in &report.dispatched {
        info!(
            target_object = %message.target,
            method = %message.method,
            "Result: {}",
            message.message
        );
    }
    for (operation, value) in &report.reads {
        match value {
            Ok(value) => info!(operation = %operation, "Read: {:?}", value),
            Err(e) => warn!(operation = %operation, "Read failed: {}", e),
        }
    }

    info!(
        registered = report.stats.registered,
        delivered = report.stats.delivered,
        unknown = report.stats.unknown_deliveries,
        "Session complete"
    );

    let discarded = host.shutdown();
    if discarded > 0 {
        warn!(discarded, "Pending calls discarded at shutdown");
    }

    Ok(())
}
