//! Demo: collect several latency-bound probes with a concurrency ceiling
//!
//! Run with:
//!   cargo run -p fanout-executor --example fanout_demo
//!
//! Configure via environment variables:
//! - FANOUT_MAX_CONCURRENT: Ceiling (default here: 2)
//! - RUST_LOG: Log filter (default: "fanout_executor=debug")
//!
//! Delivery order and failure policy are set per run below, so
//! FANOUT_PRESERVE_ORDER and FANOUT_FAST_FAIL only need to parse.

use std::time::Duration;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use fanout_executor::prelude::*;
use fanout_timing::{at_most, delayed};

fn probes() -> Vec<BoxTask<String, String>> {
    let probe = |name: &'static str, ms: u64, ok: bool| {
        boxed(move || async move {
            let name = delayed(name, Duration::from_millis(ms)).await;
            if ok {
                Ok(format!("{name}: ok after {ms}ms"))
            } else {
                Err(format!("{name}: unavailable"))
            }
        })
    };

    vec![
        probe("canvas", 300, true),
        probe("audio", 100, true),
        probe("webgl", 200, false),
        probe("fonts", 50, true),
    ]
}

fn print_settled(label: &str, settled: &[Settled<String, String>]) {
    println!("{label}:");
    for entry in settled {
        match &entry.outcome {
            Outcome::Fulfilled(value) => println!("  [{}] {}", entry.index, value),
            Outcome::Rejected(reason) => println!("  [{}] rejected: {}", entry.index, reason),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("fanout_executor=debug")),
        )
        .init();

    let mut base = ExecutorConfig::from_env().context("Failed to load executor config")?;
    if base.max_concurrent.is_none() {
        base = base.with_max_concurrent(2);
    }

    tracing::info!(?base, "Starting fanout demo");

    let ordered = base.with_preserve_order(true).with_fast_fail(false);
    let settled = at_most(concurrent(probes(), ordered), Duration::from_secs(5))
        .await
        .context("Ordered run timed out")??;
    print_settled("Submission order", &settled);

    let completion = base.with_preserve_order(false).with_fast_fail(false);
    let settled = at_most(concurrent(probes(), completion), Duration::from_secs(5))
        .await
        .context("Completion-order run timed out")??;
    print_settled("Completion order", &settled);

    match BoundedExecutor::new(base.with_fast_fail(true))
        .try_run(probes())
        .await
    {
        Ok(values) => println!("Fast-fail run succeeded with {} values", values.len()),
        Err(err) => println!("Fast-fail run stopped: {err}"),
    }

    Ok(())
}
