//! Gemhall server entry point.
//!
//! Configuration comes from the environment:
//!
//! - `GEMHALL_ADDR`: listen address (default `0.0.0.0:8080`)
//! - `GEMHALL_SWEEP_MS`: turn-timeout sweep interval in milliseconds
//!   (default 1000)
//! - `GEMHALL_IDLE_TIMEOUT_SECS`: seconds a connection that answers no
//!   heartbeat ping is kept (default 60)
//! - `RUST_LOG`: log filter (default `info`)

use std::str::FromStr;
use std::time::Duration;

use gemhall::prelude::*;

const DEFAULT_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_SWEEP_MS: u64 = 1000;

#[tokio::main]
async fn main() -> Result<(), GemhallError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let addr = std::env::var("GEMHALL_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_string());
    let sweep = Duration::from_millis(env_or("GEMHALL_SWEEP_MS", DEFAULT_SWEEP_MS));
    let idle = Duration::from_secs(env_or(
        "GEMHALL_IDLE_TIMEOUT_SECS",
        gemhall::DEFAULT_IDLE_TIMEOUT.as_secs(),
    ));

    tracing::info!(%addr, sweep_ms = sweep.as_millis() as u64, idle_secs = idle.as_secs(), "starting gemhall");

    let server = GemhallServer::builder()
        .bind(&addr)
        .sweep_interval(sweep)
        .idle_timeout(idle)
        .build()
        .await?;
    server.run().await
}

/// Reads and parses an environment variable, falling back to `default`
/// when it is unset or malformed.
fn env_or<T: FromStr + Copy + std::fmt::Display>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, %default, "ignoring malformed setting");
            default
        }),
        Err(_) => default,
    }
}
