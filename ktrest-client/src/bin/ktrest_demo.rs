//! # REST Client Demo
//!
//! Runs the canonical sample session against a live server:
//! store `japan => tokyo` for a minute, read it back, remove it.
//!
//! Usage: `ktrest-demo [host] [port]`. Set `RUST_LOG=debug` to see requests.

use std::env;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use ktrest_client::{ClientConfig, KtClient};

fn config_from_args() -> ClientConfig {
    let mut config = ClientConfig::default();
    let mut args = env::args().skip(1);
    if let Some(host) = args.next() {
        config.host = host;
    }
    if let Some(port) = args.next().and_then(|raw| raw.parse().ok()) {
        config.port = port;
    }
    config
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let client = KtClient::with_config(config_from_args()).context("open client")?;
    let target = format!("{}:{}", client.config().host, client.config().port);
    info!(%target, "opened client");

    let stored = client
        .set("japan", "tokyo", Some(Duration::from_secs(60)))
        .with_context(|| format!("set on {}", target))?;
    info!(stored, "set japan");

    match client.get("japan").context("get")? {
        Some(value) => info!(value = %String::from_utf8_lossy(&value), "get japan"),
        None => info!("get japan: no value"),
    }

    let removed = client.remove("japan").context("remove")?;
    info!(removed, "remove japan");

    client.close();
    Ok(())
}
