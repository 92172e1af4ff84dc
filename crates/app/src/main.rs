use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;

use stockwatch_core::SystemClock;
use stockwatch_notifications::DeriverConfig;

fn main() -> anyhow::Result<()> {
    stockwatch_observability::init();

    let path = std::env::args_os().nth(1).map(PathBuf::from);
    let items = stockwatch_app::read_inventory(path.as_deref())?;
    let feed = stockwatch_app::derive(items, DeriverConfig::from_env(), Arc::new(SystemClock))?;

    tracing::info!(notifications = feed.len(), "feed derived");

    let out = serde_json::to_string_pretty(&*feed).context("failed to serialize feed")?;
    println!("{out}");
    Ok(())
}
