//! `stockwatch` demo collaborator: JSON inventory in, notification feed out.

use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use stockwatch_core::Clock;
use stockwatch_inventory::{InMemoryInventory, InventoryItemView};
use stockwatch_notifications::{DeriverConfig, Feed, NotificationDeriver};

/// Read inventory JSON from `path`, or stdin when `path` is `None` or `-`.
pub fn read_inventory(path: Option<&Path>) -> Result<Vec<InventoryItemView>> {
    let raw = match path {
        Some(p) if p != Path::new("-") => std::fs::read_to_string(p)
            .with_context(|| format!("failed to read inventory file {}", p.display()))?,
        _ => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read inventory from stdin")?;
            buf
        }
    };

    parse_inventory(&raw)
}

pub fn parse_inventory(raw: &str) -> Result<Vec<InventoryItemView>> {
    serde_json::from_str(raw).context("inventory must be a JSON array of items")
}

/// Load `items` into an in-memory store and derive the current feed.
pub fn derive(items: Vec<InventoryItemView>, config: DeriverConfig, clock: Arc<dyn Clock>) -> Result<Feed> {
    let inventory = Arc::new(InMemoryInventory::with_clock(Arc::clone(&clock)));
    for item in items {
        let id = item.id;
        inventory
            .upsert(item)
            .with_context(|| format!("invalid inventory item {id}"))?;
    }
    info!(items = inventory.len(), "inventory loaded");

    let deriver = NotificationDeriver::with_clock(inventory, config, clock);
    let feed = deriver.feed();
    Ok(feed.snapshot())
}
