use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockwatch_core::{DomainError, ItemId};

/// Read-only view of an inventory item.
///
/// Owned and mutated exclusively by the storage collaborator; everything
/// downstream receives clones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItemView {
    pub id: ItemId,
    pub name: String,
    pub quantity: u32,
    #[serde(default)]
    pub min_stock_level: u32,
    #[serde(default)]
    pub expiration_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub warranty_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub category: Option<String>,
    /// Unit price in cents.
    #[serde(default)]
    pub price: Option<u64>,
}

impl InventoryItemView {
    pub fn new(id: ItemId, name: impl Into<String>, quantity: u32) -> Self {
        Self {
            id,
            name: name.into(),
            quantity,
            min_stock_level: 0,
            expiration_date: None,
            warranty_date: None,
            category: None,
            price: None,
        }
    }

    pub fn with_min_stock_level(mut self, min_stock_level: u32) -> Self {
        self.min_stock_level = min_stock_level;
        self
    }

    pub fn with_expiration_date(mut self, at: DateTime<Utc>) -> Self {
        self.expiration_date = Some(at);
        self
    }

    pub fn with_warranty_date(mut self, at: DateTime<Utc>) -> Self {
        self.warranty_date = Some(at);
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_price(mut self, cents: u64) -> Self {
        self.price = Some(cents);
        self
    }

    /// Quantity at or below the configured minimum.
    pub fn is_low_stock(&self) -> bool {
        self.quantity <= self.min_stock_level
    }

    /// Expiration date is set and falls on or before `cutoff`.
    pub fn expires_by(&self, cutoff: DateTime<Utc>) -> bool {
        self.expiration_date.is_some_and(|d| d <= cutoff)
    }

    /// Warranty date is set and falls on or before `cutoff`.
    pub fn warranty_ends_by(&self, cutoff: DateTime<Utc>) -> bool {
        self.warranty_date.is_some_and(|d| d <= cutoff)
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        Ok(())
    }
}
