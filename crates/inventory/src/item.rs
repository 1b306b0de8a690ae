use serde::{Deserialize, Serialize};

use stockwise_core::{DomainError, DomainResult, InventoryId};

/// Column names of the item master table.
pub mod columns {
    pub const INVENTORY_ID: &str = "InventoryId";
    pub const DESCRIPTION: &str = "Description";
    pub const ON_HAND: &str = "onHand_end";
    pub const AVG_PRICE: &str = "AvgPrice";
    pub const PURCHASE_PRICE: &str = "PurchasePrice";
    pub const LEAD_TIME: &str = "LeadTime";
}

/// One row of the item master table.
///
/// Numeric fields are `None` when the cell was empty; the feature builder
/// treats missing values as 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub inventory_id: InventoryId,
    pub description: String,
    pub on_hand: Option<f64>,
    pub avg_price: Option<f64>,
    pub purchase_price: Option<f64>,
    pub lead_time: Option<f64>,
    /// Extra numeric columns, aligned with [`ItemMaster::attribute_columns`].
    pub attributes: Vec<Option<f64>>,
}

impl InventoryItem {
    /// Item with only the required fields set and no extra attributes.
    pub fn new(inventory_id: InventoryId, description: impl Into<String>) -> Self {
        Self {
            inventory_id,
            description: description.into(),
            on_hand: None,
            avg_price: None,
            purchase_price: None,
            lead_time: None,
            attributes: Vec::new(),
        }
    }

    pub fn with_on_hand(mut self, on_hand: f64) -> Self {
        self.on_hand = Some(on_hand);
        self
    }

    pub fn with_prices(mut self, avg_price: f64, purchase_price: f64) -> Self {
        self.avg_price = Some(avg_price);
        self.purchase_price = Some(purchase_price);
        self
    }

    pub fn with_lead_time(mut self, lead_time: f64) -> Self {
        self.lead_time = Some(lead_time);
        self
    }
}

/// The item master table: one row per distinct item, in file order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemMaster {
    attribute_columns: Vec<String>,
    items: Vec<InventoryItem>,
}

impl ItemMaster {
    /// Build a master table, enforcing unique identifiers and aligned attributes.
    pub fn new(attribute_columns: Vec<String>, items: Vec<InventoryItem>) -> DomainResult<Self> {
        let mut seen = std::collections::HashSet::with_capacity(items.len());
        for item in &items {
            if !seen.insert(&item.inventory_id) {
                return Err(DomainError::DuplicateId(item.inventory_id.to_string()));
            }
            if item.attributes.len() != attribute_columns.len() {
                return Err(DomainError::validation(format!(
                    "item {} has {} attribute value(s), expected {}",
                    item.inventory_id,
                    item.attributes.len(),
                    attribute_columns.len()
                )));
            }
        }
        Ok(Self {
            attribute_columns,
            items,
        })
    }

    /// Master table without extra attribute columns.
    pub fn from_items(items: Vec<InventoryItem>) -> DomainResult<Self> {
        Self::new(Vec::new(), items)
    }

    pub fn attribute_columns(&self) -> &[String] {
        &self.attribute_columns
    }

    pub fn items(&self) -> &[InventoryItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
