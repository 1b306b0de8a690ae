//! Reorder policy: safety stock, reorder point and stock status per item.
//!
//! All derived quantities are floored, and urgency checks use strict `<`,
//! so equality with a threshold falls to the less urgent status.

use serde::{Deserialize, Serialize, Serializer};

use stockwise_core::InventoryId;

use crate::features::FeatureRow;

/// Restock classification, from most to least urgent.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StockStatus {
    UrgentRestock,
    Reorder,
    Ok,
}

impl StockStatus {
    pub const ALL: [StockStatus; 3] = [StockStatus::UrgentRestock, StockStatus::Reorder, StockStatus::Ok];

    pub fn as_str(&self) -> &'static str {
        match self {
            StockStatus::UrgentRestock => "URGENT_RESTOCK",
            StockStatus::Reorder => "REORDER",
            StockStatus::Ok => "OK",
        }
    }
}

impl core::fmt::Display for StockStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Total classification over `(current_stock, safety_stock, reorder_point)`.
pub fn classify(current_stock: f64, safety_stock: i64, reorder_point: i64) -> StockStatus {
    if current_stock < safety_stock as f64 {
        StockStatus::UrgentRestock
    } else if current_stock < reorder_point as f64 {
        StockStatus::Reorder
    } else {
        StockStatus::Ok
    }
}

/// Derived thresholds and status for one item.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ReorderDecision {
    pub predicted_demand: i64,
    pub safety_stock: i64,
    pub reorder_point: i64,
    pub status: StockStatus,
}

impl ReorderDecision {
    /// Human-readable action; the order quantity tops stock up to the reorder point.
    pub fn action(&self, current_stock: f64) -> String {
        let quantity = self.reorder_point as f64 - current_stock;
        match self.status {
            StockStatus::UrgentRestock => format!("Order {quantity:.0} units immediately"),
            StockStatus::Reorder => format!("Plan to order {quantity:.0} units"),
            StockStatus::Ok => "No action needed".to_string(),
        }
    }
}

/// Safety-stock policy.
///
/// Lead time is taken as given: zero or negative values are not rejected
/// and simply produce zero-or-negative thresholds.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ReorderPolicy {
    /// Share of lead-time demand held as safety stock.
    safety_factor: f64,
}

impl Default for ReorderPolicy {
    fn default() -> Self {
        Self { safety_factor: 0.2 }
    }
}

impl ReorderPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_safety_factor(mut self, safety_factor: f64) -> Self {
        self.safety_factor = safety_factor;
        self
    }

    pub fn safety_factor(&self) -> f64 {
        self.safety_factor
    }

    pub fn decide(&self, current_stock: f64, raw_prediction: f64, lead_time: f64) -> ReorderDecision {
        let predicted_demand = raw_prediction.floor() as i64;
        let demand = predicted_demand as f64;
        let safety_stock = (demand * lead_time * self.safety_factor).floor() as i64;
        let reorder_point = (demand * lead_time + safety_stock as f64).floor() as i64;

        ReorderDecision {
            predicted_demand,
            safety_stock,
            reorder_point,
            status: classify(current_stock, safety_stock, reorder_point),
        }
    }

    pub fn recommend(&self, row: &FeatureRow, raw_prediction: f64) -> Recommendation {
        let decision = self.decide(row.current_stock, raw_prediction, row.lead_time);
        Recommendation {
            inventory_id: row.inventory_id.clone(),
            description: row.description.clone(),
            current_stock: row.current_stock,
            predicted_demand: decision.predicted_demand,
            safety_stock: decision.safety_stock,
            reorder_point: decision.reorder_point,
            status: decision.status,
            action: decision.action(row.current_stock),
        }
    }
}

/// Final per-item output row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(rename = "InventoryId")]
    pub inventory_id: InventoryId,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Current_Stock", serialize_with = "serialize_quantity")]
    pub current_stock: f64,
    #[serde(rename = "Predicted_Demand")]
    pub predicted_demand: i64,
    #[serde(rename = "Safety_Stock")]
    pub safety_stock: i64,
    #[serde(rename = "Reorder_Point")]
    pub reorder_point: i64,
    #[serde(rename = "Status")]
    pub status: StockStatus,
    #[serde(rename = "Action")]
    pub action: String,
}

/// Whole quantities are written as integers.
fn serialize_quantity<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.fract() == 0.0 && value.abs() < 9.0e15 {
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}

/// Number of recommendations per status, in [`StockStatus::ALL`] order.
pub fn status_counts(recommendations: &[Recommendation]) -> [(StockStatus, usize); 3] {
    StockStatus::ALL.map(|status| {
        let n = recommendations.iter().filter(|r| r.status == status).count();
        (status, n)
    })
}
