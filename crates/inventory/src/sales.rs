use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use stockwise_core::InventoryId;

/// Column names of the sales history table.
pub mod columns {
    pub const INVENTORY_ID: &str = "InventoryId";
    pub const SALES_DATE: &str = "SalesDate";
    pub const SALES_QUANTITY: &str = "SalesQuantity";
    pub const SALES_PRICE: &str = "SalesPrice";
    pub const SALES_DOLLARS: &str = "SalesDollars";
}

/// One sale event. Missing numeric cells stay `None` and are skipped by aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesTransaction {
    pub inventory_id: InventoryId,
    pub sales_date: Option<NaiveDateTime>,
    pub quantity: Option<f64>,
    pub price: Option<f64>,
    pub dollars: Option<f64>,
}

impl SalesTransaction {
    pub fn new(inventory_id: InventoryId, quantity: f64, price: f64) -> Self {
        Self {
            inventory_id,
            sales_date: None,
            quantity: Some(quantity),
            price: Some(price),
            dollars: Some(quantity * price),
        }
    }
}

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%m/%d/%Y %H:%M"];
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

/// Parse a sales date cell. Returns `None` when no accepted format matches.
pub fn parse_sales_date(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(dt);
        }
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_iso_and_us_dates() {
        let iso = parse_sales_date("2024-01-15").unwrap();
        let us = parse_sales_date("01/15/2024").unwrap();
        assert_eq!(iso, us);

        let with_time = parse_sales_date("2024-01-15 13:45:00").unwrap();
        assert_eq!(with_time.date(), iso.date());
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_sales_date("yesterday").is_none());
        assert!(parse_sales_date("2024-13-40").is_none());
    }
}
