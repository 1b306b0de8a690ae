//! CSV loaders for the item master and sales history tables.
//!
//! Both tables are read with a header row and trimmed cells. Required columns
//! are resolved by name; their absence aborts the load.

use std::io::Read;
use std::path::Path;

use csv::StringRecord;

use stockwise_core::{DomainError, DomainResult, InventoryId};

use crate::item::{columns as item_cols, InventoryItem, ItemMaster};
use crate::sales::{columns as sales_cols, parse_sales_date, SalesTransaction};

/// Table name used in error messages for the item master ("final_data" upload).
pub const ITEM_MASTER_TABLE: &str = "final_data";
/// Table name used in error messages for the sales history ("sales_data" upload).
pub const SALES_TABLE: &str = "sales_data";

struct Table {
    name: &'static str,
    headers: StringRecord,
    records: Vec<StringRecord>,
}

impl Table {
    fn read<R: Read>(name: &'static str, reader: R) -> DomainResult<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = csv_reader
            .headers()
            .map_err(|e| DomainError::malformed(format!("{name}: {e}")))?
            .clone();

        let mut records = Vec::new();
        for result in csv_reader.records() {
            let record = result.map_err(|e| DomainError::malformed(format!("{name}: {e}")))?;
            records.push(record);
        }

        Ok(Self {
            name,
            headers,
            records,
        })
    }

    fn column(&self, column: &str) -> DomainResult<usize> {
        self.headers
            .iter()
            .position(|h| h == column)
            .ok_or_else(|| DomainError::missing_column(self.name, column))
    }

    fn number(&self, record: &StringRecord, idx: usize) -> DomainResult<Option<f64>> {
        let cell = record.get(idx).unwrap_or("");
        if cell.is_empty() {
            return Ok(None);
        }
        cell.parse::<f64>()
            .map(Some)
            .map_err(|_| DomainError::InvalidNumber {
                table: self.name.to_string(),
                line: line_of(record),
                column: self.headers.get(idx).unwrap_or_default().to_string(),
                value: cell.to_string(),
            })
    }

    /// A column is numeric when every non-empty cell parses as a number.
    fn is_numeric(&self, idx: usize) -> bool {
        self.records.iter().all(|r| {
            let cell = r.get(idx).unwrap_or("");
            cell.is_empty() || cell.parse::<f64>().is_ok()
        })
    }
}

fn line_of(record: &StringRecord) -> u64 {
    record.position().map(|p| p.line()).unwrap_or(0)
}

/// Load the item master table from a CSV reader.
///
/// Entirely blank rows are skipped. A row with data but no identifier is an
/// error: it cannot be reported against any item.
pub fn load_item_master<R: Read>(reader: R) -> DomainResult<ItemMaster> {
    let table = Table::read(ITEM_MASTER_TABLE, reader)?;

    let id_idx = table.column(item_cols::INVENTORY_ID)?;
    let desc_idx = table.column(item_cols::DESCRIPTION)?;
    let on_hand_idx = table.column(item_cols::ON_HAND)?;
    let avg_price_idx = table.column(item_cols::AVG_PRICE)?;
    let purchase_idx = table.column(item_cols::PURCHASE_PRICE)?;
    let lead_time_idx = table.column(item_cols::LEAD_TIME)?;
    let required = [
        id_idx,
        desc_idx,
        on_hand_idx,
        avg_price_idx,
        purchase_idx,
        lead_time_idx,
    ];

    let mut attribute_columns = Vec::new();
    let mut attribute_idx = Vec::new();
    for (idx, header) in table.headers.iter().enumerate() {
        if required.contains(&idx) {
            continue;
        }
        if table.is_numeric(idx) {
            attribute_columns.push(header.to_string());
            attribute_idx.push(idx);
        } else {
            tracing::debug!(column = header, "item master column is not numeric; ignored");
        }
    }

    let mut items = Vec::with_capacity(table.records.len());
    let mut blank = 0usize;
    for record in &table.records {
        if record.iter().all(str::is_empty) {
            blank += 1;
            continue;
        }

        let inventory_id = record
            .get(id_idx)
            .unwrap_or("")
            .parse::<InventoryId>()
            .map_err(|_| {
                DomainError::validation(format!(
                    "{}: line {}: empty {}",
                    ITEM_MASTER_TABLE,
                    line_of(record),
                    item_cols::INVENTORY_ID
                ))
            })?;

        let attributes = attribute_idx
            .iter()
            .map(|&idx| table.number(record, idx))
            .collect::<DomainResult<Vec<_>>>()?;

        items.push(InventoryItem {
            inventory_id,
            description: record.get(desc_idx).unwrap_or("").to_string(),
            on_hand: table.number(record, on_hand_idx)?,
            avg_price: table.number(record, avg_price_idx)?,
            purchase_price: table.number(record, purchase_idx)?,
            lead_time: table.number(record, lead_time_idx)?,
            attributes,
        });
    }

    if blank > 0 {
        tracing::warn!(blank, "blank item master rows were skipped");
    }
    tracing::debug!(
        items = items.len(),
        attributes = attribute_columns.len(),
        "loaded item master"
    );
    ItemMaster::new(attribute_columns, items)
}

/// Load the sales history table from a CSV reader.
///
/// Rows without an identifier cannot be joined and are skipped.
pub fn load_sales<R: Read>(reader: R) -> DomainResult<Vec<SalesTransaction>> {
    let table = Table::read(SALES_TABLE, reader)?;

    let id_idx = table.column(sales_cols::INVENTORY_ID)?;
    let date_idx = table.column(sales_cols::SALES_DATE)?;
    let qty_idx = table.column(sales_cols::SALES_QUANTITY)?;
    let price_idx = table.column(sales_cols::SALES_PRICE)?;
    let dollars_idx = table.column(sales_cols::SALES_DOLLARS)?;

    let mut transactions = Vec::with_capacity(table.records.len());
    let mut skipped = 0usize;

    for record in &table.records {
        let date_cell = record.get(date_idx).unwrap_or("");
        let sales_date = if date_cell.is_empty() {
            None
        } else {
            Some(
                parse_sales_date(date_cell).ok_or_else(|| DomainError::InvalidDate {
                    table: SALES_TABLE.to_string(),
                    line: line_of(record),
                    value: date_cell.to_string(),
                })?,
            )
        };

        let Ok(inventory_id) = record.get(id_idx).unwrap_or("").parse::<InventoryId>() else {
            skipped += 1;
            continue;
        };

        transactions.push(SalesTransaction {
            inventory_id,
            sales_date,
            quantity: table.number(record, qty_idx)?,
            price: table.number(record, price_idx)?,
            dollars: table.number(record, dollars_idx)?,
        });
    }

    if skipped > 0 {
        tracing::warn!(skipped, "sales rows without {} were skipped", sales_cols::INVENTORY_ID);
    }
    tracing::debug!(transactions = transactions.len(), "loaded sales history");
    Ok(transactions)
}

/// Load the item master table from a CSV file path.
pub fn load_item_master_file(path: impl AsRef<Path>) -> DomainResult<ItemMaster> {
    load_item_master(open(path.as_ref())?)
}

/// Load the sales history table from a CSV file path.
pub fn load_sales_file(path: impl AsRef<Path>) -> DomainResult<Vec<SalesTransaction>> {
    load_sales(open(path.as_ref())?)
}

fn open(path: &Path) -> DomainResult<std::fs::File> {
    std::fs::File::open(path)
        .map_err(|e| DomainError::malformed(format!("failed to open '{}': {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const MASTER: &str = "\
InventoryId,Description,onHand_end,AvgPrice,PurchasePrice,LeadTime,Quantity,Brand
A1,Premium Vodka,50,20.0,12.0,5,750,Acme
B2,Scotch Whisky,5,,30.0,3,,Glen
";

    const SALES: &str = "\
InventoryId,SalesDate,SalesQuantity,SalesPrice,SalesDollars,Store
A1,2024-01-01,8,19.5,156,1
A1,2024-01-02,10,20.0,200,1
,2024-01-02,3,20.0,60,1
A1,01/03/2024,12,20.5,246,2
";

    #[test]
    fn item_master_keeps_numeric_extras_only() {
        let master = load_item_master(MASTER.as_bytes()).unwrap();
        assert_eq!(master.attribute_columns(), ["Quantity".to_string()]);
        assert_eq!(master.len(), 2);

        let a1 = &master.items()[0];
        assert_eq!(a1.inventory_id.as_str(), "A1");
        assert_eq!(a1.description, "Premium Vodka");
        assert_eq!(a1.on_hand, Some(50.0));
        assert_eq!(a1.lead_time, Some(5.0));
        assert_eq!(a1.attributes, vec![Some(750.0)]);

        let b2 = &master.items()[1];
        assert_eq!(b2.avg_price, None);
        assert_eq!(b2.attributes, vec![None]);
    }

    #[test]
    fn item_master_requires_identifier_column() {
        let csv = "Id,Description,onHand_end,AvgPrice,PurchasePrice,LeadTime\nA1,x,1,1,1,1\n";
        let err = load_item_master(csv.as_bytes()).unwrap_err();
        assert_eq!(
            err,
            DomainError::missing_column(ITEM_MASTER_TABLE, item_cols::INVENTORY_ID)
        );
    }

    #[test]
    fn non_numeric_required_value_is_rejected() {
        let csv = "InventoryId,Description,onHand_end,AvgPrice,PurchasePrice,LeadTime\nA1,x,lots,1,1,1\n";
        let err = load_item_master(csv.as_bytes()).unwrap_err();
        match err {
            DomainError::InvalidNumber { line, column, value, .. } => {
                assert_eq!(line, 2);
                assert_eq!(column, "onHand_end");
                assert_eq!(value, "lots");
            }
            other => panic!("expected InvalidNumber, got {other:?}"),
        }
    }

    #[test]
    fn blank_master_rows_are_skipped() {
        let csv = format!("{MASTER},,,,,,,\n , , ,,,,,\n");
        let master = load_item_master(csv.as_bytes()).unwrap();
        assert_eq!(master.len(), 2);
        assert_eq!(master.attribute_columns(), ["Quantity".to_string()]);
    }

    #[test]
    fn master_row_without_identifier_is_rejected() {
        let csv = format!("{MASTER},Orphan,3,1,1,1,,\n");
        let err = load_item_master(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, DomainError::Validation(msg) if msg.contains("line 4")));
    }

    #[test]
    fn empty_sales_date_is_tolerated() {
        let csv = "InventoryId,SalesDate,SalesQuantity,SalesPrice,SalesDollars\nA1,,4,2,8\nA1,2024-01-01,1,2,2\n";
        let sales = load_sales(csv.as_bytes()).unwrap();
        assert_eq!(sales.len(), 2);
        assert_eq!(sales[0].sales_date, None);
        assert_eq!(sales[0].quantity, Some(4.0));
        assert!(sales[1].sales_date.is_some());
    }

    #[test]
    fn sales_rows_without_identifier_are_skipped() {
        let sales = load_sales(SALES.as_bytes()).unwrap();
        assert_eq!(sales.len(), 3);
        assert!(sales.iter().all(|t| t.inventory_id.as_str() == "A1"));
        assert_eq!(sales[2].quantity, Some(12.0));
        assert!(sales[2].sales_date.is_some());
    }

    #[test]
    fn malformed_sales_date_aborts() {
        let csv = "InventoryId,SalesDate,SalesQuantity,SalesPrice,SalesDollars\nA1,not-a-date,1,1,1\n";
        let err = load_sales(csv.as_bytes()).unwrap_err();
        assert_eq!(
            err,
            DomainError::InvalidDate {
                table: SALES_TABLE.to_string(),
                line: 2,
                value: "not-a-date".to_string(),
            }
        );
    }

    #[test]
    fn sales_requires_quantity_column() {
        let csv = "InventoryId,SalesDate,SalesPrice,SalesDollars\nA1,2024-01-01,1,1\n";
        let err = load_sales(csv.as_bytes()).unwrap_err();
        assert_eq!(
            err,
            DomainError::missing_column(SALES_TABLE, sales_cols::SALES_QUANTITY)
        );
    }
}
