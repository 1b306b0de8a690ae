//! Inventory input model.
//!
//! Item master rows and sales transactions as read from the two uploaded
//! tables, plus the CSV loaders that produce them. Read-only after loading.

pub mod item;
pub mod loader;
pub mod sales;

pub use item::{InventoryItem, ItemMaster};
pub use loader::{
    load_item_master, load_item_master_file, load_sales, load_sales_file, ITEM_MASTER_TABLE,
    SALES_TABLE,
};
pub use sales::{parse_sales_date, SalesTransaction};
