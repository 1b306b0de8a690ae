//! `stockwise-core`: shared building blocks for the restock analysis pipeline.
//!
//! This crate contains identifiers and the input error model only (no IO).

pub mod error;
pub mod id;

pub use error::{DomainError, DomainResult};
pub use id::{InventoryId, RunId};
