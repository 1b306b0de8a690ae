//! `stockwise-ai`
//!
//! **Responsibility:** the analysis core.
//!
//! - [`features`]: per-item sales aggregates and guarded ratios.
//! - [`predictor`]: the demand forecasting capability and its JSON artifacts.
//! - [`reorder`]: safety stock, reorder point and restock status.
//! - [`job`]: the three stages wired into one run.
//!
//! Every stage is a pure transformation; nothing is kept between runs.

pub mod error;
pub mod features;
pub mod job;
pub mod model;
pub mod predictor;
pub mod reorder;

pub use error::AiError;
pub use features::{build_features, FeatureRow, FeatureTable, SalesAggregate};
pub use job::{AiJob, AnalysisInput, InventoryAnalysisJob};
pub use model::DemandModel;
pub use predictor::{DemandPredictor, ModelArtifacts, ModelInfo, StandardScaler};
pub use reorder::{status_counts, Recommendation, ReorderPolicy, StockStatus};
