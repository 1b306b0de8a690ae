//! HTTP upload boundary: accepts the two input tables, runs the analysis,
//! returns recommendation records.

pub mod app;
pub mod config;

pub use config::ApiConfig;
