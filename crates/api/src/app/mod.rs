//! HTTP application wiring (Axum router + service wiring).
//!
//! - `services.rs`: the analysis pipeline behind the upload endpoint
//! - `routes/`: HTTP routes + handlers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use anyhow::Context;
use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};

use crate::config::ApiConfig;

pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
///
/// Loads the model artifacts once; a missing or inconsistent model fails startup.
pub fn build_app(config: &ApiConfig) -> anyhow::Result<Router> {
    let service = services::AnalysisService::load(config)
        .with_context(|| format!("loading model from {}", config.model_dir.display()))?;
    router(Arc::new(service), config)
}

/// Router around an already-constructed analysis service.
pub fn router(service: Arc<services::AnalysisService>, config: &ApiConfig) -> anyhow::Result<Router> {
    let origin: HeaderValue = config
        .allowed_origin
        .parse()
        .with_context(|| format!("invalid allowed origin `{}`", config.allowed_origin))?;

    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(Any)
        .allow_headers(Any);

    Ok(Router::new()
        .route("/health", get(routes::system::health))
        .merge(routes::router())
        .layer(Extension(service))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(ServiceBuilder::new().layer(cors)))
}
