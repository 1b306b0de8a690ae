use axum::{routing::post, Router};

pub mod system;
pub mod upload;

/// Router for the analysis endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/upload", post(upload::upload))
        .route("/upload/", post(upload::upload))
}
