use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartError, Extension, Multipart},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use stockwise_inventory::{ITEM_MASTER_TABLE, SALES_TABLE};

use crate::app::errors;
use crate::app::services::{AnalysisService, UploadedFile};

/// `POST /upload/`: multipart with `final_data` (item master) and `sales_data`.
///
/// Responds with the recommendation records of the run, in item master order.
pub async fn upload(
    Extension(service): Extension<Arc<AnalysisService>>,
    mut multipart: Multipart,
) -> axum::response::Response {
    let mut item_master: Option<UploadedFile> = None;
    let mut sales: Option<UploadedFile> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => return multipart_error(e),
        };

        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let bytes = match field.bytes().await {
            Ok(b) => b.to_vec(),
            Err(e) => return multipart_error(e),
        };
        let file = UploadedFile { file_name, bytes };

        match name.as_str() {
            ITEM_MASTER_TABLE => item_master = Some(file),
            SALES_TABLE => sales = Some(file),
            other => tracing::debug!(field = other, "ignoring unexpected upload field"),
        }
    }

    let (Some(item_master), Some(sales)) = (item_master, sales) else {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "invalid_upload",
            format!("both `{ITEM_MASTER_TABLE}` and `{SALES_TABLE}` files are required"),
        );
    };

    match tokio::task::spawn_blocking(move || service.analyze_upload(item_master, sales)).await {
        Ok(Ok(run)) => {
            tracing::info!(run_id = %run.run_id, items = run.recommendations.len(), "upload analyzed");
            (StatusCode::OK, Json(run.recommendations)).into_response()
        }
        Ok(Err(e)) => errors::analysis_error_to_response(e),
        Err(e) => errors::json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", e.to_string()),
    }
}

/// Keeps the status axum assigns (413 for an oversized body, 400 otherwise).
fn multipart_error(e: MultipartError) -> axum::response::Response {
    errors::json_error(e.status(), "invalid_upload", e.body_text())
}
