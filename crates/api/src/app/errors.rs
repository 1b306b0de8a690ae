use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use stockwise_ai::AiError;

use crate::app::services::AnalysisError;

pub fn analysis_error_to_response(err: AnalysisError) -> axum::response::Response {
    tracing::error!(error = %err, "analysis failed");
    match err {
        AnalysisError::Input(e) => json_error(StatusCode::UNPROCESSABLE_ENTITY, "invalid_input", e.to_string()),
        AnalysisError::Ai(e @ AiError::MissingFeature(_)) => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "feature_mismatch", e.to_string())
        }
        AnalysisError::Ai(e) => json_error(StatusCode::INTERNAL_SERVER_ERROR, "prediction_failed", e.to_string()),
        AnalysisError::Report(e) => json_error(StatusCode::INTERNAL_SERVER_ERROR, "report_failed", e.to_string()),
        AnalysisError::Io(e) => json_error(StatusCode::INTERNAL_SERVER_ERROR, "io_error", e.to_string()),
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
