use thiserror::Error;

/// Failure of the forecasting stages (feature selection, artifacts, inference).
#[derive(Debug, Error)]
pub enum AiError {
    /// A feature column declared by the model metadata is absent from the feature table.
    #[error("feature column `{0}` required by the model is missing")]
    MissingFeature(String),

    #[error("failed to load model artifact: {0}")]
    ArtifactLoad(String),

    /// Model, scaler and metadata disagree about the feature contract.
    #[error("model artifacts are inconsistent: {0}")]
    ArtifactMismatch(String),

    #[error("inference failed: {0}")]
    InferenceFailed(String),
}
