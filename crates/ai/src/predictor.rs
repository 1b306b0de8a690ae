//! Demand predictor: feature selection, scaling and model evaluation.
//!
//! The concrete model sits behind [`DemandPredictor`]; the pipeline only
//! knows the declared feature columns and a `predict` call.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;

use crate::error::AiError;
use crate::features::FeatureTable;
use crate::model::DemandModel;

/// File name of the trained model inside a model directory.
pub const MODEL_FILE: &str = "demand_model.json";
/// File name of the fitted scaler.
pub const SCALER_FILE: &str = "scaler.json";
/// File name of the feature metadata.
pub const MODEL_INFO_FILE: &str = "model_info.json";

/// Forecasting capability consumed by the analysis job.
///
/// Implementations must be pure: identical feature tables yield identical
/// predictions, one per row, in row order.
pub trait DemandPredictor: Send + Sync {
    /// Ordered feature columns the predictor reads.
    fn feature_columns(&self) -> &[String];

    fn predict(&self, features: &FeatureTable) -> Result<Vec<f64>, AiError>;
}

/// Row-major `f32` matrix of the selected feature columns.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    rows: usize,
    cols: usize,
    data: Vec<f32>,
}

impl FeatureMatrix {
    /// Select `columns` from `features`, in that order.
    pub fn select(features: &FeatureTable, columns: &[String]) -> Result<Self, AiError> {
        let indices = columns
            .iter()
            .map(|name| {
                features
                    .column_index(name)
                    .ok_or_else(|| AiError::MissingFeature(name.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut data = Vec::with_capacity(features.len() * indices.len());
        for row in features.rows() {
            data.extend(indices.iter().map(|&i| row.values()[i] as f32));
        }

        Ok(Self {
            rows: features.len(),
            cols: indices.len(),
            data,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn row(&self, i: usize) -> &[f32] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }
}

/// Metadata published with the model: the ordered input feature list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub feature_columns: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_version: Option<String>,
}

/// Fitted standardization: `(x - mean) / scale`, a zero scale counts as 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    fn validate(&self, width: usize) -> Result<(), AiError> {
        if self.mean.len() != width || self.scale.len() != width {
            return Err(AiError::ArtifactMismatch(format!(
                "scaler fitted on {}/{} mean/scale value(s) for {} feature(s)",
                self.mean.len(),
                self.scale.len(),
                width
            )));
        }
        Ok(())
    }

    /// Scale in place, in `f32` like the matrix itself.
    pub fn transform(&self, matrix: &mut FeatureMatrix) {
        let cols = matrix.cols;
        for (i, x) in matrix.data.iter_mut().enumerate() {
            let c = i % cols;
            let mean = self.mean[c] as f32;
            let scale = match self.scale[c] as f32 {
                s if s == 0.0 => 1.0,
                s => s,
            };
            *x = (*x - mean) / scale;
        }
    }
}

/// Model, scaler and feature metadata loaded together and checked for consistency.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelArtifacts {
    info: ModelInfo,
    scaler: StandardScaler,
    model: DemandModel,
}

impl ModelArtifacts {
    pub fn new(info: ModelInfo, scaler: StandardScaler, model: DemandModel) -> Result<Self, AiError> {
        let width = info.feature_columns.len();
        if width == 0 {
            return Err(AiError::ArtifactMismatch(
                "model metadata declares no feature columns".to_string(),
            ));
        }
        scaler.validate(width)?;
        model.validate(width)?;
        Ok(Self {
            info,
            scaler,
            model,
        })
    }

    /// Load [`MODEL_FILE`], [`SCALER_FILE`] and [`MODEL_INFO_FILE`] from `dir`.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, AiError> {
        let dir = dir.as_ref();
        let info: ModelInfo = read_json(&dir.join(MODEL_INFO_FILE))?;
        let scaler: StandardScaler = read_json(&dir.join(SCALER_FILE))?;
        let model: DemandModel = read_json(&dir.join(MODEL_FILE))?;
        let artifacts = Self::new(info, scaler, model)?;

        tracing::info!(
            dir = %dir.display(),
            features = artifacts.info.feature_columns.len(),
            version = artifacts.info.model_version.as_deref().unwrap_or("unversioned"),
            "loaded demand model artifacts"
        );
        Ok(artifacts)
    }

    pub fn info(&self) -> &ModelInfo {
        &self.info
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, AiError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| AiError::ArtifactLoad(format!("{}: {}", path.display(), e)))?;
    serde_json::from_str(&raw)
        .map_err(|e| AiError::ArtifactLoad(format!("{}: {}", path.display(), e)))
}

impl DemandPredictor for ModelArtifacts {
    fn feature_columns(&self) -> &[String] {
        &self.info.feature_columns
    }

    fn predict(&self, features: &FeatureTable) -> Result<Vec<f64>, AiError> {
        let mut matrix = FeatureMatrix::select(features, &self.info.feature_columns)?;
        self.scaler.transform(&mut matrix);
        Ok((0..matrix.rows())
            .map(|i| self.model.evaluate(matrix.row(i)))
            .collect())
    }
}
