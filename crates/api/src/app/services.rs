//! The analysis pipeline behind the upload endpoint.
//!
//! One call = one run: stage the uploads in a scratch directory, load both
//! tables, run the analysis job, write the report. Runs share nothing but
//! the loaded model.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

use stockwise_ai::{
    AiError, AiJob, AnalysisInput, DemandPredictor, InventoryAnalysisJob, ModelArtifacts,
    Recommendation, ReorderPolicy,
};
use stockwise_core::{DomainError, RunId};
use stockwise_inventory::{load_item_master_file, load_sales_file, ITEM_MASTER_TABLE, SALES_TABLE};
use stockwise_report::{ReportArtifacts, ReportAssembler, ReportError};

use crate::config::ApiConfig;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Input(#[from] DomainError),

    #[error(transparent)]
    Ai(#[from] AiError),

    #[error(transparent)]
    Report(#[from] ReportError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// A file received from the client.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: Option<String>,
    pub bytes: Vec<u8>,
}

/// Outcome of one successful run.
#[derive(Debug, Clone)]
pub struct AnalysisRun {
    pub run_id: RunId,
    pub recommendations: Vec<Recommendation>,
    pub artifacts: ReportArtifacts,
}

pub struct AnalysisService {
    predictor: Arc<dyn DemandPredictor>,
    policy: ReorderPolicy,
    staging_dir: PathBuf,
    output_dir: PathBuf,
}

impl AnalysisService {
    pub fn new(
        predictor: Arc<dyn DemandPredictor>,
        staging_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            predictor,
            policy: ReorderPolicy::default(),
            staging_dir: staging_dir.into(),
            output_dir: output_dir.into(),
        }
    }

    /// Build the service from configuration, loading the model artifacts.
    pub fn load(config: &ApiConfig) -> Result<Self, AiError> {
        let artifacts = ModelArtifacts::load(&config.model_dir)?;
        Ok(Self::new(
            Arc::new(artifacts),
            &config.staging_dir,
            &config.output_dir,
        ))
    }

    pub fn with_policy(mut self, policy: ReorderPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Stage both uploads for a fresh run, then analyze them.
    ///
    /// The run's staging directory is removed when the call returns, on
    /// success and on error alike.
    pub fn analyze_upload(
        &self,
        item_master: UploadedFile,
        sales: UploadedFile,
    ) -> Result<AnalysisRun, AnalysisError> {
        let run_id = RunId::new();
        std::fs::create_dir_all(&self.staging_dir)?;
        let staging = tempfile::Builder::new()
            .prefix(&format!("{run_id}-"))
            .tempdir_in(&self.staging_dir)?;

        let master_path = stage(staging.path(), ITEM_MASTER_TABLE, &item_master)?;
        let sales_path = stage(staging.path(), SALES_TABLE, &sales)?;
        let result = self.analyze_files(run_id, &master_path, &sales_path);

        if let Err(e) = staging.close() {
            tracing::warn!(run_id = %run_id, error = %e, "staging directory not removed");
        }
        result
    }

    /// Analyze two CSV files already on disk.
    pub fn analyze_files(
        &self,
        run_id: RunId,
        master_path: &Path,
        sales_path: &Path,
    ) -> Result<AnalysisRun, AnalysisError> {
        let _span = tracing::info_span!("analysis", run_id = %run_id).entered();

        let master = load_item_master_file(master_path)?;
        let sales = load_sales_file(sales_path)?;
        tracing::info!(items = master.len(), transactions = sales.len(), "inputs loaded");

        let job = InventoryAnalysisJob::new(AnalysisInput { master, sales }, self.predictor.clone())
            .with_policy(self.policy);
        let recommendations = job.run()?;

        let artifacts = ReportAssembler::new(self.output_dir.join(run_id.to_string()))
            .assemble(&recommendations)?;

        Ok(AnalysisRun {
            run_id,
            recommendations,
            artifacts,
        })
    }
}

/// Uploads are stored under their field name, never under a client-supplied path.
fn stage(dir: &Path, field: &str, file: &UploadedFile) -> Result<PathBuf, AnalysisError> {
    let path = dir.join(format!("{field}.csv"));
    std::fs::write(&path, &file.bytes)?;
    tracing::debug!(
        field,
        original = file.file_name.as_deref().unwrap_or("<unnamed>"),
        bytes = file.bytes.len(),
        "upload staged"
    );
    Ok(path)
}
