//! Report assembler: recommendation table and visual summary for one run.
//!
//! The table is the primary deliverable. The chart is best-effort: a chart
//! failure is logged and leaves the table untouched.

use std::path::{Path, PathBuf};

use thiserror::Error;

use stockwise_ai::Recommendation;

pub mod chart;
pub mod table;

/// File name of the recommendation table inside the output directory.
pub const TABLE_FILE: &str = "inventory_recommendations.csv";
/// File name of the visual summary inside the output directory.
pub const CHART_FILE: &str = "inventory_analysis.svg";

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("chart rendering failed: {0}")]
    Chart(String),
}

/// Paths of the artifacts written for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportArtifacts {
    pub table: PathBuf,
    /// `None` when the chart could not be produced.
    pub chart: Option<PathBuf>,
}

/// Writes run outputs into an explicit destination directory.
#[derive(Debug, Clone)]
pub struct ReportAssembler {
    output_dir: PathBuf,
}

impl ReportAssembler {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Write the table (fatal on failure), then the chart (non-fatal).
    pub fn assemble(&self, recommendations: &[Recommendation]) -> Result<ReportArtifacts, ReportError> {
        std::fs::create_dir_all(&self.output_dir)?;

        let table_path = self.output_dir.join(TABLE_FILE);
        table::write_table_file(&table_path, recommendations)?;

        let chart_path = self.output_dir.join(CHART_FILE);
        let chart = match chart::render_summary(&chart_path, recommendations) {
            Ok(()) => Some(chart_path),
            Err(e) => {
                tracing::warn!(error = %e, "inventory chart not produced");
                None
            }
        };

        tracing::debug!(
            dir = %self.output_dir.display(),
            rows = recommendations.len(),
            chart = chart.is_some(),
            "report assembled"
        );

        Ok(ReportArtifacts {
            table: table_path,
            chart,
        })
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assemble_writes_table_and_chart() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("run");
        let artifacts = ReportAssembler::new(&out).assemble(&test_support::sample()).unwrap();

        assert_eq!(artifacts.table, out.join(TABLE_FILE));
        assert!(artifacts.table.exists());
        let chart = artifacts.chart.expect("chart should be rendered");
        let svg = std::fs::read_to_string(chart).unwrap();
        assert!(svg.contains("<svg"));
    }

    #[test]
    fn empty_run_still_writes_table() {
        let dir = tempfile::tempdir().unwrap();
        let artifacts = ReportAssembler::new(dir.path()).assemble(&[]).unwrap();
        assert!(artifacts.table.exists());
        assert!(artifacts.chart.is_none());
    }

    #[test]
    fn repeated_runs_produce_identical_tables() {
        let dir = tempfile::tempdir().unwrap();
        let assembler = ReportAssembler::new(dir.path());
        let first = assembler.assemble(&test_support::sample()).unwrap();
        let a = std::fs::read(&first.table).unwrap();
        let second = assembler.assemble(&test_support::sample()).unwrap();
        let b = std::fs::read(&second.table).unwrap();
        assert_eq!(a, b);
    }
}
