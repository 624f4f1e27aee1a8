//! Results reporting for fitted models.
//!
//! A report is produced in three steps: the engine describes the model
//! ([`ModelSnapshot`]), the layout is validated against it
//! ([`plan_report`]), then the text/table outputs are written here and the
//! figures are handed back to the engine for rendering.

pub mod config;
pub mod export;
pub mod plan;
pub mod snapshot;

pub use config::{CovariatePlot, FactorPlot, ModelVariant, ReportConfig, TemporalPlots, WeightPlot};
pub use export::{write_summary, write_variance_csv};
pub use plan::{plan_report, PlotSpec, RenderJob};
pub use snapshot::{ModelSnapshot, R2Entry, ViewVariance};

use crate::engine::FactorBackend;
use crate::error::{MofaError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// File name of the textual model summary.
pub const SUMMARY_FILE: &str = "model_summary.txt";
/// File name of the per-view variance table.
pub const VARIANCE_FILE: &str = "variance.csv";

/// Paths of everything a report run wrote.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportOutputs {
    pub summary: PathBuf,
    pub variance: PathBuf,
    pub figures: Vec<PathBuf>,
}

impl ReportOutputs {
    /// All output files, summary and table first.
    pub fn files(&self) -> Vec<&Path> {
        let mut files = vec![self.summary.as_path(), self.variance.as_path()];
        files.extend(self.figures.iter().map(|p| p.as_path()));
        files
    }
}

/// Produce the report for `model` in `output_dir`.
///
/// The output directory is created if missing and every output is
/// overwritten. Fails before writing anything if the model is absent or
/// the layout does not fit the model.
pub fn generate_report<B: FactorBackend + ?Sized>(
    backend: &B,
    model: &Path,
    output_dir: &Path,
    config: &ReportConfig,
) -> Result<ReportOutputs> {
    if !model.is_file() {
        return Err(MofaError::MissingInput(model.to_path_buf()));
    }

    info!("Reading model {}", model.display());
    let snapshot = backend.describe(model)?;
    let job = plan_report(&snapshot, config)?;

    fs::create_dir_all(output_dir)?;

    let summary = output_dir.join(SUMMARY_FILE);
    write_summary(&summary, &snapshot.summary)?;

    let variance = output_dir.join(VARIANCE_FILE);
    write_variance_csv(&variance, &snapshot.variance_by_view())?;

    info!("Rendering {} figures into {}", job.plots.len(), output_dir.display());
    backend.render(model, &job, output_dir)?;

    let figures = job.plots.iter().map(|p| output_dir.join(p.file())).collect();
    Ok(ReportOutputs {
        summary,
        variance,
        figures,
    })
}
