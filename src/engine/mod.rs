//! The seam to the external factor-analysis engine.
//!
//! Fitting, model introspection, and figure rendering all happen outside
//! this crate. [`FactorBackend`] names the three calls; [`PythonBackend`]
//! implements them by driving a Python interpreter.

pub mod config;
pub mod python;
pub mod scripts;
pub mod stage;

pub use config::{ConvergenceMode, FitConfig, ObsPolicy, SmoothConfig};
pub use python::{PythonBackend, PYTHON_ENV};
pub use stage::{stage_dataset, StagedDataset, StagedView};

use crate::data::MultiViewDataset;
use crate::error::{MofaError, Result};
use crate::report::{ModelSnapshot, RenderJob};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// External factor-analysis engine.
pub trait FactorBackend {
    /// Fit a model on `dataset` and write the artifact to `outfile`.
    fn fit(&self, dataset: MultiViewDataset, config: &FitConfig, outfile: &Path) -> Result<()>;

    /// Describe a fitted model artifact.
    fn describe(&self, model: &Path) -> Result<ModelSnapshot>;

    /// Render the figures of `job` into `output_dir`.
    fn render(&self, model: &Path, job: &RenderJob, output_dir: &Path) -> Result<()>;
}

/// Validate, fit, and leave either a complete artifact or none at all.
///
/// Parent directories of `outfile` are created. If the engine fails, or
/// returns without producing the file, any partial artifact is removed;
/// there is no resuming, a failed fit is rerun from scratch.
pub fn fit_model<B: FactorBackend + ?Sized>(
    backend: &B,
    dataset: MultiViewDataset,
    config: &FitConfig,
    outfile: &Path,
) -> Result<()> {
    config.validate_for(&dataset)?;

    if let Some(parent) = outfile.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    info!(
        "Fitting {} factors on {} views x {} samples",
        config.n_factors,
        dataset.n_views(),
        dataset.n_samples()
    );
    let result = backend.fit(dataset, config, outfile).and_then(|()| {
        if outfile.is_file() {
            Ok(())
        } else {
            Err(MofaError::Engine(format!(
                "engine finished without writing {}",
                outfile.display()
            )))
        }
    });

    if let Err(e) = result {
        if outfile.exists() {
            warn!("Removing partial model artifact {}", outfile.display());
            fs::remove_file(outfile)?;
        }
        return Err(e);
    }

    info!("Model written to {}", outfile.display());
    Ok(())
}
