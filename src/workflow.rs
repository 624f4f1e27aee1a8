//! End-to-end fitting workflows.
//!
//! Each workflow separates a pure `prepare` step (load, reshape, assemble)
//! from `run`, which hands the prepared dataset to a [`FactorBackend`].

use crate::data::{LongTable, MultiViewDataset};
use crate::engine::{fit_model, FactorBackend, FitConfig};
use crate::error::Result;
use crate::load::{load_modalities, load_sample_metadata, CLL_MODALITIES};
use crate::reshape::{extract_sample_metadata, pivot_views};
use std::path::PathBuf;
use tracing::info;

pub const DEFAULT_INPUT_DIR: &str = "data/";
pub const DEFAULT_METADATA: &str = "data/sample_metadata.txt";
pub const DEFAULT_MOFA_MODEL: &str = "models/CLL.hdf5";
pub const DEFAULT_MEFISTO_MODEL: &str = "models/mefisto.hdf5";
pub const DEFAULT_LONG_TABLE: &str = "evodevo.csv";
pub const DEFAULT_RESULTS_DIR: &str = "results";

/// MOFA+ on one CSV per modality plus a sample sheet.
#[derive(Debug, Clone)]
pub struct MofaWorkflow {
    pub input_dir: PathBuf,
    pub metadata: PathBuf,
    pub output: PathBuf,
    pub modalities: Vec<String>,
    pub fit: FitConfig,
}

impl Default for MofaWorkflow {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from(DEFAULT_INPUT_DIR),
            metadata: PathBuf::from(DEFAULT_METADATA),
            output: PathBuf::from(DEFAULT_MOFA_MODEL),
            modalities: CLL_MODALITIES.iter().map(|m| m.to_string()).collect(),
            fit: FitConfig::mofa(),
        }
    }
}

impl MofaWorkflow {
    /// Load every modality and the sample sheet, and assemble the dataset.
    pub fn prepare(&self) -> Result<MultiViewDataset> {
        let views = load_modalities(&self.input_dir, &self.modalities)?;
        let metadata = load_sample_metadata(&self.metadata)?;
        MultiViewDataset::assemble(views, &metadata)
    }

    pub fn run<B: FactorBackend + ?Sized>(&self, backend: &B) -> Result<()> {
        info!("MOFA+ run: {} -> {}", self.input_dir.display(), self.output.display());
        let dataset = self.prepare()?;
        fit_model(backend, dataset, &self.fit, &self.output)
    }
}

/// MEFISTO on a long-format table with time and group columns.
#[derive(Debug, Clone)]
pub struct MefistoWorkflow {
    pub input_dir: PathBuf,
    /// File name of the long table inside `input_dir`.
    pub table: String,
    pub output: PathBuf,
    /// Observation column the `group` values are stored under.
    pub group_label: String,
    pub fit: FitConfig,
}

impl Default for MefistoWorkflow {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from(DEFAULT_INPUT_DIR),
            table: DEFAULT_LONG_TABLE.to_string(),
            output: PathBuf::from(DEFAULT_MEFISTO_MODEL),
            group_label: "species".to_string(),
            fit: FitConfig::mefisto(),
        }
    }
}

impl MefistoWorkflow {
    /// Pivot the long table per view and derive per-sample time/group.
    pub fn prepare(&self) -> Result<MultiViewDataset> {
        let table = LongTable::from_csv(self.input_dir.join(&self.table))?;
        info!("Read {} long-format rows", table.len());
        let views = pivot_views(&table)?;
        let metadata = extract_sample_metadata(&table, &self.group_label)?;
        MultiViewDataset::assemble(views, &metadata)
    }

    pub fn run<B: FactorBackend + ?Sized>(&self, backend: &B) -> Result<()> {
        info!("MEFISTO run: {} -> {}", self.input_dir.display(), self.output.display());
        let dataset = self.prepare()?;
        fit_model(backend, dataset, &self.fit, &self.output)
    }
}
