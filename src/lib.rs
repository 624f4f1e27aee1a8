//! MOFA+/MEFISTO multi-omics factor analysis pipeline.
//!
//! This library prepares multi-omics inputs for an external factor-analysis
//! engine and turns fitted models into a fixed set of result files. The
//! statistics and the plotting stay in the engine; this crate owns the
//! data handling around it.
//!
//! # Overview
//!
//! - **data**: Core data structures (LongTable, ViewMatrix, SampleMetadata, MultiViewDataset)
//! - **reshape**: Long-to-wide pivoting and per-sample metadata extraction
//! - **load**: One-CSV-per-modality loader and sample sheet reader
//! - **engine**: Fit configuration, dataset staging, and the engine seam
//! - **report**: Model snapshot, report layout, and result files
//! - **workflow**: MOFA+ and MEFISTO runs from files to model artifact
//! - **archive**: Zip extraction of bundled input data
//!
//! # Example
//!
//! ```no_run
//! use mofa_pipeline::prelude::*;
//!
//! let workflow = MefistoWorkflow::default();
//! let dataset = workflow.prepare().unwrap();
//! println!("{} views over {} samples", dataset.n_views(), dataset.n_samples());
//!
//! let backend = PythonBackend::new();
//! fit_model(&backend, dataset, &workflow.fit, &workflow.output).unwrap();
//! ```

pub mod archive;
pub mod data;
pub mod engine;
pub mod error;
pub mod load;
pub mod report;
pub mod reshape;
pub mod workflow;

/// Convenient re-exports for common usage.
pub mod prelude {
    pub use crate::archive::{default_destination, extract_archive};
    pub use crate::data::{
        LongRecord, LongTable, MultiViewDataset, SampleMetadata, Variable, VariableType,
        ViewMatrix,
    };
    pub use crate::engine::{
        fit_model, stage_dataset, ConvergenceMode, FactorBackend, FitConfig, ObsPolicy,
        PythonBackend, SmoothConfig, StagedDataset,
    };
    pub use crate::error::{MofaError, Result};
    pub use crate::load::{load_modalities, load_sample_metadata, read_modality, CLL_MODALITIES};
    pub use crate::report::{
        generate_report, plan_report, ModelSnapshot, ModelVariant, PlotSpec, R2Entry, RenderJob,
        ReportConfig, ReportOutputs, ViewVariance, SUMMARY_FILE, VARIANCE_FILE,
    };
    pub use crate::reshape::{extract_sample_metadata, flatten_views, pivot_view, pivot_views, LongCell};
    pub use crate::workflow::{MefistoWorkflow, MofaWorkflow};
}
