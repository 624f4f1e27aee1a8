//! Fitting configuration passed to the factor-analysis engine.

use crate::data::MultiViewDataset;
use crate::error::{MofaError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Convergence criterion of the variational optimizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConvergenceMode {
    Fast,
    Medium,
    Slow,
}

impl ConvergenceMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fast => "fast",
            Self::Medium => "medium",
            Self::Slow => "slow",
        }
    }
}

/// Which samples enter the model when views cover different samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObsPolicy {
    /// Keep every sample; absent views are treated as missing.
    Union,
    /// Keep only samples present in every view.
    Intersection,
}

/// Temporal smoothing (MEFISTO) of factors along a sample covariate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmoothConfig {
    /// Observation column holding the covariate, e.g. `time`.
    pub covariate: String,
    /// Align the covariate across groups.
    #[serde(default)]
    pub warping: bool,
    /// Group whose covariate scale is the warping reference.
    #[serde(default)]
    pub warping_ref: Option<String>,
    /// Covariate values at which to interpolate factors.
    #[serde(default)]
    pub new_values: Vec<f64>,
}

/// Model configuration handed to the engine along with the dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitConfig {
    /// Number of latent factors.
    pub n_factors: usize,
    /// Convergence criterion.
    pub convergence_mode: ConvergenceMode,
    /// Hard iteration budget; engine default when absent.
    #[serde(default)]
    pub n_iterations: Option<usize>,
    /// Missing-sample handling across views; engine default when absent.
    #[serde(default)]
    pub use_obs: Option<ObsPolicy>,
    /// Observation column partitioning samples into groups.
    #[serde(default)]
    pub groups_label: Option<String>,
    #[serde(default)]
    pub smooth: Option<SmoothConfig>,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub verbose: bool,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self::mofa()
    }
}

impl FitConfig {
    /// MOFA+ settings used for the CLL study: 15 factors, medium
    /// convergence, union of samples across views.
    pub fn mofa() -> Self {
        Self {
            n_factors: 15,
            convergence_mode: ConvergenceMode::Medium,
            n_iterations: None,
            use_obs: Some(ObsPolicy::Union),
            groups_label: None,
            smooth: None,
            seed: None,
            verbose: false,
        }
    }

    /// MEFISTO settings for the evo-devo study: 5 factors smoothed over
    /// `time`, grouped by species and warped onto the mouse time scale,
    /// interpolated at time points 1 to 14. The iteration budget is small.
    pub fn mefisto() -> Self {
        Self {
            n_factors: 5,
            convergence_mode: ConvergenceMode::Fast,
            n_iterations: Some(25),
            use_obs: None,
            groups_label: Some("species".to_string()),
            smooth: Some(SmoothConfig {
                covariate: "time".to_string(),
                warping: true,
                warping_ref: Some("Mouse".to_string()),
                new_values: (1..15).map(f64::from).collect(),
            }),
            seed: None,
            verbose: false,
        }
    }

    /// Load from YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a YAML file.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(MofaError::MissingInput(path.to_path_buf()));
        }
        Self::from_yaml(&std::fs::read_to_string(path)?)
    }

    /// Save to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(MofaError::from)
    }

    /// Check internal consistency.
    pub fn validate(&self) -> Result<()> {
        if self.n_factors == 0 {
            return Err(MofaError::InvalidParameter(
                "n_factors must be at least 1".to_string(),
            ));
        }
        if self.n_iterations == Some(0) {
            return Err(MofaError::InvalidParameter(
                "n_iterations must be at least 1".to_string(),
            ));
        }
        if let Some(smooth) = &self.smooth {
            if smooth.covariate.trim().is_empty() {
                return Err(MofaError::InvalidParameter(
                    "smoothing covariate must be named".to_string(),
                ));
            }
            if smooth.warping && self.groups_label.is_none() {
                return Err(MofaError::InvalidParameter(
                    "warping requires a groups label".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Check the configuration against the observation columns of a dataset.
    pub fn validate_for(&self, dataset: &MultiViewDataset) -> Result<()> {
        self.validate()?;
        let obs = dataset.obs();
        if let Some(label) = &self.groups_label {
            if !obs.has_column(label) {
                return Err(MofaError::MissingColumn(label.clone()));
            }
        }
        if let Some(smooth) = &self.smooth {
            if !obs.has_column(&smooth.covariate) {
                return Err(MofaError::MissingColumn(smooth.covariate.clone()));
            }
            if let (Some(reference), Some(label)) = (&smooth.warping_ref, &self.groups_label) {
                let levels = obs.levels(label)?;
                if !levels.iter().any(|l| l == reference) {
                    return Err(MofaError::InvalidParameter(format!(
                        "warping reference '{}' is not a level of '{}'",
                        reference, label
                    )));
                }
            }
        }
        Ok(())
    }
}
