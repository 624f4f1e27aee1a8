//! Multi-view dataset: named views plus a joined observation table.

use crate::data::{SampleMetadata, ViewMatrix};
use crate::error::{MofaError, Result};
use std::collections::HashSet;
use tracing::{debug, info};

/// Views registered under unique names, with per-sample covariates.
///
/// The observation table covers exactly the union of sample ids across
/// all views, in first-appearance order.
#[derive(Debug, Clone)]
pub struct MultiViewDataset {
    views: Vec<ViewMatrix>,
    obs: SampleMetadata,
}

impl MultiViewDataset {
    /// Register `views` and left-join `metadata` onto the sample union.
    ///
    /// Samples without a metadata row keep missing covariates; metadata
    /// rows for samples absent from every view are dropped.
    pub fn assemble(views: Vec<ViewMatrix>, metadata: &SampleMetadata) -> Result<Self> {
        if views.is_empty() {
            return Err(MofaError::EmptyData("No views to assemble".to_string()));
        }

        let mut names = HashSet::new();
        for view in &views {
            if !names.insert(view.name()) {
                return Err(MofaError::InvalidParameter(format!(
                    "View '{}' registered twice",
                    view.name()
                )));
            }
        }

        let mut seen = HashSet::new();
        let mut sample_ids = Vec::new();
        for view in &views {
            for sid in view.sample_ids() {
                if seen.insert(sid.as_str()) {
                    sample_ids.push(sid.clone());
                }
            }
        }

        let unmatched = sample_ids
            .iter()
            .filter(|s| !metadata.has_sample(s))
            .count();
        if unmatched > 0 {
            debug!(
                "{} of {} samples have no metadata row; covariates left missing",
                unmatched,
                sample_ids.len()
            );
        }

        let obs = metadata.left_join(&sample_ids);
        info!(
            "Assembled {} views over {} samples ({} covariates)",
            views.len(),
            obs.n_samples(),
            obs.n_columns()
        );
        Ok(Self { views, obs })
    }

    /// Views in registration order.
    pub fn views(&self) -> &[ViewMatrix] {
        &self.views
    }

    /// Look up a view by name.
    pub fn view(&self, name: &str) -> Option<&ViewMatrix> {
        self.views.iter().find(|v| v.name() == name)
    }

    pub fn view_names(&self) -> Vec<&str> {
        self.views.iter().map(|v| v.name()).collect()
    }

    /// Observation (per-sample) table.
    pub fn obs(&self) -> &SampleMetadata {
        &self.obs
    }

    /// Union of sample ids across views.
    pub fn sample_ids(&self) -> &[String] {
        self.obs.sample_ids()
    }

    pub fn n_views(&self) -> usize {
        self.views.len()
    }

    pub fn n_samples(&self) -> usize {
        self.obs.n_samples()
    }
}
