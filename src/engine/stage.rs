//! Writing a dataset to disk in the layout the engine drivers read.

use crate::data::MultiViewDataset;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Key column of the staged observation table.
pub const OBS_KEY: &str = "sample";

/// One staged view file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StagedView {
    pub name: String,
    pub path: PathBuf,
    pub n_samples: usize,
    pub n_features: usize,
}

/// Manifest of a staged dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StagedDataset {
    pub views: Vec<StagedView>,
    pub obs: PathBuf,
    pub obs_key: String,
}

/// Write each view as `view_<i>.csv` (samples × features) and the
/// observation table as `obs.tsv` under `dir`.
///
/// View names travel in the manifest, so they never need to be valid
/// file names.
pub fn stage_dataset(dataset: &MultiViewDataset, dir: &Path) -> Result<StagedDataset> {
    fs::create_dir_all(dir)?;

    let mut views = Vec::with_capacity(dataset.n_views());
    for (i, view) in dataset.views().iter().enumerate() {
        let path = dir.join(format!("view_{}.csv", i));
        view.to_csv(&path)?;
        views.push(StagedView {
            name: view.name().to_string(),
            path,
            n_samples: view.n_samples(),
            n_features: view.n_features(),
        });
    }

    let obs = dir.join("obs.tsv");
    dataset.obs().to_tsv(&obs, OBS_KEY)?;
    debug!("Staged {} views under {}", views.len(), dir.display());

    Ok(StagedDataset {
        views,
        obs,
        obs_key: OBS_KEY.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{SampleMetadata, Variable, VariableType, ViewMatrix};
    use nalgebra::DMatrix;

    #[test]
    fn test_stage_writes_views_and_obs() {
        let a = ViewMatrix::new(
            "mRNA",
            DMatrix::from_row_slice(2, 1, &[1.0, 2.0]),
            vec!["s1".to_string(), "s2".to_string()],
            vec!["g1".to_string()],
        )
        .unwrap();
        let b = ViewMatrix::new(
            "drug/response",
            DMatrix::from_row_slice(1, 2, &[0.5, f64::NAN]),
            vec!["s3".to_string()],
            vec!["d1".to_string(), "d2".to_string()],
        )
        .unwrap();
        let mut meta = SampleMetadata::with_columns(&[("Gender", VariableType::Categorical)]);
        meta.push_sample("s1", vec![("Gender".to_string(), Variable::Categorical("m".into()))])
            .unwrap();
        let ds = MultiViewDataset::assemble(vec![a, b], &meta).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let staged = stage_dataset(&ds, dir.path()).unwrap();

        assert_eq!(staged.views.len(), 2);
        assert_eq!(staged.views[1].name, "drug/response");
        assert!(staged.views.iter().all(|v| v.path.exists()));

        let obs = std::fs::read_to_string(&staged.obs).unwrap();
        assert_eq!(obs, "sample\tGender\ns1\tm\ns2\t\ns3\t\n");

        let view_b = std::fs::read_to_string(&staged.views[1].path).unwrap();
        assert_eq!(view_b, "sample,d1,d2\ns3,0.5,\n");
    }
}
