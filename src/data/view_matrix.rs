//! Dense per-view data matrix (samples × features).

use crate::error::{MofaError, Result};
use nalgebra::DMatrix;
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// Numeric measurements for one view (modality).
///
/// Rows are samples, columns are features. Missing cells are stored as NaN.
#[derive(Debug, Clone)]
pub struct ViewMatrix {
    name: String,
    data: DMatrix<f64>,
    sample_ids: Vec<String>,
    feature_ids: Vec<String>,
    sample_index: HashMap<String, usize>,
    feature_index: HashMap<String, usize>,
}

impl ViewMatrix {
    /// Create a view from a dense matrix and identifiers.
    pub fn new(
        name: &str,
        data: DMatrix<f64>,
        sample_ids: Vec<String>,
        feature_ids: Vec<String>,
    ) -> Result<Self> {
        let (nrows, ncols) = data.shape();
        if nrows != sample_ids.len() {
            return Err(MofaError::DimensionMismatch {
                expected: nrows,
                actual: sample_ids.len(),
            });
        }
        if ncols != feature_ids.len() {
            return Err(MofaError::DimensionMismatch {
                expected: ncols,
                actual: feature_ids.len(),
            });
        }
        let sample_index = index_ids(&sample_ids, "sample")?;
        let feature_index = index_ids(&feature_ids, "feature")?;
        Ok(Self {
            name: name.to_string(),
            data,
            sample_ids,
            feature_ids,
            sample_index,
            feature_index,
        })
    }

    /// Build a view from feature-major rows, transposing to samples × features.
    ///
    /// `rows[f][s]` is the value of feature `f` in sample `s`.
    pub fn from_feature_rows(
        name: &str,
        rows: &[Vec<f64>],
        feature_ids: Vec<String>,
        sample_ids: Vec<String>,
    ) -> Result<Self> {
        if rows.len() != feature_ids.len() {
            return Err(MofaError::DimensionMismatch {
                expected: feature_ids.len(),
                actual: rows.len(),
            });
        }
        let n_samples = sample_ids.len();
        if let Some(bad) = rows.iter().find(|r| r.len() != n_samples) {
            return Err(MofaError::DimensionMismatch {
                expected: n_samples,
                actual: bad.len(),
            });
        }
        let data = DMatrix::from_fn(n_samples, feature_ids.len(), |s, f| rows[f][s]);
        Self::new(name, data, sample_ids, feature_ids)
    }

    /// View name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Underlying matrix (samples × features).
    pub fn data(&self) -> &DMatrix<f64> {
        &self.data
    }

    /// Sample identifiers (row names).
    pub fn sample_ids(&self) -> &[String] {
        &self.sample_ids
    }

    /// Feature identifiers (column names).
    pub fn feature_ids(&self) -> &[String] {
        &self.feature_ids
    }

    pub fn n_samples(&self) -> usize {
        self.sample_ids.len()
    }

    pub fn n_features(&self) -> usize {
        self.feature_ids.len()
    }

    /// Value at (row, col); NaN means missing.
    pub fn value(&self, row: usize, col: usize) -> f64 {
        self.data[(row, col)]
    }

    /// Value for a (sample, feature) pair, `None` if either id is unknown
    /// or the cell is missing.
    pub fn get(&self, sample: &str, feature: &str) -> Option<f64> {
        let row = *self.sample_index.get(sample)?;
        let col = *self.feature_index.get(feature)?;
        let v = self.data[(row, col)];
        (!v.is_nan()).then_some(v)
    }

    /// Number of missing cells.
    pub fn n_missing(&self) -> usize {
        self.data.iter().filter(|v| v.is_nan()).count()
    }

    /// Write the view as comma-delimited text, samples as rows.
    ///
    /// The header cell above the sample ids is `sample`; missing cells are empty.
    pub fn to_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut wtr = csv::Writer::from_path(path)?;
        let mut header = Vec::with_capacity(self.n_features() + 1);
        header.push("sample".to_string());
        header.extend(self.feature_ids.iter().cloned());
        wtr.write_record(&header)?;

        for (row, sid) in self.sample_ids.iter().enumerate() {
            let mut record = Vec::with_capacity(self.n_features() + 1);
            record.push(sid.clone());
            for col in 0..self.n_features() {
                let v = self.data[(row, col)];
                record.push(if v.is_nan() { String::new() } else { v.to_string() });
            }
            wtr.write_record(&record)?;
        }
        wtr.flush()?;
        Ok(())
    }
}

fn index_ids(ids: &[String], kind: &str) -> Result<HashMap<String, usize>> {
    let mut seen = HashSet::with_capacity(ids.len());
    let mut index = HashMap::with_capacity(ids.len());
    for (i, id) in ids.iter().enumerate() {
        if !seen.insert(id.as_str()) {
            return Err(MofaError::DuplicateId {
                kind: kind.to_string(),
                id: id.clone(),
            });
        }
        index.insert(id.clone(), i);
    }
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_from_feature_rows_transposes() {
        let rows = vec![vec![1.0, 2.0, 3.0], vec![4.0, f64::NAN, 6.0]];
        let view =
            ViewMatrix::from_feature_rows("mRNA", &rows, ids(&["g1", "g2"]), ids(&["a", "b", "c"]))
                .unwrap();

        assert_eq!(view.n_samples(), 3);
        assert_eq!(view.n_features(), 2);
        assert_eq!(view.get("b", "g1"), Some(2.0));
        assert_eq!(view.get("c", "g2"), Some(6.0));
        assert_eq!(view.get("b", "g2"), None);
        assert_eq!(view.n_missing(), 1);
    }

    #[test]
    fn test_duplicate_sample_rejected() {
        let data = DMatrix::zeros(2, 1);
        let err = ViewMatrix::new("A", data, ids(&["s1", "s1"]), ids(&["f1"])).unwrap_err();
        assert!(matches!(err, MofaError::DuplicateId { kind, .. } if kind == "sample"));
    }

    #[test]
    fn test_dimension_mismatch() {
        let data = DMatrix::zeros(2, 2);
        let err = ViewMatrix::new("A", data, ids(&["s1", "s2"]), ids(&["f1"])).unwrap_err();
        assert!(matches!(err, MofaError::DimensionMismatch { expected: 2, actual: 1 }));
    }

    #[test]
    fn test_to_csv_writes_empty_for_missing() {
        let data = DMatrix::from_row_slice(2, 2, &[1.0, f64::NAN, 3.5, 4.0]);
        let view = ViewMatrix::new("A", data, ids(&["s1", "s2"]), ids(&["f1", "f2"])).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("A.csv");
        view.to_csv(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "sample,f1,f2\ns1,1,\ns2,3.5,4\n");
    }
}
