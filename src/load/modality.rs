//! One-file-per-modality input: `<dir>/<modality>.csv` plus a sample sheet.

use crate::data::metadata::is_missing_token;
use crate::data::{SampleMetadata, ViewMatrix};
use crate::error::{MofaError, Result};
use std::fs::File;
use std::path::Path;
use tracing::{debug, info};

/// Modalities of the CLL multi-omics study.
pub const CLL_MODALITIES: [&str; 4] = ["mRNA", "methylation", "mutations", "drugs"];

/// Key column of the tab-delimited sample sheet.
pub const SAMPLE_KEY: &str = "sample";

/// Read one modality file into a samples × features view.
///
/// The file stores features as rows and samples as columns: the header
/// holds a feature-id label followed by sample ids, each subsequent row a
/// feature id followed by one value per sample.
pub fn read_modality<P: AsRef<Path>>(path: P, name: &str) -> Result<ViewMatrix> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(MofaError::MissingInput(path.to_path_buf()));
    }
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(File::open(path)?);

    let header = rdr.headers()?.clone();
    if header.len() < 2 {
        return Err(MofaError::EmptyData(format!(
            "Modality '{}' must have at least one sample column",
            name
        )));
    }
    let sample_ids: Vec<String> = header.iter().skip(1).map(|s| s.trim().to_string()).collect();
    let n_samples = sample_ids.len();

    let mut feature_ids = Vec::new();
    let mut rows = Vec::new();
    for (row_idx, record) in rdr.records().enumerate() {
        let record = record?;
        let Some(feature) = record.get(0) else {
            continue;
        };
        if record.len() != n_samples + 1 {
            return Err(MofaError::DimensionMismatch {
                expected: n_samples + 1,
                actual: record.len(),
            });
        }

        let mut values = Vec::with_capacity(n_samples);
        for (col_idx, raw) in record.iter().skip(1).enumerate() {
            let raw = raw.trim();
            let v = if is_missing_token(raw) {
                f64::NAN
            } else {
                raw.parse::<f64>().map_err(|_| MofaError::InvalidValue {
                    value: raw.to_string(),
                    row: row_idx,
                    col: col_idx,
                })?
            };
            values.push(v);
        }
        feature_ids.push(feature.trim().to_string());
        rows.push(values);
    }

    if feature_ids.is_empty() {
        return Err(MofaError::EmptyData(format!("No features in modality '{}'", name)));
    }

    debug!(
        "Read modality '{}': {} features x {} samples",
        name,
        feature_ids.len(),
        n_samples
    );
    ViewMatrix::from_feature_rows(name, &rows, feature_ids, sample_ids)
}

/// Read `<dir>/<name>.csv` for every modality name, in the given order.
pub fn load_modalities<P: AsRef<Path>, S: AsRef<str>>(dir: P, names: &[S]) -> Result<Vec<ViewMatrix>> {
    let dir = dir.as_ref();
    let views = names
        .iter()
        .map(|name| {
            let name = name.as_ref();
            read_modality(dir.join(format!("{}.csv", name)), name)
        })
        .collect::<Result<Vec<_>>>()?;
    info!("Loaded {} modalities from {}", views.len(), dir.display());
    Ok(views)
}

/// Load the tab-delimited sample sheet keyed by the `sample` column.
pub fn load_sample_metadata<P: AsRef<Path>>(path: P) -> Result<SampleMetadata> {
    SampleMetadata::from_tsv(path, SAMPLE_KEY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, text: &str) {
        fs::write(dir.path().join(name), text).unwrap();
    }

    #[test]
    fn test_read_modality_transposes() {
        let dir = TempDir::new().unwrap();
        write(&dir, "mRNA.csv", ",H045,H109,H024\nENSG1,1.5,NA,0.2\nENSG2,3,4,5\n");

        let view = read_modality(dir.path().join("mRNA.csv"), "mRNA").unwrap();
        assert_eq!(view.name(), "mRNA");
        assert_eq!(view.sample_ids(), &["H045", "H109", "H024"]);
        assert_eq!(view.feature_ids(), &["ENSG1", "ENSG2"]);
        assert_eq!(view.get("H024", "ENSG1"), Some(0.2));
        assert_eq!(view.get("H109", "ENSG1"), None);
    }

    #[test]
    fn test_missing_modality_file() {
        let dir = TempDir::new().unwrap();
        write(&dir, "mRNA.csv", ",S1\nf1,1\n");

        let err = load_modalities(dir.path(), &["mRNA", "drugs"]).unwrap_err();
        assert!(matches!(err, MofaError::MissingInput(p) if p.ends_with("drugs.csv")));
    }

    #[test]
    fn test_malformed_value() {
        let dir = TempDir::new().unwrap();
        write(&dir, "drugs.csv", ",S1,S2\nD_001,0.9,abc\n");

        let err = read_modality(dir.path().join("drugs.csv"), "drugs").unwrap_err();
        assert!(matches!(err, MofaError::InvalidValue { row: 0, col: 1, .. }));
    }

    #[test]
    fn test_ragged_row() {
        let dir = TempDir::new().unwrap();
        write(&dir, "drugs.csv", ",S1,S2\nD_001,0.9\n");

        let err = read_modality(dir.path().join("drugs.csv"), "drugs").unwrap_err();
        assert!(matches!(err, MofaError::DimensionMismatch { expected: 3, actual: 2 }));
    }

    #[test]
    fn test_load_sample_metadata_requires_key() {
        let dir = TempDir::new().unwrap();
        write(&dir, "meta.txt", "patient\tGender\nH045\tm\n");

        let err = load_sample_metadata(dir.path().join("meta.txt")).unwrap_err();
        assert!(matches!(err, MofaError::MissingColumn(c) if c == "sample"));
    }
}
