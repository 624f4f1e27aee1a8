//! Text and table outputs written directly by the reporter.

use crate::error::Result;
use crate::report::snapshot::ViewVariance;
use std::fs;
use std::path::Path;

/// Write the model summary followed by a newline, replacing any existing file.
pub fn write_summary<P: AsRef<Path>>(path: P, summary: &str) -> Result<()> {
    fs::write(path, format!("{}\n", summary.trim_end_matches('\n')))?;
    Ok(())
}

/// Write the per-view variance table as `View,R2,Factors`.
pub fn write_variance_csv<P: AsRef<Path>>(path: P, rows: &[ViewVariance]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    if rows.is_empty() {
        wtr.write_record(["View", "R2", "Factors"])?;
    }
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_variance_csv_layout() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("variance.csv");
        let rows = vec![
            ViewVariance {
                view: "drugs".to_string(),
                r2: 4.0,
                factors: "n_factors = 15".to_string(),
            },
            ViewVariance {
                view: "mRNA".to_string(),
                r2: 12.5,
                factors: "n_factors = 15".to_string(),
            },
        ];
        write_variance_csv(&path, &rows).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(
            text,
            "View,R2,Factors\ndrugs,4.0,n_factors = 15\nmRNA,12.5,n_factors = 15\n"
        );
    }

    #[test]
    fn test_empty_variance_has_header() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("variance.csv");
        write_variance_csv(&path, &[]).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "View,R2,Factors\n");
    }

    #[test]
    fn test_summary_single_trailing_newline() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("model_summary.txt");
        write_summary(&path, "MOFA+ model\n").unwrap();
        write_summary(&path, "MOFA+ model\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "MOFA+ model\n");
    }
}
