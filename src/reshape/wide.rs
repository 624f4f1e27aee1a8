//! Long-to-wide pivoting.
//!
//! A long table holds one row per (sample, feature, view). Pivoting a view
//! yields a samples × features matrix with both axes sorted, the same shape
//! a dataframe pivot produces. The per-sample covariates (`time`, `group`)
//! are pulled out separately into a metadata table.

use crate::data::{LongTable, SampleMetadata, Variable, VariableType, ViewMatrix};
use crate::error::{MofaError, Result};
use nalgebra::DMatrix;
use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::debug;

/// One non-missing cell of a view, as produced by [`flatten_views`].
#[derive(Debug, Clone, PartialEq)]
pub struct LongCell {
    pub view: String,
    pub sample: String,
    pub feature: String,
    pub value: f64,
}

/// Pivot the rows of one view into a samples × features matrix.
///
/// Fails with [`MofaError::DuplicateCell`] when a (sample, feature) pair
/// occurs twice within the view. Absent cells are NaN.
pub fn pivot_view(table: &LongTable, view: &str) -> Result<ViewMatrix> {
    let samples: BTreeSet<&str> = table.view_records(view).map(|r| r.sample.as_str()).collect();
    if samples.is_empty() {
        return Err(MofaError::EmptyData(format!("No rows for view '{}'", view)));
    }
    let features: BTreeSet<&str> = table.view_records(view).map(|r| r.feature.as_str()).collect();

    let sample_pos: HashMap<&str, usize> = samples.iter().enumerate().map(|(i, s)| (*s, i)).collect();
    let feature_pos: HashMap<&str, usize> =
        features.iter().enumerate().map(|(i, f)| (*f, i)).collect();

    let mut data = DMatrix::from_element(samples.len(), features.len(), f64::NAN);
    let mut filled: HashSet<(usize, usize)> = HashSet::new();
    for r in table.view_records(view) {
        let cell = (sample_pos[r.sample.as_str()], feature_pos[r.feature.as_str()]);
        if !filled.insert(cell) {
            return Err(MofaError::DuplicateCell {
                view: view.to_string(),
                sample: r.sample.clone(),
                feature: r.feature.clone(),
            });
        }
        data[cell] = r.value;
    }

    debug!(
        "Pivoted view '{}': {} samples x {} features",
        view,
        samples.len(),
        features.len()
    );
    ViewMatrix::new(
        view,
        data,
        samples.into_iter().map(String::from).collect(),
        features.into_iter().map(String::from).collect(),
    )
}

/// Pivot every view of the table, in first-appearance order of view names.
pub fn pivot_views(table: &LongTable) -> Result<Vec<ViewMatrix>> {
    table.views().iter().map(|v| pivot_view(table, v)).collect()
}

/// Extract one metadata row per sample from the `time` and `group` columns.
///
/// The group column is stored under `group_label`. A sample that appears
/// with two different times or groups fails with
/// [`MofaError::ConflictingMetadata`].
pub fn extract_sample_metadata(table: &LongTable, group_label: &str) -> Result<SampleMetadata> {
    if group_label == "time" {
        return Err(MofaError::InvalidParameter(
            "group label must differ from 'time'".to_string(),
        ));
    }

    let mut order: Vec<&str> = Vec::new();
    let mut seen: HashMap<&str, (f64, &str)> = HashMap::new();
    for r in table.iter() {
        match seen.get(r.sample.as_str()) {
            None => {
                seen.insert(r.sample.as_str(), (r.time, r.group.as_str()));
                order.push(r.sample.as_str());
            }
            Some(&(time, group)) => {
                if !same_time(time, r.time) {
                    return Err(MofaError::ConflictingMetadata {
                        sample: r.sample.clone(),
                        field: "time".to_string(),
                        first: time.to_string(),
                        second: r.time.to_string(),
                    });
                }
                if group != r.group {
                    return Err(MofaError::ConflictingMetadata {
                        sample: r.sample.clone(),
                        field: group_label.to_string(),
                        first: group.to_string(),
                        second: r.group.clone(),
                    });
                }
            }
        }
    }

    let mut meta = SampleMetadata::with_columns(&[
        ("time", VariableType::Continuous),
        (group_label, VariableType::Categorical),
    ]);
    for sample in order {
        let (time, group) = seen[sample];
        let time = if time.is_nan() {
            Variable::Missing
        } else {
            Variable::Continuous(time)
        };
        let group = if group.is_empty() {
            Variable::Missing
        } else {
            Variable::Categorical(group.to_string())
        };
        meta.push_sample(
            sample,
            vec![("time".to_string(), time), (group_label.to_string(), group)],
        )?;
    }
    Ok(meta)
}

/// Flatten views back to long cells, skipping missing values.
pub fn flatten_views(views: &[ViewMatrix]) -> Vec<LongCell> {
    let mut cells = Vec::new();
    for view in views {
        for (row, sample) in view.sample_ids().iter().enumerate() {
            for (col, feature) in view.feature_ids().iter().enumerate() {
                let value = view.value(row, col);
                if value.is_nan() {
                    continue;
                }
                cells.push(LongCell {
                    view: view.name().to_string(),
                    sample: sample.clone(),
                    feature: feature.clone(),
                    value,
                });
            }
        }
    }
    cells
}

fn same_time(a: f64, b: f64) -> bool {
    (a.is_nan() && b.is_nan()) || a == b
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::LongRecord;

    fn table(rows: &[(&str, &str, &str, f64, f64, &str)]) -> LongTable {
        LongTable::new(
            rows.iter()
                .map(|(s, f, v, x, t, g)| LongRecord::new(s, f, v, *x, *t, g))
                .collect(),
        )
    }

    #[test]
    fn test_pivot_sorts_axes_and_fills_missing() {
        let t = table(&[
            ("s2", "g2", "A", 4.0, 0.0, "x"),
            ("s1", "g1", "A", 1.0, 0.0, "x"),
            ("s2", "g1", "A", 3.0, 0.0, "x"),
        ]);
        let view = pivot_view(&t, "A").unwrap();

        assert_eq!(view.sample_ids(), &["s1", "s2"]);
        assert_eq!(view.feature_ids(), &["g1", "g2"]);
        assert_eq!(view.get("s2", "g1"), Some(3.0));
        assert_eq!(view.get("s1", "g2"), None);
        assert!(view.value(0, 1).is_nan());
    }

    #[test]
    fn test_pivot_duplicate_cell_fails() {
        let t = table(&[
            ("s1", "g1", "A", 1.0, 0.0, "x"),
            ("s1", "g1", "A", 2.0, 0.0, "x"),
        ]);
        let err = pivot_view(&t, "A").unwrap_err();
        assert!(matches!(
            err,
            MofaError::DuplicateCell { ref view, ref sample, ref feature }
                if view == "A" && sample == "s1" && feature == "g1"
        ));
    }

    #[test]
    fn test_same_pair_in_different_views_is_allowed() {
        let t = table(&[
            ("s1", "g1", "A", 1.0, 0.0, "x"),
            ("s1", "g1", "B", 2.0, 0.0, "x"),
        ]);
        let views = pivot_views(&t).unwrap();
        assert_eq!(views.len(), 2);
        assert_eq!(views[1].get("s1", "g1"), Some(2.0));
    }

    #[test]
    fn test_unknown_view() {
        let t = table(&[("s1", "g1", "A", 1.0, 0.0, "x")]);
        assert!(matches!(pivot_view(&t, "Z"), Err(MofaError::EmptyData(_))));
    }

    #[test]
    fn test_metadata_conflicting_time() {
        let t = table(&[
            ("s1", "g1", "A", 1.0, 0.0, "x"),
            ("s1", "g2", "A", 1.0, 1.0, "x"),
        ]);
        let err = extract_sample_metadata(&t, "species").unwrap_err();
        assert!(matches!(err, MofaError::ConflictingMetadata { ref field, .. } if field == "time"));
    }

    #[test]
    fn test_metadata_conflicting_group() {
        let t = table(&[
            ("s1", "g1", "A", 1.0, 0.0, "Mouse"),
            ("s1", "g2", "B", 1.0, 0.0, "Human"),
        ]);
        let err = extract_sample_metadata(&t, "species").unwrap_err();
        assert!(
            matches!(err, MofaError::ConflictingMetadata { ref field, .. } if field == "species")
        );
    }

    #[test]
    fn test_metadata_uses_group_label() {
        let t = table(&[
            ("s1", "g1", "A", 1.0, 2.0, "Mouse"),
            ("s1", "g2", "B", 1.0, 2.0, "Mouse"),
        ]);
        let meta = extract_sample_metadata(&t, "species").unwrap();
        assert_eq!(meta.column_names(), &["time", "species"]);
        assert_eq!(meta.get("s1", "time").unwrap().as_continuous(), Some(2.0));
        assert_eq!(meta.get("s1", "species").unwrap().as_categorical(), Some("Mouse"));
    }

    #[test]
    fn test_flatten_skips_missing() {
        let t = table(&[
            ("s1", "g1", "A", 1.0, 0.0, "x"),
            ("s2", "g2", "A", 2.0, 0.0, "x"),
        ]);
        let cells = flatten_views(&pivot_views(&t).unwrap());
        assert_eq!(cells.len(), 2);
    }
}
