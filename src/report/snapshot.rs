//! What the engine reports back about a fitted model.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Variance explained by one factor in one view and group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct R2Entry {
    pub view: String,
    pub group: String,
    pub factor: String,
    pub r2: f64,
}

/// Introspection result for a fitted model artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSnapshot {
    /// Human-readable model description from the engine.
    pub summary: String,
    pub n_factors: usize,
    pub views: Vec<String>,
    pub groups: Vec<String>,
    pub n_samples: usize,
    /// Sample metadata columns available for colouring.
    pub metadata_columns: Vec<String>,
    /// Variance explained, one entry per (view, group, factor).
    pub r2: Vec<R2Entry>,
    /// Whether factors were smoothed along a covariate.
    #[serde(default)]
    pub smooth: bool,
}

/// Total variance explained in one view, summed over factors and groups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewVariance {
    #[serde(rename = "View")]
    pub view: String,
    #[serde(rename = "R2")]
    pub r2: f64,
    #[serde(rename = "Factors")]
    pub factors: String,
}

impl ModelSnapshot {
    /// Label for the factor count, e.g. `n_factors = 15`.
    pub fn factors_label(&self) -> String {
        format!("n_factors = {}", self.n_factors)
    }

    /// Name the engine gives the factor at a zero-based index.
    pub fn factor_name(index: usize) -> String {
        format!("Factor{}", index + 1)
    }

    /// Per-view variance explained, sorted by view name.
    pub fn variance_by_view(&self) -> Vec<ViewVariance> {
        let mut totals: BTreeMap<&str, f64> = BTreeMap::new();
        for entry in &self.r2 {
            *totals.entry(entry.view.as_str()).or_insert(0.0) += entry.r2;
        }
        let label = self.factors_label();
        totals
            .into_iter()
            .map(|(view, r2)| ViewVariance {
                view: view.to_string(),
                r2,
                factors: label.clone(),
            })
            .collect()
    }

    pub fn has_metadata_column(&self, column: &str) -> bool {
        self.metadata_columns.iter().any(|c| c == column)
    }

    pub fn has_view(&self, view: &str) -> bool {
        self.views.iter().any(|v| v == view)
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_variance_by_view_sums_and_sorts() {
        let var = cll_snapshot().variance_by_view();
        let views: Vec<&str> = var.iter().map(|v| v.view.as_str()).collect();
        assert_eq!(views, vec!["drugs", "mRNA", "methylation", "mutations"]);
        assert_relative_eq!(var[1].r2, 12.5);
        assert!(var.iter().all(|v| v.factors == "n_factors = 15"));
    }

    #[test]
    fn test_variance_sums_over_groups() {
        let var = evodevo_snapshot().variance_by_view();
        assert_eq!(var.len(), 2);
        assert_relative_eq!(var[0].r2, 35.0);
    }

    #[test]
    fn test_snapshot_json_defaults_smooth() {
        let json = r#"{"summary":"m","n_factors":2,"views":["A"],"groups":["g"],
            "n_samples":3,"metadata_columns":[],"r2":[]}"#;
        let snap: ModelSnapshot = serde_json::from_str(json).unwrap();
        assert!(!snap.smooth);
        assert_eq!(ModelSnapshot::factor_name(0), "Factor1");
    }
}
