//! Turning a report layout into concrete, validated figure requests.

use crate::error::{MofaError, Result};
use crate::report::config::ReportConfig;
use crate::report::snapshot::{ModelSnapshot, ViewVariance};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// One figure the engine must render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlotSpec {
    VarianceHeatmap {
        file: String,
        vmax: Option<f64>,
    },
    VarianceBar {
        file: String,
        rows: Vec<ViewVariance>,
    },
    Factors {
        file: String,
        x: usize,
        y: usize,
        color: Vec<String>,
        size: f64,
        palette: Option<String>,
    },
    Weights {
        file: String,
        views: Vec<String>,
        factor: usize,
        ncols: usize,
    },
    Covariates {
        file: String,
        x: String,
        y: String,
        color: String,
        size: f64,
    },
    Interpolated {
        file: String,
        ncols: usize,
        size: f64,
    },
    Smoothness {
        file: String,
    },
    Sharedness {
        file: String,
    },
}

impl PlotSpec {
    /// Output file name, relative to the report directory.
    pub fn file(&self) -> &str {
        match self {
            Self::VarianceHeatmap { file, .. }
            | Self::VarianceBar { file, .. }
            | Self::Factors { file, .. }
            | Self::Weights { file, .. }
            | Self::Covariates { file, .. }
            | Self::Interpolated { file, .. }
            | Self::Smoothness { file }
            | Self::Sharedness { file } => file,
        }
    }
}

/// Everything the engine needs to draw a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderJob {
    pub plots: Vec<PlotSpec>,
    pub dpi: u32,
    pub recode: BTreeMap<String, BTreeMap<String, String>>,
}

/// Validate `config` against a model and list the figures to draw.
///
/// Nothing is written here; errors surface before any output exists.
pub fn plan_report(snapshot: &ModelSnapshot, config: &ReportConfig) -> Result<RenderJob> {
    let mut plots = Vec::new();

    for column in config.recode.keys() {
        require_column(snapshot, column)?;
    }

    if let Some(file) = &config.r2_file {
        plots.push(PlotSpec::VarianceHeatmap {
            file: file.clone(),
            vmax: config.r2_vmax,
        });
    }
    if let Some(file) = &config.variance_barplot_file {
        plots.push(PlotSpec::VarianceBar {
            file: file.clone(),
            rows: snapshot.variance_by_view(),
        });
    }

    for fp in &config.factor_plots {
        require_factor(snapshot, fp.x)?;
        require_factor(snapshot, fp.y)?;
        if fp.color.is_empty() {
            return Err(MofaError::InvalidParameter(format!(
                "factor plot '{}' has no colour column",
                fp.file
            )));
        }
        for column in &fp.color {
            require_column(snapshot, column)?;
        }
        plots.push(PlotSpec::Factors {
            file: fp.file.clone(),
            x: fp.x,
            y: fp.y,
            color: fp.color.clone(),
            size: fp.size,
            palette: fp.palette.clone(),
        });
    }

    for wp in &config.weight_plots {
        require_factor(snapshot, wp.factor)?;
        let views = if wp.views.is_empty() {
            snapshot.views.clone()
        } else {
            for view in &wp.views {
                if !snapshot.has_view(view) {
                    return Err(MofaError::EmptyData(format!(
                        "view '{}' is not part of the model",
                        view
                    )));
                }
            }
            wp.views.clone()
        };
        plots.push(PlotSpec::Weights {
            file: wp.file.clone(),
            views,
            factor: wp.factor,
            ncols: wp.ncols.max(1),
        });
    }

    for cp in &config.covariate_plots {
        for variable in [&cp.x, &cp.y] {
            require_variable(snapshot, variable)?;
        }
        require_column(snapshot, &cp.color)?;
        plots.push(PlotSpec::Covariates {
            file: cp.file.clone(),
            x: cp.x.clone(),
            y: cp.y.clone(),
            color: cp.color.clone(),
            size: cp.size,
        });
    }

    if let Some(temporal) = &config.temporal {
        if !snapshot.smooth {
            return Err(MofaError::InvalidModel(
                "temporal diagnostics need a smoothed (MEFISTO) model".to_string(),
            ));
        }
        plots.push(PlotSpec::Interpolated {
            file: temporal.interpolated_file.clone(),
            ncols: temporal.ncols.max(1),
            size: temporal.size,
        });
        plots.push(PlotSpec::Smoothness {
            file: temporal.smoothness_file.clone(),
        });
        plots.push(PlotSpec::Sharedness {
            file: temporal.sharedness_file.clone(),
        });
    }

    let mut files = HashSet::new();
    for plot in &plots {
        if !files.insert(plot.file()) {
            return Err(MofaError::InvalidParameter(format!(
                "figure file '{}' requested twice",
                plot.file()
            )));
        }
    }

    Ok(RenderJob {
        plots,
        dpi: config.dpi,
        recode: config.recode.clone(),
    })
}

fn require_column(snapshot: &ModelSnapshot, column: &str) -> Result<()> {
    if snapshot.has_metadata_column(column) {
        Ok(())
    } else {
        Err(MofaError::MissingColumn(column.to_string()))
    }
}

fn require_factor(snapshot: &ModelSnapshot, index: usize) -> Result<()> {
    if index < snapshot.n_factors {
        Ok(())
    } else {
        Err(MofaError::InvalidModel(format!(
            "{} requested but the model has {} factors",
            ModelSnapshot::factor_name(index),
            snapshot.n_factors
        )))
    }
}

// A sample-level variable is a metadata column or a factor name.
fn require_variable(snapshot: &ModelSnapshot, variable: &str) -> Result<()> {
    if let Some(n) = variable.strip_prefix("Factor").and_then(|n| n.parse::<usize>().ok()) {
        if n == 0 {
            return Err(MofaError::InvalidParameter(format!(
                "factor names start at Factor1, got '{}'",
                variable
            )));
        }
        return require_factor(snapshot, n - 1);
    }
    require_column(snapshot, variable)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::snapshot::fixtures::{cll_snapshot, evodevo_snapshot};

    #[test]
    fn test_mofa_plan_file_set() {
        let job = plan_report(&cll_snapshot(), &ReportConfig::mofa()).unwrap();
        let files: Vec<&str> = job.plots.iter().map(|p| p.file()).collect();
        assert_eq!(
            files,
            vec![
                "r2_by_view.png",
                "r2_barplot.png",
                "factors_F1_F2_Gender.png",
                "F1_ighv.png",
                "F1_ighv_tri12.png",
                "F1_weights.png",
            ]
        );
        assert_eq!(job.dpi, 300);
        assert!(job.recode.contains_key("IGHV"));
    }

    #[test]
    fn test_mefisto_plan_includes_temporal() {
        let job = plan_report(&evodevo_snapshot(), &ReportConfig::mefisto()).unwrap();
        assert!(job
            .plots
            .iter()
            .any(|p| matches!(p, PlotSpec::Smoothness { .. })));
        assert_eq!(job.plots.len(), 8);
    }

    #[test]
    fn test_missing_colour_column() {
        let mut snap = cll_snapshot();
        snap.metadata_columns.retain(|c| c != "Gender");
        let err = plan_report(&snap, &ReportConfig::mofa()).unwrap_err();
        assert!(matches!(err, MofaError::MissingColumn(c) if c == "Gender"));
    }

    #[test]
    fn test_temporal_needs_smooth_model() {
        let mut snap = evodevo_snapshot();
        snap.smooth = false;
        let err = plan_report(&snap, &ReportConfig::mefisto()).unwrap_err();
        assert!(matches!(err, MofaError::InvalidModel(_)));
    }

    #[test]
    fn test_factor_out_of_range() {
        let mut snap = cll_snapshot();
        snap.n_factors = 2;
        // F1_ighv_tri12 plots Factor1 against Factor3
        let err = plan_report(&snap, &ReportConfig::mofa()).unwrap_err();
        assert!(matches!(err, MofaError::InvalidModel(_)));
    }

    #[test]
    fn test_empty_weight_views_means_all() {
        let mut config = ReportConfig::mofa();
        config.weight_plots[0].views.clear();
        let job = plan_report(&cll_snapshot(), &config).unwrap();
        let weights = job
            .plots
            .iter()
            .find_map(|p| match p {
                PlotSpec::Weights { views, .. } => Some(views.clone()),
                _ => None,
            })
            .unwrap();
        assert_eq!(weights.len(), 4);
    }

    #[test]
    fn test_unknown_weight_view() {
        let mut config = ReportConfig::mofa();
        config.weight_plots[0].views = vec!["proteomics".to_string()];
        assert!(plan_report(&cll_snapshot(), &config).is_err());
    }

    #[test]
    fn test_plot_spec_json_is_tagged() {
        let spec = PlotSpec::Smoothness {
            file: "s.png".to_string(),
        };
        let json = serde_json::to_string(&spec).unwrap();
        assert_eq!(json, r#"{"kind":"smoothness","file":"s.png"}"#);
    }
}
