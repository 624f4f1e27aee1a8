//! Report layout: which figures to draw and how.

use crate::error::{MofaError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Kind of model being reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelVariant {
    Mofa,
    Mefisto,
}

/// Samples in a two-factor plane, coloured by metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorPlot {
    pub file: String,
    /// Zero-based factor index on the x axis.
    pub x: usize,
    /// Zero-based factor index on the y axis.
    pub y: usize,
    /// Metadata columns to colour by; one panel per column.
    pub color: Vec<String>,
    #[serde(default = "default_point_size")]
    pub size: f64,
    #[serde(default)]
    pub palette: Option<String>,
}

/// Top feature weights of one factor across views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightPlot {
    pub file: String,
    /// Views to include; all model views when empty.
    #[serde(default)]
    pub views: Vec<String>,
    /// Zero-based factor index.
    pub factor: usize,
    #[serde(default = "default_ncols")]
    pub ncols: usize,
}

/// Scatter of two sample-level variables (metadata columns or `FactorN`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CovariatePlot {
    pub file: String,
    pub x: String,
    pub y: String,
    pub color: String,
    #[serde(default = "default_point_size")]
    pub size: f64,
}

/// Diagnostics available only for smoothed (MEFISTO) models.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemporalPlots {
    pub interpolated_file: String,
    pub smoothness_file: String,
    pub sharedness_file: String,
    #[serde(default = "default_interpolation_ncols")]
    pub ncols: usize,
    #[serde(default = "default_interpolation_size")]
    pub size: f64,
}

/// Full report layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportConfig {
    pub variant: ModelVariant,
    #[serde(default = "default_dpi")]
    pub dpi: u32,
    /// Variance-explained heatmap file and colour-scale cap.
    #[serde(default)]
    pub r2_file: Option<String>,
    #[serde(default)]
    pub r2_vmax: Option<f64>,
    /// Per-view variance bar plot file.
    #[serde(default)]
    pub variance_barplot_file: Option<String>,
    #[serde(default)]
    pub factor_plots: Vec<FactorPlot>,
    #[serde(default)]
    pub weight_plots: Vec<WeightPlot>,
    #[serde(default)]
    pub covariate_plots: Vec<CovariatePlot>,
    #[serde(default)]
    pub temporal: Option<TemporalPlots>,
    /// Categorical relabelling applied to metadata before plotting,
    /// column -> (stored value -> label).
    #[serde(default)]
    pub recode: BTreeMap<String, BTreeMap<String, String>>,
}

fn default_dpi() -> u32 {
    300
}

fn default_point_size() -> f64 {
    20.0
}

fn default_ncols() -> usize {
    3
}

fn default_interpolation_ncols() -> usize {
    5
}

fn default_interpolation_size() -> f64 {
    70.0
}

impl ReportConfig {
    /// Figures for the CLL MOFA+ model.
    pub fn mofa() -> Self {
        let mut ighv = BTreeMap::new();
        ighv.insert("1.0".to_string(), "mutated".to_string());
        ighv.insert("0.0".to_string(), "unmutated".to_string());
        let mut recode = BTreeMap::new();
        recode.insert("IGHV".to_string(), ighv);

        Self {
            variant: ModelVariant::Mofa,
            dpi: default_dpi(),
            r2_file: Some("r2_by_view.png".to_string()),
            r2_vmax: Some(15.0),
            variance_barplot_file: Some("r2_barplot.png".to_string()),
            factor_plots: vec![
                FactorPlot {
                    file: "factors_F1_F2_Gender.png".to_string(),
                    x: 0,
                    y: 1,
                    color: vec!["Gender".to_string()],
                    size: 20.0,
                    palette: None,
                },
                FactorPlot {
                    file: "F1_ighv.png".to_string(),
                    x: 0,
                    y: 1,
                    color: vec!["IGHV".to_string()],
                    size: 20.0,
                    palette: None,
                },
                FactorPlot {
                    file: "F1_ighv_tri12.png".to_string(),
                    x: 0,
                    y: 2,
                    color: vec!["IGHV".to_string(), "trisomy12".to_string()],
                    size: 20.0,
                    palette: Some("Set2".to_string()),
                },
            ],
            weight_plots: vec![WeightPlot {
                file: "F1_weights.png".to_string(),
                views: vec![
                    "mRNA".to_string(),
                    "mutations".to_string(),
                    "drugs".to_string(),
                ],
                factor: 0,
                ncols: 3,
            }],
            covariate_plots: Vec::new(),
            temporal: None,
            recode,
        }
    }

    /// Figures for the evo-devo MEFISTO model.
    pub fn mefisto() -> Self {
        Self {
            variant: ModelVariant::Mefisto,
            dpi: default_dpi(),
            r2_file: Some("r2_by_view.png".to_string()),
            r2_vmax: None,
            variance_barplot_file: None,
            factor_plots: vec![
                FactorPlot {
                    file: "mefisto_factor_species.png".to_string(),
                    x: 0,
                    y: 1,
                    color: vec!["species".to_string()],
                    size: 250.0,
                    palette: None,
                },
                FactorPlot {
                    file: "mefisto_factor_time.png".to_string(),
                    x: 0,
                    y: 1,
                    color: vec!["time_warped".to_string()],
                    size: 250.0,
                    palette: None,
                },
            ],
            weight_plots: Vec::new(),
            covariate_plots: vec![
                CovariatePlot {
                    file: "mefisto_time_warping.png".to_string(),
                    x: "time".to_string(),
                    y: "time_warped".to_string(),
                    color: "species".to_string(),
                    size: 200.0,
                },
                CovariatePlot {
                    file: "mefisto_factor1_time.png".to_string(),
                    x: "time_warped".to_string(),
                    y: "Factor1".to_string(),
                    color: "species".to_string(),
                    size: 200.0,
                },
            ],
            temporal: Some(TemporalPlots {
                interpolated_file: "mefisto_interpolated.png".to_string(),
                smoothness_file: "mefisto_smoothness.png".to_string(),
                sharedness_file: "mefisto_sharedness.png".to_string(),
                ncols: default_interpolation_ncols(),
                size: default_interpolation_size(),
            }),
            recode: BTreeMap::new(),
        }
    }

    /// Preset for a model variant.
    pub fn for_variant(variant: ModelVariant) -> Self {
        match variant {
            ModelVariant::Mofa => Self::mofa(),
            ModelVariant::Mefisto => Self::mefisto(),
        }
    }

    /// Fail unless this layout was written for `variant`.
    pub fn check_variant(&self, variant: ModelVariant) -> Result<()> {
        if self.variant == variant {
            Ok(())
        } else {
            Err(MofaError::InvalidParameter(format!(
                "report layout is for {:?} models, not {:?}",
                self.variant, variant
            )))
        }
    }

    /// Load from YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(MofaError::from)
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
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yaml_round_trip() {
        for config in [ReportConfig::mofa(), ReportConfig::mefisto()] {
            let yaml = config.to_yaml().unwrap();
            assert_eq!(ReportConfig::from_yaml(&yaml).unwrap(), config);
        }
    }

    #[test]
    fn test_variant_mismatch_rejected() {
        let mefisto = ReportConfig::from_yaml(&ReportConfig::mefisto().to_yaml().unwrap()).unwrap();
        assert!(mefisto.check_variant(ModelVariant::Mefisto).is_ok());
        assert!(matches!(
            mefisto.check_variant(ModelVariant::Mofa),
            Err(MofaError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_minimal_yaml_uses_defaults() {
        let yaml = "variant: mofa\nfactor_plots:\n  - file: f.png\n    x: 0\n    y: 1\n    color: [Gender]\n";
        let config = ReportConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.dpi, 300);
        assert_eq!(config.factor_plots[0].size, 20.0);
        assert!(config.r2_file.is_none());
        assert!(config.temporal.is_none());
    }

    #[test]
    fn test_output_file_names_are_distinct() {
        for config in [ReportConfig::mofa(), ReportConfig::mefisto()] {
            let mut files: Vec<&str> = config
                .factor_plots
                .iter()
                .map(|p| p.file.as_str())
                .chain(config.covariate_plots.iter().map(|p| p.file.as_str()))
                .chain(config.weight_plots.iter().map(|p| p.file.as_str()))
                .collect();
            let n = files.len();
            files.sort();
            files.dedup();
            assert_eq!(files.len(), n);
        }
    }
}
