//! mofa - MOFA+/MEFISTO pipeline CLI
//!
//! Command-line interface for preparing multi-omics data, fitting factor
//! models through the external engine, and reporting on fitted models.

use clap::{Parser, Subcommand, ValueEnum};
use mofa_pipeline::archive::{default_destination, extract_archive};
use mofa_pipeline::engine::{FitConfig, PythonBackend, PYTHON_ENV};
use mofa_pipeline::error::{MofaError, Result};
use mofa_pipeline::report::{generate_report, ModelVariant, ReportConfig};
use mofa_pipeline::workflow::{
    MefistoWorkflow, MofaWorkflow, DEFAULT_INPUT_DIR, DEFAULT_LONG_TABLE, DEFAULT_MEFISTO_MODEL,
    DEFAULT_METADATA, DEFAULT_MOFA_MODEL, DEFAULT_RESULTS_DIR,
};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Which preset configuration `example-config` writes.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum ConfigKind {
    /// MOFA+ fit settings (CLL study)
    FitMofa,
    /// MEFISTO fit settings (evo-devo study)
    FitMefisto,
    /// Figures for a MOFA+ model
    ReportMofa,
    /// Figures for a MEFISTO model
    ReportMefisto,
}

/// MOFA+/MEFISTO multi-omics factor analysis
#[derive(Parser)]
#[command(name = "mofa")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log debug detail, including engine output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Unzip a data archive one directory above the tool's location
    Unzip {
        /// Path to the input ZIP file to be unzipped
        #[arg(short, long, default_value = "data.zip")]
        input: PathBuf,
    },

    /// Fit a MOFA+ model on one CSV per modality plus a sample sheet
    RunMofa {
        /// Path to the input data directory
        #[arg(short, long = "input_dir", visible_alias = "input-dir", default_value = DEFAULT_INPUT_DIR)]
        input_dir: PathBuf,

        /// Tab-delimited sample metadata keyed by 'sample'
        #[arg(short, long, default_value = DEFAULT_METADATA)]
        metadata: PathBuf,

        /// Output model file path
        #[arg(short, long, default_value = DEFAULT_MOFA_MODEL)]
        output: PathBuf,

        /// Fit configuration YAML (defaults to the MOFA+ preset)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Python interpreter with muon installed
        #[arg(long, env = PYTHON_ENV)]
        python: Option<PathBuf>,
    },

    /// Fit a MEFISTO model on a long-format table with time and group columns
    RunMefisto {
        /// Path to the input data directory
        #[arg(short, long = "input_dir", visible_alias = "input-dir", default_value = DEFAULT_INPUT_DIR)]
        input_dir: PathBuf,

        /// Long-format table inside the input directory
        #[arg(short, long, default_value = DEFAULT_LONG_TABLE)]
        table: String,

        /// Output model file path
        #[arg(short, long, default_value = DEFAULT_MEFISTO_MODEL)]
        output: PathBuf,

        /// Fit configuration YAML (defaults to the MEFISTO preset)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Python interpreter with muon installed
        #[arg(long, env = PYTHON_ENV)]
        python: Option<PathBuf>,
    },

    /// Write summary, variance table and figures for a MOFA+ model
    AnalyzeMofa {
        /// Path to the input model
        #[arg(short, long, default_value = DEFAULT_MOFA_MODEL)]
        input: PathBuf,

        /// Output directory path for results
        #[arg(short, long = "output_dir", visible_alias = "output-dir", default_value = DEFAULT_RESULTS_DIR)]
        output_dir: PathBuf,

        /// Report layout YAML (defaults to the MOFA+ preset)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Python interpreter with mofax installed
        #[arg(long, env = PYTHON_ENV)]
        python: Option<PathBuf>,
    },

    /// Write summary, variance table and temporal figures for a MEFISTO model
    AnalyzeMefisto {
        /// Path to the input model
        #[arg(short, long, default_value = DEFAULT_MEFISTO_MODEL)]
        input: PathBuf,

        /// Output directory path for results
        #[arg(short, long = "output_dir", visible_alias = "output-dir", default_value = DEFAULT_RESULTS_DIR)]
        output_dir: PathBuf,

        /// Report layout YAML (defaults to the MEFISTO preset)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Python interpreter with mofax installed
        #[arg(long, env = PYTHON_ENV)]
        python: Option<PathBuf>,
    },

    /// Write a preset configuration as YAML
    ExampleConfig {
        /// Preset to write
        #[arg(short, long, value_enum)]
        kind: ConfigKind,

        /// Output path for the YAML
        #[arg(short, long, default_value = "config.yaml")]
        output: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Unzip { input } => cmd_unzip(&input),

        Commands::RunMofa {
            input_dir,
            metadata,
            output,
            config,
            python,
        } => cmd_run_mofa(input_dir, metadata, output, config.as_deref(), python),

        Commands::RunMefisto {
            input_dir,
            table,
            output,
            config,
            python,
        } => cmd_run_mefisto(input_dir, table, output, config.as_deref(), python),

        Commands::AnalyzeMofa {
            input,
            output_dir,
            config,
            python,
        } => cmd_analyze(ModelVariant::Mofa, &input, &output_dir, config.as_deref(), python),

        Commands::AnalyzeMefisto {
            input,
            output_dir,
            config,
            python,
        } => cmd_analyze(ModelVariant::Mefisto, &input, &output_dir, config.as_deref(), python),

        Commands::ExampleConfig { kind, output } => cmd_example_config(kind, &output),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "mofa_pipeline=debug"
    } else {
        "mofa_pipeline=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn backend(python: Option<PathBuf>) -> PythonBackend {
    match python {
        Some(interpreter) => PythonBackend::with_interpreter(interpreter),
        None => PythonBackend::new(),
    }
}

fn load_fit_config(path: Option<&Path>, preset: FitConfig) -> Result<FitConfig> {
    match path {
        Some(path) => {
            eprintln!("Loading fit configuration from {:?}...", path);
            FitConfig::from_yaml_file(path)
        }
        None => Ok(preset),
    }
}

/// Unzip the bundled data archive
fn cmd_unzip(input: &Path) -> Result<()> {
    if !input.is_file() {
        return Err(MofaError::MissingInput(input.to_path_buf()));
    }
    let dest = default_destination()?;
    extract_archive(input, &dest)?;
    eprintln!("Extracted into {:?}", dest);
    Ok(())
}

/// Fit MOFA+ on per-modality CSV files
fn cmd_run_mofa(
    input_dir: PathBuf,
    metadata: PathBuf,
    output: PathBuf,
    config: Option<&Path>,
    python: Option<PathBuf>,
) -> Result<()> {
    let workflow = MofaWorkflow {
        input_dir,
        metadata,
        output,
        fit: load_fit_config(config, FitConfig::mofa())?,
        ..MofaWorkflow::default()
    };

    eprintln!("Loading data...");
    let dataset = workflow.prepare()?;
    eprintln!(
        "Loaded {} views x {} samples",
        dataset.n_views(),
        dataset.n_samples()
    );
    for view in dataset.views() {
        eprintln!(
            "  {}: {} samples x {} features",
            view.name(),
            view.n_samples(),
            view.n_features()
        );
    }

    eprintln!("Running MOFA+ ({} factors)...", workflow.fit.n_factors);
    mofa_pipeline::engine::fit_model(&backend(python), dataset, &workflow.fit, &workflow.output)?;
    eprintln!("Done! Model written to {:?}", workflow.output);
    Ok(())
}

/// Fit MEFISTO on a long-format table
fn cmd_run_mefisto(
    input_dir: PathBuf,
    table: String,
    output: PathBuf,
    config: Option<&Path>,
    python: Option<PathBuf>,
) -> Result<()> {
    let workflow = MefistoWorkflow {
        input_dir,
        table,
        output,
        fit: load_fit_config(config, FitConfig::mefisto())?,
        ..MefistoWorkflow::default()
    };

    eprintln!("Loading data...");
    let dataset = workflow.prepare()?;
    eprintln!(
        "Loaded {} views x {} samples",
        dataset.n_views(),
        dataset.n_samples()
    );

    eprintln!("Running MEFISTO ({} factors)...", workflow.fit.n_factors);
    mofa_pipeline::engine::fit_model(&backend(python), dataset, &workflow.fit, &workflow.output)?;
    eprintln!("Done! Model written to {:?}", workflow.output);
    Ok(())
}

/// Report on a fitted model
fn cmd_analyze(
    variant: ModelVariant,
    input: &Path,
    output_dir: &Path,
    config: Option<&Path>,
    python: Option<PathBuf>,
) -> Result<()> {
    let config = match config {
        Some(path) => {
            eprintln!("Loading report configuration from {:?}...", path);
            ReportConfig::from_yaml_file(path)?
        }
        None => ReportConfig::for_variant(variant),
    };
    config.check_variant(variant)?;

    let outputs = generate_report(&backend(python), input, output_dir, &config)?;
    eprintln!("Wrote {} files to {:?}:", outputs.files().len(), output_dir);
    for file in outputs.files() {
        eprintln!("  {}", file.display());
    }
    Ok(())
}

/// Write a preset configuration
fn cmd_example_config(kind: ConfigKind, output_path: &Path) -> Result<()> {
    let yaml = match kind {
        ConfigKind::FitMofa => FitConfig::mofa().to_yaml()?,
        ConfigKind::FitMefisto => FitConfig::mefisto().to_yaml()?,
        ConfigKind::ReportMofa => ReportConfig::mofa().to_yaml()?,
        ConfigKind::ReportMefisto => ReportConfig::mefisto().to_yaml()?,
    };

    std::fs::write(output_path, &yaml)?;
    eprintln!("Wrote example configuration to {:?}", output_path);
    eprintln!();
    eprintln!("Contents:");
    println!("{}", yaml);

    Ok(())
}
