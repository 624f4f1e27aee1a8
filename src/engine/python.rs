//! [`FactorBackend`] driving MOFA+/MEFISTO through a Python interpreter.

use crate::data::MultiViewDataset;
use crate::engine::config::FitConfig;
use crate::engine::scripts;
use crate::engine::stage::{stage_dataset, StagedDataset};
use crate::engine::FactorBackend;
use crate::error::{MofaError, Result};
use crate::report::{ModelSnapshot, RenderJob};
use serde::Serialize;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

/// Environment variable naming the interpreter to run.
pub const PYTHON_ENV: &str = "MOFA_PYTHON";

const DEFAULT_INTERPRETER: &str = "python3";
const STDERR_TAIL_LINES: usize = 20;

#[derive(Serialize)]
struct FitRequest<'a> {
    staged: &'a StagedDataset,
    config: &'a FitConfig,
    outfile: &'a Path,
}

#[derive(Serialize)]
struct DescribeRequest<'a> {
    model: &'a Path,
    reply: &'a Path,
}

#[derive(Serialize)]
struct RenderRequest<'a> {
    model: &'a Path,
    output_dir: &'a Path,
    job: &'a RenderJob,
}

/// Runs the embedded driver scripts with a Python interpreter.
///
/// Each call gets its own scratch directory holding the driver, the JSON
/// request, and any staged data; it is removed when the call returns.
#[derive(Debug, Clone)]
pub struct PythonBackend {
    interpreter: PathBuf,
}

impl Default for PythonBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl PythonBackend {
    /// Use `$MOFA_PYTHON`, falling back to `python3` on the `PATH`.
    pub fn new() -> Self {
        let interpreter = std::env::var_os(PYTHON_ENV)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_INTERPRETER));
        Self { interpreter }
    }

    pub fn with_interpreter<P: Into<PathBuf>>(interpreter: P) -> Self {
        Self {
            interpreter: interpreter.into(),
        }
    }

    pub fn interpreter(&self) -> &Path {
        &self.interpreter
    }

    fn scratch_dir(&self) -> Result<tempfile::TempDir> {
        Ok(tempfile::Builder::new().prefix("mofa-").tempdir()?)
    }

    fn run<R: Serialize>(&self, name: &str, script: &str, request: &R, workdir: &Path) -> Result<()> {
        let script_path = workdir.join(format!("{}.py", name));
        fs::write(&script_path, script)?;
        let request_path = workdir.join(format!("{}.json", name));
        fs::write(&request_path, serde_json::to_vec_pretty(request)?)?;

        debug!(
            "Running {} {} {}",
            self.interpreter.display(),
            script_path.display(),
            request_path.display()
        );
        let output = Command::new(&self.interpreter)
            .arg(&script_path)
            .arg(&request_path)
            .output()
            .map_err(|e| {
                MofaError::Engine(format!(
                    "Failed to run {}: {}",
                    self.interpreter.display(),
                    e
                ))
            })?;

        for line in String::from_utf8_lossy(&output.stdout).lines() {
            debug!("[{}] {}", name, line);
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let lines: Vec<&str> = stderr.lines().collect();
            let tail = lines[lines.len().saturating_sub(STDERR_TAIL_LINES)..].join("\n");
            return Err(MofaError::Engine(format!(
                "{} driver failed ({}):\n{}",
                name, output.status, tail
            )));
        }
        Ok(())
    }
}

impl FactorBackend for PythonBackend {
    fn fit(&self, dataset: MultiViewDataset, config: &FitConfig, outfile: &Path) -> Result<()> {
        let scratch = self.scratch_dir()?;
        let staged = stage_dataset(&dataset, &scratch.path().join("data"))?;
        drop(dataset);

        let request = FitRequest {
            staged: &staged,
            config,
            outfile,
        };
        self.run("fit", scripts::FIT_SCRIPT, &request, scratch.path())
    }

    fn describe(&self, model: &Path) -> Result<ModelSnapshot> {
        let scratch = self.scratch_dir()?;
        let reply = scratch.path().join("snapshot.json");
        let request = DescribeRequest {
            model,
            reply: &reply,
        };
        self.run("describe", &scripts::describe_script(), &request, scratch.path())?;

        if !reply.is_file() {
            return Err(MofaError::InvalidModel(format!(
                "no description produced for {}",
                model.display()
            )));
        }
        let snapshot = serde_json::from_reader(BufReader::new(File::open(&reply)?))?;
        Ok(snapshot)
    }

    fn render(&self, model: &Path, job: &RenderJob, output_dir: &Path) -> Result<()> {
        let scratch = self.scratch_dir()?;
        let request = RenderRequest {
            model,
            output_dir,
            job,
        };
        self.run("render", &scripts::render_script(), &request, scratch.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_interpreter() {
        let backend = PythonBackend::with_interpreter("/opt/conda/bin/python");
        assert_eq!(backend.interpreter(), Path::new("/opt/conda/bin/python"));
    }

    #[test]
    fn test_missing_interpreter_is_engine_error() {
        let backend = PythonBackend::with_interpreter("/nonexistent/python-for-mofa");
        let dir = tempfile::tempdir().unwrap();
        let model = dir.path().join("model.hdf5");
        let err = backend.describe(&model).unwrap_err();
        assert!(matches!(err, MofaError::Engine(msg) if msg.contains("Failed to run")));
    }

    #[test]
    fn test_requests_serialize_paths() {
        let reply = PathBuf::from("/tmp/x/snapshot.json");
        let request = DescribeRequest {
            model: Path::new("models/CLL.hdf5"),
            reply: &reply,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "models/CLL.hdf5");
        assert_eq!(json["reply"], "/tmp/x/snapshot.json");
    }
}
