//! Zip archive extraction for bundled input data.

use crate::error::{MofaError, Result};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Directory one level above the one holding the running executable.
///
/// Bundled data is unpacked next to the tool's own directory, e.g. a tool
/// installed as `<root>/bin/mofa` extracts into `<root>`.
pub fn default_destination() -> Result<PathBuf> {
    let exe = std::env::current_exe()?;
    exe.parent()
        .and_then(Path::parent)
        .map(Path::to_path_buf)
        .ok_or_else(|| {
            MofaError::InvalidParameter(format!(
                "cannot resolve the parent directory of {}",
                exe.display()
            ))
        })
}

/// Extract every entry of `zip_path` under `dest`.
///
/// Fails with [`MofaError::MissingInput`] before touching `dest` if the
/// archive does not exist. Existing files are overwritten. Returns the
/// extracted file paths relative to `dest`, in archive order.
pub fn extract_archive<P: AsRef<Path>, Q: AsRef<Path>>(zip_path: P, dest: Q) -> Result<Vec<PathBuf>> {
    let zip_path = zip_path.as_ref();
    let dest = dest.as_ref();
    if !zip_path.is_file() {
        return Err(MofaError::MissingInput(zip_path.to_path_buf()));
    }

    info!("Starting extraction of '{}'", zip_path.display());
    let mut archive = zip::ZipArchive::new(File::open(zip_path)?)?;
    let mut manifest = Vec::with_capacity(archive.len());

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        let relative = entry.enclosed_name().ok_or_else(|| {
            MofaError::InvalidParameter(format!(
                "archive entry '{}' escapes the destination",
                entry.name()
            ))
        })?;
        let target = dest.join(&relative);

        if entry.is_dir() {
            fs::create_dir_all(&target)?;
            continue;
        }
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut out = File::create(&target)?;
        io::copy(&mut entry, &mut out)?;
        debug!("Extracted {}", relative.display());
        manifest.push(relative);
    }

    info!(
        "Successfully unzipped '{}' ({} files)",
        zip_path.display(),
        manifest.len()
    );
    Ok(manifest)
}
