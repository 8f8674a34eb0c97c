//! Copies the build output into the packaging directory.

use serde::Serialize;
use std::path::Path;
use tracing::{debug, info};
use videoh_core::{Error, Result};
use walkdir::WalkDir;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PublishStats {
    pub files: u64,
    pub bytes: u64,
}

/// Recursively copy every entry of `built_dir` into `output_dir`,
/// overwriting existing files. Dotfiles are included.
pub fn publish(built_dir: &Path, output_dir: &Path) -> Result<PublishStats> {
    let failed = |path: &Path, source: std::io::Error| Error::PublishFailed {
        path: path.to_path_buf(),
        source,
    };

    if !built_dir.is_dir() {
        return Err(failed(
            built_dir,
            std::io::Error::new(std::io::ErrorKind::NotFound, "build output directory missing"),
        ));
    }
    std::fs::create_dir_all(output_dir).map_err(|e| failed(output_dir, e))?;

    let mut stats = PublishStats::default();

    for entry in WalkDir::new(built_dir).min_depth(1) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(built_dir).to_path_buf();
            failed(&path, e.into())
        })?;

        let relative = entry
            .path()
            .strip_prefix(built_dir)
            .map_err(|e| failed(entry.path(), std::io::Error::other(e)))?;
        let dest = output_dir.join(relative);

        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&dest).map_err(|e| failed(&dest, e))?;
        } else {
            let bytes = std::fs::copy(entry.path(), &dest).map_err(|e| failed(&dest, e))?;
            debug!(file = %relative.display(), bytes, "Copied");
            stats.files += 1;
            stats.bytes += bytes;
        }
    }

    info!(
        from = %built_dir.display(),
        to = %output_dir.display(),
        files = stats.files,
        bytes = stats.bytes,
        "Published build output"
    );
    Ok(stats)
}
