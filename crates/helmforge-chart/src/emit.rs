//! Writing a chart file set to disk.
//!
//! Files are staged in a temporary directory next to the destination and
//! the directory is renamed into place only once every file is written, so
//! a failed run never leaves a half-populated chart behind.

use std::io;
use std::path::{Path, PathBuf};

use helmforge_common::error::{ChartError, Result};

use crate::assemble::ChartFileSet;

const STAGING_PREFIX: &str = ".helmforge-";

/// Writes `set` to `<output_dir>/<chart_name>` and returns that path.
///
/// An existing chart directory is replaced only when `overwrite` is set.
///
/// # Errors
///
/// Returns [`ChartError::OutputWriteFailure`] if the destination exists and
/// `overwrite` is not set, or if any directory or file cannot be written.
pub fn write_chart(set: &ChartFileSet, output_dir: &Path, overwrite: bool) -> Result<PathBuf> {
    let target = output_dir.join(&set.chart_name);
    let write_failure = |path: &Path| {
        let path = path.to_path_buf();
        move |source: io::Error| ChartError::OutputWriteFailure { path, source }
    };

    if target.exists() && !overwrite {
        return Err(ChartError::OutputWriteFailure {
            path: target,
            source: io::Error::new(io::ErrorKind::AlreadyExists, "chart directory already exists"),
        });
    }

    std::fs::create_dir_all(output_dir).map_err(write_failure(output_dir))?;
    let staging = tempfile::Builder::new()
        .prefix(STAGING_PREFIX)
        .tempdir_in(output_dir)
        .map_err(write_failure(output_dir))?;
    tracing::debug!(staging = %staging.path().display(), "staging chart files");

    for file in &set.files {
        let path = staging.path().join(&file.path);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(write_failure(parent))?;
        }
        std::fs::write(&path, &file.contents).map_err(write_failure(&target.join(&file.path)))?;
    }

    replace_dir(staging.path(), &target, output_dir)?;
    let _ = staging.keep();

    tracing::info!(path = %target.display(), files = set.files.len(), "chart written");
    Ok(target)
}

/// Moves `staged` to `target`. An existing `target` is set aside first and
/// restored if the move fails, then removed once the new directory is in
/// place.
fn replace_dir(staged: &Path, target: &Path, output_dir: &Path) -> Result<()> {
    let write_failure = |source: io::Error| ChartError::OutputWriteFailure {
        path: target.to_path_buf(),
        source,
    };

    let aside = if target.exists() {
        tracing::info!(path = %target.display(), "replacing existing chart directory");
        let holder = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .tempdir_in(output_dir)
            .map_err(write_failure)?;
        let displaced = holder.path().join("previous");
        std::fs::rename(target, &displaced).map_err(write_failure)?;
        Some((holder, displaced))
    } else {
        None
    };

    if let Err(source) = std::fs::rename(staged, target) {
        if let Some((holder, displaced)) = aside {
            if let Err(restore) = std::fs::rename(&displaced, target) {
                tracing::error!(
                    path = %displaced.display(),
                    error = %restore,
                    "could not restore previous chart directory"
                );
                let _ = holder.keep();
            }
        }
        return Err(write_failure(source));
    }
    Ok(())
}
