//! Static resource synchronization.
//!
//! Resources are copied verbatim from the source tree into the output tree.
//! Directories are merged into any existing destination: files present in
//! the source overwrite their counterparts, anything else already in the
//! output is left in place.

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::BuildError;

/// Copy every resource, in list order, from `source_dir` into `output_dir`.
///
/// Returns the copied paths relative to the output tree. A resource missing
/// from the source tree aborts the copy.
pub fn sync_resources(
    source_dir: &Path,
    output_dir: &Path,
    resources: &[PathBuf],
) -> Result<Vec<PathBuf>, BuildError> {
    let mut copied = Vec::with_capacity(resources.len());

    for relative in resources {
        let src = source_dir.join(relative);
        let dest = output_dir.join(relative);

        if src.is_dir() {
            copy_tree(&src, &dest)?;
        } else if src.is_file() {
            copy_file(&src, &dest)?;
        } else {
            return Err(BuildError::MissingResource(src));
        }

        tracing::info!("Copied {}", relative.display());
        copied.push(relative.clone());
    }

    Ok(copied)
}

/// Recursively copy `src` into `dest`, creating directories as needed.
fn copy_tree(src: &Path, dest: &Path) -> Result<(), BuildError> {
    for entry in WalkDir::new(src).follow_links(true) {
        let entry = entry.map_err(|e| BuildError::CopyResource {
            from: src.to_path_buf(),
            to: dest.to_path_buf(),
            source: e.into(),
        })?;

        let relative = entry.path().strip_prefix(src).unwrap_or(entry.path());
        let target = dest.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(|source| BuildError::CopyResource {
                from: entry.path().to_path_buf(),
                to: target.clone(),
                source,
            })?;
        } else {
            copy_file(entry.path(), &target)?;
        }
    }

    Ok(())
}

/// Copy a single file, overwriting the destination.
pub(crate) fn copy_file(src: &Path, dest: &Path) -> Result<(), BuildError> {
    let copy_err = |source| BuildError::CopyResource {
        from: src.to_path_buf(),
        to: dest.to_path_buf(),
        source,
    };

    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(copy_err)?;
    }
    fs::copy(src, dest).map_err(copy_err)?;

    Ok(())
}
