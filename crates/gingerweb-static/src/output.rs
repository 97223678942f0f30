//! Output tree initialization.

use std::fs;
use std::path::Path;

use crate::error::BuildError;

/// Create the output tree root and any missing parents.
///
/// Succeeds silently when the directory already exists.
pub fn init_output(output_dir: &Path) -> Result<(), BuildError> {
    fs::create_dir_all(output_dir).map_err(|source| BuildError::CreateOutput {
        path: output_dir.to_path_buf(),
        source,
    })
}
