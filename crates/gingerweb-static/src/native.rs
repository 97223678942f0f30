//! Staging of the prebuilt native artifact.

use std::fs;
use std::path::Path;

use crate::error::BuildError;

/// Copy the native artifact from `src` to `dest`.
///
/// The destination's parent directory is created if needed. A missing
/// artifact means the native build has not been run.
pub fn stage_artifact(src: &Path, dest: &Path) -> Result<(), BuildError> {
    if !src.is_file() {
        return Err(BuildError::MissingArtifact(src.to_path_buf()));
    }

    let stage_err = |source| BuildError::StageArtifact {
        path: dest.to_path_buf(),
        source,
    };

    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(stage_err)?;
    }
    fs::copy(src, dest).map_err(stage_err)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn stages_artifact_bytes() {
        let temp = tempdir().unwrap();
        let src = temp.path().join("zig-out/bin/gingerbread.wasm");
        let dest = temp.path().join("build/native/gingerbread.wasm");
        fs::create_dir_all(src.parent().unwrap()).unwrap();
        fs::write(&src, b"\0asm\x01\0\0\0").unwrap();

        stage_artifact(&src, &dest).unwrap();

        assert_eq!(fs::read(&dest).unwrap(), b"\0asm\x01\0\0\0");
    }

    #[test]
    fn overwrites_previous_artifact() {
        let temp = tempdir().unwrap();
        let src = temp.path().join("new.wasm");
        let dest = temp.path().join("native/new.wasm");
        fs::create_dir_all(dest.parent().unwrap()).unwrap();
        fs::write(&dest, b"old").unwrap();
        fs::write(&src, b"new").unwrap();

        stage_artifact(&src, &dest).unwrap();

        assert_eq!(fs::read(&dest).unwrap(), b"new");
    }

    #[test]
    fn missing_artifact_is_an_error() {
        let temp = tempdir().unwrap();
        let src = temp.path().join("zig-out/bin/gingerbread.wasm");
        let dest = temp.path().join("build/native/gingerbread.wasm");

        let err = stage_artifact(&src, &dest).unwrap_err();

        assert!(matches!(err, BuildError::MissingArtifact(_)));
        assert!(!dest.exists());
    }
}
