//! Errors raised while building the site.

use std::io;
use std::path::PathBuf;

use crate::builder::Stage;

/// Errors that can occur during build.
///
/// Every variant is fatal: the build stops at the first one and leaves the
/// output tree as far as it got.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Failed to create output directory {path}: {source}")]
    CreateOutput { path: PathBuf, source: io::Error },

    #[error("Resource not found: {0}")]
    MissingResource(PathBuf),

    #[error("Failed to copy {from} to {to}: {source}")]
    CopyResource {
        from: PathBuf,
        to: PathBuf,
        source: io::Error,
    },

    #[error("Native artifact not found: {0} (run the native build first)")]
    MissingArtifact(PathBuf),

    #[error("Failed to stage native artifact to {path}: {source}")]
    StageArtifact { path: PathBuf, source: io::Error },

    #[error("Failed to read pages from {path}: {source}")]
    ReadPages { path: PathBuf, source: io::Error },

    #[error("Failed to render {page}: {source}")]
    Render {
        page: String,
        source: minijinja::Error,
    },

    #[error("Failed to write {path}: {source}")]
    WritePage { path: PathBuf, source: io::Error },
}

impl BuildError {
    /// The build stage that raised this error.
    pub fn stage(&self) -> Stage {
        match self {
            Self::CreateOutput { .. } => Stage::Init,
            Self::MissingResource(_) | Self::CopyResource { .. } => Stage::SyncResources,
            Self::MissingArtifact(_) | Self::StageArtifact { .. } => Stage::StageNative,
            Self::ReadPages { .. } | Self::Render { .. } | Self::WritePage { .. } => {
                Stage::RenderPages
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_errors_to_stages() {
        let missing = BuildError::MissingArtifact(PathBuf::from("native/zig-out/bin/x.wasm"));
        assert_eq!(missing.stage(), Stage::StageNative);

        let resource = BuildError::MissingResource(PathBuf::from("web/images"));
        assert_eq!(resource.stage(), Stage::SyncResources);
    }

    #[test]
    fn mentions_native_build_when_artifact_missing() {
        let err = BuildError::MissingArtifact(PathBuf::from("native/zig-out/bin/x.wasm"));
        assert!(err.to_string().contains("native build"));
    }
}
