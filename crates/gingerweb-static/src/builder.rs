//! Static site builder.
//!
//! A build runs four stages in a fixed order and stops at the first error.
//! There is no rollback: a failed build leaves whatever the earlier stages
//! already wrote.

use std::fmt;
use std::path::PathBuf;
use std::time::Instant;

use crate::config::BuildConfig;
use crate::error::BuildError;
use crate::native::stage_artifact;
use crate::output::init_output;
use crate::pages::{render_pages, PageRenderer};
use crate::resources::sync_resources;

/// A stage of the build, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Init,
    SyncResources,
    StageNative,
    RenderPages,
}

impl Stage {
    /// All stages in the order a build runs them.
    pub const ALL: [Stage; 4] = [
        Stage::Init,
        Stage::SyncResources,
        Stage::StageNative,
        Stage::RenderPages,
    ];
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Init => "init",
            Stage::SyncResources => "sync-resources",
            Stage::StageNative => "stage-native",
            Stage::RenderPages => "render-pages",
        };
        f.write_str(name)
    }
}

/// Result of a build operation.
///
/// Paths are relative to the output directory.
#[derive(Debug, Default)]
pub struct BuildReport {
    /// Resources copied, in list order
    pub resources: Vec<PathBuf>,

    /// Staged native artifact
    pub artifact: Option<PathBuf>,

    /// Pages rendered
    pub pages: Vec<PathBuf>,

    /// Total build time in milliseconds
    pub duration_ms: u64,

    /// Output directory
    pub output_dir: PathBuf,
}

/// Static site builder.
#[derive(Debug, Clone)]
pub struct SiteBuilder {
    config: BuildConfig,
}

impl SiteBuilder {
    /// Create a new builder.
    pub fn new(config: BuildConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Build the site.
    pub fn build(&self) -> Result<BuildReport, BuildError> {
        let start = Instant::now();
        let mut report = BuildReport {
            output_dir: self.config.output_dir.clone(),
            ..Default::default()
        };

        for stage in Stage::ALL {
            tracing::debug!("Build stage {}", stage);
            self.run_stage(stage, &mut report)?;
        }

        report.duration_ms = start.elapsed().as_millis() as u64;
        Ok(report)
    }

    fn run_stage(&self, stage: Stage, report: &mut BuildReport) -> Result<(), BuildError> {
        let config = &self.config;

        match stage {
            Stage::Init => init_output(&config.output_dir),

            Stage::SyncResources => {
                report.resources =
                    sync_resources(&config.source_dir, &config.output_dir, &config.resources)?;
                Ok(())
            }

            Stage::StageNative => {
                let dest = config.artifact_dest();
                stage_artifact(&config.artifact_source(), &dest)?;

                let relative = dest
                    .strip_prefix(&config.output_dir)
                    .map(PathBuf::from)
                    .unwrap_or(dest);
                tracing::info!("Copied {}", relative.display());
                report.artifact = Some(relative);
                Ok(())
            }

            Stage::RenderPages => {
                let renderer = PageRenderer::new(&config.source_dir);
                report.pages = render_pages(
                    &renderer,
                    &config.output_dir,
                    &config.page_extension,
                    &config.exclude_pages,
                )?;
                Ok(())
            }
        }
    }
}
