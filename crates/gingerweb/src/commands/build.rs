//! Full site build.

use anyhow::Result;
use gingerweb_static::SiteBuilder;

/// Run one complete build.
pub fn run(builder: &SiteBuilder) -> Result<()> {
    tracing::info!("Building site...");

    let report = builder.build()?;

    tracing::info!(
        "Built {} pages and {} resources in {}ms",
        report.pages.len(),
        report.resources.len(),
        report.duration_ms
    );
    tracing::info!("Output: {}", report.output_dir.display());

    Ok(())
}
