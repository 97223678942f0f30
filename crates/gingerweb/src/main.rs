//! gingerweb CLI - builds the gingerbread web frontend.
//!
//! Runs one full build of the output tree, then watches the source and
//! native trees and serves the output with live reload when that capability
//! is compiled in and enabled.

use std::path::Path;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use gingerweb_static::{BuildConfig, SiteBuilder, SiteConfig};

mod commands;

/// Optional configuration file, read from the working directory.
const CONFIG_FILE: &str = "site.toml";

#[derive(Parser)]
#[command(name = "gingerweb")]
#[command(about = "Build the gingerbread web frontend and serve it with live reload")]
pub struct Cli {
    /// Include the test page and test scripts in the build
    #[arg(short, long)]
    tests: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).with_target(false).init();

    let site = SiteConfig::load(Path::new(CONFIG_FILE))?;
    let builder = SiteBuilder::new(BuildConfig::new(&site, cli.tests));

    commands::build::run(&builder)?;
    commands::dev::run(&site.serve, builder).await?;

    Ok(())
}
