//! Build pipeline for the gingerbread web frontend.
//!
//! Renders the top-level template pages of the source tree, copies static
//! resources, and stages the prebuilt wasm module into the output tree.

pub mod builder;
pub mod config;
pub mod error;
pub mod native;
pub mod output;
pub mod pages;
pub mod resources;
pub mod watch;

pub use builder::{BuildReport, SiteBuilder, Stage};
pub use config::{BuildConfig, ConfigError, ServeConfig, SiteConfig};
pub use error::BuildError;
pub use watch::{
    rebuild_with, register_subscriptions, Delay, Disabled, RebuildFn, ServeError, ServeFuture,
    Subscription, Watcher,
};
