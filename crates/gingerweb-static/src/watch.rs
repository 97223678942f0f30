//! Watcher capability used by development mode.
//!
//! A [`Watcher`] receives subscriptions on directories and then serves the
//! output tree until the process is stopped. The live-reload implementation
//! lives in `gingerweb-server`; [`Disabled`] is used when that capability is
//! not available and returns as soon as it is asked to serve.

use std::fmt;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;

use crate::builder::{BuildReport, SiteBuilder};
use crate::config::BuildConfig;
use crate::error::BuildError;

/// Callback that runs a complete build.
pub type RebuildFn = Arc<dyn Fn() -> Result<BuildReport, BuildError> + Send + Sync>;

/// Error returned by [`Watcher::serve`].
pub type ServeError = Box<dyn std::error::Error + Send + Sync>;

/// Future returned by [`Watcher::serve`].
pub type ServeFuture = Pin<Box<dyn Future<Output = Result<(), ServeError>> + Send>>;

/// Whether connected browsers reload after a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delay {
    /// Reload as soon as the change is handled
    Immediate,
    /// Never reload for this subscription
    Forever,
}

/// A directory to watch and what to do when it changes.
#[derive(Clone)]
pub struct Subscription {
    /// Directory watched recursively
    pub target: PathBuf,
    /// Build to run on change
    pub on_change: Option<RebuildFn>,
    /// Browser reload delay
    pub delay: Delay,
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("target", &self.target)
            .field("rebuild", &self.on_change.is_some())
            .field("delay", &self.delay)
            .finish()
    }
}

/// Watches directories and serves the output tree.
pub trait Watcher: Send {
    /// Register a subscription.
    fn watch(&mut self, subscription: Subscription);

    /// Serve `root` until the process is stopped.
    fn serve(self: Box<Self>, root: PathBuf) -> ServeFuture;
}

/// Watcher used when live reload is unavailable.
#[derive(Debug, Default)]
pub struct Disabled;

impl Watcher for Disabled {
    fn watch(&mut self, subscription: Subscription) {
        tracing::debug!("Live reload disabled, ignoring {}", subscription.target.display());
    }

    fn serve(self: Box<Self>, _root: PathBuf) -> ServeFuture {
        Box::pin(async { Ok::<(), ServeError>(()) })
    }
}

/// Wrap a builder into a rebuild callback.
pub fn rebuild_with(builder: SiteBuilder) -> RebuildFn {
    Arc::new(move || builder.build())
}

/// Register the development subscriptions.
///
/// Source changes rebuild without reloading browsers directly; the rebuilt
/// output triggers the reload. Output changes only reload. Native changes
/// rebuild and reload.
pub fn register_subscriptions(
    watcher: &mut dyn Watcher,
    config: &BuildConfig,
    rebuild: RebuildFn,
) {
    watcher.watch(Subscription {
        target: config.source_dir.clone(),
        on_change: Some(Arc::clone(&rebuild)),
        delay: Delay::Forever,
    });
    watcher.watch(Subscription {
        target: config.output_dir.clone(),
        on_change: None,
        delay: Delay::Immediate,
    });
    watcher.watch(Subscription {
        target: config.native_dir.clone(),
        on_change: Some(rebuild),
        delay: Delay::Immediate,
    });
}
