//! Development mode: watch, rebuild and serve.

use anyhow::Result;
use gingerweb_static::{
    rebuild_with, register_subscriptions, Disabled, ServeConfig, SiteBuilder, Watcher,
};

/// Pick the watcher for this run.
pub fn select_watcher(serve: &ServeConfig) -> Box<dyn Watcher> {
    if !serve.enabled {
        tracing::debug!("Live reload disabled in config");
        return Box::new(Disabled);
    }

    live_reload(serve)
}

#[cfg(feature = "live-reload")]
fn live_reload(serve: &ServeConfig) -> Box<dyn Watcher> {
    Box::new(gingerweb_server::LiveReloadServer::new(serve.clone()))
}

#[cfg(not(feature = "live-reload"))]
fn live_reload(_serve: &ServeConfig) -> Box<dyn Watcher> {
    tracing::debug!("Built without live reload");
    Box::new(Disabled)
}

/// Watch the project and serve the output tree.
///
/// Returns immediately when live reload is unavailable.
pub async fn run(serve: &ServeConfig, builder: SiteBuilder) -> Result<()> {
    let mut watcher = select_watcher(serve);
    let config = builder.config().clone();

    register_subscriptions(watcher.as_mut(), &config, rebuild_with(builder));
    watcher
        .serve(config.output_dir)
        .await
        .map_err(|e| anyhow::anyhow!(e))?;

    Ok(())
}
