//! Live reload development server for the gingerbread web frontend.
//!
//! Watches the source, output and native trees, rebuilds on change, and
//! serves the output tree with a WebSocket channel that tells browsers to
//! reload.

pub mod reload;
pub mod server;
pub mod watcher;

pub use reload::{ReloadHub, ReloadMessage};
pub use server::{LiveReloadServer, ServerError};
pub use watcher::{ChangeKind, FileWatcher, WatchEvent};
