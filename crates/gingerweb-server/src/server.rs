//! Live reload development server.

use std::path::{Path, PathBuf};
use std::time::Duration;

use axum::{
    body::{self, Body},
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    http::{header, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tokio::sync::mpsc;
use tower_http::services::ServeDir;

use gingerweb_static::{
    Delay, RebuildFn, ServeConfig, ServeError, ServeFuture, Subscription, Watcher,
};

use crate::reload::{client_script, script_tag, ReloadHub, ReloadMessage, SCRIPT_PATH, SOCKET_PATH};
use crate::watcher::{FileWatcher, WatchEvent};

/// How long to wait for related changes before acting on a batch.
const SETTLE: Duration = Duration::from_millis(100);

/// Errors that can occur with the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Failed to bind to {addr}: {source}")]
    Bind {
        addr: String,
        source: std::io::Error,
    },

    #[error("File watch error: {0}")]
    Watch(#[from] notify::Error),

    #[error("Server error: {0}")]
    Serve(std::io::Error),
}

/// Shared handler state.
#[derive(Clone)]
struct AppState {
    hub: ReloadHub,
}

/// Development server that rebuilds on change and reloads browsers.
pub struct LiveReloadServer {
    config: ServeConfig,
    subscriptions: Vec<Subscription>,
}

impl LiveReloadServer {
    /// Create a new server.
    pub fn new(config: ServeConfig) -> Self {
        Self {
            config,
            subscriptions: Vec::new(),
        }
    }

    /// Registered subscriptions, in registration order.
    pub fn subscriptions(&self) -> &[Subscription] {
        &self.subscriptions
    }

    /// Watch every subscription and serve `root` until the process stops.
    pub async fn start(self, root: PathBuf) -> Result<(), ServerError> {
        let hub = ReloadHub::new();

        let targets: Vec<PathBuf> = self
            .subscriptions
            .iter()
            .map(|s| s.target.clone())
            .collect();
        let (watcher, rx) = FileWatcher::new(&targets)?;

        tokio::spawn(watch_loop(self.subscriptions, rx, hub.clone(), watcher));

        let addr = format!("{}:{}", self.config.host, self.config.port);
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|source| ServerError::Bind {
                addr: addr.clone(),
                source,
            })?;

        tracing::info!("Serving {} at http://{}", root.display(), addr);

        if self.config.open {
            let url = format!("http://{}", addr);
            if let Err(e) = open::that(&url) {
                tracing::warn!("Failed to open browser: {}", e);
            }
        }

        axum::serve(listener, router(&root, hub))
            .await
            .map_err(ServerError::Serve)
    }
}

impl Watcher for LiveReloadServer {
    fn watch(&mut self, subscription: Subscription) {
        tracing::debug!("Subscribed to {}", subscription.target.display());
        self.subscriptions.push(subscription);
    }

    fn serve(self: Box<Self>, root: PathBuf) -> ServeFuture {
        Box::pin(async move {
            (*self)
                .start(root)
                .await
                .map_err(|e| -> ServeError { Box::new(e) })
        })
    }
}

/// Routes serving `root` with the reload endpoints mounted.
pub fn router(root: &Path, hub: ReloadHub) -> Router {
    Router::new()
        .route(SOCKET_PATH, get(ws_handler))
        .route(SCRIPT_PATH, get(script_handler))
        .fallback_service(ServeDir::new(root))
        .layer(middleware::map_response(inject_reload_script))
        .with_state(AppState { hub })
}

/// What a batch of changes asks for.
#[derive(Default)]
struct ChangePlan {
    rebuild: Option<RebuildFn>,
    reload: bool,
}

impl ChangePlan {
    /// Merge a batch into one rebuild at most and one reload at most.
    fn from_batch(subscriptions: &[Subscription], batch: &[WatchEvent]) -> Self {
        let mut plan = Self::default();

        for event in batch {
            let Some(sub) = subscriptions.get(event.target) else {
                continue;
            };

            if plan.rebuild.is_none() {
                plan.rebuild = sub.on_change.clone();
            }

            plan.reload |= sub.delay == Delay::Immediate;
        }

        plan
    }
}

/// Handle file watch events until the watcher goes away.
///
/// Events are handled in batches. Anything arriving while a rebuild runs is
/// queued and handled as the next batch, so rebuilds never overlap.
async fn watch_loop(
    subscriptions: Vec<Subscription>,
    mut rx: mpsc::UnboundedReceiver<WatchEvent>,
    hub: ReloadHub,
    _watcher: FileWatcher,
) {
    while let Some(first) = rx.recv().await {
        tokio::time::sleep(SETTLE).await;

        let mut batch = vec![first];
        while let Ok(event) = rx.try_recv() {
            batch.push(event);
        }
        tracing::debug!("Handling {} change(s)", batch.len());

        let plan = ChangePlan::from_batch(&subscriptions, &batch);

        if let Some(rebuild) = plan.rebuild {
            tracing::info!("Change detected in {}, rebuilding", batch[0].path.display());
            run_rebuild(rebuild).await;
        }

        if plan.reload {
            hub.reload();
        }
    }
}

async fn run_rebuild(rebuild: RebuildFn) {
    match tokio::task::spawn_blocking(move || rebuild()).await {
        Ok(Ok(report)) => tracing::info!(
            "Rebuilt {} pages in {}ms",
            report.pages.len(),
            report.duration_ms
        ),
        Ok(Err(e)) => tracing::error!("Rebuild failed: {}", e),
        Err(e) => tracing::error!("Rebuild task failed: {}", e),
    }
}

/// Add the reload script to successful HTML responses.
async fn inject_reload_script(response: Response) -> Response {
    let is_html = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("text/html"));

    if response.status() != StatusCode::OK || !is_html {
        return response;
    }

    let (mut parts, body) = response.into_parts();
    let bytes = match body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!("Failed to read response body: {}", e);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let html = inject_script(&String::from_utf8_lossy(&bytes), &script_tag());
    parts.headers.remove(header::CONTENT_LENGTH);

    Response::from_parts(parts, Body::from(html))
}

/// Insert `tag` before the last `</body>`, or append it when there is none.
fn inject_script(html: &str, tag: &str) -> String {
    match html.to_ascii_lowercase().rfind("</body>") {
        Some(index) => format!("{}{}{}", &html[..index], tag, &html[index..]),
        None => format!("{}{}", html, tag),
    }
}

/// Handler for the reload WebSocket endpoint.
async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_ws(socket, state.hub))
}

/// Forward reload messages to one browser.
async fn handle_ws(mut socket: WebSocket, hub: ReloadHub) {
    let mut rx = hub.subscribe();

    if send_message(&mut socket, &ReloadMessage::Connected).await.is_err() {
        return;
    }

    while let Ok(msg) = rx.recv().await {
        if send_message(&mut socket, &msg).await.is_err() {
            break;
        }
    }
}

async fn send_message(socket: &mut WebSocket, msg: &ReloadMessage) -> Result<(), axum::Error> {
    let json = serde_json::to_string(msg).map_err(axum::Error::new)?;
    socket.send(Message::Text(json.into())).await
}

/// Handler for the reload client script.
async fn script_handler() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/javascript")], client_script())
}
