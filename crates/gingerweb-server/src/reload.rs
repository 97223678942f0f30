//! WebSocket-based browser reload.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Path of the reload WebSocket endpoint.
pub const SOCKET_PATH: &str = "/__livereload";

/// Path the client script is served from.
pub const SCRIPT_PATH: &str = "/__livereload.js";

/// Messages sent to connected browsers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReloadMessage {
    /// Full page reload
    Reload,

    /// Connection established
    Connected,
}

/// Reload messages buffered per browser before it starts lagging.
const BACKLOG: usize = 16;

/// Fan-out of reload requests to every open browser.
#[derive(Debug, Clone)]
pub struct ReloadHub {
    sender: broadcast::Sender<ReloadMessage>,
}

impl ReloadHub {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(BACKLOG);
        Self { sender }
    }

    /// Ask every open browser to reload. Returns how many were asked.
    pub fn reload(&self) -> usize {
        match self.sender.send(ReloadMessage::Reload) {
            Ok(browsers) => {
                tracing::debug!("Reloading {} browser(s)", browsers);
                browsers
            }
            Err(_) => 0,
        }
    }

    /// Receiver for one browser connection.
    pub fn subscribe(&self) -> broadcast::Receiver<ReloadMessage> {
        self.sender.subscribe()
    }
}

impl Default for ReloadHub {
    fn default() -> Self {
        Self::new()
    }
}

/// Script tag injected into served HTML documents.
pub fn script_tag() -> String {
    format!(r#"<script src="{}"></script>"#, SCRIPT_PATH)
}

/// Generate the client-side reload script.
///
/// The socket URL is derived from the page's own host, so the script works
/// whatever address the server is bound to.
pub fn client_script() -> String {
    format!(
        r#"
(function() {{
  'use strict';

  const url = (location.protocol === 'https:' ? 'wss://' : 'ws://') + location.host + '{}';
  let reconnectAttempts = 0;
  const maxReconnectAttempts = 10;

  function connect() {{
    const ws = new WebSocket(url);

    ws.onopen = function() {{
      if (reconnectAttempts > 0) {{
        location.reload();
        return;
      }}
      console.log('[livereload] Connected');
    }};

    ws.onmessage = function(event) {{
      const msg = JSON.parse(event.data);

      switch (msg.type) {{
        case 'reload':
          location.reload();
          break;

        case 'connected':
          console.log('[livereload] Server acknowledged connection');
          break;
      }}
    }};

    ws.onclose = function() {{
      if (reconnectAttempts < maxReconnectAttempts) {{
        reconnectAttempts++;
        setTimeout(connect, 1000 * reconnectAttempts);
      }}
    }};
  }}

  connect();
}})();
"#,
        SOCKET_PATH
    )
}
