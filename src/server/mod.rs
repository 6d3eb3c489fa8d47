// src/server/mod.rs

//! Live-reload development server.
//!
//! [`LiveReload`] is a cheap clonable handle shared by the `browser-sync`
//! task (which starts the server) and the pipelines' reload stage (which
//! broadcasts changed paths to connected browsers).

pub mod assets;
pub mod sse;

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::{Context, Result};
use axum::{routing::get, Router};
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{debug, error, info};

/// Payload of one `reload` server-sent event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReloadEvent {
    pub paths: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ServerInfo {
    pub addr: SocketAddr,
    pub base_dir: PathBuf,
}

#[derive(Debug)]
struct Inner {
    tx: broadcast::Sender<ReloadEvent>,
    server: Mutex<Option<ServerInfo>>,
}

#[derive(Debug, Clone)]
pub struct LiveReload {
    inner: Arc<Inner>,
}

/// Shared state of the axum handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub live: LiveReload,
    pub base_dir: PathBuf,
}

impl Default for LiveReload {
    fn default() -> Self {
        Self::new()
    }
}

impl LiveReload {
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(64);
        Self {
            inner: Arc::new(Inner {
                tx,
                server: Mutex::new(None),
            }),
        }
    }

    pub fn is_serving(&self) -> bool {
        self.info().is_some()
    }

    pub fn info(&self) -> Option<ServerInfo> {
        self.inner
            .server
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ReloadEvent> {
        self.inner.tx.subscribe()
    }

    /// Tell connected browsers to reload. No-op while no server runs.
    pub fn reload(&self, paths: Vec<String>) {
        if !self.is_serving() {
            debug!(?paths, "live-reload server not running; skipping reload");
            return;
        }
        let count = paths.len();
        match self.inner.tx.send(ReloadEvent { paths }) {
            Ok(clients) => info!(files = count, clients, "sent live-reload event"),
            Err(_) => debug!("no live-reload clients connected"),
        }
    }

    /// Start serving `base_dir` on `127.0.0.1:port` in the background.
    ///
    /// Returns the bound address. Calling this again while a server runs
    /// returns the existing address.
    pub async fn serve(&self, base_dir: &Path, port: u16) -> Result<SocketAddr> {
        if let Some(info) = self.info() {
            debug!(addr = %info.addr, "live-reload server already running");
            return Ok(info.addr);
        }

        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .with_context(|| format!("binding live-reload server to port {port}"))?;
        let addr = listener.local_addr()?;

        let state = AppState {
            live: self.clone(),
            base_dir: base_dir.to_path_buf(),
        };

        let app = Router::new()
            .route("/__livereload", get(sse::sse_handler))
            .route("/__livereload.js", get(assets::client_script))
            .fallback(assets::static_handler)
            .with_state(state);

        tokio::spawn(async move {
            if let Err(err) = axum::serve(listener, app).await {
                error!(error = %err, "live-reload server stopped");
            }
        });

        *self
            .inner
            .server
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(ServerInfo {
            addr,
            base_dir: base_dir.to_path_buf(),
        });

        info!(%addr, base_dir = ?base_dir, "live-reload server listening");
        Ok(addr)
    }
}
