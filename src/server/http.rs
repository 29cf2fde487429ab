//! HTTP server hosting the board's WebSocket endpoint

use axum::{Json, Router, extract::State, routing::get};
use std::future::Future;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::cors::CorsLayer;

use super::hub::{EngineHandle, Hub};
use crate::config::ResolvedConfig;
use crate::sync::SyncEngine;
use crate::{Error, Result};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Handle to the single engine task
    pub engine: EngineHandle,
}

/// Network settings for one server instance.
#[derive(Debug, Clone)]
pub struct ServerOptions {
    pub host: String,
    pub port: u16,
    /// Allow cross-origin requests from any origin
    pub cors_any: bool,
}

impl ServerOptions {
    pub fn from_config(config: &ResolvedConfig) -> Self {
        Self {
            host: config.host().to_string(),
            port: config.port(),
            cors_any: config.cors_any(),
        }
    }
}

/// A server that is bound to its socket but not yet serving.
pub struct BoundServer {
    listener: TcpListener,
    addr: SocketAddr,
    app: Router,
    state: AppState,
    engine_task: JoinHandle<()>,
}

impl BoundServer {
    /// Address actually bound (meaningful when port 0 was requested).
    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn engine(&self) -> &EngineHandle {
        &self.state.engine
    }

    /// Serve until `shutdown` resolves.
    pub async fn run<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        tracing::info!(addr = %self.addr, "board server listening");
        axum::serve(self.listener, self.app)
            .with_graceful_shutdown(shutdown)
            .await?;
        // Upgraded sockets may still hold handles; the board dies with the process anyway.
        self.engine_task.abort();
        tracing::info!("board server stopped");
        Ok(())
    }
}

/// Build the router for a given engine handle.
pub fn router(state: AppState, cors_any: bool) -> Router {
    let app = Router::new()
        .route("/", get(serve_status))
        .route("/health", get(serve_health))
        .route("/ws", get(super::websocket::ws_handler))
        .with_state(state);
    if cors_any {
        app.layer(CorsLayer::permissive())
    } else {
        app
    }
}

/// Spawn the engine and bind the listening socket.
pub async fn bind_server(options: &ServerOptions) -> Result<BoundServer> {
    let host_text = &options.host;
    let host_addr: std::net::IpAddr = host_text
        .parse()
        .map_err(|e| Error::InvalidInput(format!("Invalid host address '{host_text}': {e}")))?;
    let addr = SocketAddr::from((host_addr, options.port));

    let listener = TcpListener::bind(addr).await?;
    let addr = listener.local_addr()?;

    let (engine, engine_task) = Hub::spawn(SyncEngine::new());
    let state = AppState { engine };
    let app = router(state.clone(), options.cors_any);

    Ok(BoundServer {
        listener,
        addr,
        app,
        state,
        engine_task,
    })
}

/// Start the board server and run until Ctrl-C.
pub async fn start_server(options: &ServerOptions) -> Result<()> {
    let server = bind_server(options).await?;
    eprintln!("Board server running at ws://{}/ws", server.local_addr());
    eprintln!("Press Ctrl+C to stop");
    server.run(shutdown_signal()).await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}

/// Liveness message
async fn serve_status() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "Board server running" }))
}

/// Connection and board counters
async fn serve_health(State(state): State<AppState>) -> Json<serde_json::Value> {
    let stats = state.engine.stats();
    Json(serde_json::json!({
        "status": "ok",
        "connections": stats.connections,
        "notes": stats.board.notes,
        "users": stats.board.users,
    }))
}
