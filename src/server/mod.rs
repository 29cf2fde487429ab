//! Network transport for the board.
//!
//! An axum server with a `/ws` WebSocket endpoint. Each connection gets a
//! reader task that forwards frames to the engine task and a writer task that
//! drains the connection's outbound queue. See [`hub`] for the ordering model.

pub mod http;
pub mod hub;
mod websocket;

pub use http::{AppState, BoundServer, ServerOptions, bind_server, router, start_server};
pub use hub::{EngineEvent, EngineHandle, Hub, HubStats};
