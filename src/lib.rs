//! Stickyboard - a real-time shared sticky-note board server.
//!
//! The server owns the authoritative board. Clients connect over a
//! WebSocket, exchange JSON events, and see each other's changes as soon as
//! the server applies them.
//!
//! Layers, bottom-up:
//!
//! - [`models`] - notes, comments and users as they appear on the wire
//! - [`board`] - identity registry, z-order, edit locks and the note store
//! - [`sync`] - the event protocol and the engine that applies it
//! - [`server`] - HTTP and WebSocket transport around a single engine task
//! - [`config`], [`logging`], [`cli`] - the ambient process setup

pub mod board;
pub mod cli;
pub mod config;
pub mod logging;
pub mod models;
pub mod server;
pub mod sync;

use thiserror::Error;

/// Error types for the board server.
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for board server operations.
pub type Result<T> = std::result::Result<T, Error>;
