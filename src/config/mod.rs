//! Configuration for the board server.
//!
//! Settings live in an optional KDL file:
//!
//! - Default location: `~/.config/stickyboard/config.kdl`
//! - Explicit location: `--config <path>`
//!
//! Contains:
//! - `host` - Bind address
//! - `port` - Listening port
//! - `log-level` - Tracing filter directive
//! - `log-format` - "text" or "json"
//! - `cors-any` - Accept cross-origin requests from any origin
//!
//! ## Precedence
//!
//! CLI flag > environment variable > config.kdl > defaults
//!
//! Use the [`resolver`] module for unified precedence resolution.

pub mod resolver;
pub mod schema;

pub use resolver::{
    ConfigOverrides, GENERIC_PORT_ENV, HOST_ENV, LOG_ENV, LOG_FORMAT_ENV, PORT_ENV, Resolved,
    ResolvedConfig, ValueSource, default_config_path, load_config_file, resolve_config,
    resolve_config_with,
};
pub use schema::{DEFAULT_HOST, DEFAULT_LOG_LEVEL, DEFAULT_PORT, LogFormat, ServerConfig};
