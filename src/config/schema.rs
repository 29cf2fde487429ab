//! KDL schema for config.kdl.
//!
//! This module provides:
//! - Rust structs representing the KDL schema
//! - Serialization/deserialization to/from KDL format
//! - Validation functions
//! - Default values

use kdl::{KdlDocument, KdlEntry, KdlNode, KdlValue};
use serde::{Deserialize, Serialize};

/// Default bind address.
pub const DEFAULT_HOST: &str = "127.0.0.1";
/// Default listening port.
pub const DEFAULT_PORT: u16 = 3001;
/// Default tracing filter.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Log line format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines (default)
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

impl LogFormat {
    /// Parse from string, case-insensitive.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" => Some(LogFormat::Text),
            "json" => Some(LogFormat::Json),
            _ => None,
        }
    }

    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Text => "text",
            LogFormat::Json => "json",
        }
    }
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match LogFormat::parse(s) {
            Some(format) => Ok(format),
            None => Err(format!("unknown log format '{s}' (expected text or json)")),
        }
    }
}

/// Server settings stored in config.kdl.
///
/// Every field is optional; unset fields fall through to environment
/// variables and then built-in defaults.
///
/// # KDL Schema
///
/// ```kdl
/// host "0.0.0.0"
/// port 3001
/// log-level "debug"
/// log-format "json"  // or "text"
/// cors-any #true
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind (e.g., "127.0.0.1", "0.0.0.0")
    pub host: Option<String>,

    /// Port to listen on (0 lets the OS choose)
    pub port: Option<u16>,

    /// Tracing filter directive (e.g., "info", "stickyboard=debug")
    pub log_level: Option<String>,

    /// Log line format
    pub log_format: Option<LogFormat>,

    /// Accept cross-origin requests from any origin
    pub cors_any: Option<bool>,
}

impl ServerConfig {
    /// Create an empty config with no values set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the config values.
    ///
    /// Returns an error message if any value is invalid.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(ref host) = self.host {
            if host.parse::<std::net::IpAddr>().is_err() {
                return Err(format!("host must be an IP address, got '{}'", host));
            }
        }
        if let Some(ref level) = self.log_level {
            if level.trim().is_empty() {
                return Err("log-level must not be empty".to_string());
            }
        }
        Ok(())
    }

    /// Parse config from a KDL document.
    ///
    /// Values of the wrong type are reported rather than skipped so a typo in
    /// the file does not silently fall back to a default.
    pub fn from_kdl(doc: &KdlDocument) -> Result<Self, String> {
        let mut config = Self::new();

        if let Some(value) = first_value(doc, "host") {
            let s = value
                .as_string()
                .ok_or_else(|| "host must be a string".to_string())?;
            config.host = Some(s.to_string());
        }

        if let Some(value) = first_value(doc, "port") {
            let port = value
                .as_integer()
                .and_then(|i| u16::try_from(i).ok())
                .ok_or_else(|| "port must be an integer between 0 and 65535".to_string())?;
            config.port = Some(port);
        }

        if let Some(value) = first_value(doc, "log-level") {
            let s = value
                .as_string()
                .ok_or_else(|| "log-level must be a string".to_string())?;
            config.log_level = Some(s.to_string());
        }

        if let Some(value) = first_value(doc, "log-format") {
            let format = value
                .as_string()
                .and_then(LogFormat::parse)
                .ok_or_else(|| "log-format must be \"text\" or \"json\"".to_string())?;
            config.log_format = Some(format);
        }

        if let Some(value) = first_value(doc, "cors-any") {
            let flag = value
                .as_bool()
                .ok_or_else(|| "cors-any must be #true or #false".to_string())?;
            config.cors_any = Some(flag);
        }

        Ok(config)
    }

    /// Convert config to a KDL document.
    pub fn to_kdl(&self) -> KdlDocument {
        let mut doc = KdlDocument::new();

        if let Some(ref host) = self.host {
            push_node(&mut doc, "host", KdlValue::String(host.clone()));
        }
        if let Some(port) = self.port {
            push_node(&mut doc, "port", KdlValue::Integer(port as i128));
        }
        if let Some(ref level) = self.log_level {
            push_node(&mut doc, "log-level", KdlValue::String(level.clone()));
        }
        if let Some(format) = self.log_format {
            push_node(
                &mut doc,
                "log-format",
                KdlValue::String(format.as_str().to_string()),
            );
        }
        if let Some(flag) = self.cors_any {
            push_node(&mut doc, "cors-any", KdlValue::Bool(flag));
        }

        doc
    }
}

fn first_value<'a>(doc: &'a KdlDocument, name: &str) -> Option<&'a KdlValue> {
    doc.get(name)
        .and_then(|node| node.entries().first())
        .map(|entry| entry.value())
}

fn push_node(doc: &mut KdlDocument, name: &str, value: KdlValue) {
    let mut node = KdlNode::new(name);
    node.push(KdlEntry::new(value));
    doc.nodes_mut().push(node);
}
