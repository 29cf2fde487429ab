//! Precedence resolution for server configuration.
//!
//! ## Precedence (highest to lowest)
//!
//! 1. CLI flags (passed at runtime)
//! 2. Environment variables (`STICKYBOARD_HOST`, `STICKYBOARD_PORT`, `PORT`,
//!    `STICKYBOARD_LOG`, `STICKYBOARD_LOG_FORMAT`)
//! 3. config.kdl (`--config <path>` or `~/.config/stickyboard/config.kdl`)
//! 4. Built-in defaults

use std::path::{Path, PathBuf};

use crate::config::schema::{DEFAULT_HOST, DEFAULT_LOG_LEVEL, DEFAULT_PORT};
use crate::config::{LogFormat, ServerConfig};
use crate::{Error, Result};

/// Environment variable overriding the bind address.
pub const HOST_ENV: &str = "STICKYBOARD_HOST";
/// Environment variable overriding the port.
pub const PORT_ENV: &str = "STICKYBOARD_PORT";
/// Conventional platform port variable, consulted after [`PORT_ENV`].
pub const GENERIC_PORT_ENV: &str = "PORT";
/// Environment variable overriding the log filter.
pub const LOG_ENV: &str = "STICKYBOARD_LOG";
/// Environment variable overriding the log format.
pub const LOG_FORMAT_ENV: &str = "STICKYBOARD_LOG_FORMAT";

/// Tracks where a resolved value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueSource {
    /// Value from CLI flag
    CliFlag,
    /// Value from environment variable
    EnvVar(String),
    /// Value from a config.kdl file
    ConfigFile(String),
    /// Built-in default value
    Default,
}

impl std::fmt::Display for ValueSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueSource::CliFlag => write!(f, "cli"),
            ValueSource::EnvVar(name) => write!(f, "env:{}", name),
            ValueSource::ConfigFile(path) => write!(f, "file:{}", path),
            ValueSource::Default => write!(f, "default"),
        }
    }
}

/// A resolved value with its source.
#[derive(Debug, Clone)]
pub struct Resolved<T> {
    /// The resolved value
    pub value: T,
    /// Where the value came from
    pub source: ValueSource,
}

impl<T> Resolved<T> {
    /// Create a new resolved value.
    pub fn new(value: T, source: ValueSource) -> Self {
        Self { value, source }
    }
}

/// Fully resolved configuration with source tracking.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub host: Resolved<String>,
    pub port: Resolved<u16>,
    pub log_level: Resolved<String>,
    pub log_format: Resolved<LogFormat>,
    pub cors_any: Resolved<bool>,
    /// The config file that was read, if any
    pub config_path: Option<PathBuf>,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            host: Resolved::new(DEFAULT_HOST.to_string(), ValueSource::Default),
            port: Resolved::new(DEFAULT_PORT, ValueSource::Default),
            log_level: Resolved::new(DEFAULT_LOG_LEVEL.to_string(), ValueSource::Default),
            log_format: Resolved::new(LogFormat::default(), ValueSource::Default),
            cors_any: Resolved::new(true, ValueSource::Default),
            config_path: None,
        }
    }
}

impl ResolvedConfig {
    pub fn host(&self) -> &str {
        &self.host.value
    }

    pub fn port(&self) -> u16 {
        self.port.value
    }

    pub fn log_level(&self) -> &str {
        &self.log_level.value
    }

    pub fn log_format(&self) -> LogFormat {
        self.log_format.value
    }

    pub fn cors_any(&self) -> bool {
        self.cors_any.value
    }

    /// JSON view of every setting and its source, for `config show`.
    pub fn to_json(&self) -> serde_json::Value {
        fn entry<T: serde::Serialize>(r: &Resolved<T>) -> serde_json::Value {
            serde_json::json!({ "value": r.value, "source": r.source.to_string() })
        }
        serde_json::json!({
            "config_path": self.config_path.as_ref().map(|p| p.display().to_string()),
            "host": entry(&self.host),
            "port": entry(&self.port),
            "log_level": entry(&self.log_level),
            "log_format": entry(&self.log_format),
            "cors_any": entry(&self.cors_any),
        })
    }
}

/// CLI overrides for configuration resolution.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
    pub cors_any: Option<bool>,
}

impl ConfigOverrides {
    /// Create empty overrides.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = Some(level.into());
        self
    }

    pub fn with_log_format(mut self, format: LogFormat) -> Self {
        self.log_format = Some(format);
        self
    }

    pub fn with_cors_any(mut self, cors_any: bool) -> Self {
        self.cors_any = Some(cors_any);
        self
    }
}

/// Default location of config.kdl (`~/.config/stickyboard/config.kdl`).
pub fn default_config_path() -> Option<PathBuf> {
    Some(dirs::config_dir()?.join("stickyboard").join("config.kdl"))
}

/// Read and validate a config.kdl file.
pub fn load_config_file(path: &Path) -> Result<ServerConfig> {
    let text = std::fs::read_to_string(path)?;
    let doc: kdl::KdlDocument = text
        .parse()
        .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
    let config = ServerConfig::from_kdl(&doc)
        .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
    config
        .validate()
        .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
    Ok(config)
}

/// Resolve configuration from CLI overrides, the process environment and
/// config.kdl.
///
/// An explicit `config_path` must exist. The default path is optional.
pub fn resolve_config(
    overrides: &ConfigOverrides,
    config_path: Option<&Path>,
) -> Result<ResolvedConfig> {
    let file = match config_path {
        Some(path) => Some((load_config_file(path)?, path.to_path_buf())),
        None => match default_config_path() {
            Some(path) if path.is_file() => Some((load_config_file(&path)?, path)),
            _ => None,
        },
    };
    resolve_config_with(overrides, file, |name| std::env::var(name).ok())
}

/// Resolve configuration with an explicit file and environment lookup.
pub fn resolve_config_with<E>(
    overrides: &ConfigOverrides,
    file: Option<(ServerConfig, PathBuf)>,
    env: E,
) -> Result<ResolvedConfig>
where
    E: Fn(&str) -> Option<String>,
{
    let mut result = ResolvedConfig::default();
    let (file_config, file_source) = match file {
        Some((config, path)) => {
            let source = ValueSource::ConfigFile(path.display().to_string());
            result.config_path = Some(path);
            (config, source)
        }
        None => (ServerConfig::default(), ValueSource::Default),
    };
    let env = |name: &str| env(name).filter(|v| !v.trim().is_empty());

    // Resolve host
    if let Some(ref host) = overrides.host {
        result.host = Resolved::new(host.clone(), ValueSource::CliFlag);
    } else if let Some(host) = env(HOST_ENV) {
        result.host = Resolved::new(host, ValueSource::EnvVar(HOST_ENV.to_string()));
    } else if let Some(ref host) = file_config.host {
        result.host = Resolved::new(host.clone(), file_source.clone());
    }

    // Resolve port
    let env_port = [PORT_ENV, GENERIC_PORT_ENV]
        .into_iter()
        .find_map(|name| env(name).map(|raw| (name, raw)));
    if let Some(port) = overrides.port {
        result.port = Resolved::new(port, ValueSource::CliFlag);
    } else if let Some((name, raw)) = env_port {
        let port = parse_env_port(name, &raw)?;
        result.port = Resolved::new(port, ValueSource::EnvVar(name.to_string()));
    } else if let Some(port) = file_config.port {
        result.port = Resolved::new(port, file_source.clone());
    }

    // Resolve log level
    if let Some(ref level) = overrides.log_level {
        result.log_level = Resolved::new(level.clone(), ValueSource::CliFlag);
    } else if let Some(level) = env(LOG_ENV) {
        result.log_level = Resolved::new(level, ValueSource::EnvVar(LOG_ENV.to_string()));
    } else if let Some(ref level) = file_config.log_level {
        result.log_level = Resolved::new(level.clone(), file_source.clone());
    }

    // Resolve log format
    if let Some(format) = overrides.log_format {
        result.log_format = Resolved::new(format, ValueSource::CliFlag);
    } else if let Some(raw) = env(LOG_FORMAT_ENV) {
        let format = raw.parse::<LogFormat>().map_err(Error::Config)?;
        result.log_format = Resolved::new(format, ValueSource::EnvVar(LOG_FORMAT_ENV.to_string()));
    } else if let Some(format) = file_config.log_format {
        result.log_format = Resolved::new(format, file_source.clone());
    }

    // Resolve CORS
    if let Some(cors_any) = overrides.cors_any {
        result.cors_any = Resolved::new(cors_any, ValueSource::CliFlag);
    } else if let Some(cors_any) = file_config.cors_any {
        result.cors_any = Resolved::new(cors_any, file_source);
    }

    Ok(result)
}

fn parse_env_port(name: &str, raw: &str) -> Result<u16> {
    let trimmed = raw.trim();
    trimmed
        .parse()
        .map_err(|_| Error::Config(format!("{name} must be a port number, got '{raw}'")))
}
