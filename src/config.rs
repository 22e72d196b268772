//! Configuration module for tiny-serve.
//!
//! Supports both command-line arguments and TOML configuration file.
//! CLI arguments take precedence over config file values.

use clap::{Parser, ValueEnum};
use serde::Deserialize;
use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::protocols::hello::client::COUNT;

/// Which protocol endpoint to run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    /// GET file server, stopped by `/exit`
    #[default]
    File,
    /// Hello server, stopped by `bye`
    Hello,
    /// Hello client driving a hello server
    HelloClient,
}

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "tiny-serve")]
#[command(author = "tiny-serve authors")]
#[command(version = "0.1.0")]
#[command(about = "A one-client-at-a-time file server and hello server", long_about = None)]
pub struct CliArgs {
    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Endpoint to run
    #[arg(short = 'M', long, value_enum)]
    pub mode: Option<Mode>,

    /// Address to bind to, or the server to connect to in client mode
    #[arg(short = 'H', long)]
    pub host: Option<String>,

    /// Candidate port, tried in order (repeatable). Client mode uses the first.
    #[arg(short, long = "port")]
    pub ports: Vec<u16>,

    /// Per-connection read timeout in milliseconds (0 = none)
    #[arg(long)]
    pub read_timeout_ms: Option<u64>,

    /// Name sent by the hello client
    #[arg(short, long)]
    pub name: Option<String>,

    /// Number of greeting rounds for the hello client
    #[arg(long)]
    pub count: Option<usize>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    pub log_level: Option<String>,
}

/// TOML configuration file structure
#[derive(Debug, Deserialize, Default)]
pub struct TomlConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub client: ClientConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server-related configuration
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub mode: Mode,
    /// Address to bind to
    #[serde(default = "default_host")]
    pub host: String,
    /// Candidate ports; empty picks any free port
    #[serde(default)]
    pub ports: Vec<u16>,
    /// Read timeout in milliseconds (0 = none)
    #[serde(default)]
    pub read_timeout_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            mode: Mode::default(),
            host: default_host(),
            ports: Vec::new(),
            read_timeout_ms: 0,
        }
    }
}

/// Hello client configuration
#[derive(Debug, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_count")]
    pub count: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            count: default_count(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_name() -> String {
    "world".to_string()
}

fn default_count() -> usize {
    COUNT
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Final resolved configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub mode: Mode,
    pub host: String,
    pub ports: Vec<u16>,
    pub read_timeout: Option<Duration>,
    pub name: String,
    pub count: usize,
    pub log_level: String,
}

impl Config {
    /// Load configuration from CLI args and optional TOML file.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_args(CliArgs::parse())
    }

    /// Merge parsed CLI args with the TOML file they point to, if any.
    /// CLI arguments take precedence over TOML file values.
    pub fn from_args(cli: CliArgs) -> Result<Self, ConfigError> {
        let toml_config = if let Some(ref config_path) = cli.config {
            let contents = std::fs::read_to_string(config_path)
                .map_err(|e| ConfigError::FileRead(config_path.clone(), e))?;
            toml::from_str(&contents)
                .map_err(|e| ConfigError::TomlParse(config_path.clone(), e))?
        } else {
            TomlConfig::default()
        };

        let read_timeout_ms = cli
            .read_timeout_ms
            .unwrap_or(toml_config.server.read_timeout_ms);

        Ok(Config {
            mode: cli.mode.unwrap_or(toml_config.server.mode),
            host: cli.host.unwrap_or(toml_config.server.host),
            ports: if cli.ports.is_empty() {
                toml_config.server.ports
            } else {
                cli.ports
            },
            read_timeout: (read_timeout_ms > 0).then(|| Duration::from_millis(read_timeout_ms)),
            name: cli.name.unwrap_or(toml_config.client.name),
            count: cli.count.unwrap_or(toml_config.client.count),
            log_level: cli.log_level.unwrap_or(toml_config.logging.level),
        })
    }

    /// Address the servers bind on.
    pub fn bind_host(&self) -> Result<IpAddr, ConfigError> {
        self.host
            .parse()
            .map_err(|_| ConfigError::Invalid(format!("'{}' is not an IP address", self.host)))
    }

    /// Port the hello client connects to.
    pub fn target_port(&self) -> Result<u16, ConfigError> {
        self.ports
            .first()
            .copied()
            .ok_or_else(|| ConfigError::Invalid("client mode needs a --port".to_string()))
    }
}

/// Configuration loading errors
#[derive(Debug)]
pub enum ConfigError {
    FileRead(PathBuf, std::io::Error),
    TomlParse(PathBuf, toml::de::Error),
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::FileRead(path, e) => {
                write!(f, "Failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::TomlParse(path, e) => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), e)
            }
            ConfigError::Invalid(msg) => write!(f, "Invalid configuration: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}
