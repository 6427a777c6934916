//! Configuration loading for the Defusal bridge.
//!
//! The canonical file is `defusal-config.yaml` next to the binary's
//! working directory. Every field has a default, so an empty or missing
//! file is valid. Because YAML is a superset of JSON, the legacy mod
//! settings document `{"Port": 8085}` also parses; its top-level `Port`
//! key overrides `server.port`.

use std::path::Path;

use serde::Deserialize;

/// Environment variable overriding [`ServerSettings::host`].
pub const ENV_HOST: &str = "DEFUSAL_HOST";
/// Environment variable overriding [`ServerSettings::port`].
pub const ENV_PORT: &str = "DEFUSAL_PORT";
/// Environment variable overriding [`LoggingConfig::level`].
pub const ENV_LOG_LEVEL: &str = "DEFUSAL_LOG_LEVEL";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// An environment override held a value of the wrong type.
    #[error("invalid value {value:?} for {name}")]
    InvalidEnv {
        /// The variable name.
        name: &'static str,
        /// The rejected value.
        value: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BridgeConfig {
    /// HTTP listener settings.
    #[serde(default)]
    pub server: ServerSettings,

    /// Simulation loop settings.
    #[serde(default)]
    pub simulation: SimulationSettings,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Legacy top-level `Port` key from the original settings document.
    #[serde(default, rename = "Port")]
    legacy_port: Option<u16>,
}

impl BridgeConfig {
    /// Load configuration from a YAML (or JSON) file and apply
    /// environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if it does not parse, or
    /// [`ConfigError::InvalidEnv`] if an override is malformed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        Self::from_file_with(path, |name| std::env::var(name).ok())
    }

    /// Load configuration from a file, taking overrides from `lookup`
    /// instead of the process environment.
    ///
    /// # Errors
    ///
    /// Same as [`BridgeConfig::from_file`].
    pub fn from_file_with<F>(path: &Path, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&contents)?;
        config.apply_overrides(lookup)?;
        Ok(config)
    }

    /// Parse configuration from a string. Environment overrides are not
    /// applied.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        // A blank file means all defaults.
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let mut config: Self = serde_yml::from_str(yaml)?;
        if let Some(port) = config.legacy_port.take() {
            config.server.port = port;
        }
        Ok(config)
    }

    /// Apply `DEFUSAL_*` environment variable overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidEnv`] if `DEFUSAL_PORT` is not a
    /// valid port number.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidEnv`] if the port override is not a
    /// valid port number.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup(ENV_HOST) {
            self.server.host = host;
        }
        if let Some(port) = lookup(ENV_PORT) {
            self.server.port = port.trim().parse().map_err(|_parse_error| {
                ConfigError::InvalidEnv {
                    name: ENV_PORT,
                    value: port.clone(),
                }
            })?;
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            self.logging.level = level;
        }
        Ok(())
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerSettings {
    /// Address to bind (default `0.0.0.0`, all interfaces).
    #[serde(default = "default_host")]
    pub host: String,

    /// TCP port (default 8085).
    #[serde(default = "default_port", alias = "Port")]
    pub port: u16,

    /// How long `stop` waits for in-flight requests before abandoning
    /// them.
    #[serde(default = "default_shutdown_grace_ms")]
    pub shutdown_grace_ms: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            shutdown_grace_ms: default_shutdown_grace_ms(),
        }
    }
}

/// Simulation loop settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SimulationSettings {
    /// Real-time milliseconds per tick.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Ticks before the loop ends (0 = unlimited).
    #[serde(default)]
    pub max_ticks: u64,

    /// Pending commands before new ones are rejected (0 = unbounded).
    #[serde(default)]
    pub max_pending_commands: usize,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            max_ticks: 0,
            max_pending_commands: 0,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive (trace, debug, info, warn, error) when
    /// `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::Text,
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

fn default_host() -> String {
    "0.0.0.0".to_owned()
}

const fn default_port() -> u16 {
    8085
}

const fn default_shutdown_grace_ms() -> u64 {
    2_000
}

const fn default_tick_interval_ms() -> u64 {
    100
}

fn default_log_level() -> String {
    "info".to_owned()
}
