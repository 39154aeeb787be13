//! Viewer configuration loading
//!
//! Values are resolved in priority order:
//! 1. Command-line argument or its environment variable (clap `env`)
//! 2. TOML config file
//! 3. Compiled default

use serde::Deserialize;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::{Error, Result};

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5790;
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "MEDERROR_CONFIG";

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Contents of `config.toml`; every key is optional
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub log_level: Option<String>,
    pub taxonomy: Option<PathBuf>,
    pub annotations: Option<PathBuf>,
}

/// Values supplied on the command line (or via their env fallbacks)
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub log_level: Option<String>,
    pub taxonomy: Option<PathBuf>,
    pub annotations: Option<PathBuf>,
}

/// Fully resolved viewer configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewerConfig {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    /// Taxonomy file preloaded at startup
    pub taxonomy: Option<PathBuf>,
    /// Annotation file preloaded at startup
    pub annotations: Option<PathBuf>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            taxonomy: None,
            annotations: None,
        }
    }
}

impl ViewerConfig {
    /// Merge overrides, the config file at `config_path` (if any) and defaults
    pub fn resolve(overrides: ConfigOverrides, config_path: Option<&Path>) -> Result<Self> {
        let file = match config_path {
            Some(path) => load_toml_config(path)?.unwrap_or_default(),
            None => TomlConfig::default(),
        };
        let defaults = ViewerConfig::default();

        let config = ViewerConfig {
            host: overrides.host.or(file.host).unwrap_or(defaults.host),
            port: overrides.port.or(file.port).unwrap_or(defaults.port),
            log_level: overrides
                .log_level
                .or(file.log_level)
                .unwrap_or(defaults.log_level)
                .to_ascii_lowercase(),
            taxonomy: overrides.taxonomy.or(file.taxonomy),
            annotations: overrides.annotations.or(file.annotations),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(Error::Config("host must not be empty".to_string()));
        }
        if self.port == 0 {
            return Err(Error::Config("port must be non-zero".to_string()));
        }
        if !LOG_LEVELS.contains(&self.log_level.as_str()) {
            return Err(Error::Config(format!(
                "invalid log level '{}' (expected one of {})",
                self.log_level,
                LOG_LEVELS.join(", ")
            )));
        }
        Ok(())
    }

    /// Socket address to listen on; `host` is an IPv4 or IPv6 literal,
    /// the latter with or without brackets
    pub fn bind_address(&self) -> Result<SocketAddr> {
        let host = self.host.trim_start_matches('[').trim_end_matches(']');
        let ip: IpAddr = host
            .parse()
            .map_err(|e| Error::Config(format!("invalid host '{}': {}", self.host, e)))?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Config file location: `$MEDERROR_CONFIG`, else `<config_dir>/mederror/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.is_empty() {
            return Some(PathBuf::from(path));
        }
    }
    dirs::config_dir().map(|d| d.join("mederror").join("config.toml"))
}

/// Read a TOML config file; `Ok(None)` if it does not exist
pub fn load_toml_config(path: &Path) -> Result<Option<TomlConfig>> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("No config file at {}, using defaults", path.display());
            return Ok(None);
        }
        Err(e) => {
            return Err(Error::Config(format!("cannot read {}: {}", path.display(), e)));
        }
    };

    let config = toml::from_str::<TomlConfig>(&content)
        .map_err(|e| Error::Config(format!("invalid config file {}: {}", path.display(), e)))?;
    info!("Loaded config file {}", path.display());
    Ok(Some(config))
}
