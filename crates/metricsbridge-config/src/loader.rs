// Copyright (C) 2026  winnyboy5
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.
use crate::error::{ConfigError, ConfigResult};
use crate::schema::Config;
use crate::validation::Validator;
use std::path::Path;
use tokio::fs;
use tracing::{debug, info};

/// Environment variable naming the configuration file
pub const CONFIG_PATH_ENV: &str = "METRICSBRIDGE_CONFIG";

/// Configuration format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Yaml,
    Json,
}

impl ConfigFormat {
    /// Detect format from file extension
    pub fn from_path<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(ConfigFormat::Toml),
            Some("yaml") | Some("yml") => Ok(ConfigFormat::Yaml),
            Some("json") => Ok(ConfigFormat::Json),
            Some(ext) => Err(ConfigError::UnsupportedFormat(ext.to_string())),
            None => Err(ConfigError::InvalidPath(path.to_path_buf())),
        }
    }

    /// Get format name as string
    pub fn name(&self) -> &'static str {
        match self {
            ConfigFormat::Toml => "TOML",
            ConfigFormat::Yaml => "YAML",
            ConfigFormat::Json => "JSON",
        }
    }
}

/// Configuration loader
pub struct ConfigLoader {
    validate: bool,
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        ConfigLoader { validate: true }
    }

    /// Create a loader without validation
    pub fn without_validation() -> Self {
        ConfigLoader { validate: false }
    }

    /// Load configuration from a file
    pub async fn load_file<P: AsRef<Path>>(&self, path: P) -> ConfigResult<Config> {
        let path = path.as_ref();
        debug!("Loading configuration from: {}", path.display());

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).await?;
        let format = ConfigFormat::from_path(path)?;

        info!(
            "Loaded {} configuration file: {}",
            format.name(),
            path.display()
        );

        self.load_from_string(&content, format)
    }

    /// Load configuration from a string
    pub fn load_from_string(&self, content: &str, format: ConfigFormat) -> ConfigResult<Config> {
        let config = match format {
            ConfigFormat::Toml => toml::from_str::<Config>(content)?,
            ConfigFormat::Yaml => parse_yaml(content)?,
            ConfigFormat::Json => serde_json::from_str::<Config>(content)?,
        };

        debug!(
            filters = config.filters.len(),
            "Configuration loaded from {}",
            format.name()
        );

        if self.validate {
            config.validate()?;
        }

        Ok(config)
    }

    /// Load the file named by `METRICSBRIDGE_CONFIG`, or the defaults when unset,
    /// then apply environment overrides
    pub async fn read_config(&self) -> ConfigResult<Config> {
        let mut config = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) if !path.is_empty() => self.load_file(&path).await?,
            _ => {
                debug!("{} not set, using default configuration", CONFIG_PATH_ENV);
                Config::default()
            }
        };

        self.apply_env_overrides(&mut config)?;

        if self.validate {
            config.validate()?;
        }

        Ok(config)
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&self, config: &mut Config) -> ConfigResult<()> {
        if let Ok(value) = std::env::var("METRICSBRIDGE_PORT") {
            config.endpoint.port = value.parse().map_err(|_| {
                ConfigError::env_var_parsing_error(
                    "METRICSBRIDGE_PORT",
                    &value,
                    "expected valid port number (1-65535)",
                )
            })?;
        }
        if let Ok(value) = std::env::var("METRICSBRIDGE_BIND_ADDRESS") {
            config.endpoint.bind_address = value;
        }
        if let Ok(value) = std::env::var("METRICSBRIDGE_ENDPOINT_ENABLED") {
            config.endpoint.enabled = parse_bool("METRICSBRIDGE_ENDPOINT_ENABLED", &value)?;
        }
        if let Ok(value) = std::env::var("METRICSBRIDGE_LOG_LEVEL") {
            config.logging.level = value;
        }

        // Node identity normally comes from the host topology
        if let Ok(value) = std::env::var("METRICSBRIDGE_HOST_ID") {
            config.node.host = value;
        }
        if let Ok(value) = std::env::var("METRICSBRIDGE_INSTANCE") {
            config.node.instance = value;
        }
        if let Ok(value) = std::env::var("METRICSBRIDGE_CLUSTER") {
            config.node.cluster = value;
        }
        if let Ok(value) = std::env::var("METRICSBRIDGE_DATACENTER") {
            config.node.datacenter = value;
        }
        if let Ok(value) = std::env::var("METRICSBRIDGE_RACK") {
            config.node.rack = value;
        }

        Ok(())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// An empty YAML document deserializes to `null`, which `Config` rejects
fn parse_yaml(content: &str) -> ConfigResult<Config> {
    if content.trim().is_empty() {
        return Ok(Config::default());
    }
    Ok(serde_yaml::from_str(content)?)
}

/// Parse boolean from string (accepts: true, false, yes, no, 1, 0, on, off)
fn parse_bool(variable_name: &str, value: &str) -> ConfigResult<bool> {
    match value.to_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Ok(true),
        "false" | "no" | "0" | "off" => Ok(false),
        _ => Err(ConfigError::env_var_parsing_error(
            variable_name,
            value,
            "expected 'true', 'false', 'yes', 'no', '1', '0', 'on', or 'off'",
        )),
    }
}
