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
use crate::schema::{Config, EndpointConfig, LoggingConfig, RelabelSpec};

/// Configuration validation
pub trait Validator {
    fn validate(&self) -> ConfigResult<()>;
}

impl Validator for Config {
    fn validate(&self) -> ConfigResult<()> {
        for (index, filter) in self.filters.iter().enumerate() {
            filter.validate().map_err(|e| match e {
                ConfigError::InvalidValue { field, reason } => {
                    ConfigError::invalid_value(format!("filters[{}].{}", index, field), reason)
                }
                other => other,
            })?;
        }
        self.endpoint.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

impl Validator for RelabelSpec {
    fn validate(&self) -> ConfigResult<()> {
        if self.source_labels.is_empty() {
            return Err(ConfigError::invalid_value(
                "source_labels",
                "at least one source label is required",
            ));
        }

        if self.source_labels.iter().any(|l| l.is_empty()) {
            return Err(ConfigError::invalid_value(
                "source_labels",
                "label names must not be empty",
            ));
        }

        if self.regex.is_empty() {
            return Err(ConfigError::invalid_value("regex", "pattern must not be empty"));
        }

        Ok(())
    }
}

impl Validator for EndpointConfig {
    fn validate(&self) -> ConfigResult<()> {
        if !self.enabled {
            return Ok(());
        }

        if self.port == 0 {
            return Err(ConfigError::invalid_value(
                "endpoint.port",
                format!("port must be between 1 and 65535, got {}", self.port),
            ));
        }

        if self.bind_address.is_empty() {
            return Err(ConfigError::MissingRequired(
                "endpoint.bind_address".to_string(),
            ));
        }

        Ok(())
    }
}

impl Validator for LoggingConfig {
    fn validate(&self) -> ConfigResult<()> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.level.to_lowercase().as_str()) {
            return Err(ConfigError::invalid_value(
                "logging.level",
                format!("must be one of: {}", valid_levels.join(", ")),
            ));
        }

        let valid_formats = ["pretty", "compact", "json"];
        if !valid_formats.contains(&self.format.to_lowercase().as_str()) {
            return Err(ConfigError::invalid_value(
                "logging.format",
                format!("must be one of: {}", valid_formats.join(", ")),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::RelabelAction;

    #[test]
    fn test_valid_config() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_port() {
        let mut config = Config::default();
        config.endpoint.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_disabled_endpoint_skips_port_check() {
        let mut config = Config::default();
        config.endpoint.enabled = false;
        config.endpoint.port = 0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_log_level() {
        let mut config = Config::default();
        config.logging.level = "loud".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_filter_without_source_labels() {
        let mut config = Config::default();
        config
            .filters
            .push(RelabelSpec::new(vec![], "", "foo", RelabelAction::Drop));

        match config.validate() {
            Err(ConfigError::InvalidValue { field, .. }) => {
                assert_eq!(field, "filters[0].source_labels")
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_filter_with_empty_regex() {
        let spec = RelabelSpec::keep(&["cluster"], "", "");
        assert!(spec.validate().is_err());
    }
}
