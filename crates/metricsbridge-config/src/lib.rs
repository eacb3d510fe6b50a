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
//! Configuration for the MetricsBridge exporter
//!
//! Loads the admission filter rules, the exposition endpoint settings and
//! the node identity labels from TOML, YAML or JSON, with environment
//! variable overrides prefixed `METRICSBRIDGE_`.
//!
//! # Example
//!
//! ```no_run
//! use metricsbridge_config::ConfigLoader;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Reads $METRICSBRIDGE_CONFIG, or returns the defaults when unset
//!     let config = ConfigLoader::new().read_config().await?;
//!     println!("{} filter rules", config.filters.len());
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigFormat, ConfigLoader, CONFIG_PATH_ENV};
pub use schema::*;
pub use validation::Validator;
