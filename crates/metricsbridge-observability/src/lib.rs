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
//! MetricsBridge observability
//!
//! Structured logging for the exporter, built on `tracing` and
//! `tracing-subscriber`.
//!
//! - Pretty, compact and JSON output
//! - Level from configuration, `RUST_LOG`, or `info`
//!
//! # Example
//!
//! ```no_run
//! use metricsbridge_config::LoggingConfig;
//! use metricsbridge_observability::{init_tracing_with_config, LogConfig};
//!
//! let logging = LoggingConfig::default();
//! init_tracing_with_config(LogConfig::try_from(&logging).unwrap()).unwrap();
//! tracing::info!("Exporter started");
//! ```

pub mod config;
pub mod initialization;

pub use config::{LogConfig, LogError, LogFormat, LogOutput};
pub use initialization::{init_tracing, init_tracing_with_config};

/// Tracing re-exports for convenience
pub use tracing::{debug, error, info, trace, warn, Level};
