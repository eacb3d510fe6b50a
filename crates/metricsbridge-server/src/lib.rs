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
//! Prometheus endpoint for MetricsBridge
//!
//! Wires a [`CacheCollector`](metricsbridge_exporter::CacheCollector) to an
//! axum server and provides the startup entry point a host process calls.
//!
//! # Example
//!
//! ```no_run
//! use metricsbridge_exporter::MetricRegistry;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let registry = MetricRegistry::new();
//! let agent = metricsbridge_server::start(&registry).await?;
//!
//! registry.counter("org.apache.cassandra.metrics.Client.connectedNativeClients")?.inc();
//!
//! agent.shutdown().await?;
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod server;

pub use agent::{start, start_with_config, Agent, SCRAPE_TIMER};
pub use server::MetricsServer;
