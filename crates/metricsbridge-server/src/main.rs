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
//! Standalone exporter
//!
//! Serves the exporter's own instruments. Useful for checking an endpoint
//! and its configuration without a host process.

use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use metricsbridge_exporter::{FnGauge, GaugeValue, MetricRegistry};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let registry = MetricRegistry::new();

    let started = Instant::now();
    registry.register_gauge(
        "metricsbridge.uptime_seconds",
        Arc::new(FnGauge::new(move || {
            GaugeValue::Float(started.elapsed().as_secs_f64())
        })),
    )?;

    let agent = metricsbridge_server::start(&registry).await?;

    tokio::signal::ctrl_c().await?;
    info!("Shutting down");

    agent.shutdown().await
}
