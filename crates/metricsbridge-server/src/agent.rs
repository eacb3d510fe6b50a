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
//! Exporter startup inside a host process
//!
//! [`start`] is what a host calls once its registry exists: it reads the
//! configuration, installs logging, attaches a [`CacheCollector`] to the
//! registry and spawns the `/metrics` endpoint.

use std::sync::Arc;

use anyhow::Context;
use metricsbridge_config::{Config, ConfigLoader, LoggingConfig};
use metricsbridge_exporter::{CacheCollector, MetricRegistry, Timer};
use metricsbridge_observability::{init_tracing_with_config, LogConfig};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::server::MetricsServer;

/// Registry name of the timer recording scrape durations
pub const SCRAPE_TIMER: &str = "metricsbridge.scrape";

/// Running exporter
pub struct Agent {
    collector: CacheCollector,
    scrape_timer: Arc<Timer>,
    server: JoinHandle<anyhow::Result<()>>,
    shutdown: Option<oneshot::Sender<()>>,
}

/// Start the exporter with configuration read from the environment.
///
/// Must be called from within a Tokio runtime.
pub async fn start(registry: &MetricRegistry) -> anyhow::Result<Agent> {
    let config = ConfigLoader::new()
        .read_config()
        .await
        .context("Failed to read exporter configuration")?;
    start_with_config(registry, config).await
}

/// Start the exporter with an explicit configuration
pub async fn start_with_config(registry: &MetricRegistry, config: Config) -> anyhow::Result<Agent> {
    init_logging(&config.logging);

    info!("Starting metric collector");
    let collector =
        CacheCollector::from_config(&config).context("Failed to build metric collector")?;
    collector.attach(registry);

    let scrape_timer = registry
        .timer(SCRAPE_TIMER)
        .context("Failed to register scrape timer")?;

    let server = MetricsServer::new(collector.clone(), config.endpoint.clone())
        .with_scrape_timer(Arc::clone(&scrape_timer));

    let (tx, rx) = oneshot::channel::<()>();
    let handle = tokio::spawn(server.serve_with_shutdown(async {
        let _ = rx.await;
    }));

    info!(
        endpoint = %config.endpoint.socket_addr(),
        enabled = config.endpoint.enabled,
        "Metric collector started"
    );

    Ok(Agent {
        collector,
        scrape_timer,
        server: handle,
        shutdown: Some(tx),
    })
}

impl Agent {
    /// Collector attached to the host registry
    pub fn collector(&self) -> &CacheCollector {
        &self.collector
    }

    /// Timer recording scrape durations
    pub fn scrape_timer(&self) -> &Arc<Timer> {
        &self.scrape_timer
    }

    /// Stop the endpoint and wait for it to drain
    pub async fn shutdown(mut self) -> anyhow::Result<()> {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        self.server.await.context("Metrics server task failed")?
    }
}

fn init_logging(logging: &LoggingConfig) {
    match LogConfig::try_from(logging) {
        Ok(config) => {
            if let Err(e) = init_tracing_with_config(config) {
                // The host may own the global subscriber.
                debug!("Logging not installed: {}", e);
            }
        }
        Err(e) => warn!("Ignoring logging configuration: {}", e),
    }
}
