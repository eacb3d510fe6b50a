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
//! HTTP server for the Prometheus endpoint
//!
//! Serves `/metrics` in the Prometheus text exposition format and `/health`.
//! A scrape that fails to collect answers 500; no stale response is served.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use metricsbridge_config::EndpointConfig;
use metricsbridge_exporter::{CacheCollector, Timer};
use tokio::net::TcpListener;
use tracing::{debug, error, info};

#[derive(Clone)]
struct ServerState {
    collector: CacheCollector,
    scrape_timer: Option<Arc<Timer>>,
}

/// HTTP server exposing a [`CacheCollector`]
#[derive(Clone)]
pub struct MetricsServer {
    state: ServerState,
    config: EndpointConfig,
}

impl MetricsServer {
    /// Create a server for `collector`
    pub fn new(collector: CacheCollector, config: EndpointConfig) -> Self {
        Self {
            state: ServerState {
                collector,
                scrape_timer: None,
            },
            config,
        }
    }

    /// Record every scrape's duration in `timer`
    pub fn with_scrape_timer(mut self, timer: Arc<Timer>) -> Self {
        self.state.scrape_timer = Some(timer);
        self
    }

    /// Address the server binds to
    pub fn bind_address(&self) -> String {
        self.config.socket_addr()
    }

    /// Router with the `/metrics` and `/health` routes
    pub fn router(&self) -> Router {
        Router::new()
            .route("/metrics", get(metrics_handler))
            .route("/health", get(health_handler))
            .with_state(self.state.clone())
    }

    /// Serve until the process exits. Returns immediately when disabled.
    pub async fn serve(self) -> anyhow::Result<()> {
        self.serve_with_shutdown(std::future::pending()).await
    }

    /// Serve until `shutdown` completes. Returns immediately when disabled.
    pub async fn serve_with_shutdown<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if !self.config.enabled {
            info!("Metrics endpoint disabled");
            return Ok(());
        }

        let addr = self.bind_address();
        let app = self.router();

        let listener = TcpListener::bind(&addr).await?;
        info!("Metrics endpoint listening on http://{}/metrics", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| anyhow::anyhow!("Metrics server error: {}", e))
    }
}

/// `/metrics`: every cached family in text format
async fn metrics_handler(State(state): State<ServerState>) -> Response {
    let started = Instant::now();
    let rendered = state.collector.render();
    if let Some(timer) = &state.scrape_timer {
        timer.update(started.elapsed());
    }

    match rendered {
        Ok(body) => {
            debug!(bytes = body.len(), "Served scrape");
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, prometheus::TEXT_FORMAT)],
                body,
            )
                .into_response()
        }
        Err(e) => {
            error!("Failed to collect metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to collect metrics: {}", e),
            )
                .into_response()
        }
    }
}

/// `/health`
async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

#[cfg(test)]
mod tests {
    use super::*;
    use metricsbridge_config::Config;

    fn collector() -> CacheCollector {
        CacheCollector::from_config(&Config::default()).unwrap()
    }

    #[test]
    fn test_bind_address() {
        let server = MetricsServer::new(collector(), EndpointConfig::default());
        assert_eq!(server.bind_address(), "0.0.0.0:9104");

        let server = MetricsServer::new(collector(), EndpointConfig::local(19200));
        assert_eq!(server.bind_address(), "127.0.0.1:19200");
    }

    #[tokio::test]
    async fn test_disabled_server() {
        let config = EndpointConfig {
            enabled: false,
            ..EndpointConfig::local(19201)
        };
        let server = MetricsServer::new(collector(), config);
        assert!(server.serve().await.is_ok());
    }
}
