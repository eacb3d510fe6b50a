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
//! Collector façade
//!
//! Owns the family cache and the listener feeding it. A scrape refreshes
//! every cached family and returns the whole collection, or fails as a
//! whole if any family fails.

use std::sync::Arc;

use metricsbridge_config::Config;
use prometheus::core::{Collector, Desc};
use prometheus::proto::MetricFamily;
use tracing::{debug, error, info};

use crate::cache::FamilyCache;
use crate::error::Result;
use crate::exposition;
use crate::family::MetricFamilySamples;
use crate::filter::MetricFilter;
use crate::listener::MetricRegistryListener;
use crate::namer::{DefaultMetricNamer, MetricNamer};
use crate::registry::MetricRegistry;

/// Cache-backed collector, registrable in a [`prometheus::Registry`]
#[derive(Clone)]
pub struct CacheCollector {
    cache: Arc<FamilyCache>,
    listener: Arc<MetricRegistryListener>,
}

impl CacheCollector {
    /// Create a collector with an empty cache
    pub fn new(namer: Arc<dyn MetricNamer>, filter: MetricFilter) -> Self {
        let cache = Arc::new(FamilyCache::new());
        let listener = Arc::new(MetricRegistryListener::new(
            Arc::clone(&cache),
            namer,
            Arc::new(filter),
        ));
        Self { cache, listener }
    }

    /// Create a collector from configuration.
    ///
    /// Fails if any filter pattern does not compile.
    pub fn from_config(config: &Config) -> Result<Self> {
        let filter = MetricFilter::from_specs(&config.filters)?;
        info!(
            rules = filter.len(),
            cluster = %config.node.cluster,
            "Metric collector configured"
        );
        Ok(Self::new(
            Arc::new(DefaultMetricNamer::new(&config.node)),
            filter,
        ))
    }

    /// Subscribe to `registry`; existing instruments are added right away
    pub fn attach(&self, registry: &MetricRegistry) {
        registry.add_listener(Arc::<MetricRegistryListener>::clone(&self.listener));
    }

    /// The listener feeding this collector's cache
    pub fn listener(&self) -> Arc<MetricRegistryListener> {
        Arc::clone(&self.listener)
    }

    /// The underlying cache
    pub fn cache(&self) -> &Arc<FamilyCache> {
        &self.cache
    }

    /// Refresh and return every cached family, sorted by name.
    ///
    /// Any failing family fails the whole collection.
    pub fn collect(&self) -> Result<Vec<MetricFamilySamples>> {
        let entries = self.cache.entries();
        let mut families = Vec::with_capacity(entries.len());

        for entry in entries {
            match entry.snapshot() {
                Ok(family) => families.push(family),
                Err(e) => {
                    error!(family = entry.name(), error = %e, "Failed to collect metrics");
                    return Err(e);
                }
            }
        }

        families.sort_by(|a, b| a.name.cmp(&b.name));
        debug!(families = families.len(), "Collected metric families");
        Ok(families)
    }

    /// Collect and convert to the Prometheus model
    pub fn gather(&self) -> Result<Vec<MetricFamily>> {
        Ok(exposition::to_metric_families(&self.collect()?))
    }

    /// Collect and encode in the Prometheus text format
    pub fn render(&self) -> Result<String> {
        exposition::encode_text(&self.gather()?)
    }
}

/// Lets the cache be registered in a shared `prometheus::Registry`.
///
/// [`Collector::collect`] cannot report an error, so a failed collection is
/// logged and yields no families: the scrape succeeds without them. Callers
/// that must fail the scrape instead should use [`CacheCollector::gather`]
/// or [`CacheCollector::render`].
impl Collector for CacheCollector {
    fn desc(&self) -> Vec<&Desc> {
        // Families come and go with instruments
        Vec::new()
    }

    fn collect(&self) -> Vec<MetricFamily> {
        match self.gather() {
            Ok(families) => families,
            Err(e) => {
                error!(error = %e, "Dropping scrape after collection failure");
                Vec::new()
            }
        }
    }
}

impl std::fmt::Debug for CacheCollector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheCollector")
            .field("cache", &self.cache)
            .finish()
    }
}
