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
//! Incremental metric-family cache bridging a live instrument registry to
//! Prometheus
//!
//! Instruments (counters, gauges, histograms, meters, timers) come and go in
//! a [`MetricRegistry`] at any time. A [`CacheCollector`] listens to the
//! registry's lifecycle events, names and labels each instrument once with a
//! [`MetricNamer`], gates it through a [`MetricFilter`] and keeps the result
//! in a [`FamilyCache`]. A scrape only refreshes values.
//!
//! # Example
//!
//! ```
//! use metricsbridge_config::{Config, RelabelSpec};
//! use metricsbridge_exporter::{CacheCollector, MetricRegistry};
//!
//! # fn main() -> metricsbridge_exporter::Result<()> {
//! let mut config = Config::default();
//! config.filters.push(RelabelSpec::drop(&["__name__"], "", "internal_.*"));
//!
//! let registry = MetricRegistry::new();
//! let collector = CacheCollector::from_config(&config)?;
//! collector.attach(&registry);
//!
//! registry.counter("requests")?.inc();
//! registry.counter("internal_retries")?.inc();
//!
//! let families = collector.collect()?;
//! assert_eq!(families.len(), 1);
//! assert_eq!(families[0].name, "requests");
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod collector;
pub mod definition;
pub mod error;
pub mod exposition;
pub mod family;
pub mod filter;
pub mod instrument;
pub mod listener;
pub mod namer;
pub mod percentile;
pub mod producer;
pub mod registry;
pub mod source;
pub mod standard;

pub use cache::{Contribution, FamilyCache};
pub use collector::CacheCollector;
pub use definition::{MetricDefinition, Sample, SampleSource};
pub use error::{ExporterError, Result};
pub use family::{FamilyEntry, FamilyKind, MetricFamilySamples, SampleProducer};
pub use filter::{FilterRule, MetricFilter, METRIC_NAME_LABEL};
pub use instrument::{
    CounterInstrument, GaugeInstrument, GaugeValue, Instrument, InstrumentKind, MeterInstrument,
    RegistryEvent, RegistryListener, SamplingInstrument, Snapshot,
};
pub use listener::MetricRegistryListener;
pub use namer::{DefaultMetricNamer, MetricNamer};
pub use percentile::{EstimatedHistogram, QUANTILES};
pub use registry::MetricRegistry;
pub use standard::{Counter, FnGauge, Histogram, Meter, Timer};

// Re-export prometheus types for convenience
pub use prometheus::{Encoder, TextEncoder};
