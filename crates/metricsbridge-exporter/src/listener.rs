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
//! Registry listener
//!
//! Turns instrument lifecycle events into family cache mutations. Every
//! kind has its own add and remove handler; [`MetricRegistryListener::handle`]
//! dispatches on the event and instrument tags.
//!
//! | instrument | family | series |
//! |------------|--------|--------|
//! | counter | gauge | `<name>` |
//! | gauge (scalar) | gauge | `<name>` |
//! | gauge (bucket array) | summary | `<name>{quantile}` and `<name>_count` |
//! | histogram | summary | `<name>{quantile}` and `<name>_count` |
//! | timer | summary | as histogram, quantiles in seconds |
//! | meter | counter | `<name>_total` |

use std::sync::Arc;

use tracing::debug;

use crate::cache::{Contribution, FamilyCache};
use crate::definition::{MetricDefinition, SampleSource};
use crate::family::FamilyKind;
use crate::filter::MetricFilter;
use crate::instrument::{
    CounterInstrument, GaugeInstrument, Instrument, InstrumentKind, MeterInstrument,
    RegistryEvent, RegistryListener, SamplingInstrument,
};
use crate::namer::MetricNamer;
use crate::producer::{BucketGaugeProducer, SummaryDefinitions, SummaryProducer, NANOS_TO_SECONDS};
use crate::source::{CounterSource, GaugeSource, MeterSource};

/// Help text attached to a family by its first contributor
pub fn help_text(raw_name: &str, kind: InstrumentKind) -> String {
    format!(
        "Generated from registry instrument (metric={}, type={})",
        raw_name, kind
    )
}

/// Applies registry events to a [`FamilyCache`]
#[derive(Clone)]
pub struct MetricRegistryListener {
    cache: Arc<FamilyCache>,
    namer: Arc<dyn MetricNamer>,
    filter: Arc<MetricFilter>,
}

impl MetricRegistryListener {
    /// Create a listener feeding `cache`
    pub fn new(
        cache: Arc<FamilyCache>,
        namer: Arc<dyn MetricNamer>,
        filter: Arc<MetricFilter>,
    ) -> Self {
        Self {
            cache,
            namer,
            filter,
        }
    }

    /// Apply one event
    pub fn handle(&self, event: &RegistryEvent) {
        match event {
            RegistryEvent::Added { name, instrument } => match instrument {
                Instrument::Counter(counter) => self.on_counter_added(name, counter),
                Instrument::Gauge(gauge) => self.on_gauge_added(name, gauge),
                Instrument::Histogram(histogram) => self.on_histogram_added(name, histogram),
                Instrument::Meter(meter) => self.on_meter_added(name, meter),
                Instrument::Timer(timer) => self.on_timer_added(name, timer),
            },
            RegistryEvent::Removed { name, kind } => match kind {
                InstrumentKind::Counter => self.on_counter_removed(name),
                InstrumentKind::Gauge => self.on_gauge_removed(name),
                InstrumentKind::Histogram => self.on_histogram_removed(name),
                InstrumentKind::Meter => self.on_meter_removed(name),
                InstrumentKind::Timer => self.on_timer_removed(name),
            },
        }
    }

    /// Counter: one gauge series holding the current count
    pub fn on_counter_added(&self, name: &str, counter: &Arc<dyn CounterInstrument>) {
        let source: Arc<dyn SampleSource> = Arc::new(CounterSource::new(counter));
        let definition = self.namer.parse(name, "", &[], &[], Some(source));
        self.add_definition(name, InstrumentKind::Counter, FamilyKind::Gauge, definition);
    }

    /// Counter removed
    pub fn on_counter_removed(&self, name: &str) {
        self.remove(name, InstrumentKind::Counter);
    }

    /// Gauge: a scalar series, or a summary when it reports a bucket array
    pub fn on_gauge_added(&self, name: &str, gauge: &Arc<dyn GaugeInstrument>) {
        if gauge.value().is_buckets() {
            self.on_bucket_gauge_added(name, gauge);
            return;
        }

        let source: Arc<dyn SampleSource> = Arc::new(GaugeSource::new(gauge));
        let definition = self.namer.parse(name, "", &[], &[], Some(source));
        self.add_definition(name, InstrumentKind::Gauge, FamilyKind::Gauge, definition);
    }

    fn on_bucket_gauge_added(&self, name: &str, gauge: &Arc<dyn GaugeInstrument>) {
        let Some(base) = self.admit(name, InstrumentKind::Gauge) else {
            return;
        };
        let definitions = SummaryDefinitions::new(self.namer.as_ref(), name);
        let producer = Arc::new(BucketGaugeProducer::new(gauge, definitions));
        self.cache.register(
            name,
            base.name(),
            FamilyKind::Summary,
            &help_text(name, InstrumentKind::Gauge),
            Contribution::Producer(producer),
        );
    }

    /// Gauge removed
    pub fn on_gauge_removed(&self, name: &str) {
        self.remove(name, InstrumentKind::Gauge);
    }

    /// Histogram: quantiles of the retained observations plus the count
    pub fn on_histogram_added(&self, name: &str, histogram: &Arc<dyn SamplingInstrument>) {
        self.add_summary(name, InstrumentKind::Histogram, histogram, 1.0);
    }

    /// Histogram removed
    pub fn on_histogram_removed(&self, name: &str) {
        self.remove(name, InstrumentKind::Histogram);
    }

    /// Meter: one counter series `<name>_total`
    pub fn on_meter_added(&self, name: &str, meter: &Arc<dyn MeterInstrument>) {
        let source: Arc<dyn SampleSource> = Arc::new(MeterSource::new(meter));
        let definition = self.namer.parse(name, "_total", &[], &[], Some(source));
        self.add_definition(name, InstrumentKind::Meter, FamilyKind::Counter, definition);
    }

    /// Meter removed
    pub fn on_meter_removed(&self, name: &str) {
        self.remove(name, InstrumentKind::Meter);
    }

    /// Timer: as a histogram, with quantiles converted to seconds
    pub fn on_timer_added(&self, name: &str, timer: &Arc<dyn SamplingInstrument>) {
        self.add_summary(name, InstrumentKind::Timer, timer, NANOS_TO_SECONDS);
    }

    /// Timer removed
    pub fn on_timer_removed(&self, name: &str) {
        self.remove(name, InstrumentKind::Timer);
    }

    fn add_definition(
        &self,
        name: &str,
        instrument: InstrumentKind,
        family: FamilyKind,
        definition: MetricDefinition,
    ) {
        if !self.filter.matches(&definition, name) {
            debug!(name, kind = %instrument, "Instrument filtered out");
            return;
        }

        let family_name = definition.name().to_string();
        self.cache.register(
            name,
            &family_name,
            family,
            &help_text(name, instrument),
            Contribution::Definition(definition),
        );
    }

    fn add_summary(
        &self,
        name: &str,
        kind: InstrumentKind,
        instrument: &Arc<dyn SamplingInstrument>,
        factor: f64,
    ) {
        let Some(base) = self.admit(name, kind) else {
            return;
        };
        let definitions = SummaryDefinitions::new(self.namer.as_ref(), name);
        let producer = Arc::new(SummaryProducer::new(instrument, definitions, factor));
        self.cache.register(
            name,
            base.name(),
            FamilyKind::Summary,
            &help_text(name, kind),
            Contribution::Producer(producer),
        );
    }

    /// Base definition of a summary family, if the filter admits it
    fn admit(&self, name: &str, kind: InstrumentKind) -> Option<MetricDefinition> {
        let base = self.namer.parse(name, "", &[], &[], None);
        if self.filter.matches(&base, name) {
            Some(base)
        } else {
            debug!(name, %kind, "Instrument filtered out");
            None
        }
    }

    fn remove(&self, name: &str, kind: InstrumentKind) {
        if !self.cache.unregister(name) {
            debug!(name, %kind, "Removed instrument was not exported");
        }
    }
}

impl RegistryListener for MetricRegistryListener {
    fn on_event(&self, event: &RegistryEvent) {
        self.handle(event);
    }
}

impl std::fmt::Debug for MetricRegistryListener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricRegistryListener")
            .field("cache", &self.cache)
            .field("filter", &self.filter)
            .finish()
    }
}
