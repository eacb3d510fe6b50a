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
//! Multi-sample producers for summary families
//!
//! Histograms, timers and bucket-array gauges all export the same shape:
//! one sample per quantile, labelled `quantile`, followed by a `_count`
//! sample. Producers hold weak handles and produce nothing once their
//! instrument is gone.

use std::sync::{Arc, Weak};

use crate::definition::{MetricDefinition, Sample};
use crate::error::Result;
use crate::family::SampleProducer;
use crate::instrument::{GaugeInstrument, GaugeValue, SamplingInstrument};
use crate::namer::MetricNamer;
use crate::percentile::{EstimatedHistogram, QUANTILES, QUANTILE_LABEL, QUANTILE_LABELS};

/// Converts timer nanoseconds to seconds
pub const NANOS_TO_SECONDS: f64 = 1.0 / 1_000_000_000.0;

/// Quantile and count definitions of one summary-shaped instrument
#[derive(Debug, Clone)]
pub struct SummaryDefinitions {
    quantiles: Vec<MetricDefinition>,
    count: MetricDefinition,
}

impl SummaryDefinitions {
    /// Name every series of the instrument `raw_name`
    pub fn new(namer: &dyn MetricNamer, raw_name: &str) -> Self {
        let quantiles = QUANTILE_LABELS
            .iter()
            .map(|label| namer.parse(raw_name, "", &[QUANTILE_LABEL], &[*label], None))
            .collect();
        let count = namer.parse(raw_name, "_count", &[], &[], None);
        Self { quantiles, count }
    }

    /// Quantile definitions, in [`QUANTILES`] order
    pub fn quantiles(&self) -> &[MetricDefinition] {
        &self.quantiles
    }

    /// The `_count` definition
    pub fn count(&self) -> &MetricDefinition {
        &self.count
    }

    fn push(&self, values: [f64; 6], factor: f64, count: f64, out: &mut Vec<Sample>) {
        out.reserve(self.quantiles.len() + 1);
        for (definition, value) in self.quantiles.iter().zip(values) {
            out.push(definition.sample_with_value(value * factor));
        }
        out.push(self.count.sample_with_value(count));
    }
}

/// Quantiles of a histogram or timer snapshot
pub struct SummaryProducer {
    instrument: Weak<dyn SamplingInstrument>,
    definitions: SummaryDefinitions,
    factor: f64,
}

impl SummaryProducer {
    /// Bind to a sampling instrument. Quantile values are multiplied by
    /// `factor`; the count is not.
    pub fn new(
        instrument: &Arc<dyn SamplingInstrument>,
        definitions: SummaryDefinitions,
        factor: f64,
    ) -> Self {
        Self {
            instrument: Arc::downgrade(instrument),
            definitions,
            factor,
        }
    }
}

impl SampleProducer for SummaryProducer {
    fn produce(&self, out: &mut Vec<Sample>) -> Result<()> {
        let Some(instrument) = self.instrument.upgrade() else {
            return Ok(());
        };

        let count = instrument.count();
        let snapshot = instrument.snapshot();
        let values = QUANTILES.map(|q| snapshot.value(q));
        self.definitions.push(values, self.factor, count as f64, out);
        Ok(())
    }
}

/// Estimated quantiles of a gauge reporting a bucket array
pub struct BucketGaugeProducer {
    gauge: Weak<dyn GaugeInstrument>,
    definitions: SummaryDefinitions,
}

impl BucketGaugeProducer {
    /// Bind to a bucket-array gauge
    pub fn new(gauge: &Arc<dyn GaugeInstrument>, definitions: SummaryDefinitions) -> Self {
        Self {
            gauge: Arc::downgrade(gauge),
            definitions,
        }
    }
}

impl SampleProducer for BucketGaugeProducer {
    fn produce(&self, out: &mut Vec<Sample>) -> Result<()> {
        let Some(gauge) = self.gauge.upgrade() else {
            return Ok(());
        };

        let GaugeValue::Buckets(buckets) = gauge.value() else {
            return Ok(());
        };
        let Some(histogram) = EstimatedHistogram::from_buckets(&buckets) else {
            return Ok(());
        };

        self.definitions.push(
            histogram.percentiles(),
            1.0,
            histogram.total_count() as f64,
            out,
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::namer::DefaultMetricNamer;
    use crate::standard::{FnGauge, Histogram, Timer};
    use std::time::Duration;

    fn definitions(raw: &str) -> SummaryDefinitions {
        SummaryDefinitions::new(&DefaultMetricNamer::default(), raw)
    }

    #[test]
    fn test_summary_definitions() {
        let defs = definitions("h_nr_0");
        assert_eq!(defs.quantiles().len(), 6);
        assert_eq!(defs.quantiles()[0].name(), "h_nr_0");
        assert_eq!(defs.quantiles()[5].label_value("quantile"), Some("0.999"));
        assert_eq!(defs.count().name(), "h_nr_0_count");
        assert_eq!(defs.count().label_value("quantile"), None);
    }

    #[test]
    fn test_histogram_produces_seven_samples() {
        let histogram = Arc::new(Histogram::new());
        for v in 1..=100 {
            histogram.update(v);
        }
        let handle: Arc<dyn SamplingInstrument> = histogram;
        let producer = SummaryProducer::new(&handle, definitions("h"), 1.0);

        let mut out = Vec::new();
        producer.produce(&mut out).unwrap();
        assert_eq!(out.len(), 7);
        assert_eq!(out[6].value, 100.0);
        assert!((out[0].value - 50.5).abs() < 1e-9);
    }

    #[test]
    fn test_timer_scaled_to_seconds() {
        let timer = Arc::new(Timer::new());
        timer.update(Duration::from_secs(2));
        let handle: Arc<dyn SamplingInstrument> = timer;
        let producer = SummaryProducer::new(&handle, definitions("t"), NANOS_TO_SECONDS);

        let mut out = Vec::new();
        producer.produce(&mut out).unwrap();
        assert!((out[0].value - 2.0).abs() < 1e-9);
        assert_eq!(out[6].value, 1.0);
    }

    #[test]
    fn test_dropped_instrument_produces_nothing() {
        let handle: Arc<dyn SamplingInstrument> = Arc::new(Histogram::new());
        let producer = SummaryProducer::new(&handle, definitions("h"), 1.0);
        drop(handle);

        let mut out = Vec::new();
        producer.produce(&mut out).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_bucket_gauge() {
        let gauge: Arc<dyn GaugeInstrument> =
            Arc::new(FnGauge::new(|| GaugeValue::Buckets(vec![1, 2, 3, 0])));
        let producer = BucketGaugeProducer::new(&gauge, definitions("gh"));

        let mut out = Vec::new();
        producer.produce(&mut out).unwrap();
        let values: Vec<f64> = out.iter().map(|s| s.value).collect();
        assert_eq!(values, vec![2.0, 3.0, 3.0, 3.0, 3.0, 3.0, 6.0]);
    }

    #[test]
    fn test_empty_bucket_gauge_produces_nothing() {
        let gauge: Arc<dyn GaugeInstrument> =
            Arc::new(FnGauge::new(|| GaugeValue::Buckets(Vec::new())));
        let producer = BucketGaugeProducer::new(&gauge, definitions("gh"));

        let mut out = Vec::new();
        producer.produce(&mut out).unwrap();
        assert!(out.is_empty());
    }
}
