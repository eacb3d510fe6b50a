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
//! Per-kind value accessors
//!
//! Each accessor holds a weak handle to its instrument. The host registry
//! owns the instrument; once it is removed there, the accessor reports
//! nothing and the sample disappears from the next scrape, even if the
//! removal event has not reached the cache yet.

use std::sync::{Arc, Weak};

use crate::definition::SampleSource;
use crate::instrument::{CounterInstrument, GaugeInstrument, MeterInstrument};

/// Current count of a counter
pub struct CounterSource {
    counter: Weak<dyn CounterInstrument>,
}

impl CounterSource {
    /// Bind to a counter
    pub fn new(counter: &Arc<dyn CounterInstrument>) -> Self {
        Self {
            counter: Arc::downgrade(counter),
        }
    }
}

impl SampleSource for CounterSource {
    fn sample(&self) -> Option<f64> {
        self.counter.upgrade().map(|c| c.count() as f64)
    }
}

/// Scalar value of a gauge, coerced with [`GaugeValue::as_f64`](crate::GaugeValue::as_f64)
pub struct GaugeSource {
    gauge: Weak<dyn GaugeInstrument>,
}

impl GaugeSource {
    /// Bind to a gauge
    pub fn new(gauge: &Arc<dyn GaugeInstrument>) -> Self {
        Self {
            gauge: Arc::downgrade(gauge),
        }
    }
}

impl SampleSource for GaugeSource {
    fn sample(&self) -> Option<f64> {
        self.gauge.upgrade().map(|g| g.value().as_f64())
    }
}

/// Total events marked on a meter
pub struct MeterSource {
    meter: Weak<dyn MeterInstrument>,
}

impl MeterSource {
    /// Bind to a meter
    pub fn new(meter: &Arc<dyn MeterInstrument>) -> Self {
        Self {
            meter: Arc::downgrade(meter),
        }
    }
}

impl SampleSource for MeterSource {
    fn sample(&self) -> Option<f64> {
        self.meter.upgrade().map(|m| m.count() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instrument::GaugeValue;
    use crate::standard::{Counter, FnGauge, Meter};

    #[test]
    fn test_counter_source_tracks_counter() {
        let counter: Arc<dyn CounterInstrument> = Arc::new(Counter::new());
        let source = CounterSource::new(&counter);
        assert_eq!(source.sample(), Some(0.0));
        drop(counter);
        assert_eq!(source.sample(), None);
    }

    #[test]
    fn test_gauge_source_coerces() {
        let gauge: Arc<dyn GaugeInstrument> = Arc::new(FnGauge::new(|| GaugeValue::Bool(true)));
        assert_eq!(GaugeSource::new(&gauge).sample(), Some(1.0));

        let gauge: Arc<dyn GaugeInstrument> =
            Arc::new(FnGauge::new(|| GaugeValue::Unsupported("map")));
        assert_eq!(GaugeSource::new(&gauge).sample(), Some(0.0));
    }

    #[test]
    fn test_meter_source() {
        let meter = Arc::new(Meter::new());
        meter.mark_n(5);
        let handle: Arc<dyn MeterInstrument> = meter;
        assert_eq!(MeterSource::new(&handle).sample(), Some(5.0));
    }
}
