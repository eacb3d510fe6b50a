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
//! Instrument model consumed by the exporter
//!
//! The host registry owns its instruments; the exporter only sees them
//! through these traits and through [`RegistryEvent`]s.

use std::fmt;
use std::sync::Arc;

/// Monotonic (or up/down) counter
pub trait CounterInstrument: Send + Sync {
    /// Current count
    fn count(&self) -> i64;
}

/// Point-in-time value of arbitrary type
pub trait GaugeInstrument: Send + Sync {
    /// Current value
    fn value(&self) -> GaugeValue;
}

/// Event counter
pub trait MeterInstrument: Send + Sync {
    /// Number of events marked so far
    fn count(&self) -> u64;
}

/// Distribution of observed values (histograms and timers)
pub trait SamplingInstrument: Send + Sync {
    /// Number of observations
    fn count(&self) -> u64;

    /// Snapshot of the currently retained observations
    fn snapshot(&self) -> Snapshot;
}

/// Value reported by a gauge
#[derive(Debug, Clone, PartialEq)]
pub enum GaugeValue {
    /// Floating point value
    Float(f64),
    /// Integer value
    Int(i64),
    /// Boolean, exported as 1 or 0
    Bool(bool),
    /// Estimated-histogram bucket counts, the last bucket being the overflow bucket
    Buckets(Vec<u64>),
    /// A value the exporter cannot represent, tagged with its type name
    Unsupported(&'static str),
    /// No value available
    Absent,
}

impl GaugeValue {
    /// Scalar coercion: numbers pass through, booleans become 1/0 and
    /// everything else becomes 0.
    pub fn as_f64(&self) -> f64 {
        match self {
            GaugeValue::Float(v) => *v,
            GaugeValue::Int(v) => *v as f64,
            GaugeValue::Bool(true) => 1.0,
            GaugeValue::Bool(false) => 0.0,
            GaugeValue::Buckets(_) | GaugeValue::Unsupported(_) | GaugeValue::Absent => 0.0,
        }
    }

    /// Whether this value is a bucket array
    pub fn is_buckets(&self) -> bool {
        matches!(self, GaugeValue::Buckets(_))
    }
}

impl From<f64> for GaugeValue {
    fn from(v: f64) -> Self {
        GaugeValue::Float(v)
    }
}

impl From<i64> for GaugeValue {
    fn from(v: i64) -> Self {
        GaugeValue::Int(v)
    }
}

impl From<i32> for GaugeValue {
    fn from(v: i32) -> Self {
        GaugeValue::Int(i64::from(v))
    }
}

impl From<u32> for GaugeValue {
    fn from(v: u32) -> Self {
        GaugeValue::Int(i64::from(v))
    }
}

impl From<bool> for GaugeValue {
    fn from(v: bool) -> Self {
        GaugeValue::Bool(v)
    }
}

impl From<Vec<u64>> for GaugeValue {
    fn from(v: Vec<u64>) -> Self {
        GaugeValue::Buckets(v)
    }
}

/// Sorted view of a sampling instrument's retained observations
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    values: Vec<f64>,
}

impl Snapshot {
    /// Build a snapshot from unsorted observations
    pub fn new(mut values: Vec<f64>) -> Self {
        values.sort_by(f64::total_cmp);
        Self { values }
    }

    /// Value at the given quantile, interpolated between neighbouring ranks.
    ///
    /// Returns 0 for an empty snapshot.
    pub fn value(&self, quantile: f64) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }

        let quantile = quantile.clamp(0.0, 1.0);
        let pos = quantile * (self.values.len() + 1) as f64;
        let index = pos as usize;

        if index < 1 {
            return self.values[0];
        }
        if index >= self.values.len() {
            return self.values[self.values.len() - 1];
        }

        let lower = self.values[index - 1];
        let upper = self.values[index];
        lower + (pos - pos.floor()) * (upper - lower)
    }

    /// Number of retained observations
    pub fn size(&self) -> usize {
        self.values.len()
    }

    /// Smallest retained observation
    pub fn min(&self) -> f64 {
        self.values.first().copied().unwrap_or(0.0)
    }

    /// Largest retained observation
    pub fn max(&self) -> f64 {
        self.values.last().copied().unwrap_or(0.0)
    }
}

/// Kind of a registry instrument
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstrumentKind {
    /// Counter
    Counter,
    /// Gauge
    Gauge,
    /// Histogram
    Histogram,
    /// Meter
    Meter,
    /// Timer
    Timer,
}

impl InstrumentKind {
    /// Lower-case name used in help texts and logs
    pub fn as_label(&self) -> &'static str {
        match self {
            InstrumentKind::Counter => "counter",
            InstrumentKind::Gauge => "gauge",
            InstrumentKind::Histogram => "histogram",
            InstrumentKind::Meter => "meter",
            InstrumentKind::Timer => "timer",
        }
    }
}

impl fmt::Display for InstrumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

/// Shared handle to an instrument, tagged with its kind
#[derive(Clone)]
pub enum Instrument {
    /// Counter handle
    Counter(Arc<dyn CounterInstrument>),
    /// Gauge handle
    Gauge(Arc<dyn GaugeInstrument>),
    /// Histogram handle
    Histogram(Arc<dyn SamplingInstrument>),
    /// Meter handle
    Meter(Arc<dyn MeterInstrument>),
    /// Timer handle, observations in nanoseconds
    Timer(Arc<dyn SamplingInstrument>),
}

impl Instrument {
    /// Kind tag
    pub fn kind(&self) -> InstrumentKind {
        match self {
            Instrument::Counter(_) => InstrumentKind::Counter,
            Instrument::Gauge(_) => InstrumentKind::Gauge,
            Instrument::Histogram(_) => InstrumentKind::Histogram,
            Instrument::Meter(_) => InstrumentKind::Meter,
            Instrument::Timer(_) => InstrumentKind::Timer,
        }
    }
}

impl fmt::Debug for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Instrument").field(&self.kind()).finish()
    }
}

/// Lifecycle event emitted by the host registry
#[derive(Debug, Clone)]
pub enum RegistryEvent {
    /// An instrument was registered under `name`
    Added {
        /// Raw instrument name
        name: String,
        /// The new instrument
        instrument: Instrument,
    },
    /// The instrument registered under `name` was removed
    Removed {
        /// Raw instrument name
        name: String,
        /// Kind of the removed instrument
        kind: InstrumentKind,
    },
}

impl RegistryEvent {
    /// Raw instrument name the event refers to
    pub fn name(&self) -> &str {
        match self {
            RegistryEvent::Added { name, .. } | RegistryEvent::Removed { name, .. } => name,
        }
    }
}

/// Receiver of registry lifecycle events.
///
/// Events for the same name are delivered in registry order. Listeners must
/// not call back into the registry that notifies them.
pub trait RegistryListener: Send + Sync {
    /// Handle one event
    fn on_event(&self, event: &RegistryEvent);
}
