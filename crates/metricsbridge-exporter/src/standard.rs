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
//! Standard in-process instruments
//!
//! Lock-free counters and meters, and sliding-window histograms and timers.
//! They back [`MetricRegistry`](crate::MetricRegistry) and are what the
//! exporter sees behind the instrument traits.

use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use crate::instrument::{
    CounterInstrument, GaugeInstrument, GaugeValue, MeterInstrument, SamplingInstrument, Snapshot,
};

/// Observations retained by a histogram
pub const DEFAULT_WINDOW_SIZE: usize = 1028;

/// Up/down counter
#[derive(Debug, Default)]
pub struct Counter {
    count: AtomicI64,
}

impl Counter {
    /// Create a counter at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment by one
    pub fn inc(&self) {
        self.inc_by(1);
    }

    /// Increment by `n`
    pub fn inc_by(&self, n: i64) {
        self.count.fetch_add(n, Ordering::Relaxed);
    }

    /// Decrement by one
    pub fn dec(&self) {
        self.inc_by(-1);
    }

    /// Current count
    pub fn get(&self) -> i64 {
        self.count.load(Ordering::Relaxed)
    }
}

impl CounterInstrument for Counter {
    fn count(&self) -> i64 {
        self.get()
    }
}

/// Event meter
#[derive(Debug)]
pub struct Meter {
    count: AtomicU64,
    started: Instant,
}

impl Default for Meter {
    fn default() -> Self {
        Self {
            count: AtomicU64::new(0),
            started: Instant::now(),
        }
    }
}

impl Meter {
    /// Create a meter with no events
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark one event
    pub fn mark(&self) {
        self.mark_n(1);
    }

    /// Mark `n` events
    pub fn mark_n(&self, n: u64) {
        self.count.fetch_add(n, Ordering::Relaxed);
    }

    /// Events marked so far
    pub fn get(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    /// Events per second since creation
    pub fn mean_rate(&self) -> f64 {
        let elapsed = self.started.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.get() as f64 / elapsed
        } else {
            0.0
        }
    }
}

impl MeterInstrument for Meter {
    fn count(&self) -> u64 {
        self.get()
    }
}

/// Histogram retaining the most recent observations
pub struct Histogram {
    count: AtomicU64,
    window: Mutex<VecDeque<i64>>,
    capacity: usize,
}

impl Histogram {
    /// Create a histogram with the default window
    pub fn new() -> Self {
        Self::with_window(DEFAULT_WINDOW_SIZE)
    }

    /// Create a histogram retaining `capacity` observations
    pub fn with_window(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            count: AtomicU64::new(0),
            window: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    /// Record one observation
    pub fn update(&self, value: i64) {
        self.count.fetch_add(1, Ordering::Relaxed);
        let mut window = self.window.lock().unwrap_or_else(PoisonError::into_inner);
        if window.len() == self.capacity {
            window.pop_front();
        }
        window.push_back(value);
    }

    /// Total observations recorded, including those no longer retained
    pub fn get_count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    /// Snapshot of the retained observations
    pub fn get_snapshot(&self) -> Snapshot {
        let window = self.window.lock().unwrap_or_else(PoisonError::into_inner);
        Snapshot::new(window.iter().map(|v| *v as f64).collect())
    }
}

impl Default for Histogram {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Histogram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Histogram")
            .field("count", &self.get_count())
            .field("capacity", &self.capacity)
            .finish()
    }
}

impl SamplingInstrument for Histogram {
    fn count(&self) -> u64 {
        self.get_count()
    }

    fn snapshot(&self) -> Snapshot {
        self.get_snapshot()
    }
}

/// Duration histogram recording nanoseconds
#[derive(Debug, Default)]
pub struct Timer {
    histogram: Histogram,
}

impl Timer {
    /// Create a timer with the default window
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one duration
    pub fn update(&self, duration: Duration) {
        let nanos = i64::try_from(duration.as_nanos()).unwrap_or(i64::MAX);
        self.histogram.update(nanos);
    }

    /// Run `f` and record how long it took
    pub fn time<F, R>(&self, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let start = Instant::now();
        let result = f();
        self.update(start.elapsed());
        result
    }
}

impl SamplingInstrument for Timer {
    fn count(&self) -> u64 {
        self.histogram.get_count()
    }

    fn snapshot(&self) -> Snapshot {
        self.histogram.get_snapshot()
    }
}

/// Gauge computed by a closure on every read
pub struct FnGauge<F> {
    read: F,
}

impl<F> FnGauge<F>
where
    F: Fn() -> GaugeValue + Send + Sync,
{
    /// Wrap a closure
    pub fn new(read: F) -> Self {
        Self { read }
    }
}

impl<F> GaugeInstrument for FnGauge<F>
where
    F: Fn() -> GaugeValue + Send + Sync,
{
    fn value(&self) -> GaugeValue {
        (self.read)()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter() {
        let counter = Counter::new();
        counter.inc();
        counter.inc_by(4);
        counter.dec();
        assert_eq!(counter.count(), 4);
    }

    #[test]
    fn test_meter() {
        let meter = Meter::new();
        meter.mark();
        meter.mark_n(9);
        assert_eq!(MeterInstrument::count(&meter), 10);
        assert!(meter.mean_rate() >= 0.0);
    }

    #[test]
    fn test_histogram_window_slides() {
        let histogram = Histogram::with_window(3);
        for v in 1..=5 {
            histogram.update(v);
        }
        assert_eq!(histogram.get_count(), 5);

        let snapshot = histogram.get_snapshot();
        assert_eq!(snapshot.size(), 3);
        assert_eq!(snapshot.min(), 3.0);
        assert_eq!(snapshot.max(), 5.0);
    }

    #[test]
    fn test_timer_records_nanoseconds() {
        let timer = Timer::new();
        timer.update(Duration::from_millis(2));
        let value = timer.time(|| 7);
        assert_eq!(value, 7);
        assert_eq!(SamplingInstrument::count(&timer), 2);
        assert!(timer.snapshot().max() >= 2_000_000.0);
    }

    #[test]
    fn test_fn_gauge() {
        let gauge = FnGauge::new(|| GaugeValue::Int(3));
        assert_eq!(gauge.value(), GaugeValue::Int(3));
    }
}
