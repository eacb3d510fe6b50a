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
//! In-process instrument registry
//!
//! Owns every instrument it hands out and notifies attached listeners of
//! additions and removals. Notifications for one name are delivered in the
//! order the registry applied them.

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::debug;

use crate::error::{ExporterError, Result};
use crate::instrument::{
    GaugeInstrument, Instrument, InstrumentKind, RegistryEvent, RegistryListener,
};
use crate::standard::{Counter, Histogram, Meter, Timer};

enum Slot {
    Counter(Arc<Counter>),
    Gauge(Arc<dyn GaugeInstrument>),
    Histogram(Arc<Histogram>),
    Meter(Arc<Meter>),
    Timer(Arc<Timer>),
}

impl Slot {
    fn kind(&self) -> InstrumentKind {
        match self {
            Slot::Counter(_) => InstrumentKind::Counter,
            Slot::Gauge(_) => InstrumentKind::Gauge,
            Slot::Histogram(_) => InstrumentKind::Histogram,
            Slot::Meter(_) => InstrumentKind::Meter,
            Slot::Timer(_) => InstrumentKind::Timer,
        }
    }

    fn instrument(&self) -> Instrument {
        match self {
            Slot::Counter(c) => Instrument::Counter(Arc::<Counter>::clone(c)),
            Slot::Gauge(g) => Instrument::Gauge(Arc::clone(g)),
            Slot::Histogram(h) => Instrument::Histogram(Arc::<Histogram>::clone(h)),
            Slot::Meter(m) => Instrument::Meter(Arc::<Meter>::clone(m)),
            Slot::Timer(t) => Instrument::Timer(Arc::<Timer>::clone(t)),
        }
    }
}

/// Named instrument registry with lifecycle notifications
#[derive(Default)]
pub struct MetricRegistry {
    instruments: RwLock<BTreeMap<String, Slot>>,
    listeners: RwLock<Vec<Arc<dyn RegistryListener>>>,
}

impl MetricRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or create the counter named `name`
    pub fn counter(&self, name: &str) -> Result<Arc<Counter>> {
        self.get_or_add(
            name,
            || Slot::Counter(Arc::new(Counter::new())),
            |slot| match slot {
                Slot::Counter(c) => Some(Arc::clone(c)),
                _ => None,
            },
        )
    }

    /// Get or create the meter named `name`
    pub fn meter(&self, name: &str) -> Result<Arc<Meter>> {
        self.get_or_add(
            name,
            || Slot::Meter(Arc::new(Meter::new())),
            |slot| match slot {
                Slot::Meter(m) => Some(Arc::clone(m)),
                _ => None,
            },
        )
    }

    /// Get or create the histogram named `name`
    pub fn histogram(&self, name: &str) -> Result<Arc<Histogram>> {
        self.get_or_add(
            name,
            || Slot::Histogram(Arc::new(Histogram::new())),
            |slot| match slot {
                Slot::Histogram(h) => Some(Arc::clone(h)),
                _ => None,
            },
        )
    }

    /// Get or create the timer named `name`
    pub fn timer(&self, name: &str) -> Result<Arc<Timer>> {
        self.get_or_add(
            name,
            || Slot::Timer(Arc::new(Timer::new())),
            |slot| match slot {
                Slot::Timer(t) => Some(Arc::clone(t)),
                _ => None,
            },
        )
    }

    /// Register a gauge under `name`.
    ///
    /// Fails if the name is taken by any instrument.
    pub fn register_gauge(&self, name: &str, gauge: Arc<dyn GaugeInstrument>) -> Result<()> {
        let mut instruments = self
            .instruments
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        if instruments.contains_key(name) {
            return Err(ExporterError::AlreadyRegistered(name.to_string()));
        }

        let slot = Slot::Gauge(gauge);
        let event = RegistryEvent::Added {
            name: name.to_string(),
            instrument: slot.instrument(),
        };
        instruments.insert(name.to_string(), slot);
        self.notify(&event);
        Ok(())
    }

    /// Remove the instrument named `name`. Returns whether one existed.
    pub fn remove(&self, name: &str) -> bool {
        let mut instruments = self
            .instruments
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        match instruments.remove(name) {
            Some(slot) => {
                debug!(name, kind = %slot.kind(), "Instrument removed");
                self.notify(&RegistryEvent::Removed {
                    name: name.to_string(),
                    kind: slot.kind(),
                });
                true
            }
            None => false,
        }
    }

    /// Handle to the instrument named `name`
    pub fn get(&self, name: &str) -> Option<Instrument> {
        let instruments = self
            .instruments
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        instruments.get(name).map(Slot::instrument)
    }

    /// Registered names in sorted order
    pub fn names(&self) -> Vec<String> {
        let instruments = self
            .instruments
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        instruments.keys().cloned().collect()
    }

    /// Number of registered instruments
    pub fn len(&self) -> usize {
        self.instruments
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether no instruments are registered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Attach a listener and replay an `Added` event for every existing
    /// instrument.
    pub fn add_listener(&self, listener: Arc<dyn RegistryListener>) {
        // Held for the whole replay so no mutation slips in between.
        let instruments = self
            .instruments
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        for (name, slot) in instruments.iter() {
            listener.on_event(&RegistryEvent::Added {
                name: name.clone(),
                instrument: slot.instrument(),
            });
        }

        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(listener);
    }

    fn get_or_add<T, C, E>(&self, name: &str, create: C, extract: E) -> Result<Arc<T>>
    where
        C: FnOnce() -> Slot,
        E: Fn(&Slot) -> Option<Arc<T>>,
    {
        let mut instruments = self
            .instruments
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(slot) = instruments.get(name) {
            return extract(slot).ok_or_else(|| ExporterError::InstrumentConflict {
                name: name.to_string(),
                existing: slot.kind(),
            });
        }

        let slot = create();
        let kind = slot.kind();
        let handle = extract(&slot).ok_or_else(|| ExporterError::InstrumentConflict {
            name: name.to_string(),
            existing: kind,
        })?;

        let event = RegistryEvent::Added {
            name: name.to_string(),
            instrument: slot.instrument(),
        };
        instruments.insert(name.to_string(), slot);
        debug!(name, %kind, "Instrument added");
        self.notify(&event);
        Ok(handle)
    }

    fn notify(&self, event: &RegistryEvent) {
        let listeners = self
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        for listener in listeners.iter() {
            listener.on_event(event);
        }
    }
}

impl std::fmt::Debug for MetricRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricRegistry")
            .field("instruments", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instrument::GaugeValue;
    use crate::standard::FnGauge;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<String>>,
    }

    impl RegistryListener for Recorder {
        fn on_event(&self, event: &RegistryEvent) {
            let line = match event {
                RegistryEvent::Added { name, instrument } => {
                    format!("+{}:{}", name, instrument.kind())
                }
                RegistryEvent::Removed { name, kind } => format!("-{}:{}", name, kind),
            };
            self.events.lock().unwrap().push(line);
        }
    }

    #[test]
    fn test_get_or_create_returns_same_instrument() {
        let registry = MetricRegistry::new();
        let first = registry.counter("requests").unwrap();
        first.inc();
        let second = registry.counter("requests").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_kind_conflict() {
        let registry = MetricRegistry::new();
        registry.meter("events").unwrap();

        let err = registry.timer("events").unwrap_err();
        assert!(matches!(
            err,
            ExporterError::InstrumentConflict {
                existing: InstrumentKind::Meter,
                ..
            }
        ));
    }

    #[test]
    fn test_duplicate_gauge_rejected() {
        let registry = MetricRegistry::new();
        let gauge: Arc<dyn GaugeInstrument> = Arc::new(FnGauge::new(|| GaugeValue::Int(1)));
        registry.register_gauge("g", Arc::clone(&gauge)).unwrap();
        assert!(matches!(
            registry.register_gauge("g", gauge),
            Err(ExporterError::AlreadyRegistered(_))
        ));
    }

    #[test]
    fn test_listener_sees_events_in_order() {
        let registry = MetricRegistry::new();
        let recorder = Arc::new(Recorder::default());
        registry.add_listener(Arc::<Recorder>::clone(&recorder));

        registry.histogram("h").unwrap();
        registry.histogram("h").unwrap();
        assert!(registry.remove("h"));
        assert!(!registry.remove("h"));

        let events = recorder.events.lock().unwrap();
        assert_eq!(*events, vec!["+h:histogram", "-h:histogram"]);
    }

    #[test]
    fn test_listener_replay() {
        let registry = MetricRegistry::new();
        registry.counter("b").unwrap();
        registry.meter("a").unwrap();

        let recorder = Arc::new(Recorder::default());
        registry.add_listener(Arc::<Recorder>::clone(&recorder));

        let events = recorder.events.lock().unwrap();
        assert_eq!(*events, vec!["+a:meter", "+b:counter"]);
    }

    #[test]
    fn test_names_sorted() {
        let registry = MetricRegistry::new();
        registry.timer("z").unwrap();
        registry.counter("a").unwrap();
        assert_eq!(registry.names(), vec!["a", "z"]);
        assert!(registry.get("a").is_some());
        assert!(registry.get("missing").is_none());
    }
}
