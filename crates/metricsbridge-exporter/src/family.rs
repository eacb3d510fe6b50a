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
//! Family entries
//!
//! A family groups every series sharing one exposition name. Contributions
//! come from possibly many instruments: single-valued definitions, and
//! producers that append any number of samples (histogram quantiles).
//! Samples are rebuilt from the contributions on each refresh.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use crate::definition::{MetricDefinition, Sample};
use crate::error::{ExporterError, Result};

/// Exposition type of a family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FamilyKind {
    /// Point-in-time value
    Gauge,
    /// Monotonic total
    Counter,
    /// Quantiles plus an observation count
    Summary,
}

impl FamilyKind {
    /// Lower-case exposition type name
    pub fn as_str(&self) -> &'static str {
        match self {
            FamilyKind::Gauge => "gauge",
            FamilyKind::Counter => "counter",
            FamilyKind::Summary => "summary",
        }
    }
}

impl fmt::Display for FamilyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Appends zero or more samples on every refresh
pub trait SampleProducer: Send + Sync {
    /// Append this producer's current samples to `out`
    fn produce(&self, out: &mut Vec<Sample>) -> Result<()>;
}

/// Snapshot of one family, as returned by a collection
#[derive(Debug, Clone, PartialEq)]
pub struct MetricFamilySamples {
    /// Exposition name
    pub name: String,
    /// Exposition type
    pub kind: FamilyKind,
    /// Help text
    pub help: String,
    /// Samples as of the last refresh
    pub samples: Vec<Sample>,
}

/// Cached family with its contributions
pub struct FamilyEntry {
    name: String,
    kind: FamilyKind,
    help: String,
    definitions: RwLock<Vec<(String, MetricDefinition)>>,
    producers: RwLock<BTreeMap<String, Arc<dyn SampleProducer>>>,
    samples: Mutex<Vec<Sample>>,
}

impl FamilyEntry {
    /// Create an empty entry. Name, kind and help are fixed from here on.
    pub fn new(name: impl Into<String>, kind: FamilyKind, help: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            help: help.into(),
            definitions: RwLock::new(Vec::new()),
            producers: RwLock::new(BTreeMap::new()),
            samples: Mutex::new(Vec::new()),
        }
    }

    /// Exposition name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Exposition type
    pub fn kind(&self) -> FamilyKind {
        self.kind
    }

    /// Help text set by the first contributor
    pub fn help(&self) -> &str {
        &self.help
    }

    /// Add a single-valued contribution owned by the instrument `raw_name`
    pub fn add_definition(&self, raw_name: &str, definition: MetricDefinition) {
        self.definitions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push((raw_name.to_string(), definition));
    }

    /// Add (or replace) the producer owned by the instrument `raw_name`
    pub fn add_producer(&self, raw_name: &str, producer: Arc<dyn SampleProducer>) {
        self.producers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(raw_name.to_string(), producer);
    }

    /// Drop every contribution of `raw_name`. Returns whether any existed.
    pub fn remove_contribution(&self, raw_name: &str) -> bool {
        let mut definitions = self
            .definitions
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let before = definitions.len();
        definitions.retain(|(owner, _)| owner != raw_name);
        let removed_definition = definitions.len() != before;
        drop(definitions);

        let removed_producer = self
            .producers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(raw_name)
            .is_some();

        removed_definition || removed_producer
    }

    /// Number of single-valued contributions
    pub fn definition_count(&self) -> usize {
        self.definitions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Number of producers
    pub fn producer_count(&self) -> usize {
        self.producers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether no contribution is left
    pub fn is_empty(&self) -> bool {
        self.definition_count() + self.producer_count() == 0
    }

    /// Rebuild the sample list from the current contributions.
    ///
    /// Definitions come first, in insertion order, then producers ordered by
    /// owning instrument name. A definition whose instrument is gone is
    /// skipped.
    pub fn refresh(&self) -> Result<()> {
        let mut fresh = Vec::new();
        {
            let definitions = self
                .definitions
                .read()
                .map_err(|_| ExporterError::Poisoned("family definitions"))?;
            fresh.reserve(definitions.len());
            fresh.extend(definitions.iter().filter_map(|(_, d)| d.build_sample()));
        }
        {
            let producers = self
                .producers
                .read()
                .map_err(|_| ExporterError::Poisoned("family producers"))?;
            for producer in producers.values() {
                producer.produce(&mut fresh)?;
            }
        }

        let mut samples = self
            .samples
            .lock()
            .map_err(|_| ExporterError::Poisoned("family samples"))?;
        *samples = fresh;
        Ok(())
    }

    /// Samples as of the last refresh
    pub fn samples(&self) -> Vec<Sample> {
        self.samples
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Refresh and return a snapshot
    pub fn snapshot(&self) -> Result<MetricFamilySamples> {
        self.refresh()?;
        Ok(MetricFamilySamples {
            name: self.name.clone(),
            kind: self.kind,
            help: self.help.clone(),
            samples: self.samples(),
        })
    }
}

impl fmt::Debug for FamilyEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FamilyEntry")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("definitions", &self.definition_count())
            .field("producers", &self.producer_count())
            .finish()
    }
}
