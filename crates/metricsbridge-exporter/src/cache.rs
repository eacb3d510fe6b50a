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
//! Family cache and reverse index
//!
//! Families are keyed by exposition name. The reverse index maps each
//! represented instrument to the family it contributes to, so removal never
//! has to re-derive names. An instrument is in the index exactly while it
//! has a contribution in some family, and a family is evicted as soon as its
//! last contribution goes.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::{debug, warn};

use crate::definition::MetricDefinition;
use crate::family::{FamilyEntry, FamilyKind, SampleProducer};

/// What one instrument adds to its family
pub enum Contribution {
    /// A single-valued series
    Definition(MetricDefinition),
    /// A multi-sample producer
    Producer(Arc<dyn SampleProducer>),
}

/// Concurrent family cache
#[derive(Default)]
pub struct FamilyCache {
    families: DashMap<String, Arc<FamilyEntry>>,
    index: DashMap<String, String>,
}

impl FamilyCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the contribution of instrument `raw_name` to family `family`,
    /// creating the family if needed.
    ///
    /// A previous contribution of the same instrument is dropped first.
    /// Returns `false` when the family exists with a different kind.
    pub fn register(
        &self,
        raw_name: &str,
        family: &str,
        kind: FamilyKind,
        help: &str,
        contribution: Contribution,
    ) -> bool {
        if self.index.contains_key(raw_name) {
            self.unregister(raw_name);
        }

        {
            // The shard stays locked until the contribution is in, so a
            // concurrent eviction cannot drop the entry underneath us.
            let entry = self
                .families
                .entry(family.to_string())
                .or_insert_with(|| Arc::new(FamilyEntry::new(family, kind, help)));

            if entry.kind() != kind {
                warn!(
                    raw_name,
                    family,
                    existing = %entry.kind(),
                    requested = %kind,
                    "Family kind conflict, instrument not exported"
                );
                return false;
            }

            match contribution {
                Contribution::Definition(definition) => entry.add_definition(raw_name, definition),
                Contribution::Producer(producer) => entry.add_producer(raw_name, producer),
            }
        }

        self.index.insert(raw_name.to_string(), family.to_string());
        debug!(raw_name, family, %kind, "Family contribution registered");
        true
    }

    /// Drop the contribution of `raw_name`, evicting its family if empty.
    ///
    /// Unknown (never admitted) instruments are ignored. Returns whether a
    /// contribution was removed.
    pub fn unregister(&self, raw_name: &str) -> bool {
        let Some(family) = self.index.get(raw_name).map(|f| f.value().clone()) else {
            return false;
        };

        let entry = self.families.get(&family).map(|e| Arc::clone(e.value()));
        if let Some(entry) = entry {
            entry.remove_contribution(raw_name);
            if self
                .families
                .remove_if(&family, |_, e| e.is_empty())
                .is_some()
            {
                debug!(family, "Family evicted");
            }
        }

        self.index.remove(raw_name);
        debug!(raw_name, family, "Family contribution unregistered");
        true
    }

    /// Current families, in no particular order
    pub fn entries(&self) -> Vec<Arc<FamilyEntry>> {
        self.families
            .iter()
            .map(|e| Arc::clone(e.value()))
            .collect()
    }

    /// Family named `family`
    pub fn get(&self, family: &str) -> Option<Arc<FamilyEntry>> {
        self.families.get(family).map(|e| Arc::clone(e.value()))
    }

    /// Family the instrument `raw_name` contributes to
    pub fn family_of(&self, raw_name: &str) -> Option<String> {
        self.index.get(raw_name).map(|f| f.value().clone())
    }

    /// Number of families
    pub fn len(&self) -> usize {
        self.families.len()
    }

    /// Whether the cache holds no family
    pub fn is_empty(&self) -> bool {
        self.families.is_empty()
    }

    /// Number of represented instruments
    pub fn instrument_count(&self) -> usize {
        self.index.len()
    }
}

impl std::fmt::Debug for FamilyCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FamilyCache")
            .field("families", &self.len())
            .field("instruments", &self.instrument_count())
            .finish()
    }
}
