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
//! Metric definitions and samples
//!
//! A [`MetricDefinition`] is the fully named, fully labelled form of one
//! exported time series. It is built once when an instrument is added and
//! read on every scrape, so its name and label vectors are shared, never
//! copied per sample.

use std::fmt;
use std::sync::Arc;

/// Live value accessor bound to one instrument.
///
/// Returns `None` once the instrument behind it is gone, in which case the
/// sample is omitted from the scrape.
pub trait SampleSource: Send + Sync {
    /// Read the current value
    fn sample(&self) -> Option<f64>;
}

/// One exported data point
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// Exposition name of the series
    pub name: Arc<str>,
    /// Label names, parallel to `label_values`
    pub label_names: Arc<[String]>,
    /// Label values
    pub label_values: Arc<[String]>,
    /// Value at refresh time
    pub value: f64,
}

impl Sample {
    /// Look up a label value by name
    pub fn label(&self, name: &str) -> Option<&str> {
        self.label_names
            .iter()
            .position(|n| n == name)
            .map(|i| self.label_values[i].as_str())
    }
}

/// Named, labelled series with an optional live value accessor
#[derive(Clone)]
pub struct MetricDefinition {
    name: Arc<str>,
    label_names: Arc<[String]>,
    label_values: Arc<[String]>,
    source: Option<Arc<dyn SampleSource>>,
}

impl MetricDefinition {
    /// Create a definition without a value accessor.
    ///
    /// `label_names` and `label_values` must have the same length; a shorter
    /// value list is padded with empty strings and a longer one truncated.
    pub fn new(
        name: impl Into<String>,
        label_names: Vec<String>,
        mut label_values: Vec<String>,
    ) -> Self {
        debug_assert_eq!(label_names.len(), label_values.len());
        label_values.resize(label_names.len(), String::new());

        Self {
            name: Arc::from(name.into()),
            label_names: Arc::from(label_names),
            label_values: Arc::from(label_values),
            source: None,
        }
    }

    /// Attach a value accessor
    pub fn with_source(mut self, source: Arc<dyn SampleSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Rebind the value accessor. Must happen before the definition is shared
    /// with the cache.
    pub fn set_source(&mut self, source: Arc<dyn SampleSource>) {
        self.source = Some(source);
    }

    /// Exposition name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Label names in exposition order
    pub fn label_names(&self) -> &[String] {
        &self.label_names
    }

    /// Label values, parallel to [`label_names`](Self::label_names)
    pub fn label_values(&self) -> &[String] {
        &self.label_values
    }

    /// Value of the named label, if present
    pub fn label_value(&self, name: &str) -> Option<&str> {
        self.label_names
            .iter()
            .position(|n| n == name)
            .map(|i| self.label_values[i].as_str())
    }

    /// Whether a value accessor is bound
    pub fn has_source(&self) -> bool {
        self.source.is_some()
    }

    /// Build a sample from the bound accessor.
    ///
    /// `None` when no accessor is bound or its instrument is gone.
    pub fn build_sample(&self) -> Option<Sample> {
        let value = self.source.as_ref()?.sample()?;
        Some(self.sample_with_value(value))
    }

    /// Build a sample carrying an externally computed value
    pub fn sample_with_value(&self, value: f64) -> Sample {
        Sample {
            name: Arc::clone(&self.name),
            label_names: Arc::clone(&self.label_names),
            label_values: Arc::clone(&self.label_values),
            value,
        }
    }
}

impl fmt::Debug for MetricDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetricDefinition")
            .field("name", &self.name)
            .field("label_names", &self.label_names)
            .field("label_values", &self.label_values)
            .field("has_source", &self.source.is_some())
            .finish()
    }
}
