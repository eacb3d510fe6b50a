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
//! Raw instrument name to exposition definition
//!
//! Registry names are dotted paths such as
//! `org.apache.cassandra.metrics.Table.ReadLatency.system.peers`. The namer
//! turns them into a sanitized exposition name, lifts the keyspace and table
//! segments into labels and prefixes the node's identity labels.

use std::sync::Arc;

use metricsbridge_config::NodeLabels;

use crate::definition::{MetricDefinition, SampleSource};

/// Dotted prefix of the storage engine's own instruments
pub const CASSANDRA_PREFIX: &str = "org.apache.cassandra.metrics.";

/// Keyspace label name
pub const KEYSPACE_LABEL: &str = "keyspace";

/// Table label name
pub const TABLE_LABEL: &str = "table";

/// Builds [`MetricDefinition`]s from raw instrument names
pub trait MetricNamer: Send + Sync {
    /// Name and label one series.
    ///
    /// `suffix` is appended to the sanitized name; `extra_names` and
    /// `extra_values` are appended after every derived label.
    fn parse(
        &self,
        raw_name: &str,
        suffix: &str,
        extra_names: &[&str],
        extra_values: &[&str],
        source: Option<Arc<dyn SampleSource>>,
    ) -> MetricDefinition;
}

/// Namer prefixing the node's identity labels
#[derive(Debug, Clone)]
pub struct DefaultMetricNamer {
    label_names: Vec<String>,
    label_values: Vec<String>,
}

impl DefaultMetricNamer {
    /// Create a namer for the given node identity
    pub fn new(node: &NodeLabels) -> Self {
        Self {
            label_names: NodeLabels::NAMES.iter().map(|s| s.to_string()).collect(),
            label_values: node.values().iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Default for DefaultMetricNamer {
    fn default() -> Self {
        Self::new(&NodeLabels::default())
    }
}

impl MetricNamer for DefaultMetricNamer {
    fn parse(
        &self,
        raw_name: &str,
        suffix: &str,
        extra_names: &[&str],
        extra_values: &[&str],
        source: Option<Arc<dyn SampleSource>>,
    ) -> MetricDefinition {
        let mut label_names = self.label_names.clone();
        let mut label_values = self.label_values.clone();

        let scoped = split_scope(raw_name);
        for (name, value) in &scoped.labels {
            label_names.push((*name).to_string());
            label_values.push((*value).to_string());
        }
        label_names.extend(extra_names.iter().map(|s| s.to_string()));
        label_values.extend(extra_values.iter().map(|s| s.to_string()));

        let mut name = sanitize(&scoped.base);
        name.push_str(suffix);

        let definition = MetricDefinition::new(name, label_names, label_values);
        match source {
            Some(source) => definition.with_source(source),
            None => definition,
        }
    }
}

struct Scoped<'a> {
    base: String,
    labels: Vec<(&'static str, &'a str)>,
}

/// Split `org.apache.cassandra.metrics.<Scope>.<Name>[.<keyspace>[.<table>]]`
fn split_scope(raw_name: &str) -> Scoped<'_> {
    let unscoped = || Scoped {
        base: raw_name.to_string(),
        labels: Vec::new(),
    };

    let Some(rest) = raw_name.strip_prefix(CASSANDRA_PREFIX) else {
        return unscoped();
    };

    let mut parts = rest.splitn(4, '.');
    let (Some(scope), Some(metric)) = (parts.next(), parts.next()) else {
        return unscoped();
    };
    let keyspace = parts.next();
    let table = parts.next();

    match scope {
        "Table" | "ColumnFamily" => {
            let mut labels = Vec::with_capacity(2);
            if let Some(keyspace) = keyspace {
                labels.push((KEYSPACE_LABEL, keyspace));
            }
            if let Some(table) = table {
                labels.push((TABLE_LABEL, table));
            }
            Scoped {
                base: format!("{}table.{}", CASSANDRA_PREFIX, metric),
                labels,
            }
        }
        "Keyspace" => {
            let labels = keyspace
                .map(|k| vec![(KEYSPACE_LABEL, k)])
                .unwrap_or_default();
            Scoped {
                base: format!("{}keyspace.{}", CASSANDRA_PREFIX, metric),
                labels,
            }
        }
        _ => unscoped(),
    }
}

/// Exposition-safe, snake_case form of a raw name
pub fn sanitize(raw: &str) -> String {
    let chars: Vec<char> = raw.chars().collect();
    let mut out = String::with_capacity(raw.len() + 8);

    for (i, &c) in chars.iter().enumerate() {
        if c.is_ascii_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_lower = chars.get(i + 1).is_some_and(|n| n.is_ascii_lowercase());
            if prev.is_ascii_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_ascii_uppercase() && next_lower)
            {
                out.push('_');
            }
        }

        if c.is_ascii_alphanumeric() || c == '_' || c == ':' {
            out.push(c.to_ascii_lowercase());
        } else {
            out.push('_');
        }
    }

    collapse_underscores(&out)
}

fn collapse_underscores(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut last_underscore = false;
    for c in s.chars() {
        if c == '_' {
            if !last_underscore {
                out.push(c);
            }
            last_underscore = true;
        } else {
            out.push(c);
            last_underscore = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node() -> NodeLabels {
        NodeLabels {
            host: "6cc2e5ce".to_string(),
            instance: "10.0.0.1".to_string(),
            cluster: "Test Cluster".to_string(),
            datacenter: "dc1".to_string(),
            rack: "rack1".to_string(),
        }
    }

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize("c_nr_1"), "c_nr_1");
        assert_eq!(sanitize("LiveSSTableCount"), "live_ss_table_count");
        assert_eq!(sanitize("jvm.memory-used"), "jvm_memory_used");
        assert_eq!(sanitize("a..b__c"), "a_b_c");
        assert_eq!(sanitize("Latency99th"), "latency99th");
    }

    #[test]
    fn test_table_scope() {
        let namer = DefaultMetricNamer::new(&node());
        let def = namer.parse(
            "org.apache.cassandra.metrics.Table.RangeLatency.system.peers_v2",
            "_count",
            &[],
            &[],
            None,
        );

        assert_eq!(
            def.name(),
            "org_apache_cassandra_metrics_table_range_latency_count"
        );
        assert_eq!(
            def.label_names(),
            ["host", "instance", "cluster", "datacenter", "rack", "keyspace", "table"]
        );
        assert_eq!(def.label_value("cluster"), Some("Test Cluster"));
        assert_eq!(def.label_value("keyspace"), Some("system"));
        assert_eq!(def.label_value("table"), Some("peers_v2"));
    }

    #[test]
    fn test_column_family_folds_into_table() {
        let namer = DefaultMetricNamer::default();
        let def = namer.parse(
            "org.apache.cassandra.metrics.ColumnFamily.ReadLatency.ks.t1",
            "",
            &[],
            &[],
            None,
        );
        assert_eq!(def.name(), "org_apache_cassandra_metrics_table_read_latency");
        assert_eq!(def.label_value("cluster"), Some("unknown_cluster"));
    }

    #[test]
    fn test_keyspace_scope() {
        let namer = DefaultMetricNamer::new(&node());
        let def = namer.parse(
            "org.apache.cassandra.metrics.Keyspace.RangeLatency.system",
            "",
            &[],
            &[],
            None,
        );
        assert_eq!(
            def.name(),
            "org_apache_cassandra_metrics_keyspace_range_latency"
        );
        assert_eq!(def.label_value("keyspace"), Some("system"));
        assert_eq!(def.label_value("table"), None);
    }

    #[test]
    fn test_unscoped_name_with_extra_labels() {
        let namer = DefaultMetricNamer::new(&node());
        let def = namer.parse("h_nr_1", "", &["quantile"], &["0.99"], None);
        assert_eq!(def.name(), "h_nr_1");
        assert_eq!(def.label_names().len(), 6);
        assert_eq!(def.label_names()[5], "quantile");
        assert_eq!(def.label_value("quantile"), Some("0.99"));
        assert!(!def.has_source());
    }

    #[test]
    fn test_aggregate_table_metric_has_no_table_labels() {
        let namer = DefaultMetricNamer::new(&node());
        let def = namer.parse(
            "org.apache.cassandra.metrics.Table.LiveSSTableCount",
            "",
            &[],
            &[],
            None,
        );
        assert_eq!(
            def.name(),
            "org_apache_cassandra_metrics_table_live_ss_table_count"
        );
        assert_eq!(def.label_names().len(), 5);
    }
}
