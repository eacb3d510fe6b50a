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
//! Admission filter
//!
//! An ordered list of keep/drop rules evaluated against a definition before
//! it enters the cache. For each rule the values of its source labels are
//! joined with its separator and the pattern must match the whole string.
//! A `drop` rule that matches, or a `keep` rule that does not, rejects the
//! definition immediately. A definition that survives every rule is admitted.
//!
//! Patterns may use lookahead and lookbehind, e.g. dropping every table
//! metric except one table:
//!
//! ```text
//! (org_apache_cassandra_metrics_table_.*)@\b(?!dropped_columns\b)\w+
//! ```

use fancy_regex::Regex;
use metricsbridge_config::{RelabelAction, RelabelSpec};
use tracing::warn;

use crate::definition::MetricDefinition;
use crate::error::{ExporterError, Result};

/// Virtual label resolving to the definition's exposition name
pub const METRIC_NAME_LABEL: &str = "__name__";

/// One compiled keep/drop rule
#[derive(Debug, Clone)]
pub struct FilterRule {
    source_labels: Vec<String>,
    separator: String,
    pattern: Regex,
    action: RelabelAction,
}

impl FilterRule {
    /// Compile a rule. The pattern is anchored at both ends.
    pub fn new(
        source_labels: Vec<String>,
        separator: impl Into<String>,
        pattern: &str,
        action: RelabelAction,
    ) -> Result<Self> {
        let anchored = format!("^(?:{})$", pattern);
        let pattern = Regex::new(&anchored).map_err(|source| ExporterError::InvalidFilterPattern {
            pattern: pattern.to_string(),
            source,
        })?;

        Ok(Self {
            source_labels,
            separator: separator.into(),
            pattern,
            action,
        })
    }

    /// Compile a rule from its configuration form
    pub fn from_spec(spec: &RelabelSpec) -> Result<Self> {
        Self::new(
            spec.source_labels.clone(),
            spec.separator.as_str(),
            &spec.regex,
            spec.action,
        )
    }

    /// Keep or drop
    pub fn action(&self) -> RelabelAction {
        self.action
    }

    /// Whether this rule lets `definition` through.
    ///
    /// A pattern that fails to evaluate (backtrack limit) counts as no match.
    pub fn admits(&self, definition: &MetricDefinition) -> bool {
        let subject = self.match_string(definition);
        let matched = match self.pattern.is_match(&subject) {
            Ok(matched) => matched,
            Err(e) => {
                warn!(
                    pattern = self.pattern.as_str(),
                    subject = %subject,
                    "Filter pattern failed to evaluate: {}", e
                );
                false
            }
        };
        match self.action {
            RelabelAction::Drop => !matched,
            RelabelAction::Keep => matched,
        }
    }

    fn match_string(&self, definition: &MetricDefinition) -> String {
        let mut out = String::new();
        for (i, label) in self.source_labels.iter().enumerate() {
            if i > 0 {
                out.push_str(&self.separator);
            }
            let value = if label == METRIC_NAME_LABEL {
                definition.name()
            } else {
                definition.label_value(label).unwrap_or("")
            };
            out.push_str(value);
        }
        out
    }
}

/// Ordered rule list; empty admits everything
#[derive(Debug, Clone, Default)]
pub struct MetricFilter {
    rules: Vec<FilterRule>,
}

impl MetricFilter {
    /// Build a filter from compiled rules
    pub fn new(rules: Vec<FilterRule>) -> Self {
        Self { rules }
    }

    /// Filter admitting every definition
    pub fn allow_all() -> Self {
        Self::default()
    }

    /// Compile every configured rule, failing on the first bad pattern
    pub fn from_specs(specs: &[RelabelSpec]) -> Result<Self> {
        let rules = specs
            .iter()
            .map(FilterRule::from_spec)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(rules))
    }

    /// Number of rules
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the filter has no rules
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Whether `definition` (built from the instrument `raw_name`) is admitted.
    ///
    /// Rules only see the exposition name; `raw_name` is kept for callers
    /// that log rejections.
    pub fn matches(&self, definition: &MetricDefinition, raw_name: &str) -> bool {
        match self.rules.iter().find(|rule| !rule.admits(definition)) {
            Some(rule) => {
                tracing::trace!(
                    raw_name,
                    name = definition.name(),
                    action = rule.action().as_str(),
                    "Definition rejected by filter"
                );
                false
            }
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOST: &str = "6cc2e5ce-e73f-4592-8d02-fd5e17a070e3";

    fn definition(name: &str, names: &[&str], values: &[&str]) -> MetricDefinition {
        MetricDefinition::new(
            name,
            names.iter().map(|s| s.to_string()).collect(),
            values.iter().map(|s| s.to_string()).collect(),
        )
    }

    fn table_definition(name: &str, cluster: &str, table: &str) -> MetricDefinition {
        definition(
            name,
            &["host", "cluster", "datacenter", "rack", "keyspace", "table"],
            &[HOST, cluster, "dc1", "rack1", "system", table],
        )
    }

    fn keyspace_definition(cluster: &str) -> MetricDefinition {
        definition(
            "org_apache_cassandra_metrics_keyspace_range_latency_count",
            &["host", "cluster", "datacenter", "rack", "keyspace"],
            &[HOST, cluster, "dc1", "rack1", "system"],
        )
    }

    fn filter(specs: &[RelabelSpec]) -> MetricFilter {
        MetricFilter::from_specs(specs).unwrap()
    }

    #[test]
    fn test_drop_by_name() {
        let filter = filter(&[RelabelSpec::drop(
            &["__name__"],
            "",
            "org_apache_cassandra_metrics_table_.*",
        )]);

        let table = table_definition(
            "org_apache_cassandra_metrics_table_range_latency_count",
            "Test Cluster",
            "peers_v2",
        );
        assert!(!filter.matches(&table, "org.apache.cassandra.metrics.Table.RangeLatency"));
        assert!(filter.matches(
            &keyspace_definition("Test Cluster"),
            "org.apache.cassandra.metrics.Keyspace.RangeLatency"
        ));
    }

    #[test]
    fn test_keep_by_name_and_label() {
        let filter = filter(&[RelabelSpec::keep(
            &["__name__", "table"],
            "@",
            "(org_apache_cassandra_metrics_table_.*)@dropped_columns",
        )]);

        let other_table = table_definition(
            "org_apache_cassandra_metrics_table_range_latency_count",
            "Test Cluster",
            "peers_v2",
        );
        let kept_table = table_definition(
            "org_apache_cassandra_metrics_table_estimated_partition_size_histogram",
            "Test Cluster",
            "dropped_columns",
        );

        assert!(!filter.matches(&other_table, ""));
        assert!(filter.matches(&kept_table, ""));
        assert!(!filter.matches(&keyspace_definition("Test Cluster"), ""));
    }

    #[test]
    fn test_drop_on_label_presence() {
        let filter = filter(&[RelabelSpec::drop(&["table"], "@", ".+")]);

        assert!(!filter.matches(&definition("has_table_label", &["table"], &["value"]), ""));
        assert!(filter.matches(&definition("has_table_label", &[], &[]), ""));
        assert!(filter.matches(&definition("has_table_label", &["keyspace"], &["value"]), ""));
    }

    #[test]
    fn test_drop_multiple_names() {
        let filter = filter(&[
            RelabelSpec::drop(&["__name__"], "", "jvm_classes_loaded.*"),
            RelabelSpec::drop(&["__name__"], "", "org_apache_cassandra_metrics_table_.*"),
        ]);

        let definitions = [
            table_definition(
                "org_apache_cassandra_metrics_table_range_latency_count",
                "Test Cluster",
                "peers_v2",
            ),
            keyspace_definition("Test Cluster"),
            definition("jvm_classes_loaded_total", &[], &[]),
        ];

        let passed = definitions
            .iter()
            .filter(|d| filter.matches(d, ""))
            .count();
        assert_eq!(passed, 1);
    }

    #[test]
    fn test_keep_cluster_then_drop_tables() {
        let filter = filter(&[
            RelabelSpec::keep(&["cluster"], "@", "production"),
            RelabelSpec::drop(&["table"], "@", ".+"),
        ]);

        let name = "org_apache_cassandra_metrics_table_range_latency_count";
        let definitions = [
            table_definition(name, "Test Cluster", "peers_v2"),
            table_definition(name, "production", "system_schema"),
            keyspace_definition("production"),
            keyspace_definition("Test Cluster"),
        ];

        let passed: Vec<_> = definitions
            .iter()
            .filter(|d| filter.matches(d, ""))
            .collect();
        assert_eq!(passed.len(), 1);
        assert_eq!(
            passed[0].name(),
            "org_apache_cassandra_metrics_keyspace_range_latency_count"
        );
        assert_eq!(passed[0].label_value("cluster"), Some("production"));
    }

    #[test]
    fn test_pattern_must_match_whole_string() {
        let filter = filter(&[RelabelSpec::drop(&["__name__"], "", "foo_.*")]);
        assert!(!filter.matches(&definition("foo_bar", &[], &[]), ""));
        assert!(filter.matches(&definition("baz_bar", &[], &[]), ""));
        assert!(filter.matches(&definition("xfoo_bar", &[], &[]), ""));
    }

    #[test]
    fn test_empty_filter_admits_everything() {
        let filter = MetricFilter::allow_all();
        assert!(filter.is_empty());
        assert!(filter.matches(&definition("anything", &[], &[]), "anything"));
    }

    #[test]
    fn test_invalid_pattern_fails_at_construction() {
        let err = MetricFilter::from_specs(&[RelabelSpec::drop(&["__name__"], "", "(unclosed")])
            .unwrap_err();
        assert!(matches!(err, ExporterError::InvalidFilterPattern { .. }));
    }

    #[test]
    fn test_drop_tables_except_one() {
        let filter = filter(&[RelabelSpec::drop(
            &["__name__", "table"],
            "@",
            r"(org_apache_cassandra_metrics_table_.*)@\b(?!dropped_columns\b)\w+",
        )]);

        let other_table = table_definition(
            "org_apache_cassandra_metrics_table_range_latency_count",
            "Test Cluster",
            "peers_v2",
        );
        let kept_table = table_definition(
            "org_apache_cassandra_metrics_table_estimated_partition_size_histogram",
            "Test Cluster",
            "dropped_columns",
        );

        assert!(!filter.matches(&other_table, ""));
        assert!(filter.matches(&kept_table, ""));
        assert!(filter.matches(&keyspace_definition("Test Cluster"), ""));
    }

    #[test]
    fn test_lookbehind_pattern() {
        let filter = filter(&[RelabelSpec::keep(&["__name__"], "", r".*(?<=_count)")]);
        assert!(filter.matches(&definition("requests_count", &[], &[]), ""));
        assert!(!filter.matches(&definition("requests_total", &[], &[]), ""));
    }
}
