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
//! Configuration schema for the exporter.
//!
//! The on-disk layout mirrors the relabel section of a Prometheus scrape
//! configuration so existing `metric_relabel_configs` can be pasted in:
//!
//! ```yaml
//! filters:
//!   - source_labels: [__name__]
//!     separator: "@"
//!     regex: "org_apache_cassandra_metrics_table_.*"
//!     action: drop
//! endpoint:
//!   port: 9104
//! ```

use serde::{Deserialize, Serialize};

/// Default port of the exposition endpoint
pub const DEFAULT_ENDPOINT_PORT: u16 = 9104;

/// Top-level exporter configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Ordered admission rules, evaluated before an instrument enters the cache
    pub filters: Vec<RelabelSpec>,

    /// Exposition endpoint
    pub endpoint: EndpointConfig,

    /// Environment labels attached to every metric
    pub node: NodeLabels,

    /// Logging settings
    pub logging: LoggingConfig,
}

/// Action taken when a relabel rule's regex matches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelabelAction {
    /// Admit only metrics whose match string matches
    Keep,
    /// Reject metrics whose match string matches
    Drop,
}

impl RelabelAction {
    /// Lower-case name as used in configuration files
    pub fn as_str(&self) -> &'static str {
        match self {
            RelabelAction::Keep => "keep",
            RelabelAction::Drop => "drop",
        }
    }
}

/// One keep/drop rule over a metric's label tuple
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelabelSpec {
    /// Label names whose values are joined into the match string.
    /// `__name__` denotes the metric name.
    pub source_labels: Vec<String>,

    /// Joins the source label values
    #[serde(default)]
    pub separator: String,

    /// Pattern that must match the whole joined string
    pub regex: String,

    /// Keep or drop on match
    pub action: RelabelAction,
}

impl RelabelSpec {
    /// Create a new rule
    pub fn new(
        source_labels: Vec<String>,
        separator: impl Into<String>,
        regex: impl Into<String>,
        action: RelabelAction,
    ) -> Self {
        Self {
            source_labels,
            separator: separator.into(),
            regex: regex.into(),
            action,
        }
    }

    /// Shorthand for a `keep` rule
    pub fn keep(source_labels: &[&str], separator: &str, regex: &str) -> Self {
        Self::new(
            source_labels.iter().map(|s| s.to_string()).collect(),
            separator,
            regex,
            RelabelAction::Keep,
        )
    }

    /// Shorthand for a `drop` rule
    pub fn drop(source_labels: &[&str], separator: &str, regex: &str) -> Self {
        Self::new(
            source_labels.iter().map(|s| s.to_string()).collect(),
            separator,
            regex,
            RelabelAction::Drop,
        )
    }
}

/// Exposition endpoint settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    /// Serve `/metrics` at all
    pub enabled: bool,

    /// Bind address
    pub bind_address: String,

    /// Listen port
    pub port: u16,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bind_address: "0.0.0.0".to_string(),
            port: DEFAULT_ENDPOINT_PORT,
        }
    }
}

impl EndpointConfig {
    /// Create an enabled endpoint bound to localhost on the given port
    pub fn local(port: u16) -> Self {
        Self {
            enabled: true,
            bind_address: "127.0.0.1".to_string(),
            port,
        }
    }

    /// Get bind address with port
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}

/// Identity of the node the instruments belong to.
///
/// These values are resolved by the host (topology service, snitch, ...)
/// and are prefixed to the label set of every exported sample.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeLabels {
    /// Host id
    pub host: String,
    /// Broadcast address
    pub instance: String,
    /// Cluster name
    pub cluster: String,
    /// Datacenter name
    pub datacenter: String,
    /// Rack name
    pub rack: String,
}

impl Default for NodeLabels {
    fn default() -> Self {
        Self {
            host: "unknown_host".to_string(),
            instance: "unknown_instance".to_string(),
            cluster: "unknown_cluster".to_string(),
            datacenter: "unknown_dc".to_string(),
            rack: "unknown_rack".to_string(),
        }
    }
}

impl NodeLabels {
    /// Label names in exposition order
    pub const NAMES: [&'static str; 5] = ["host", "instance", "cluster", "datacenter", "rack"];

    /// Label values in the same order as [`NodeLabels::NAMES`]
    pub fn values(&self) -> [&str; 5] {
        [
            self.host.as_str(),
            self.instance.as_str(),
            self.cluster.as_str(),
            self.datacenter.as_str(),
            self.rack.as_str(),
        ]
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Level filter (trace, debug, info, warn, error)
    pub level: String,

    /// Output format (pretty, compact, json)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
