// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2026 MetricsBridge Contributors

//! Integration tests for configuration loading from disk and environment

#![allow(clippy::unwrap_used)]

use metricsbridge_config::{ConfigError, ConfigLoader, RelabelAction, CONFIG_PATH_ENV};
use std::io::Write;

const COLLECTOR_YAML: &str = r#"
filters:
  - source_labels: [__name__]
    separator: "@"
    regex: "org_apache_cassandra_metrics_table_.*"
    action: drop
  - source_labels: [__name__, table]
    separator: "@"
    regex: "(org_apache_cassandra_metrics_table_.*)@dropped_columns"
    action: keep
endpoint:
  bind_address: 127.0.0.1
  port: 9500
"#;

#[tokio::test]
async fn test_load_yaml_file() {
    let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    file.write_all(COLLECTOR_YAML.as_bytes()).unwrap();

    let config = ConfigLoader::new().load_file(file.path()).await.unwrap();
    assert_eq!(config.filters.len(), 2);
    assert_eq!(config.filters[1].action, RelabelAction::Keep);
    assert_eq!(config.filters[1].source_labels, vec!["__name__", "table"]);
    assert_eq!(config.endpoint.socket_addr(), "127.0.0.1:9500");
}

#[tokio::test]
async fn test_missing_file() {
    let result = ConfigLoader::new()
        .load_file("/nonexistent/collector.yaml")
        .await;
    assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
}

// Environment handling lives in one test: the process environment is shared
// between test threads.
#[tokio::test]
async fn test_read_config_from_environment() {
    std::env::remove_var(CONFIG_PATH_ENV);
    let config = ConfigLoader::new().read_config().await.unwrap();
    assert!(config.filters.is_empty());

    let mut file = tempfile::Builder::new().suffix(".yml").tempfile().unwrap();
    file.write_all(COLLECTOR_YAML.as_bytes()).unwrap();
    std::env::set_var(CONFIG_PATH_ENV, file.path());
    std::env::set_var("METRICSBRIDGE_CLUSTER", "production");
    std::env::set_var("METRICSBRIDGE_PORT", "9600");

    let config = ConfigLoader::new().read_config().await.unwrap();
    assert_eq!(config.filters.len(), 2);
    assert_eq!(config.node.cluster, "production");
    assert_eq!(config.endpoint.port, 9600);

    std::env::set_var("METRICSBRIDGE_PORT", "not-a-port");
    let result = ConfigLoader::new().read_config().await;
    assert!(matches!(result, Err(ConfigError::EnvVarParsingError { .. })));

    std::env::remove_var("METRICSBRIDGE_PORT");
    std::env::remove_var("METRICSBRIDGE_CLUSTER");
    std::env::remove_var(CONFIG_PATH_ENV);
}
