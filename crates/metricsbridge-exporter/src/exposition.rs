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
//! Conversion to the Prometheus exposition model
//!
//! Gauge and counter families map one sample to one metric. Summary
//! families are regrouped: samples sharing every label except `quantile`
//! form one summary, whose quantiles come from the labelled samples and
//! whose count comes from the `<name>_count` sample.

use prometheus::proto::{
    Counter, Gauge, LabelPair, Metric, MetricFamily, MetricType, Quantile, Summary,
};
use prometheus::TextEncoder;

use crate::definition::Sample;
use crate::error::Result;
use crate::family::{FamilyKind, MetricFamilySamples};
use crate::percentile::QUANTILE_LABEL;

/// Convert collected families, skipping families without samples
pub fn to_metric_families(families: &[MetricFamilySamples]) -> Vec<MetricFamily> {
    families.iter().filter_map(to_metric_family).collect()
}

/// Convert one family. `None` when it has no samples.
pub fn to_metric_family(family: &MetricFamilySamples) -> Option<MetricFamily> {
    if family.samples.is_empty() {
        return None;
    }

    let metrics = match family.kind {
        FamilyKind::Gauge => family.samples.iter().map(gauge_metric).collect(),
        FamilyKind::Counter => family.samples.iter().map(counter_metric).collect(),
        FamilyKind::Summary => summary_metrics(&family.name, &family.samples),
    };

    let mut mf = MetricFamily::default();
    mf.set_name(family.name.clone());
    mf.set_help(family.help.clone());
    mf.set_field_type(match family.kind {
        FamilyKind::Gauge => MetricType::GAUGE,
        FamilyKind::Counter => MetricType::COUNTER,
        FamilyKind::Summary => MetricType::SUMMARY,
    });
    mf.set_metric(metrics.into());
    Some(mf)
}

/// Encode families in the Prometheus text format
pub fn encode_text(families: &[MetricFamily]) -> Result<String> {
    let mut out = String::new();
    TextEncoder::new().encode_utf8(families, &mut out)?;
    Ok(out)
}

fn label_pairs(names: &[String], values: &[String]) -> Vec<LabelPair> {
    names
        .iter()
        .zip(values)
        .filter(|(name, _)| name.as_str() != QUANTILE_LABEL)
        .map(|(name, value)| {
            let mut pair = LabelPair::default();
            pair.set_name(name.clone());
            pair.set_value(value.clone());
            pair
        })
        .collect()
}

fn gauge_metric(sample: &Sample) -> Metric {
    let mut gauge = Gauge::default();
    gauge.set_value(sample.value);

    let mut metric = Metric::default();
    metric.set_label(label_pairs(&sample.label_names, &sample.label_values).into());
    metric.set_gauge(gauge);
    metric
}

fn counter_metric(sample: &Sample) -> Metric {
    let mut counter = Counter::default();
    counter.set_value(sample.value);

    let mut metric = Metric::default();
    metric.set_label(label_pairs(&sample.label_names, &sample.label_values).into());
    metric.set_counter(counter);
    metric
}

struct PendingSummary {
    labels: Vec<(String, String)>,
    quantiles: Vec<Quantile>,
    count: u64,
}

fn summary_metrics(family: &str, samples: &[Sample]) -> Vec<Metric> {
    let mut pending: Vec<PendingSummary> = Vec::new();

    for sample in samples {
        let labels: Vec<(String, String)> = sample
            .label_names
            .iter()
            .zip(sample.label_values.iter())
            .filter(|(name, _)| name.as_str() != QUANTILE_LABEL)
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();

        let position = match pending.iter().position(|p| p.labels == labels) {
            Some(position) => position,
            None => {
                pending.push(PendingSummary {
                    labels,
                    quantiles: Vec::new(),
                    count: 0,
                });
                pending.len() - 1
            }
        };
        let summary = &mut pending[position];

        if let Some(q) = sample.label(QUANTILE_LABEL).and_then(|q| q.parse::<f64>().ok()) {
            let mut quantile = Quantile::default();
            quantile.set_quantile(q);
            quantile.set_value(sample.value);
            summary.quantiles.push(quantile);
        } else if &*sample.name != family {
            summary.count = sample.value as u64;
        }
    }

    pending
        .into_iter()
        .map(|p| {
            let mut summary = Summary::default();
            summary.set_sample_count(p.count);
            summary.set_quantile(p.quantiles.into());

            let pairs: Vec<LabelPair> = p
                .labels
                .into_iter()
                .map(|(name, value)| {
                    let mut pair = LabelPair::default();
                    pair.set_name(name);
                    pair.set_value(value);
                    pair
                })
                .collect();

            let mut metric = Metric::default();
            metric.set_label(pairs.into());
            metric.set_summary(summary);
            metric
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::MetricDefinition;

    fn sample(name: &str, names: &[&str], values: &[&str], value: f64) -> Sample {
        MetricDefinition::new(
            name,
            names.iter().map(|s| s.to_string()).collect(),
            values.iter().map(|s| s.to_string()).collect(),
        )
        .sample_with_value(value)
    }

    fn family(name: &str, kind: FamilyKind, samples: Vec<Sample>) -> MetricFamilySamples {
        MetricFamilySamples {
            name: name.to_string(),
            kind,
            help: "help".to_string(),
            samples,
        }
    }

    #[test]
    fn test_gauge_family() {
        let families = [family(
            "g",
            FamilyKind::Gauge,
            vec![
                sample("g", &["table"], &["a"], 1.0),
                sample("g", &["table"], &["b"], 2.0),
            ],
        )];

        let converted = to_metric_families(&families);
        assert_eq!(converted.len(), 1);
        assert_eq!(converted[0].get_name(), "g");
        assert_eq!(converted[0].get_metric().len(), 2);
    }

    #[test]
    fn test_summary_grouped_by_labels() {
        let mut samples = Vec::new();
        for table in ["a", "b"] {
            for q in ["0.5", "0.99"] {
                samples.push(sample("h", &["table", "quantile"], &[table, q], 3.0));
            }
            samples.push(sample("h_count", &["table"], &[table], 10.0));
        }

        let converted = to_metric_families(&[family("h", FamilyKind::Summary, samples)]);
        assert_eq!(converted[0].get_metric().len(), 2);

        let text = encode_text(&converted).unwrap();
        assert!(text.contains("# TYPE h summary"));
        assert!(text.contains("h{table=\"a\",quantile=\"0.99\"} 3"));
        assert!(text.contains("h_count{table=\"b\"} 10"));
    }

    #[test]
    fn test_empty_family_skipped() {
        let families = [
            family("empty", FamilyKind::Summary, Vec::new()),
            family("c_total", FamilyKind::Counter, vec![sample("c_total", &[], &[], 4.0)]),
        ];

        let converted = to_metric_families(&families);
        assert_eq!(converted.len(), 1);

        let text = encode_text(&converted).unwrap();
        assert!(text.contains("# TYPE c_total counter"));
        assert!(text.contains("c_total 4"));
    }
}
