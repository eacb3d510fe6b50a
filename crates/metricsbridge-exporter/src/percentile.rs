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
//! Percentile estimation over estimated-histogram bucket arrays
//!
//! Gauges that report a bucket array use the estimated-histogram layout:
//! an array of `n` counts where bucket `i < n - 1` covers values up to
//! `offsets[i]` and the last bucket counts overflowing values. Offsets grow
//! geometrically by a factor of 1.2, starting at 1.
//!
//! A percentile resolves to the offset of the first bucket at which the
//! cumulative count reaches `ceil(q * total)`. When that point lies in the
//! overflow bucket the largest finite offset is reported.

use tracing::warn;

/// Quantiles exported for every histogram-shaped family
pub const QUANTILES: [f64; 6] = [0.5, 0.75, 0.95, 0.98, 0.99, 0.999];

/// Label values for [`QUANTILES`], in the same order
pub const QUANTILE_LABELS: [&str; 6] = ["0.5", "0.75", "0.95", "0.98", "0.99", "0.999"];

/// Label name carrying the quantile
pub const QUANTILE_LABEL: &str = "quantile";

/// Upper bounds of the first `size` buckets.
///
/// Offsets saturate at `u64::MAX`; buckets past that point share it.
pub fn bucket_offsets(size: usize) -> Vec<u64> {
    let mut offsets = Vec::with_capacity(size);
    if size == 0 {
        return offsets;
    }

    let mut last: u64 = 1;
    offsets.push(last);
    while offsets.len() < size {
        // `as` saturates, so `next` is at most u64::MAX
        let mut next = (last as f64 * 1.2).round() as u64;
        if next <= last {
            next = last.saturating_add(1);
        }
        offsets.push(next);
        last = next;
    }
    offsets
}

/// Read-only estimator over one bucket array snapshot
#[derive(Debug, Clone)]
pub struct EstimatedHistogram<'a> {
    buckets: &'a [u64],
    offsets: Vec<u64>,
    total: u64,
}

impl<'a> EstimatedHistogram<'a> {
    /// Wrap a bucket array. `None` for an empty or all-zero array.
    pub fn from_buckets(buckets: &'a [u64]) -> Option<Self> {
        let total = buckets.iter().fold(0u64, |acc, c| acc.saturating_add(*c));
        if total == 0 {
            return None;
        }

        Some(Self {
            buckets,
            offsets: bucket_offsets(buckets.len() - 1),
            total,
        })
    }

    /// Total number of observations, overflow included
    pub fn total_count(&self) -> u64 {
        self.total
    }

    /// Number of observations beyond the largest offset
    pub fn overflow_count(&self) -> u64 {
        self.buckets.last().copied().unwrap_or(0)
    }

    /// Whether any observation landed in the overflow bucket
    pub fn is_overflowed(&self) -> bool {
        self.overflow_count() > 0
    }

    /// Bucket upper bounds, excluding the overflow bucket
    pub fn offsets(&self) -> &[u64] {
        &self.offsets
    }

    /// Estimate the value at `quantile` (0.0 ..= 1.0)
    pub fn percentile(&self, quantile: f64) -> f64 {
        let target = (self.total as f64 * quantile.clamp(0.0, 1.0)).ceil() as u64;
        if target == 0 {
            return 0.0;
        }

        let mut cumulative = 0u64;
        for (count, offset) in self.buckets.iter().zip(&self.offsets) {
            cumulative = cumulative.saturating_add(*count);
            if cumulative >= target {
                return *offset as f64;
            }
        }

        self.offsets.last().copied().unwrap_or(0) as f64
    }

    /// Estimates for every entry of [`QUANTILES`]
    pub fn percentiles(&self) -> [f64; 6] {
        if self.is_overflowed() {
            warn!(
                overflow = self.overflow_count(),
                "Estimated histogram overflowed, upper quantiles are clamped"
            );
        }
        QUANTILES.map(|q| self.percentile(q))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_offsets() {
        assert!(bucket_offsets(0).is_empty());
        assert_eq!(bucket_offsets(1), vec![1]);
        assert_eq!(
            bucket_offsets(12),
            vec![1, 2, 3, 4, 5, 6, 7, 8, 10, 12, 14, 17]
        );
    }

    #[test]
    fn test_offsets_strictly_increase() {
        let offsets = bucket_offsets(90);
        assert!(offsets.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_offsets_saturate_on_long_arrays() {
        let offsets = bucket_offsets(300);
        assert_eq!(offsets.len(), 300);
        assert!(offsets.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(offsets.last().copied(), Some(u64::MAX));
        assert_eq!(&offsets[..90], &bucket_offsets(90)[..]);
    }

    #[test]
    fn test_long_array_percentiles() {
        let mut buckets = vec![0u64; 300];
        buckets[0] = 5;
        let histogram = EstimatedHistogram::from_buckets(&buckets).unwrap();
        assert_eq!(histogram.percentiles(), [1.0; 6]);

        buckets[0] = 0;
        buckets[298] = 2;
        let histogram = EstimatedHistogram::from_buckets(&buckets).unwrap();
        assert_eq!(histogram.percentile(0.5), u64::MAX as f64);
    }

    #[test]
    fn test_empty_and_zero_arrays() {
        assert!(EstimatedHistogram::from_buckets(&[]).is_none());
        assert!(EstimatedHistogram::from_buckets(&[0, 0, 0, 0]).is_none());
    }

    #[test]
    fn test_small_array() {
        // offsets [1, 2, 3] plus overflow
        let buckets = [1, 2, 3, 0];
        let histogram = EstimatedHistogram::from_buckets(&buckets).unwrap();
        assert_eq!(histogram.total_count(), 6);
        assert!(!histogram.is_overflowed());
        assert_eq!(histogram.percentile(0.5), 2.0);
        assert_eq!(histogram.percentile(0.75), 3.0);
        assert_eq!(histogram.percentiles(), [2.0, 3.0, 3.0, 3.0, 3.0, 3.0]);
    }

    #[test]
    fn test_single_bucket() {
        let buckets = [0, 10, 0, 0];
        let histogram = EstimatedHistogram::from_buckets(&buckets).unwrap();
        assert_eq!(histogram.percentiles(), [2.0; 6]);
    }

    #[test]
    fn test_overflow_clamps_to_last_offset() {
        let buckets = [1, 0, 0, 9];
        let histogram = EstimatedHistogram::from_buckets(&buckets).unwrap();
        assert!(histogram.is_overflowed());
        assert_eq!(histogram.total_count(), 10);
        assert_eq!(histogram.percentile(0.1), 1.0);
        assert_eq!(histogram.percentile(0.5), 3.0);
    }

    #[test]
    fn test_only_overflow_bucket() {
        let histogram = EstimatedHistogram::from_buckets(&[5]).unwrap();
        assert_eq!(histogram.percentile(0.5), 0.0);
    }

    #[test]
    fn test_zero_quantile() {
        let buckets = [0, 0, 4, 0];
        let histogram = EstimatedHistogram::from_buckets(&buckets).unwrap();
        assert_eq!(histogram.percentile(0.0), 0.0);
    }
}
