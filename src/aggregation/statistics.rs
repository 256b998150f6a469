// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-photon-counter project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Summary statistics of a count table
//!
//! For a Poisson source the mean count per interval estimates λ and the
//! variance should match it, so the dispersion index `variance / mean`
//! stays close to 1. The histogram is what gets compared to a Poisson PMF.

use serde::{Deserialize, Serialize};

use super::interval::IntervalTable;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountStatistics {
    /// Number of intervals
    pub intervals: usize,
    /// Sum of all counts
    pub total_pulses: u64,
    /// Mean count per interval (λ estimate)
    pub mean: f64,
    /// Unbiased sample variance of the counts, 0 for a single interval
    pub variance: f64,
    /// `histogram[k]` is the number of intervals holding exactly `k` pulses
    pub histogram: Vec<u64>,
    /// Poisson uncertainty of each histogram bin, `sqrt(histogram[k])`
    pub histogram_errors: Vec<f64>,
}

impl CountStatistics {
    /// Returns `None` for an empty table
    pub fn from_table(table: &IntervalTable) -> Option<Self> {
        Self::from_counts(&table.counts())
    }

    pub fn from_counts(counts: &[u64]) -> Option<Self> {
        if counts.is_empty() {
            return None;
        }

        let n = counts.len();
        let total_pulses: u64 = counts.iter().sum();
        let mean = total_pulses as f64 / n as f64;
        let variance = if n > 1 {
            counts
                .iter()
                .map(|&count| (count as f64 - mean).powi(2))
                .sum::<f64>()
                / (n - 1) as f64
        } else {
            0.0
        };

        let max_count = counts.iter().copied().max().unwrap_or(0) as usize;
        let mut histogram = vec![0u64; max_count + 1];
        for &count in counts {
            histogram[count as usize] += 1;
        }
        let histogram_errors = histogram.iter().map(|&h| (h as f64).sqrt()).collect();

        Some(Self {
            intervals: n,
            total_pulses,
            mean,
            variance,
            histogram,
            histogram_errors,
        })
    }

    /// `variance / mean`, `None` when no pulse was counted
    pub fn dispersion_index(&self) -> Option<f64> {
        (self.mean > 0.0).then(|| self.variance / self.mean)
    }
}
