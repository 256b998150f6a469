// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-photon-counter project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Interval rows and tables

use serde::{Deserialize, Serialize};

/// One aggregation window and the number of pulses counted in it
///
/// Serialized with the column names of the output table:
/// `interval_start_s`, `interval_end_s`, `pulse_count` and, for batch
/// results, `source_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    /// Window start in seconds
    #[serde(rename = "interval_start_s")]
    pub start: f64,

    /// Window end in seconds
    ///
    /// Exclusive grid edge for free binning, time of the last sample in the
    /// window for fixed-sample binning.
    #[serde(rename = "interval_end_s")]
    pub end: f64,

    /// Pulses counted in the window
    #[serde(rename = "pulse_count")]
    pub count: u64,

    /// Series this row came from, set by the batch aggregator
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,
}

impl Interval {
    pub fn new(start: f64, end: f64, count: u64) -> Self {
        Self {
            start,
            end,
            count,
            source_id: None,
        }
    }
}

/// Ordered, non-overlapping intervals; the final output of an aggregation
///
/// Tables are built once by an aggregator and never mutated afterwards;
/// the consuming helpers ([`IntervalTable::tagged`], [`IntervalTable::concat`])
/// produce new tables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IntervalTable {
    intervals: Vec<Interval>,
}

impl IntervalTable {
    pub fn new(intervals: Vec<Interval>) -> Self {
        debug_assert!(
            intervals.windows(2).all(|pair| pair[0].start < pair[1].start
                || pair[0].source_id != pair[1].source_id),
            "intervals must be ordered within a source"
        );
        Self { intervals }
    }

    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Interval> {
        self.intervals.iter()
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    /// Sum of `pulse_count` over all rows
    pub fn total_count(&self) -> u64 {
        self.intervals.iter().map(|interval| interval.count).sum()
    }

    /// The `pulse_count` column
    pub fn counts(&self) -> Vec<u64> {
        self.intervals.iter().map(|interval| interval.count).collect()
    }

    /// Tag every row with `source_id`
    pub fn tagged(mut self, source_id: &str) -> Self {
        for interval in &mut self.intervals {
            interval.source_id = Some(source_id.to_string());
        }
        self
    }

    /// Concatenate tables, keeping their order
    pub fn concat<I>(tables: I) -> Self
    where
        I: IntoIterator<Item = IntervalTable>,
    {
        Self {
            intervals: tables
                .into_iter()
                .flat_map(|table| table.intervals)
                .collect(),
        }
    }

    pub fn into_intervals(self) -> Vec<Interval> {
        self.intervals
    }
}

impl<'a> IntoIterator for &'a IntervalTable {
    type Item = &'a Interval;
    type IntoIter = std::slice::Iter<'a, Interval>;

    fn into_iter(self) -> Self::IntoIter {
        self.intervals.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_and_concat_preserve_order() {
        let a = IntervalTable::new(vec![Interval::new(0.0, 1.0, 2), Interval::new(1.0, 2.0, 0)]);
        let b = IntervalTable::new(vec![Interval::new(0.0, 1.0, 5)]);

        let merged = IntervalTable::concat(vec![a.tagged("first"), b.tagged("second")]);

        assert_eq!(merged.len(), 3);
        assert_eq!(merged.counts(), vec![2, 0, 5]);
        assert_eq!(merged.total_count(), 7);
        let ids: Vec<_> = merged
            .iter()
            .map(|interval| interval.source_id.as_deref())
            .collect();
        assert_eq!(ids, vec![Some("first"), Some("first"), Some("second")]);
    }

    #[test]
    fn test_serialized_column_names() {
        let table = IntervalTable::new(vec![Interval::new(0.0, 0.001, 3)]);
        let json = serde_json::to_value(&table).unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                { "interval_start_s": 0.0, "interval_end_s": 0.001, "pulse_count": 3 }
            ])
        );

        let tagged = serde_json::to_value(table.tagged("NewFile1")).unwrap();
        assert_eq!(tagged[0]["source_id"], "NewFile1");
    }
}
