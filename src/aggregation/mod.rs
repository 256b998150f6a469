// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-photon-counter project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).
//! Interval aggregation module
//!
//! This module groups detected pulse events into fixed-duration windows,
//! producing the interval tables whose count distribution is compared with
//! a Poisson model.

pub mod binning;
pub mod interval;
pub mod multi_series;
pub mod statistics;
#[cfg(test)]
mod binning_test;

pub use binning::{BinningMode, BinningPolicy, FixedSampleBinning, FreeBinning, IntervalAggregator};
pub use interval::{Interval, IntervalTable};
pub use multi_series::{BatchReport, MultiSeriesAggregator, SourceFailure};
pub use statistics::CountStatistics;

use crate::config::DetectionConfig;
use crate::error::Result;

/// Create the binning policy selected by `config`
pub fn create_interval_aggregator(config: &DetectionConfig) -> Result<Box<dyn BinningPolicy>> {
    Ok(Box::new(IntervalAggregator::from_config(config)?))
}
