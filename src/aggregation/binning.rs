// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-photon-counter project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Binning policies
//!
//! Two ways of turning a series into per-window pulse counts, sharing the
//! [`BinningPolicy`] interface and the [`IntervalTable`] output:
//!
//! * [`FreeBinning`] detects once over the whole series and drops the event
//!   times into a time grid anchored at the first sample. Works for
//!   irregular timestamps; the last bin may be partial.
//! * [`FixedSampleBinning`] cuts the series into windows of a fixed number
//!   of samples and runs detection independently in each. Needs a validated
//!   uniform `dt`; trailing samples that do not fill a window are dropped.
//!   A rising edge that straddles a window boundary is seen by neither
//!   window, since each window starts detection afresh.

use clap::ValueEnum;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::interval::{Interval, IntervalTable};
use crate::acquisition::SampleSeries;
use crate::config::DetectionConfig;
use crate::detection::PulseDetector;
use crate::error::{PulseCountError, Result};

/// Selects the binning policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BinningMode {
    /// Time grid anchored at the first sample
    #[default]
    Free,
    /// Fixed number of samples per window
    Fixed,
}

/// Trait for implementing interval aggregation
pub trait BinningPolicy: Send + Sync {
    /// Detect pulses in `series` and count them per window
    fn aggregate(
        &self,
        series: &SampleSeries,
        detector: &dyn PulseDetector,
    ) -> Result<IntervalTable>;
}

fn check_interval_length(interval_length: f64) -> Result<()> {
    if interval_length.is_finite() && interval_length > 0.0 {
        Ok(())
    } else {
        Err(PulseCountError::interval(format!(
            "interval_length must be positive and finite, got {interval_length}"
        )))
    }
}

/// Time grid `start + k * interval_length` anchored at the first sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FreeBinning {
    interval_length: f64,
}

impl FreeBinning {
    pub fn new(interval_length: f64) -> Result<Self> {
        check_interval_length(interval_length)?;
        Ok(Self { interval_length })
    }

    pub fn interval_length(&self) -> f64 {
        self.interval_length
    }

    /// Count event times into the grid covering `[span_start, span_end]`
    ///
    /// The grid has edges `span_start + k * interval_length` and enough bins
    /// for the last edge to lie strictly after `span_end`, so every time in
    /// the span falls in exactly one right-open bin `edges[j] <= t < edges[j + 1]`.
    /// Empty bins are kept with a zero count. Times outside the span are
    /// ignored (the detector never produces them).
    pub fn bin_event_times(
        &self,
        event_times: &[f64],
        span_start: f64,
        span_end: f64,
    ) -> Result<IntervalTable> {
        if !(span_start.is_finite() && span_end.is_finite() && span_end >= span_start) {
            return Err(PulseCountError::interval(format!(
                "invalid time span [{span_start}, {span_end}]"
            )));
        }

        let width = self.interval_length;
        let edge = |k: usize| span_start + k as f64 * width;
        let resolution_error = || {
            PulseCountError::interval(format!(
                "interval_length {width:e} s is below the time resolution at {span_start} s"
            ))
        };
        if edge(1) <= edge(0) {
            return Err(resolution_error());
        }

        let mut n_bins = (((span_end - span_start) / width).ceil() as usize).max(1);
        while edge(n_bins) <= span_end {
            n_bins += 1;
        }
        // Edges must stay strictly increasing up to the far end of the grid.
        if edge(n_bins) <= edge(n_bins - 1) {
            return Err(resolution_error());
        }

        let mut counts = vec![0u64; n_bins];
        let mut ignored = 0usize;
        for &time in event_times {
            if !(time >= span_start && time < edge(n_bins)) {
                ignored += 1;
                continue;
            }
            // The floor estimate can be one off near an edge; settle on the exact edge comparison.
            let mut bin = (((time - span_start) / width).floor() as usize).min(n_bins - 1);
            while bin > 0 && time < edge(bin) {
                bin -= 1;
            }
            while bin + 1 < n_bins && time >= edge(bin + 1) {
                bin += 1;
            }
            counts[bin] += 1;
        }
        if ignored > 0 {
            warn!("Ignored {} event(s) outside [{}, {}]", ignored, span_start, span_end);
        }

        let intervals = counts
            .into_iter()
            .enumerate()
            .map(|(bin, count)| Interval::new(edge(bin), edge(bin + 1), count))
            .collect();
        Ok(IntervalTable::new(intervals))
    }
}

impl BinningPolicy for FreeBinning {
    fn aggregate(
        &self,
        series: &SampleSeries,
        detector: &dyn PulseDetector,
    ) -> Result<IntervalTable> {
        let event_times = detector.detect_times(series.view())?;
        let table = self.bin_event_times(&event_times, series.start_time(), series.end_time())?;
        debug!(
            "Free binning: {} events in {} bins of {:e} s",
            event_times.len(),
            table.len(),
            self.interval_length
        );
        Ok(table)
    }
}

/// Windows of `round(interval_length / dt)` consecutive samples
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedSampleBinning {
    interval_length: f64,
    expected_dt: f64,
    dt_tolerance: f64,
}

impl FixedSampleBinning {
    /// `expected_dt` is the nominal sample spacing, `dt_tolerance` the
    /// allowed relative deviation of every measured spacing from it
    pub fn new(interval_length: f64, expected_dt: f64, dt_tolerance: f64) -> Result<Self> {
        check_interval_length(interval_length)?;
        if !(expected_dt.is_finite() && expected_dt > 0.0) {
            return Err(PulseCountError::interval(format!(
                "expected_dt must be positive and finite, got {expected_dt}"
            )));
        }
        if !(dt_tolerance.is_finite() && dt_tolerance > 0.0) {
            return Err(PulseCountError::interval(format!(
                "dt_tolerance must be positive and finite, got {dt_tolerance}"
            )));
        }
        Ok(Self {
            interval_length,
            expected_dt,
            dt_tolerance,
        })
    }

    pub fn interval_length(&self) -> f64 {
        self.interval_length
    }

    pub fn expected_dt(&self) -> f64 {
        self.expected_dt
    }

    pub fn dt_tolerance(&self) -> f64 {
        self.dt_tolerance
    }

    /// Samples per window for spacing `dt`
    ///
    /// A window needs at least two samples for a crossing to exist.
    pub fn window_samples(&self, dt: f64) -> Result<usize> {
        let samples = (self.interval_length / dt).round();
        if !(samples >= 2.0) {
            return Err(PulseCountError::interval(format!(
                "interval_length {:e} s holds fewer than 2 samples of {:e} s",
                self.interval_length, dt
            )));
        }
        Ok(samples as usize)
    }
}

impl BinningPolicy for FixedSampleBinning {
    fn aggregate(
        &self,
        series: &SampleSeries,
        detector: &dyn PulseDetector,
    ) -> Result<IntervalTable> {
        let dt = series.check_spacing(self.expected_dt, self.dt_tolerance)?;
        let window_samples = self.window_samples(dt)?;
        let full_windows = series.len() / window_samples;
        if full_windows == 0 {
            return Err(PulseCountError::interval(format!(
                "a window of {} samples is wider than the {} available samples",
                window_samples,
                series.len()
            )));
        }

        let dropped = series.len() - full_windows * window_samples;
        if dropped > 0 {
            debug!(
                "Fixed binning: dropping {} trailing samples ({:e} s)",
                dropped,
                dropped as f64 * dt
            );
        }

        let mut intervals = Vec::with_capacity(full_windows);
        for window in 0..full_windows {
            let start = window * window_samples;
            let view = series.slice(start..start + window_samples);
            let events = detector.detect(view)?;
            let times = view.times();
            intervals.push(Interval::new(
                times[0],
                times[times.len() - 1],
                events.len() as u64,
            ));
        }

        debug!(
            "Fixed binning: {} windows of {} samples",
            full_windows, window_samples
        );
        Ok(IntervalTable::new(intervals))
    }
}

/// The closed set of binning policies, selected by configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IntervalAggregator {
    Free(FreeBinning),
    Fixed(FixedSampleBinning),
}

impl IntervalAggregator {
    /// Build the policy named by `config.binning_mode`
    pub fn from_config(config: &DetectionConfig) -> Result<Self> {
        Ok(match config.binning_mode {
            BinningMode::Free => Self::Free(FreeBinning::new(config.interval_length)?),
            BinningMode::Fixed => Self::Fixed(FixedSampleBinning::new(
                config.interval_length,
                config.expected_dt,
                config.dt_tolerance,
            )?),
        })
    }

    pub fn mode(&self) -> BinningMode {
        match self {
            Self::Free(_) => BinningMode::Free,
            Self::Fixed(_) => BinningMode::Fixed,
        }
    }
}

impl BinningPolicy for IntervalAggregator {
    fn aggregate(
        &self,
        series: &SampleSeries,
        detector: &dyn PulseDetector,
    ) -> Result<IntervalTable> {
        match self {
            Self::Free(policy) => policy.aggregate(series, detector),
            Self::Fixed(policy) => policy.aggregate(series, detector),
        }
    }
}
