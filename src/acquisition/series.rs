// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-photon-counter project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Validated `(time, voltage)` sample series
//!
//! A [`SampleSeries`] can only be built through [`SampleSeries::new`] (or its
//! serde / uniform-grid helpers), which guarantees:
//!
//! * `time` and `voltage` have the same length, at least 2 samples
//! * every value is finite
//! * `time` is strictly increasing
//!
//! Detectors therefore never have to re-check NaN or ordering on the hot path.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::error::{PulseCountError, Result};

/// An ordered sequence of `(time, voltage)` samples
///
/// The series is immutable once built; consumers borrow it read-only,
/// either as a whole through [`SampleSeries::view`] or as a contiguous
/// window through [`SampleSeries::slice`].
///
/// # Serialization
///
/// The JSON form uses the column names of the acquisition tables:
///
/// ```json
/// { "time_s": [0.0, 1e-9, 2e-9], "voltage_V": [0.01, -0.02, 0.0] }
/// ```
///
/// Deserialization runs the same validation as [`SampleSeries::new`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSeries", into = "RawSeries")]
pub struct SampleSeries {
    times: Vec<f64>,
    voltages: Vec<f64>,
}

/// Unvalidated wire form of a series
#[derive(Serialize, Deserialize)]
struct RawSeries {
    #[serde(rename = "time_s")]
    times: Vec<f64>,
    #[serde(rename = "voltage_V")]
    voltages: Vec<f64>,
}

impl TryFrom<RawSeries> for SampleSeries {
    type Error = PulseCountError;

    fn try_from(raw: RawSeries) -> Result<Self> {
        SampleSeries::new(raw.times, raw.voltages)
    }
}

impl From<SampleSeries> for RawSeries {
    fn from(series: SampleSeries) -> Self {
        Self {
            times: series.times,
            voltages: series.voltages,
        }
    }
}

impl SampleSeries {
    /// Build a series from two parallel columns
    ///
    /// # Errors
    ///
    /// * [`PulseCountError::LengthMismatch`] if the columns differ in length
    /// * [`PulseCountError::DegenerateSeries`] for fewer than 2 samples
    /// * [`PulseCountError::InvalidNumericInput`] for NaN or infinite values
    /// * [`PulseCountError::NonMonotonicTime`] if `time` is not strictly increasing
    pub fn new(times: Vec<f64>, voltages: Vec<f64>) -> Result<Self> {
        if times.len() != voltages.len() {
            return Err(PulseCountError::LengthMismatch {
                times: times.len(),
                voltages: voltages.len(),
            });
        }
        if times.len() < 2 {
            return Err(PulseCountError::DegenerateSeries {
                samples: times.len(),
            });
        }
        if let Some(index) = times.iter().position(|t| !t.is_finite()) {
            return Err(PulseCountError::InvalidNumericInput {
                index,
                what: "time",
            });
        }
        if let Some(index) = voltages.iter().position(|v| !v.is_finite()) {
            return Err(PulseCountError::InvalidNumericInput {
                index,
                what: "voltage",
            });
        }
        if let Some(index) = times.windows(2).position(|pair| pair[1] <= pair[0]) {
            return Err(PulseCountError::NonMonotonicTime { index: index + 1 });
        }

        Ok(Self { times, voltages })
    }

    /// Build a series on a uniform grid `time[i] = start + i * dt`
    pub fn uniform(start: f64, dt: f64, voltages: Vec<f64>) -> Result<Self> {
        if !(dt.is_finite() && dt > 0.0) {
            return Err(PulseCountError::InvalidNumericInput {
                index: 0,
                what: "sample spacing",
            });
        }
        let times = (0..voltages.len()).map(|i| start + i as f64 * dt).collect();
        Self::new(times, voltages)
    }

    /// Number of samples (always at least 2)
    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// Always `false`: a valid series holds at least two samples
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn voltages(&self) -> &[f64] {
        &self.voltages
    }

    pub fn start_time(&self) -> f64 {
        self.times[0]
    }

    pub fn end_time(&self) -> f64 {
        self.times[self.times.len() - 1]
    }

    /// Borrow the whole series
    pub fn view(&self) -> SeriesView<'_> {
        SeriesView {
            times: &self.times,
            voltages: &self.voltages,
        }
    }

    /// Borrow the samples in `range`
    ///
    /// # Panics
    ///
    /// Panics if `range` is out of bounds, like slice indexing.
    pub fn slice(&self, range: Range<usize>) -> SeriesView<'_> {
        SeriesView {
            times: &self.times[range.clone()],
            voltages: &self.voltages[range],
        }
    }

    /// Mean sample spacing over the whole series
    pub fn measured_dt(&self) -> f64 {
        (self.end_time() - self.start_time()) / (self.len() - 1) as f64
    }

    /// Check every sample spacing against a nominal `dt`
    ///
    /// Each consecutive spacing `d` must satisfy
    /// `|d - expected_dt| <= relative_tolerance * expected_dt`.
    /// Returns the mean measured spacing on success.
    ///
    /// # Errors
    ///
    /// * [`PulseCountError::SampleSpacingMismatch`] naming the first offending spacing
    /// * [`PulseCountError::InvalidIntervalConfig`] if `expected_dt` or the tolerance is unusable
    pub fn check_spacing(&self, expected_dt: f64, relative_tolerance: f64) -> Result<f64> {
        if !(expected_dt.is_finite() && expected_dt > 0.0) {
            return Err(PulseCountError::interval(format!(
                "expected_dt must be positive and finite, got {expected_dt}"
            )));
        }
        if !(relative_tolerance.is_finite() && relative_tolerance > 0.0) {
            return Err(PulseCountError::interval(format!(
                "dt tolerance must be positive and finite, got {relative_tolerance}"
            )));
        }

        let max_deviation = relative_tolerance * expected_dt;
        for (index, pair) in self.times.windows(2).enumerate() {
            let spacing = pair[1] - pair[0];
            if (spacing - expected_dt).abs() > max_deviation {
                return Err(PulseCountError::SampleSpacingMismatch {
                    index,
                    measured: spacing,
                    expected: expected_dt,
                    tolerance: relative_tolerance,
                });
            }
        }

        Ok(self.measured_dt())
    }
}

/// Borrowed, already validated window of a [`SampleSeries`]
///
/// A view may hold fewer than two samples when it is cut from a series;
/// detectors reject such views with [`PulseCountError::DegenerateSeries`].
#[derive(Debug, Clone, Copy)]
pub struct SeriesView<'a> {
    times: &'a [f64],
    voltages: &'a [f64],
}

impl<'a> SeriesView<'a> {
    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn times(&self) -> &'a [f64] {
        self.times
    }

    pub fn voltages(&self) -> &'a [f64] {
        self.voltages
    }

    pub fn first_time(&self) -> Option<f64> {
        self.times.first().copied()
    }

    pub fn last_time(&self) -> Option<f64> {
        self.times.last().copied()
    }
}
