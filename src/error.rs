// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-photon-counter project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Error types shared by the detection, aggregation and synthesis modules.
//!
//! Every failure is scoped to a single series: when one of these errors is
//! returned, nothing computed for that series is kept.

use thiserror::Error;

/// Errors raised while validating, detecting or aggregating pulse data
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PulseCountError {
    /// The interval width cannot produce a single usable window
    #[error("Invalid interval configuration: {reason}")]
    InvalidIntervalConfig { reason: String },

    /// A sample spacing deviates from the nominal `dt` beyond the tolerance
    #[error(
        "Sample spacing mismatch at index {index}: measured {measured:e} s, expected {expected:e} s (relative tolerance {tolerance:e})"
    )]
    SampleSpacingMismatch {
        index: usize,
        measured: f64,
        expected: f64,
        tolerance: f64,
    },

    /// Fewer than two samples, no spacing or crossing can be computed
    #[error("Degenerate series: {samples} sample(s), at least 2 are required")]
    DegenerateSeries { samples: usize },

    /// NaN or infinite value in the input
    #[error("Invalid numeric input: non-finite {what} at index {index}")]
    InvalidNumericInput { index: usize, what: &'static str },

    #[error("Time and voltage lengths don't match: time={times}, voltage={voltages}")]
    LengthMismatch { times: usize, voltages: usize },

    /// `time` is not strictly increasing
    #[error("Time axis is not strictly increasing at index {index}")]
    NonMonotonicTime { index: usize },

    #[error("Invalid synthesis configuration: {reason}")]
    InvalidSynthesisConfig { reason: String },

    /// A concurrent worker panicked or was cancelled
    #[error("Worker for source '{source_id}' failed: {reason}")]
    WorkerFailed { source_id: String, reason: String },
}

impl PulseCountError {
    pub(crate) fn interval(reason: impl Into<String>) -> Self {
        Self::InvalidIntervalConfig {
            reason: reason.into(),
        }
    }

    pub(crate) fn synthesis(reason: impl Into<String>) -> Self {
        Self::InvalidSynthesisConfig {
            reason: reason.into(),
        }
    }
}

/// Result alias used across the library
pub type Result<T, E = PulseCountError> = std::result::Result<T, E>;
