// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-photon-counter project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Rust Photon Counter library
//!
//! This library detects single-photon pulses in digitized voltage traces and
//! counts them per time window, so the count distribution can be compared
//! with a Poisson model. A synthetic waveform generator provides traces with
//! known pulse times.

pub mod acquisition;
pub mod aggregation;
pub mod config;
pub mod detection;
pub mod error;
pub mod synthesis;

use serde::{Deserialize, Serialize};

pub use error::{PulseCountError, Result};

use aggregation::{CountStatistics, Interval, SourceFailure};

/// Result of a counting run
#[derive(Debug, Serialize)]
pub struct AnalysisReport {
    /// Timestamp of the analysis
    pub generated_at: chrono::DateTime<chrono::Utc>,
    /// Per-window pulse counts, in source order
    pub intervals: Vec<Interval>,
    /// Summary of the counts, absent when no interval was produced
    pub statistics: Option<CountStatistics>,
    /// Ground truth of a synthetic run
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ground_truth: Option<GroundTruthSummary>,
    /// Sources discarded by a resilient batch run
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<SourceFailure>,
}

/// What a synthetic waveform actually contained
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroundTruthSummary {
    pub pulses: usize,
    pub detected: u64,
    pub seed: u64,
    pub noise_seed: u64,
}
