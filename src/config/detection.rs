// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-photon-counter project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Pulse detection and aggregation configuration
//!
//! This module defines the settings that control how pulses are detected
//! and how they are counted per time window.

use serde::{Deserialize, Serialize};

use crate::aggregation::BinningMode;

/// Configuration for pulse detection and interval aggregation.
///
/// # Detection
///
/// * `threshold` - Rising-edge trigger level in volts
///
/// # Aggregation
///
/// * `interval_length` - Window width in seconds
/// * `binning_mode` - `free` (time grid) or `fixed` (sample-count windows)
///
/// # Sample spacing
///
/// * `expected_dt` - Nominal sample spacing in seconds
/// * `dt_tolerance` - Allowed relative deviation of each spacing from `expected_dt`
///
/// # Example
///
/// ```
/// use rust_photon_counter::aggregation::BinningMode;
/// use rust_photon_counter::config::DetectionConfig;
///
/// let detection = DetectionConfig {
///     interval_length: 1e-3,
///     threshold: 1.0,
///     binning_mode: BinningMode::Fixed,
///     expected_dt: 1e-9,
///     dt_tolerance: 1e-3,
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// Aggregation window width in seconds
    #[serde(default = "default_interval_length")]
    pub interval_length: f64,

    /// Detection threshold in volts
    #[serde(default = "default_threshold")]
    pub threshold: f64,

    /// Binning policy
    #[serde(default)]
    pub binning_mode: BinningMode,

    /// Nominal sample spacing in seconds
    #[serde(default = "default_expected_dt")]
    pub expected_dt: f64,

    /// Relative tolerance on each sample spacing
    #[serde(default = "default_dt_tolerance")]
    pub dt_tolerance: f64,
}

fn default_interval_length() -> f64 {
    1e-3 // 1 ms windows
}

fn default_threshold() -> f64 {
    1.0
}

fn default_expected_dt() -> f64 {
    1e-9 // 1 GS/s digitizer
}

fn default_dt_tolerance() -> f64 {
    1e-3
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            interval_length: default_interval_length(),
            threshold: default_threshold(),
            binning_mode: BinningMode::default(),
            expected_dt: default_expected_dt(),
            dt_tolerance: default_dt_tolerance(),
        }
    }
}
