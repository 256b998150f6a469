// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-photon-counter project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Configuration utilities
//!
//! This module provides utility functions for working with configuration
//! settings, including validation and schema management.

use anyhow::{Context, Result};
use log::debug;

use super::Config;
use crate::aggregation::BinningMode;

/// JSON schema of the YAML configuration, draft 2020-12
pub const CONFIG_SCHEMA: &str = include_str!("../../resources/config.schema.json");

/// Output the embedded JSON schema to the console.
///
/// This function is called when the `--show-config-schema` flag is provided
/// on the command line.
///
/// # Example
///
/// ```bash
/// ./rust_photon_counter --show-config-schema > config_schema.json
/// ```
pub fn output_config_schema() -> Result<()> {
    println!("{}", formatted_config_schema()?);
    Ok(())
}

/// The embedded schema, pretty-printed
pub fn formatted_config_schema() -> Result<String> {
    let schema: serde_json::Value =
        serde_json::from_str(CONFIG_SCHEMA).context("Failed to parse JSON schema")?;
    serde_json::to_string_pretty(&schema).context("Failed to format JSON schema")
}

fn ensure_positive(name: &str, value: f64) -> Result<()> {
    if !(value.is_finite() && value > 0.0) {
        anyhow::bail!("{} must be positive and finite, got {}", name, value);
    }
    Ok(())
}

fn ensure_non_negative(name: &str, value: f64) -> Result<()> {
    if !(value.is_finite() && value >= 0.0) {
        anyhow::bail!("{} must be non-negative and finite, got {}", name, value);
    }
    Ok(())
}

/// Validates the configuration against additional rules that aren't covered by the JSON schema.
///
/// # Validation Rules
///
/// - **Durations and rates**: `interval_length`, `expected_dt`, `dt_tolerance`,
///   `total_time`, `sample_rate` and `mean_interval` are positive and finite
/// - **Levels**: `threshold` and `pulse_amplitude` are finite
/// - **Shape and noise**: `noise_std`, `rise_time_s` and `flat_width_s` are non-negative
/// - **Fixed binning**: a window must span at least two nominal samples
pub fn validate_specific_rules(config: &Config) -> Result<()> {
    debug!("Performing additional validation checks");

    let detection = &config.detection;
    ensure_positive("detection.interval_length", detection.interval_length)?;
    ensure_positive("detection.expected_dt", detection.expected_dt)?;
    ensure_positive("detection.dt_tolerance", detection.dt_tolerance)?;
    if !detection.threshold.is_finite() {
        anyhow::bail!("detection.threshold must be finite");
    }
    if detection.binning_mode == BinningMode::Fixed
        && (detection.interval_length / detection.expected_dt).round() < 2.0
    {
        anyhow::bail!(
            "detection.interval_length ({} s) must span at least two samples of {} s in fixed mode",
            detection.interval_length,
            detection.expected_dt
        );
    }

    let synthesis = &config.synthesis;
    ensure_positive("synthesis.total_time", synthesis.total_time)?;
    ensure_positive("synthesis.sample_rate", synthesis.sample_rate)?;
    ensure_positive("synthesis.mean_interval", synthesis.mean_interval)?;
    ensure_non_negative("synthesis.noise_std", synthesis.noise_std)?;
    ensure_non_negative("synthesis.rise_time_s", synthesis.rise_time_s)?;
    ensure_non_negative("synthesis.flat_width_s", synthesis.flat_width_s)?;
    if !synthesis.pulse_amplitude.is_finite() {
        anyhow::bail!("synthesis.pulse_amplitude must be finite");
    }

    Ok(())
}
