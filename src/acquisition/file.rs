// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-photon-counter project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! JSON series files
//!
//! Vendor formats are converted upstream; this loader only reads the
//! `{ "time_s": [...], "voltage_V": [...] }` form and validates it.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use log::debug;

use super::series::SampleSeries;

/// Load and validate a series from a JSON file
pub fn load_series<P: AsRef<Path>>(path: P) -> Result<SampleSeries> {
    let path = path.as_ref();
    debug!("Loading sample series from {:?}", path);

    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read series file at {:?}", path))?;
    let series: SampleSeries = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse series from {:?}", path))?;

    debug!(
        "Loaded {} samples spanning {:e} s from {:?}",
        series.len(),
        series.end_time() - series.start_time(),
        path
    );
    Ok(series)
}

/// Write a series to a JSON file
pub fn save_series<P: AsRef<Path>>(series: &SampleSeries, path: P) -> Result<()> {
    let path = path.as_ref();
    let json = serde_json::to_string(series).context("Failed to serialize sample series")?;
    fs::write(path, json).with_context(|| format!("Failed to write series to {:?}", path))?;
    Ok(())
}

/// Source identifier used to tag intervals: the file stem, or the full path if it has none
pub fn source_id_for<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
