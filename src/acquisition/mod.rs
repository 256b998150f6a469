// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-photon-counter project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Waveform acquisition module
//!
//! This module holds the validated sample series consumed by the detectors,
//! and the loader for series that an external converter (oscilloscope
//! binary or CSV parser) has already written out as JSON.

pub mod file;
pub mod series;

pub use file::{load_series, save_series, source_id_for};
pub use series::{SampleSeries, SeriesView};
