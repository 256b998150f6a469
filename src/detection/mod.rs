// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-photon-counter project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).
//!
//! Pulse detection module
//!
//! This module turns a voltage time series into an ordered list of pulse
//! events, one per rising threshold crossing.

mod edge;

pub use edge::{PulseDetector, PulseEvent, RisingEdgeDetector};

use crate::error::Result;

/// Create a rising-edge detector triggering at `threshold` volts
pub fn create_edge_detector(threshold: f64) -> Result<Box<dyn PulseDetector>> {
    Ok(Box::new(RisingEdgeDetector::new(threshold)?))
}
