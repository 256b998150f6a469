// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-photon-counter project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).
//!
//! Waveform synthesis module
//!
//! This module generates synthetic detector traces with a known answer:
//! Poisson-spaced trapezoidal pulses over a Gaussian noise baseline.

pub mod noise_generator;
pub mod pulse_shape;
pub mod pulse_times;
pub mod waveform;

pub use noise_generator::NoiseGenerator;
pub use pulse_shape::TrapezoidPulse;
pub use pulse_times::PulseTimeSampler;
pub use waveform::{SyntheticWaveform, WaveformSynthesizer};

use crate::config::SynthesisConfig;
use crate::error::Result;

/// Synthesize the waveform described by `config`, using its two seeds
pub fn synthesize_from_config(config: &SynthesisConfig) -> Result<SyntheticWaveform> {
    WaveformSynthesizer::new(config)?.synthesize_seeded(config.seed, config.noise_seed)
}
