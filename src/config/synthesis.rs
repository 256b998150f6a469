// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-photon-counter project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Synthetic waveform configuration

use serde::{Deserialize, Serialize};

/// Parameters of a synthetic waveform.
///
/// Pulse arrival times and noise use two separate seeds, so the noise level
/// can be changed without moving the pulses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesisConfig {
    /// Waveform duration in seconds
    #[serde(default = "default_total_time")]
    pub total_time: f64,

    /// Samples per second
    #[serde(default = "default_sample_rate")]
    pub sample_rate: f64,

    /// Mean time between pulses in seconds
    #[serde(default = "default_mean_interval")]
    pub mean_interval: f64,

    /// Seed of the pulse arrival times
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Seed of the noise baseline
    #[serde(default = "default_noise_seed")]
    pub noise_seed: u64,

    /// Standard deviation of the Gaussian noise in volts
    #[serde(default = "default_noise_std")]
    pub noise_std: f64,

    /// Pulse height in volts
    #[serde(default = "default_pulse_amplitude")]
    pub pulse_amplitude: f64,

    /// Duration of each ramp in seconds
    #[serde(default = "default_rise_time")]
    pub rise_time_s: f64,

    /// Duration of the flat top in seconds, ramps excluded
    #[serde(default = "default_flat_width")]
    pub flat_width_s: f64,
}

fn default_total_time() -> f64 {
    0.01
}

fn default_sample_rate() -> f64 {
    1e9
}

fn default_mean_interval() -> f64 {
    1e-3
}

fn default_seed() -> u64 {
    42
}

fn default_noise_seed() -> u64 {
    1337
}

fn default_noise_std() -> f64 {
    0.05
}

fn default_pulse_amplitude() -> f64 {
    2.0
}

fn default_rise_time() -> f64 {
    2e-9
}

fn default_flat_width() -> f64 {
    1e-8
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            total_time: default_total_time(),
            sample_rate: default_sample_rate(),
            mean_interval: default_mean_interval(),
            seed: default_seed(),
            noise_seed: default_noise_seed(),
            noise_std: default_noise_std(),
            pulse_amplitude: default_pulse_amplitude(),
            rise_time_s: default_rise_time(),
            flat_width_s: default_flat_width(),
        }
    }
}
