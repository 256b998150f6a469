// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-photon-counter project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Synthetic waveforms with known pulse times
//!
//! A waveform is built on a uniform grid `time[i] = i / sample_rate`:
//! the noise baseline is drawn first, then every trapezoidal pulse is added
//! on top of it. Both steps are additive so the result does not depend on
//! their order, only on the random streams.

use log::{debug, info};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use super::noise_generator::NoiseGenerator;
use super::pulse_shape::TrapezoidPulse;
use super::pulse_times::PulseTimeSampler;
use crate::acquisition::SampleSeries;
use crate::config::SynthesisConfig;
use crate::error::{PulseCountError, Result};

/// A synthetic series and the trigger times used to build it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyntheticWaveform {
    pub series: SampleSeries,
    /// Ground-truth trigger times, increasing, in seconds
    #[serde(rename = "pulse_times_s")]
    pub ground_truth: Vec<f64>,
}

impl SyntheticWaveform {
    pub fn pulse_count(&self) -> usize {
        self.ground_truth.len()
    }
}

/// Builds synthetic waveforms from a [`SynthesisConfig`]
#[derive(Debug, Clone, PartialEq)]
pub struct WaveformSynthesizer {
    sample_rate: f64,
    num_samples: usize,
    total_time: f64,
    sampler: PulseTimeSampler,
    pulse: TrapezoidPulse,
    noise: NoiseGenerator,
}

impl WaveformSynthesizer {
    pub fn new(config: &SynthesisConfig) -> Result<Self> {
        if !(config.total_time.is_finite() && config.total_time > 0.0) {
            return Err(PulseCountError::synthesis(format!(
                "total_time must be positive and finite, got {}",
                config.total_time
            )));
        }
        if !(config.sample_rate.is_finite() && config.sample_rate > 0.0) {
            return Err(PulseCountError::synthesis(format!(
                "sample_rate must be positive and finite, got {}",
                config.sample_rate
            )));
        }
        let num_samples = (config.total_time * config.sample_rate).round();
        if num_samples < 2.0 {
            return Err(PulseCountError::synthesis(format!(
                "{} s at {} Hz gives fewer than 2 samples",
                config.total_time, config.sample_rate
            )));
        }

        Ok(Self {
            sample_rate: config.sample_rate,
            num_samples: num_samples as usize,
            total_time: config.total_time,
            sampler: PulseTimeSampler::new(config.mean_interval)?,
            pulse: TrapezoidPulse::new(
                config.pulse_amplitude,
                config.rise_time_s,
                config.flat_width_s,
            )?,
            noise: NoiseGenerator::new(config.noise_std)?,
        })
    }

    pub fn num_samples(&self) -> usize {
        self.num_samples
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn pulse(&self) -> &TrapezoidPulse {
        &self.pulse
    }

    /// The sample grid `i / sample_rate`
    pub fn sample_times(&self) -> Vec<f64> {
        (0..self.num_samples)
            .map(|i| i as f64 / self.sample_rate)
            .collect()
    }

    /// Draw pulse times then noise from a single caller-owned generator
    pub fn synthesize<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<SyntheticWaveform> {
        let pulse_times = self.sampler.sample(self.total_time, rng)?;
        self.render(&pulse_times, rng)
    }

    /// Draw pulse times and noise from two independently seeded generators
    pub fn synthesize_seeded(&self, pulse_seed: u64, noise_seed: u64) -> Result<SyntheticWaveform> {
        let mut pulse_rng = ChaCha8Rng::seed_from_u64(pulse_seed);
        let mut noise_rng = ChaCha8Rng::seed_from_u64(noise_seed);
        let pulse_times = self.sampler.sample(self.total_time, &mut pulse_rng)?;
        self.render(&pulse_times, &mut noise_rng)
    }

    /// Build a waveform with the given trigger times
    ///
    /// Pulses that start before the grid or run past its end are clipped.
    /// An empty `pulse_times` gives a pure noise trace.
    pub fn render<R: Rng + ?Sized>(
        &self,
        pulse_times: &[f64],
        noise_rng: &mut R,
    ) -> Result<SyntheticWaveform> {
        if let Some(index) = pulse_times.iter().position(|t| !t.is_finite()) {
            return Err(PulseCountError::InvalidNumericInput {
                index,
                what: "pulse time",
            });
        }
        let mut ground_truth = pulse_times.to_vec();
        ground_truth.sort_by(f64::total_cmp);

        let times = self.sample_times();
        let mut voltages = self.noise.generate(self.num_samples, noise_rng);
        for &trigger in &ground_truth {
            self.pulse.render(&times, &mut voltages, trigger);
        }
        debug!(
            "Rendered {} pulses over {} samples (noise {} V)",
            ground_truth.len(),
            self.num_samples,
            self.noise.sigma()
        );

        let series = SampleSeries::new(times, voltages)?;
        info!(
            "Synthesized {:e} s waveform with {} pulses",
            self.total_time,
            ground_truth.len()
        );
        Ok(SyntheticWaveform {
            series,
            ground_truth,
        })
    }
}
