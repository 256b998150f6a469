// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-photon-counter project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! # Gaussian Noise Generator
//!
//! This module adds white Gaussian noise to a voltage buffer, emulating the
//! baseline noise of a digitizer front end. It is used to:
//!
//! - Build realistic synthetic waveforms for the pulse detector
//! - Check how the detection threshold behaves against the noise floor
//!
//! ## Features
//!
//! * i.i.d. samples from `N(0, sigma²)` through [`rand_distr::Normal`]
//! * Caller-owned random generator: the same seed always gives the same noise
//! * Additive, in place: the buffer may already hold pulses
//!
//! ## Examples
//!
//! ```rust
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//! use rust_photon_counter::synthesis::NoiseGenerator;
//!
//! let generator = NoiseGenerator::new(0.05).unwrap();
//! let mut rng = ChaCha8Rng::seed_from_u64(1337);
//!
//! let mut buffer = vec![0.0; 1000];
//! generator.inject(&mut buffer, &mut rng);
//! assert!(buffer.iter().any(|&v| v != 0.0));
//! ```

use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::error::{PulseCountError, Result};

/// Additive white Gaussian noise source.
///
/// The generator only holds the noise level; the random state is passed to
/// each call, so one generator can serve concurrent syntheses that each own
/// their RNG.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseGenerator {
    /// Standard deviation of the noise in volts
    sigma: f64,
    /// `N(0, sigma²)`, built once by `new`
    normal: Normal<f64>,
}

impl NoiseGenerator {
    /// Creates a noise generator with the given standard deviation.
    ///
    /// # Arguments
    ///
    /// * `sigma` - Standard deviation in volts; `0.0` disables the noise
    ///
    /// # Returns
    ///
    /// A new `NoiseGenerator`, or [`PulseCountError::InvalidSynthesisConfig`]
    /// if `sigma` is negative, NaN or infinite.
    ///
    /// # Examples
    ///
    /// ```
    /// use rust_photon_counter::synthesis::NoiseGenerator;
    ///
    /// assert!(NoiseGenerator::new(0.05).is_ok());
    /// assert!(NoiseGenerator::new(-1.0).is_err());
    /// ```
    pub fn new(sigma: f64) -> Result<Self> {
        if !(sigma.is_finite() && sigma >= 0.0) {
            return Err(PulseCountError::synthesis(format!(
                "noise standard deviation must be non-negative and finite, got {sigma}"
            )));
        }
        let normal =
            Normal::new(0.0, sigma).map_err(|e| PulseCountError::synthesis(e.to_string()))?;
        Ok(Self { sigma, normal })
    }

    /// Returns the standard deviation in volts.
    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    /// Adds one noise sample to every element of `buffer`, in place.
    ///
    /// Nothing is drawn from `rng` when `sigma` is zero.
    ///
    /// # Arguments
    ///
    /// * `buffer` - Voltage samples to perturb
    /// * `rng` - Random generator owned by the caller
    pub fn inject<R: Rng + ?Sized>(&self, buffer: &mut [f64], rng: &mut R) {
        if self.sigma == 0.0 {
            return;
        }
        for sample in buffer.iter_mut() {
            *sample += self.normal.sample(rng);
        }
    }

    /// Generates `len` samples of pure noise.
    ///
    /// # Examples
    ///
    /// ```
    /// use rand::SeedableRng;
    /// use rand_chacha::ChaCha8Rng;
    /// use rust_photon_counter::synthesis::NoiseGenerator;
    ///
    /// let generator = NoiseGenerator::new(0.1).unwrap();
    /// let a = generator.generate(64, &mut ChaCha8Rng::seed_from_u64(7));
    /// let b = generator.generate(64, &mut ChaCha8Rng::seed_from_u64(7));
    /// assert_eq!(a, b);
    /// ```
    pub fn generate<R: Rng + ?Sized>(&self, len: usize, rng: &mut R) -> Vec<f64> {
        let mut buffer = vec![0.0; len];
        self.inject(&mut buffer, rng);
        buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_noise_statistics() {
        let generator = NoiseGenerator::new(0.5).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let samples = generator.generate(100_000, &mut rng);

        let n = samples.len() as f64;
        let mean = samples.iter().sum::<f64>() / n;
        let variance = samples.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);

        assert!(mean.abs() < 0.01, "mean {mean}");
        assert!((variance.sqrt() - 0.5).abs() < 0.01, "std {}", variance.sqrt());
    }

    #[test]
    fn test_noise_is_additive() {
        let generator = NoiseGenerator::new(0.1).unwrap();

        let mut offset = vec![3.0; 256];
        generator.inject(&mut offset, &mut ChaCha8Rng::seed_from_u64(9));
        let plain = generator.generate(256, &mut ChaCha8Rng::seed_from_u64(9));

        for (shifted, base) in offset.iter().zip(&plain) {
            assert!((shifted - 3.0 - base).abs() < 1e-12);
        }
    }

    #[test]
    fn test_zero_sigma_leaves_buffer_untouched() {
        let generator = NoiseGenerator::new(0.0).unwrap();
        let mut buffer = vec![1.25; 16];
        generator.inject(&mut buffer, &mut ChaCha8Rng::seed_from_u64(1));
        assert!(buffer.iter().all(|&v| v == 1.25));
    }

    #[test]
    fn test_tiny_sigma_still_draws_noise() {
        let generator = NoiseGenerator::new(f64::MIN_POSITIVE).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut untouched = ChaCha8Rng::seed_from_u64(5);

        let mut buffer = vec![0.0; 8];
        generator.inject(&mut buffer, &mut rng);

        assert_eq!(generator.sigma(), f64::MIN_POSITIVE);
        assert_ne!(rng.random::<u64>(), untouched.random::<u64>());
    }

    #[test]
    fn test_rejects_invalid_sigma() {
        assert!(NoiseGenerator::new(-0.1).is_err());
        assert!(NoiseGenerator::new(f64::NAN).is_err());
        assert!(NoiseGenerator::new(f64::INFINITY).is_err());
    }
}
