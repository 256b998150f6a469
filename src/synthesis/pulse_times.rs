// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-photon-counter project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Poisson arrival times
//!
//! Trigger times are the partial sums of exponentially distributed gaps,
//! which makes the number of pulses in any window of length `w` Poisson
//! distributed with mean `w / mean_interval`.

use log::debug;
use rand::Rng;
use rand_distr::{Distribution, Exp};

use crate::error::{PulseCountError, Result};

/// Upper bound on the number of times preallocated before sampling
const MAX_CAPACITY_HINT: usize = 1 << 20;

/// Expected pulse count, clamped to [`MAX_CAPACITY_HINT`]
fn capacity_hint(total_time: f64, mean_interval: f64) -> usize {
    let expected = (total_time / mean_interval).ceil();
    if expected >= MAX_CAPACITY_HINT as f64 {
        MAX_CAPACITY_HINT
    } else if expected > 0.0 {
        expected as usize
    } else {
        0
    }
}

/// Draws pulse trigger times of a Poisson process
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PulseTimeSampler {
    mean_interval: f64,
}

impl PulseTimeSampler {
    /// `mean_interval` is the mean gap between pulses in seconds
    pub fn new(mean_interval: f64) -> Result<Self> {
        if !(mean_interval.is_finite() && mean_interval > 0.0) {
            return Err(PulseCountError::synthesis(format!(
                "mean pulse interval must be positive and finite, got {mean_interval}"
            )));
        }
        Ok(Self { mean_interval })
    }

    pub fn mean_interval(&self) -> f64 {
        self.mean_interval
    }

    /// Strictly increasing trigger times in `[0, total_time)`
    ///
    /// Gaps are drawn from `rng` until the running time reaches
    /// `total_time`; the same generator state always yields the same times.
    pub fn sample<R: Rng + ?Sized>(&self, total_time: f64, rng: &mut R) -> Result<Vec<f64>> {
        if !(total_time.is_finite() && total_time >= 0.0) {
            return Err(PulseCountError::synthesis(format!(
                "total time must be non-negative and finite, got {total_time}"
            )));
        }
        let gaps = Exp::new(1.0 / self.mean_interval)
            .map_err(|e| PulseCountError::synthesis(e.to_string()))?;

        let mut times = Vec::with_capacity(capacity_hint(total_time, self.mean_interval));
        let mut t = 0.0;
        loop {
            t += gaps.sample(rng);
            if t >= total_time {
                break;
            }
            // a zero gap would repeat the previous time
            if times.last().map_or(true, |&last| t > last) {
                times.push(t);
            }
        }

        debug!(
            "Sampled {} pulse times over {:e} s (mean interval {:e} s)",
            times.len(),
            total_time,
            self.mean_interval
        );
        Ok(times)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_times_are_increasing_and_in_range() {
        let sampler = PulseTimeSampler::new(1e-3).unwrap();
        let times = sampler
            .sample(0.5, &mut ChaCha8Rng::seed_from_u64(42))
            .unwrap();

        assert!(!times.is_empty());
        assert!(times[0] > 0.0);
        assert!(times.iter().all(|&t| t < 0.5));
        assert!(times.windows(2).all(|pair| pair[1] > pair[0]));
    }

    #[test]
    fn test_same_seed_same_times() {
        let sampler = PulseTimeSampler::new(2e-4).unwrap();
        let a = sampler.sample(0.1, &mut ChaCha8Rng::seed_from_u64(7)).unwrap();
        let b = sampler.sample(0.1, &mut ChaCha8Rng::seed_from_u64(7)).unwrap();
        let c = sampler.sample(0.1, &mut ChaCha8Rng::seed_from_u64(8)).unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_mean_rate() {
        // 20 000 expected arrivals: standard deviation ~141
        let sampler = PulseTimeSampler::new(1e-3).unwrap();
        let times = sampler
            .sample(20.0, &mut ChaCha8Rng::seed_from_u64(2024))
            .unwrap();

        let n = times.len() as f64;
        assert!((n - 20_000.0).abs() < 1_000.0, "got {n} arrivals");
    }

    #[test]
    fn test_empty_duration() {
        let sampler = PulseTimeSampler::new(1e-3).unwrap();
        let times = sampler
            .sample(0.0, &mut ChaCha8Rng::seed_from_u64(1))
            .unwrap();
        assert!(times.is_empty());
    }

    #[test]
    fn test_capacity_hint_is_bounded() {
        assert_eq!(capacity_hint(1.0, 1e-3), 1000);
        assert_eq!(capacity_hint(0.0, 1e-3), 0);
        assert_eq!(capacity_hint(1e300, 1e-300), MAX_CAPACITY_HINT);
        assert_eq!(capacity_hint(f64::MAX, f64::MIN_POSITIVE), MAX_CAPACITY_HINT);
    }

    #[test]
    fn test_rejects_invalid_parameters() {
        assert!(PulseTimeSampler::new(0.0).is_err());
        assert!(PulseTimeSampler::new(-1.0).is_err());
        let sampler = PulseTimeSampler::new(1.0).unwrap();
        assert!(sampler
            .sample(f64::NAN, &mut ChaCha8Rng::seed_from_u64(1))
            .is_err());
    }
}
