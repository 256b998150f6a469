// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-photon-counter project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Trapezoidal pulse shape
//!
//! Relative to its trigger time a pulse of amplitude `A` is
//!
//! ```text
//!   [0, r)             A * t / r                  linear rise
//!   [r, r + f)         A                          flat top
//!   [r + f, 2r + f)    A * (1 - (t - r - f) / r)  linear fall
//! ```
//!
//! with `r` the rise time and `f` the flat-top width, so the flat top does
//! not include the ramps and the total duration is `2r + f`. A zero rise time
//! gives a rectangular pulse of width `f`.

use crate::error::{PulseCountError, Result};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrapezoidPulse {
    amplitude: f64,
    rise_time: f64,
    flat_width: f64,
}

impl TrapezoidPulse {
    pub fn new(amplitude: f64, rise_time: f64, flat_width: f64) -> Result<Self> {
        if !amplitude.is_finite() {
            return Err(PulseCountError::synthesis(format!(
                "pulse amplitude must be finite, got {amplitude}"
            )));
        }
        if !(rise_time.is_finite() && rise_time >= 0.0) {
            return Err(PulseCountError::synthesis(format!(
                "rise time must be non-negative and finite, got {rise_time}"
            )));
        }
        if !(flat_width.is_finite() && flat_width >= 0.0) {
            return Err(PulseCountError::synthesis(format!(
                "flat-top width must be non-negative and finite, got {flat_width}"
            )));
        }
        Ok(Self {
            amplitude,
            rise_time,
            flat_width,
        })
    }

    pub fn amplitude(&self) -> f64 {
        self.amplitude
    }

    pub fn rise_time(&self) -> f64 {
        self.rise_time
    }

    pub fn flat_width(&self) -> f64 {
        self.flat_width
    }

    /// Total duration `2 * rise_time + flat_width`
    pub fn duration(&self) -> f64 {
        2.0 * self.rise_time + self.flat_width
    }

    /// Pulse value at `t_rel` seconds after the trigger, 0 outside the pulse
    pub fn value_at(&self, t_rel: f64) -> f64 {
        let (rise, flat) = (self.rise_time, self.flat_width);
        if !(t_rel >= 0.0 && t_rel < self.duration()) {
            0.0
        } else if t_rel < rise {
            self.amplitude * t_rel / rise
        } else if t_rel < rise + flat {
            self.amplitude
        } else {
            // only reachable with rise > 0: t_rel < 2 * rise + flat
            self.amplitude * (1.0 - (t_rel - rise - flat) / rise)
        }
    }

    /// Add the pulse triggered at `trigger_time` to `buffer`
    ///
    /// `times` holds the (increasing) sample times of `buffer`. Samples
    /// outside the pulse, or beyond the end of the shorter of the two slices,
    /// are left untouched, so a pulse hanging over either end of the buffer
    /// is simply clipped. Overlapping pulses add up.
    pub fn render(&self, times: &[f64], buffer: &mut [f64], trigger_time: f64) {
        let end_time = trigger_time + self.duration();
        let first = times.partition_point(|&t| t < trigger_time);
        let last = times
            .partition_point(|&t| t < end_time)
            .min(buffer.len());

        for i in first..last {
            buffer[i] += self.value_at(times[i] - trigger_time);
        }
    }
}
