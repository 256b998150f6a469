// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-photon-counter project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Rising threshold-crossing detection
//!
//! A pulse event is recorded at sample `i` when
//!
//! ```text
//! voltage[i] <= threshold  &&  voltage[i + 1] > threshold
//! ```
//!
//! and is timestamped with `time[i]`, the last sample at or below the
//! threshold. A sample sitting exactly on the threshold counts as "below":
//! a trace that touches the threshold and then rises triggers once, a trace
//! that only reaches the threshold never triggers.

use log::debug;

use crate::acquisition::SeriesView;
use crate::error::{PulseCountError, Result};

/// One detected rising crossing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PulseEvent {
    /// Index, within the analysed view, of the last sample at or below the threshold
    pub index: usize,
    /// Time of that sample in seconds
    pub time: f64,
}

/// Trait for implementing pulse detectors
///
/// Detectors are stateless between calls: the result is a pure function of
/// the series and the detector parameters.
pub trait PulseDetector: Send + Sync {
    /// Detect the pulse events of a series, in time order
    fn detect(&self, series: SeriesView<'_>) -> Result<Vec<PulseEvent>>;

    /// Event timestamps only
    fn detect_times(&self, series: SeriesView<'_>) -> Result<Vec<f64>> {
        Ok(self
            .detect(series)?
            .into_iter()
            .map(|event| event.time)
            .collect())
    }
}

/// Threshold detector for rising edges
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RisingEdgeDetector {
    threshold: f64,
}

impl RisingEdgeDetector {
    /// Create a detector triggering at `threshold` volts
    ///
    /// # Errors
    ///
    /// [`PulseCountError::InvalidNumericInput`] if the threshold is NaN or infinite.
    pub fn new(threshold: f64) -> Result<Self> {
        if !threshold.is_finite() {
            return Err(PulseCountError::InvalidNumericInput {
                index: 0,
                what: "threshold",
            });
        }
        Ok(Self { threshold })
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }
}

impl PulseDetector for RisingEdgeDetector {
    fn detect(&self, series: SeriesView<'_>) -> Result<Vec<PulseEvent>> {
        if series.len() < 2 {
            return Err(PulseCountError::DegenerateSeries {
                samples: series.len(),
            });
        }

        let times = series.times();
        let threshold = self.threshold;
        let events: Vec<PulseEvent> = series
            .voltages()
            .windows(2)
            .enumerate()
            .filter(|(_, pair)| pair[0] <= threshold && pair[1] > threshold)
            .map(|(index, _)| PulseEvent {
                index,
                time: times[index],
            })
            .collect();

        debug!(
            "Detected {} rising edges at {} V over {} samples",
            events.len(),
            threshold,
            series.len()
        );
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acquisition::SampleSeries;

    fn series(voltages: &[f64]) -> SampleSeries {
        SampleSeries::uniform(0.0, 1.0, voltages.to_vec()).unwrap()
    }

    #[test]
    fn test_single_crossing_uses_last_low_sample() {
        let s = series(&[0.0, 0.2, 0.4, 1.5, 2.0, 2.0, 0.1]);
        let detector = RisingEdgeDetector::new(1.0).unwrap();

        let events = detector.detect(s.view()).unwrap();
        assert_eq!(events, vec![PulseEvent { index: 2, time: 2.0 }]);
    }

    #[test]
    fn test_threshold_tie_break() {
        let detector = RisingEdgeDetector::new(1.0).unwrap();

        // touching the threshold then rising: one event, at the touching sample
        let events = detector.detect(series(&[0.0, 1.0, 1.2]).view()).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].index, 1);

        // reaching the threshold exactly is not a crossing
        let events = detector.detect(series(&[0.0, 1.0, 0.0]).view()).unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn test_sustained_high_level_triggers_once() {
        let detector = RisingEdgeDetector::new(0.5).unwrap();
        let events = detector
            .detect(series(&[0.0, 1.0, 1.0, 1.0, 0.9, 1.0, 0.0, 0.0, 1.0]).view())
            .unwrap();

        let indices: Vec<usize> = events.iter().map(|e| e.index).collect();
        assert_eq!(indices, vec![0, 7]);
    }

    #[test]
    fn test_series_starting_above_threshold() {
        let detector = RisingEdgeDetector::new(0.5).unwrap();
        let events = detector.detect(series(&[2.0, 2.0, 0.0]).view()).unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn test_degenerate_view_is_rejected() {
        let s = series(&[0.0, 1.0, 2.0]);
        let detector = RisingEdgeDetector::new(0.5).unwrap();

        let err = detector.detect(s.slice(1..2)).unwrap_err();
        assert_eq!(err, PulseCountError::DegenerateSeries { samples: 1 });
    }

    #[test]
    fn test_rejects_nan_threshold() {
        assert!(RisingEdgeDetector::new(f64::NAN).is_err());
        assert!(RisingEdgeDetector::new(f64::NEG_INFINITY).is_err());
    }

    #[test]
    fn test_detection_is_deterministic() {
        let voltages: Vec<f64> = (0..500).map(|i| ((i as f64) * 0.37).sin()).collect();
        let s = series(&voltages);
        let detector = RisingEdgeDetector::new(0.25).unwrap();

        let first = detector.detect_times(s.view()).unwrap();
        let second = detector.detect_times(s.view()).unwrap();
        assert!(!first.is_empty());
        assert_eq!(first, second);
    }
}
