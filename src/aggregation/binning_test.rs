// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-photon-counter project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

use super::binning::{BinningMode, BinningPolicy, FixedSampleBinning, FreeBinning, IntervalAggregator};
use crate::acquisition::SampleSeries;
use crate::config::DetectionConfig;
use crate::detection::{PulseDetector, RisingEdgeDetector};
use crate::error::PulseCountError;

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_series(voltages: &[f64]) -> SampleSeries {
        SampleSeries::uniform(0.0, 1.0, voltages.to_vec()).unwrap()
    }

    #[test]
    fn test_free_binning_zero_fills_and_covers_span() {
        let binning = FreeBinning::new(0.25).unwrap();
        let table = binning
            .bin_event_times(&[0.1, 0.3, 0.6, 1.1], 0.0, 1.2)
            .unwrap();

        assert_eq!(table.counts(), vec![1, 1, 1, 0, 1]);
        let first = &table.intervals()[0];
        assert_eq!((first.start, first.end), (0.0, 0.25));
        // last bin is partial: it ends after the data
        let last = &table.intervals()[4];
        assert_eq!((last.start, last.end), (1.0, 1.25));
    }

    #[test]
    fn test_free_binning_event_on_edge_goes_to_next_bin() {
        let binning = FreeBinning::new(0.25).unwrap();
        let table = binning.bin_event_times(&[0.5], 0.0, 1.0).unwrap();

        assert_eq!(table.counts()[1], 0);
        assert_eq!(table.counts()[2], 1);
        assert_eq!(table.intervals()[2].start, 0.5);
    }

    #[test]
    fn test_free_binning_span_end_on_grid_edge() {
        let binning = FreeBinning::new(0.25).unwrap();
        let table = binning.bin_event_times(&[1.0], 0.0, 1.0).unwrap();

        // an extra bin keeps the final sample inside a right-open interval
        assert_eq!(table.len(), 5);
        assert_eq!(table.counts(), vec![0, 0, 0, 0, 1]);
    }

    #[test]
    fn test_free_binning_anchors_at_first_sample() {
        let binning = FreeBinning::new(0.5).unwrap();
        let table = binning.bin_event_times(&[10.2, 10.9], 10.0, 11.0).unwrap();

        let starts: Vec<f64> = table.iter().map(|interval| interval.start).collect();
        assert_eq!(starts, vec![10.0, 10.5, 11.0]);
        assert_eq!(table.counts(), vec![1, 1, 0]);
    }

    #[test]
    fn test_free_binning_conserves_events() {
        let voltages: Vec<f64> = (0..500).map(|i| ((i as f64) * 0.37).sin()).collect();
        let series = unit_series(&voltages);
        let detector = RisingEdgeDetector::new(0.25).unwrap();

        let detected = detector.detect(series.view()).unwrap().len() as u64;
        let table = FreeBinning::new(37.0)
            .unwrap()
            .aggregate(&series, &detector)
            .unwrap();

        assert!(detected > 0);
        assert_eq!(table.total_count(), detected);
        for pair in table.intervals().windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
    }

    #[test]
    fn test_rejects_non_positive_interval_length() {
        for bad in [0.0, -1e-3, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                FreeBinning::new(bad),
                Err(PulseCountError::InvalidIntervalConfig { .. })
            ));
            assert!(matches!(
                FixedSampleBinning::new(bad, 1e-9, 1e-3),
                Err(PulseCountError::InvalidIntervalConfig { .. })
            ));
        }
    }

    #[test]
    fn test_fixed_binning_counts_per_window_and_drops_remainder() {
        #[rustfmt::skip]
        let voltages = [
            0.0, 2.0, 0.0, 2.0, 0.0,
            0.0, 0.0, 0.0, 0.0, 0.0,
            0.0, 0.0, 2.0, 2.0, 0.0,
            0.0, 2.0,
        ];
        let series = unit_series(&voltages);
        let detector = RisingEdgeDetector::new(1.0).unwrap();
        let binning = FixedSampleBinning::new(5.0, 1.0, 1e-3).unwrap();

        let table = binning.aggregate(&series, &detector).unwrap();

        assert_eq!(table.counts(), vec![2, 0, 1]);
        let bounds: Vec<(f64, f64)> = table.iter().map(|i| (i.start, i.end)).collect();
        assert_eq!(bounds, vec![(0.0, 4.0), (5.0, 9.0), (10.0, 14.0)]);

        // the crossing in the dropped tail is never counted
        let kept = detector.detect(series.slice(0..15)).unwrap().len() as u64;
        assert_eq!(detector.detect(series.view()).unwrap().len(), 4);
        assert!(table.total_count() <= kept);
    }

    #[test]
    fn test_fixed_binning_misses_edge_straddling_windows() {
        let series = unit_series(&[0.0, 0.0, 0.0, 0.2, 2.0, 2.0, 0.0, 0.0]);
        let detector = RisingEdgeDetector::new(1.0).unwrap();

        let fixed = FixedSampleBinning::new(4.0, 1.0, 1e-3)
            .unwrap()
            .aggregate(&series, &detector)
            .unwrap();
        let free = FreeBinning::new(4.0)
            .unwrap()
            .aggregate(&series, &detector)
            .unwrap();

        assert_eq!(fixed.total_count(), 0);
        assert_eq!(free.total_count(), 1);
    }

    #[test]
    fn test_fixed_binning_twelve_windows_from_millisecond_intervals() {
        // 12.3 ms at 1 us: twelve full 1 ms windows, 0.3 ms left over
        let series = SampleSeries::uniform(0.0, 1e-6, vec![0.0; 12_300]).unwrap();
        let detector = RisingEdgeDetector::new(1.0).unwrap();
        let binning = FixedSampleBinning::new(1e-3, 1e-6, 1e-3).unwrap();

        assert_eq!(binning.window_samples(series.measured_dt()).unwrap(), 1000);
        let table = binning.aggregate(&series, &detector).unwrap();

        assert_eq!(table.len(), 12);
        assert_eq!(table.total_count(), 0);
        let last_kept = table.intervals()[11].end;
        assert_eq!(last_kept, series.times()[11_999]);
        assert_relative_eq!(series.end_time() - last_kept, 0.0003, max_relative = 1e-9);
    }

    #[test]
    fn test_fixed_binning_twelve_windows_at_nanosecond_sampling() {
        let detector = RisingEdgeDetector::new(1.0).unwrap();
        let binning = FixedSampleBinning::new(0.001, 1e-9, 1e-3).unwrap();

        let series = SampleSeries::uniform(0.0, 1e-9, vec![0.0; 12_300_000]).unwrap();
        let table = binning.aggregate(&series, &detector).unwrap();
        assert_eq!(table.len(), 12);
        drop(series);

        // Same length on the synthesizer grid i / sample_rate
        let times: Vec<f64> = (0..12_300_000).map(|i| i as f64 / 1e9).collect();
        let series = SampleSeries::new(times, vec![0.0; 12_300_000]).unwrap();
        let table = binning.aggregate(&series, &detector).unwrap();
        assert_eq!(table.len(), 12);
    }

    #[test]
    fn test_free_binning_rejects_width_below_time_resolution() {
        // Spacing of f64 near 1e9 s is about 1.2e-7 s
        let series = SampleSeries::uniform(1.0e9, 1e-6, vec![0.0, 2.0, 0.0, 2.0, 0.0]).unwrap();
        let detector = RisingEdgeDetector::new(1.0).unwrap();
        let binning = FreeBinning::new(1e-8).unwrap();

        let err = binning.aggregate(&series, &detector).unwrap_err();
        assert!(matches!(err, PulseCountError::InvalidIntervalConfig { .. }));

        // A width well above the resolution still bins the same absolute axis
        let table = FreeBinning::new(1e-6)
            .unwrap()
            .aggregate(&series, &detector)
            .unwrap();
        assert_eq!(table.total_count(), 2);
        for pair in table.intervals().windows(2) {
            assert!(pair[0].start < pair[0].end);
            assert_eq!(pair[0].end, pair[1].start);
        }
    }

    #[test]
    fn test_fixed_binning_rejects_zero_tolerance() {
        for bad in [0.0, -1e-3, f64::NAN] {
            assert!(matches!(
                FixedSampleBinning::new(1e-3, 1e-9, bad),
                Err(PulseCountError::InvalidIntervalConfig { .. })
            ));
        }
    }

    #[test]
    fn test_fixed_binning_window_wider_than_series() {
        let series = unit_series(&[0.0; 10]);
        let detector = RisingEdgeDetector::new(1.0).unwrap();
        let binning = FixedSampleBinning::new(20.0, 1.0, 1e-3).unwrap();

        let err = binning.aggregate(&series, &detector).unwrap_err();
        assert!(matches!(err, PulseCountError::InvalidIntervalConfig { .. }));
    }

    #[test]
    fn test_fixed_binning_window_below_two_samples() {
        let series = unit_series(&[0.0; 10]);
        let detector = RisingEdgeDetector::new(1.0).unwrap();
        let binning = FixedSampleBinning::new(1.2, 1.0, 1e-3).unwrap();

        let err = binning.aggregate(&series, &detector).unwrap_err();
        assert!(matches!(err, PulseCountError::InvalidIntervalConfig { .. }));
    }

    #[test]
    fn test_fixed_binning_rejects_spacing_mismatch() {
        let series = SampleSeries::uniform(0.0, 2e-9, vec![0.0; 100]).unwrap();
        let detector = RisingEdgeDetector::new(1.0).unwrap();
        let binning = FixedSampleBinning::new(2e-8, 1e-9, 1e-3).unwrap();

        let err = binning.aggregate(&series, &detector).unwrap_err();
        assert!(matches!(err, PulseCountError::SampleSpacingMismatch { .. }));
    }

    #[test]
    fn test_aggregation_is_deterministic() {
        let voltages: Vec<f64> = (0..1000).map(|i| ((i as f64) * 0.11).cos()).collect();
        let series = unit_series(&voltages);
        let detector = RisingEdgeDetector::new(0.5).unwrap();

        for aggregator in [
            IntervalAggregator::Free(FreeBinning::new(100.0).unwrap()),
            IntervalAggregator::Fixed(FixedSampleBinning::new(100.0, 1.0, 1e-3).unwrap()),
        ] {
            let first = aggregator.aggregate(&series, &detector).unwrap();
            let second = aggregator.aggregate(&series, &detector).unwrap();
            assert_eq!(first, second);
        }
    }

    #[test]
    fn test_aggregator_from_config() {
        let mut config = DetectionConfig::default();
        assert_eq!(
            IntervalAggregator::from_config(&config).unwrap().mode(),
            BinningMode::Free
        );

        config.binning_mode = BinningMode::Fixed;
        let aggregator = IntervalAggregator::from_config(&config).unwrap();
        assert_eq!(aggregator.mode(), BinningMode::Fixed);
        match aggregator {
            IntervalAggregator::Fixed(fixed) => {
                assert_eq!(fixed.expected_dt(), config.expected_dt);
                assert_eq!(fixed.dt_tolerance(), config.dt_tolerance);
            }
            other => panic!("unexpected policy {other:?}"),
        }

        config.interval_length = -1.0;
        assert!(IntervalAggregator::from_config(&config).is_err());
    }
}
