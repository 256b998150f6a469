// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-photon-counter project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Batch aggregation over several independent series
//!
//! Each `(source_id, series)` pair is checked against the nominal sample
//! spacing, aggregated with the configured policy, and its rows tagged with
//! the source id. Tables are concatenated in input order whatever the
//! execution strategy.
//!
//! Three batch policies are available:
//!
//! * [`MultiSeriesAggregator::aggregate`] stops at the first failing source
//! * [`MultiSeriesAggregator::aggregate_resilient`] keeps going and reports failures
//! * [`MultiSeriesAggregator::aggregate_concurrent`] runs every source on the
//!   blocking thread pool, with the resilient reporting

use std::sync::Arc;

use log::{debug, info, warn};
use serde::{Serialize, Serializer};

use super::binning::{BinningPolicy, IntervalAggregator};
use super::interval::IntervalTable;
use crate::acquisition::SampleSeries;
use crate::config::DetectionConfig;
use crate::detection::{PulseDetector, RisingEdgeDetector};
use crate::error::{PulseCountError, Result};

/// A source that could not be aggregated
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceFailure {
    pub source_id: String,
    #[serde(serialize_with = "serialize_error")]
    pub error: PulseCountError,
}

fn serialize_error<S: Serializer>(
    error: &PulseCountError,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_str(error)
}

/// Outcome of a resilient batch run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchReport {
    /// Rows of the sources that succeeded, in input order
    pub table: IntervalTable,
    /// Ids of the sources that succeeded, in input order
    pub succeeded: Vec<String>,
    /// Sources whose contribution was discarded, in input order
    pub failures: Vec<SourceFailure>,
}

impl BatchReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    fn push(
        &mut self,
        source_id: String,
        outcome: Result<IntervalTable>,
        tables: &mut Vec<IntervalTable>,
    ) {
        match outcome {
            Ok(table) => {
                tables.push(table);
                self.succeeded.push(source_id);
            }
            Err(error) => {
                warn!("Discarding source '{}': {}", source_id, error);
                self.failures.push(SourceFailure { source_id, error });
            }
        }
    }
}

/// Runs detection and aggregation over a batch of series
#[derive(Clone)]
pub struct MultiSeriesAggregator {
    detector: Arc<dyn PulseDetector>,
    aggregator: IntervalAggregator,
    expected_dt: f64,
    dt_tolerance: f64,
}

impl MultiSeriesAggregator {
    pub fn new(
        detector: Arc<dyn PulseDetector>,
        aggregator: IntervalAggregator,
        expected_dt: f64,
        dt_tolerance: f64,
    ) -> Result<Self> {
        if !(expected_dt.is_finite() && expected_dt > 0.0) {
            return Err(PulseCountError::interval(format!(
                "expected_dt must be positive and finite, got {expected_dt}"
            )));
        }
        if !(dt_tolerance.is_finite() && dt_tolerance > 0.0) {
            return Err(PulseCountError::interval(format!(
                "dt_tolerance must be positive and finite, got {dt_tolerance}"
            )));
        }
        Ok(Self {
            detector,
            aggregator,
            expected_dt,
            dt_tolerance,
        })
    }

    /// Rising-edge detector and binning policy described by `config`
    pub fn from_config(config: &DetectionConfig) -> Result<Self> {
        Self::new(
            Arc::new(RisingEdgeDetector::new(config.threshold)?),
            IntervalAggregator::from_config(config)?,
            config.expected_dt,
            config.dt_tolerance,
        )
    }

    pub fn aggregator(&self) -> &IntervalAggregator {
        &self.aggregator
    }

    /// Aggregate one source and tag its rows
    pub fn process_source(&self, source_id: &str, series: &SampleSeries) -> Result<IntervalTable> {
        let dt = series.check_spacing(self.expected_dt, self.dt_tolerance)?;
        let table = self.aggregator.aggregate(series, self.detector.as_ref())?;
        debug!(
            "Source '{}': {} samples at {:e} s, {} pulses in {} intervals",
            source_id,
            series.len(),
            dt,
            table.total_count(),
            table.len()
        );
        Ok(table.tagged(source_id))
    }

    /// Aggregate every source, failing on the first source that fails
    ///
    /// No partial table is returned.
    pub fn aggregate(&self, sources: &[(String, SampleSeries)]) -> Result<IntervalTable> {
        let tables = sources
            .iter()
            .map(|(source_id, series)| self.process_source(source_id, series))
            .collect::<Result<Vec<_>>>()?;
        info!("Aggregated {} sources", tables.len());
        Ok(IntervalTable::concat(tables))
    }

    /// Aggregate every source, keeping the ones that succeed
    pub fn aggregate_resilient(&self, sources: &[(String, SampleSeries)]) -> BatchReport {
        let mut report = BatchReport::default();
        let mut tables = Vec::with_capacity(sources.len());
        for (source_id, series) in sources {
            let outcome = self.process_source(source_id, series);
            report.push(source_id.clone(), outcome, &mut tables);
        }
        report.table = IntervalTable::concat(tables);
        info!(
            "Aggregated {} of {} sources",
            report.succeeded.len(),
            sources.len()
        );
        report
    }

    /// Aggregate every source on the blocking thread pool
    ///
    /// Workers are awaited in input order, so the report is identical to
    /// [`MultiSeriesAggregator::aggregate_resilient`]. A worker that panics
    /// is reported as [`PulseCountError::WorkerFailed`].
    pub async fn aggregate_concurrent(&self, sources: Vec<(String, SampleSeries)>) -> BatchReport {
        let total = sources.len();
        let handles: Vec<_> = sources
            .into_iter()
            .map(|(source_id, series)| {
                let worker = self.clone();
                let id = source_id.clone();
                let handle =
                    tokio::task::spawn_blocking(move || worker.process_source(&id, &series));
                (source_id, handle)
            })
            .collect();

        let mut report = BatchReport::default();
        let mut tables = Vec::with_capacity(total);
        for (source_id, handle) in handles {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(join_error) => Err(PulseCountError::WorkerFailed {
                    source_id: source_id.clone(),
                    reason: join_error.to_string(),
                }),
            };
            report.push(source_id, outcome, &mut tables);
        }
        report.table = IntervalTable::concat(tables);
        info!(
            "Aggregated {} of {} sources concurrently",
            report.succeeded.len(),
            total
        );
        report
    }
}

impl std::fmt::Debug for MultiSeriesAggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MultiSeriesAggregator")
            .field("aggregator", &self.aggregator)
            .field("expected_dt", &self.expected_dt)
            .field("dt_tolerance", &self.dt_tolerance)
            .finish_non_exhaustive()
    }
}
