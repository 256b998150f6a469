// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-photon-counter project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

// Main entry point for the photon counter
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info};

use rust_photon_counter::acquisition::{load_series, source_id_for, SampleSeries};
use rust_photon_counter::aggregation::{
    create_interval_aggregator, BatchReport, BinningMode, CountStatistics, MultiSeriesAggregator,
};
use rust_photon_counter::config::{output_config_schema, Config};
use rust_photon_counter::detection::create_edge_detector;
use rust_photon_counter::synthesis::synthesize_from_config;
use rust_photon_counter::{AnalysisReport, GroundTruthSummary};

/// Single-photon pulse counter: detects rising edges and counts them per time window
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Series files (JSON with time_s and voltage_V); synthesizes a waveform when absent
    #[arg(short, long)]
    input: Vec<PathBuf>,

    /// Aggregation window width in seconds
    #[arg(long)]
    interval_length: Option<f64>,

    /// Detection threshold in volts
    #[arg(long, allow_hyphen_values = true)]
    threshold: Option<f64>,

    /// Binning policy
    #[arg(long, value_enum)]
    binning_mode: Option<BinningMode>,

    /// Seed of the synthetic pulse arrival times
    #[arg(long)]
    seed: Option<u64>,

    /// Output file for results (JSON)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Keep going when a series fails and report it
    #[arg(long)]
    resilient: bool,

    /// Process the series in parallel (implies --resilient)
    #[arg(long)]
    concurrent: bool,

    /// Print the configuration JSON schema and exit
    #[arg(long)]
    show_config_schema: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if args.show_config_schema {
        return output_config_schema();
    }

    let mut config = Config::from_file(&args.config)?;
    config.apply_args(
        args.interval_length,
        args.threshold,
        args.binning_mode,
        args.seed,
    );
    config
        .validate()
        .context("Invalid configuration after command line overrides")?;
    debug!("Effective configuration: {:?}", config);

    let report = if args.input.is_empty() {
        run_synthetic(&config)?
    } else {
        let sources = args
            .input
            .iter()
            .map(|path| Ok((source_id_for(path), load_series(path)?)))
            .collect::<Result<Vec<(String, SampleSeries)>>>()?;
        let aggregator = MultiSeriesAggregator::from_config(&config.detection)?;

        let batch = if args.concurrent {
            aggregator.aggregate_concurrent(sources).await
        } else if args.resilient {
            aggregator.aggregate_resilient(&sources)
        } else {
            BatchReport {
                table: aggregator.aggregate(&sources)?,
                succeeded: sources.into_iter().map(|(id, _)| id).collect(),
                failures: Vec::new(),
            }
        };
        info!(
            "{} series processed, {} failed",
            batch.succeeded.len(),
            batch.failures.len()
        );

        AnalysisReport {
            generated_at: chrono::Utc::now(),
            statistics: CountStatistics::from_table(&batch.table),
            intervals: batch.table.into_intervals(),
            ground_truth: None,
            failures: batch.failures,
        }
    };

    if let Some(output_path) = args.output {
        println!("Saving results to: {}", output_path.display());
        std::fs::write(&output_path, serde_json::to_string_pretty(&report)?)
            .with_context(|| format!("Failed to write results to {:?}", output_path))?;
    } else {
        print_summary(&report);
    }

    if !report.failures.is_empty() {
        anyhow::bail!("{} series could not be processed", report.failures.len());
    }
    Ok(())
}

fn run_synthetic(config: &Config) -> Result<AnalysisReport> {
    println!("No input series, synthesizing a waveform");
    let waveform = synthesize_from_config(&config.synthesis)?;

    let detector = create_edge_detector(config.detection.threshold)?;
    let detected = detector.detect(waveform.series.view())?.len() as u64;
    let table = create_interval_aggregator(&config.detection)?
        .aggregate(&waveform.series, detector.as_ref())?;

    Ok(AnalysisReport {
        generated_at: chrono::Utc::now(),
        statistics: CountStatistics::from_table(&table),
        intervals: table.into_intervals(),
        ground_truth: Some(GroundTruthSummary {
            pulses: waveform.pulse_count(),
            detected,
            seed: config.synthesis.seed,
            noise_seed: config.synthesis.noise_seed,
        }),
        failures: Vec::new(),
    })
}

fn print_summary(report: &AnalysisReport) {
    println!("Photon counter");
    println!("--------------");
    if let Some(truth) = &report.ground_truth {
        println!(
            "- Synthetic pulses: {} (seed {}, noise seed {})",
            truth.pulses, truth.seed, truth.noise_seed
        );
        println!("- Detected pulses: {}", truth.detected);
    }
    match &report.statistics {
        Some(stats) => {
            println!("- Intervals: {}", stats.intervals);
            println!("- Total pulses: {}", stats.total_pulses);
            println!("- Mean count (lambda): {:.4}", stats.mean);
            println!("- Variance: {:.4}", stats.variance);
            if let Some(dispersion) = stats.dispersion_index() {
                println!("- Dispersion index: {:.4}", dispersion);
            }
            println!("- Count histogram:");
            for (count, (&n, err)) in stats
                .histogram
                .iter()
                .zip(&stats.histogram_errors)
                .enumerate()
            {
                println!("    {:>3}: {} ± {:.2}", count, n, err);
            }
        }
        None => println!("- No interval produced"),
    }
    for failure in &report.failures {
        println!("- Failed: {}: {}", failure.source_id, failure.error);
    }
}
