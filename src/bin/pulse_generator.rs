// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-photon-counter project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

// Synthetic pulse train generator for detector testing
// Writes a JSON series with Poisson-spaced trapezoidal pulses over Gaussian noise

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use rust_photon_counter::acquisition::save_series;
use rust_photon_counter::config::SynthesisConfig;
use rust_photon_counter::synthesis::WaveformSynthesizer;

/// Synthetic pulse train generator for detector testing
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Output series file (.json)
    #[arg(short, long, value_name = "FILE")]
    output: PathBuf,

    /// Ground-truth pulse times file (.json), defaults to <output>.truth.json
    #[arg(long, value_name = "FILE")]
    truth: Option<PathBuf>,

    /// Duration in seconds
    #[arg(short, long, default_value_t = 0.01)]
    duration: f64,

    /// Sample rate in samples per second
    #[arg(short, long, default_value_t = 1e9)]
    sample_rate: f64,

    /// Mean time between pulses in seconds
    #[arg(short, long, default_value_t = 1e-3)]
    mean_interval: f64,

    /// Pulse amplitude in volts
    #[arg(short, long, default_value_t = 2.0)]
    amplitude: f64,

    /// Ramp duration in seconds
    #[arg(long, default_value_t = 2e-9)]
    rise_time: f64,

    /// Flat-top duration in seconds, ramps excluded
    #[arg(long, default_value_t = 1e-8)]
    flat_width: f64,

    /// Noise standard deviation in volts
    #[arg(short, long, default_value_t = 0.05)]
    noise: f64,

    /// Seed of the pulse arrival times
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Seed of the noise
    #[arg(long, default_value_t = 1337)]
    noise_seed: u64,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = SynthesisConfig {
        total_time: args.duration,
        sample_rate: args.sample_rate,
        mean_interval: args.mean_interval,
        seed: args.seed,
        noise_seed: args.noise_seed,
        noise_std: args.noise,
        pulse_amplitude: args.amplitude,
        rise_time_s: args.rise_time,
        flat_width_s: args.flat_width,
    };
    let synthesizer = WaveformSynthesizer::new(&config)?;

    println!(
        "Generating {} s of pulses at {} S/s...",
        args.duration, args.sample_rate
    );
    println!("Mean interval: {} s", args.mean_interval);
    println!(
        "Pulse: {} V, ramps {} s, flat top {} s",
        args.amplitude, args.rise_time, args.flat_width
    );
    println!("Noise: {} V", args.noise);

    let waveform = synthesizer.synthesize_seeded(args.seed, args.noise_seed)?;

    save_series(&waveform.series, &args.output)?;
    let truth_path = args
        .truth
        .unwrap_or_else(|| args.output.with_extension("truth.json"));
    let truth = serde_json::json!({
        "pulse_times_s": waveform.ground_truth,
        "seed": args.seed,
        "noise_seed": args.noise_seed,
    });
    std::fs::write(&truth_path, serde_json::to_string_pretty(&truth)?)
        .with_context(|| format!("Failed to write ground truth to {:?}", truth_path))?;

    println!(
        "Wrote {} samples with {} pulses to {}",
        waveform.series.len(),
        waveform.pulse_count(),
        args.output.display()
    );
    println!("Ground truth: {}", truth_path.display());

    Ok(())
}
