// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-photon-counter project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Configuration management for the photon counter
//!
//! This module provides functionality for loading, validating, and applying
//! configuration settings. The configuration is backed by a YAML file and
//! validated against a JSON schema before it is deserialized.
//!
//! ## Configuration Structure
//!
//! The configuration is organized in two sections:
//! - `detection`: threshold, interval length, binning policy and sample spacing checks
//! - `synthesis`: parameters of the synthetic waveform generator
//!
//! ## Usage
//!
//! ```no_run
//! use rust_photon_counter::aggregation::BinningMode;
//! use rust_photon_counter::config::Config;
//! use std::path::Path;
//!
//! // Load config from file, creates a default if not found
//! let mut config = Config::from_file(Path::new("config.yaml")).unwrap();
//!
//! // Apply command line overrides if needed
//! config.apply_args(
//!     Some(0.002),             // Interval length
//!     None,                    // Threshold
//!     Some(BinningMode::Fixed), // Binning mode
//!     Some(7),                 // Seed
//! );
//!
//! println!("Interval length: {} s", config.detection.interval_length);
//! ```

pub mod detection;
pub mod synthesis;
pub mod utils;

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use log::{debug, error};
use serde::{Deserialize, Serialize};

pub use detection::DetectionConfig;
pub use synthesis::SynthesisConfig;
pub use utils::output_config_schema;

use crate::aggregation::BinningMode;

/// Root configuration structure.
///
/// The configuration is deserialized from and serialized to YAML with
/// serde, after validation against the embedded JSON schema. Each section
/// falls back to its defaults when missing from the file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Pulse detection and interval aggregation settings.
    #[serde(default)]
    pub detection: DetectionConfig,

    /// Synthetic waveform settings, used when no input series is given.
    #[serde(default)]
    pub synthesis: SynthesisConfig,
}

impl Config {
    /// Helper method to create a sample config file when validation fails
    fn create_sample_config<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        let sample_path = path.with_extension("sample.yaml");
        debug!("Original path: {:?}, Sample path: {:?}", path, sample_path);

        if let Some(parent) = sample_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                debug!("Creating parent directory: {:?}", parent);
                fs::create_dir_all(parent).with_context(|| {
                    format!(
                        "Failed to create parent directory for sample config at {:?}",
                        parent
                    )
                })?;
            }
        }

        Self::default()
            .save_to_file(&sample_path)
            .with_context(|| format!("Failed to save sample config to {:?}", sample_path))?;

        error!(
            "Sample configuration file created at {:?}\nPlease edit and rename it",
            sample_path
        );
        Ok(())
    }

    /// Load configuration from a file
    ///
    /// A missing file is created with the default configuration. A file that
    /// fails schema validation, deserialization or the range checks of
    /// [`utils::validate_specific_rules`] is rejected, and a
    /// `<name>.sample.yaml` holding the defaults is written next to it.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!(
                "Configuration file not found at {:?}, creating default",
                path
            );
            let default_config = Self::default();
            default_config.save_to_file(path)?;
            return Ok(default_config);
        }

        debug!("Loading configuration from {:?}", path);
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file at {:?}", path))?;

        // YAML first, then JSON for the schema validator
        let yaml_value: serde_yml::Value = serde_yml::from_str(&contents)
            .with_context(|| format!("Failed to parse YAML configuration from {:?}", path))?;
        let json_value = serde_json::to_value(&yaml_value).with_context(|| {
            format!("Failed to convert YAML to JSON for validation: {:?}", path)
        })?;

        let schema: serde_json::Value = serde_json::from_str(utils::CONFIG_SCHEMA)
            .context("Failed to parse JSON schema")?;
        let validator = jsonschema::draft202012::options()
            .should_validate_formats(true)
            .build(&schema)?;

        debug!("Validating {} configuration against schema", path.display());
        if let Err(error) = validator.validate(&json_value) {
            error!("Configuration validation error before deserialization");
            Self::create_sample_config(path)?;
            anyhow::bail!("Configuration validation failed: {}", error);
        }

        let config: Config = match serde_yml::from_str(&contents) {
            Ok(config) => config,
            Err(err) => {
                error!("Configuration deserialization error: {}", err);
                if let Err(e) = Self::create_sample_config(path) {
                    error!("Failed to create sample config: {}", e);
                }
                return Err(anyhow::anyhow!(
                    "Failed to deserialize configuration from {}: {}",
                    path.display(),
                    err
                ));
            }
        };

        if let Err(err) = config.validate() {
            error!("Configuration specific validation error: {}", err);
            Self::create_sample_config(path)?;
            return Err(err);
        }

        Ok(config)
    }

    /// Save the configuration to a file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml =
            serde_yml::to_string(self).context("Failed to serialize configuration to YAML")?;

        let mut file = File::create(path.as_ref())
            .with_context(|| format!("Failed to create config file at {:?}", path.as_ref()))?;

        file.write_all(yaml.as_bytes())
            .with_context(|| format!("Failed to write configuration to {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Check the ranges the schema cannot express
    pub fn validate(&self) -> Result<()> {
        utils::validate_specific_rules(self)
    }

    /// Apply command line arguments to override configuration values.
    ///
    /// Only the arguments that are provided override the loaded values.
    ///
    /// # Parameters
    ///
    /// * `interval_length` - Aggregation window width in seconds
    /// * `threshold` - Detection threshold in volts
    /// * `binning_mode` - Binning policy
    /// * `seed` - Seed of the synthetic pulse arrival times
    pub fn apply_args(
        &mut self,
        interval_length: Option<f64>,
        threshold: Option<f64>,
        binning_mode: Option<BinningMode>,
        seed: Option<u64>,
    ) {
        if let Some(interval_length) = interval_length {
            debug!(
                "Overriding interval length from command line: {}",
                interval_length
            );
            self.detection.interval_length = interval_length;
        }
        if let Some(threshold) = threshold {
            debug!("Overriding threshold from command line: {}", threshold);
            self.detection.threshold = threshold;
        }
        if let Some(mode) = binning_mode {
            debug!("Overriding binning mode from command line: {:?}", mode);
            self.detection.binning_mode = mode;
        }
        if let Some(seed) = seed {
            debug!("Overriding seed from command line: {}", seed);
            self.synthesis.seed = seed;
        }
    }
}
