// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-photon-counter project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

use anyhow::Result;
use rust_photon_counter::config::{self, Config};

#[test]
fn test_config_schema_output() -> Result<()> {
    // The schema goes to stdout; this only checks it is produced without error
    config::output_config_schema()?;
    Ok(())
}

#[test]
fn test_default_config_matches_schema() -> Result<()> {
    let schema: serde_json::Value = serde_json::from_str(config::utils::CONFIG_SCHEMA)?;
    let validator = jsonschema::draft202012::options().build(&schema)?;

    let defaults = serde_json::to_value(Config::default())?;
    assert!(validator.is_valid(&defaults));

    let formatted = config::utils::formatted_config_schema()?;
    assert!(formatted.contains("binning_mode"));
    assert!(formatted.contains("noise_seed"));
    Ok(())
}
