//! CLI subcommands.

pub mod config;
pub mod parse;
pub mod upload;

use std::path::Path;

use bacs_core::BacsConfig;

/// Load and validate the file given by `--config`, or the defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<BacsConfig> {
    let config = match config_path {
        Some(path) => BacsConfig::from_file(Path::new(path))?,
        None => BacsConfig::default(),
    };
    config.validate()?;
    Ok(config)
}
