//! Loading of the engine configuration file.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use sonar_scout_core::EngineConfig;

/// Loads and validates the configuration, falling back to defaults when no
/// path is given.
pub(crate) fn load(path: Option<&Path>) -> Result<EngineConfig> {
    let config = match path {
        Some(path) => {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("failed to read config file at {}", path.display()))?;
            parse(&contents)
                .with_context(|| format!("invalid config file at {}", path.display()))?
        }
        None => EngineConfig::default(),
    };

    config.validate().context("config failed validation")?;
    Ok(config)
}

fn parse(contents: &str) -> Result<EngineConfig> {
    toml::from_str(contents).context("failed to parse engine config toml contents")
}
