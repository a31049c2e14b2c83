use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use graph::LayoutOptions;
use serde::Deserialize;

/// Contents of a `--config` file.
///
/// ```toml
/// count = 500
///
/// [layout]
/// strategy = "row-by-row"
/// mainline = "develop"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Commits to load when `--count` is not given
    pub count: Option<usize>,
    pub layout: LayoutOptions,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("Invalid config {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.layout.validate()?;
        Ok(config)
    }
}
