//! Configuration file support
//!
//! Loads render defaults from JSON files.
//!
//! Search order:
//! 1. Explicit path (--config CLI flag)
//! 2. `.srsviewrc.json` in the working directory
//! 3. `srsview.config.json` in the working directory
//!
//! All fields are optional. CLI flags take precedence over config file
//! values.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::filter::{FilterState, FULL_RANGE};

/// Render defaults loaded from a JSON config file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SrsViewConfig {
    /// Report title (default: "Site Risk Score Report")
    #[serde(default)]
    pub title: Option<String>,

    /// Initial SRS filter range as `[min, max]` (default: `[0, 100]`)
    #[serde(default)]
    pub initial_range: Option<[f64; 2]>,

    /// Initial minimum study count (default: 0)
    #[serde(default)]
    pub min_studies: Option<u32>,

    /// Default outcome/metric identifier for drill-down filtering
    #[serde(default)]
    pub outcome: Option<String>,
}

/// Resolved configuration: defaults merged with a config file
#[derive(Debug, Clone)]
pub struct ResolvedOptions {
    pub title: String,
    pub initial: FilterState,
    pub outcome: Option<String>,
    /// Path the config was loaded from (None if defaults)
    pub config_path: Option<PathBuf>,
}

impl Default for ResolvedOptions {
    fn default() -> Self {
        ResolvedOptions {
            title: "Site Risk Score Report".to_string(),
            initial: FilterState::default(),
            outcome: None,
            config_path: None,
        }
    }
}

impl SrsViewConfig {
    /// Validate the configuration for logical errors
    pub fn validate(&self) -> Result<()> {
        if let Some([min, max]) = self.initial_range {
            if !(FULL_RANGE.0..=FULL_RANGE.1).contains(&min) {
                anyhow::bail!(
                    "initial_range minimum must be within [0, 100] (got {})",
                    min
                );
            }
            if !(FULL_RANGE.0..=FULL_RANGE.1).contains(&max) {
                anyhow::bail!(
                    "initial_range maximum must be within [0, 100] (got {})",
                    max
                );
            }
            if min > max {
                anyhow::bail!(
                    "initial_range minimum ({}) must not exceed maximum ({})",
                    min,
                    max
                );
            }
        }
        if let Some(title) = &self.title {
            if title.trim().is_empty() {
                anyhow::bail!("title must not be blank");
            }
        }
        Ok(())
    }

    fn resolve(self, config_path: Option<PathBuf>) -> ResolvedOptions {
        let defaults = ResolvedOptions::default();
        ResolvedOptions {
            title: self.title.unwrap_or(defaults.title),
            initial: FilterState {
                score_range: self
                    .initial_range
                    .map(|[min, max]| (min, max))
                    .unwrap_or(FULL_RANGE),
                min_studies: self.min_studies.unwrap_or(0),
                study: None,
            },
            outcome: self.outcome,
            config_path,
        }
    }
}

/// Load a config file from the given path, validating it
pub fn load_config(path: &Path) -> Result<SrsViewConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;
    let config: SrsViewConfig = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse config file: {}", path.display()))?;
    config
        .validate()
        .with_context(|| format!("invalid config file: {}", path.display()))?;
    Ok(config)
}

/// Discover and load configuration, merging with defaults.
///
/// An explicit path must exist; the well-known filenames are optional.
pub fn load_and_resolve(root: &Path, explicit: Option<&Path>) -> Result<ResolvedOptions> {
    if let Some(path) = explicit {
        let config = load_config(path)?;
        return Ok(config.resolve(Some(path.to_path_buf())));
    }

    for name in [".srsviewrc.json", "srsview.config.json"] {
        let candidate = root.join(name);
        if candidate.is_file() {
            let config = load_config(&candidate)?;
            return Ok(config.resolve(Some(candidate)));
        }
    }

    Ok(ResolvedOptions::default())
}
