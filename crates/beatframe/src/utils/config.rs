//! Configuration file management.
//!
//! Handles loading user preferences from `~/.beatframe.toml`.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use crate::analysis::spectrum::MAX_BUCKETS;
use crate::analysis::LevelMode;

const DEFAULT_DELTA_WINDOW_MS: f64 = 50.0;
const DEFAULT_AVG_WINDOW_MS: f64 = 150.0;
const DEFAULT_GAIN: f32 = 1.0;
const DEFAULT_SPECTRUM_COVERAGE: f64 = 0.65;
const DEFAULT_TICK_INTERVAL_MS: u64 = 16;

const CONFIG_TEMPLATE: &str = r#"# beatframe configuration file

# =============================================================================
# Analysis
# =============================================================================

# Age (ms) of the reference frame used for delta (default: 50)
# delta_window_ms = 50

# Averaging window (ms) for avg and trend (default: 150)
# avg_window_ms = 150

# Multiplier applied to normalized levels; > 1 boosts sensitivity (default: 1)
# gain = 1.0

# Number of spectrum buckets, 0-128 (default: 0 = disabled)
# spectrum_bins = 0

# Fraction of the magnitude array covered by the buckets (default: 0.65)
# spectrum_coverage = 0.65

# =============================================================================
# Driver
# =============================================================================

# Tick period in ms for --simulate (default: 16)
# tick_interval_ms = 16

# Waveform level reduction: "peak", "rms" or "average" (default: "peak")
# level_mode = "peak"
"#;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Engine construction parameters. Unset or out-of-range values fall back to
/// the defaults through the accessors.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct AnalysisConfig {
    pub delta_window_ms: Option<f64>,
    pub avg_window_ms: Option<f64>,
    pub gain: Option<f32>,
    pub spectrum_bins: Option<usize>,
    pub spectrum_coverage: Option<f64>,
}

impl AnalysisConfig {
    pub fn delta_window_ms(&self) -> f64 {
        positive_or(self.delta_window_ms, DEFAULT_DELTA_WINDOW_MS)
    }
    pub fn avg_window_ms(&self) -> f64 {
        positive_or(self.avg_window_ms, DEFAULT_AVG_WINDOW_MS)
    }
    /// Oldest age a frame may reach before it is evicted
    pub fn max_window_ms(&self) -> f64 {
        self.delta_window_ms().max(self.avg_window_ms())
    }
    pub fn gain(&self) -> f32 {
        match self.gain {
            Some(gain) if gain.is_finite() && gain > 0.0 => gain,
            _ => DEFAULT_GAIN,
        }
    }

    // Spectrum (disabled unless spectrum_bins > 0)
    pub fn spectrum_bins(&self) -> usize {
        self.spectrum_bins.unwrap_or(0).min(MAX_BUCKETS)
    }
    pub fn spectrum_coverage(&self) -> f64 {
        match self.spectrum_coverage {
            Some(coverage) if coverage.is_finite() => coverage.clamp(0.0, 1.0),
            _ => DEFAULT_SPECTRUM_COVERAGE,
        }
    }
}

fn positive_or(value: Option<f64>, default: f64) -> f64 {
    match value {
        Some(v) if v.is_finite() && v > 0.0 => v,
        _ => default,
    }
}

#[derive(Serialize, Deserialize, Default, Debug, PartialEq)]
pub struct Config {
    // Analysis (flattened for simpler TOML)
    pub delta_window_ms: Option<f64>,
    pub avg_window_ms: Option<f64>,
    pub gain: Option<f32>,
    pub spectrum_bins: Option<usize>,
    pub spectrum_coverage: Option<f64>,

    // Driver
    pub tick_interval_ms: Option<u64>,
    pub level_mode: Option<LevelMode>,
}

impl Config {
    fn path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".beatframe.toml"))
    }

    /// Load `~/.beatframe.toml`, writing a commented template on first run.
    /// Falls back to defaults if the file is missing or invalid.
    pub fn load() -> Self {
        let path = match Self::path() {
            Some(p) => p,
            None => return Self::default(),
        };

        if !path.exists() {
            match fs::write(&path, CONFIG_TEMPLATE) {
                Ok(()) => info!("Created config template at {:?}", path),
                Err(e) => warn!("Could not write config template to {:?}: {}", path, e),
            }
        }

        Self::load_from(&path).unwrap_or_else(|e| {
            warn!("{}, using defaults", e);
            Self::default()
        })
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Get analysis configuration (defaults applied by its accessors)
    pub fn analysis(&self) -> AnalysisConfig {
        AnalysisConfig {
            delta_window_ms: self.delta_window_ms,
            avg_window_ms: self.avg_window_ms,
            gain: self.gain,
            spectrum_bins: self.spectrum_bins,
            spectrum_coverage: self.spectrum_coverage,
        }
    }

    pub fn tick_interval_ms(&self) -> u64 {
        match self.tick_interval_ms {
            Some(ms) if ms > 0 => ms,
            _ => DEFAULT_TICK_INTERVAL_MS,
        }
    }

    pub fn level_mode(&self) -> LevelMode {
        self.level_mode.unwrap_or_default()
    }
}
