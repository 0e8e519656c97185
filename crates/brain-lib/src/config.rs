use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Parameters of the rPPG pulse pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PulseConfig {
    /// Retention window of the green-channel buffer (ms).
    pub window_ms: f64,
    /// Samples required before any filtering is attempted.
    pub min_samples: usize,
    /// Half-width K of the moving-average smoother (window is 2K + 1).
    pub smoothing_half_window: usize,
    /// Peak threshold used on the first pass.
    pub primary_threshold: f64,
    /// Lower threshold used when the first pass finds fewer than two peaks.
    pub fallback_threshold: f64,
    /// Lowest rate reported (bpm, inclusive).
    pub min_bpm: f64,
    /// Highest rate reported (bpm, inclusive).
    pub max_bpm: f64,
}

impl Default for PulseConfig {
    fn default() -> Self {
        Self {
            window_ms: 12_000.0,
            min_samples: 30,
            smoothing_half_window: 2,
            primary_threshold: 0.6,
            fallback_threshold: 0.2,
            min_bpm: 35.0,
            max_bpm: 200.0,
        }
    }
}

/// Parameters of the blink edge detector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlinkConfig {
    /// Eye-openness ratio below which the eye counts as closed.
    pub threshold: f64,
    /// Refractory interval between two recorded blinks (ms).
    pub debounce_ms: f64,
    /// Trailing window the blink rate is counted over (ms).
    pub window_ms: f64,
}

impl Default for BlinkConfig {
    fn default() -> Self {
        Self {
            threshold: 0.18,
            debounce_ms: 250.0,
            window_ms: 60_000.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub pulse: PulseConfig,
    pub blink: BlinkConfig,
}

impl AnalyzerConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let cfg: AnalyzerConfig = toml::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.pulse;
        let b = &self.blink;
        for (name, value) in [
            ("pulse.window_ms", p.window_ms),
            ("pulse.primary_threshold", p.primary_threshold),
            ("pulse.fallback_threshold", p.fallback_threshold),
            ("pulse.min_bpm", p.min_bpm),
            ("pulse.max_bpm", p.max_bpm),
            ("blink.threshold", b.threshold),
            ("blink.debounce_ms", b.debounce_ms),
            ("blink.window_ms", b.window_ms),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::Invalid(format!("{} must be finite", name)));
            }
        }

        if p.window_ms <= 0.0 {
            return Err(ConfigError::Invalid("pulse.window_ms must be positive".into()));
        }
        if p.min_samples < 3 {
            return Err(ConfigError::Invalid(
                "pulse.min_samples must be at least 3".into(),
            ));
        }
        if p.fallback_threshold <= 0.0 || p.fallback_threshold >= p.primary_threshold {
            return Err(ConfigError::Invalid(format!(
                "pulse thresholds need 0 < fallback ({}) < primary ({})",
                p.fallback_threshold, p.primary_threshold
            )));
        }
        if p.min_bpm <= 0.0 || p.min_bpm >= p.max_bpm {
            return Err(ConfigError::Invalid(format!(
                "pulse bpm range [{}, {}] is empty",
                p.min_bpm, p.max_bpm
            )));
        }
        if b.threshold <= 0.0 {
            return Err(ConfigError::Invalid("blink.threshold must be positive".into()));
        }
        if b.window_ms <= 0.0 {
            return Err(ConfigError::Invalid("blink.window_ms must be positive".into()));
        }
        if b.debounce_ms < 0.0 {
            return Err(ConfigError::Invalid(
                "blink.debounce_ms must not be negative".into(),
            ));
        }
        Ok(())
    }
}
