//! # Tuner Configuration
//!
//! Construction-time settings for a [`Tuner`](crate::session::Tuner). They can
//! be built in code or loaded from a JSON file, and are fixed once the tuner
//! has been created.

use anyhow::{Context, Result as AnyResult};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use crate::error::{Result, TunerError};
use crate::smoothing::DEFAULT_HISTORY_CAPACITY;
use crate::tuning::NoteSpelling;

/// Default exponential smoothing factor.
pub const DEFAULT_SMOOTHING: f32 = 0.25;

/// Settings for a tuning session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TunerConfig {
    /// Minimum amplitude to recognize, 0 <= threshold <= 1.
    /// Frames at or below it are dropped.
    pub threshold: f32,
    /// Exponential smoothing factor, 0 < smoothing <= 1.
    pub smoothing: f32,
    /// Number of smoothed values kept.
    pub history_capacity: usize,
    /// Classify the smoothed frequency instead of the raw reading.
    pub classify_smoothed: bool,
    /// Spelling used for `TunerOutput::pitch`.
    pub spelling: NoteSpelling,
}

impl Default for TunerConfig {
    fn default() -> Self {
        Self {
            threshold: 0.0,
            smoothing: DEFAULT_SMOOTHING,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            classify_smoothed: false,
            spelling: NoteSpelling::Sharp,
        }
    }
}

impl TunerConfig {
    /// Returns a copy with threshold and smoothing brought into range.
    ///
    /// Both are mapped through `min(abs(x), 1.0)`. Values that cannot be
    /// mapped (NaN, infinity, a smoothing factor of zero, an empty history)
    /// are rejected.
    pub fn normalized(&self) -> Result<Self> {
        if !self.threshold.is_finite() {
            return Err(TunerError::InvalidConfig(format!(
                "threshold must be finite, got {}",
                self.threshold
            )));
        }
        if !self.smoothing.is_finite() {
            return Err(TunerError::InvalidConfig(format!(
                "smoothing must be finite, got {}",
                self.smoothing
            )));
        }

        let threshold = self.threshold.abs().min(1.0);
        let smoothing = self.smoothing.abs().min(1.0);

        if smoothing == 0.0 {
            return Err(TunerError::InvalidConfig(
                "smoothing must be greater than zero".to_string(),
            ));
        }
        if self.history_capacity == 0 {
            return Err(TunerError::InvalidConfig(
                "history_capacity must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            threshold,
            smoothing,
            ..self.clone()
        })
    }

    /// Loads a config from a JSON file. Missing fields take their defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> AnyResult<Self> {
        let path = path.as_ref();
        let mut file = File::open(path)
            .with_context(|| format!("opening tuner config {}", path.display()))?;
        let mut data = String::new();
        file.read_to_string(&mut data)?;
        let config = serde_json::from_str(&data)
            .with_context(|| format!("parsing tuner config {}", path.display()))?;
        Ok(config)
    }

    /// Saves the config to a JSON file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> AnyResult<()> {
        let path = path.as_ref();
        let json_string = serde_json::to_string_pretty(self)?;
        let mut file = File::create(path)
            .with_context(|| format!("creating tuner config {}", path.display()))?;
        file.write_all(json_string.as_bytes())?;
        Ok(())
    }
}
