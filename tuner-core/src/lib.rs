// tuner-core/src/lib.rs

//! The core logic for the tuner.
//! This crate turns (frequency, amplitude) readings from an external pitch
//! detector into note names, octaves and distances from the nearest equal
//! tempered pitch. It is completely headless: audio capture, pitch detection
//! and rendering live elsewhere.

pub mod config;
pub mod display;
pub mod error;
pub mod pitch;
pub mod session;
pub mod smoothing;
pub mod tuning;
pub mod worker;

use serde::{Deserialize, Serialize};

pub use config::TunerConfig;
pub use display::NeedleDisplay;
pub use error::{Result, TunerError};
pub use pitch::{TunerOutput, classify, classify_with};
pub use session::Tuner;
pub use smoothing::Smoother;
pub use tuning::NoteSpelling;
pub use worker::TunerWorker;

/// One analysis frame from the pitch detector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TunerReading {
    /// The dominant frequency in Hz.
    pub frequency: f32,
    /// The amplitude of the frame (unitless).
    pub amplitude: f32,
}

impl TunerReading {
    pub fn new(frequency: f32, amplitude: f32) -> Self {
        Self {
            frequency,
            amplitude,
        }
    }
}
