//! # Needle Display Model
//!
//! Headless state for a tuning needle: a note label and a gauge value.
//! Rendering is left to the presentation layer.

use crate::pitch::TunerOutput;

/// Label shown when there is nothing to display.
pub const NO_SIGNAL_LABEL: &str = "--";

/// The gauge spans -GAUGE_RANGE..=GAUGE_RANGE (Hz of distance).
pub const GAUGE_RANGE: f32 = 50.0;

/// Outputs quieter than this are shown as no signal.
pub const MIN_DISPLAY_AMPLITUDE: f32 = 0.01;

/// What the needle view should show for the latest output.
#[derive(Debug, Clone, PartialEq)]
pub struct NeedleDisplay {
    /// Note with octave ("A4"), or [`NO_SIGNAL_LABEL`].
    pub label: String,
    /// Needle position, clamped to the gauge range.
    pub value: f32,
}

impl NeedleDisplay {
    /// Neutral state: no label, needle centered.
    pub fn no_signal() -> Self {
        Self {
            label: NO_SIGNAL_LABEL.to_string(),
            value: 0.0,
        }
    }

    /// Builds the display state for the latest output, if any.
    pub fn from_output(output: Option<&TunerOutput>) -> Self {
        match output {
            Some(output) if output.amplitude >= MIN_DISPLAY_AMPLITUDE => Self {
                label: output.note(),
                value: output.distance.clamp(-GAUGE_RANGE, GAUGE_RANGE),
            },
            _ => Self::no_signal(),
        }
    }

    /// `false` for the neutral state, even though its value is 0.0 like an
    /// in-tune reading.
    pub fn is_signal(&self) -> bool {
        self.label != NO_SIGNAL_LABEL
    }
}

impl Default for NeedleDisplay {
    fn default() -> Self {
        Self::no_signal()
    }
}
