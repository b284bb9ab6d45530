//! # Pitch Classification Module
//!
//! Maps a detected frequency onto the nearest equal tempered note of the
//! reference table and reports how far off it is.
//!
//! ## Steps
//! 1. Octave normalization: fold the frequency into the table range by halving
//!    or doubling it
//! 2. Nearest match: linear scan of the table, first minimal difference wins
//! 3. Output assembly: octave, note name, signed distance in Hz and cents

use serde::Serialize;

use crate::error::{Result, TunerError};
use crate::tuning::{
    self, FREQUENCIES, MAX_FREQUENCY, MIN_FREQUENCY, NOTES_PER_OCTAVE, NoteSpelling,
};

/// Tuning information decoded from a single frame.
///
/// Built in one piece by [`classify`] and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TunerOutput {
    /// Octave of the matched note (0-8).
    pub octave: u8,
    /// Name of the matched pitch class, e.g. "A" or "C#".
    pub pitch: String,
    /// `frequency` minus the matched reference frequency, in Hz.
    ///
    /// Negative is flat, positive is sharp. For a 432 Hz input the match is
    /// A4 (440 Hz) and the distance is -8 Hz.
    pub distance: f32,
    /// Deviation of the octave-normalized frequency from the matched note, in cents.
    pub cents: f32,
    /// Amplitude of the frame, as given.
    pub amplitude: f32,
    /// The frequency that was classified, not normalized.
    ///
    /// This is the reading's own frequency, except when a session runs with
    /// `TunerConfig::classify_smoothed`: then it is the smoothed frequency, and
    /// `distance` and `cents` are measured from that value too.
    pub frequency: f32,
}

impl TunerOutput {
    /// Note name with octave, e.g. "A4".
    pub fn note(&self) -> String {
        format!("{}{}", self.pitch, self.octave)
    }
}

/// Folds a frequency into the table range by octave halving and doubling.
///
/// # Returns
/// * `Ok(normalized)` - A frequency within `[MIN_FREQUENCY, MAX_FREQUENCY]`
/// * `Err(InvalidFrequency)` - The input is zero, negative, NaN or infinite
pub fn normalize_frequency(frequency: f32) -> Result<f32> {
    if !frequency.is_finite() || frequency <= 0.0 {
        return Err(TunerError::InvalidFrequency(frequency));
    }

    let mut norm = frequency;
    while norm > MAX_FREQUENCY {
        norm /= 2.0;
    }
    while norm < MIN_FREQUENCY {
        norm *= 2.0;
    }
    Ok(norm)
}

/// Finds the table index closest to an already normalized frequency.
///
/// Ties go to the lower index.
pub fn nearest_index(normalized: f32) -> usize {
    let mut best = 0;
    let mut min_diff = f32::INFINITY;
    for (index, &reference) in FREQUENCIES.iter().enumerate() {
        let diff = (reference - normalized).abs();
        if diff < min_diff {
            min_diff = diff;
            best = index;
        }
    }
    best
}

/// Classifies a frame using sharp note names.
///
/// # Arguments
/// * `frequency` - Detected frequency in Hz
/// * `amplitude` - Amplitude of the frame, copied into the output
pub fn classify(frequency: f32, amplitude: f32) -> Result<TunerOutput> {
    classify_with(frequency, amplitude, NoteSpelling::Sharp)
}

/// Classifies a frame, naming the note with the given spelling.
pub fn classify_with(frequency: f32, amplitude: f32, spelling: NoteSpelling) -> Result<TunerOutput> {
    let normalized = normalize_frequency(frequency)?;
    let index = nearest_index(normalized);
    let reference = FREQUENCIES[index];

    Ok(TunerOutput {
        octave: (index / NOTES_PER_OCTAVE) as u8,
        pitch: spelling.name(index).to_string(),
        // Measured against the raw frequency, not the folded one.
        distance: frequency - reference,
        cents: tuning::calculate_cents_deviation(normalized, reference),
        amplitude,
        frequency,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    #[test]
    fn test_classify_a440() {
        let output = classify(440.0, 0.5).unwrap();
        assert_eq!(output.pitch, "A");
        assert_eq!(output.octave, 4);
        assert_eq!(output.distance, 0.0);
        assert_abs_diff_eq!(output.cents, 0.0);
        assert_eq!(output.frequency, 440.0);
        assert_eq!(output.amplitude, 0.5);
        assert_eq!(output.note(), "A4");
    }

    #[test]
    fn test_classify_432_is_flat_a() {
        let output = classify(432.0, 0.5).unwrap();
        assert_eq!(output.pitch, "A");
        assert_eq!(output.octave, 4);
        assert_relative_eq!(output.distance, -8.0, epsilon = 1e-4);
        assert!(output.cents < -30.0 && output.cents > -33.0);
    }

    #[test]
    fn test_flat_spelling() {
        let output = classify_with(466.2, 0.5, NoteSpelling::Flat).unwrap();
        assert_eq!(output.pitch, "Bb");
        let output = classify_with(466.2, 0.5, NoteSpelling::Sharp).unwrap();
        assert_eq!(output.pitch, "A#");
    }

    #[test]
    fn test_octave_folding_keeps_pitch_class() {
        for base in [27.5_f32, 61.74, 196.0, 440.0, 3136.0] {
            let reference = classify(base, 1.0).unwrap();
            for k in -3..=3 {
                let folded = classify(base * 2.0_f32.powi(k), 1.0).unwrap();
                assert_eq!(folded.pitch, reference.pitch, "base {base}, k {k}");
            }
        }
    }

    #[test]
    fn test_frequencies_outside_table_are_folded() {
        // Above B8
        let high = classify(14080.0, 1.0).unwrap();
        assert_eq!(high.pitch, "A");
        assert_eq!(high.octave, 8);
        assert_relative_eq!(high.distance, 14080.0 - 7040.0);

        // Below C0
        let low = classify(13.75, 1.0).unwrap();
        assert_eq!(low.pitch, "A");
        assert_eq!(low.octave, 0);
        assert_relative_eq!(low.distance, 13.75 - 27.5);
        assert_abs_diff_eq!(low.cents, 0.0, epsilon = 1e-3);
    }

    #[test]
    fn test_normalize_stays_in_range() {
        for f in [1e-6_f32, 0.5, 16.35, 100.0, 7902.0, 20000.0, f32::MAX] {
            let norm = normalize_frequency(f).unwrap();
            assert!((MIN_FREQUENCY..=MAX_FREQUENCY).contains(&norm), "{f} -> {norm}");
            let octave = nearest_index(norm) / NOTES_PER_OCTAVE;
            assert!(octave <= 8);
        }
    }

    #[test]
    fn test_invalid_frequencies_are_rejected() {
        for f in [0.0_f32, -440.0, f32::NAN, f32::INFINITY, f32::NEG_INFINITY] {
            assert!(matches!(classify(f, 1.0), Err(TunerError::InvalidFrequency(_))));
        }
    }

    #[test]
    fn test_tie_goes_to_lower_index() {
        assert_eq!(nearest_index(FREQUENCIES[0]), 0);
        assert_eq!(nearest_index(MAX_FREQUENCY), FREQUENCIES.len() - 1);

        // 113.25 is exactly 3.25 Hz from both A2 (110.0) and A#2 (116.5).
        assert_eq!(FREQUENCIES[33], 110.0);
        assert_eq!(FREQUENCIES[34], 116.5);
        assert_eq!(113.25_f32 - FREQUENCIES[33], FREQUENCIES[34] - 113.25_f32);
        assert_eq!(nearest_index(113.25), 33);
        assert_eq!(classify(113.25, 1.0).unwrap().note(), "A2");
    }
}
