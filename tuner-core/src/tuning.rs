//! # Musical Tuning Module
//!
//! This module holds the equal temperament reference table used by the tuner.
//! It covers the 12 pitch classes across 9 octaves (C0 to B8) and provides
//! note name conversions and cent deviation measurements against it.
//!
//! ## Layout
//! - Index `i` of [`FREQUENCIES`] is pitch class `i % 12` in octave `i / 12`
//! - Two spellings for every pitch class: sharp based and flat based
//! - The table is plain constant data and can be shared freely across threads

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Number of pitch classes in one octave.
pub const NOTES_PER_OCTAVE: usize = 12;

/// Number of octaves covered by [`FREQUENCIES`].
pub const OCTAVES: usize = 9;

/// Reference frequencies in Hz, C0 through B8, strictly ascending.
pub const FREQUENCIES: [f32; NOTES_PER_OCTAVE * OCTAVES] = [
    16.35, 17.32, 18.35, 19.45, 20.60, 21.83, 23.12, 24.50, 25.96, 27.50, 29.14, 30.87, // 0
    32.70, 34.65, 36.71, 38.89, 41.20, 43.65, 46.25, 49.00, 51.91, 55.00, 58.27, 61.74, // 1
    65.41, 69.30, 73.42, 77.78, 82.41, 87.31, 92.50, 98.00, 103.8, 110.0, 116.5, 123.5, // 2
    130.8, 138.6, 146.8, 155.6, 164.8, 174.6, 185.0, 196.0, 207.7, 220.0, 233.1, 246.9, // 3
    261.6, 277.2, 293.7, 311.1, 329.6, 349.2, 370.0, 392.0, 415.3, 440.0, 466.2, 493.9, // 4
    523.3, 554.4, 587.3, 622.3, 659.3, 698.5, 740.0, 784.0, 830.6, 880.0, 932.3, 987.8, // 5
    1047.0, 1109.0, 1175.0, 1245.0, 1319.0, 1397.0, 1480.0, 1568.0, 1661.0, 1760.0, 1865.0, 1976.0, // 6
    2093.0, 2217.0, 2349.0, 2489.0, 2637.0, 2794.0, 2960.0, 3136.0, 3322.0, 3520.0, 3729.0, 3951.0, // 7
    4186.0, 4435.0, 4699.0, 4978.0, 5274.0, 5588.0, 5920.0, 6272.0, 6645.0, 7040.0, 7459.0, 7902.0, // 8
];

/// Lowest frequency in the table (C0).
pub const MIN_FREQUENCY: f32 = FREQUENCIES[0];

/// Highest frequency in the table (B8).
pub const MAX_FREQUENCY: f32 = FREQUENCIES[FREQUENCIES.len() - 1];

/// Sharp based pitch class names.
///
/// ASCII `#` is used instead of the `♯` sign, so names are easy to type and
/// to look up with [`find_index_by_name`].
pub const SHARP_NAMES: [&str; NOTES_PER_OCTAVE] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Flat based pitch class names.
///
/// ASCII `b` is used instead of the `♭` sign.
pub const FLAT_NAMES: [&str; NOTES_PER_OCTAVE] = [
    "C", "Db", "D", "Eb", "E", "F", "Gb", "G", "Ab", "A", "Bb", "B",
];

/// Spelling convention used when naming a pitch class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteSpelling {
    /// C, C#, D, D#, ...
    #[default]
    Sharp,
    /// C, Db, D, Eb, ...
    Flat,
}

impl NoteSpelling {
    /// Returns the pitch class name for a table index under this spelling.
    pub fn name(self, index: usize) -> &'static str {
        let names = match self {
            NoteSpelling::Sharp => &SHARP_NAMES,
            NoteSpelling::Flat => &FLAT_NAMES,
        };
        names[index % NOTES_PER_OCTAVE]
    }
}

/// Static map for note name to table index lookups.
///
/// Both spellings are present, so "C#4" and "Db4" resolve to the same index.
static NOTE_MAP: Lazy<BTreeMap<String, usize>> = Lazy::new(|| {
    let mut map = BTreeMap::new();
    for index in 0..FREQUENCIES.len() {
        let octave = index / NOTES_PER_OCTAVE;
        for spelling in [NoteSpelling::Sharp, NoteSpelling::Flat] {
            map.insert(format!("{}{}", spelling.name(index), octave), index);
        }
    }
    map
});

/// Returns the reference frequency of a table index.
pub fn note_frequency(index: usize) -> Option<f32> {
    FREQUENCIES.get(index).copied()
}

/// Returns the full note name (e.g. "A4", "Bb2") of a table index.
pub fn note_name(index: usize, spelling: NoteSpelling) -> Option<String> {
    if index >= FREQUENCIES.len() {
        return None;
    }
    Some(format!("{}{}", spelling.name(index), index / NOTES_PER_OCTAVE))
}

/// Gets the table index from a note name.
///
/// # Arguments
/// * `name` - Note name in either spelling (e.g. "A4", "C#3", "Bb2")
///
/// # Returns
/// * `Some(index)` - Table index (0-107)
/// * `None` - The name is not in the table
pub fn find_index_by_name(name: &str) -> Option<usize> {
    NOTE_MAP.get(name).copied()
}

/// Calculates the deviation from a target frequency in cents.
///
/// Cents are a logarithmic unit of pitch measurement where:
/// - 100 cents = 1 semitone
/// - 1200 cents = 1 octave
/// - Positive values indicate sharpness, negative values indicate flatness
pub fn calculate_cents_deviation(freq: f32, target_freq: f32) -> f32 {
    1200.0 * (freq / target_freq).log2()
}
