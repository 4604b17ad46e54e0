//! # Note Table Module
//!
//! The seven-note alphabet the listener understands and the frequency bands
//! that map a measured frequency onto it.
//!
//! The band centres were measured from the reference instrument (record a
//! held note, then read the spectrum peak) rather than taken from equal
//! temperament, so they sit a little off the textbook pitches. Each band has
//! its own slack around the centre; the lowest note gets a wider lower
//! margin and A a wider upper one.
//!
//! ## Priority
//! The order of [`BANDS`] is the classification priority: when a reading
//! falls inside more than one band, the earlier band wins.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A note symbol of the listener's alphabet, lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Note {
    D4,
    E,
    F,
    G,
    A,
    B,
    D5,
}

impl Note {
    /// Every symbol, in pitch order.
    pub const ALL: [Note; 7] = [
        Note::D4,
        Note::E,
        Note::F,
        Note::G,
        Note::A,
        Note::B,
        Note::D5,
    ];

    /// The symbol's name as it appears in logs and configuration.
    pub fn name(self) -> &'static str {
        match self {
            Note::D4 => "D4",
            Note::E => "E",
            Note::F => "F",
            Note::G => "G",
            Note::A => "A",
            Note::B => "B",
            Note::D5 => "D5",
        }
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An inclusive frequency range in Hz.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrequencyRange {
    pub min: f32,
    pub max: f32,
}

impl FrequencyRange {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Builds a range around `center` with independent lower and upper slack.
    pub const fn around(center: f32, below: f32, above: f32) -> Self {
        Self {
            min: center - below,
            max: center + above,
        }
    }

    /// Returns true if `freq` lies within `[min, max]`.
    ///
    /// NaN is never contained.
    pub fn contains(&self, freq: f32) -> bool {
        self.min <= freq && freq <= self.max
    }
}

/// A band of frequencies accepted as one note.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoteBand {
    pub note: Note,
    #[serde(flatten)]
    pub range: FrequencyRange,
}

impl NoteBand {
    pub const fn new(note: Note, range: FrequencyRange) -> Self {
        Self { note, range }
    }
}

// Measured peak frequencies of the reference instrument, in Hz.
const D4_HZ: f32 = 586.0;
const E_HZ: f32 = 685.0;
const F_HZ: f32 = 752.0;
const G_HZ: f32 = 806.0;
const A_HZ: f32 = 882.0;
const B_HZ: f32 = 994.0;
const D5_HZ: f32 = 1178.0;

/// Default slack on either side of a note centre.
pub const BANDWIDTH: f32 = 25.0;

/// Maximum change between two consecutive readings for a note to count as held.
pub const STABILITY_TOLERANCE: f32 = 25.0;

/// The fast-rejection range for the previous reading.
///
/// Hand tuned and deliberately looser than the union of [`BANDS`]; kept as a
/// literal rather than derived from the table.
pub const GATE: FrequencyRange = FrequencyRange::new(D4_HZ - 50.0, D5_HZ + BANDWIDTH);

/// The note pushed into the history at startup and after every recognised song.
pub const FILLER: Note = Note::G;

/// Default note bands, in classification priority order.
pub static BANDS: Lazy<Vec<NoteBand>> = Lazy::new(|| {
    vec![
        NoteBand::new(Note::A, FrequencyRange::around(A_HZ, BANDWIDTH, 55.0)),
        NoteBand::new(Note::F, FrequencyRange::around(F_HZ, 40.0, BANDWIDTH)),
        NoteBand::new(Note::D4, FrequencyRange::around(D4_HZ, 50.0, BANDWIDTH)),
        NoteBand::new(Note::D5, FrequencyRange::around(D5_HZ, BANDWIDTH, BANDWIDTH)),
        NoteBand::new(Note::B, FrequencyRange::around(B_HZ, BANDWIDTH, BANDWIDTH)),
        NoteBand::new(Note::E, FrequencyRange::around(E_HZ, BANDWIDTH, BANDWIDTH)),
        NoteBand::new(Note::G, FrequencyRange::around(G_HZ, BANDWIDTH, BANDWIDTH)),
    ]
});

/// Returns the tuned centre frequency of `note`.
pub fn center_frequency(note: Note) -> f32 {
    match note {
        Note::D4 => D4_HZ,
        Note::E => E_HZ,
        Note::F => F_HZ,
        Note::G => G_HZ,
        Note::A => A_HZ,
        Note::B => B_HZ,
        Note::D5 => D5_HZ,
    }
}
