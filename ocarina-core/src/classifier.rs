//! # Note Classification Module
//!
//! Maps a pair of consecutive frequency readings onto a note symbol.
//!
//! A note is only reported once the reading has been stable for two frames,
//! and only when it differs from the most recent note in the history, so a
//! sustained note produces exactly one symbol rather than one per frame.

use crate::fft::FrequencyTrack;
use crate::notes::{self, FrequencyRange, Note, NoteBand};
use tracing::{debug, warn};

/// Outcome of classifying one pair of readings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// A new note was played.
    Played(Note),
    /// The readings are out of range or still moving.
    Unstable,
    /// Stable, but either between bands or the note already in the history.
    Held,
    /// Stable and unmatched while the history ends in a symbol no band knows.
    Invalid,
}

impl Verdict {
    pub fn played(self) -> Option<Note> {
        match self {
            Verdict::Played(note) => Some(note),
            _ => None,
        }
    }
}

/// Classifies frequency readings against a prioritised band table.
#[derive(Debug, Clone)]
pub struct NoteClassifier {
    bands: Vec<NoteBand>,
    gate: FrequencyRange,
    tolerance: f32,
}

impl Default for NoteClassifier {
    fn default() -> Self {
        Self::new(
            notes::BANDS.clone(),
            notes::GATE,
            notes::STABILITY_TOLERANCE,
        )
    }
}

impl NoteClassifier {
    /// Creates a classifier. `bands` are checked in the order given.
    pub fn new(bands: Vec<NoteBand>, gate: FrequencyRange, tolerance: f32) -> Self {
        Self {
            bands,
            gate,
            tolerance,
        }
    }

    pub fn bands(&self) -> &[NoteBand] {
        &self.bands
    }

    /// Returns the note played, if the readings confirm a new one.
    pub fn classify(&self, current: f32, previous: f32, last: Note) -> Option<Note> {
        self.assess(current, previous, last).played()
    }

    /// Convenience wrapper over [`classify`](Self::classify) for a [`FrequencyTrack`].
    pub fn classify_track(&self, track: &FrequencyTrack, last: Note) -> Option<Note> {
        self.classify(track.current, track.previous, last)
    }

    /// Classifies the readings and says why nothing was played, if nothing was.
    ///
    /// # Arguments
    /// * `current` - This frame's frequency in Hz
    /// * `previous` - The previous frame's frequency in Hz
    /// * `last` - The newest note in the history
    pub fn assess(&self, current: f32, previous: f32, last: Note) -> Verdict {
        // Cheap range check first; a moving reading is a transition or noise.
        if !self.gate.contains(previous) || !((current - previous).abs() <= self.tolerance) {
            return Verdict::Unstable;
        }

        let hit = self.bands.iter().find(|band| {
            band.range.contains(current) && band.range.contains(previous) && band.note != last
        });
        if let Some(band) = hit {
            return Verdict::Played(band.note);
        }

        if !self.bands.iter().any(|band| band.note == last) {
            warn!(%last, current, previous, "Invalid note");
            return Verdict::Invalid;
        }

        debug!(%last, current, "no new note");
        Verdict::Held
    }
}
