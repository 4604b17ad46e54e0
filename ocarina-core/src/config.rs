//! # Listener Configuration Module
//!
//! The static settings the pipeline is built from: capture format, gate,
//! tolerance, note bands and the song table. Read once at startup.

use crate::error::ConfigError;
use crate::notes::{self, FrequencyRange, Note, NoteBand};
use crate::songs::{self, Song};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Static settings for the listener pipeline, read once at startup.
///
/// Every field falls back to the built-in value when omitted, so an empty
/// JSON object is a complete configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Capture rate in Hz.
    pub sample_rate: u32,
    /// Samples per analysed frame.
    pub frame_size: usize,
    /// Largest change in Hz between two readings of a held note.
    pub stability_tolerance: f32,
    /// Fast-rejection range for the previous reading.
    pub gate: FrequencyRange,
    /// Note bands in priority order.
    pub bands: Vec<NoteBand>,
    pub songs: Vec<Song>,
    /// Note seeded into the history and pushed after every match.
    pub filler: Note,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48_000,
            frame_size: 2048,
            stability_tolerance: notes::STABILITY_TOLERANCE,
            gate: notes::GATE,
            bands: notes::BANDS.clone(),
            songs: songs::SONGS.clone(),
            filler: notes::FILLER,
        }
    }
}

impl ListenerConfig {
    /// History capacity: the length of the longest song.
    pub fn history_capacity(&self) -> usize {
        self.songs.iter().map(|s| s.notes.len()).max().unwrap_or(0)
    }

    /// Checks the settings for values the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_rate == 0 {
            return Err(ConfigError::SampleRate);
        }
        if self.frame_size < 4 || self.frame_size % 2 != 0 {
            return Err(ConfigError::FrameSize(self.frame_size));
        }
        if self.gate.min > self.gate.max {
            return Err(ConfigError::InvertedGate {
                min: self.gate.min,
                max: self.gate.max,
            });
        }
        if !self.stability_tolerance.is_finite() || self.stability_tolerance < 0.0 {
            return Err(ConfigError::Tolerance(self.stability_tolerance));
        }
        if let Some(band) = self.bands.iter().find(|b| b.range.min > b.range.max) {
            return Err(ConfigError::InvertedBand {
                note: band.note.to_string(),
                min: band.range.min,
                max: band.range.max,
            });
        }

        let capacity = self.history_capacity();
        if capacity == 0 {
            return Err(ConfigError::NoSongs);
        }
        let mut seen = HashSet::new();
        for song in &self.songs {
            if song.notes.len() != capacity {
                return Err(ConfigError::SongLength {
                    id: song.id,
                    expected: capacity,
                    got: song.notes.len(),
                });
            }
            if !seen.insert(song.id) {
                return Err(ConfigError::DuplicateSong(song.id));
            }
        }
        Ok(())
    }
}
