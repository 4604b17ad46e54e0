//! # Song Recognition Module
//!
//! The table of known songs and the matcher that compares the note history
//! against it.

use crate::history::NoteHistory;
use crate::notes::Note;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tracing::info;

/// A fixed note sequence that triggers an event when played.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Song {
    /// Identifier published to the notifiers.
    pub id: u8,
    /// Human-readable name.
    pub label: String,
    pub notes: Vec<Note>,
}

impl Song {
    pub fn new(id: u8, label: &str, notes: &[Note]) -> Self {
        Self {
            id,
            label: label.to_string(),
            notes: notes.to_vec(),
        }
    }
}

/// Emitted when the history matches a song.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SongEvent {
    pub song_id: u8,
    pub label: String,
}

impl From<&Song> for SongEvent {
    fn from(song: &Song) -> Self {
        Self {
            song_id: song.id,
            label: song.label.clone(),
        }
    }
}

/// The built-in song table.
pub static SONGS: Lazy<Vec<Song>> = Lazy::new(|| {
    use crate::notes::Note::*;
    vec![
        Song::new(1, "Sun's Song", &[A, E, D5, A, E, D5]),
        Song::new(2, "Song of Time", &[A, D4, E, A, D4, E]),
        Song::new(3, "Bolero of Fire", &[E, D4, E, D4, A, E]),
        Song::new(4, "Song of Storms", &[D4, E, D5, D4, E, D5]),
        Song::new(5, "Saria's Song", &[E, A, B, E, A, B]),
    ]
});

/// Compares the note history with every known song.
#[derive(Debug, Clone)]
pub struct SongMatcher {
    songs: Vec<Song>,
}

impl Default for SongMatcher {
    fn default() -> Self {
        Self::new(SONGS.clone())
    }
}

impl SongMatcher {
    pub fn new(songs: Vec<Song>) -> Self {
        Self { songs }
    }

    pub fn songs(&self) -> &[Song] {
        &self.songs
    }

    /// Returns the first song, in table order, whose notes equal the window.
    ///
    /// On a match the caller must push the filler note into `history` before
    /// the next frame, or the same song matches again on every frame.
    pub fn try_match(&self, history: &NoteHistory) -> Option<SongEvent> {
        let song = self.songs.iter().find(|song| history.matches(&song.notes))?;
        info!(song_id = song.id, "{}!", song.label);
        Some(SongEvent::from(song))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notes::FILLER;
    use crate::notes::Note::*;

    fn history_of(notes: &[Note]) -> NoteHistory {
        let mut history = NoteHistory::new(notes.len(), FILLER);
        for &note in notes {
            history.push(note);
        }
        history
    }

    #[test]
    fn sun_window_matches_sun() {
        let matcher = SongMatcher::default();
        let history = history_of(&[A, E, D5, A, E, D5]);
        let event = matcher.try_match(&history).unwrap();
        assert_eq!(event.song_id, 1);
        assert_eq!(event.label, "Sun's Song");
    }

    #[test]
    fn filler_push_breaks_the_match() {
        let matcher = SongMatcher::default();
        let mut history = history_of(&[A, E, D5, A, E, D5]);
        assert!(matcher.try_match(&history).is_some());
        history.push(FILLER);
        assert_eq!(history.snapshot(), vec![E, D5, A, E, D5, G]);
        assert_eq!(matcher.try_match(&history), None);
    }

    #[test]
    fn initial_history_matches_nothing() {
        let matcher = SongMatcher::default();
        assert_eq!(matcher.try_match(&NoteHistory::new(6, FILLER)), None);
    }

    #[test]
    fn each_song_matches_exactly_once_on_its_last_note() {
        let matcher = SongMatcher::default();
        for song in SONGS.iter() {
            let mut history = NoteHistory::new(6, FILLER);
            let mut matched_at = Vec::new();
            for (i, &note) in song.notes.iter().enumerate() {
                assert_ne!(note, history.last(), "{} repeats a note", song.label);
                history.push(note);
                if let Some(event) = matcher.try_match(&history) {
                    assert_eq!(event.song_id, song.id);
                    matched_at.push(i + 1);
                }
            }
            assert_eq!(matched_at, vec![6], "{}", song.label);
        }
    }

    #[test]
    fn first_song_in_table_order_wins() {
        let matcher = SongMatcher::new(vec![
            Song::new(7, "first", &[A, B]),
            Song::new(8, "second", &[A, B]),
        ]);
        let event = matcher.try_match(&history_of(&[A, B])).unwrap();
        assert_eq!(event.song_id, 7);
    }

    #[test]
    fn rotated_window_does_not_match() {
        let matcher = SongMatcher::default();
        assert_eq!(matcher.try_match(&history_of(&[E, D5, A, E, D5, A])), None);
    }
}
