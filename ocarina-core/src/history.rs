//! # Note History Module
//!
//! The sliding window of recently played notes that songs are matched
//! against.

use crate::notes::Note;
use std::collections::VecDeque;

/// Sliding window over the most recently played notes.
///
/// The window is created full (every slot holding the filler note) and stays
/// full: each push evicts the oldest entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteHistory {
    notes: VecDeque<Note>,
    capacity: usize,
}

impl NoteHistory {
    /// Creates a window of `capacity` slots, all set to `filler`.
    ///
    /// # Panics
    /// * If `capacity` is zero
    pub fn new(capacity: usize, filler: Note) -> Self {
        assert!(capacity > 0, "history capacity must be positive");
        Self {
            notes: std::iter::repeat_n(filler, capacity).collect(),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Appends `note`, dropping the oldest entry.
    pub fn push(&mut self, note: Note) {
        if self.notes.len() == self.capacity {
            self.notes.pop_front();
        }
        self.notes.push_back(note);
    }

    /// The newest note in the window.
    pub fn last(&self) -> Note {
        // The window is never empty.
        self.notes[self.capacity - 1]
    }

    /// The window contents, oldest first.
    pub fn snapshot(&self) -> Vec<Note> {
        self.notes.iter().copied().collect()
    }

    /// Element-wise, order-sensitive comparison with `pattern`.
    pub fn matches(&self, pattern: &[Note]) -> bool {
        self.notes.iter().eq(pattern.iter())
    }
}
