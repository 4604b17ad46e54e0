//! # Listener Module
//!
//! Runs the frame-by-frame pipeline: estimate the frequency, classify it
//! against the previous reading, record new notes, and check the history for
//! a finished song.
//!
//! The listener owns all mutable state. Collaborators (audio source,
//! dispatcher) are passed in, so the whole pipeline can be driven with
//! synthetic frames.

use crate::audio::AudioSource;
use crate::classifier::{NoteClassifier, Verdict};
use crate::config::ListenerConfig;
use crate::dispatch::Dispatcher;
use crate::error::{CaptureError, EstimateError};
use crate::fft::{FrequencyEstimator, FrequencyTrack};
use crate::history::NoteHistory;
use crate::notes::Note;
use crate::songs::{SongEvent, SongMatcher};
use tracing::{debug, info, warn};

pub struct Listener {
    estimator: FrequencyEstimator,
    classifier: NoteClassifier,
    matcher: SongMatcher,
    track: FrequencyTrack,
    history: NoteHistory,
    filler: Note,
}

impl Default for Listener {
    fn default() -> Self {
        Self::new(&ListenerConfig::default())
    }
}

impl Listener {
    /// Builds a listener from a validated configuration.
    ///
    /// # Panics
    /// * If `config` has no songs; see [`ListenerConfig::validate`]
    pub fn new(config: &ListenerConfig) -> Self {
        Self {
            estimator: FrequencyEstimator::new(config.sample_rate, config.frame_size),
            classifier: NoteClassifier::new(
                config.bands.clone(),
                config.gate,
                config.stability_tolerance,
            ),
            matcher: SongMatcher::new(config.songs.clone()),
            track: FrequencyTrack::default(),
            history: NoteHistory::new(config.history_capacity(), config.filler),
            filler: config.filler,
        }
    }

    pub fn history(&self) -> &NoteHistory {
        &self.history
    }

    pub fn track(&self) -> FrequencyTrack {
        self.track
    }

    /// Runs one iteration of the pipeline on `frame`.
    ///
    /// # Returns
    /// * `Ok(Some(event))` - The frame completed a song
    /// * `Ok(None)` - Nothing to report
    /// * `Err(e)` - The frame has the wrong length; no state was changed
    pub fn process_frame(&mut self, frame: &[i16]) -> Result<Option<SongEvent>, EstimateError> {
        let reading = self.estimator.estimate(frame)?;
        self.track.advance(reading);

        let verdict = self.classifier.assess(
            self.track.current,
            self.track.previous,
            self.history.last(),
        );
        debug!(
            current = self.track.current,
            previous = self.track.previous,
            ?verdict,
            "frame classified"
        );

        let Verdict::Played(note) = verdict else {
            return Ok(None);
        };
        info!("You played {}!", note);
        self.history.push(note);

        let event = self.matcher.try_match(&self.history);
        if event.is_some() {
            // Break the window so the same song does not fire on the next frame.
            self.history.push(self.filler);
        }
        Ok(event)
    }

    /// Listens until the audio source fails, dispatching every recognised song.
    ///
    /// Frames of the wrong size are logged and skipped.
    pub fn run<S: AudioSource>(
        &mut self,
        source: &mut S,
        dispatcher: &Dispatcher,
    ) -> Result<(), CaptureError> {
        info!("Listening for songs...");
        loop {
            let frame = source.read_frame()?;
            match self.process_frame(&frame) {
                Ok(Some(event)) => dispatcher.dispatch(&event),
                Ok(None) => {}
                Err(e) => warn!("skipping frame: {}", e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notes::Note::*;

    #[test]
    fn silence_changes_nothing() {
        let mut listener = Listener::default();
        for _ in 0..5 {
            assert_eq!(listener.process_frame(&vec![0; 2048]), Ok(None));
        }
        assert_eq!(listener.history().snapshot(), vec![G; 6]);
    }

    #[test]
    fn wrong_frame_size_leaves_state_alone() {
        let mut listener = Listener::default();
        let before = listener.track();
        assert!(listener.process_frame(&[0; 16]).is_err());
        assert_eq!(listener.track(), before);
    }

    #[test]
    fn track_follows_each_frame() {
        let mut listener = Listener::default();
        listener.process_frame(&vec![0; 2048]).unwrap();
        let bin_one = 48_000.0 / 2048.0;
        assert_eq!(
            listener.track(),
            FrequencyTrack {
                current: bin_one,
                previous: 1.0
            }
        );
    }
}
