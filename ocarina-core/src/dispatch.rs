//! # Dispatch Module
//!
//! The boundary between recognition and the outside world. Song events are
//! handed to notifier sinks and a confirmation sound is played.
//!
//! Delivery is fire-and-forget: a sink that fails is logged and skipped, and
//! nothing it does can stop the listener loop.

use crate::songs::SongEvent;
use std::error::Error;
use tracing::{error, info};

/// Error type returned by external collaborators.
pub type DeliveryError = Box<dyn Error + Send + Sync>;

/// Publishes song events somewhere.
pub trait Notifier {
    /// Short name used in logs.
    fn name(&self) -> &str;

    fn publish(&self, event: &SongEvent) -> Result<(), DeliveryError>;
}

/// Plays the confirmation sound. Must not block for the length of the sound.
pub trait Feedback {
    fn play(&self) -> Result<(), DeliveryError>;
}

/// Feedback that does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentFeedback;

impl Feedback for SilentFeedback {
    fn play(&self) -> Result<(), DeliveryError> {
        Ok(())
    }
}

/// Routes song events to notifiers and feedback.
pub struct Dispatcher {
    notifiers: Vec<Box<dyn Notifier>>,
    /// Sinks that only fire for one song id, after the standard notifiers.
    song_sinks: Vec<(u8, Box<dyn Notifier>)>,
    feedback: Box<dyn Feedback>,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(Box::new(SilentFeedback))
    }
}

impl Dispatcher {
    pub fn new(feedback: Box<dyn Feedback>) -> Self {
        Self {
            notifiers: Vec::new(),
            song_sinks: Vec::new(),
            feedback,
        }
    }

    /// Adds a notifier that receives every song event.
    pub fn with_notifier(mut self, notifier: Box<dyn Notifier>) -> Self {
        self.notifiers.push(notifier);
        self
    }

    /// Adds a notifier that only receives events for `song_id`.
    pub fn with_song_sink(mut self, song_id: u8, notifier: Box<dyn Notifier>) -> Self {
        self.song_sinks.push((song_id, notifier));
        self
    }

    /// Delivers `event` to every interested sink, then plays the feedback.
    ///
    /// Failures are logged and otherwise ignored.
    pub fn dispatch(&self, event: &SongEvent) {
        let targeted = self
            .song_sinks
            .iter()
            .filter(|(id, _)| *id == event.song_id)
            .map(|(_, sink)| sink);

        for sink in self.notifiers.iter().chain(targeted) {
            match sink.publish(event) {
                Ok(()) => info!(sink = sink.name(), song_id = event.song_id, "event published"),
                Err(e) => error!(
                    sink = sink.name(),
                    song_id = event.song_id,
                    "failed to publish event: {}",
                    e
                ),
            }
        }

        if let Err(e) = self.feedback.play() {
            error!("failed to play confirmation: {}", e);
        }
    }
}
