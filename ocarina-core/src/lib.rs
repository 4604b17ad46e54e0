// ocarina-core/src/lib.rs

//! The core logic for the ocarina song listener.
//! This crate turns a stream of microphone frames into note symbols and
//! recognises short songs played on the instrument. It is completely
//! headless and knows nothing about how song events are delivered.

pub mod audio;
pub mod classifier;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod fft;
pub mod history;
pub mod listener;
pub mod notes;
pub mod songs;

pub use audio::{AudioSource, CpalSource};
pub use classifier::{NoteClassifier, Verdict};
pub use config::ListenerConfig;
pub use dispatch::{DeliveryError, Dispatcher, Feedback, Notifier, SilentFeedback};
pub use error::{CaptureError, ConfigError, EstimateError};
pub use fft::{FrequencyEstimator, FrequencyTrack};
pub use history::NoteHistory;
pub use listener::Listener;
pub use notes::{FrequencyRange, Note, NoteBand};
pub use songs::{Song, SongEvent, SongMatcher};
