//! # Error Module
//!
//! Typed errors for capture, estimation and configuration.

use thiserror::Error;

/// Errors raised while opening or reading the audio input.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("no input device available")]
    NoInputDevice,

    #[error("no usable input format found for {sample_rate} Hz")]
    NoSupportedConfig { sample_rate: u32 },

    #[error("could not query input device: {0}")]
    DeviceName(#[from] cpal::DeviceNameError),

    #[error("could not list input formats: {0}")]
    SupportedConfigs(#[from] cpal::SupportedStreamConfigsError),

    #[error("could not build input stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error("could not start input stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),

    /// The producing side of the frame channel went away.
    #[error("audio stream disconnected")]
    Disconnected,
}

/// Errors raised by the frequency estimator.
#[derive(Debug, Error, PartialEq)]
pub enum EstimateError {
    #[error("expected frame of length {expected}, got {got}")]
    FrameSize { expected: usize, got: usize },
}

/// Errors raised while validating the listener configuration.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("frame size must be an even number of at least 4 samples, got {0}")]
    FrameSize(usize),

    #[error("sample rate must be positive")]
    SampleRate,

    #[error("band for {note} is inverted ({min} > {max})")]
    InvertedBand { note: String, min: f32, max: f32 },

    #[error("gate is inverted ({min} > {max})")]
    InvertedGate { min: f32, max: f32 },

    #[error("stability tolerance must be a finite, non-negative number of Hz, got {0}")]
    Tolerance(f32),

    #[error("no songs configured")]
    NoSongs,

    #[error("song {id} has {got} notes, expected {expected}")]
    SongLength { id: u8, expected: usize, got: usize },

    #[error("song id {0} is used more than once")]
    DuplicateSong(u8),
}
