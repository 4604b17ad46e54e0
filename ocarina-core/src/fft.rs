//! # Frequency Estimation Module
//!
//! Turns one frame of 16-bit samples into the dominant frequency of the
//! frame. The spectrum peak is refined to sub-bin precision by fitting a
//! parabola through the log-magnitudes of the peak bin and its neighbours.
//!
//! The estimator is pure: it keeps no memory of earlier frames. Tracking the
//! previous reading is the caller's job (see [`FrequencyTrack`]).

use crate::error::EstimateError;
use rustfft::{Fft, FftPlanner, num_complex::Complex};
use std::sync::Arc;

/// Full scale of a signed 16-bit sample.
const I16_FULL_SCALE: f32 = 32768.0;

/// Estimates the dominant frequency of fixed-size audio frames.
pub struct FrequencyEstimator {
    sample_rate: u32,
    frame_size: usize,
    fft: Arc<dyn Fft<f32>>,
}

impl FrequencyEstimator {
    /// Plans the forward FFT once for frames of `frame_size` samples.
    pub fn new(sample_rate: u32, frame_size: usize) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(frame_size);
        Self {
            sample_rate,
            frame_size,
            fft,
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn frame_size(&self) -> usize {
        self.frame_size
    }

    /// Width of one spectrum bin in Hz.
    pub fn bin_width(&self) -> f32 {
        self.sample_rate as f32 / self.frame_size as f32
    }

    /// Returns the dominant frequency of `frame` in Hz.
    ///
    /// The DC bin is never picked. A frame with no energy at all returns the
    /// frequency of bin 1; it is up to the classifier to reject it.
    ///
    /// # Errors
    /// * [`EstimateError::FrameSize`] if `frame` is not exactly `frame_size` long
    pub fn estimate(&self, frame: &[i16]) -> Result<f32, EstimateError> {
        if frame.len() != self.frame_size {
            return Err(EstimateError::FrameSize {
                expected: self.frame_size,
                got: frame.len(),
            });
        }

        let magnitudes = self.magnitudes(frame);
        let peak = peak_bin(&magnitudes);

        let bin = if peak + 1 < magnitudes.len() {
            peak as f32 + interpolate_log_peak(&magnitudes[peak - 1..=peak + 1])
        } else {
            peak as f32
        };
        Ok(bin * self.bin_width())
    }

    /// Magnitude spectrum of the normalised frame, first half only.
    fn magnitudes(&self, frame: &[i16]) -> Vec<f32> {
        let mut buffer: Vec<Complex<f32>> = frame
            .iter()
            .map(|&sample| Complex {
                re: sample as f32 / I16_FULL_SCALE,
                im: 0.0,
            })
            .collect();

        self.fft.process(&mut buffer);

        buffer
            .iter()
            .take(self.frame_size / 2)
            .map(|c| c.norm())
            .collect()
    }
}

/// Index of the largest magnitude in `[1, len)`. Ties go to the lowest bin.
fn peak_bin(magnitudes: &[f32]) -> usize {
    let mut peak = 1;
    for (bin, &magnitude) in magnitudes.iter().enumerate().skip(2) {
        if magnitude > magnitudes[peak] {
            peak = bin;
        }
    }
    peak
}

/// Sub-bin offset of a peak from the log-magnitudes of the bins around it.
///
/// Returns 0.0 when the fit is undefined (a zero magnitude or a flat top).
fn interpolate_log_peak(neighbours: &[f32]) -> f32 {
    let y0 = neighbours[0].ln();
    let y1 = neighbours[1].ln();
    let y2 = neighbours[2].ln();

    let offset = 0.5 * (y2 - y0) / (2.0 * y1 - y2 - y0);
    if offset.is_finite() { offset } else { 0.0 }
}

/// The two most recent frequency readings.
///
/// `previous` is always the `current` of the iteration before.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrequencyTrack {
    pub current: f32,
    pub previous: f32,
}

impl Default for FrequencyTrack {
    fn default() -> Self {
        Self {
            current: 1.0,
            previous: 1.0,
        }
    }
}

impl FrequencyTrack {
    /// Shifts `current` into `previous` and records `reading`.
    pub fn advance(&mut self, reading: f32) {
        self.previous = self.current;
        self.current = reading;
    }
}
