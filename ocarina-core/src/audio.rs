//! # Audio Capture Module
//!
//! This module handles real-time audio capture using CPAL (Cross-Platform Audio Library).
//! The driver callback cuts the incoming stream into fixed-size frames and hands
//! them to the listener through a small bounded channel.
//!
//! ## Features
//! - Automatic input device selection, mono preferred
//! - Any sample format, converted to signed 16-bit
//! - Stale frames are dropped so the listener always hears live audio

use crate::error::CaptureError;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SizedSample, SupportedStreamConfigRange};
use crossbeam_channel::{Receiver, Sender, TrySendError};
use tracing::{error, info};

/// Frames queued between the driver callback and the listener.
///
/// When the listener falls behind, the oldest frame is evicted to make room.
const FRAME_QUEUE: usize = 2;

/// A blocking source of fixed-size audio frames.
pub trait AudioSource {
    /// Waits for the next frame.
    fn read_frame(&mut self) -> Result<Vec<i16>, CaptureError>;
}

/// Microphone input through the default CPAL host.
pub struct CpalSource {
    // Dropping the stream stops capture.
    _stream: cpal::Stream,
    frames: Receiver<Vec<i16>>,
    sample_rate: u32,
}

impl CpalSource {
    /// Opens the default input device and starts streaming.
    ///
    /// # Arguments
    /// * `sample_rate` - Requested capture rate in Hz
    /// * `frame_size` - Samples per frame handed to [`read_frame`](AudioSource::read_frame)
    ///
    /// # Returns
    /// * `Ok(source)` - Capture is running
    /// * `Err(e)` - No device, no usable format, or the stream failed to start
    pub fn open(sample_rate: u32, frame_size: usize) -> Result<Self, CaptureError> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or(CaptureError::NoInputDevice)?;

        info!("Using audio input device: {}", device.name()?);

        let configs = device.supported_input_configs()?.collect::<Vec<_>>();
        let supported_config = find_supported_config(configs, sample_rate)
            .ok_or(CaptureError::NoSupportedConfig { sample_rate })?;

        let config = supported_config.with_sample_rate(cpal::SampleRate(sample_rate));
        let sample_format = config.sample_format();
        let config: cpal::StreamConfig = config.into();

        info!(
            sample_rate,
            channels = config.channels,
            format = ?sample_format,
            "Selected input format"
        );

        let (sender, frames) = crossbeam_channel::bounded(FRAME_QUEUE);
        let queue = FrameQueue::new(sender, frames.clone());
        let stream = match sample_format {
            cpal::SampleFormat::I16 => build_stream::<i16>(&device, &config, frame_size, queue),
            cpal::SampleFormat::U16 => build_stream::<u16>(&device, &config, frame_size, queue),
            cpal::SampleFormat::I32 => build_stream::<i32>(&device, &config, frame_size, queue),
            cpal::SampleFormat::F32 => build_stream::<f32>(&device, &config, frame_size, queue),
            cpal::SampleFormat::F64 => build_stream::<f64>(&device, &config, frame_size, queue),
            _ => Err(CaptureError::NoSupportedConfig { sample_rate }),
        }?;

        stream.play()?;

        Ok(Self {
            _stream: stream,
            frames,
            sample_rate,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

impl AudioSource for CpalSource {
    fn read_frame(&mut self) -> Result<Vec<i16>, CaptureError> {
        latest_frame(&self.frames)
    }
}

/// Waits for a frame, then skips to the freshest one queued behind it.
fn latest_frame(frames: &Receiver<Vec<i16>>) -> Result<Vec<i16>, CaptureError> {
    let frame = frames.recv().map_err(|_| CaptureError::Disconnected)?;
    Ok(frames.try_iter().last().unwrap_or(frame))
}

/// Builds an input stream that converts samples of type `T` to i16 and
/// sends them on in frames of `frame_size`. Only the first channel is kept.
fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    frame_size: usize,
    queue: FrameQueue,
) -> Result<cpal::Stream, CaptureError>
where
    T: SizedSample,
    i16: FromSample<T>,
{
    let channels = config.channels.max(1) as usize;
    let mut framer = Framer::new(frame_size);

    let stream = device.build_input_stream(
        config,
        move |data: &[T], _: &cpal::InputCallbackInfo| {
            let samples = data.iter().step_by(channels).map(|&s| s.to_sample::<i16>());
            framer.feed(samples, &queue);
        },
        |err| error!("An error occurred on the audio stream: {}", err),
        None,
    )?;
    Ok(stream)
}

/// Accumulates samples and cuts them into fixed-size frames.
struct Framer {
    pending: Vec<i16>,
    frame_size: usize,
}

impl Framer {
    fn new(frame_size: usize) -> Self {
        Self {
            pending: Vec::with_capacity(frame_size * 2),
            frame_size,
        }
    }

    /// Appends `samples` and pushes every complete frame onto `queue`.
    fn feed(&mut self, samples: impl Iterator<Item = i16>, queue: &FrameQueue) {
        self.pending.extend(samples);
        while self.pending.len() >= self.frame_size {
            queue.push(self.pending.drain(..self.frame_size).collect());
        }
    }
}

/// Producer side of the frame channel.
///
/// When the channel is full the oldest queued frame is evicted, so the
/// channel always holds the most recent audio.
struct FrameQueue {
    sender: Sender<Vec<i16>>,
    evict: Receiver<Vec<i16>>,
}

impl FrameQueue {
    fn new(sender: Sender<Vec<i16>>, evict: Receiver<Vec<i16>>) -> Self {
        Self { sender, evict }
    }

    fn push(&self, frame: Vec<i16>) {
        let mut frame = frame;
        loop {
            match self.sender.try_send(frame) {
                Ok(()) => return,
                Err(TrySendError::Full(rejected)) => {
                    let _ = self.evict.try_recv();
                    frame = rejected;
                }
                Err(TrySendError::Disconnected(_)) => return,
            }
        }
    }
}

/// Finds the best supported input configuration for the target sample rate.
///
/// Only configurations whose rate range contains `target_rate` qualify. Mono
/// beats multi-channel, then i16 beats f32 beats the other formats.
///
/// # Returns
/// * `Some(config)` - Best matching configuration
/// * `None` - No configuration supports the rate
fn find_supported_config(
    configs: Vec<SupportedStreamConfigRange>,
    target_rate: u32,
) -> Option<SupportedStreamConfigRange> {
    configs
        .into_iter()
        .filter(|c| c.min_sample_rate().0 <= target_rate && target_rate <= c.max_sample_rate().0)
        .filter_map(|c| {
            let format_rank = match c.sample_format() {
                cpal::SampleFormat::I16 => 0,
                cpal::SampleFormat::F32 => 1,
                cpal::SampleFormat::U16 | cpal::SampleFormat::I32 | cpal::SampleFormat::F64 => 2,
                _ => return None,
            };
            Some(((c.channels() != 1, format_rank, c.channels()), c))
        })
        .min_by_key(|(rank, _)| *rank)
        .map(|(_, c)| c)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn queue() -> (FrameQueue, Receiver<Vec<i16>>) {
        let (sender, frames) = crossbeam_channel::bounded(FRAME_QUEUE);
        (FrameQueue::new(sender, frames.clone()), frames)
    }

    #[test]
    fn full_queue_keeps_the_newest_frames() {
        let (queue, frames) = queue();
        for t in 0..5 {
            queue.push(vec![t; 4]);
        }
        let kept: Vec<Vec<i16>> = frames.try_iter().collect();
        assert_eq!(kept, vec![vec![3; 4], vec![4; 4]]);
    }

    #[test]
    fn framer_cuts_fixed_frames_and_keeps_the_remainder() {
        let (queue, frames) = queue();
        let mut framer = Framer::new(3);

        framer.feed([1, 2, 3, 4].into_iter(), &queue);
        assert_eq!(frames.try_recv(), Ok(vec![1, 2, 3]));
        assert!(frames.try_recv().is_err());

        framer.feed([5, 6].into_iter(), &queue);
        assert_eq!(frames.try_recv(), Ok(vec![4, 5, 6]));
    }

    #[test]
    fn read_frame_returns_live_audio_after_a_stall() {
        let (queue, frames) = queue();
        let mut framer = Framer::new(2);
        // The listener is busy while ten frames arrive.
        framer.feed((0..20).map(|s| s as i16), &queue);

        assert_eq!(latest_frame(&frames).unwrap(), vec![18, 19]);
    }
}
