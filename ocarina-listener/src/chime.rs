//! # Confirmation Sound
//!
//! Plays a short clip through the default output device when a song is
//! recognised. The clip is either a WAV file decoded at startup or a
//! synthesised two-tone chime.
//!
//! Playback happens on its own short-lived thread so the listener loop is
//! never held up by the length of the sound.

use anyhow::{Context, Result, anyhow, bail};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SizedSample};
use ocarina_core::{DeliveryError, Feedback};
use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, error};

const CHIME_RATE: u32 = 44_100;
const CHIME_TONES: [f32; 2] = [880.0, 1318.5];
const CHIME_TONE_SECS: f32 = 0.15;
const RESAMPLE_SINC_LEN: usize = 128;

/// Mono audio held in memory, samples in [-1.0, 1.0].
#[derive(Debug, Clone, PartialEq)]
struct Clip {
    samples: Vec<f32>,
    sample_rate: u32,
}

pub struct ChimeFeedback {
    clip: Arc<Clip>,
    volume: f32,
}

impl ChimeFeedback {
    /// Decodes `path` into memory, downmixing to mono.
    pub fn from_wav(path: &Path, volume: f32) -> Result<Self> {
        let clip = load_wav(path).with_context(|| format!("loading {}", path.display()))?;
        Ok(Self::with_clip(clip, volume))
    }

    /// A rising two-tone chime.
    pub fn synthesized(volume: f32) -> Self {
        Self::with_clip(synthesize_chime(), volume)
    }

    fn with_clip(clip: Clip, volume: f32) -> Self {
        Self {
            clip: Arc::new(clip),
            volume: volume.clamp(0.0, 1.0),
        }
    }
}

impl Feedback for ChimeFeedback {
    fn play(&self) -> Result<(), DeliveryError> {
        let clip = self.clip.clone();
        let volume = self.volume;
        thread::Builder::new()
            .name("chime".to_string())
            .spawn(move || {
                if let Err(e) = play_blocking(&clip, volume) {
                    error!("Could not play confirmation sound: {:#}", e);
                }
            })?;
        Ok(())
    }
}

/// Opens the default output device, plays `clip` once and waits for it to end.
fn play_blocking(clip: &Clip, volume: f32) -> Result<()> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| anyhow!("No output device available"))?;

    let supported = device.default_output_config()?;
    let rate = supported.sample_rate().0;
    let format = supported.sample_format();
    let config: cpal::StreamConfig = supported.into();

    let samples: Vec<f32> = resample(&clip.samples, clip.sample_rate, rate)?
        .into_iter()
        .map(|s| s * volume)
        .collect();
    let length = Duration::from_secs_f64(samples.len() as f64 / rate as f64);
    debug!(rate, ?format, ?length, "playing confirmation");

    let stream = match format {
        cpal::SampleFormat::F32 => build_output::<f32>(&device, &config, samples),
        cpal::SampleFormat::I16 => build_output::<i16>(&device, &config, samples),
        cpal::SampleFormat::U16 => build_output::<u16>(&device, &config, samples),
        cpal::SampleFormat::I32 => build_output::<i32>(&device, &config, samples),
        other => bail!("unsupported output format {:?}", other),
    }?;
    stream.play()?;

    // Leave the driver time to flush its last buffer.
    thread::sleep(length + Duration::from_millis(100));
    Ok(())
}

fn build_output<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    samples: Vec<f32>,
) -> Result<cpal::Stream>
where
    T: SizedSample + FromSample<f32>,
{
    let channels = config.channels.max(1) as usize;
    let mut position = 0;

    let stream = device.build_output_stream(
        config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
            for frame in data.chunks_mut(channels) {
                let value = samples.get(position).copied().unwrap_or(0.0);
                position += 1;
                for out in frame.iter_mut() {
                    *out = T::from_sample(value);
                }
            }
        },
        |err| error!("An error occurred on the output stream: {}", err),
        None,
    )?;
    Ok(stream)
}

fn load_wav(path: &Path) -> Result<Clip> {
    let mut reader = hound::WavReader::open(path)?;
    let spec = reader.spec();
    let channels = spec.channels.max(1) as usize;

    let interleaved: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader.samples::<f32>().collect::<Result<_, _>>()?,
        hound::SampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|s| s as f32 / scale))
                .collect::<Result<_, _>>()?
        }
    };

    let samples = interleaved
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
        .collect();

    Ok(Clip {
        samples,
        sample_rate: spec.sample_rate,
    })
}

fn synthesize_chime() -> Clip {
    let tone_len = (CHIME_TONE_SECS * CHIME_RATE as f32) as usize;
    let samples = CHIME_TONES
        .iter()
        .flat_map(|&freq| {
            (0..tone_len).map(move |n| {
                let t = n as f32 / CHIME_RATE as f32;
                let envelope = (-t * 12.0).exp();
                envelope * (2.0 * std::f32::consts::PI * freq * t).sin()
            })
        })
        .collect();

    Clip {
        samples,
        sample_rate: CHIME_RATE,
    }
}

/// Converts mono `samples` from `from` Hz to `to` Hz with rubato.
///
/// The output is exactly `len * to / from` samples (rounded), aligned with
/// the input: the resampler's delay is skipped and its tail flushed.
fn resample(samples: &[f32], from: u32, to: u32) -> Result<Vec<f32>> {
    use rubato::{
        Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType,
        WindowFunction,
    };

    if from == to || samples.is_empty() {
        return Ok(samples.to_vec());
    }

    let params = SincInterpolationParameters {
        sinc_len: RESAMPLE_SINC_LEN,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 128,
        window: WindowFunction::BlackmanHarris2,
    };

    // Trailing silence pushes the last real samples out of the filter.
    let mut input = samples.to_vec();
    input.resize(samples.len() + RESAMPLE_SINC_LEN, 0.0);

    let ratio = to as f64 / from as f64;
    let mut resampler = SincFixedIn::<f32>::new(ratio, 1.0, params, input.len(), 1)
        .context("Failed to create resampler")?;
    let delay = resampler.output_delay();

    let output = resampler
        .process(&[input], None)
        .context("Resampling failed")?
        .into_iter()
        .next()
        .unwrap_or_default();

    let expected = (samples.len() as f64 * ratio).round() as usize;
    let mut aligned: Vec<f32> = output.into_iter().skip(delay).take(expected).collect();
    aligned.resize(expected, 0.0);
    Ok(aligned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chime_is_bounded_and_audible() {
        let clip = synthesize_chime();
        assert_eq!(clip.sample_rate, CHIME_RATE);
        assert_eq!(clip.samples.len(), 2 * (CHIME_TONE_SECS * CHIME_RATE as f32) as usize);
        assert!(clip.samples.iter().all(|s| s.abs() <= 1.0));
        assert!(clip.samples.iter().any(|s| s.abs() > 0.5));
    }

    #[test]
    fn resample_scales_length() {
        let samples = vec![0.0; 4800];
        assert_eq!(resample(&samples, 48_000, 48_000).unwrap().len(), 4800);
        assert_eq!(resample(&samples, 48_000, 24_000).unwrap().len(), 2400);
        assert_eq!(resample(&samples, 24_000, 48_000).unwrap().len(), 9600);
        assert_eq!(resample(&samples, 44_100, 48_000).unwrap().len(), 5224);
    }

    #[test]
    fn resampled_chime_keeps_its_level() {
        let clip = synthesize_chime();
        let out = resample(&clip.samples, clip.sample_rate, 48_000).unwrap();
        let peak = |s: &[f32]| s.iter().fold(0.0f32, |m, v| m.max(v.abs()));
        let before = peak(&clip.samples);
        let after = peak(&out);
        assert!((after - before).abs() < 0.05, "peak {before} became {after}");
    }

    #[test]
    fn empty_clip_resamples_to_nothing() {
        assert!(resample(&[], 44_100, 48_000).unwrap().is_empty());
    }

    #[test]
    fn stereo_wav_is_downmixed() {
        let file = tempfile::Builder::new().suffix(".wav").tempfile().unwrap();
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: 32_000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(file.path(), spec).unwrap();
        for (l, r) in [(16384i16, 0i16), (-16384, -16384)] {
            writer.write_sample(l).unwrap();
            writer.write_sample(r).unwrap();
        }
        writer.finalize().unwrap();

        let clip = load_wav(file.path()).unwrap();
        assert_eq!(clip.sample_rate, 32_000);
        assert_eq!(clip.samples, vec![0.25, -0.5]);
    }

    #[test]
    fn missing_wav_is_an_error() {
        assert!(ChimeFeedback::from_wav(Path::new("/nonexistent/confirm.wav"), 0.5).is_err());
    }

    #[test]
    fn volume_is_clamped() {
        assert_eq!(ChimeFeedback::synthesized(3.0).volume, 1.0);
    }
}
