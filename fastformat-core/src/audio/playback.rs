//! Speaker output for audio resources
//!
//! Speech WAVs are 24 kHz mono; most devices are not. The resource is decoded
//! once, converted to the device rate and channel count, and then fed to a
//! cpal stream from a shared cursor.

use anyhow::{Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{
    Device, FromSample, SampleFormat, SizedSample, Stream, StreamConfig, SupportedStreamConfig,
};
use rubato::{FftFixedIn, Resampler};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use super::resource::AudioResource;
use super::wav::parse_wav;
use super::{Playback, Player};
use crate::error::FormatError;

const RESAMPLE_CHUNK: usize = 1024;

/// Plays WAV resources on the default output device
pub struct DevicePlayer {
    device: Device,
    device_config: SupportedStreamConfig,
}

impl DevicePlayer {
    pub fn new() -> Result<Self> {
        let device = cpal::default_host()
            .default_output_device()
            .context("No audio output device")?;
        let device_config = device
            .default_output_config()
            .context("Audio output device has no default config")?;

        tracing::info!(
            rate = device_config.sample_rate().0,
            channels = device_config.channels(),
            format = ?device_config.sample_format(),
            "Audio output ready"
        );
        Ok(Self {
            device,
            device_config,
        })
    }

    fn start(&self, resource: &AudioResource) -> Result<Playback> {
        let (format, pcm) = parse_wav(&resource.bytes).context("resource is not a PCM WAV file")?;
        if format.bits_per_sample != 16 {
            anyhow::bail!("unsupported bit depth: {}", format.bits_per_sample);
        }

        let device_rate = self.device_config.sample_rate().0;
        let device_channels = self.device_config.channels() as usize;

        let mono = downmix(&i16_bytes_to_f32(pcm), format.channels as usize);
        let mono = if format.sample_rate == device_rate {
            mono
        } else {
            resample(&mono, format.sample_rate, device_rate)?
        };
        let cursor = Arc::new(SampleCursor::new(expand_to_channels(
            &mono,
            device_channels,
        )));

        let config: StreamConfig = self.device_config.clone().into();
        let stream = match self.device_config.sample_format() {
            SampleFormat::F32 => self.open_stream::<f32>(&config, cursor.clone())?,
            SampleFormat::I16 => self.open_stream::<i16>(&config, cursor.clone())?,
            other => anyhow::bail!("unsupported device sample format: {other:?}"),
        };
        stream.play().context("failed to start audio output")?;

        Ok(Playback::new(cursor.finished.clone(), Some(Box::new(stream))))
    }

    fn open_stream<T>(&self, config: &StreamConfig, cursor: Arc<SampleCursor>) -> Result<Stream>
    where
        T: SizedSample + FromSample<f32> + Default + Send + 'static,
    {
        self.device
            .build_output_stream(
                config,
                move |out: &mut [T], _: &cpal::OutputCallbackInfo| cursor.fill(out),
                |err| tracing::error!(?err, "Audio output stream error"),
                None,
            )
            .context("failed to open audio output stream")
    }
}

/// Interleaved device samples plus how far the output callback has read.
struct SampleCursor {
    samples: Vec<f32>,
    read: AtomicUsize,
    finished: Arc<AtomicBool>,
}

impl SampleCursor {
    fn new(samples: Vec<f32>) -> Self {
        Self {
            samples,
            read: AtomicUsize::new(0),
            finished: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Copy the next samples into `out`, padding with silence. Playback is
    /// finished once a callback finds nothing left to read.
    fn fill<T: FromSample<f32> + Default>(&self, out: &mut [T]) {
        let read = self.read.load(Ordering::Acquire);
        let next = &self.samples[read.min(self.samples.len())..];
        if next.is_empty() {
            self.finished.store(true, Ordering::SeqCst);
        }

        let copied = next.len().min(out.len());
        for (slot, &sample) in out.iter_mut().zip(&next[..copied]) {
            *slot = T::from_sample(sample);
        }
        for slot in &mut out[copied..] {
            *slot = T::default();
        }
        self.read.store(read + copied, Ordering::Release);
    }
}

impl Player for DevicePlayer {
    fn play(&self, resource: &AudioResource) -> Result<Playback, FormatError> {
        self.start(resource).map_err(|e| {
            tracing::error!(?e, "Playback error");
            FormatError::PlaybackFailure(format!("{e:#}"))
        })
    }
}

fn i16_bytes_to_f32(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(2)
        .map(|chunk| i16::from_le_bytes([chunk[0], chunk[1]]) as f32 / 32768.0)
        .collect()
}

fn downmix(samples: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return samples.to_vec();
    }
    samples
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

/// Convert mono `samples` between rates. The resampler delay is trimmed so
/// the output lines up with the input and has the expected length.
fn resample(samples: &[f32], from_rate: u32, to_rate: u32) -> Result<Vec<f32>> {
    let mut resampler =
        FftFixedIn::<f32>::new(from_rate as usize, to_rate as usize, RESAMPLE_CHUNK, 2, 1)
            .context("failed to create resampler")?;
    let resample_err = |e: rubato::ResampleError| anyhow::anyhow!("resampling failed: {e:?}");

    let mut output = Vec::new();
    for chunk in samples.chunks(RESAMPLE_CHUNK) {
        let frames = if chunk.len() == RESAMPLE_CHUNK {
            resampler.process(&[chunk], None)
        } else {
            resampler.process_partial(Some(&[chunk]), None)
        }
        .map_err(resample_err)?;
        output.extend(frames.into_iter().flatten());
    }
    let tail = resampler
        .process_partial::<&[f32]>(None, None)
        .map_err(resample_err)?;
    output.extend(tail.into_iter().flatten());

    let expected = (samples.len() as u64 * to_rate as u64 / from_rate as u64) as usize;
    let delay = resampler.output_delay().min(output.len());
    output.drain(..delay);
    output.truncate(expected);
    Ok(output)
}

fn expand_to_channels(samples: &[f32], channels: usize) -> Vec<f32> {
    samples
        .iter()
        .flat_map(|&sample| std::iter::repeat(sample).take(channels.max(1)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_i16_conversion() {
        let bytes = [0x00, 0x80, 0x00, 0x00, 0xff, 0x7f];
        let samples = i16_bytes_to_f32(&bytes);
        assert_eq!(samples[0], -1.0);
        assert_eq!(samples[1], 0.0);
        assert!(samples[2] > 0.999);
    }

    #[test]
    fn test_cursor_pads_and_finishes() {
        let cursor = SampleCursor::new(vec![0.5, -0.5, 0.25]);

        let mut out = [1.0f32; 2];
        cursor.fill(&mut out);
        assert_eq!(out, [0.5, -0.5]);
        assert!(!cursor.finished.load(Ordering::SeqCst));

        cursor.fill(&mut out);
        assert_eq!(out, [0.25, 0.0]);
        assert!(!cursor.finished.load(Ordering::SeqCst));

        cursor.fill(&mut out);
        assert_eq!(out, [0.0, 0.0]);
        assert!(cursor.finished.load(Ordering::SeqCst));
    }

    #[test]
    fn test_resample_length_follows_rate() {
        let samples = vec![0.1f32; 2400];
        let output = resample(&samples, 24_000, 48_000).unwrap();
        assert_eq!(output.len(), 4800);
    }

    #[test]
    fn test_downmix_and_expand() {
        assert_eq!(downmix(&[0.5, -0.5, 1.0, 0.0], 2), vec![0.0, 0.5]);
        assert_eq!(expand_to_channels(&[0.25], 2), vec![0.25, 0.25]);
    }
}
