//! Audio loading and slicing.
//!
//! Responsibilities:
//! - Decode any Symphonia-supported container/codec into PCM
//! - Downmix to mono and resample to the crate's target sample rate
//! - Hold the whole normalized timeline in memory and hand out clips by
//!   millisecond bounds
//!
//! Holding the full timeline is deliberate: slices overlap, so streaming the
//! decode would force either re-decoding or a bespoke ring buffer. An hour of
//! 16 kHz mono `f32` is ~230 MB, acceptable for a batch tool.

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use hound::{SampleFormat, WavSpec, WavWriter};
use rubato::{Resampler, SincFixedIn, WindowFunction};
use symphonia::core::audio::{AudioBufferRef, SampleBuffer};
use symphonia::core::codecs::{CODEC_TYPE_NULL, Decoder, DecoderOptions};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader, Packet, Track};
use symphonia::core::io::{MediaSource, MediaSourceStream, MediaSourceStreamOptions};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::debug;

/// The target mono sample rate (Hz) all audio is normalized to.
pub const TARGET_SAMPLE_RATE: u32 = 16_000;

/// Samples per millisecond at the target rate.
const SAMPLES_PER_MS: u64 = (TARGET_SAMPLE_RATE / 1000) as u64;

/// A fully decoded recording: mono `f32` samples at [`TARGET_SAMPLE_RATE`].
#[derive(Debug, Clone)]
pub struct AudioTimeline {
    samples: Vec<f32>,
}

impl AudioTimeline {
    /// Decode an audio file into a normalized timeline.
    ///
    /// The file extension, when present, is passed to the probe as a format
    /// hint, which helps with ambiguous containers.
    pub fn open(path: impl AsRef<Path>) -> crate::Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("failed to open audio file {}", path.display()))?;
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_owned);

        let timeline = Self::from_media_source(Box::new(file), extension.as_deref())
            .with_context(|| format!("failed to decode audio file {}", path.display()))?;
        Ok(timeline)
    }

    /// Wrap already-normalized samples (mono, target rate) as a timeline.
    pub fn from_samples(samples: Vec<f32>) -> Self {
        Self { samples }
    }

    /// Decode a media source end-to-end: demux, decode, downmix, resample.
    fn from_media_source(
        source: Box<dyn MediaSource>,
        hint_extension: Option<&str>,
    ) -> Result<Self> {
        let (mut format, track) = probe_source_and_pick_default_track(source, hint_extension)?;
        let mut decoder = make_decoder_for_track(&track)?;
        let track_id = track.id;

        let mut sample_buf: Option<SampleBuffer<f32>> = None;
        let mut mono_src: Vec<f32> = Vec::new();
        let mut src_rate: Option<u32> = None;

        while let Some(packet) = next_packet(&mut format)? {
            if packet.track_id() != track_id {
                continue;
            }

            decode_packet_and_then(&mut decoder, &packet, |decoded| {
                let spec = *decoded.spec();
                let channels = spec.channels.count();
                if channels == 0 {
                    bail!("decoded audio had zero channels");
                }
                src_rate.get_or_insert(spec.rate);

                ensure_sample_buffer(&decoded, &mut sample_buf);
                let buf = sample_buf
                    .as_mut()
                    .ok_or_else(|| anyhow!("sample buffer not initialized"))?;
                buf.copy_interleaved_ref(decoded.clone());

                append_downmixed(buf.samples(), channels, &mut mono_src);
                Ok(())
            })?;
        }

        let src_rate = src_rate
            .or(track.codec_params.sample_rate)
            .ok_or_else(|| anyhow!("source sample rate unknown"))?;

        debug!(
            src_rate,
            decoded_samples = mono_src.len(),
            "decoded audio source"
        );

        let samples = if src_rate == TARGET_SAMPLE_RATE {
            mono_src
        } else {
            resample_to_target(mono_src, src_rate)?
        };

        Ok(Self { samples })
    }

    /// Total duration in whole milliseconds (floor).
    pub fn duration_ms(&self) -> u64 {
        self.samples.len() as u64 * 1000 / u64::from(TARGET_SAMPLE_RATE)
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Copy out the samples between two millisecond bounds.
    ///
    /// Bounds are clamped to the timeline; an inverted or out-of-range pair
    /// yields an empty clip rather than an error.
    pub fn clip(&self, start_ms: u64, end_ms: u64) -> AudioClip {
        let start = (start_ms * SAMPLES_PER_MS) as usize;
        let end = (end_ms * SAMPLES_PER_MS) as usize;

        let start = start.min(self.samples.len());
        let end = end.min(self.samples.len()).max(start);

        AudioClip {
            samples: self.samples[start..end].to_vec(),
        }
    }
}

/// One extracted slice of a timeline, same normalization as the source.
#[derive(Debug, Clone)]
pub struct AudioClip {
    samples: Vec<f32>,
}

impl AudioClip {
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Write the clip as a mono 16-bit PCM WAV at the target sample rate.
    pub fn export_wav(&self, path: impl AsRef<Path>) -> crate::Result<()> {
        let spec = WavSpec {
            channels: 1,
            sample_rate: TARGET_SAMPLE_RATE,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };

        let mut writer = WavWriter::create(path, spec)?;
        for &sample in &self.samples {
            let clamped = sample.clamp(-1.0, 1.0);
            writer.write_sample((clamped * f32::from(i16::MAX)) as i16)?;
        }
        writer.finalize()?;
        Ok(())
    }
}

/// Probe the container and pick a default audio track.
///
/// Track selection policy: the first track that looks decodable (codec !=
/// NULL) and has a known sample rate, which resampling decisions need.
fn probe_source_and_pick_default_track(
    source: Box<dyn MediaSource>,
    hint_extension: Option<&str>,
) -> Result<(Box<dyn FormatReader>, Track)> {
    let mss_opts = MediaSourceStreamOptions {
        // Symphonia expects a power-of-two buffer > 32KiB for good probing behavior.
        buffer_len: 256 * 1024,
    };
    let mss = MediaSourceStream::new(source, mss_opts);

    let mut hint = Hint::new();
    if let Some(ext) = hint_extension {
        hint.with_extension(ext);
    }

    let format_opts: FormatOptions = Default::default();
    let metadata_opts: MetadataOptions = Default::default();

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &format_opts, &metadata_opts)
        .map_err(|e| anyhow!(e))
        .context("failed to probe media stream")?;

    let format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL && t.codec_params.sample_rate.is_some())
        .cloned()
        .ok_or_else(|| anyhow!("no audio track found"))?;

    Ok((format, track))
}

/// Create a decoder for the given audio track using Symphonia's default
/// codec registry.
fn make_decoder_for_track(track: &Track) -> Result<Box<dyn Decoder>> {
    let decoder_opts: DecoderOptions = Default::default();

    symphonia::default::get_codecs()
        .make(&track.codec_params, &decoder_opts)
        .map_err(|e| anyhow!(e))
        .context("failed to create decoder for audio track")
}

/// Read the next packet, treating IO errors as "end of stream".
fn next_packet(format: &mut Box<dyn FormatReader>) -> Result<Option<Packet>> {
    match format.next_packet() {
        Ok(p) => Ok(Some(p)),
        Err(SymphoniaError::IoError(_)) => Ok(None),
        Err(e) => Err(anyhow!(e)).context("failed reading packet"),
    }
}

/// Decode a packet and hand the decoded buffer to a callback.
///
/// Error handling policy:
/// - `DecodeError` → skip the bad frame (common with some codecs)
/// - `IoError`     → treat as end-of-stream
/// - other errors  → bubble up with context
fn decode_packet_and_then(
    decoder: &mut Box<dyn Decoder>,
    packet: &Packet,
    mut on_decoded: impl FnMut(AudioBufferRef<'_>) -> Result<()>,
) -> Result<bool> {
    match decoder.decode(packet) {
        Ok(buf) => {
            on_decoded(buf)?;
            Ok(true)
        }
        Err(SymphoniaError::DecodeError(_)) => Ok(false),
        Err(SymphoniaError::IoError(_)) => Ok(false),
        Err(e) => Err(anyhow!(e)).context("decoder failure"),
    }
}

fn ensure_sample_buffer(decoded: &AudioBufferRef<'_>, sample_buf: &mut Option<SampleBuffer<f32>>) {
    if sample_buf.is_some() {
        return;
    }

    let spec = *decoded.spec();
    let duration = decoded.capacity() as u64;
    *sample_buf = Some(SampleBuffer::<f32>::new(duration, spec));
}

/// Downmix interleaved samples into mono by averaging channels, appending to
/// the accumulator.
fn append_downmixed(interleaved: &[f32], channels: usize, mono: &mut Vec<f32>) {
    if channels == 1 {
        mono.extend_from_slice(interleaved);
        return;
    }

    let frames = interleaved.len() / channels;
    mono.reserve(frames);

    for f in 0..frames {
        let base = f * channels;
        let mut acc = 0.0;
        for c in 0..channels {
            acc += interleaved[base + c];
        }
        mono.push(acc / channels as f32);
    }
}

/// Resample a whole mono buffer to the target rate.
///
/// The source is zero-padded to a whole number of rubato input blocks and the
/// output truncated back to the length implied by the rate ratio, so padding
/// never inflates the reported duration.
fn resample_to_target(mut mono_src: Vec<f32>, src_rate: u32) -> Result<Vec<f32>> {
    let expected_len =
        (mono_src.len() as u64 * u64::from(TARGET_SAMPLE_RATE) / u64::from(src_rate)) as usize;

    // How many source frames we feed rubato per `process()` call.
    let in_chunk_src_frames = 2048;

    let mut resampler = SincFixedIn::<f32>::new(
        f64::from(TARGET_SAMPLE_RATE) / f64::from(src_rate),
        2.0,
        rubato::SincInterpolationParameters {
            sinc_len: 256,
            f_cutoff: 0.95,
            interpolation: rubato::SincInterpolationType::Linear,
            oversampling_factor: 256,
            window: WindowFunction::BlackmanHarris2,
        },
        in_chunk_src_frames,
        1, // mono
    )
    .map_err(|e| anyhow!(e))
    .context("failed to init resampler")?;

    let in_max = resampler.input_frames_max();
    let rem = mono_src.len() % in_max;
    if rem != 0 {
        mono_src.resize(mono_src.len() + (in_max - rem), 0.0);
    }

    let mut out = Vec::with_capacity(expected_len);
    for block in mono_src.chunks(in_max) {
        let input = vec![block.to_vec()];
        let processed = resampler
            .process(&input, None)
            .map_err(|e| anyhow!(e))
            .context("resampler process failed")?;
        if processed.len() != 1 {
            bail!("expected mono output from resampler");
        }
        out.extend_from_slice(&processed[0]);
    }

    out.truncate(expected_len);
    Ok(out)
}
