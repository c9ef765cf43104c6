//! High-level API for slicing, transcribing, and stitching a recording.
//!
//! We expose a single, ergonomic entry point (`Stitcher`) that wires the
//! pipeline together: plan slices → clip audio → transcribe each clip →
//! rebase onto the global timeline → fold short cues → encode.
//!
//! The intent is:
//! - The transcription collaborator is constructed once (model loading is
//!   the expensive part) and reused across many recordings.
//! - Slices are processed strictly in window order; the reconciler's trim
//!   for window N assumes window N-1 already contributed its cues.
//! - Callers choose output format and tuning via `Opts`.

use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::{debug, info};

use crate::Result;
use crate::audio::AudioTimeline;
use crate::cue::Cue;
use crate::cue_encoder::CueEncoder;
use crate::json_array_encoder::JsonArrayEncoder;
use crate::merge::merge_short_cues;
use crate::opts::Opts;
use crate::output_type::OutputType;
use crate::reconcile::rebase_fragments;
use crate::transcriber::Transcriber;
use crate::vtt_encoder::VttEncoder;

#[cfg(feature = "backend-whisper")]
use crate::backends::whisper::WhisperTranscriber;

/// The main high-level entry point.
///
/// `Stitcher` owns the long-lived transcription collaborator plus the
/// options, and processes one recording at a time. Instances hold no
/// cross-file state, so batch callers can construct one per worker.
pub struct Stitcher<T: Transcriber> {
    transcriber: T,
    opts: Opts,
}

#[cfg(feature = "backend-whisper")]
impl Stitcher<WhisperTranscriber> {
    /// Create a stitcher backed by a whisper.cpp model loaded from disk.
    pub fn from_model_path(model_path: &str, opts: Opts) -> Result<Self> {
        let transcriber = WhisperTranscriber::new(model_path)?;
        Ok(Self::new(transcriber, opts))
    }
}

impl<T: Transcriber> Stitcher<T> {
    /// Create a stitcher using a custom transcription collaborator.
    pub fn new(transcriber: T, opts: Opts) -> Self {
        Self { transcriber, opts }
    }

    pub fn opts(&self) -> &Opts {
        &self.opts
    }

    /// Access the configured transcriber.
    pub fn transcriber(&self) -> &T {
        &self.transcriber
    }

    /// Transcribe a whole timeline into merged, globally-timestamped cues.
    pub fn stitch_timeline(&mut self, timeline: &AudioTimeline) -> Result<Vec<Cue>> {
        let total_duration_ms = timeline.duration_ms();
        let windows = self.opts.slice.plan(total_duration_ms);
        info!(
            total_duration_ms,
            slices = windows.len(),
            "planned transcription slices"
        );

        let mut cues: Vec<Cue> = Vec::new();
        for window in &windows {
            debug!(
                start_ms = window.start_ms,
                end_ms = window.end_ms,
                "transcribing slice"
            );

            let clip = timeline.clip(window.start_ms, window.end_ms);
            let fragments = self
                .transcriber
                .transcribe_clip(clip.samples(), self.opts.language.as_deref())?;
            debug!(fragments = fragments.len(), "slice transcribed");

            cues.extend(rebase_fragments(fragments, window, &self.opts.slice));
        }

        Ok(merge_short_cues(cues, self.opts.merge_threshold_seconds))
    }

    /// Transcribe an audio file and stream the encoded document to `w`.
    ///
    /// Returns the number of cues written.
    pub fn stitch_file<W: Write>(&mut self, path: impl AsRef<Path>, w: W) -> Result<usize> {
        let timeline = AudioTimeline::open(path)?;
        let cues = self.stitch_timeline(&timeline)?;
        encode_cues(&cues, self.opts.output_type, w)?;
        Ok(cues.len())
    }
}

/// Encode finished cues to a writer in the requested format.
///
/// The writer is buffered here, and the encoder is always closed even when a
/// write fails partway, so the underlying writer gets flushed.
pub fn encode_cues<W: Write>(cues: &[Cue], output_type: OutputType, w: W) -> Result<()> {
    let writer = BufWriter::new(w);

    // Select an encoder based on the requested output type.
    // We keep this explicit (no trait objects) to avoid lifetime surprises.
    match output_type {
        OutputType::Vtt => {
            let mut encoder = VttEncoder::new(writer);
            let run_res = write_all_cues(cues, &mut encoder);
            merge_run_and_close(run_res, encoder.close())
        }
        OutputType::Json => {
            let mut encoder = JsonArrayEncoder::new(writer);
            let run_res = write_all_cues(cues, &mut encoder);
            merge_run_and_close(run_res, encoder.close())
        }
    }
}

fn write_all_cues<E: CueEncoder>(cues: &[Cue], encoder: &mut E) -> Result<()> {
    for cue in cues {
        encoder.write_cue(cue)?;
    }
    Ok(())
}

fn merge_run_and_close(run_res: Result<()>, close_res: Result<()>) -> Result<()> {
    match (run_res, close_res) {
        (Ok(()), Ok(())) => Ok(()),
        (Ok(()), Err(close_err)) => Err(close_err),
        (Err(err), Ok(())) => Err(err),
        (Err(err), Err(close_err)) => {
            debug!(error = %close_err, "encoder close also failed");
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::slicer::SliceConfig;
    use crate::transcriber::Fragment;

    /// Scripted transcriber: returns one canned fragment batch per call and
    /// records what it was handed.
    struct Scripted {
        per_call: Vec<Vec<Fragment>>,
        calls: usize,
        clip_lengths: Vec<usize>,
        languages: Vec<Option<String>>,
    }

    impl Scripted {
        fn new(per_call: Vec<Vec<Fragment>>) -> Self {
            Self {
                per_call,
                calls: 0,
                clip_lengths: Vec::new(),
                languages: Vec::new(),
            }
        }
    }

    impl Transcriber for Scripted {
        fn transcribe_clip(
            &mut self,
            samples_16k_mono: &[f32],
            language: Option<&str>,
        ) -> crate::Result<Vec<Fragment>> {
            self.clip_lengths.push(samples_16k_mono.len());
            self.languages.push(language.map(str::to_owned));
            let batch = self.per_call.get(self.calls).cloned().unwrap_or_default();
            self.calls += 1;
            Ok(batch)
        }
    }

    struct Exploding;

    impl Transcriber for Exploding {
        fn transcribe_clip(
            &mut self,
            _samples_16k_mono: &[f32],
            _language: Option<&str>,
        ) -> crate::Result<Vec<Fragment>> {
            Err(Error::msg("backend exploded"))
        }
    }

    fn silent_timeline(duration_ms: u64) -> AudioTimeline {
        AudioTimeline::from_samples(vec![0.0; (duration_ms * 16) as usize])
    }

    fn opts() -> Opts {
        Opts {
            language: Some("en".to_string()),
            slice: SliceConfig::new(30_000, 5_000).expect("valid config"),
            ..Opts::default()
        }
    }

    #[test]
    fn stitches_slices_into_globally_timed_cues() -> anyhow::Result<()> {
        // 65s of audio: slices (0,30000), (25000,60000), (55000,65000).
        let scripted = Scripted::new(vec![
            vec![
                Fragment::new(0.0, 2.0, "hello"),
                Fragment::new(2.0, 29.0, "world"),
            ],
            vec![
                // Global 27.0-29.0, inside the 30.0 cutoff: dropped.
                Fragment::new(2.0, 4.0, "duplicate tail"),
                Fragment::new(6.0, 8.0, "fresh"),
            ],
            vec![Fragment::new(5.5, 9.5, "ending")],
        ]);

        let mut stitcher = Stitcher::new(scripted, opts());
        let cues = stitcher.stitch_timeline(&silent_timeline(65_000))?;

        assert_eq!(
            cues,
            vec![
                Cue::new(0.0, 2.0, "hello"),
                Cue::new(2.0, 29.0, "world"),
                Cue::new(31.0, 33.0, "fresh"),
                Cue::new(60.5, 64.5, "ending"),
            ]
        );

        // Each slice was handed exactly its window of audio, in order.
        assert_eq!(
            stitcher.transcriber().clip_lengths,
            vec![30_000 * 16, 35_000 * 16, 10_000 * 16]
        );
        assert_eq!(
            stitcher.transcriber().languages,
            vec![Some("en".into()), Some("en".into()), Some("en".into())]
        );
        Ok(())
    }

    #[test]
    fn short_cues_are_folded_after_reconciliation() -> anyhow::Result<()> {
        let scripted = Scripted::new(vec![vec![
            Fragment::new(0.0, 0.8, "a"),
            Fragment::new(0.8, 1.6, "b"),
            Fragment::new(1.6, 4.0, "c"),
        ]]);

        let mut stitcher = Stitcher::new(scripted, opts());
        let cues = stitcher.stitch_timeline(&silent_timeline(4_000))?;

        assert_eq!(
            cues,
            vec![Cue::new(0.0, 1.6, "a b"), Cue::new(1.6, 4.0, "c")]
        );
        Ok(())
    }

    #[test]
    fn an_empty_timeline_produces_no_cues_and_no_backend_calls() -> anyhow::Result<()> {
        let mut stitcher = Stitcher::new(Scripted::new(Vec::new()), opts());
        let cues = stitcher.stitch_timeline(&AudioTimeline::from_samples(Vec::new()))?;

        assert!(cues.is_empty());
        assert_eq!(stitcher.transcriber().calls, 0);
        Ok(())
    }

    #[test]
    fn backend_failures_propagate() {
        let mut stitcher = Stitcher::new(Exploding, opts());
        let err = stitcher
            .stitch_timeline(&silent_timeline(1_000))
            .unwrap_err();
        assert!(err.to_string().contains("backend exploded"));
    }

    #[test]
    fn encode_cues_writes_the_requested_format() -> anyhow::Result<()> {
        let cues = vec![Cue::new(0.0, 1.5, "hi"), Cue::new(1.5, 3.0, "there")];

        let mut vtt = Vec::new();
        encode_cues(&cues, OutputType::Vtt, &mut vtt)?;
        let vtt = String::from_utf8(vtt)?;
        assert!(vtt.starts_with("WEBVTT\n\n"));
        assert!(vtt.contains("0\n00:00:00.000 --> 00:00:01.500\nhi\n"));

        let mut json = Vec::new();
        encode_cues(&cues, OutputType::Json, &mut json)?;
        let parsed: serde_json::Value = serde_json::from_slice(&json)?;
        assert_eq!(parsed.as_array().map(Vec::len), Some(2));
        assert_eq!(parsed[1]["text"], "there");
        Ok(())
    }

    #[test]
    fn encode_cues_with_no_cues_still_yields_valid_documents() -> anyhow::Result<()> {
        let mut vtt = Vec::new();
        encode_cues(&[], OutputType::Vtt, &mut vtt)?;
        assert_eq!(String::from_utf8(vtt)?, "WEBVTT\n\n");

        let mut json = Vec::new();
        encode_cues(&[], OutputType::Json, &mut json)?;
        assert_eq!(String::from_utf8(json)?, "[]");
        Ok(())
    }
}
