use std::os::raw::{c_char, c_void};
use std::sync::Once;

use anyhow::Context;
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

use crate::Result;
use crate::transcriber::{Fragment, Transcriber};

/// Built-in transcription collaborator powered by `whisper-rs` / `whisper.cpp`.
///
/// One loaded model serves the whole batch; a fresh inference state is
/// created per clip so no context bleeds between slices (the reconciler
/// depends on each slice being transcribed independently).
pub struct WhisperTranscriber {
    ctx: WhisperContext,
}

impl WhisperTranscriber {
    /// Load a whisper.cpp model from disk.
    pub fn new(model_path: &str) -> Result<Self> {
        // whisper.cpp is chatty on stderr; quiet it before touching the model.
        silence_whisper_logging();

        let ctx_params = WhisperContextParameters::default();
        let ctx = WhisperContext::new_with_params(model_path, ctx_params)
            .with_context(|| format!("failed to load model from path: {model_path}"))?;

        Ok(Self { ctx })
    }

    /// Access the underlying Whisper context.
    pub fn context(&self) -> &WhisperContext {
        &self.ctx
    }
}

impl Transcriber for WhisperTranscriber {
    fn transcribe_clip(
        &mut self,
        samples_16k_mono: &[f32],
        language: Option<&str>,
    ) -> Result<Vec<Fragment>> {
        let mut params = FullParams::new(SamplingStrategy::BeamSearch {
            beam_size: 5,
            patience: 1.0,
        });

        params.set_n_threads(num_cpus::get() as i32);
        params.set_translate(false);
        params.set_language(language);
        params.set_no_context(true);
        params.set_single_segment(false);
        params.set_print_progress(false);
        params.set_print_special(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);

        let mut state = self
            .ctx
            .create_state()
            .context("failed to create whisper state")?;

        state
            .full(params, samples_16k_mono)
            .context("failed to run whisper inference")?;

        let mut fragments = Vec::new();
        for segment in state.as_iter() {
            // Whisper timestamps are centiseconds; -1 marks "unknown".
            let start_seconds = centiseconds_to_seconds(segment.start_timestamp());
            let end_seconds = centiseconds_to_seconds(segment.end_timestamp());
            let text = segment
                .to_str()
                .context("failed to read segment text")?
                .to_owned();

            fragments.push(Fragment {
                start_seconds,
                end_seconds,
                text,
            });
        }

        Ok(fragments)
    }
}

fn centiseconds_to_seconds(value: i64) -> f64 {
    if value < 0 { 0.0 } else { value as f64 / 100.0 }
}

/// A no-op log callback used to silence logs emitted by whisper.cpp.
unsafe extern "C" fn whisper_log_callback(
    _level: u32,
    _c_msg: *const c_char,
    _user_data: *mut c_void,
) {
    // Intentionally left empty.
}

/// Ensure whisper logging is configured exactly once for the lifetime of the process.
fn silence_whisper_logging() {
    static INIT: Once = Once::new();

    INIT.call_once(|| unsafe {
        whisper_rs::set_log_callback(Some(whisper_log_callback), std::ptr::null_mut());
    });
}
