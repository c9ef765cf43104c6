use crate::Result;

/// One raw transcription hypothesis for a single slice of audio.
///
/// Times are seconds relative to the *start of the slice*, not the global
/// timeline; the reconciler rebases them. Text is carried verbatim, including
/// whatever leading or trailing whitespace the backend produced.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    pub start_seconds: f64,
    pub end_seconds: f64,
    pub text: String,
}

impl Fragment {
    pub fn new(start_seconds: f64, end_seconds: f64, text: impl Into<String>) -> Self {
        Self {
            start_seconds,
            end_seconds,
            text: text.into(),
        }
    }
}

/// Pluggable speech-to-text collaborator used by
/// [`Stitcher`](crate::stitcher::Stitcher).
///
/// A transcriber turns one clip of mono `f32` samples at the crate's target
/// sample rate into slice-local [`Fragment`]s. It is handed each planned
/// slice in timeline order and may keep mutable state (model contexts,
/// scratch buffers) between calls.
pub trait Transcriber {
    /// Transcribe a single clip.
    ///
    /// `language` is an optional hint (e.g. `"en"`); `None` asks the backend
    /// to auto-detect. Fragments must be returned in ascending start order.
    fn transcribe_clip(
        &mut self,
        samples_16k_mono: &[f32],
        language: Option<&str>,
    ) -> Result<Vec<Fragment>>;
}
