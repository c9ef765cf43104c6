//! Slice planning: cutting a timeline into overlapping transcription windows.
//!
//! Long recordings are transcribed in bounded slices. Every slice after the
//! first re-covers the tail of its predecessor so speech spanning a boundary
//! is heard twice; the reconciler later removes the duplicated span.

use crate::Result;
use crate::error::Error;

/// Default slice length.
pub const DEFAULT_SEGMENT_LENGTH_MS: u64 = 30_000;

/// Default re-covered tail between consecutive slices.
pub const DEFAULT_OVERLAP_MS: u64 = 5_000;

/// How a timeline is cut into overlapping slices.
///
/// Validated at construction: the slice length must be positive and the
/// overlap strictly shorter, so planning always makes progress. The fields
/// stay private so an unvalidated combination can't be smuggled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SliceConfig {
    segment_length_ms: u64,
    overlap_ms: u64,
}

impl Default for SliceConfig {
    fn default() -> Self {
        Self {
            segment_length_ms: DEFAULT_SEGMENT_LENGTH_MS,
            overlap_ms: DEFAULT_OVERLAP_MS,
        }
    }
}

impl SliceConfig {
    pub fn new(segment_length_ms: u64, overlap_ms: u64) -> Result<Self> {
        if segment_length_ms == 0 {
            return Err(Error::invalid_config("slice length must be positive"));
        }
        if overlap_ms >= segment_length_ms {
            return Err(Error::invalid_config(format!(
                "overlap ({overlap_ms}ms) must be shorter than the slice length ({segment_length_ms}ms)"
            )));
        }
        Ok(Self {
            segment_length_ms,
            overlap_ms,
        })
    }

    pub fn segment_length_ms(&self) -> u64 {
        self.segment_length_ms
    }

    pub fn overlap_ms(&self) -> u64 {
        self.overlap_ms
    }

    /// The overlap expressed in seconds, as the reconciler consumes it.
    pub fn overlap_seconds(&self) -> f64 {
        self.overlap_ms as f64 / 1000.0
    }

    /// Plan the windows covering `total_duration_ms`.
    ///
    /// The cursor advances by the full slice length every round; only the
    /// emitted *start* of a non-initial window steps back by the overlap.
    /// A zero-length timeline yields no windows.
    pub fn plan(&self, total_duration_ms: u64) -> Vec<SliceWindow> {
        let mut windows = Vec::new();
        let mut cursor = 0u64;

        while cursor < total_duration_ms {
            let is_first = windows.is_empty();
            let start_ms = if is_first {
                cursor
            } else {
                cursor.saturating_sub(self.overlap_ms)
            };
            let end_ms = (cursor + self.segment_length_ms).min(total_duration_ms);

            windows.push(SliceWindow {
                start_ms,
                end_ms,
                is_first,
            });

            cursor += self.segment_length_ms;
        }

        windows
    }
}

/// One planned slice of the timeline, bounds in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SliceWindow {
    /// Global start of the audio to transcribe, overlap included.
    pub start_ms: u64,

    /// Global end, clamped to the end of the timeline.
    pub end_ms: u64,

    /// The first window has no predecessor, so its output is kept in full.
    pub is_first: bool,
}
