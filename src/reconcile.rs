//! Overlap reconciliation: rebasing slice-local fragments onto the global
//! timeline and trimming the span already covered by the previous slice.
//!
//! Trimming is purely time-based. Fragments that straddle the cutoff keep
//! their tail, so a boundary word can still appear twice when the backend
//! splits it differently in the two slices; that is an accepted trade-off
//! against fuzzy text deduplication.

use tracing::debug;

use crate::cue::Cue;
use crate::slicer::{SliceConfig, SliceWindow};
use crate::transcriber::Fragment;

/// Convert one slice's fragments into globally-timestamped cues.
///
/// Every fragment is shifted by the window's start. For a non-initial window,
/// anything starting inside the re-covered overlap is pushed forward to the
/// cutoff, and fragments that never escape the overlap are dropped. Text is
/// carried verbatim and fragment order is preserved.
pub fn rebase_fragments(
    fragments: Vec<Fragment>,
    window: &SliceWindow,
    config: &SliceConfig,
) -> Vec<Cue> {
    let offset = window.start_ms as f64 / 1000.0;
    let cutoff = offset + config.overlap_seconds();

    let mut cues = Vec::with_capacity(fragments.len());
    for fragment in fragments {
        let mut start = fragment.start_seconds + offset;
        let end = fragment.end_seconds + offset;

        if !window.is_first && start < cutoff {
            start = cutoff;
            if start >= end {
                // Wholly inside the overlap; the previous slice already
                // carries this span.
                debug!(
                    fragment_start = fragment.start_seconds,
                    fragment_end = fragment.end_seconds,
                    cutoff,
                    "dropping fragment contained in the slice overlap"
                );
                continue;
            }
        }

        cues.push(Cue::new(start, end, fragment.text));
    }
    cues
}
