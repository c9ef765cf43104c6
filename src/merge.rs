//! Short-segment merging: folding spuriously short cues into their
//! predecessor. A clipped breath or half-word hypothesis reads better glued
//! to the preceding line than flashing on screen for a few hundred ms.

use crate::cue::Cue;

/// Default duration below which a cue is folded into its predecessor.
pub const DEFAULT_MERGE_THRESHOLD_SECONDS: f64 = 1.0;

/// Fold every cue shorter than `threshold_seconds` into the cue before it.
///
/// The first cue always seeds the accumulator, short or not. Folding extends
/// the accumulator's end and space-joins the trimmed texts. The pass is
/// idempotent: every emitted cue except possibly the first entered with a
/// duration of at least the threshold, so a second run folds nothing more.
pub fn merge_short_cues(cues: Vec<Cue>, threshold_seconds: f64) -> Vec<Cue> {
    let mut merged: Vec<Cue> = Vec::with_capacity(cues.len());

    for cue in cues {
        let Some(previous) = merged.last_mut() else {
            merged.push(cue);
            continue;
        };

        if cue.duration_seconds() < threshold_seconds {
            previous.end_seconds = cue.end_seconds;
            previous.text = join_cue_text(&previous.text, &cue.text);
        } else {
            merged.push(cue);
        }
    }

    merged
}

/// Trim both pieces, space-join, trim the result. Either piece may be empty.
fn join_cue_text(left: &str, right: &str) -> String {
    format!("{} {}", left.trim(), right.trim())
        .trim()
        .to_string()
}
