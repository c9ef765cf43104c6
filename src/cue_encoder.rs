use crate::Result;
use crate::cue::Cue;

/// Incrementally encodes cues into an output format.
///
/// Implementations write each cue as it arrives and emit any trailing
/// structure (closing brackets, a header for an otherwise-empty document)
/// when [`CueEncoder::close`] is called. `close` must be called exactly once,
/// after the final cue; writing after close is an error.
pub trait CueEncoder {
    /// Encode a single cue to the underlying writer.
    fn write_cue(&mut self, cue: &Cue) -> Result<()>;

    /// Finalize the document and flush the underlying writer.
    fn close(&mut self) -> Result<()>;
}
