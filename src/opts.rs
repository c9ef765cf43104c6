use crate::merge::DEFAULT_MERGE_THRESHOLD_SECONDS;
use crate::output_type::OutputType;
use crate::slicer::SliceConfig;

/// Options that control how a stitched transcription is performed.
///
/// This struct represents *library-level configuration*, not CLI flags directly.
/// The CLI is responsible for mapping user input into this type so that:
/// - the library remains reusable outside of a CLI context
/// - other frontends (APIs, tests, batch jobs) can construct options programmatically
#[derive(Debug, Clone)]
pub struct Opts {
    /// Optional language hint (e.g. `"en"`, `"es"`).
    ///
    /// When `None`, the transcription backend auto-detects the spoken language.
    pub language: Option<String>,

    /// The desired output format for finished cues.
    pub output_type: OutputType,

    /// How the timeline is cut into overlapping slices.
    pub slice: SliceConfig,

    /// Cues shorter than this many seconds are folded into their predecessor
    /// after reconciliation.
    pub merge_threshold_seconds: f64,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            language: None,
            output_type: OutputType::default(),
            slice: SliceConfig::default(),
            merge_threshold_seconds: DEFAULT_MERGE_THRESHOLD_SECONDS,
        }
    }
}
