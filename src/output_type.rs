#[cfg(feature = "cli")]
use clap::ValueEnum;

/// The supported output formats for finished cues.
///
/// Why this exists:
/// - We want a single, strongly-typed representation of output formats
///   across the CLI and library code.
/// - Using an enum avoids stringly-typed conditionals and keeps format
///   selection explicit and discoverable.
///
/// Integration notes:
/// - With the `cli` feature, `ValueEnum` lets this enum be used directly as
///   a clap flag value.
/// - Each variant maps to a concrete `CueEncoder` implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "cli", derive(ValueEnum))]
pub enum OutputType {
    /// Output cues in WebVTT subtitle format.
    #[default]
    Vtt,

    /// Output cues as a JSON array.
    Json,
}

impl OutputType {
    /// The conventional file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputType::Vtt => "vtt",
            OutputType::Json => "json",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extensions_match_the_formats() {
        assert_eq!(OutputType::Vtt.extension(), "vtt");
        assert_eq!(OutputType::Json.extension(), "json");
    }

    #[test]
    fn vtt_is_the_default() {
        assert_eq!(OutputType::default(), OutputType::Vtt);
    }
}
