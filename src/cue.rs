use serde::{Deserialize, Serialize};

/// One timestamped subtitle unit on the global timeline.
///
/// Times are seconds as `f64` so that millisecond precision survives multi-hour
/// recordings. Documents produced by this crate keep cues in non-decreasing
/// `start_seconds` order; adjacent cues may still overlap (overlap removal across
/// slices is best-effort, not a general interval merge).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cue {
    #[serde(rename = "start")]
    pub start_seconds: f64,
    #[serde(rename = "end")]
    pub end_seconds: f64,
    pub text: String,
}

impl Cue {
    pub fn new(start_seconds: f64, end_seconds: f64, text: impl Into<String>) -> Self {
        Self {
            start_seconds,
            end_seconds,
            text: text.into(),
        }
    }

    pub fn duration_seconds(&self) -> f64 {
        self.end_seconds - self.start_seconds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_is_end_minus_start() {
        let cue = Cue::new(1.5, 4.0, "hello");
        assert!((cue.duration_seconds() - 2.5).abs() < 1e-9);
    }

    #[test]
    fn serializes_with_short_field_names() -> anyhow::Result<()> {
        let cue = Cue::new(0.0, 1.25, "hi");
        let json = serde_json::to_value(&cue)?;
        assert_eq!(json["start"], 0.0);
        assert_eq!(json["end"], 1.25);
        assert_eq!(json["text"], "hi");

        let back: Cue = serde_json::from_value(json)?;
        assert_eq!(back, cue);
        Ok(())
    }
}
