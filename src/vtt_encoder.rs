use std::io::Write;

use crate::Result;
use crate::cue::Cue;
use crate::cue_encoder::CueEncoder;
use crate::error::Error;
use crate::timecode::format_timestamp;

/// A `CueEncoder` that writes cues in WebVTT format.
///
/// Design:
/// - We stream output directly to a `Write` implementation.
/// - We write the WebVTT header lazily on the first cue so that callers can
///   construct the encoder without immediately writing output.
/// - `close` on an empty document still emits the header, so every finished
///   document is valid WebVTT even when no cues were written.
pub struct VttEncoder<W: Write> {
    /// The underlying writer we stream VTT into.
    w: W,

    /// 0-based index for the next cue's numeric id line.
    next_index: usize,

    /// Whether we've written the `WEBVTT` header.
    started: bool,

    /// Whether the encoder has been closed.
    closed: bool,
}

impl<W: Write> VttEncoder<W> {
    /// Create a new VTT encoder that writes to the provided writer.
    pub fn new(w: W) -> Self {
        Self {
            w,
            next_index: 0,
            started: false,
            closed: false,
        }
    }

    /// Write the WebVTT header if we haven't written it yet.
    fn start_if_needed(&mut self) -> Result<()> {
        if !self.started {
            // WebVTT files begin with a mandatory header line followed by a blank line.
            self.w.write_all(b"WEBVTT\n\n")?;
            self.started = true;
        }
        Ok(())
    }
}

impl<W: Write> CueEncoder for VttEncoder<W> {
    /// Write a single cue in WebVTT format.
    fn write_cue(&mut self, cue: &Cue) -> Result<()> {
        if self.closed {
            return Err(Error::msg("cannot write cue: encoder is already closed"));
        }

        self.start_if_needed()?;

        // Repair invalid timing fields rather than rejecting the cue: an
        // unusable start pins to zero, and an end that is unusable or does
        // not advance past the start gets a half-second display window.
        let start_seconds = if cue.start_seconds.is_finite() {
            cue.start_seconds
        } else {
            0.0
        };
        let end_seconds = if cue.end_seconds.is_finite() && cue.end_seconds > start_seconds {
            cue.end_seconds
        } else {
            start_seconds + 0.5
        };

        let start = format_timestamp(start_seconds);
        let end = format_timestamp(end_seconds);

        // Numeric cue id line. Optional in WebVTT, but handy when eyeballing
        // output, and the parser drops it on the way back in.
        writeln!(&mut self.w, "{}", self.next_index)?;
        self.next_index += 1;

        // Cue timing line.
        writeln!(&mut self.w, "{start} --> {end}")?;

        // Cue text. Interior blank lines would end the cue early on re-parse,
        // so runs of line breaks collapse to a single break.
        writeln!(&mut self.w, "{}", normalize_cue_text(&cue.text))?;

        // Blank line separates cues.
        writeln!(&mut self.w)?;

        // Flush so streaming consumers (stdout, pipes) see output promptly.
        self.w.flush()?;

        Ok(())
    }

    /// Emit the header if nothing was written, then flush. Idempotent.
    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }

        self.start_if_needed()?;
        self.w.flush()?;
        self.closed = true;

        Ok(())
    }
}

/// Trim cue text and collapse blank lines so the cue stays one block.
fn normalize_cue_text(text: &str) -> String {
    let unified = text.replace("\r\n", "\n").replace('\r', "\n");
    let lines: Vec<&str> = unified
        .trim()
        .split('\n')
        .filter(|line| !line.is_empty())
        .collect();
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn close_without_cues_still_emits_header() -> anyhow::Result<()> {
        let mut out = Vec::new();
        let mut enc = VttEncoder::new(&mut out);
        enc.close()?;
        assert_eq!(std::str::from_utf8(&out)?, "WEBVTT\n\n");
        Ok(())
    }

    #[test]
    fn writes_header_once_and_numbers_cues_from_zero() -> anyhow::Result<()> {
        let mut out = Vec::new();
        let mut enc = VttEncoder::new(&mut out);

        enc.write_cue(&Cue::new(0.0, 1.25, "hello"))?;
        enc.write_cue(&Cue::new(61.2, 62.0, "world"))?;
        enc.close()?;

        let s = std::str::from_utf8(&out)?;
        assert!(s.starts_with("WEBVTT\n\n"));
        assert!(s.contains("0\n00:00:00.000 --> 00:00:01.250\nhello\n\n"));
        assert!(s.contains("1\n00:01:01.200 --> 00:01:02.000\nworld\n\n"));
        assert_eq!(s.matches("WEBVTT\n\n").count(), 1);
        Ok(())
    }

    #[test]
    fn trims_text_and_collapses_blank_lines() -> anyhow::Result<()> {
        let mut out = Vec::new();
        let mut enc = VttEncoder::new(&mut out);
        enc.write_cue(&Cue::new(0.0, 2.0, "  first line\n\n\nsecond line \n"))?;
        enc.close()?;

        let s = std::str::from_utf8(&out)?;
        assert!(s.contains("00:00:00.000 --> 00:00:02.000\nfirst line\nsecond line\n\n"));
        Ok(())
    }

    #[test]
    fn repairs_non_finite_timing_fields() -> anyhow::Result<()> {
        let mut out = Vec::new();
        let mut enc = VttEncoder::new(&mut out);
        enc.write_cue(&Cue::new(f64::NAN, f64::NAN, "pinned"))?;
        enc.write_cue(&Cue::new(3.0, f64::INFINITY, "windowed"))?;
        enc.close()?;

        let s = std::str::from_utf8(&out)?;
        assert!(s.contains("00:00:00.000 --> 00:00:00.500\npinned"));
        assert!(s.contains("00:00:03.000 --> 00:00:03.500\nwindowed"));
        Ok(())
    }

    #[test]
    fn repairs_inverted_and_zero_length_timing() -> anyhow::Result<()> {
        let mut out = Vec::new();
        let mut enc = VttEncoder::new(&mut out);
        enc.write_cue(&Cue::new(5.0, 5.0, "degenerate"))?;
        enc.write_cue(&Cue::new(10.0, 8.0, "inverted"))?;
        enc.close()?;

        let s = std::str::from_utf8(&out)?;
        assert!(s.contains("00:00:05.000 --> 00:00:05.500\ndegenerate"));
        assert!(s.contains("00:00:10.000 --> 00:00:10.500\ninverted"));
        Ok(())
    }

    #[test]
    fn write_after_close_errors() -> anyhow::Result<()> {
        let mut out = Vec::new();
        let mut enc = VttEncoder::new(&mut out);
        enc.close()?;
        let err = enc.write_cue(&Cue::new(0.0, 1.0, "nope")).unwrap_err();
        assert!(err.to_string().contains("already closed"));
        Ok(())
    }
}
