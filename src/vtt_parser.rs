//! Permissive WebVTT reader.
//!
//! Subtitle files in the wild are frequently hand-edited: stray ids, odd
//! whitespace, SRT-style comma decimals, missing headers. The parser here
//! salvages every block it can and silently drops the rest. A hard error is
//! reserved for a document that cannot be read at all.

use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use anyhow::Context;
use regex::Regex;
use tracing::debug;

use crate::Result;
use crate::cue::Cue;
use crate::timecode::parse_timestamp;

/// Matches a cue timing line: `HH:MM:SS` or `MM:SS` shapes, `.` or `,`
/// before exactly three fractional digits, with optional whitespace around
/// the arrow. Unanchored, so trailing cue settings don't break the match.
static TIMING_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?P<start>\d{2}:\d{2}:\d{2}[.,]\d{3}|\d{2}:\d{2}[.,]\d{3})\s*-->\s*(?P<end>\d{2}:\d{2}:\d{2}[.,]\d{3}|\d{2}:\d{2}[.,]\d{3})",
    )
    .expect("invalid cue timing pattern")
});

/// Matches the `WEBVTT` header line plus any metadata lines up to and
/// including the first blank line.
static HEADER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^WEBVTT.*?\n\n").expect("invalid header pattern"));

/// Cue blocks are separated by one or more blank lines.
static BLOCK_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{2,}").expect("invalid block separator pattern"));

/// A line that is nothing but a cue index.
static INDEX_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+$").expect("invalid index line pattern"));

/// Parse a WebVTT document into cues, in document order.
///
/// Malformed blocks never fail the whole document; they are skipped. See the
/// module docs for the tolerance rules.
pub fn parse_vtt(input: &str) -> Vec<Cue> {
    let input = input.strip_prefix('\u{feff}').unwrap_or(input);

    // Normalize line endings up front so every later step can assume `\n`.
    let normalized = input.replace("\r\n", "\n").replace('\r', "\n");

    // Strip the header block at most once. A document without a blank line
    // after `WEBVTT` keeps it, and the header line falls into the first cue
    // block like any other non-timing line.
    let body = HEADER_PATTERN.replacen(&normalized, 1, "");

    let mut cues = Vec::new();
    for block in BLOCK_SEPARATOR.split(body.trim()) {
        if let Some(cue) = parse_block(block) {
            cues.push(cue);
        }
    }
    cues
}

/// Read and parse a WebVTT file from disk.
pub fn read_vtt_file(path: impl AsRef<Path>) -> Result<Vec<Cue>> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read subtitle file {}", path.display()))?;
    Ok(parse_vtt(&raw))
}

/// Parse one blank-line-delimited block into a cue, or `None` to skip it.
fn parse_block(block: &str) -> Option<Cue> {
    let block = block.trim();
    if block.is_empty() {
        return None;
    }

    // Comment blocks contribute nothing.
    if starts_with_keyword(block, "NOTE") {
        return None;
    }

    let lines: Vec<&str> = block.lines().collect();

    let Some(timing_index) = lines.iter().position(|line| line.contains("-->")) else {
        debug!("skipping cue block without a timing line");
        return None;
    };

    let timing_line = lines[timing_index];
    let timing = extract_timing(timing_line).or_else(|| {
        // Hand-edited files sometimes pad the arrow with tabs.
        let relaxed = timing_line.replace('\t', " ");
        extract_timing(relaxed.trim())
    });
    let Some((start_seconds, end_seconds)) = timing else {
        debug!(line = timing_line, "skipping cue block with unparseable timing line");
        return None;
    };

    let mut text_lines: Vec<&str> = Vec::new();
    for (index, line) in lines.iter().copied().enumerate() {
        if index == timing_index {
            continue;
        }
        let trimmed = line.trim();
        // A bare cue index carries no content.
        if INDEX_LINE.is_match(trimmed) {
            continue;
        }
        // Style and region directives are format machinery, not dialogue.
        if starts_with_keyword(trimmed, "STYLE") || starts_with_keyword(trimmed, "REGION") {
            continue;
        }
        text_lines.push(line);
    }
    let text = text_lines.join("\n").trim().to_string();

    Some(Cue::new(start_seconds, end_seconds, text))
}

/// Pull `(start, end)` seconds out of a timing line, if it matches.
fn extract_timing(line: &str) -> Option<(f64, f64)> {
    let captures = TIMING_PATTERN.captures(line)?;
    let start = parse_timestamp(&captures["start"]);
    let end = parse_timestamp(&captures["end"]);
    Some((start, end))
}

/// Case-insensitive ASCII prefix test.
fn starts_with_keyword(text: &str, keyword: &str) -> bool {
    text.len() >= keyword.len()
        && text.as_bytes()[..keyword.len()].eq_ignore_ascii_case(keyword.as_bytes())
}
