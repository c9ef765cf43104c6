//! `substitch` — batch audio transcription stitched into subtitle documents.
//!
//! This crate provides:
//! - Slice planning that cuts long recordings into overlapping windows
//! - Reconciliation of per-slice transcriptions onto one global timeline
//! - Short-cue merging so output reads as subtitles, not word confetti
//! - A permissive WebVTT reader, a strict writer, and JSON output
//! - Audio decoding/normalization for anything Symphonia can read
//!
//! The library is designed to be used by both CLI tools and batch jobs, with
//! an emphasis on deterministic output and minimal surprises.

// High-level API (most consumers should start here).
pub mod opts;
pub mod stitcher;

// Timeline math: slicing, rebasing, merging.
pub mod merge;
pub mod reconcile;
pub mod slicer;

// Cue data structures and timestamp handling.
pub mod cue;
pub mod timecode;

// Audio decoding and clip extraction.
pub mod audio;

// Transcription collaborators.
pub mod backends;
pub mod transcriber;

// Output selection and encoder interfaces.
pub mod cue_encoder;
pub mod output_type;

// Cue serialization and the permissive subtitle parser.
pub mod json_array_encoder;
pub mod vtt_encoder;
pub mod vtt_parser;

// Logging configuration and control.
#[cfg(feature = "logging")]
pub mod logging;

mod error;

pub use error::{Error, Result};
