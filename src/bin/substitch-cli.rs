// Batch transcription CLI: point it at an audio file or a directory and it
// writes one subtitle document per input, stitched from overlapping slices.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{error, info};
use walkdir::WalkDir;

use substitch::merge::DEFAULT_MERGE_THRESHOLD_SECONDS;
use substitch::opts::Opts;
use substitch::output_type::OutputType;
use substitch::slicer::{DEFAULT_OVERLAP_MS, DEFAULT_SEGMENT_LENGTH_MS, SliceConfig};
use substitch::stitcher::Stitcher;
use substitch::transcriber::Transcriber;

/// Extensions considered transcribable when scanning a directory.
const AUDIO_EXTENSIONS: &[&str] = &[
    "aac", "flac", "m4a", "mka", "mp3", "ogg", "opus", "wav", "webm",
];

#[derive(Parser, Debug)]
#[command(name = "substitch")]
#[command(about = "Batch-transcribe audio files into subtitle documents")]
struct Args {
    /// Path to a ggml Whisper model.
    #[arg(short = 'm', long = "model")]
    model_path: String,

    /// An audio file, or a directory scanned recursively for audio files.
    #[arg(short = 'i', long = "input")]
    input: PathBuf,

    /// Directory subtitle documents are written to.
    ///
    /// Defaults to placing each document next to its source audio file.
    #[arg(short = 'o', long = "output-dir")]
    output_dir: Option<PathBuf>,

    /// Language hint (e.g. "en"); omit to auto-detect per file.
    #[arg(short = 'l', long = "language")]
    language: Option<String>,

    #[arg(
        long = "output-type",
        value_enum,
        default_value_t = OutputType::Vtt
    )]
    output_type: OutputType,

    /// Length of each transcription slice in milliseconds.
    #[arg(long = "segment-length-ms", default_value_t = DEFAULT_SEGMENT_LENGTH_MS)]
    segment_length_ms: u64,

    /// How far each slice reaches back into its predecessor, in milliseconds.
    #[arg(long = "overlap-ms", default_value_t = DEFAULT_OVERLAP_MS)]
    overlap_ms: u64,

    /// Cues shorter than this many seconds are folded into their predecessor.
    #[arg(long = "merge-threshold-seconds", default_value_t = DEFAULT_MERGE_THRESHOLD_SECONDS)]
    merge_threshold_seconds: f64,
}

fn main() -> ExitCode {
    substitch::logging::init();

    match run() {
        Ok(0) => ExitCode::SUCCESS,
        Ok(failed) => {
            eprintln!("{failed} file(s) failed; see log output for details");
            ExitCode::FAILURE
        }
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

/// Run the batch. Returns the number of files that failed; per-file errors
/// are reported and skipped so one broken input doesn't sink the batch.
fn run() -> Result<usize> {
    let args = Args::parse();

    let slice = SliceConfig::new(args.segment_length_ms, args.overlap_ms)?;
    let opts = Opts {
        language: args.language.clone(),
        output_type: args.output_type,
        slice,
        merge_threshold_seconds: args.merge_threshold_seconds,
    };

    let inputs = collect_inputs(&args.input)?;
    if inputs.is_empty() {
        bail!("no audio files found under {}", args.input.display());
    }

    if let Some(dir) = &args.output_dir {
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create output dir: {}", dir.display()))?;
    }

    // Load the model once; it serves every file in the batch.
    let mut stitcher = Stitcher::from_model_path(&args.model_path, opts)?;

    let pb = ProgressBar::new(inputs.len() as u64);
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );

    let mut failed = 0usize;
    for input in &inputs {
        pb.set_message(display_name(input));
        match process_file(
            &mut stitcher,
            input,
            args.output_dir.as_deref(),
            args.output_type,
        ) {
            Ok(output) => {
                pb.println(format!("✅ {} -> {}", input.display(), output.display()));
            }
            Err(err) => {
                failed += 1;
                error!(
                    input = %input.display(),
                    error = format!("{err:#}"),
                    "failed to transcribe file"
                );
                pb.println(format!("❌ {}: {err:#}", input.display()));
            }
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    println!(
        "transcribed {}/{} file(s)",
        inputs.len() - failed,
        inputs.len()
    );
    Ok(failed)
}

fn process_file<T: Transcriber>(
    stitcher: &mut Stitcher<T>,
    input: &Path,
    output_dir: Option<&Path>,
    output_type: OutputType,
) -> Result<PathBuf> {
    let output = output_path(input, output_dir, output_type)?;
    let file = File::create(&output)
        .with_context(|| format!("failed to create output file: {}", output.display()))?;

    let cues = stitcher.stitch_file(input, file)?;
    info!(
        input = %input.display(),
        output = %output.display(),
        cues,
        "wrote subtitle document"
    );
    Ok(output)
}

/// Gather the audio files to process, in stable (sorted) order.
///
/// A single-file input is taken as-is without an extension check; the user
/// named it explicitly. Directories are scanned recursively and filtered to
/// known audio extensions.
fn collect_inputs(input: &Path) -> Result<Vec<PathBuf>> {
    if input.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }
    if !input.is_dir() {
        bail!("input not found: {}", input.display());
    }

    let mut files: Vec<PathBuf> = Vec::new();
    for entry in WalkDir::new(input).follow_links(true) {
        let entry = entry.with_context(|| format!("failed to scan {}", input.display()))?;
        let path = entry.path();
        if path.is_file() && is_audio_file(path) {
            files.push(path.to_path_buf());
        }
    }
    files.sort();
    Ok(files)
}

fn is_audio_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| AUDIO_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// The subtitle document path: same base name as the audio, format extension,
/// in the output dir when given or next to the source otherwise.
fn output_path(
    input: &Path,
    output_dir: Option<&Path>,
    output_type: OutputType,
) -> Result<PathBuf> {
    let file_name = input
        .file_name()
        .with_context(|| format!("input path has no file name: {}", input.display()))?;

    let dir = match output_dir {
        Some(dir) => dir.to_path_buf(),
        None => input.parent().unwrap_or(Path::new("")).to_path_buf(),
    };

    Ok(dir.join(file_name).with_extension(output_type.extension()))
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn audio_extension_check_is_case_insensitive() {
        assert!(is_audio_file(Path::new("episode.mp3")));
        assert!(is_audio_file(Path::new("episode.MP3")));
        assert!(is_audio_file(Path::new("dir/talk.FLAC")));
        assert!(!is_audio_file(Path::new("notes.txt")));
        assert!(!is_audio_file(Path::new("no_extension")));
    }

    #[test]
    fn output_path_swaps_extension_and_respects_output_dir() -> anyhow::Result<()> {
        let next_to_input = output_path(Path::new("/media/episode.mp3"), None, OutputType::Vtt)?;
        assert_eq!(next_to_input, PathBuf::from("/media/episode.vtt"));

        let redirected = output_path(
            Path::new("/media/episode.mp3"),
            Some(Path::new("/out")),
            OutputType::Json,
        )?;
        assert_eq!(redirected, PathBuf::from("/out/episode.json"));
        Ok(())
    }

    #[test]
    fn collect_inputs_scans_directories_and_sorts() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        fs::create_dir(dir.path().join("nested"))?;
        for name in ["b.wav", "a.mp3", "notes.txt", "nested/d.flac"] {
            fs::write(dir.path().join(name), b"")?;
        }

        let found = collect_inputs(dir.path())?;
        let names: Vec<_> = found
            .iter()
            .map(|p| {
                p.strip_prefix(dir.path())
                    .expect("path under tempdir")
                    .to_string_lossy()
                    .into_owned()
            })
            .collect();
        assert_eq!(names, vec!["a.mp3", "b.wav", "nested/d.flac"]);
        Ok(())
    }

    #[test]
    fn collect_inputs_takes_a_single_file_verbatim() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let file = dir.path().join("odd-extension.rec");
        fs::write(&file, b"")?;

        assert_eq!(collect_inputs(&file)?, vec![file]);
        Ok(())
    }

    #[test]
    fn collect_inputs_errors_for_missing_paths() {
        let err = collect_inputs(Path::new("/definitely/not/there")).unwrap_err();
        assert!(err.to_string().contains("input not found"));
    }

    #[test]
    fn args_require_model_and_input() {
        let err = Args::try_parse_from(["substitch"])
            .err()
            .expect("expected missing-args error");
        let rendered = err.to_string();
        assert!(rendered.contains("--model"));
        assert!(rendered.contains("--input"));
    }

    #[test]
    fn args_defaults_match_the_library_defaults() -> anyhow::Result<()> {
        let args = Args::try_parse_from(["substitch", "--model", "m.bin", "--input", "audio"])?;
        assert_eq!(args.segment_length_ms, 30_000);
        assert_eq!(args.overlap_ms, 5_000);
        assert!((args.merge_threshold_seconds - 1.0).abs() < 1e-9);
        assert_eq!(args.output_type, OutputType::Vtt);
        assert!(args.language.is_none());
        assert!(args.output_dir.is_none());
        Ok(())
    }
}
