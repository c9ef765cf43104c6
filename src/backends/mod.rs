/// Built-in speech-to-text backends.
#[cfg(feature = "backend-whisper")]
pub mod whisper;
