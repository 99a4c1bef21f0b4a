use thiserror::Error;

/// Why a transcription attempt fell back to a synthetic phrase.
///
/// Never escapes the pipeline; [`crate::pipeline::transcribe_use_case`]
/// converts every variant into a fallback transcript.
#[derive(Error, Debug)]
pub enum TranscriptionError {
    #[error("no speech-recognition backend available")]
    NoBackend,
    #[error("invalid base64 audio data: {0}")]
    InvalidBase64(#[from] base64::DecodeError),
    #[error("audio payload is empty")]
    EmptyAudio,
    #[error("failed to stage audio: {0}")]
    Staging(#[source] std::io::Error),
    #[error("failed to decode audio: {0}")]
    AudioDecode(String),
    #[error("audio container has no audio stream")]
    NoAudioStream,
    #[error("recognition failed: {0}")]
    Recognition(String),
}
