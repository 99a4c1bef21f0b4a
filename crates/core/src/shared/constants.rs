pub const FAST_MODEL_NAME: &str = "ggml-base-q5_1.bin";
pub const FAST_MODEL_URL: &str =
    "https://huggingface.co/ggerganov/whisper.cpp/resolve/main/ggml-base-q5_1.bin";

pub const REFERENCE_MODEL_NAME: &str = "ggml-small.bin";
pub const REFERENCE_MODEL_URL: &str =
    "https://huggingface.co/ggerganov/whisper.cpp/resolve/main/ggml-small.bin";

pub const WHISPER_SAMPLE_RATE: u32 = 16000;

/// Only Russian is transcribed.
pub const LANGUAGE: &str = "ru";

/// Reported when no audio was decoded (fallback transcripts).
pub const FALLBACK_DURATION_SECS: f64 = 2.5;

/// Suffix of staged voice messages; ffmpeg probes the container anyway.
pub const STAGED_AUDIO_SUFFIX: &str = ".ogg";
