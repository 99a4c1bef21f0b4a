use crate::audio::domain::audio_segment::AudioSegment;
use std::path::Path;

/// Domain interface for decoding an encoded audio file (Ogg/Opus voice
/// messages, in practice).
pub trait AudioReader: Send {
    /// Decode the best audio stream to mono PCM at the given sample rate.
    /// Returns None if the container has no audio stream.
    fn read_audio(
        &self,
        path: &Path,
        target_sample_rate: u32,
    ) -> Result<Option<AudioSegment>, Box<dyn std::error::Error>>;
}
