use crate::audio::domain::audio_segment::AudioSegment;

use super::recognized_segment::RecognizedSegment;

/// Domain interface for speech-to-text transcription.
///
/// Implementations own their decoding configuration and may load model
/// weights lazily on the first call, hence `&mut self`.
pub trait SpeechRecognizer: Send {
    fn recognize(
        &mut self,
        audio: &AudioSegment,
    ) -> Result<Vec<RecognizedSegment>, Box<dyn std::error::Error>>;

    /// Short human-readable name for diagnostics.
    fn name(&self) -> &str;
}
