use crate::recognition::domain::backend_selector::BackendChoice;
use crate::recognition::domain::decoding_config::DecodingConfig;
use crate::recognition::domain::speech_recognizer::SpeechRecognizer;

use super::whisper_recognizer::WhisperRecognizer;

/// Builds the recognizer for a selected backend, with that backend's
/// decoding configuration.
///
/// Returns `None` for [`BackendChoice::NoEngine`], or when the model file has
/// disappeared since selection.
pub fn create_recognizer(
    choice: &BackendChoice,
    n_threads: Option<usize>,
) -> Option<Box<dyn SpeechRecognizer>> {
    let (model_path, config) = match choice {
        BackendChoice::Fast { model_path } => (model_path, DecodingConfig::fast()),
        BackendChoice::Reference { model_path } => (model_path, DecodingConfig::reference()),
        BackendChoice::NoEngine => return None,
    };

    match WhisperRecognizer::new(model_path, config) {
        Ok(recognizer) => {
            let recognizer = match n_threads {
                Some(n) => recognizer.with_threads(n),
                None => recognizer,
            };
            Some(Box::new(recognizer))
        }
        Err(e) => {
            log::warn!("Speech recognizer unavailable: {e}");
            None
        }
    }
}
