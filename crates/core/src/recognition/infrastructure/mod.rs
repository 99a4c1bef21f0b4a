pub mod model_probe;
pub mod recognizer_factory;
pub mod whisper_recognizer;
