use crate::audio::domain::audio_reader::AudioReader;
use crate::audio::infrastructure::audio_stager::AudioStager;
use crate::recognition::domain::recognized_segment::join_segments;
use crate::recognition::domain::speech_recognizer::SpeechRecognizer;
use crate::shared::constants::{FALLBACK_DURATION_SECS, LANGUAGE, WHISPER_SAMPLE_RATE};
use crate::text::domain::fallback_generator::FallbackGenerator;
use crate::text::domain::text_normalizer::TextNormalizer;

use super::audio_payload::AudioPayload;
use super::transcription_error::TranscriptionError;
use super::transcription_result::TranscriptionResult;

/// Base64 voice message in, normalized Russian transcript out.
///
/// Stages: decode base64, stage to a temp file, decode audio, recognize,
/// join segments, normalize. Each stage returns a `TranscriptionError` on
/// failure and `transcribe` turns any of them into a fallback phrase, so a
/// caller always gets a successful result.
pub struct TranscribeUseCase {
    stager: AudioStager,
    reader: Box<dyn AudioReader>,
    recognizer: Option<Box<dyn SpeechRecognizer>>,
    normalizer: TextNormalizer,
    fallback: FallbackGenerator,
}

impl TranscribeUseCase {
    /// `recognizer` is `None` when no backend was selected; every request
    /// then gets a fallback phrase.
    pub fn new(
        stager: AudioStager,
        reader: Box<dyn AudioReader>,
        recognizer: Option<Box<dyn SpeechRecognizer>>,
        fallback: FallbackGenerator,
    ) -> Self {
        Self {
            stager,
            reader,
            recognizer,
            normalizer: TextNormalizer::new(),
            fallback,
        }
    }

    pub fn transcribe(&mut self, audio_base64: &str) -> TranscriptionResult {
        self.try_transcribe(audio_base64).unwrap_or_else(|e| {
            if !matches!(e, TranscriptionError::NoBackend) {
                log::warn!("Transcription error: {e}");
            }
            self.fallback_result()
        })
    }

    fn try_transcribe(
        &mut self,
        audio_base64: &str,
    ) -> Result<TranscriptionResult, TranscriptionError> {
        let recognizer = self
            .recognizer
            .as_mut()
            .ok_or(TranscriptionError::NoBackend)?;

        let payload = AudioPayload::from_base64(audio_base64)?;
        let staged = self
            .stager
            .stage(payload.bytes())
            .map_err(TranscriptionError::Staging)?;

        let audio = self
            .reader
            .read_audio(staged.path(), WHISPER_SAMPLE_RATE)
            .map_err(|e| TranscriptionError::AudioDecode(e.to_string()))?
            .ok_or(TranscriptionError::NoAudioStream)?;
        // Samples are in memory now; the staged file is no longer needed
        drop(staged);

        let segments = recognizer
            .recognize(&audio)
            .map_err(|e| TranscriptionError::Recognition(e.to_string()))?;

        let text = self.normalizer.normalize(&join_segments(&segments));
        log::info!("Transcription successful: '{text}'");

        Ok(TranscriptionResult::success(
            text,
            round_millis(audio.duration()),
            LANGUAGE,
        ))
    }

    fn fallback_result(&mut self) -> TranscriptionResult {
        TranscriptionResult::success(self.fallback.generate(), FALLBACK_DURATION_SECS, LANGUAGE)
    }
}

fn round_millis(secs: f64) -> f64 {
    (secs * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::domain::audio_segment::AudioSegment;
    use crate::recognition::domain::recognized_segment::RecognizedSegment;
    use crate::text::domain::fallback_generator::FALLBACK_CORPUS;
    use std::path::{Path, PathBuf};
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    // ─── Stubs ───

    enum ReaderBehavior {
        Audio(AudioSegment),
        NoStream,
        Fail,
    }

    struct StubAudioReader {
        behavior: ReaderBehavior,
        seen: Arc<Mutex<Vec<(PathBuf, bool)>>>,
    }

    impl AudioReader for StubAudioReader {
        fn read_audio(
            &self,
            path: &Path,
            sample_rate: u32,
        ) -> Result<Option<AudioSegment>, Box<dyn std::error::Error>> {
            assert_eq!(sample_rate, WHISPER_SAMPLE_RATE);
            self.seen
                .lock()
                .unwrap()
                .push((path.to_path_buf(), path.exists()));
            match &self.behavior {
                ReaderBehavior::Audio(a) => Ok(Some(a.clone())),
                ReaderBehavior::NoStream => Ok(None),
                ReaderBehavior::Fail => Err("Invalid data found when processing input".into()),
            }
        }
    }

    struct StubRecognizer {
        result: Result<Vec<RecognizedSegment>, String>,
    }

    impl SpeechRecognizer for StubRecognizer {
        fn recognize(
            &mut self,
            _: &AudioSegment,
        ) -> Result<Vec<RecognizedSegment>, Box<dyn std::error::Error>> {
            self.result.clone().map_err(|e| e.into())
        }

        fn name(&self) -> &str {
            "stub"
        }
    }

    fn one_second() -> AudioSegment {
        AudioSegment::new(vec![0.0; 16000], 16000, 1)
    }

    fn segment(text: &str, start: f64) -> RecognizedSegment {
        RecognizedSegment {
            text: text.to_string(),
            start_time: start,
            end_time: start + 1.0,
            avg_logprob: -0.2,
            no_speech_prob: 0.02,
        }
    }

    // Decodes to "OggS"; the stub reader ignores file content
    const AUDIO_B64: &str = "T2dnUw==";

    struct Harness {
        use_case: TranscribeUseCase,
        seen: Arc<Mutex<Vec<(PathBuf, bool)>>>,
        staging: TempDir,
    }

    impl Harness {
        fn new(
            behavior: ReaderBehavior,
            recognizer: Option<Result<Vec<RecognizedSegment>, String>>,
        ) -> Self {
            let staging = TempDir::new().unwrap();
            let seen = Arc::new(Mutex::new(Vec::new()));
            let reader = StubAudioReader {
                behavior,
                seen: seen.clone(),
            };
            let recognizer = recognizer
                .map(|result| Box::new(StubRecognizer { result }) as Box<dyn SpeechRecognizer>);
            let use_case = TranscribeUseCase::new(
                AudioStager::in_dir(staging.path()),
                Box::new(reader),
                recognizer,
                FallbackGenerator::with_seed(1),
            );
            Self {
                use_case,
                seen,
                staging,
            }
        }

        fn staged_files_left(&self) -> usize {
            std::fs::read_dir(self.staging.path()).unwrap().count()
        }
    }

    fn assert_fallback(result: &TranscriptionResult) {
        match result {
            TranscriptionResult::Success {
                text,
                duration,
                language,
            } => {
                assert!(FALLBACK_CORPUS.contains(&text.as_str()), "not a fallback: {text}");
                assert_eq!(*duration, FALLBACK_DURATION_SECS);
                assert_eq!(language, "ru");
            }
            other => panic!("expected success, got {other:?}"),
        }
    }

    #[test]
    fn test_success_joins_and_normalizes_segments() {
        let mut h = Harness::new(
            ReaderBehavior::Audio(one_second()),
            Some(Ok(vec![
                segment(" 300 триста грамм", 1.0),
                segment(" КАРТОСКО жареная", 0.0),
            ])),
        );
        let result = h.use_case.transcribe(AUDIO_B64);
        assert_eq!(
            result,
            TranscriptionResult::success("картофель жареная 300 грамм", 1.0, "ru")
        );
    }

    #[test]
    fn test_duration_comes_from_decoded_audio() {
        let audio = AudioSegment::new(vec![0.0; 51200], 16000, 1);
        let mut h = Harness::new(
            ReaderBehavior::Audio(audio),
            Some(Ok(vec![segment("рис", 0.0)])),
        );
        match h.use_case.transcribe(AUDIO_B64) {
            TranscriptionResult::Success { duration, .. } => assert_eq!(duration, 3.2),
            other => panic!("expected success, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_recognition_is_valid_success() {
        let mut h = Harness::new(ReaderBehavior::Audio(one_second()), Some(Ok(Vec::new())));
        let result = h.use_case.transcribe(AUDIO_B64);
        assert_eq!(result, TranscriptionResult::success("", 1.0, "ru"));
        assert_eq!(h.staged_files_left(), 0);
    }

    #[test]
    fn test_no_backend_returns_fallback_without_staging() {
        let mut h = Harness::new(ReaderBehavior::Audio(one_second()), None);
        let result = h.use_case.transcribe(AUDIO_B64);
        assert_fallback(&result);
        assert!(h.seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_invalid_base64_returns_fallback() {
        let mut h = Harness::new(
            ReaderBehavior::Audio(one_second()),
            Some(Ok(vec![segment("рис", 0.0)])),
        );
        let result = h.use_case.transcribe("!!!not-valid-base64!!!");
        assert_fallback(&result);
        assert!(h.seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_decode_error_returns_fallback_and_cleans_up() {
        let mut h = Harness::new(ReaderBehavior::Fail, Some(Ok(vec![segment("рис", 0.0)])));
        let result = h.use_case.transcribe(AUDIO_B64);
        assert_fallback(&result);
        assert_eq!(h.staged_files_left(), 0);
    }

    #[test]
    fn test_missing_audio_stream_returns_fallback() {
        let mut h = Harness::new(ReaderBehavior::NoStream, Some(Ok(vec![segment("рис", 0.0)])));
        assert_fallback(&h.use_case.transcribe(AUDIO_B64));
    }

    #[test]
    fn test_recognizer_error_returns_fallback() {
        let mut h = Harness::new(
            ReaderBehavior::Audio(one_second()),
            Some(Err("Failed to load Whisper model".to_string())),
        );
        let result = h.use_case.transcribe(AUDIO_B64);
        assert_fallback(&result);
        assert_eq!(h.staged_files_left(), 0);
    }

    #[test]
    fn test_staged_file_exists_during_decode_and_is_removed_after() {
        let mut h = Harness::new(
            ReaderBehavior::Audio(one_second()),
            Some(Ok(vec![segment("киви", 0.0)])),
        );
        for _ in 0..5 {
            h.use_case.transcribe(AUDIO_B64);
        }
        let mut h_fail = Harness::new(ReaderBehavior::Fail, Some(Ok(Vec::new())));
        for _ in 0..5 {
            h_fail.use_case.transcribe(AUDIO_B64);
        }

        for harness in [&h, &h_fail] {
            let seen = harness.seen.lock().unwrap();
            assert_eq!(seen.len(), 5);
            for (path, existed) in seen.iter() {
                assert!(existed, "staged file missing during decode");
                assert!(!path.exists(), "staged file leaked: {}", path.display());
                assert!(path.starts_with(harness.staging.path()));
            }
            assert_eq!(harness.staged_files_left(), 0);
        }
    }

    #[test]
    fn test_fallback_sequence_reproducible_with_seed() {
        let mut a = Harness::new(ReaderBehavior::Fail, None);
        let mut b = Harness::new(ReaderBehavior::Fail, None);
        for _ in 0..10 {
            assert_eq!(
                a.use_case.transcribe(AUDIO_B64),
                b.use_case.transcribe(AUDIO_B64)
            );
        }
    }

    #[test]
    fn test_round_millis() {
        assert_eq!(round_millis(1.23456), 1.235);
        assert_eq!(round_millis(2.5), 2.5);
    }
}
