use std::path::{Path, PathBuf};

use whisper_rs::{
    FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters, WhisperState,
};

use crate::audio::domain::audio_segment::AudioSegment;
use crate::recognition::domain::decoding_config::{DecodingConfig, SearchStrategy};
use crate::recognition::domain::quality_gate::decode_with_schedule;
use crate::recognition::domain::recognized_segment::RecognizedSegment;
use crate::recognition::domain::speech_recognizer::SpeechRecognizer;
use crate::shared::constants::WHISPER_SAMPLE_RATE;

/// Speech recognizer using whisper.cpp via whisper-rs.
///
/// The model is loaded on the first `recognize` call and kept for the
/// lifetime of the recognizer. Temperature fallback is driven by
/// [`decode_with_schedule`], so whisper.cpp's own fallback loop is disabled.
pub struct WhisperRecognizer {
    model_path: PathBuf,
    config: DecodingConfig,
    n_threads: usize,
    context: Option<WhisperContext>,
}

impl WhisperRecognizer {
    pub fn new(
        model_path: &Path,
        config: DecodingConfig,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        if !model_path.exists() {
            return Err(format!("Whisper model not found at: {}", model_path.display()).into());
        }
        Ok(Self {
            model_path: model_path.to_path_buf(),
            config,
            n_threads: num_cpus().min(4),
            context: None,
        })
    }

    pub fn with_threads(mut self, n_threads: usize) -> Self {
        self.n_threads = n_threads.max(1);
        self
    }

    pub fn is_loaded(&self) -> bool {
        self.context.is_some()
    }
}

impl SpeechRecognizer for WhisperRecognizer {
    fn recognize(
        &mut self,
        audio: &AudioSegment,
    ) -> Result<Vec<RecognizedSegment>, Box<dyn std::error::Error>> {
        if audio.sample_rate() != WHISPER_SAMPLE_RATE || audio.channels() != 1 {
            return Err(format!(
                "Whisper needs {WHISPER_SAMPLE_RATE} Hz mono, got {} Hz with {} channels",
                audio.sample_rate(),
                audio.channels()
            )
            .into());
        }
        if self.context.is_none() {
            self.context = Some(load_context(&self.model_path)?);
        }
        let ctx = self.context.as_ref().ok_or("Whisper context not loaded")?;
        let config = &self.config;
        let n_threads = self.n_threads;

        let mut state = ctx
            .create_state()
            .map_err(|e| format!("Failed to create Whisper state: {e}"))?;
        let eot = ctx.token_eot();
        let samples = audio.samples();

        decode_with_schedule(
            config,
            |temperature| -> Result<Vec<RecognizedSegment>, Box<dyn std::error::Error>> {
                let params = build_params(config, n_threads, temperature);
                state
                    .full(params, samples)
                    .map_err(|e| format!("Whisper inference failed: {e}"))?;
                collect_segments(&state, eot)
            },
        )
    }

    fn name(&self) -> &str {
        "whisper.cpp"
    }
}

fn load_context(model_path: &Path) -> Result<WhisperContext, Box<dyn std::error::Error>> {
    log::info!("Loading Whisper model from {}", model_path.display());
    let ctx = WhisperContext::new_with_params(
        model_path.to_str().ok_or("Invalid model path")?,
        WhisperContextParameters::default(),
    )
    .map_err(|e| format!("Failed to load Whisper model: {e}"))?;
    Ok(ctx)
}

fn build_params(
    config: &DecodingConfig,
    n_threads: usize,
    temperature: f32,
) -> FullParams<'static, 'static> {
    let strategy = match config.strategy {
        SearchStrategy::Greedy => SamplingStrategy::Greedy { best_of: 1 },
        SearchStrategy::BeamSearch { beam_size } => SamplingStrategy::BeamSearch {
            beam_size: beam_size as i32,
            patience: -1.0,
        },
    };

    let mut params = FullParams::new(strategy);
    params.set_language(Some(config.language));
    params.set_translate(false);
    params.set_print_special(false);
    params.set_print_progress(false);
    params.set_print_realtime(false);
    params.set_print_timestamps(false);
    params.set_n_threads(n_threads as i32);
    params.set_no_context(!config.condition_on_previous_text);
    params.set_temperature(temperature);
    params.set_temperature_inc(0.0);

    if let Some(prompt) = &config.initial_prompt {
        params.set_initial_prompt(prompt);
    }
    if let Some(threshold) = config.no_speech_threshold {
        params.set_no_speech_thold(threshold);
    }
    if let Some(floor) = config.logprob_threshold {
        params.set_logprob_thold(floor);
    }
    // whisper.cpp's entropy threshold is its stand-in for the compression ratio check
    if let Some(threshold) = config.compression_ratio_threshold {
        params.set_entropy_thold(threshold);
    }

    params
}

fn collect_segments(
    state: &WhisperState,
    eot: i32,
) -> Result<Vec<RecognizedSegment>, Box<dyn std::error::Error>> {
    let mut segments = Vec::new();

    for seg_idx in 0..state.full_n_segments() {
        let segment = match state.get_segment(seg_idx) {
            Some(s) => s,
            None => continue,
        };

        let text = segment
            .to_str_lossy()
            .map_err(|e| format!("Failed to read segment text: {e}"))?
            .into_owned();

        // Special tokens ([_BEG_], timestamps, ...) sort after end-of-text
        let mut logprob_sum = 0.0f32;
        let mut n_text_tokens = 0usize;
        for tok_idx in 0..segment.n_tokens() {
            let token = match segment.get_token(tok_idx) {
                Some(t) => t,
                None => continue,
            };
            let data = token.token_data();
            if data.id >= eot {
                continue;
            }
            logprob_sum += data.plog;
            n_text_tokens += 1;
        }
        let avg_logprob = if n_text_tokens > 0 {
            logprob_sum / n_text_tokens as f32
        } else {
            0.0
        };

        // Segment timestamps are in centiseconds (10ms units)
        segments.push(RecognizedSegment {
            text,
            start_time: segment.start_timestamp() as f64 / 100.0,
            end_time: segment.end_timestamp() as f64 / 100.0,
            avg_logprob,
            no_speech_prob: segment.no_speech_probability(),
        });
    }

    Ok(segments)
}

fn num_cpus() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}
