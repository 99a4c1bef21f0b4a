use crate::shared::constants::LANGUAGE;

/// Vocabulary hint fed to the reference engine as the initial prompt.
pub const FOOD_PROMPT: &str = "числа цифры вес масса Вес веса граммы грамм килограммы килограмм \
количество штуки порции. Еда продукты пища обед ужин салат суп каша рис макароны курица мясо \
рыба фрукты овощи хлеб сыр йогурт сахар молоко чай кофе вода сок лимон апельсин банан яблоко \
груша персик киви виноград помидоры огурцы картофель свекла морковь капуста лук чеснок баклажан \
перец огурец салат шпинат заправка уксус масло сметана творог яйца бекон колбаса сосиски";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchStrategy {
    Greedy,
    BeamSearch { beam_size: u32 },
}

/// Decoder settings for one backend.
///
/// Thresholds set to `None` disable the matching quality check.
#[derive(Clone, Debug, PartialEq)]
pub struct DecodingConfig {
    pub language: &'static str,
    pub initial_prompt: Option<String>,
    pub strategy: SearchStrategy,
    /// Feed already-decoded text of the clip into the next window.
    pub condition_on_previous_text: bool,
    /// Segments above this no-speech probability count as silence.
    pub no_speech_threshold: Option<f32>,
    /// Segments above this repetition score are low quality.
    pub compression_ratio_threshold: Option<f32>,
    /// Segments below this mean token log-probability are low quality.
    pub logprob_threshold: Option<f32>,
    /// One decoding attempt per temperature, in order.
    pub temperatures: Vec<f32>,
}

impl DecodingConfig {
    /// Fast quantized engine: Russian, engine defaults otherwise.
    pub fn fast() -> Self {
        Self {
            language: LANGUAGE,
            initial_prompt: None,
            strategy: SearchStrategy::Greedy,
            condition_on_previous_text: true,
            no_speech_threshold: None,
            compression_ratio_threshold: None,
            logprob_threshold: None,
            temperatures: vec![0.0],
        }
    }

    /// Reference engine, tuned for short food-and-quantity dictation.
    pub fn reference() -> Self {
        Self {
            language: LANGUAGE,
            initial_prompt: Some(FOOD_PROMPT.to_string()),
            strategy: SearchStrategy::BeamSearch { beam_size: 7 },
            condition_on_previous_text: true,
            no_speech_threshold: Some(0.6),
            compression_ratio_threshold: Some(2.4),
            logprob_threshold: Some(-1.0),
            temperatures: vec![0.0, 0.2, 0.4],
        }
    }

    /// Temperatures to try; never empty.
    pub fn temperature_schedule(&self) -> &[f32] {
        if self.temperatures.is_empty() {
            &[0.0]
        } else {
            &self.temperatures
        }
    }
}
