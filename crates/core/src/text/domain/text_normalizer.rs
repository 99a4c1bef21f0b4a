use regex::Regex;

/// Whole-word fixes for tokens Whisper commonly mishears in food dictation.
///
/// Applied in order. Keys are matched on Unicode word boundaries only, so a
/// key embedded in a longer word is left alone.
pub const TOKEN_CORRECTIONS: &[(&str, &str)] = &[
    ("картоско", "картофель"),
    ("картофко", "картофель"),
    ("картофке", "картофель"),
    ("фарри", "фри"),
    ("шаренная", "жареная"),
    ("шареная", "жареная"),
    ("шарений", "жареный"),
    ("шары", "жары"),
    ("чикен", "курица"),
    ("чікен", "курица"),
    ("підчікен", "пицца курица"),
];

/// Spoken hundreds that Whisper tends to append after the digits it already
/// produced ("300 триста").
pub const HUNDRED_WORDS: &[&str] = &[
    "сто",
    "двести",
    "триста",
    "четыреста",
    "пятьсот",
    "шестьсот",
    "семьсот",
    "восемьсот",
    "девятьсот",
];

/// Deterministic post-processing of recognized Russian text.
///
/// Lowercases and trims, applies [`TOKEN_CORRECTIONS`], then collapses
/// "digits + spoken hundred" pairs down to the digits.
pub struct TextNormalizer {
    corrections: Vec<(Regex, &'static str)>,
    numeral_collapse: Regex,
}

impl TextNormalizer {
    pub fn new() -> Self {
        let corrections = TOKEN_CORRECTIONS
            .iter()
            .map(|(wrong, right)| (whole_word(wrong), *right))
            .collect();

        let words = HUNDRED_WORDS
            .iter()
            .map(|w| regex::escape(w))
            .collect::<Vec<_>>()
            .join("|");
        // Repetition keeps the collapse idempotent ("300 триста триста" -> "300").
        let numeral_collapse = Regex::new(&format!(r"(\d+)(?:\s*(?:{words})\b)+"))
            .expect("numeral collapse pattern is valid");

        Self {
            corrections,
            numeral_collapse,
        }
    }

    pub fn normalize(&self, text: &str) -> String {
        if text.is_empty() {
            return String::new();
        }

        let mut text = text.trim().to_lowercase();

        for (pattern, replacement) in &self.corrections {
            if pattern.is_match(&text) {
                text = pattern.replace_all(&text, *replacement).into_owned();
            }
        }

        let text = self.numeral_collapse.replace_all(&text, "${1}");
        text.trim().to_string()
    }
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

fn whole_word(token: &str) -> Regex {
    Regex::new(&format!(r"\b{}\b", regex::escape(token))).expect("escaped token is a valid pattern")
}
