use std::io::{self, Write};

use flate2::write::ZlibEncoder;
use flate2::Compression;

/// One span of recognized speech with the quality metrics the decoder
/// reported for it.
#[derive(Clone, Debug, PartialEq)]
pub struct RecognizedSegment {
    pub text: String,
    pub start_time: f64,
    pub end_time: f64,
    /// Mean log-probability of the segment's text tokens.
    pub avg_logprob: f32,
    /// Probability that the window contained no speech at all.
    pub no_speech_prob: f32,
}

impl RecognizedSegment {
    pub fn compression_ratio(&self) -> f32 {
        compression_ratio(&self.text)
    }
}

/// UTF-8 length of `text` over its zlib-compressed length.
///
/// Ordinary dictation stays below ~2; a decoder looping on one phrase
/// compresses far better and scores well above 2.4.
pub fn compression_ratio(text: &str) -> f32 {
    let bytes = text.as_bytes();
    if bytes.is_empty() {
        return 0.0;
    }
    match zlib_len(bytes) {
        Ok(n) if n > 0 => bytes.len() as f32 / n as f32,
        _ => 0.0,
    }
}

fn zlib_len(bytes: &[u8]) -> io::Result<usize> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(bytes)?;
    Ok(encoder.finish()?.len())
}

/// Concatenate segment texts in temporal order, single-space separated.
pub fn join_segments(segments: &[RecognizedSegment]) -> String {
    let mut ordered: Vec<&RecognizedSegment> = segments.iter().collect();
    ordered.sort_by(|a, b| a.start_time.total_cmp(&b.start_time));
    ordered
        .iter()
        .map(|s| s.text.trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
