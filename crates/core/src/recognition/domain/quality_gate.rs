use super::decoding_config::DecodingConfig;
use super::recognized_segment::RecognizedSegment;

/// Segment-level quality checks driven by a [`DecodingConfig`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QualityGate {
    no_speech_threshold: Option<f32>,
    compression_ratio_threshold: Option<f32>,
    logprob_threshold: Option<f32>,
}

impl QualityGate {
    pub fn from_config(config: &DecodingConfig) -> Self {
        Self {
            no_speech_threshold: config.no_speech_threshold,
            compression_ratio_threshold: config.compression_ratio_threshold,
            logprob_threshold: config.logprob_threshold,
        }
    }

    /// Likely silence: high no-speech probability, and (when a floor is set)
    /// low confidence in the text that was produced anyway.
    pub fn is_silence(&self, segment: &RecognizedSegment) -> bool {
        let Some(threshold) = self.no_speech_threshold else {
            return false;
        };
        if segment.no_speech_prob <= threshold {
            return false;
        }
        match self.logprob_threshold {
            Some(floor) => segment.avg_logprob < floor,
            None => true,
        }
    }

    pub fn is_low_quality(&self, segment: &RecognizedSegment) -> bool {
        let repetitive = self
            .compression_ratio_threshold
            .is_some_and(|max| segment.compression_ratio() > max);
        let unsure = self
            .logprob_threshold
            .is_some_and(|floor| segment.avg_logprob < floor);
        repetitive || unsure
    }

    /// An attempt needs a retry at the next temperature when any segment
    /// that is not silence fails the quality checks.
    pub fn needs_retry(&self, segments: &[RecognizedSegment]) -> bool {
        segments
            .iter()
            .filter(|s| !self.is_silence(s))
            .any(|s| self.is_low_quality(s))
    }

    pub fn keep(&self, segment: &RecognizedSegment) -> bool {
        !self.is_silence(segment) && !self.is_low_quality(segment)
    }
}

/// Run one decoding attempt per scheduled temperature until an attempt
/// passes the quality gate, then drop the segments that fail it.
///
/// The last attempt is used when none pass. `attempt` receives the
/// temperature to decode at.
pub fn decode_with_schedule<F, E>(
    config: &DecodingConfig,
    mut attempt: F,
) -> Result<Vec<RecognizedSegment>, E>
where
    F: FnMut(f32) -> Result<Vec<RecognizedSegment>, E>,
{
    let gate = QualityGate::from_config(config);
    let schedule = config.temperature_schedule();
    let mut chosen = Vec::new();

    for (i, &temperature) in schedule.iter().enumerate() {
        let segments = attempt(temperature)?;
        let is_last = i + 1 == schedule.len();
        if is_last || !gate.needs_retry(&segments) {
            chosen = segments;
            break;
        }
        log::debug!("Decode at temperature {temperature} failed quality checks, retrying");
    }

    Ok(chosen.into_iter().filter(|s| gate.keep(s)).collect())
}
