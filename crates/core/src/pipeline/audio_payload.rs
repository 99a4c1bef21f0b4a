use base64::Engine;

use super::transcription_error::TranscriptionError;

/// Encoded audio bytes (an Ogg/Opus voice message, typically) decoded from
/// the request's base64 string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AudioPayload(Vec<u8>);

impl AudioPayload {
    /// Decode standard base64, tolerating a `data:<mime>;base64,` prefix and
    /// embedded whitespace (line-wrapped input).
    pub fn from_base64(input: &str) -> Result<Self, TranscriptionError> {
        let cleaned: String = strip_data_uri(input.trim())
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect();
        let bytes = base64::engine::general_purpose::STANDARD.decode(cleaned)?;
        if bytes.is_empty() {
            return Err(TranscriptionError::EmptyAudio);
        }
        Ok(Self(bytes))
    }

    pub fn bytes(&self) -> &[u8] {
        &self.0
    }
}

/// Strip a data URI prefix, keeping the raw base64 after `;base64,`.
/// Plain base64 passes through unchanged.
pub fn strip_data_uri(input: &str) -> &str {
    match input.find(";base64,") {
        Some(idx) if input.starts_with("data:") => &input[idx + ";base64,".len()..],
        _ => input,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_decodes_plain_base64() {
        let payload = AudioPayload::from_base64("T2dnUw==").unwrap();
        assert_eq!(payload.bytes(), b"OggS");
    }

    #[rstest]
    #[case::data_uri("data:audio/ogg;base64,T2dnUw==")]
    #[case::surrounding_whitespace("  T2dnUw==\n")]
    #[case::wrapped_lines("T2dn\nUw==")]
    fn test_decodes_tolerated_forms(#[case] input: &str) {
        assert_eq!(AudioPayload::from_base64(input).unwrap().bytes(), b"OggS");
    }

    #[rstest]
    #[case::not_base64("!!!not-valid-base64!!!")]
    #[case::bad_padding("T2dnU")]
    fn test_invalid_base64_is_error(#[case] input: &str) {
        assert!(matches!(
            AudioPayload::from_base64(input),
            Err(TranscriptionError::InvalidBase64(_))
        ));
    }

    #[test]
    fn test_empty_payload_is_error() {
        assert!(matches!(
            AudioPayload::from_base64(""),
            Err(TranscriptionError::EmptyAudio)
        ));
        assert!(matches!(
            AudioPayload::from_base64("data:audio/ogg;base64,"),
            Err(TranscriptionError::EmptyAudio)
        ));
    }

    #[test]
    fn test_strip_data_uri_passthrough_plain() {
        assert_eq!(strip_data_uri("AAAA"), "AAAA");
        assert_eq!(strip_data_uri("data:audio/m4a;base64,BBBB"), "BBBB");
    }
}
