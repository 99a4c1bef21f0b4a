use serde::ser::{Serialize, SerializeStruct, Serializer};

/// Outcome of one transcription request.
///
/// Serializes to the JSON shape consumers expect:
/// `{"success": true, "text", "duration", "language"}` or
/// `{"success": false, "error"}`.
#[derive(Clone, Debug, PartialEq)]
pub enum TranscriptionResult {
    Success {
        text: String,
        /// Seconds.
        duration: f64,
        language: String,
    },
    Failure {
        error: String,
    },
}

impl TranscriptionResult {
    pub fn success(text: impl Into<String>, duration: f64, language: impl Into<String>) -> Self {
        Self::Success {
            text: text.into(),
            duration,
            language: language.into(),
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self::Failure {
            error: error.into(),
        }
    }
}

impl Serialize for TranscriptionResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Success {
                text,
                duration,
                language,
            } => {
                let mut state = serializer.serialize_struct("TranscriptionResult", 4)?;
                state.serialize_field("success", &true)?;
                state.serialize_field("text", text)?;
                state.serialize_field("duration", duration)?;
                state.serialize_field("language", language)?;
                state.end()
            }
            Self::Failure { error } => {
                let mut state = serializer.serialize_struct("TranscriptionResult", 2)?;
                state.serialize_field("success", &false)?;
                state.serialize_field("error", error)?;
                state.end()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_json_shape() {
        let result = TranscriptionResult::success("гречка 100 грамм", 2.5, "ru");
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(
            value,
            json!({
                "success": true,
                "text": "гречка 100 грамм",
                "duration": 2.5,
                "language": "ru",
            })
        );
    }

    #[test]
    fn test_failure_json_shape() {
        let result = TranscriptionResult::failure("No audio data provided");
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(
            value,
            json!({"success": false, "error": "No audio data provided"})
        );
    }

    #[test]
    fn test_cyrillic_is_not_escaped() {
        let result = TranscriptionResult::success("сыр", 1.0, "ru");
        let text = serde_json::to_string(&result).unwrap();
        assert!(text.contains("сыр"));
    }
}
