/// Terminal result of recognizing one segment, after all retries.
///
/// Every dispatched segment produces exactly one outcome; the pipeline's
/// aggregate verdict is computed from the full set.
#[derive(Clone, Debug, PartialEq)]
pub enum RecognitionOutcome {
    Success {
        text: String,
        start_ms: u64,
        end_ms: u64,
    },
    NoSpeech,
    ServiceFailure(String),
}

impl RecognitionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RecognitionOutcome::Success { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_success() {
        let ok = RecognitionOutcome::Success {
            text: "hello there".to_string(),
            start_ms: 0,
            end_ms: 12_000,
        };
        assert!(ok.is_success());
        assert!(!RecognitionOutcome::NoSpeech.is_success());
        assert!(!RecognitionOutcome::ServiceFailure("down".to_string()).is_success());
    }
}
