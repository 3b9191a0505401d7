use std::time::Duration;

use crate::audio::domain::segment::Segment;
use crate::shared::constants::{
    MAX_RECOGNITION_ATTEMPTS, MIN_TRANSCRIPT_CHARS, TRANSIENT_RETRY_BACKOFF_MS,
};

use super::recognition_outcome::RecognitionOutcome;
use super::speech_recognizer::{RecognitionError, SpeechRecognizer};

/// Retry behavior for one segment.
///
/// `transient_backoff` is slept only before a retry caused by a transient
/// fault; every other retry trigger goes again immediately.
#[derive(Clone, Debug)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub transient_backoff: Duration,
    pub min_text_chars: usize,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_RECOGNITION_ATTEMPTS,
            transient_backoff: Duration::from_millis(TRANSIENT_RETRY_BACKOFF_MS),
            min_text_chars: MIN_TRANSCRIPT_CHARS,
        }
    }
}

/// Drives recognition of a single segment to a terminal outcome.
///
/// A transcript with at least `min_text_chars` trimmed characters ends the
/// attempts early as a success. Anything else counts as a failed attempt:
/// transient faults, service errors, explicit no-speech, and transcripts too
/// short to be real speech. After the last attempt the outcome is classified
/// by what that attempt produced: a service or transient fault becomes
/// `ServiceFailure`, everything else becomes `NoSpeech`.
///
/// Holds no mutable state, so one instance can be cloned across workers.
#[derive(Clone)]
pub struct SegmentRecognizer {
    policy: RetryPolicy,
}

impl SegmentRecognizer {
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    pub fn recognize(
        &self,
        recognizer: &dyn SpeechRecognizer,
        segment: &Segment,
    ) -> RecognitionOutcome {
        let mut service_error: Option<String> = None;

        for attempt in 1..=self.policy.max_attempts {
            match recognizer.transcribe(segment) {
                Ok(text) => {
                    let trimmed = text.trim();
                    if trimmed.chars().count() >= self.policy.min_text_chars {
                        return RecognitionOutcome::Success {
                            text: trimmed.to_string(),
                            start_ms: segment.start_ms(),
                            end_ms: segment.end_ms(),
                        };
                    }
                    service_error = None;
                    log::debug!(
                        "segment at {}ms: transcript too short on attempt {attempt}",
                        segment.start_ms()
                    );
                }
                Err(RecognitionError::NoSpeech) => {
                    service_error = None;
                    log::debug!(
                        "segment at {}ms: no speech on attempt {attempt}",
                        segment.start_ms()
                    );
                }
                Err(RecognitionError::Service(message)) => {
                    log::debug!(
                        "segment at {}ms: service error on attempt {attempt}: {message}",
                        segment.start_ms()
                    );
                    service_error = Some(message);
                }
                Err(RecognitionError::Transient(message)) => {
                    log::debug!(
                        "segment at {}ms: transient fault on attempt {attempt}: {message}",
                        segment.start_ms()
                    );
                    service_error = Some(message);
                    if attempt < self.policy.max_attempts
                        && !self.policy.transient_backoff.is_zero()
                    {
                        std::thread::sleep(self.policy.transient_backoff);
                    }
                }
            }
        }

        match service_error {
            Some(message) => RecognitionOutcome::ServiceFailure(message),
            None => RecognitionOutcome::NoSpeech,
        }
    }
}
