use thiserror::Error;

use crate::audio::domain::segment::Segment;

/// Failure classes a recognition backend can report.
///
/// `Transient` marks faults worth backing off for (timeouts, dropped
/// connections, throttling); `Service` marks faults a retry may or may not
/// cure; `NoSpeech` means the backend understood the audio and found
/// nothing to transcribe in it.
#[derive(Error, Debug, Clone)]
pub enum RecognitionError {
    #[error("no speech recognized")]
    NoSpeech,
    #[error("recognition service error: {0}")]
    Service(String),
    #[error("transient recognition fault: {0}")]
    Transient(String),
}

/// Domain interface for transcribing one audio segment.
pub trait SpeechRecognizer: Send + Sync {
    fn transcribe(&self, segment: &Segment) -> Result<String, RecognitionError>;
}
