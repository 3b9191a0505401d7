use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use crate::audio::domain::segment::Segment;
use crate::pipeline::pipeline_logger::PipelineLogger;
use crate::shared::constants::DEFAULT_WORKER_COUNT;
use crate::transcription::domain::recognition_outcome::RecognitionOutcome;
use crate::transcription::domain::segment_recognizer::SegmentRecognizer;
use crate::transcription::domain::speech_recognizer::SpeechRecognizer;

/// Configuration for a recognition run.
pub struct RecognitionConfig {
    pub worker_count: usize,
    /// Called after each segment reaches a terminal outcome with
    /// `(completed, total)`. Returning `false` requests cancellation.
    pub on_progress: Option<Box<dyn Fn(usize, usize) -> bool + Send>>,
    pub cancelled: Arc<AtomicBool>,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            worker_count: DEFAULT_WORKER_COUNT,
            on_progress: None,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }
}

/// Abstracts how the per-segment recognition fan-out is executed.
///
/// This is a port (application-layer interface). Infrastructure provides
/// concrete implementations (e.g. a worker pool, single-threaded).
///
/// Implementations must return exactly one outcome per input segment,
/// in segment order, regardless of completion order or cancellation.
pub trait RecognitionExecutor: Send {
    fn execute(
        &self,
        recognizer: Arc<dyn SpeechRecognizer>,
        segment_recognizer: SegmentRecognizer,
        segments: Vec<Segment>,
        logger: &mut dyn PipelineLogger,
        config: RecognitionConfig,
    ) -> Vec<RecognitionOutcome>;
}
