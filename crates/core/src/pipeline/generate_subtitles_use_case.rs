use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;

use crate::audio::domain::segmenter::Segmenter;
use crate::audio::domain::signal_conditioner::SignalConditioner;
use crate::media::domain::audio_extractor::{AudioExtractor, ExtractError};
use crate::subtitle::domain::subtitle_track::SubtitleTrack;
use crate::subtitle::domain::subtitle_writer::{SubtitleWriter, TrackWriteError};
use crate::subtitle::domain::track_assembler::TrackAssembler;
use crate::transcription::domain::recognition_outcome::RecognitionOutcome;
use crate::transcription::domain::segment_recognizer::{RetryPolicy, SegmentRecognizer};
use crate::transcription::domain::speech_recognizer::SpeechRecognizer;

use super::job_record::{JobRecord, JobStatus};
use super::pipeline_logger::PipelineLogger;
use super::recognition_executor::{RecognitionConfig, RecognitionExecutor};

/// Terminal failure of a subtitle generation job.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error(
        "no speech detected; check that the video has an audio track, \
         that the speech is clear and audible, and that the recognition \
         service is reachable"
    )]
    NoSpeechDetected,

    #[error("partial recognition failure: {failed} of {total} segments could not be processed")]
    PartialRecognitionFailure { failed: usize, total: usize },

    #[error("job cancelled")]
    Cancelled,

    #[error(transparent)]
    Write(#[from] TrackWriteError),
}

/// Orchestrates the full video-to-subtitles pipeline.
///
/// Wires domain components together and delegates the per-segment fan-out
/// to a `RecognitionExecutor`. This is a single-use struct: `run` consumes
/// the owned components.
pub struct GenerateSubtitlesUseCase {
    extractor: Box<dyn AudioExtractor>,
    conditioner: SignalConditioner,
    segmenter: Segmenter,
    recognizer: Arc<dyn SpeechRecognizer>,
    executor: Box<dyn RecognitionExecutor>,
    writer: Box<dyn SubtitleWriter>,
    retry_policy: RetryPolicy,
    worker_count: usize,
    on_progress: Option<Box<dyn Fn(usize, usize) -> bool + Send>>,
    cancelled: Arc<AtomicBool>,
}

impl GenerateSubtitlesUseCase {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        extractor: Box<dyn AudioExtractor>,
        conditioner: SignalConditioner,
        segmenter: Segmenter,
        recognizer: Arc<dyn SpeechRecognizer>,
        executor: Box<dyn RecognitionExecutor>,
        writer: Box<dyn SubtitleWriter>,
        retry_policy: RetryPolicy,
        worker_count: usize,
        on_progress: Option<Box<dyn Fn(usize, usize) -> bool + Send>>,
        cancelled: Option<Arc<AtomicBool>>,
    ) -> Self {
        Self {
            extractor,
            conditioner,
            segmenter,
            recognizer,
            executor,
            writer,
            retry_policy,
            worker_count,
            on_progress,
            cancelled: cancelled.unwrap_or_else(|| Arc::new(AtomicBool::new(false))),
        }
    }

    /// Runs the job to completion, updating `job` with every externally
    /// visible state change.
    ///
    /// The output path is recorded on the job only when the run completes;
    /// a failed run clears it and stores the failure reason instead.
    pub fn run(
        self,
        input_path: &Path,
        output_path: &Path,
        job: &mut dyn JobRecord,
        logger: &mut dyn PipelineLogger,
    ) -> Result<SubtitleTrack, PipelineError> {
        job.set_status(JobStatus::Processing);

        let result = self.run_stages(input_path, output_path, logger);

        match &result {
            Ok(_) => {
                job.set_artifact(output_path);
                job.set_status(JobStatus::Completed);
            }
            Err(error) => {
                job.set_error_message(&error.to_string());
                job.clear_artifact();
                job.set_status(JobStatus::Failed);
            }
        }

        logger.summary();
        result
    }

    fn run_stages(
        self,
        input_path: &Path,
        output_path: &Path,
        logger: &mut dyn PipelineLogger,
    ) -> Result<SubtitleTrack, PipelineError> {
        let Self {
            extractor,
            conditioner,
            segmenter,
            recognizer,
            executor,
            writer,
            retry_policy,
            worker_count,
            on_progress,
            cancelled,
        } = self;

        // 1. Pull the audio track out of the container
        let started = Instant::now();
        let audio = extractor.extract(input_path)?;
        logger.stage_timing("extract", elapsed_ms(started));
        logger.info(&format!(
            "Extracted {}ms of audio from {}",
            audio.duration_ms(),
            input_path.display()
        ));

        // 2. Clean the signal up for the recognition service
        let started = Instant::now();
        let conditioned = conditioner.condition(&audio);
        logger.stage_timing("condition", elapsed_ms(started));

        // 3. Cut overlapping windows
        let started = Instant::now();
        let segments = segmenter.segment(&conditioned);
        logger.stage_timing("segment", elapsed_ms(started));

        if segments.is_empty() {
            return Err(PipelineError::NoSpeechDetected);
        }
        logger.info(&format!("Cut {} segments", segments.len()));

        // 4. Recognize every segment on the worker pool
        let total = segments.len();
        let config = RecognitionConfig {
            worker_count,
            on_progress,
            cancelled: cancelled.clone(),
        };

        let started = Instant::now();
        let outcomes = executor.execute(
            recognizer,
            SegmentRecognizer::new(retry_policy),
            segments,
            logger,
            config,
        );
        logger.stage_timing("recognize", elapsed_ms(started));

        if cancelled.load(Ordering::Relaxed) {
            return Err(PipelineError::Cancelled);
        }

        // 5. Classify the run before assembling anything
        let successes = outcomes.iter().filter(|o| o.is_success()).count();
        if successes == 0 {
            let failed = outcomes
                .iter()
                .filter(|o| matches!(o, RecognitionOutcome::ServiceFailure(_)))
                .count();
            if failed > 0 {
                return Err(PipelineError::PartialRecognitionFailure { failed, total });
            }
            return Err(PipelineError::NoSpeechDetected);
        }

        // 6. Assemble and write the track
        let started = Instant::now();
        let track =
            TrackAssembler::assemble(&outcomes).map_err(|_| PipelineError::NoSpeechDetected)?;
        logger.stage_timing("assemble", elapsed_ms(started));

        let started = Instant::now();
        writer.write(output_path, &track)?;
        logger.stage_timing("write", elapsed_ms(started));
        logger.info(&format!(
            "Wrote {} cues to {}",
            track.cues().len(),
            output_path.display()
        ));

        Ok(track)
    }
}

fn elapsed_ms(started: Instant) -> f64 {
    started.elapsed().as_secs_f64() * 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::domain::audio_buffer::AudioBuffer;
    use crate::audio::domain::segment::Segment;
    use crate::pipeline::infrastructure::worker_pool_executor::WorkerPoolExecutor;
    use crate::pipeline::job_record::InMemoryJobRecord;
    use crate::pipeline::pipeline_logger::NullPipelineLogger;
    use crate::transcription::domain::speech_recognizer::RecognitionError;
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::sync::Mutex;
    use std::time::Duration;

    // --- Stubs ---

    struct StubExtractor {
        buffer: Option<AudioBuffer>,
        calls: Arc<Mutex<usize>>,
    }

    impl StubExtractor {
        fn with_audio(duration_ms: u64) -> Self {
            let samples = vec![0.0f32; duration_ms as usize * 16];
            Self {
                buffer: Some(AudioBuffer::new(samples, 16_000, 1)),
                calls: Arc::new(Mutex::new(0)),
            }
        }

        fn without_audio() -> Self {
            Self {
                buffer: None,
                calls: Arc::new(Mutex::new(0)),
            }
        }
    }

    impl AudioExtractor for StubExtractor {
        fn extract(&self, path: &Path) -> Result<AudioBuffer, ExtractError> {
            *self.calls.lock().unwrap() += 1;
            match &self.buffer {
                Some(buffer) => Ok(buffer.clone()),
                None => Err(ExtractError::NoAudioTrack {
                    path: path.to_path_buf(),
                }),
            }
        }
    }

    /// Answers each segment by its start offset; unknown offsets report
    /// no speech.
    struct MappedRecognizer {
        responses: HashMap<u64, Result<String, RecognitionError>>,
        calls: Arc<Mutex<usize>>,
    }

    impl MappedRecognizer {
        fn new(responses: Vec<(u64, Result<String, RecognitionError>)>) -> Self {
            Self {
                responses: responses.into_iter().collect(),
                calls: Arc::new(Mutex::new(0)),
            }
        }

        fn silent() -> Self {
            Self::new(Vec::new())
        }
    }

    impl SpeechRecognizer for MappedRecognizer {
        fn transcribe(&self, segment: &Segment) -> Result<String, RecognitionError> {
            *self.calls.lock().unwrap() += 1;
            self.responses
                .get(&segment.start_ms())
                .cloned()
                .unwrap_or(Err(RecognitionError::NoSpeech))
        }
    }

    #[allow(clippy::type_complexity)]
    struct StubWriter {
        written: Arc<Mutex<Option<(PathBuf, SubtitleTrack)>>>,
        fail: bool,
    }

    impl StubWriter {
        fn new() -> Self {
            Self {
                written: Arc::new(Mutex::new(None)),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                written: Arc::new(Mutex::new(None)),
                fail: true,
            }
        }
    }

    impl SubtitleWriter for StubWriter {
        fn write(&self, path: &Path, track: &SubtitleTrack) -> Result<(), TrackWriteError> {
            if self.fail {
                return Err(TrackWriteError::Io {
                    path: path.to_path_buf(),
                    source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
                });
            }
            *self.written.lock().unwrap() = Some((path.to_path_buf(), track.clone()));
            Ok(())
        }
    }

    // --- Helpers ---

    fn ok(text: &str) -> Result<String, RecognitionError> {
        Ok(text.to_string())
    }

    fn use_case(
        extractor: StubExtractor,
        recognizer: MappedRecognizer,
        writer: StubWriter,
    ) -> GenerateSubtitlesUseCase {
        GenerateSubtitlesUseCase::new(
            Box::new(extractor),
            SignalConditioner::new(),
            Segmenter::default(),
            Arc::new(recognizer),
            Box::new(WorkerPoolExecutor::new()),
            Box::new(writer),
            RetryPolicy {
                transient_backoff: Duration::ZERO,
                ..RetryPolicy::default()
            },
            2,
            None,
            None,
        )
    }

    fn input() -> PathBuf {
        PathBuf::from("/tmp/talk.mp4")
    }

    fn output() -> PathBuf {
        PathBuf::from("/tmp/talk.srt")
    }

    // --- Tests ---

    #[test]
    fn test_successful_run_assembles_ordered_track() {
        // 36s of audio cuts into five windows starting at 0/6000/12000/18000/24000.
        let extractor = StubExtractor::with_audio(36_000);
        let recognizer = MappedRecognizer::new(vec![
            (0, ok("first part")),
            (6000, ok("second part")),
            (12_000, ok("third part")),
        ]);
        let writer = StubWriter::new();
        let written = writer.written.clone();

        let mut job = InMemoryJobRecord::new();
        let track = use_case(extractor, recognizer, writer)
            .run(&input(), &output(), &mut job, &mut NullPipelineLogger)
            .unwrap();

        let cues = track.cues();
        assert_eq!(cues.len(), 3);
        assert_eq!(cues[0].index, 1);
        assert_eq!(cues[0].start_ms, 0);
        assert_eq!(cues[0].text, "first part");
        assert_eq!(cues[1].index, 2);
        assert_eq!(cues[1].start_ms, 6000);
        assert_eq!(cues[2].index, 3);
        assert_eq!(cues[2].start_ms, 12_000);

        assert_eq!(job.status(), JobStatus::Completed);
        assert_eq!(job.history(), &[JobStatus::Processing, JobStatus::Completed]);
        assert_eq!(job.artifact(), Some(output().as_path()));
        assert!(job.error_message().is_none());

        let written = written.lock().unwrap();
        let (path, persisted) = written.as_ref().unwrap();
        assert_eq!(path, &output());
        assert_eq!(persisted, &track);
    }

    #[test]
    fn test_all_no_speech_marks_job_failed() {
        let extractor = StubExtractor::with_audio(30_000);
        let writer = StubWriter::new();
        let written = writer.written.clone();

        let mut job = InMemoryJobRecord::new();
        let result = use_case(extractor, MappedRecognizer::silent(), writer).run(
            &input(),
            &output(),
            &mut job,
            &mut NullPipelineLogger,
        );

        assert!(matches!(result, Err(PipelineError::NoSpeechDetected)));
        assert_eq!(job.status(), JobStatus::Failed);
        assert_eq!(job.history(), &[JobStatus::Processing, JobStatus::Failed]);
        assert!(job.error_message().unwrap().contains("no speech detected"));
        assert!(job.artifact().is_none());
        assert!(written.lock().unwrap().is_none());
    }

    #[test]
    fn test_missing_audio_track_fails_without_recognition() {
        let extractor = StubExtractor::without_audio();
        let recognizer = MappedRecognizer::silent();
        let recognizer_calls = recognizer.calls.clone();

        let mut job = InMemoryJobRecord::new();
        let result = use_case(extractor, recognizer, StubWriter::new()).run(
            &input(),
            &output(),
            &mut job,
            &mut NullPipelineLogger,
        );

        assert!(matches!(
            result,
            Err(PipelineError::Extract(ExtractError::NoAudioTrack { .. }))
        ));
        assert_eq!(*recognizer_calls.lock().unwrap(), 0);
        assert_eq!(job.status(), JobStatus::Failed);
        assert!(job.error_message().unwrap().contains("no audio track"));
        assert!(job.artifact().is_none());
    }

    #[test]
    fn test_zero_successes_with_service_failures_is_partial_failure() {
        // Four segments: one service failure, three silent.
        let extractor = StubExtractor::with_audio(30_000);
        let recognizer = MappedRecognizer::new(vec![(
            0,
            Err(RecognitionError::Service("model overloaded".to_string())),
        )]);

        let mut job = InMemoryJobRecord::new();
        let result = use_case(extractor, recognizer, StubWriter::new()).run(
            &input(),
            &output(),
            &mut job,
            &mut NullPipelineLogger,
        );

        match result {
            Err(PipelineError::PartialRecognitionFailure { failed, total }) => {
                assert_eq!(failed, 1);
                assert_eq!(total, 4);
            }
            other => panic!("expected partial recognition failure, got {other:?}"),
        }
        assert!(job
            .error_message()
            .unwrap()
            .contains("partial recognition failure"));
        assert!(job.artifact().is_none());
    }

    #[test]
    fn test_mixed_successes_and_failures_still_completes() {
        let extractor = StubExtractor::with_audio(30_000);
        let recognizer = MappedRecognizer::new(vec![
            (0, ok("hello there")),
            (
                6000,
                Err(RecognitionError::Service("model overloaded".to_string())),
            ),
        ]);

        let mut job = InMemoryJobRecord::new();
        let track = use_case(extractor, recognizer, StubWriter::new())
            .run(&input(), &output(), &mut job, &mut NullPipelineLogger)
            .unwrap();

        assert_eq!(track.cues().len(), 1);
        assert_eq!(track.cues()[0].text, "hello there");
        assert_eq!(job.status(), JobStatus::Completed);
    }

    #[test]
    fn test_too_short_audio_yields_no_speech() {
        // 500ms is under the minimum viable window, so nothing is dispatched.
        let extractor = StubExtractor::with_audio(500);
        let recognizer = MappedRecognizer::silent();
        let recognizer_calls = recognizer.calls.clone();

        let mut job = InMemoryJobRecord::new();
        let result = use_case(extractor, recognizer, StubWriter::new()).run(
            &input(),
            &output(),
            &mut job,
            &mut NullPipelineLogger,
        );

        assert!(matches!(result, Err(PipelineError::NoSpeechDetected)));
        assert_eq!(*recognizer_calls.lock().unwrap(), 0);
    }

    #[test]
    fn test_write_failure_marks_job_failed() {
        let extractor = StubExtractor::with_audio(30_000);
        let recognizer = MappedRecognizer::new(vec![(0, ok("hello there"))]);

        let mut job = InMemoryJobRecord::new();
        let result = use_case(extractor, recognizer, StubWriter::failing()).run(
            &input(),
            &output(),
            &mut job,
            &mut NullPipelineLogger,
        );

        assert!(matches!(result, Err(PipelineError::Write(_))));
        assert_eq!(job.status(), JobStatus::Failed);
        assert!(job.error_message().is_some());
        assert!(job.artifact().is_none());
    }

    #[test]
    fn test_pre_cancelled_job_fails_as_cancelled() {
        let extractor = StubExtractor::with_audio(30_000);
        let uc = GenerateSubtitlesUseCase::new(
            Box::new(extractor),
            SignalConditioner::new(),
            Segmenter::default(),
            Arc::new(MappedRecognizer::new(vec![(0, ok("hello there"))])),
            Box::new(WorkerPoolExecutor::new()),
            Box::new(StubWriter::new()),
            RetryPolicy {
                transient_backoff: Duration::ZERO,
                ..RetryPolicy::default()
            },
            2,
            None,
            Some(Arc::new(AtomicBool::new(true))),
        );

        let mut job = InMemoryJobRecord::new();
        let result = uc.run(&input(), &output(), &mut job, &mut NullPipelineLogger);

        assert!(matches!(result, Err(PipelineError::Cancelled)));
        assert_eq!(job.status(), JobStatus::Failed);
        assert_eq!(job.error_message(), Some("job cancelled"));
        assert!(job.artifact().is_none());
    }

    #[test]
    fn test_progress_reports_each_segment_completion() {
        let extractor = StubExtractor::with_audio(30_000);
        let recognizer = MappedRecognizer::new(vec![
            (0, ok("one two three")),
            (6000, ok("four five six")),
            (12_000, ok("seven eight")),
            (18_000, ok("nine ten")),
        ]);

        let progress = Arc::new(Mutex::new(Vec::new()));
        let progress_in_callback = progress.clone();

        let uc = GenerateSubtitlesUseCase::new(
            Box::new(extractor),
            SignalConditioner::new(),
            Segmenter::default(),
            Arc::new(recognizer),
            Box::new(WorkerPoolExecutor::new()),
            Box::new(StubWriter::new()),
            RetryPolicy {
                transient_backoff: Duration::ZERO,
                ..RetryPolicy::default()
            },
            2,
            Some(Box::new(move |completed, total| {
                progress_in_callback.lock().unwrap().push((completed, total));
                true
            })),
            None,
        );

        let mut job = InMemoryJobRecord::new();
        uc.run(&input(), &output(), &mut job, &mut NullPipelineLogger)
            .unwrap();

        let progress = progress.lock().unwrap();
        let expected: Vec<(usize, usize)> = (1..=4).map(|completed| (completed, 4)).collect();
        assert_eq!(*progress, expected);
    }

    #[test]
    fn test_summary_counts_reflect_outcomes() {
        let extractor = StubExtractor::with_audio(30_000);
        let recognizer = MappedRecognizer::new(vec![
            (0, ok("plainly spoken words")),
            (
                6000,
                Err(RecognitionError::Service("model overloaded".to_string())),
            ),
        ]);

        let mut logger = crate::pipeline::pipeline_logger::StdoutPipelineLogger::new();
        let mut job = InMemoryJobRecord::new();
        use_case(extractor, recognizer, StubWriter::new())
            .run(&input(), &output(), &mut job, &mut logger)
            .unwrap();

        let summary = logger.summary_string().unwrap();
        assert!(summary.contains("4 segments"));
        assert!(summary.contains("Recognized: 1/4 segments"));
        assert!(logger.timings_for("extract").is_some());
        assert!(logger.timings_for("recognize").is_some());
        assert!(logger.timings_for("write").is_some());
    }
}
