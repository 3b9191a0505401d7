use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::audio::domain::segment::Segment;
use crate::pipeline::pipeline_logger::PipelineLogger;
use crate::pipeline::recognition_executor::{RecognitionConfig, RecognitionExecutor};
use crate::transcription::domain::recognition_outcome::RecognitionOutcome;
use crate::transcription::domain::segment_recognizer::SegmentRecognizer;
use crate::transcription::domain::speech_recognizer::SpeechRecognizer;

/// Executes segment recognition on a fixed pool of worker threads.
///
/// Layout: `main [dispatch] → workers [recognize] → main [collect]`
///
/// All jobs are queued up front and workers pull from the shared queue, so
/// one slow segment never holds back the rest. Results carry their segment
/// index and land in a slot vector addressed by that index, which keeps the
/// returned outcomes in track order no matter how workers interleave.
///
/// Cancellation is cooperative: workers check the flag between jobs, and
/// segments that were never recognized surface as service failures.
pub struct WorkerPoolExecutor;

impl WorkerPoolExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for WorkerPoolExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl RecognitionExecutor for WorkerPoolExecutor {
    fn execute(
        &self,
        recognizer: Arc<dyn SpeechRecognizer>,
        segment_recognizer: SegmentRecognizer,
        segments: Vec<Segment>,
        logger: &mut dyn PipelineLogger,
        config: RecognitionConfig,
    ) -> Vec<RecognitionOutcome> {
        let total = segments.len();
        if total == 0 {
            return Vec::new();
        }

        let worker_count = config.worker_count.clamp(1, total);

        let (job_tx, job_rx) = crossbeam_channel::unbounded::<(usize, Segment)>();
        let (result_tx, result_rx) = crossbeam_channel::unbounded::<(usize, RecognitionOutcome)>();

        for (index, segment) in segments.into_iter().enumerate() {
            logger.segment_dispatched(index, total);
            if job_tx.send((index, segment)).is_err() {
                break;
            }
        }
        drop(job_tx);

        let handles: Vec<_> = (0..worker_count)
            .map(|_| {
                spawn_worker(
                    recognizer.clone(),
                    segment_recognizer.clone(),
                    job_rx.clone(),
                    result_tx.clone(),
                    config.cancelled.clone(),
                )
            })
            .collect();

        drop(job_rx);
        drop(result_tx);

        let mut slots: Vec<Option<RecognitionOutcome>> = vec![None; total];
        let mut completed: usize = 0;

        for (index, outcome) in result_rx {
            logger.segment_outcome(index, &outcome);
            slots[index] = Some(outcome);
            completed += 1;

            if let Some(ref callback) = config.on_progress {
                if !callback(completed, total) {
                    config.cancelled.store(true, Ordering::Relaxed);
                }
            }
        }

        for handle in handles {
            if handle.join().is_err() {
                log::error!("Recognition worker panicked");
            }
        }

        slots
            .into_iter()
            .map(|slot| {
                slot.unwrap_or_else(|| {
                    RecognitionOutcome::ServiceFailure("cancelled before recognition".to_string())
                })
            })
            .collect()
    }
}

fn spawn_worker(
    recognizer: Arc<dyn SpeechRecognizer>,
    segment_recognizer: SegmentRecognizer,
    job_rx: crossbeam_channel::Receiver<(usize, Segment)>,
    result_tx: crossbeam_channel::Sender<(usize, RecognitionOutcome)>,
    cancelled: Arc<AtomicBool>,
) -> std::thread::JoinHandle<()> {
    std::thread::spawn(move || {
        for (index, segment) in job_rx {
            if cancelled.load(Ordering::Relaxed) {
                break;
            }
            let outcome = segment_recognizer.recognize(recognizer.as_ref(), &segment);
            if result_tx.send((index, outcome)).is_err() {
                break;
            }
        }
    })
}
