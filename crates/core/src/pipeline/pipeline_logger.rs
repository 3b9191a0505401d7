use std::collections::HashMap;
use std::time::Instant;

use crate::transcription::domain::recognition_outcome::RecognitionOutcome;

/// Cross-cutting logger for pipeline orchestration events.
///
/// Decouples the use case from specific output mechanisms (stdout, log crate,
/// embedding applications) so each caller can observe pipeline behavior
/// without changing the orchestration code.
pub trait PipelineLogger: Send {
    /// Report that a segment was handed to the recognition pool.
    ///
    /// `index` is the zero-based position of the segment in the track.
    fn segment_dispatched(&mut self, index: usize, total: usize);

    /// Report the terminal outcome of one segment.
    fn segment_outcome(&mut self, index: usize, outcome: &RecognitionOutcome);

    /// Record how long a named pipeline stage took.
    fn stage_timing(&mut self, stage: &str, duration_ms: f64);

    /// Log a human-readable status message.
    fn info(&mut self, message: &str);

    /// Emit an end-of-pipeline summary. Default: no-op.
    fn summary(&self) {}
}

/// Silent logger that discards all events.
///
/// Used by tests and by embedders that observe the pipeline through
/// their own progress channels.
pub struct NullPipelineLogger;

impl PipelineLogger for NullPipelineLogger {
    fn segment_dispatched(&mut self, _index: usize, _total: usize) {}
    fn segment_outcome(&mut self, _index: usize, _outcome: &RecognitionOutcome) {}
    fn stage_timing(&mut self, _stage: &str, _duration_ms: f64) {}
    fn info(&mut self, _message: &str) {}
}

/// CLI-oriented logger that tracks per-stage timing and recognition
/// counts, and provides a summary report at pipeline completion.
pub struct StdoutPipelineLogger {
    timings: HashMap<String, Vec<f64>>,
    start_time: Instant,
    total_segments: usize,
    successes: usize,
    no_speech: usize,
    service_failures: usize,
    messages: Vec<String>,
}

impl StdoutPipelineLogger {
    pub fn new() -> Self {
        Self {
            timings: HashMap::new(),
            start_time: Instant::now(),
            total_segments: 0,
            successes: 0,
            no_speech: 0,
            service_failures: 0,
            messages: Vec::new(),
        }
    }

    /// Returns the formatted summary string, or `None` if no data recorded.
    pub fn summary_string(&self) -> Option<String> {
        if self.timings.is_empty() && self.total_segments == 0 {
            return None;
        }

        let elapsed_ms = self.start_time.elapsed().as_secs_f64() * 1000.0;
        let segments = self.total_segments;
        let mut lines = Vec::new();

        lines.push(format!(
            "Pipeline summary ({segments} segments, {:.1}s total):",
            elapsed_ms / 1000.0
        ));

        let mut stages: Vec<_> = self.timings.keys().collect();
        stages.sort();
        for stage in stages {
            let durations = &self.timings[stage];
            let total_ms: f64 = durations.iter().sum();
            let avg_ms = if durations.is_empty() {
                0.0
            } else {
                total_ms / durations.len() as f64
            };
            let pct = if elapsed_ms > 0.0 {
                total_ms / elapsed_ms * 100.0
            } else {
                0.0
            };
            lines.push(format!(
                "  {stage:12}: avg {avg_ms:6.1}ms  total {total_ms:7.0}ms  ({pct:4.1}%)"
            ));
        }

        if segments > 0 {
            let rate = self.successes as f64 / segments as f64 * 100.0;
            lines.push(format!(
                "  Recognized: {}/{segments} segments ({rate:.1}%)",
                self.successes
            ));
            lines.push(format!(
                "  No speech: {}  Service failures: {}",
                self.no_speech, self.service_failures
            ));
        }

        Some(lines.join("\n"))
    }

    /// Returns the timing data for a given stage.
    pub fn timings_for(&self, stage: &str) -> Option<&[f64]> {
        self.timings.get(stage).map(|v| v.as_slice())
    }
}

impl Default for StdoutPipelineLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineLogger for StdoutPipelineLogger {
    fn segment_dispatched(&mut self, index: usize, total: usize) {
        self.total_segments = total;
        log::debug!("Dispatching segment {}/{total}", index + 1);
    }

    fn segment_outcome(&mut self, index: usize, outcome: &RecognitionOutcome) {
        match outcome {
            RecognitionOutcome::Success { text, .. } => {
                self.successes += 1;
                log::info!(
                    "Segment {}: recognized {} characters",
                    index + 1,
                    text.chars().count()
                );
            }
            RecognitionOutcome::NoSpeech => {
                self.no_speech += 1;
                log::info!("Segment {}: no speech", index + 1);
            }
            RecognitionOutcome::ServiceFailure(message) => {
                self.service_failures += 1;
                log::warn!("Segment {}: recognition failed: {message}", index + 1);
            }
        }
    }

    fn stage_timing(&mut self, stage: &str, duration_ms: f64) {
        self.timings
            .entry(stage.to_string())
            .or_default()
            .push(duration_ms);
    }

    fn info(&mut self, message: &str) {
        self.messages.push(message.to_string());
        log::info!("{message}");
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n\n{text}");
        }
    }
}
