use thiserror::Error;

use crate::transcription::domain::recognition_outcome::RecognitionOutcome;

use super::subtitle_cue::SubtitleCue;
use super::subtitle_track::SubtitleTrack;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum AssemblyError {
    #[error("no transcribed text to assemble")]
    EmptyTrack,
}

/// Builds an ordered subtitle track from unordered per-segment outcomes.
///
/// Only successful outcomes contribute cues. Cues are sorted by start time
/// with a stable sort, so two outcomes at the same offset keep their input
/// order, and indices are reassigned densely from 1 regardless of which
/// segments failed. The same outcome set assembles to byte-identical SRT
/// no matter what order it arrives in.
pub struct TrackAssembler;

impl TrackAssembler {
    pub fn assemble(outcomes: &[RecognitionOutcome]) -> Result<SubtitleTrack, AssemblyError> {
        let mut timed: Vec<(u64, u64, &str)> = outcomes
            .iter()
            .filter_map(|outcome| match outcome {
                RecognitionOutcome::Success {
                    text,
                    start_ms,
                    end_ms,
                } => Some((*start_ms, *end_ms, text.as_str())),
                _ => None,
            })
            .collect();

        timed.sort_by_key(|(start_ms, _, _)| *start_ms);

        let cues: Vec<SubtitleCue> = timed
            .into_iter()
            .enumerate()
            .map(|(i, (start_ms, end_ms, text))| SubtitleCue {
                index: i + 1,
                start_ms,
                end_ms,
                text: text.to_string(),
            })
            .collect();

        if cues.is_empty() || cues.iter().all(|cue| cue.text.trim().is_empty()) {
            return Err(AssemblyError::EmptyTrack);
        }

        Ok(SubtitleTrack::new(cues))
    }
}
