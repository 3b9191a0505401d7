use crate::shared::constants::{MIN_VIABLE_SEGMENT_MS, SEGMENT_STEP_MS, SEGMENT_WINDOW_MS};

use super::audio_buffer::AudioBuffer;
use super::segment::Segment;

/// Cuts a mono track into fixed-length windows with overlap.
///
/// Windows advance by `step_ms` so that each one shares half its audio with
/// its neighbor; speech falling on a window boundary is always fully inside
/// the adjacent window. Cutting stops once a window reaches the end of the
/// track, and a track shorter than `min_viable_ms` yields no windows at all.
pub struct Segmenter {
    window_ms: u64,
    step_ms: u64,
    min_viable_ms: u64,
}

impl Segmenter {
    pub fn new(window_ms: u64, step_ms: u64, min_viable_ms: u64) -> Self {
        Self {
            window_ms,
            step_ms,
            min_viable_ms,
        }
    }

    /// Cut `audio` into windows. Expects mono input; slices are sample-accurate.
    pub fn segment(&self, audio: &AudioBuffer) -> Vec<Segment> {
        let total_ms = audio.duration_ms();
        let mut segments = Vec::new();
        let mut offset: u64 = 0;

        loop {
            let end = (offset + self.window_ms).min(total_ms);
            if end - offset < self.min_viable_ms {
                break;
            }

            let start_index = audio.sample_index_at_ms(offset);
            let end_index = audio.sample_index_at_ms(end);
            segments.push(Segment::new(
                audio.samples()[start_index..end_index].to_vec(),
                audio.sample_rate(),
                offset,
                end,
            ));

            if end == total_ms {
                break;
            }
            offset += self.step_ms;
        }

        segments
    }
}

impl Default for Segmenter {
    fn default() -> Self {
        Self::new(SEGMENT_WINDOW_MS, SEGMENT_STEP_MS, MIN_VIABLE_SEGMENT_MS)
    }
}
