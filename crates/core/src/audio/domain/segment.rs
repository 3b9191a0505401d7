/// One recognition window cut from a conditioned mono track, tagged with its
/// position on the original timeline.
#[derive(Clone, Debug)]
pub struct Segment {
    samples: Vec<f32>,
    sample_rate: u32,
    start_ms: u64,
    end_ms: u64,
}

impl Segment {
    pub fn new(samples: Vec<f32>, sample_rate: u32, start_ms: u64, end_ms: u64) -> Self {
        Self {
            samples,
            sample_rate,
            start_ms,
            end_ms,
        }
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn start_ms(&self) -> u64 {
        self.start_ms
    }

    pub fn end_ms(&self) -> u64 {
        self.end_ms
    }

    pub fn duration_ms(&self) -> u64 {
        self.end_ms - self.start_ms
    }
}
