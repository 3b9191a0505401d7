/// Sample rate every decoded audio track is resampled to before recognition.
pub const PIPELINE_SAMPLE_RATE: u32 = 16000;

/// Length of each recognition window.
pub const SEGMENT_WINDOW_MS: u64 = 12_000;

/// Stride between successive windows (50% overlap).
pub const SEGMENT_STEP_MS: u64 = 6_000;

/// Windows shorter than this carry too little context to transcribe.
pub const MIN_VIABLE_SEGMENT_MS: u64 = 1_000;

/// Recognition attempts per segment, including the first.
pub const MAX_RECOGNITION_ATTEMPTS: usize = 2;

/// Pause before retrying a segment after a transient transport fault.
pub const TRANSIENT_RETRY_BACKOFF_MS: u64 = 1_000;

/// Trimmed transcripts shorter than this are treated as recognition noise.
pub const MIN_TRANSCRIPT_CHARS: usize = 3;

/// Concurrent recognition requests. Kept modest to stay inside the rate
/// limits of hosted transcription services.
pub const DEFAULT_WORKER_COUNT: usize = 4;

pub const HTTP_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const HTTP_REQUEST_TIMEOUT_SECS: u64 = 30;

pub const SUBTITLE_EXTENSION: &str = "srt";
