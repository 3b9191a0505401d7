pub mod audio;
pub mod media;
pub mod pipeline;
pub mod shared;
pub mod subtitle;
pub mod transcription;
