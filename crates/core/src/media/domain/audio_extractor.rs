use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::audio::domain::audio_buffer::AudioBuffer;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("no audio track found in {path}")]
    NoAudioTrack { path: PathBuf },
    #[error("failed to decode audio from {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: ffmpeg_next::Error,
    },
}

/// Domain interface for pulling the audio track out of a media file.
///
/// Implementations decode the best audio stream to a mono PCM buffer at the
/// pipeline sample rate. A file without a usable audio stream is a distinct
/// failure from one that cannot be decoded, because the user remedies differ.
pub trait AudioExtractor: Send {
    fn extract(&self, path: &Path) -> Result<AudioBuffer, ExtractError>;
}
