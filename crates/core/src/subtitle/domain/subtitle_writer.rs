use std::path::{Path, PathBuf};

use thiserror::Error;

use super::subtitle_track::SubtitleTrack;

#[derive(Error, Debug)]
pub enum TrackWriteError {
    #[error("refusing to write an empty subtitle track to {path}")]
    BlankTrack { path: PathBuf },
    #[error("failed to write subtitle file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("subtitle file {path} is empty after writing")]
    EmptyFile { path: PathBuf },
}

/// Domain interface for persisting an assembled subtitle track.
pub trait SubtitleWriter: Send {
    fn write(&self, path: &Path, track: &SubtitleTrack) -> Result<(), TrackWriteError>;
}
