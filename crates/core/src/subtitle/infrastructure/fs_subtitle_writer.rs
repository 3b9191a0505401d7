use std::fs;
use std::path::Path;

use crate::subtitle::domain::subtitle_track::SubtitleTrack;
use crate::subtitle::domain::subtitle_writer::{SubtitleWriter, TrackWriteError};

/// Writes SRT files to the local filesystem, refusing blank output and
/// verifying the file landed non-empty.
pub struct FsSubtitleWriter;

impl FsSubtitleWriter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FsSubtitleWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl SubtitleWriter for FsSubtitleWriter {
    fn write(&self, path: &Path, track: &SubtitleTrack) -> Result<(), TrackWriteError> {
        let rendered = track.to_srt();
        if rendered.trim().is_empty() {
            return Err(TrackWriteError::BlankTrack {
                path: path.to_path_buf(),
            });
        }

        fs::write(path, rendered.as_bytes()).map_err(|e| TrackWriteError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let written = fs::metadata(path).map_err(|e| TrackWriteError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        if written.len() == 0 {
            return Err(TrackWriteError::EmptyFile {
                path: path.to_path_buf(),
            });
        }

        Ok(())
    }
}
