use super::subtitle_cue::SubtitleCue;

/// An ordered list of cues and its canonical SRT rendering.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubtitleTrack {
    cues: Vec<SubtitleCue>,
}

impl SubtitleTrack {
    pub fn new(cues: Vec<SubtitleCue>) -> Self {
        Self { cues }
    }

    pub fn cues(&self) -> &[SubtitleCue] {
        &self.cues
    }

    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }

    /// Serialize as SRT: blocks separated by a blank line, one trailing
    /// newline at the end. The same cues always render to the same bytes.
    pub fn to_srt(&self) -> String {
        self.cues
            .iter()
            .map(|cue| cue.srt_block())
            .collect::<Vec<_>>()
            .join("\n")
    }
}
