/// One timed caption in a subtitle track.
///
/// Indices are 1-based and dense; they are assigned at assembly time, not
/// carried over from segment positions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubtitleCue {
    pub index: usize,
    pub start_ms: u64,
    pub end_ms: u64,
    pub text: String,
}

impl SubtitleCue {
    /// Render this cue as one SRT block, without the trailing blank line.
    pub fn srt_block(&self) -> String {
        format!(
            "{}\n{} --> {}\n{}\n",
            self.index,
            format_timestamp(self.start_ms),
            format_timestamp(self.end_ms),
            self.text
        )
    }
}

/// Format milliseconds as an SRT timestamp, `HH:MM:SS,mmm`.
pub fn format_timestamp(ms: u64) -> String {
    let hours = ms / 3_600_000;
    let minutes = (ms % 3_600_000) / 60_000;
    let seconds = (ms % 60_000) / 1000;
    let millis = ms % 1000;
    format!("{hours:02}:{minutes:02}:{seconds:02},{millis:03}")
}

/// Parse an SRT timestamp back to milliseconds.
pub fn parse_timestamp(value: &str) -> Option<u64> {
    let (clock, millis) = value.split_once(',')?;
    let mut parts = clock.split(':');
    let hours: u64 = parts.next()?.parse().ok()?;
    let minutes: u64 = parts.next()?.parse().ok()?;
    let seconds: u64 = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    let millis: u64 = millis.parse().ok()?;
    Some(((hours * 60 + minutes) * 60 + seconds) * 1000 + millis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::zero(0, "00:00:00,000")]
    #[case::millis_only(999, "00:00:00,999")]
    #[case::one_second(1000, "00:00:01,000")]
    #[case::typical_window(12_000, "00:00:12,000")]
    #[case::minute_rollover(61_999, "00:01:01,999")]
    #[case::one_hour(3_600_000, "01:00:00,000")]
    #[case::long_recording(7_322_077, "02:02:02,077")]
    fn test_format_timestamp(#[case] ms: u64, #[case] expected: &str) {
        assert_eq!(format_timestamp(ms), expected);
    }

    #[rstest]
    #[case(0)]
    #[case(1)]
    #[case(999)]
    #[case(6000)]
    #[case(59_999)]
    #[case(3_599_999)]
    #[case(86_400_000)]
    fn test_timestamp_round_trip(#[case] ms: u64) {
        assert_eq!(parse_timestamp(&format_timestamp(ms)), Some(ms));
    }

    #[rstest]
    #[case::no_millis("00:00:01")]
    #[case::too_many_fields("00:00:00:01,000")]
    #[case::not_numeric("aa:bb:cc,ddd")]
    #[case::empty("")]
    fn test_parse_rejects_malformed(#[case] value: &str) {
        assert_eq!(parse_timestamp(value), None);
    }

    #[test]
    fn test_srt_block_layout() {
        let cue = SubtitleCue {
            index: 2,
            start_ms: 6000,
            end_ms: 18_000,
            text: "went to the park".to_string(),
        };
        assert_eq!(
            cue.srt_block(),
            "2\n00:00:06,000 --> 00:00:18,000\nwent to the park\n"
        );
    }
}
