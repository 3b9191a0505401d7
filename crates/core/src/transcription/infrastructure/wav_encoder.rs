use std::io::Cursor;

use hound::{SampleFormat, WavSpec, WavWriter};

use crate::audio::domain::segment::Segment;

/// Encode a mono segment as a 16-bit PCM WAV held entirely in memory.
///
/// Segments are short enough that buffering the file avoids any temp-file
/// bookkeeping on the upload path.
pub fn encode(segment: &Segment) -> Result<Vec<u8>, hound::Error> {
    let spec = WavSpec {
        channels: 1,
        sample_rate: segment.sample_rate(),
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut buffer = Cursor::new(Vec::new());
    {
        let mut writer = WavWriter::new(&mut buffer, spec)?;
        for &sample in segment.samples() {
            let quantized = (sample * 32767.0).clamp(-32768.0, 32767.0) as i16;
            writer.write_sample(quantized)?;
        }
        writer.finalize()?;
    }

    Ok(buffer.into_inner())
}
