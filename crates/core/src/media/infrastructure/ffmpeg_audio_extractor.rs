use std::path::Path;

use crate::audio::domain::audio_buffer::AudioBuffer;
use crate::media::domain::audio_extractor::{AudioExtractor, ExtractError};
use crate::shared::constants::PIPELINE_SAMPLE_RATE;

/// Decodes the audio track of any container ffmpeg can open, resampled to
/// mono at the pipeline sample rate.
pub struct FfmpegAudioExtractor {
    target_sample_rate: u32,
}

impl FfmpegAudioExtractor {
    pub fn new() -> Self {
        Self {
            target_sample_rate: PIPELINE_SAMPLE_RATE,
        }
    }
}

impl Default for FfmpegAudioExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioExtractor for FfmpegAudioExtractor {
    fn extract(&self, path: &Path) -> Result<AudioBuffer, ExtractError> {
        ffmpeg_next::init().map_err(|e| decode_error(path, e))?;

        let mut ictx = ffmpeg_next::format::input(path).map_err(|e| decode_error(path, e))?;

        let audio_stream = ictx
            .streams()
            .best(ffmpeg_next::media::Type::Audio)
            .ok_or_else(|| ExtractError::NoAudioTrack {
                path: path.to_path_buf(),
            })?;

        let audio_stream_index = audio_stream.index();
        let codec_params = audio_stream.parameters();

        let codec_ctx = ffmpeg_next::codec::context::Context::from_parameters(codec_params)
            .map_err(|e| decode_error(path, e))?;
        let mut decoder = codec_ctx
            .decoder()
            .audio()
            .map_err(|e| decode_error(path, e))?;

        let mut resampler = ffmpeg_next::software::resampling::Context::get(
            decoder.format(),
            decoder.channel_layout(),
            decoder.rate(),
            ffmpeg_next::format::Sample::F32(ffmpeg_next::format::sample::Type::Planar),
            ffmpeg_next::ChannelLayout::MONO,
            self.target_sample_rate,
        )
        .map_err(|e| decode_error(path, e))?;

        let mut all_samples: Vec<f32> = Vec::new();
        let mut decoded_frame = ffmpeg_next::util::frame::audio::Audio::empty();
        let mut resampled_frame = ffmpeg_next::util::frame::audio::Audio::empty();

        for (stream, packet) in ictx.packets() {
            if stream.index() != audio_stream_index {
                continue;
            }

            decoder
                .send_packet(&packet)
                .map_err(|e| decode_error(path, e))?;

            while decoder.receive_frame(&mut decoded_frame).is_ok() {
                resampler
                    .run(&decoded_frame, &mut resampled_frame)
                    .map_err(|e| decode_error(path, e))?;
                extract_f32_samples(&resampled_frame, &mut all_samples);
            }
        }

        // Flush the decoder
        decoder.send_eof().map_err(|e| decode_error(path, e))?;
        while decoder.receive_frame(&mut decoded_frame).is_ok() {
            resampler
                .run(&decoded_frame, &mut resampled_frame)
                .map_err(|e| decode_error(path, e))?;
            extract_f32_samples(&resampled_frame, &mut all_samples);
        }

        // Flush the resampler (may have buffered samples)
        if let Ok(Some(delay)) = resampler.flush(&mut resampled_frame) {
            if delay.output > 0 {
                extract_f32_samples(&resampled_frame, &mut all_samples);
            }
        }

        // A stream that decodes to nothing gives the user the same remedy
        // as a missing one.
        if all_samples.is_empty() {
            return Err(ExtractError::NoAudioTrack {
                path: path.to_path_buf(),
            });
        }

        Ok(AudioBuffer::new(all_samples, self.target_sample_rate, 1))
    }
}

fn decode_error(path: &Path, source: ffmpeg_next::Error) -> ExtractError {
    ExtractError::Decode {
        path: path.to_path_buf(),
        source,
    }
}

/// Extract f32 samples from a planar mono resampled frame.
fn extract_f32_samples(frame: &ffmpeg_next::util::frame::audio::Audio, out: &mut Vec<f32>) {
    let num_samples = frame.samples();
    if num_samples == 0 {
        return;
    }
    let data = frame.data(0);
    let floats = unsafe { std::slice::from_raw_parts(data.as_ptr() as *const f32, num_samples) };
    out.extend_from_slice(floats);
}
