use std::f64::consts::PI;

use super::audio_buffer::AudioBuffer;

/// Peak target of the normalization stage, as headroom below full scale.
pub const NORMALIZE_HEADROOM_DB: f64 = 0.1;

/// RMS loudness below which the corrective gain stage kicks in.
pub const QUIET_THRESHOLD_DBFS: f64 = -30.0;

/// Gain applied by the corrective stage.
pub const QUIET_GAIN_DB: f64 = 10.0;

/// Cutoff of the rumble-removal high-pass filter.
pub const HIGH_PASS_CUTOFF_HZ: f64 = 80.0;

/// RMS level above which compression engages.
const COMPRESS_THRESHOLD_DBFS: f64 = -20.0;

/// Compression ratio above the threshold.
const COMPRESS_RATIO: f64 = 4.0;

const COMPRESS_ATTACK_MS: f64 = 5.0;
const COMPRESS_RELEASE_MS: f64 = 50.0;

/// Prepares a decoded track for speech recognition.
///
/// Stages run in a fixed order: downmix to mono, peak normalization to
/// -0.1 dBFS, a +10 dB corrective boost when the track is still quieter
/// than -30 dBFS RMS, an 80 Hz high-pass to strip rumble and hum, and
/// finally 4:1 dynamic-range compression so quiet speech survives next
/// to loud passages. There is no failure path: silence and clipped input
/// pass through unchanged in duration.
pub struct SignalConditioner;

impl SignalConditioner {
    pub fn new() -> Self {
        Self
    }

    pub fn condition(&self, audio: &AudioBuffer) -> AudioBuffer {
        let sample_rate = audio.sample_rate();
        let mut samples = downmix_mono(audio.samples(), audio.channels());

        peak_normalize(&mut samples);
        if rms_dbfs(&samples) < QUIET_THRESHOLD_DBFS {
            apply_gain_db(&mut samples, QUIET_GAIN_DB);
        }
        let samples = high_pass(&samples, sample_rate, HIGH_PASS_CUTOFF_HZ);
        let samples = compress_dynamic_range(
            &samples,
            sample_rate,
            COMPRESS_THRESHOLD_DBFS,
            COMPRESS_RATIO,
            COMPRESS_ATTACK_MS,
            COMPRESS_RELEASE_MS,
        );

        AudioBuffer::new(samples, sample_rate, 1)
    }
}

impl Default for SignalConditioner {
    fn default() -> Self {
        Self::new()
    }
}

/// Average interleaved channels down to one.
fn downmix_mono(samples: &[f32], channels: u16) -> Vec<f32> {
    if channels <= 1 {
        return samples.to_vec();
    }
    let channels = channels as usize;
    samples
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

/// Scale the peak to just under full scale. Silence is left untouched.
fn peak_normalize(samples: &mut [f32]) {
    let peak = samples.iter().map(|s| s.abs()).fold(0.0f32, f32::max);
    if peak == 0.0 {
        return;
    }
    let target = db_to_gain(-NORMALIZE_HEADROOM_DB) as f32;
    let gain = target / peak;
    for sample in samples.iter_mut() {
        *sample *= gain;
    }
}

/// RMS loudness relative to full scale. Silence reports negative infinity.
fn rms_dbfs(samples: &[f32]) -> f64 {
    if samples.is_empty() {
        return f64::NEG_INFINITY;
    }
    let mean_square =
        samples.iter().map(|s| (*s as f64).powi(2)).sum::<f64>() / samples.len() as f64;
    let rms = mean_square.sqrt();
    if rms <= 0.0 {
        return f64::NEG_INFINITY;
    }
    20.0 * rms.log10()
}

/// Apply a dB gain, saturating at full scale.
fn apply_gain_db(samples: &mut [f32], gain_db: f64) {
    let gain = db_to_gain(gain_db) as f32;
    for sample in samples.iter_mut() {
        *sample = (*sample * gain).clamp(-1.0, 1.0);
    }
}

/// First-order RC high-pass: y[n] = alpha * (y[n-1] + x[n] - x[n-1]).
fn high_pass(samples: &[f32], sample_rate: u32, cutoff_hz: f64) -> Vec<f32> {
    let n = samples.len();
    if n == 0 {
        return Vec::new();
    }

    let rc = 1.0 / (2.0 * PI * cutoff_hz);
    let dt = 1.0 / sample_rate as f64;
    let alpha = rc / (rc + dt);

    let mut out = vec![0.0f32; n];
    out[0] = samples[0];
    let mut last = samples[0] as f64;
    for i in 1..n {
        last = alpha * (last + samples[i] as f64 - samples[i - 1] as f64);
        out[i] = last as f32;
    }
    out
}

/// Downward compression driven by a trailing RMS window.
///
/// The detector measures RMS over the last `attack_ms` of audio. While it
/// reads above the threshold, attenuation ramps up toward the compressed
/// target at `max_attenuation / attack_frames` per sample; otherwise it
/// ramps down at `max_attenuation / release_frames` per sample, where
/// `max_attenuation` always follows the current detector reading. With a
/// 4:1 ratio the bottom 75% of the overshoot is attenuated.
fn compress_dynamic_range(
    samples: &[f32],
    sample_rate: u32,
    threshold_dbfs: f64,
    ratio: f64,
    attack_ms: f64,
    release_ms: f64,
) -> Vec<f32> {
    let n = samples.len();
    if n == 0 {
        return Vec::new();
    }

    let threshold = db_to_gain(threshold_dbfs);
    let attack_frames = attack_ms * sample_rate as f64 / 1000.0;
    let release_frames = release_ms * sample_rate as f64 / 1000.0;
    let window = attack_frames as usize;

    let mut out = Vec::with_capacity(n);
    let mut attenuation_db = 0.0f64;
    let mut window_sq_sum = 0.0f64;

    for i in 0..n {
        // Trailing window covers [i - window, i), clamped at the start.
        let window_len = i.min(window);
        let rms = if window_len == 0 {
            0.0
        } else {
            (window_sq_sum / window_len as f64).max(0.0).sqrt()
        };

        let db_over = if rms > 0.0 {
            (20.0 * (rms / threshold).log10()).max(0.0)
        } else {
            0.0
        };
        let max_attenuation = (1.0 - 1.0 / ratio) * db_over;

        if rms > threshold && attenuation_db <= max_attenuation {
            attenuation_db = (attenuation_db + max_attenuation / attack_frames)
                .min(max_attenuation);
        } else {
            attenuation_db = (attenuation_db - max_attenuation / release_frames).max(0.0);
        }

        if attenuation_db != 0.0 {
            out.push((samples[i] as f64 * db_to_gain(-attenuation_db)) as f32);
        } else {
            out.push(samples[i]);
        }

        window_sq_sum += (samples[i] as f64).powi(2);
        if i >= window {
            window_sq_sum -= (samples[i - window] as f64).powi(2);
        }
    }

    out
}

fn db_to_gain(db: f64) -> f64 {
    10.0f64.powf(db / 20.0)
}
