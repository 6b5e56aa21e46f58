use serde::{Deserialize, Serialize};

/// Epsilon added to the total spectral energy so band ratios stay
/// finite on silence.
const TOTAL_ENERGY_EPSILON: f32 = 1e-4;
/// Autocorrelation pitch search range in Hz.
const PITCH_MIN_HZ: f32 = 80.0;
const PITCH_MAX_HZ: f32 = 800.0;

/// Compact spectral feature set for a single analysis window. Derived
/// fresh every tick and never retained across frames.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Root-mean-square energy of the time-domain window.
    pub rms: f32,
    /// Fraction of adjacent sample pairs whose signs differ.
    pub zcr: f32,
    /// First formant proxy: 300-900 Hz band over total energy. Tracks
    /// jaw openness.
    pub f1: f32,
    /// Second formant proxy: 900-2500 Hz band over total energy.
    /// Tracks front versus back articulation.
    pub f2: f32,
    /// Spectral centroid in Hz.
    pub centroid_hz: f32,
    /// Estimated fundamental in Hz, 0.0 when undetected.
    pub pitch_hz: f32,
    /// 4-8 kHz band normalised by total energy.
    pub presence: f32,
    /// Raw 250-800 Hz band energy.
    pub low_mid: f32,
    /// Raw 800-2000 Hz band energy.
    pub mid: f32,
    /// Raw 2-4 kHz band energy.
    pub high_mid: f32,
}

/// Converts a raw time/frequency buffer pair into a [`FeatureVector`].
///
/// The extractor does no audio IO and no Fourier transform of its own;
/// the host (or a [`crate::source::AnalysisSource`]) supplies both
/// buffers captured from the same instant.
#[derive(Debug, Clone)]
pub struct FeatureExtractor {
    sample_rate: f32,
}

impl FeatureExtractor {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate: sample_rate as f32,
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate as u32
    }

    /// Extracts the full feature set. `time` holds float samples in
    /// [-1, 1]; `spectrum_db` holds dB-scale magnitudes for the lower
    /// half of the spectrum. Degrades to an all-zero vector when either
    /// buffer is missing.
    pub fn extract(&self, time: &[f32], spectrum_db: &[f32]) -> FeatureVector {
        if time.is_empty() || spectrum_db.is_empty() {
            return FeatureVector::default();
        }

        let bin_hz = self.sample_rate / (2.0 * spectrum_db.len() as f32);

        let rms = compute_rms(time);
        let zcr = zero_crossing_rate(time);

        let low_mid = band_energy(spectrum_db, bin_hz, 250.0, 800.0);
        let mid = band_energy(spectrum_db, bin_hz, 800.0, 2000.0);
        let high_mid = band_energy(spectrum_db, bin_hz, 2000.0, 4000.0);
        let presence_raw = band_energy(spectrum_db, bin_hz, 4000.0, 8000.0);
        let total = band_energy(spectrum_db, bin_hz, 20.0, 16_000.0) + TOTAL_ENERGY_EPSILON;

        let f1 = band_energy(spectrum_db, bin_hz, 300.0, 900.0) / total;
        let f2 = band_energy(spectrum_db, bin_hz, 900.0, 2500.0) / total;

        FeatureVector {
            rms,
            zcr,
            f1,
            f2,
            centroid_hz: spectral_centroid(spectrum_db, bin_hz),
            pitch_hz: autocorrelation_pitch(time, self.sample_rate),
            presence: presence_raw / total,
            low_mid,
            mid,
            high_mid,
        }
    }
}

pub(crate) fn db_to_linear(db: f32) -> f32 {
    10f32.powf(db / 20.0)
}

fn compute_rms(samples: &[f32]) -> f32 {
    let sum: f32 = samples.iter().map(|sample| sample * sample).sum();
    (sum / samples.len() as f32).sqrt()
}

fn zero_crossing_rate(samples: &[f32]) -> f32 {
    let mut crossings = 0usize;
    for pair in samples.windows(2) {
        if (pair[0] >= 0.0) != (pair[1] >= 0.0) {
            crossings += 1;
        }
    }
    crossings as f32 / samples.len() as f32
}

/// Mean linear amplitude over the bins whose centre frequency falls in
/// `[lo_hz, hi_hz]`.
fn band_energy(spectrum_db: &[f32], bin_hz: f32, lo_hz: f32, hi_hz: f32) -> f32 {
    let lo = (lo_hz / bin_hz).floor() as usize;
    let hi = ((hi_hz / bin_hz).ceil() as usize).min(spectrum_db.len() - 1);
    if lo > hi {
        return 0.0;
    }

    let mut sum = 0.0;
    for &db in &spectrum_db[lo..=hi] {
        sum += db_to_linear(db);
    }
    sum / (hi - lo + 1) as f32
}

fn spectral_centroid(spectrum_db: &[f32], bin_hz: f32) -> f32 {
    let mut weighted = 0.0;
    let mut magnitude = 0.0;
    for (index, &db) in spectrum_db.iter().enumerate() {
        let linear = db_to_linear(db);
        weighted += index as f32 * linear;
        magnitude += linear;
    }

    if magnitude > 0.0 {
        (weighted / magnitude) * bin_hz
    } else {
        0.0
    }
}

/// Time-domain autocorrelation pitch estimate restricted to the lag
/// range corresponding to 80-800 Hz. O(window x lag range), which is
/// fine at one call per video frame.
fn autocorrelation_pitch(samples: &[f32], sample_rate: f32) -> f32 {
    let min_lag = ((sample_rate / PITCH_MAX_HZ).floor() as usize).max(1);
    let max_lag = ((sample_rate / PITCH_MIN_HZ).floor() as usize).min(samples.len() / 2);
    if min_lag > max_lag {
        return 0.0;
    }

    let mut best = f32::NEG_INFINITY;
    let mut period = 0usize;
    for lag in min_lag..=max_lag {
        let mut correlation = 0.0;
        for i in 0..samples.len() - lag {
            correlation += samples[i] * samples[i + lag];
        }
        if correlation > best {
            best = correlation;
            period = lag;
        }
    }

    if period > 0 {
        sample_rate / period as f32
    } else {
        0.0
    }
}
