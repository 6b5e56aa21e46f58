use crate::analysis::db_to_linear;

/// Number of contiguous spectrum chunks used for flux.
const BAND_COUNT: usize = 8;
/// Length of the flux history ring.
const HISTORY_LEN: usize = 20;
/// Flux must exceed the running average by this ratio to fire.
const FLUX_RATIO: f32 = 1.8;
/// Absolute flux floor; keeps noise floors from firing.
const FLUX_FLOOR: f32 = 0.004;
/// Minimum time between two accepted onsets.
const REFRACTORY_MS: f64 = 70.0;
const STRENGTH_EPSILON: f32 = 1e-3;

/// Result of one detection pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct Onset {
    pub is_onset: bool,
    /// Normalised 0..1 measure of how far the flux cleared the average.
    pub strength: f32,
}

/// Half-wave rectified spectral flux detector for percussive and
/// syllabic onsets. Stateful across frames: keeps the previous per-band
/// energies, a short flux history and the last accepted onset time.
#[derive(Debug)]
pub struct OnsetDetector {
    previous_bands: [f32; BAND_COUNT],
    history: [f32; HISTORY_LEN],
    index: usize,
    last_onset_ms: f64,
}

impl OnsetDetector {
    pub fn new() -> Self {
        Self {
            previous_bands: [0.0; BAND_COUNT],
            history: [0.0; HISTORY_LEN],
            index: 0,
            last_onset_ms: 0.0,
        }
    }

    /// Runs one detection pass over a dB-scale spectrum at monotonic
    /// time `now_ms`. Bursts tighter than the refractory window never
    /// double-fire.
    pub fn detect(&mut self, spectrum_db: &[f32], now_ms: f64) -> Onset {
        let chunk = spectrum_db.len() / BAND_COUNT;
        if chunk == 0 {
            return Onset::default();
        }

        let mut flux = 0.0;
        for band in 0..BAND_COUNT {
            let mut energy = 0.0;
            for &db in &spectrum_db[band * chunk..(band + 1) * chunk] {
                energy += db_to_linear(db);
            }
            energy /= chunk as f32;

            let delta = energy - self.previous_bands[band];
            if delta > 0.0 {
                flux += delta;
            }
            self.previous_bands[band] = energy;
        }

        self.history[self.index % HISTORY_LEN] = flux;
        self.index += 1;
        let average: f32 = self.history.iter().sum::<f32>() / HISTORY_LEN as f32;

        let is_onset = flux > average * FLUX_RATIO
            && flux > FLUX_FLOOR
            && (now_ms - self.last_onset_ms) > REFRACTORY_MS;
        if is_onset {
            self.last_onset_ms = now_ms;
        }

        Onset {
            is_onset,
            strength: (flux / (average * 3.0 + STRENGTH_EPSILON)).min(1.0),
        }
    }

    pub fn reset(&mut self) {
        self.previous_bands = [0.0; BAND_COUNT];
        self.history = [0.0; HISTORY_LEN];
        self.index = 0;
        self.last_onset_ms = 0.0;
    }
}

impl Default for OnsetDetector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_spectrum(amplitude: f32, bins: usize) -> Vec<f32> {
        vec![20.0 * amplitude.log10(); bins]
    }

    #[test]
    fn silence_never_fires() {
        let mut detector = OnsetDetector::new();
        let spectrum = vec![-120.0f32; 1024];
        for tick in 0..50 {
            let onset = detector.detect(&spectrum, 1_000.0 + tick as f64 * 16.0);
            assert!(!onset.is_onset);
        }
    }

    #[test]
    fn detects_a_triple_energy_jump() {
        let mut detector = OnsetDetector::new();
        let quiet = flat_spectrum(0.05, 1024);
        let loud = flat_spectrum(0.15, 1024);

        // Warm up long enough that the initial transient onset is well
        // outside the refractory window.
        for tick in 0..10 {
            detector.detect(&quiet, 1_000.0 + tick as f64 * 16.0);
        }

        let onset = detector.detect(&loud, 1_160.0);
        assert!(onset.is_onset);
        assert!(onset.strength > 0.5);
    }

    #[test]
    fn respects_the_refractory_window() {
        let mut detector = OnsetDetector::new();
        let quiet = flat_spectrum(0.001, 1024);
        let loud = flat_spectrum(0.2, 1024);

        let mut onset_times = Vec::new();
        for tick in 0..100 {
            let now = 1_000.0 + tick as f64 * 10.0;
            let spectrum = if tick % 2 == 0 { &loud } else { &quiet };
            if detector.detect(spectrum, now).is_onset {
                onset_times.push(now);
            }
        }

        assert!(onset_times.len() > 1, "expected repeated onsets");
        for pair in onset_times.windows(2) {
            assert!(pair[1] - pair[0] > REFRACTORY_MS);
        }
    }

    #[test]
    fn steady_signal_stops_firing() {
        let mut detector = OnsetDetector::new();
        let spectrum = flat_spectrum(0.1, 1024);
        detector.detect(&spectrum, 1_000.0);
        for tick in 1..30 {
            let onset = detector.detect(&spectrum, 1_000.0 + tick as f64 * 16.0);
            assert!(!onset.is_onset, "steady spectrum fired at tick {tick}");
        }
    }
}
