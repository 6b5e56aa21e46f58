use std::{
    f32::consts::PI,
    fmt,
    sync::{Arc, Mutex, MutexGuard},
};

use realfft::{num_complex::Complex32, RealFftPlanner, RealToComplex};

use crate::{LipSyncError, Result};

/// Spectrum values below this floor are reported as silence.
const DB_FLOOR: f32 = -120.0;
const MAGNITUDE_EPSILON: f32 = 1e-6;

/// Per-tick analysis buffer provider.
///
/// The engine asks the bound source, once per frame, for a fixed-length
/// time-domain window and a dB-scale frequency spectrum captured from
/// the same instant. The pipeline itself never performs the transform.
pub trait AnalysisSource {
    /// Fills `out` with the most recent time-domain samples in [-1, 1].
    fn write_time_domain(&mut self, out: &mut [f32]);
    /// Fills `out` with dB-scale magnitudes for the lower half of the
    /// spectrum.
    fn write_frequency_domain(&mut self, out: &mut [f32]);
}

/// Analysis source for hosts that only have raw samples.
///
/// Keeps a ring of the most recent window; the frequency readout
/// applies a Hann window and a forward FFT on demand. Cloneable so the
/// host can keep pushing samples after handing the source to the
/// engine.
#[derive(Clone)]
pub struct FftAnalysisSource {
    shared: Arc<Mutex<FftState>>,
}

struct FftState {
    window: Vec<f32>,
    position: usize,
    plan: Arc<dyn RealToComplex<f32>>,
    input: Vec<f32>,
    spectrum: Vec<Complex32>,
    scratch: Vec<Complex32>,
    hann: Vec<f32>,
}

impl FftAnalysisSource {
    pub fn new(window_size: usize) -> Result<Self> {
        if !window_size.is_power_of_two() || window_size < 256 {
            return Err(LipSyncError::InvalidInput(
                "analysis window must be a power of two of at least 256 samples",
            ));
        }

        let mut planner = RealFftPlanner::<f32>::new();
        let plan = planner.plan_fft_forward(window_size);
        let input = plan.make_input_vec();
        let spectrum = plan.make_output_vec();
        let scratch = plan.make_scratch_vec();

        let hann = (0..window_size)
            .map(|index| {
                0.5 - 0.5 * ((2.0 * PI * index as f32) / (window_size as f32 - 1.0)).cos()
            })
            .collect();

        Ok(Self {
            shared: Arc::new(Mutex::new(FftState {
                window: vec![0.0; window_size],
                position: 0,
                plan,
                input,
                spectrum,
                scratch,
                hann,
            })),
        })
    }

    /// Appends host samples to the ring, overwriting the oldest.
    pub fn push_samples(&self, samples: &[f32]) {
        if let Ok(mut state) = self.shared.lock() {
            for &sample in samples {
                let position = state.position;
                state.window[position] = sample;
                state.position = (position + 1) % state.window.len();
            }
        }
    }

    fn lock(&self) -> Option<MutexGuard<'_, FftState>> {
        self.shared.lock().ok()
    }
}

impl FftState {
    /// Copies the ring into `out`, oldest sample first.
    fn unroll_into(&self, out: &mut [f32]) {
        let len = self.window.len().min(out.len());
        for (index, slot) in out.iter_mut().enumerate().take(len) {
            *slot = self.window[(self.position + index) % self.window.len()];
        }
    }
}

impl AnalysisSource for FftAnalysisSource {
    fn write_time_domain(&mut self, out: &mut [f32]) {
        match self.lock() {
            Some(state) => state.unroll_into(out),
            None => out.fill(0.0),
        }
    }

    fn write_frequency_domain(&mut self, out: &mut [f32]) {
        let Some(mut state) = self.lock() else {
            out.fill(DB_FLOOR);
            return;
        };
        let state = &mut *state;

        for (index, slot) in state.input.iter_mut().enumerate() {
            *slot = state.window[(state.position + index) % state.window.len()] * state.hann[index];
        }

        if state
            .plan
            .process_with_scratch(&mut state.input, &mut state.spectrum, &mut state.scratch)
            .is_err()
        {
            out.fill(DB_FLOOR);
            return;
        }

        let scale = 2.0 / state.window.len() as f32;
        let bins = out.len().min(state.spectrum.len());
        for (slot, bin) in out.iter_mut().zip(state.spectrum.iter()).take(bins) {
            let magnitude = (bin.norm() * scale).max(MAGNITUDE_EPSILON);
            *slot = (20.0 * magnitude.log10()).max(DB_FLOOR);
        }
        out[bins..].fill(DB_FLOOR);
    }
}

impl fmt::Debug for FftAnalysisSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FftAnalysisSource").finish()
    }
}
