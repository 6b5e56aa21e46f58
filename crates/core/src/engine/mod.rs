//! Orchestrator for the per-frame pipeline.
//!
//! Runs extractor, onset detector, classifier, exaggerator and smoother
//! in strict order once per tick, owns all cross-frame state and
//! applies the active emotion modifier.

use serde::Serialize;

use crate::{
    analysis::FeatureExtractor,
    classifier::{self, SILENCE_FLOOR},
    config::EngineConfig,
    emotion::Emotion,
    exaggerate::SingingExaggerator,
    onset::OnsetDetector,
    smoother::Smoother,
    source::AnalysisSource,
    viseme::{Viseme, BAR_COUNT},
    Result,
};

/// Delta-time clamp, so a pause or tab switch never produces a jump.
const MAX_DT_S: f32 = 0.05;
/// Fresh onsets above this strength snap the mouth closed before the
/// next interpolation step.
const SNAP_STRENGTH: f32 = 0.45;

/// Per-frame output consumed by the host render loop. Heights are a
/// copy; retaining a result across frames is safe.
#[derive(Debug, Clone, Serialize)]
pub struct FrameResult {
    pub viseme: Viseme,
    pub heights: [f32; BAR_COUNT],
    pub openness: f32,
    pub is_rest: bool,
    pub phoneme: &'static str,
}

/// The lip sync engine. Single-threaded and call-driven: the host
/// invokes [`LipSyncEngine::tick`] once per displayed frame; every
/// stage is a pure computation over fixed-size buffers.
pub struct LipSyncEngine {
    config: EngineConfig,
    source: Option<Box<dyn AnalysisSource>>,
    extractor: FeatureExtractor,
    onset: OnsetDetector,
    exaggerator: SingingExaggerator,
    smoother: Smoother,
    emotion: Emotion,
    time_buffer: Vec<f32>,
    frequency_buffer: Vec<f32>,
    ready: bool,
    previous_onset: bool,
    last_tick_ms: Option<f64>,
}

impl LipSyncEngine {
    pub fn new(config: EngineConfig) -> Self {
        let sample_rate = config.sample_rate;
        Self {
            config,
            source: None,
            extractor: FeatureExtractor::new(sample_rate),
            onset: OnsetDetector::new(),
            exaggerator: SingingExaggerator::new(),
            smoother: Smoother::new(),
            emotion: Emotion::default(),
            time_buffer: Vec::new(),
            frequency_buffer: Vec::new(),
            ready: false,
            previous_onset: false,
            last_tick_ms: None,
        }
    }

    /// Binds the analysis source and marks the engine ready. Rejects
    /// unusable buffer geometry here so `tick` can stay infallible.
    pub fn init(&mut self, source: Box<dyn AnalysisSource>, sample_rate: u32) -> Result<()> {
        self.config.sample_rate = sample_rate;
        self.config.validate()?;

        self.extractor = FeatureExtractor::new(sample_rate);
        self.time_buffer = vec![0.0; self.config.window_size];
        self.frequency_buffer = vec![0.0; self.config.window_size / 2];
        self.source = Some(source);
        self.reset();
        self.ready = true;
        tracing::info!(
            sample_rate,
            window_size = self.config.window_size,
            "lip sync engine ready"
        );
        Ok(())
    }

    /// Whether a source is bound and the engine is producing shapes.
    pub fn is_active(&self) -> bool {
        self.ready
    }

    pub fn emotion(&self) -> Emotion {
        self.emotion
    }

    /// Swaps the active emotion modifier. Unknown names fall back to
    /// the default mood.
    pub fn set_emotion(&mut self, name: &str) {
        self.emotion = Emotion::parse(name);
        tracing::debug!(emotion = ?self.emotion, "emotion changed");
    }

    /// Clears all stage state and restarts the delta-time clock. Call
    /// on track change or seek so stale oscillator phases and onset
    /// history cannot glitch the next frame.
    pub fn reset(&mut self) {
        self.onset.reset();
        self.exaggerator.reset();
        self.smoother.reset();
        self.previous_onset = false;
        self.last_tick_ms = None;
    }

    /// Runs one pipeline pass. `now_ms` is the host's monotonic clock;
    /// it drives delta-time and the onset refractory gate. Always
    /// returns a renderable shape, degrading to neutral when idle.
    pub fn tick(&mut self, is_playing: bool, now_ms: f64) -> FrameResult {
        let dt = match self.last_tick_ms {
            Some(last) => (((now_ms - last) / 1_000.0) as f32).clamp(0.0, MAX_DT_S),
            None => 0.0,
        };
        self.last_tick_ms = Some(now_ms);

        if !self.ready || !is_playing {
            return self.idle_frame();
        }
        let Some(source) = self.source.as_mut() else {
            return self.idle_frame();
        };

        source.write_time_domain(&mut self.time_buffer);
        source.write_frequency_domain(&mut self.frequency_buffer);

        let features = self.extractor.extract(&self.time_buffer, &self.frequency_buffer);
        let onset = self.onset.detect(&self.frequency_buffer, now_ms);

        if onset.is_onset && onset.strength > SNAP_STRENGTH && !self.previous_onset {
            tracing::debug!(strength = onset.strength, "onset snap");
            self.smoother.snap_closed();
        }
        self.previous_onset = onset.is_onset;

        let viseme = classifier::classify(&features, features.rms < SILENCE_FLOOR);
        let modifier = self.emotion.modifier();
        let shape = self
            .exaggerator
            .process(viseme, features.rms, onset, dt, modifier.amplitude);

        self.smoother.set_target(shape.heights);
        let heights = self.smoother.step(modifier.speed);

        FrameResult {
            viseme: shape.viseme,
            heights,
            openness: shape.openness,
            is_rest: shape.is_rest,
            phoneme: shape.viseme.phoneme_label(),
        }
    }

    /// Drives the displayed shape toward neutral while not ready or not
    /// playing. Skipping real ticks is always safe; smoothing simply
    /// keeps decaying.
    fn idle_frame(&mut self) -> FrameResult {
        self.smoother.set_target(Smoother::neutral_target());
        FrameResult {
            viseme: Viseme::Rest,
            heights: self.smoother.step(1.0),
            openness: 0.0,
            is_rest: true,
            phoneme: Viseme::Rest.phoneme_label(),
        }
    }
}

impl std::fmt::Debug for LipSyncEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LipSyncEngine")
            .field("ready", &self.ready)
            .field("emotion", &self.emotion)
            .field("window_size", &self.config.window_size)
            .finish()
    }
}
