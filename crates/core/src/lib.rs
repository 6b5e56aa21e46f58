//! Core library for the real-time lip sync engine.
//!
//! Given a live stream of audio samples the engine infers, once per
//! displayed frame, a plausible mouth shape (eight bar heights) that
//! appears synchronized to whatever is playing — no transcript, phoneme
//! timeline or lyrics required. Each module owns one pipeline stage:
//! spectral feature extraction, onset detection, the rule-based shape
//! classifier, the singing exaggeration stage and the smoothing
//! interpolator, orchestrated by [`LipSyncEngine`].

pub mod analysis;
pub mod classifier;
pub mod config;
pub mod emotion;
pub mod engine;
pub mod error;
pub mod exaggerate;
pub mod onset;
pub mod smoother;
pub mod source;
pub mod viseme;

pub use analysis::{FeatureExtractor, FeatureVector};
pub use classifier::classify;
pub use config::EngineConfig;
pub use emotion::{Emotion, EmotionModifier};
pub use engine::{FrameResult, LipSyncEngine};
pub use error::{LipSyncError, Result};
pub use exaggerate::{ShapeFrame, SingingExaggerator};
pub use onset::{Onset, OnsetDetector};
pub use smoother::Smoother;
pub use source::{AnalysisSource, FftAnalysisSource};
pub use viseme::{Viseme, BAR_COUNT};
