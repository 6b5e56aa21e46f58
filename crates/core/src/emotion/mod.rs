use serde::{Deserialize, Serialize};

/// Host-selected mood that scales mouth amplitude and smoothing speed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Sleeping,
    Bored,
    Curious,
    Content,
    Happy,
    Excited,
    Grooving,
    Singing,
    Focused,
    Loving,
    Hyped,
}

/// Global modifier pair applied by the exaggeration and smoothing
/// stages while an emotion is active.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmotionModifier {
    pub amplitude: f32,
    pub speed: f32,
}

impl Emotion {
    /// Parses a host-provided name. Unknown names fall back to the
    /// default mood rather than erroring.
    pub fn parse(name: &str) -> Emotion {
        match name.trim().to_ascii_lowercase().as_str() {
            "sleeping" => Emotion::Sleeping,
            "bored" => Emotion::Bored,
            "curious" => Emotion::Curious,
            "content" => Emotion::Content,
            "happy" => Emotion::Happy,
            "excited" => Emotion::Excited,
            "grooving" => Emotion::Grooving,
            "singing" => Emotion::Singing,
            "focused" => Emotion::Focused,
            "loving" => Emotion::Loving,
            "hyped" => Emotion::Hyped,
            _ => Emotion::default(),
        }
    }

    pub fn modifier(self) -> EmotionModifier {
        let (amplitude, speed) = match self {
            Emotion::Sleeping => (0.25, 0.3),
            Emotion::Bored => (0.55, 0.6),
            Emotion::Curious => (0.85, 0.9),
            Emotion::Content => (1.0, 1.0),
            Emotion::Happy => (1.1, 1.1),
            Emotion::Excited => (1.35, 1.3),
            Emotion::Grooving => (1.2, 1.2),
            Emotion::Singing => (1.3, 1.0),
            Emotion::Focused => (0.9, 0.85),
            Emotion::Loving => (1.05, 0.95),
            Emotion::Hyped => (1.5, 1.4),
        };
        EmotionModifier { amplitude, speed }
    }
}

impl Default for Emotion {
    fn default() -> Self {
        Emotion::Happy
    }
}
