//! Singing exaggeration stage.
//!
//! Turns a raw viseme plus loudness and onset signals into the target
//! bar heights, layering rhythmic bounce, vibrato on held notes,
//! onset-driven closure and upgrades to bigger singing shapes on loud
//! sustained vowels.

use serde::Serialize;

use crate::{
    onset::Onset,
    viseme::{Viseme, BAR_COUNT},
};

/// Oscillator rates in radians per second.
const WOBBLE_RATE: f32 = 5.5;
const BOUNCE_RATE: f32 = 7.5;
const VIBRATO_RATE: f32 = 13.0;
/// A vowel held this long reaches full hold strength.
const HOLD_SATURATION_S: f32 = 0.35;
const ENERGY_GATE_FLOOR: f32 = 0.01;
const ENERGY_GATE_RANGE: f32 = 0.09;
const ENERGY_SCALE_BASE: f32 = 0.35;
const ENERGY_SCALE_SPAN: f32 = 1.4;
const BOUNCE_DEPTH: f32 = 0.14;
const VIBRATO_DEPTH: f32 = 0.08;
const VIBRATO_HOLD_MIN: f32 = 0.25;
const ONSET_SHRINK: f32 = 0.35;
const SING_RMS_MIN: f32 = 0.11;
const SING_GATE_MIN: f32 = 0.75;
const WOBBLE_DEPTH: f32 = 0.045;
const WOBBLE_BAR_OFFSET: f32 = 0.9;
/// Bars never collapse below this height so the mouth stays visible.
const MIN_BAR_HEIGHT: f32 = 2.0;
/// Normaliser for the openness scalar.
const OPENNESS_REFERENCE: f32 = 62.0;
/// A REST frame only reports isRest below this stricter RMS floor,
/// preventing flicker at the silence boundary.
const REST_RMS_MAX: f32 = 0.015;

/// Target shape emitted for one frame.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ShapeFrame {
    pub viseme: Viseme,
    pub heights: [f32; BAR_COUNT],
    /// Overall mouth opening in [0, 1], used by hosts for glow and
    /// other intensity cues.
    pub openness: f32,
    pub is_rest: bool,
}

/// Stateful exaggerator. The three phase accumulators advance every
/// tick regardless of input, so motion stays continuous across viseme
/// changes.
#[derive(Debug)]
pub struct SingingExaggerator {
    wobble_phase: f32,
    bounce_phase: f32,
    vibrato_phase: f32,
    hold_timer: f32,
    hold_strength: f32,
    previous_viseme: Viseme,
}

impl SingingExaggerator {
    pub fn new() -> Self {
        Self {
            wobble_phase: 0.0,
            bounce_phase: 0.0,
            vibrato_phase: 0.0,
            hold_timer: 0.0,
            hold_strength: 0.0,
            previous_viseme: Viseme::Rest,
        }
    }

    /// Produces the target shape for this frame. `dt` is the frame
    /// delta in seconds; `emotion_amplitude` comes from the active
    /// emotion modifier.
    pub fn process(
        &mut self,
        viseme: Viseme,
        rms: f32,
        onset: Onset,
        dt: f32,
        emotion_amplitude: f32,
    ) -> ShapeFrame {
        self.wobble_phase += dt * WOBBLE_RATE;
        self.bounce_phase += dt * BOUNCE_RATE;
        self.vibrato_phase += dt * VIBRATO_RATE;

        let is_vowel = viseme.is_vowel();
        let is_rest = viseme == Viseme::Rest;

        if viseme == self.previous_viseme && is_vowel {
            self.hold_timer += dt;
            self.hold_strength = (self.hold_timer / HOLD_SATURATION_S).min(1.0);
        } else {
            self.hold_timer = 0.0;
            self.hold_strength = 0.0;
        }
        self.previous_viseme = viseme;

        // Mouth opening tracks audio energy: near-silence collapses the
        // shape, loud passages scale up to ~1.75x.
        let energy_gate = ((rms - ENERGY_GATE_FLOOR) / ENERGY_GATE_RANGE).max(0.0);
        let energy_scale = ENERGY_SCALE_BASE + energy_gate.min(1.0) * ENERGY_SCALE_SPAN;

        let bounce = if is_vowel {
            1.0 + self.bounce_phase.sin().max(0.0) * BOUNCE_DEPTH * energy_gate.min(1.0)
        } else {
            1.0
        };

        let vibrato = if is_vowel && self.hold_strength > VIBRATO_HOLD_MIN {
            1.0 + self.vibrato_phase.sin() * VIBRATO_DEPTH * self.hold_strength
        } else {
            1.0
        };

        // Onset punch shrinks the mouth briefly, reading as a consonant.
        let onset_shrink = if onset.is_onset && !is_rest {
            1.0 - onset.strength * ONSET_SHRINK
        } else {
            1.0
        };

        // Loud sustained vowels swap in the bigger singing shapes.
        let mut effective = viseme;
        if is_vowel && rms > SING_RMS_MIN && energy_gate > SING_GATE_MIN {
            effective = match viseme {
                Viseme::OpenAa | Viseme::OpenAe => Viseme::SingBig,
                _ => Viseme::SingMid,
            };
        }

        let base = effective.reference_shape();
        let scale = energy_scale * bounce * vibrato * emotion_amplitude * onset_shrink;

        let mut heights = [0.0; BAR_COUNT];
        let mut peak = 0.0f32;
        for (index, height) in heights.iter_mut().enumerate() {
            let wobble = if is_vowel {
                1.0 + (self.wobble_phase + index as f32 * WOBBLE_BAR_OFFSET).sin() * WOBBLE_DEPTH
            } else {
                1.0
            };
            *height = (base[index] * scale * wobble).max(MIN_BAR_HEIGHT);
            peak = peak.max(*height);
        }

        ShapeFrame {
            viseme: effective,
            heights,
            openness: (peak / OPENNESS_REFERENCE).clamp(0.0, 1.0),
            is_rest: is_rest && rms < REST_RMS_MAX,
        }
    }

    pub fn reset(&mut self) {
        self.wobble_phase = 0.0;
        self.bounce_phase = 0.0;
        self.vibrato_phase = 0.0;
        self.hold_timer = 0.0;
        self.hold_strength = 0.0;
        self.previous_viseme = Viseme::Rest;
    }
}

impl Default for SingingExaggerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 0.016;

    fn no_onset() -> Onset {
        Onset::default()
    }

    #[test]
    fn silence_collapses_to_the_visible_floor() {
        let mut stage = SingingExaggerator::new();
        let frame = stage.process(Viseme::Rest, 0.005, no_onset(), DT, 1.0);
        assert!(frame.is_rest);
        assert!(frame.heights.iter().all(|h| *h == MIN_BAR_HEIGHT));
    }

    #[test]
    fn rest_above_the_strict_floor_is_not_reported_as_rest() {
        let mut stage = SingingExaggerator::new();
        let frame = stage.process(Viseme::Rest, 0.02, no_onset(), DT, 1.0);
        assert!(!frame.is_rest);
    }

    #[test]
    fn hold_strength_ramps_on_a_sustained_vowel() {
        let mut stage = SingingExaggerator::new();
        // First frame resets the timer (previous viseme was REST).
        stage.process(Viseme::OpenAa, 0.08, no_onset(), 0.1, 1.0);
        let mut previous = stage.hold_strength;
        for _ in 0..4 {
            stage.process(Viseme::OpenAa, 0.08, no_onset(), 0.1, 1.0);
            assert!(stage.hold_strength >= previous);
            previous = stage.hold_strength;
        }
        assert!((stage.hold_strength - 1.0).abs() < 1e-6);

        // Any viseme change drops the hold immediately.
        stage.process(Viseme::OpenEe, 0.08, no_onset(), 0.1, 1.0);
        assert_eq!(stage.hold_strength, 0.0);
    }

    #[test]
    fn loud_sustained_vowels_upgrade_to_singing_shapes() {
        let mut stage = SingingExaggerator::new();
        let frame = stage.process(Viseme::OpenAa, 0.15, no_onset(), DT, 1.0);
        assert_eq!(frame.viseme, Viseme::SingBig);

        let frame = stage.process(Viseme::OpenEe, 0.15, no_onset(), DT, 1.0);
        assert_eq!(frame.viseme, Viseme::SingMid);

        // Below the energy threshold the raw viseme passes through.
        let frame = stage.process(Viseme::OpenAa, 0.08, no_onset(), DT, 1.0);
        assert_eq!(frame.viseme, Viseme::OpenAa);
    }

    #[test]
    fn onsets_shrink_non_rest_shapes() {
        let mut plain = SingingExaggerator::new();
        let mut punched = SingingExaggerator::new();
        let onset = Onset {
            is_onset: true,
            strength: 1.0,
        };

        let reference = plain.process(Viseme::OpenAa, 0.08, no_onset(), DT, 1.0);
        let shrunk = punched.process(Viseme::OpenAa, 0.08, onset, DT, 1.0);
        for (a, b) in shrunk.heights.iter().zip(reference.heights.iter()) {
            assert!(a < b, "onset should shrink every bar ({a} vs {b})");
        }
    }

    #[test]
    fn openness_is_clamped_to_unit_range() {
        let mut stage = SingingExaggerator::new();
        let frame = stage.process(Viseme::OpenAe, 0.3, no_onset(), DT, 1.5);
        assert!(frame.openness <= 1.0);
        assert!(frame.openness > 0.5);
    }

    #[test]
    fn reset_returns_to_neutral_state() {
        let mut stage = SingingExaggerator::new();
        for _ in 0..10 {
            stage.process(Viseme::OpenAa, 0.2, no_onset(), 0.1, 1.0);
        }
        stage.reset();
        assert_eq!(stage.hold_strength, 0.0);
        assert_eq!(stage.previous_viseme, Viseme::Rest);
        assert_eq!(stage.bounce_phase, 0.0);
    }
}
