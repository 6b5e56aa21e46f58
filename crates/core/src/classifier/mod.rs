//! Rule-based mouth shape classifier.
//!
//! An ordered decision list over a handful of spectral statistics; later
//! rules assume earlier ones did not match, so the order is part of the
//! contract. All thresholds are empirically tuned constants, kept as
//! named values rather than re-derived.

use crate::{analysis::FeatureVector, viseme::Viseme};

/// RMS below this is treated as silence and always classifies as REST.
pub const SILENCE_FLOOR: f32 = 0.006;

const SIBILANT_ZCR: f32 = 0.18;
const SIBILANT_PRESENCE: f32 = 0.22;
const SIBILANT_F1_MAX: f32 = 0.18;
const DENTAL_ZCR: f32 = 0.13;
const DENTAL_PRESENCE: f32 = 0.14;
const NASAL_RMS_MAX: f32 = 0.035;
const NASAL_CENTROID_MAX: f32 = 700.0;
const NASAL_ZCR_MAX: f32 = 0.06;
const CLOSED_ZCR_MAX: f32 = 0.025;
const CLOSED_RMS_MAX: f32 = 0.012;
const VOICED_PITCH_MIN: f32 = 60.0;
const VOICED_ZCR_MAX: f32 = 0.17;
const LOUD_RMS: f32 = 0.05;
const OPEN_GAIN: f32 = 6.0;
const FRONT_GAIN: f32 = 4.0;

/// Maps a feature vector (plus a silence flag) to a viseme. Pure and
/// deterministic: the same inputs always yield the same shape.
pub fn classify(features: &FeatureVector, is_silent: bool) -> Viseme {
    if is_silent || features.rms < SILENCE_FLOOR {
        return Viseme::Rest;
    }

    let FeatureVector {
        rms,
        zcr,
        f1,
        f2,
        centroid_hz,
        pitch_hz,
        presence,
        ..
    } = *features;

    // Sibilant: high ZCR plus strong presence band.
    if zcr > SIBILANT_ZCR && presence > SIBILANT_PRESENCE && f1 < SIBILANT_F1_MAX {
        return Viseme::Sibilant;
    }
    // Fricative.
    if zcr > DENTAL_ZCR && presence > DENTAL_PRESENCE {
        return Viseme::Dental;
    }
    // Nasal: very low energy with a dark spectrum.
    if rms < NASAL_RMS_MAX && centroid_hz < NASAL_CENTROID_MAX && zcr < NASAL_ZCR_MAX {
        return Viseme::Nasal;
    }
    // Plosive closure.
    if zcr < CLOSED_ZCR_MAX && rms < CLOSED_RMS_MAX {
        return Viseme::Closed;
    }

    // Voiced: place the mouth on the open/front quadrant map. The
    // boundaries are not an exhaustive partition; the trailing fallback
    // catches anything the quadrants miss.
    let is_voiced = pitch_hz > VOICED_PITCH_MIN && zcr < VOICED_ZCR_MAX;
    if is_voiced || rms > LOUD_RMS {
        let open = f1 * OPEN_GAIN;
        let front = f2 * FRONT_GAIN;

        if open < 0.32 && front > 0.62 {
            return Viseme::OpenEe;
        }
        if open < 0.32 && front > 0.40 {
            return Viseme::OpenIh;
        }
        if open > 0.62 && front < 0.48 {
            return Viseme::OpenAa;
        }
        if open > 0.46 && front < 0.44 {
            return Viseme::OpenAe;
        }
        if open < 0.28 && front < 0.28 {
            return Viseme::OpenUw;
        }
        if open < 0.48 && front < 0.38 {
            return Viseme::OpenOo;
        }
        if open > 0.3 && open < 0.55 {
            return Viseme::OpenEr;
        }
        return if open > 0.5 { Viseme::OpenAa } else { Viseme::OpenIh };
    }

    Viseme::MidOpen
}

#[cfg(test)]
mod tests {
    use super::*;

    fn features() -> FeatureVector {
        FeatureVector {
            rms: 0.1,
            zcr: 0.05,
            f1: 0.08,
            f2: 0.08,
            centroid_hz: 1_500.0,
            pitch_hz: 200.0,
            presence: 0.05,
            low_mid: 0.0,
            mid: 0.0,
            high_mid: 0.0,
        }
    }

    #[test]
    fn silence_always_wins() {
        let mut loud = features();
        loud.rms = 0.4;
        assert_eq!(classify(&loud, true), Viseme::Rest);

        let mut quiet = features();
        quiet.rms = 0.005;
        assert_eq!(classify(&quiet, false), Viseme::Rest);
    }

    #[test]
    fn is_deterministic() {
        let sample = features();
        let first = classify(&sample, false);
        for _ in 0..10 {
            assert_eq!(classify(&sample, false), first);
        }
    }

    #[test]
    fn noisy_bright_frames_are_sibilant() {
        let mut sample = features();
        sample.zcr = 0.3;
        sample.presence = 0.3;
        sample.f1 = 0.1;
        assert_eq!(classify(&sample, false), Viseme::Sibilant);
    }

    #[test]
    fn moderate_noise_is_dental() {
        let mut sample = features();
        sample.zcr = 0.15;
        sample.presence = 0.2;
        assert_eq!(classify(&sample, false), Viseme::Dental);
    }

    #[test]
    fn dark_quiet_frames_are_nasal() {
        let mut sample = features();
        sample.rms = 0.02;
        sample.centroid_hz = 500.0;
        sample.zcr = 0.03;
        assert_eq!(classify(&sample, false), Viseme::Nasal);
    }

    #[test]
    fn near_silent_low_zcr_is_a_closure() {
        let mut sample = features();
        sample.rms = 0.008;
        sample.zcr = 0.01;
        sample.centroid_hz = 2_000.0;
        sample.pitch_hz = 0.0;
        assert_eq!(classify(&sample, false), Viseme::Closed);
    }

    #[test]
    fn vowel_quadrants_map_to_shapes() {
        // Front close vowel.
        let mut sample = features();
        sample.f1 = 0.05;
        sample.f2 = 0.2;
        assert_eq!(classify(&sample, false), Viseme::OpenEe);

        // Open back vowel.
        let mut sample = features();
        sample.f1 = 0.12;
        sample.f2 = 0.1;
        assert_eq!(classify(&sample, false), Viseme::OpenAa);

        // Rounded close vowel.
        let mut sample = features();
        sample.f1 = 0.04;
        sample.f2 = 0.05;
        assert_eq!(classify(&sample, false), Viseme::OpenUw);
    }

    #[test]
    fn unvoiced_ambiguous_frames_default_to_mid_open() {
        let mut sample = features();
        sample.pitch_hz = 0.0;
        sample.zcr = 0.1;
        sample.rms = 0.03;
        sample.centroid_hz = 1_500.0;
        assert_eq!(classify(&sample, false), Viseme::MidOpen);
    }
}
