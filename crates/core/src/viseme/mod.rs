use serde::{Deserialize, Serialize};

/// Number of bars in a rendered mouth shape.
pub const BAR_COUNT: usize = 8;

/// Discrete mouth-shape category produced by the classifier.
///
/// Serialized names match the wire format consumed by front ends
/// (`OPEN_AA`, `SING_BIG`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Viseme {
    Rest,
    Closed,
    OpenAa,
    OpenAe,
    OpenEe,
    OpenIh,
    OpenOo,
    OpenUw,
    OpenEr,
    MidOpen,
    Dental,
    Sibilant,
    Nasal,
    SingBig,
    SingMid,
}

impl Viseme {
    /// Every viseme, in declaration order. Handy for table-driven tests
    /// and for dumping the shape library.
    pub const ALL: [Viseme; 15] = [
        Viseme::Rest,
        Viseme::Closed,
        Viseme::OpenAa,
        Viseme::OpenAe,
        Viseme::OpenEe,
        Viseme::OpenIh,
        Viseme::OpenOo,
        Viseme::OpenUw,
        Viseme::OpenEr,
        Viseme::MidOpen,
        Viseme::Dental,
        Viseme::Sibilant,
        Viseme::Nasal,
        Viseme::SingBig,
        Viseme::SingMid,
    ];

    /// Reference bar heights for the shape, in display units. The table
    /// is immutable for the process lifetime; the exaggeration stage
    /// scales these values per frame.
    pub fn reference_shape(self) -> [f32; BAR_COUNT] {
        match self {
            Viseme::Rest => [3.0, 3.0, 3.0, 3.0, 3.0, 3.0, 3.0, 3.0],
            Viseme::Closed => [2.0, 2.0, 2.0, 2.0, 2.0, 2.0, 2.0, 2.0],
            Viseme::OpenAa => [7.0, 22.0, 36.0, 42.0, 42.0, 36.0, 22.0, 7.0],
            Viseme::OpenAe => [10.0, 30.0, 44.0, 50.0, 50.0, 44.0, 30.0, 10.0],
            Viseme::OpenEe => [18.0, 24.0, 28.0, 26.0, 26.0, 28.0, 24.0, 18.0],
            Viseme::OpenIh => [12.0, 20.0, 26.0, 24.0, 24.0, 26.0, 20.0, 12.0],
            Viseme::OpenOo => [5.0, 18.0, 34.0, 40.0, 40.0, 34.0, 18.0, 5.0],
            Viseme::OpenUw => [4.0, 14.0, 28.0, 36.0, 36.0, 28.0, 14.0, 4.0],
            Viseme::OpenEr => [10.0, 22.0, 34.0, 38.0, 38.0, 34.0, 22.0, 10.0],
            Viseme::MidOpen => [8.0, 18.0, 28.0, 32.0, 32.0, 28.0, 18.0, 8.0],
            Viseme::Dental => [6.0, 10.0, 14.0, 12.0, 12.0, 14.0, 10.0, 6.0],
            Viseme::Sibilant => [8.0, 14.0, 18.0, 16.0, 16.0, 18.0, 14.0, 8.0],
            Viseme::Nasal => [4.0, 8.0, 12.0, 14.0, 14.0, 12.0, 8.0, 4.0],
            Viseme::SingBig => [8.0, 24.0, 40.0, 46.0, 46.0, 40.0, 24.0, 8.0],
            Viseme::SingMid => [8.0, 20.0, 32.0, 38.0, 38.0, 32.0, 20.0, 8.0],
        }
    }

    /// Diagnostic phoneme label shown by hosts next to the mouth.
    pub fn phoneme_label(self) -> &'static str {
        match self {
            Viseme::Rest => "SIL",
            Viseme::Closed => "P",
            Viseme::OpenAa => "AA",
            Viseme::OpenAe => "AE",
            Viseme::OpenEe => "IY",
            Viseme::OpenIh => "IH",
            Viseme::OpenOo => "OW",
            Viseme::OpenUw => "UW",
            Viseme::OpenEr => "ER",
            Viseme::MidOpen => "N",
            Viseme::Dental => "F",
            Viseme::Sibilant => "S",
            Viseme::Nasal => "M",
            Viseme::SingBig => "AA",
            Viseme::SingMid => "AH",
        }
    }

    /// Whether the shape belongs to the vowel class that receives
    /// bounce, vibrato and singing upgrades.
    pub fn is_vowel(self) -> bool {
        matches!(
            self,
            Viseme::OpenAa
                | Viseme::OpenAe
                | Viseme::OpenEe
                | Viseme::OpenIh
                | Viseme::OpenOo
                | Viseme::OpenUw
                | Viseme::OpenEr
                | Viseme::SingBig
                | Viseme::SingMid
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_viseme_has_a_full_shape_and_label() {
        for viseme in Viseme::ALL {
            let shape = viseme.reference_shape();
            assert_eq!(shape.len(), BAR_COUNT);
            assert!(shape.iter().all(|h| *h >= 2.0));
            assert!(!viseme.phoneme_label().is_empty());
        }
    }

    #[test]
    fn vowel_class_covers_open_and_singing_shapes() {
        assert!(Viseme::OpenAa.is_vowel());
        assert!(Viseme::SingBig.is_vowel());
        assert!(Viseme::SingMid.is_vowel());
        assert!(!Viseme::Rest.is_vowel());
        assert!(!Viseme::Sibilant.is_vowel());
        assert!(!Viseme::MidOpen.is_vowel());
    }

    #[test]
    fn serializes_with_wire_names() {
        assert_eq!(serde_json::to_string(&Viseme::OpenAa).unwrap(), "\"OPEN_AA\"");
        assert_eq!(serde_json::to_string(&Viseme::SingBig).unwrap(), "\"SING_BIG\"");
        let parsed: Viseme = serde_json::from_str("\"MID_OPEN\"").unwrap();
        assert_eq!(parsed, Viseme::MidOpen);
    }
}
