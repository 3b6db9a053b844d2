//! Visemes - mouth shapes for speech
//!
//! Cue documents carry coarse mouth categories (`A`..`H`, `X`). The rig
//! exposes a closed set of 15 viseme morph targets. The mapping between the
//! two is a fixed table.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Number of viseme morph targets
pub const VISEME_COUNT: usize = 15;

/// Concrete viseme morph target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum Viseme {
    #[default]
    Sil, // silence
    PP, // "p", "b", "m" (lips together)
    FF, // "f", "v" (teeth on lip)
    TH, // "th" (tongue between teeth)
    DD, // "d", "t" (tongue on ridge)
    KK, // "k", "g" (back of tongue)
    CH, // "ch", "j", "sh"
    SS, // "s", "z"
    NN, // "n", "l"
    RR, // "r"
    AA, // "ah" as in "father"
    E,  // "eh" as in "bed"
    I,  // "ee" as in "see"
    O,  // "oh" as in "boat"
    U,  // "oo" as in "boot"
}

impl Viseme {
    pub const ALL: [Viseme; VISEME_COUNT] = [
        Viseme::Sil,
        Viseme::PP,
        Viseme::FF,
        Viseme::TH,
        Viseme::DD,
        Viseme::KK,
        Viseme::CH,
        Viseme::SS,
        Viseme::NN,
        Viseme::RR,
        Viseme::AA,
        Viseme::E,
        Viseme::I,
        Viseme::O,
        Viseme::U,
    ];

    /// Stable index into weight arrays
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Morph target name on the avatar meshes
    pub fn morph_target(self) -> &'static str {
        match self {
            Viseme::Sil => "viseme_sil",
            Viseme::PP => "viseme_PP",
            Viseme::FF => "viseme_FF",
            Viseme::TH => "viseme_TH",
            Viseme::DD => "viseme_DD",
            Viseme::KK => "viseme_kk",
            Viseme::CH => "viseme_CH",
            Viseme::SS => "viseme_SS",
            Viseme::NN => "viseme_nn",
            Viseme::RR => "viseme_RR",
            Viseme::AA => "viseme_aa",
            Viseme::E => "viseme_E",
            Viseme::I => "viseme_I",
            Viseme::O => "viseme_O",
            Viseme::U => "viseme_U",
        }
    }

    /// Peak jaw openness for this shape
    pub fn jaw_open(self) -> f32 {
        match self {
            Viseme::Sil => 0.0,
            Viseme::PP => 0.0,
            Viseme::FF => 0.1,
            Viseme::TH => 0.15,
            Viseme::DD => 0.1,
            Viseme::KK => 0.2,
            Viseme::CH => 0.25,
            Viseme::SS => 0.1,
            Viseme::NN => 0.05,
            Viseme::RR => 0.1,
            Viseme::AA => 0.45,
            Viseme::E => 0.35,
            Viseme::I => 0.3,
            Viseme::O => 0.4,
            Viseme::U => 0.4,
        }
    }
}

/// Morph target name of the jaw
pub const JAW_OPEN_TARGET: &str = "jawOpen";

/// Mouth category from a cue document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VisemeCategory {
    /// Closed mouth: P, B, M
    A,
    /// Slightly open, clenched teeth: K, S, T, EE
    B,
    /// Open mouth: EH, AE
    C,
    /// Wide open: AA
    D,
    /// Slightly rounded: AO, ER
    E,
    /// Puckered: UW, OW, W
    F,
    /// Upper teeth on lower lip: F, V
    G,
    /// Tongue raised: L
    H,
    /// Idle / rest
    X,
    /// Anything the table does not know
    Unknown,
}

impl VisemeCategory {
    pub fn from_code(code: &str) -> Self {
        match code.trim() {
            "A" => VisemeCategory::A,
            "B" => VisemeCategory::B,
            "C" => VisemeCategory::C,
            "D" => VisemeCategory::D,
            "E" => VisemeCategory::E,
            "F" => VisemeCategory::F,
            "G" => VisemeCategory::G,
            "H" => VisemeCategory::H,
            "X" => VisemeCategory::X,
            _ => VisemeCategory::Unknown,
        }
    }

    /// Concrete rig shape for this category
    ///
    /// Categories without a dedicated shape fall back to the nearest
    /// consonant; unknown categories close the mouth.
    pub fn viseme(self) -> Viseme {
        match self {
            VisemeCategory::A => Viseme::PP,
            VisemeCategory::B => Viseme::KK,
            VisemeCategory::C => Viseme::I,
            VisemeCategory::D => Viseme::AA,
            VisemeCategory::E => Viseme::O,
            VisemeCategory::F => Viseme::U,
            VisemeCategory::G => Viseme::FF,
            VisemeCategory::H => Viseme::TH,
            VisemeCategory::X => Viseme::PP,
            VisemeCategory::Unknown => Viseme::PP,
        }
    }
}

impl fmt::Display for VisemeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            VisemeCategory::A => "A",
            VisemeCategory::B => "B",
            VisemeCategory::C => "C",
            VisemeCategory::D => "D",
            VisemeCategory::E => "E",
            VisemeCategory::F => "F",
            VisemeCategory::G => "G",
            VisemeCategory::H => "H",
            VisemeCategory::X => "X",
            VisemeCategory::Unknown => "?",
        };
        f.write_str(code)
    }
}

impl<'de> Deserialize<'de> for VisemeCategory {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = String::deserialize(deserializer)?;
        Ok(VisemeCategory::from_code(&code))
    }
}
