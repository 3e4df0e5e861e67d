// Pitch classes and absolute MIDI pitch mapping.
//
// A `PitchClass` is one of the twelve sharp-spelled note names in cyclic
// order starting at C. `absolute_pitch` maps a (pitch class, octave) pair to
// a MIDI note number with middle C (C4) at 60.
//
// Pitches are `i32` here: the mapping is total for any octave, and range
// checking against MIDI's 0..=127 happens in midi.rs when encoding.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ComposeError;

/// MIDI number of C in octave 4.
pub const MIDDLE_C: i32 = 60;

/// One of the twelve note names within an octave.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PitchClass {
    C,
    CSharp,
    D,
    DSharp,
    E,
    F,
    FSharp,
    G,
    GSharp,
    A,
    ASharp,
    B,
}

impl PitchClass {
    pub const ALL: [PitchClass; 12] = [
        PitchClass::C,
        PitchClass::CSharp,
        PitchClass::D,
        PitchClass::DSharp,
        PitchClass::E,
        PitchClass::F,
        PitchClass::FSharp,
        PitchClass::G,
        PitchClass::GSharp,
        PitchClass::A,
        PitchClass::ASharp,
        PitchClass::B,
    ];

    /// Semitone offset above C (0–11).
    pub fn index(self) -> usize {
        self as usize
    }

    /// Pitch class at `index` steps above C, wrapping modulo 12.
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % 12]
    }

    pub fn name(self) -> &'static str {
        match self {
            PitchClass::C => "C",
            PitchClass::CSharp => "C#",
            PitchClass::D => "D",
            PitchClass::DSharp => "D#",
            PitchClass::E => "E",
            PitchClass::F => "F",
            PitchClass::FSharp => "F#",
            PitchClass::G => "G",
            PitchClass::GSharp => "G#",
            PitchClass::A => "A",
            PitchClass::ASharp => "A#",
            PitchClass::B => "B",
        }
    }
}

impl fmt::Display for PitchClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PitchClass {
    type Err = ComposeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|pc| pc.name() == s)
            .ok_or_else(|| ComposeError::InvalidKey(s.to_string()))
    }
}

/// MIDI note number for `pitch_class` in `octave`.
///
/// `60 + offset + (octave - 4) * 12`, so C4 = 60 and each octave adds 12.
/// Saturates instead of overflowing for absurd octaves; such pitches are
/// far outside MIDI range and are rejected downstream.
pub fn absolute_pitch(pitch_class: PitchClass, octave: i32) -> i32 {
    octave
        .saturating_sub(4)
        .saturating_mul(12)
        .saturating_add(MIDDLE_C + pitch_class.index() as i32)
}
