// Mode definitions: the interval patterns that scales are built from.
//
// Every mode is a seven-step diatonic pattern of semitone intervals summing
// to 12. Major and minor are the canonical modes; the remaining church modes
// are accepted by name and grouped into the same two families, which is all
// the chord progression tables care about (progression.rs).
//
// Used by scale.rs to walk the pattern and by compose.rs to pick the
// progression family.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ComposeError;

/// A named seven-step interval pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Ionian: W W H W W W H
    Major,
    /// Aeolian (natural minor): W H W W H W W
    Minor,
    /// Natural minor with a raised 6th.
    Dorian,
    /// Natural minor with a lowered 2nd.
    Phrygian,
    /// Major with a raised 4th.
    Lydian,
    /// Major with a lowered 7th.
    Mixolydian,
}

/// Harmonic family of a mode, selecting the progression table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModeFamily {
    MajorLike,
    MinorLike,
}

impl Mode {
    pub const ALL: [Mode; 6] = [
        Mode::Major,
        Mode::Minor,
        Mode::Dorian,
        Mode::Phrygian,
        Mode::Lydian,
        Mode::Mixolydian,
    ];

    /// Semitone steps between consecutive scale degrees, starting at the key.
    pub fn intervals(self) -> [u8; 7] {
        match self {
            Mode::Major => [2, 2, 1, 2, 2, 2, 1],
            Mode::Minor => [2, 1, 2, 2, 1, 2, 2],
            Mode::Dorian => [2, 1, 2, 2, 2, 1, 2],
            Mode::Phrygian => [1, 2, 2, 2, 1, 2, 2],
            Mode::Lydian => [2, 2, 2, 1, 2, 2, 1],
            Mode::Mixolydian => [2, 2, 1, 2, 2, 1, 2],
        }
    }

    /// Modes with a major third above the key are major-like.
    pub fn family(self) -> ModeFamily {
        match self {
            Mode::Major | Mode::Lydian | Mode::Mixolydian => ModeFamily::MajorLike,
            Mode::Minor | Mode::Dorian | Mode::Phrygian => ModeFamily::MinorLike,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Mode::Major => "major",
            Mode::Minor => "minor",
            Mode::Dorian => "dorian",
            Mode::Phrygian => "phrygian",
            Mode::Lydian => "lydian",
            Mode::Mixolydian => "mixolydian",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Mode {
    type Err = ComposeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "major" | "ionian" => Ok(Mode::Major),
            "minor" | "aeolian" => Ok(Mode::Minor),
            "dorian" => Ok(Mode::Dorian),
            "phrygian" => Ok(Mode::Phrygian),
            "lydian" => Ok(Mode::Lydian),
            "mixolydian" => Ok(Mode::Mixolydian),
            _ => Err(ComposeError::InvalidMode(s.to_string())),
        }
    }
}
