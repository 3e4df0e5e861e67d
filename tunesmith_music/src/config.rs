// Data-driven generator configuration.
//
// The per-request inputs (key, mode, tempo, base octave, track toggles) live
// in `compose::GenerationRequest`. Everything here is a deployment setting:
// how long a piece is, how wide its scale is, the rhythmic and dynamic
// ranges of each generator, and which General MIDI programs each track uses.
//
// `GeneratorConfig::default()` reproduces the stock behavior (32 melody
// notes over a two-octave scale, piano melody, string-ensemble chords).
// A JSON file may override any subset of fields; missing fields keep their
// defaults via `#[serde(default)]`.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ComposeError;
use crate::midi::TICKS_PER_BEAT;

/// Shortest chord bar the encoder can resolve: one tick.
pub const MIN_BAR_BEATS: f64 = 1.0 / TICKS_PER_BEAT as f64;

/// Octave spans beyond this cannot fit the 128 MIDI notes.
pub const MAX_OCTAVE_SPAN: u32 = 11;

/// Upper bound on melody length, keeping one request's output bounded.
pub const MAX_NOTE_COUNT: usize = 100_000;

/// Melody random-walk settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MelodyParams {
    /// Largest allowed jump, in scale indices, between consecutive notes.
    pub max_leap: usize,
    /// Note lengths in beats, chosen uniformly.
    pub durations: Vec<f64>,
    /// Inclusive velocity range.
    pub velocity_min: u8,
    pub velocity_max: u8,
}

impl Default for MelodyParams {
    fn default() -> Self {
        MelodyParams {
            max_leap: 3,
            durations: vec![0.5, 1.0, 2.0],
            velocity_min: 85,
            velocity_max: 110,
        }
    }
}

/// Chord track settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChordParams {
    /// Beats per chord; chord time advances by this much per progression step.
    pub bar_beats: f64,
    pub velocity: u8,
}

impl Default for ChordParams {
    fn default() -> Self {
        ChordParams {
            bar_beats: 4.0,
            velocity: 70,
        }
    }
}

/// Drum track settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrumParams {
    /// Beats per measure (the time signature numerator).
    pub beats_per_measure: u32,
    /// Length of every drum hit in beats.
    pub hit_duration: f64,
    pub velocity: u8,
}

impl Default for DrumParams {
    fn default() -> Self {
        DrumParams {
            beats_per_measure: 4,
            hit_duration: 0.25,
            velocity: 100,
        }
    }
}

/// General MIDI program numbers per track.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstrumentMap {
    /// 0 = Acoustic Grand Piano.
    pub melody_program: u8,
    /// 48 = String Ensemble 1.
    pub chord_program: u8,
    /// Drum kit on the percussion channel; 0 = Standard Kit.
    pub drum_program: u8,
}

impl Default for InstrumentMap {
    fn default() -> Self {
        InstrumentMap {
            melody_program: 0,
            chord_program: 48,
            drum_program: 0,
        }
    }
}

/// Top-level generator settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Number of melody notes per piece.
    pub note_count: usize,
    /// Octaves covered by the scale, starting at the request's base octave.
    pub octave_span: u32,
    pub melody: MelodyParams,
    pub chords: ChordParams,
    pub drums: DrumParams,
    pub instruments: InstrumentMap,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            note_count: 32,
            octave_span: 2,
            melody: MelodyParams::default(),
            chords: ChordParams::default(),
            drums: DrumParams::default(),
            instruments: InstrumentMap::default(),
        }
    }
}

impl GeneratorConfig {
    /// Load a config from a JSON file and validate it.
    pub fn load(path: &Path) -> Result<Self, ComposeError> {
        let data = std::fs::read_to_string(path)?;
        Self::from_json(&data)
    }

    /// Parse a config from a JSON string and validate it.
    pub fn from_json(json: &str) -> Result<Self, ComposeError> {
        let config: GeneratorConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the generators cannot work with.
    pub fn validate(&self) -> Result<(), ComposeError> {
        let invalid = |msg: String| -> Result<(), ComposeError> {
            Err(ComposeError::InvalidSetting(msg))
        };

        if self.note_count > MAX_NOTE_COUNT {
            return invalid(format!(
                "note_count {} exceeds {MAX_NOTE_COUNT}",
                self.note_count
            ));
        }
        if self.octave_span > MAX_OCTAVE_SPAN {
            return invalid(format!(
                "octave_span {} exceeds {MAX_OCTAVE_SPAN}",
                self.octave_span
            ));
        }
        if self.melody.durations.is_empty() {
            return invalid("melody.durations must not be empty".into());
        }
        if let Some(d) = self.melody.durations.iter().find(|d| !(**d > 0.0 && d.is_finite())) {
            return invalid(format!("melody duration {d} must be a positive number of beats"));
        }
        if self.melody.velocity_min > self.melody.velocity_max {
            return invalid(format!(
                "melody velocity range {}..={} is empty",
                self.melody.velocity_min, self.melody.velocity_max
            ));
        }
        if !(self.chords.bar_beats >= MIN_BAR_BEATS && self.chords.bar_beats.is_finite()) {
            return invalid(format!(
                "chords.bar_beats {} must be at least one tick ({MIN_BAR_BEATS} beats)",
                self.chords.bar_beats
            ));
        }
        if self.drums.beats_per_measure == 0 {
            return invalid("drums.beats_per_measure must be at least 1".into());
        }
        if !(self.drums.hit_duration > 0.0 && self.drums.hit_duration.is_finite()) {
            return invalid(format!(
                "drums.hit_duration {} must be positive",
                self.drums.hit_duration
            ));
        }
        let velocities = [
            ("melody.velocity_max", self.melody.velocity_max),
            ("chords.velocity", self.chords.velocity),
            ("drums.velocity", self.drums.velocity),
        ];
        for (name, v) in velocities {
            if v > 127 {
                return invalid(format!("{name} {v} exceeds 127"));
            }
        }
        let programs = [
            ("instruments.melody_program", self.instruments.melody_program),
            ("instruments.chord_program", self.instruments.chord_program),
            ("instruments.drum_program", self.instruments.drum_program),
        ];
        for (name, p) in programs {
            if p > 127 {
                return invalid(format!("{name} {p} exceeds 127"));
            }
        }
        Ok(())
    }
}
