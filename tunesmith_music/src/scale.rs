// Scale construction: key + mode + octave span → ordered scale steps.
//
// The scale is the shared pitch vocabulary of a piece. melody.rs walks over
// its indices and chords.rs stacks triads on them, so index order matters:
// index 0 is the key in the base octave and each block of seven indices is
// one span.
//
// Each span's seven steps all carry that span's octave number, even when the
// interval walk wraps past B (A major in octave 4 yields A4 B4 C#4 ...). The
// next span restarts at the key one octave up.

use serde::{Deserialize, Serialize};

use crate::error::ComposeError;
use crate::mode::Mode;
use crate::pitch::{PitchClass, absolute_pitch};

/// One step of a built scale: a pitch class at a specific octave.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScaleStep {
    pub pitch_class: PitchClass,
    pub octave: i32,
}

impl ScaleStep {
    /// MIDI note number of this step.
    pub fn pitch(self) -> i32 {
        absolute_pitch(self.pitch_class, self.octave)
    }
}

/// An immutable, ordered multi-octave scale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scale {
    pub key: PitchClass,
    pub mode: Mode,
    steps: Vec<ScaleStep>,
}

impl Scale {
    /// Build `7 * octave_span` steps of `mode` starting at `key` in
    /// `base_octave`.
    pub fn new(key: PitchClass, mode: Mode, octave_span: u32, base_octave: i32) -> Self {
        let intervals = mode.intervals();
        let mut steps = Vec::with_capacity(7 * octave_span as usize);

        for span in 0..octave_span {
            let octave = base_octave.saturating_add_unsigned(span);
            let mut idx = key.index();
            for &interval in &intervals {
                steps.push(ScaleStep {
                    pitch_class: PitchClass::from_index(idx),
                    octave,
                });
                idx = (idx + interval as usize) % 12;
            }
        }

        Scale { key, mode, steps }
    }

    /// Parse `key` and `mode` names, then build the scale.
    ///
    /// Fails with `InvalidKey` or `InvalidMode` before anything is built.
    pub fn from_names(
        key: &str,
        mode: &str,
        octave_span: u32,
        base_octave: i32,
    ) -> Result<Self, ComposeError> {
        let key: PitchClass = key.parse()?;
        let mode: Mode = mode.parse()?;
        Ok(Self::new(key, mode, octave_span, base_octave))
    }

    pub fn steps(&self) -> &[ScaleStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<ScaleStep> {
        self.steps.get(index).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(pitch_class: PitchClass, octave: i32) -> ScaleStep {
        ScaleStep {
            pitch_class,
            octave,
        }
    }

    #[test]
    fn c_major_two_octaves() {
        use PitchClass::*;
        let scale = Scale::from_names("C", "major", 2, 4).unwrap();
        assert_eq!(scale.len(), 14);
        let expected = [
            step(C, 4),
            step(D, 4),
            step(E, 4),
            step(F, 4),
            step(G, 4),
            step(A, 4),
            step(B, 4),
            step(C, 5),
            step(D, 5),
        ];
        assert_eq!(&scale.steps()[..9], &expected);
        assert_eq!(scale.get(0).unwrap().pitch(), 60);
        assert_eq!(scale.get(7).unwrap().pitch(), 72);
    }

    #[test]
    fn a_minor_keeps_span_octave_across_wrap() {
        use PitchClass::*;
        let scale = Scale::new(A, Mode::Minor, 1, 3);
        let names: Vec<_> = scale.steps().iter().map(|s| s.pitch_class).collect();
        assert_eq!(names, vec![A, B, C, D, E, F, G]);
        assert!(scale.steps().iter().all(|s| s.octave == 3));
    }

    #[test]
    fn length_is_seven_per_span() {
        for mode in Mode::ALL {
            for span in 0..5 {
                let scale = Scale::new(PitchClass::FSharp, mode, span, 2);
                assert_eq!(scale.len(), 7 * span as usize);
            }
        }
    }

    #[test]
    fn steps_follow_interval_pattern_cyclically() {
        for key in PitchClass::ALL {
            for mode in Mode::ALL {
                let scale = Scale::new(key, mode, 3, 4);
                let intervals = mode.intervals();
                for (i, pair) in scale.steps().windows(2).enumerate() {
                    let diff = (pair[1].pitch_class.index() + 12 - pair[0].pitch_class.index()) % 12;
                    assert_eq!(diff, intervals[i % 7] as usize, "{key} {mode} step {i}");
                }
                for span in 0..3 {
                    assert_eq!(scale.steps()[span * 7].pitch_class, key);
                    assert_eq!(scale.steps()[span * 7].octave, 4 + span as i32);
                }
            }
        }
    }

    #[test]
    fn zero_span_is_empty() {
        let scale = Scale::new(PitchClass::C, Mode::Major, 0, 4);
        assert!(scale.is_empty());
    }

    #[test]
    fn extreme_base_octave_saturates() {
        let scale = Scale::new(PitchClass::G, Mode::Major, 2, i32::MAX);
        assert_eq!(scale.len(), 14);
        assert!(scale.steps().iter().all(|s| s.octave == i32::MAX));
        assert!(scale.steps().iter().all(|s| s.pitch() > 127));
    }

    #[test]
    fn invalid_names_fail() {
        assert!(matches!(
            Scale::from_names("H", "major", 2, 4),
            Err(ComposeError::InvalidKey(_))
        ));
        assert!(matches!(
            Scale::from_names("C", "locrian", 2, 4),
            Err(ComposeError::InvalidMode(_))
        ));
    }
}
