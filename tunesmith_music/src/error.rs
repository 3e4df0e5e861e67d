// Error type shared by every composition stage.
//
// All fallible operations in this crate return `Result<_, ComposeError>`.
// Generation stops at the first error; no partially built composition or
// partially written file is ever returned. The request boundary in
// `tunesmith_server` is the only place that turns these into user-facing
// responses.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ComposeError {
    /// The key is not one of the 12 sharp-spelled pitch-class names.
    #[error("invalid key '{0}': expected one of C, C#, D, D#, E, F, F#, G, G#, A, A#, B")]
    InvalidKey(String),

    #[error("invalid scale '{0}': expected major, minor, dorian, phrygian, lydian or mixolydian")]
    InvalidMode(String),

    /// The scale has no steps (for example an octave span of zero).
    #[error("scale is empty; octave span must be at least 1")]
    EmptyScale,

    /// The tempo does not fit a MIDI tempo event (4 to 60,000,000 bpm).
    #[error("invalid tempo {0}: must be between 4 and 60000000 beats per minute")]
    InvalidTempo(u32),

    /// Some step of the scale built from this base octave falls outside
    /// MIDI notes 0..=127.
    #[error("invalid octave {0}: the scale must fit in MIDI notes 0..=127")]
    InvalidOctave(i32),

    /// The composition cannot be represented as a Standard MIDI File.
    #[error("MIDI encoding failed: {0}")]
    EncodingFailure(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid generator config: {0}")]
    Config(#[from] serde_json::Error),

    #[error("invalid generator setting: {0}")]
    InvalidSetting(String),
}

impl ComposeError {
    /// True for errors caused by the caller's parameters rather than by the
    /// encoder or the environment.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            ComposeError::InvalidKey(_)
                | ComposeError::InvalidMode(_)
                | ComposeError::EmptyScale
                | ComposeError::InvalidTempo(_)
                | ComposeError::InvalidOctave(_)
        )
    }
}
