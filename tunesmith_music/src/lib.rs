// Tunesmith Music Generator
//
// Procedurally composes a short three-track piece (melody, block chords,
// drums) in a chosen key and mode, and encodes it as a Standard MIDI File.
// Every random decision draws from a caller-supplied `TuneRng`, so a fixed
// seed reproduces a piece exactly and concurrent callers share nothing.
//
// Architecture (leaf-first):
// - pitch.rs: Pitch classes and the (pitch class, octave) → MIDI number map
// - mode.rs: Mode interval patterns and major-like/minor-like families
// - scale.rs: Multi-octave scale construction from key + mode
// - progression.rs: Per-family chord progression templates
// - drums.rs: Drum kit map and one-measure rhythm templates
// - melody.rs: Bounded random walk over scale indices
// - chords.rs: Triads laid out bar by bar following random progressions
// - score.rs: NoteEvent / Track / Composition (the fixed three-track layout)
// - compose.rs: Request validation and assembly of the three tracks
// - midi.rs: SMF Format 1 encoding via `midly`
// - config.rs: Deployment settings (length, ranges, instruments), JSON-loadable
// - error.rs: `ComposeError`
//
// Data flows one way: scale → melody → (chords, drums) bounded by the
// melody's total duration → composition → MIDI bytes.

pub mod chords;
pub mod compose;
pub mod config;
pub mod drums;
pub mod error;
pub mod melody;
pub mod midi;
pub mod mode;
pub mod pitch;
pub mod progression;
pub mod scale;
pub mod score;

pub use compose::{GenerationRequest, compose};
pub use config::GeneratorConfig;
pub use error::ComposeError;
pub use midi::{encode_midi, write_midi};
pub use score::Composition;
