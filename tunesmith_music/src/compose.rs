// Composition assembly: request → scale → melody → chords → drums.
//
// `compose` is the single entry point used by the CLI and the HTTP server.
// It validates everything up front (config, tempo, key, mode, and that the
// scale fits MIDI note range) so that an invalid request fails before a
// single note is generated. The melody's
// total duration then bounds the other two tracks: chords.rs stops at it,
// drums are generated for the whole measures it covers, and any drum hit at
// or past it is discarded here.
//
// All state is local to the call; the only shared input is the caller's
// `TuneRng`.

use serde::{Deserialize, Serialize};
use tunesmith_prng::TuneRng;

use crate::chords::generate_chord_track;
use crate::config::GeneratorConfig;
use crate::drums::generate_drum_pattern;
use crate::error::ComposeError;
use crate::melody::generate_melody;
use crate::midi::tempo_micros;
use crate::mode::Mode;
use crate::pitch::PitchClass;
use crate::scale::Scale;
use crate::score::{Composition, NoteEvent, TrackRole};

/// Per-request parameters. Defaults match the web form's defaults.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationRequest {
    /// Pitch-class name of the key, e.g. "C" or "F#".
    pub key: String,
    /// Mode name, e.g. "major" or "minor".
    pub mode: String,
    /// Beats per minute; must fit a MIDI tempo event (4..=60,000,000).
    pub tempo_bpm: u32,
    /// Octave of the scale's first step (4 puts the key at or above middle C).
    /// Every step of the scale must land in MIDI notes 0..=127.
    pub base_octave: i32,
    pub enable_chords: bool,
    pub enable_drums: bool,
}

impl Default for GenerationRequest {
    fn default() -> Self {
        GenerationRequest {
            key: "C".into(),
            mode: "major".into(),
            tempo_bpm: 120,
            base_octave: 4,
            enable_chords: true,
            enable_drums: true,
        }
    }
}

/// Generate a full three-track composition.
pub fn compose(
    request: &GenerationRequest,
    config: &GeneratorConfig,
    rng: &mut TuneRng,
) -> Result<Composition, ComposeError> {
    config.validate()?;
    tempo_micros(request.tempo_bpm)?;
    let key: PitchClass = request.key.parse()?;
    let mode: Mode = request.mode.parse()?;

    let scale = Scale::new(key, mode, config.octave_span, request.base_octave);
    if scale.steps().iter().any(|step| !(0..=127).contains(&step.pitch())) {
        return Err(ComposeError::InvalidOctave(request.base_octave));
    }
    log::debug!(
        "scale: {key} {mode}, {} steps from octave {}",
        scale.len(),
        request.base_octave
    );

    let melody = generate_melody(&scale, config.note_count, &config.melody, rng)?;
    let total_duration = melody.total_duration;

    let mut composition = Composition::new(request.tempo_bpm);
    composition.total_duration = total_duration;
    composition.track_mut(TrackRole::Melody).events = melody.events;

    if request.enable_chords {
        composition.track_mut(TrackRole::Chords).events =
            generate_chord_track(&scale, total_duration, mode.family(), &config.chords, rng);
    }

    if request.enable_drums {
        composition.track_mut(TrackRole::Drums).events =
            drum_events(total_duration, config, rng);
    }

    log::debug!(
        "composed {} events over {total_duration} beats at {} bpm",
        composition.event_count(),
        composition.tempo_bpm
    );
    Ok(composition)
}

/// Drum events for the whole measures covered by `total_duration`, clipped
/// to end strictly before it.
fn drum_events(total_duration: f64, config: &GeneratorConfig, rng: &mut TuneRng) -> Vec<NoteEvent> {
    let params = &config.drums;
    let measures = (total_duration / f64::from(params.beats_per_measure)).floor() as usize;
    let placements = generate_drum_pattern(measures, params.beats_per_measure, rng);
    let generated = placements.len();

    let events: Vec<NoteEvent> = placements
        .into_iter()
        .filter(|hit| hit.time < total_duration)
        .map(|hit| {
            NoteEvent::new(
                TrackRole::Drums,
                hit.sound.pitch(),
                hit.time,
                params.hit_duration,
                params.velocity,
            )
        })
        .collect();

    if events.len() < generated {
        log::debug!("drums: clipped {} hits past beat {total_duration}", generated - events.len());
    }
    events
}
