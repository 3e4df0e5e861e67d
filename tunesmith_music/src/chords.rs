// Chord track: block triads following randomly chosen progressions.
//
// Chord time starts at 0 and advances one bar per progression step. A new
// progression is drawn for every four-bar block, and generation stops as soon
// as chord time reaches the melody's total duration, even in the middle of a
// progression.
//
// Triads are stacked by scale-array position: for degree d the root is scale
// index (d - 1) * 2, the third root + 2 and the fifth root + 4, with third and
// fifth wrapped around the scale. A root past the end of the scale yields a
// silent bar, but the bar still counts.

use tunesmith_prng::TuneRng;

use crate::config::{ChordParams, MIN_BAR_BEATS};
use crate::mode::ModeFamily;
use crate::progression::choose_progression;
use crate::scale::Scale;
use crate::score::{NoteEvent, TrackRole};

/// Scale indices of the triad for a 1-based progression degree, or `None`
/// when the root falls outside the scale.
pub fn triad_indices(degree: u8, scale_len: usize) -> Option<[usize; 3]> {
    if degree == 0 || scale_len == 0 {
        return None;
    }
    let root = (usize::from(degree) - 1) * 2;
    if root >= scale_len {
        return None;
    }
    Some([root, (root + 2) % scale_len, (root + 4) % scale_len])
}

/// Generate chord events covering `[0, total_duration)`.
pub fn generate_chord_track(
    scale: &Scale,
    total_duration: f64,
    family: ModeFamily,
    params: &ChordParams,
    rng: &mut TuneRng,
) -> Vec<NoteEvent> {
    let mut events = Vec::new();
    if params.bar_beats.is_nan() || params.bar_beats < MIN_BAR_BEATS {
        log::warn!("chords: bar length {} is shorter than one tick, skipping", params.bar_beats);
        return events;
    }
    let mut chord_time = 0.0;
    let mut skipped = 0usize;

    while chord_time < total_duration {
        let progression = choose_progression(family, rng);
        log::trace!("progression at beat {chord_time}: {progression:?}");

        for &degree in progression {
            if chord_time >= total_duration {
                break;
            }

            match triad_indices(degree, scale.len()) {
                Some(indices) => {
                    for idx in indices {
                        events.push(NoteEvent::new(
                            TrackRole::Chords,
                            scale.steps()[idx].pitch(),
                            chord_time,
                            params.bar_beats,
                            params.velocity,
                        ));
                    }
                }
                None => skipped += 1,
            }

            chord_time += params.bar_beats;
        }
    }

    log::debug!(
        "chords: {} notes, {} silent bars, ended at beat {chord_time}",
        events.len(),
        skipped
    );
    events
}
