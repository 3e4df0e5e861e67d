// Melody generation: a bounded random walk over scale indices.
//
// The first note lands anywhere in the scale. Every later note moves at most
// `max_leap` scale indices from the previous one (clamped to the scale's
// ends), which keeps the line stepwise without forbidding repeated notes.
// Notes are laid end to end with no rests, so the melody's total duration is
// the sum of its note lengths and becomes the length of the whole piece.

use tunesmith_prng::TuneRng;

use crate::config::MelodyParams;
use crate::error::ComposeError;
use crate::scale::Scale;
use crate::score::{NoteEvent, TrackRole};

/// A generated melody line.
#[derive(Debug, Clone, PartialEq)]
pub struct Melody {
    pub events: Vec<NoteEvent>,
    /// Scale index chosen for each event, in order.
    pub scale_indices: Vec<usize>,
    /// End time of the last note in beats.
    pub total_duration: f64,
}

/// Generate `note_count` melody notes over `scale`.
///
/// Fails with `EmptyScale` if the scale has no steps, or `InvalidSetting`
/// if `params` has no durations or an inverted velocity range.
pub fn generate_melody(
    scale: &Scale,
    note_count: usize,
    params: &MelodyParams,
    rng: &mut TuneRng,
) -> Result<Melody, ComposeError> {
    if scale.is_empty() {
        return Err(ComposeError::EmptyScale);
    }
    if params.durations.is_empty() || params.velocity_min > params.velocity_max {
        return Err(ComposeError::InvalidSetting(format!(
            "melody params cannot produce notes: {params:?}"
        )));
    }

    let last = scale.len() - 1;
    let mut events = Vec::with_capacity(note_count);
    let mut scale_indices = Vec::with_capacity(note_count);
    let mut prev: Option<usize> = None;
    let mut time = 0.0;

    for _ in 0..note_count {
        let idx = match prev {
            Some(p) => {
                let low = p.saturating_sub(params.max_leap);
                let high = p.saturating_add(params.max_leap).min(last);
                rng.range_usize_inclusive(low, high)
            }
            None => rng.range_usize_inclusive(0, last),
        };
        prev = Some(idx);

        let pitch = scale.steps()[idx].pitch();
        let duration = params.durations[rng.range_usize(0, params.durations.len())];
        let velocity = rng.range_u8_inclusive(params.velocity_min, params.velocity_max);

        events.push(NoteEvent::new(TrackRole::Melody, pitch, time, duration, velocity));
        scale_indices.push(idx);
        time += duration;
    }

    log::debug!(
        "melody: {} notes over {} scale steps, {time} beats",
        events.len(),
        scale.len()
    );

    Ok(Melody {
        events,
        scale_indices,
        total_duration: time,
    })
}
