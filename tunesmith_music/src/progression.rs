// Chord progression templates.
//
// A progression is four 1-based scale degrees, one per bar. chords.rs asks
// for a fresh progression at the start of every four-bar block, so a piece
// is a chain of independently chosen progressions rather than one loop.

use tunesmith_prng::TuneRng;

use crate::mode::ModeFamily;

/// Four scale degrees, one chord per bar.
pub type Progression = [u8; 4];

pub const MAJOR_PROGRESSIONS: [Progression; 4] = [
    [1, 4, 5, 1], // I-IV-V-I
    [1, 6, 4, 5], // I-vi-IV-V
    [2, 5, 1, 6], // ii-V-I-vi
    [1, 5, 6, 4], // I-V-vi-IV
];

pub const MINOR_PROGRESSIONS: [Progression; 4] = [
    [1, 6, 4, 5], // i-VI-iv-v
    [1, 4, 7, 5], // i-iv-VII-v
    [6, 4, 1, 5], // VI-iv-i-v
    [1, 7, 6, 5], // i-VII-VI-v
];

/// The progression table for a mode family.
pub fn progressions_for(family: ModeFamily) -> &'static [Progression; 4] {
    match family {
        ModeFamily::MajorLike => &MAJOR_PROGRESSIONS,
        ModeFamily::MinorLike => &MINOR_PROGRESSIONS,
    }
}

/// Pick one progression for `family` uniformly at random.
pub fn choose_progression(family: ModeFamily, rng: &mut TuneRng) -> &'static Progression {
    let table = progressions_for(family);
    &table[rng.range_usize(0, table.len())]
}
