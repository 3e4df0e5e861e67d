// Drum pattern generation from a fixed library of one-measure templates.
//
// Each measure independently picks one of three templates (standard backbeat,
// syncopated off-beat hats, tom fill). Template offsets are in beats from the
// start of the measure and may be fractional. There is no continuity rule
// between measures.
//
// The output is a list of (sound, absolute beat) placements. compose.rs turns
// them into percussion-channel `NoteEvent`s and clips them to the melody
// length.

use serde::{Deserialize, Serialize};
use tunesmith_prng::TuneRng;

/// The nine kit pieces, with their General MIDI percussion keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrumSound {
    Kick,
    Snare,
    HihatClosed,
    HihatOpen,
    Crash,
    Ride,
    TomHigh,
    TomMid,
    TomLow,
}

impl DrumSound {
    pub const ALL: [DrumSound; 9] = [
        DrumSound::Kick,
        DrumSound::Snare,
        DrumSound::HihatClosed,
        DrumSound::HihatOpen,
        DrumSound::Crash,
        DrumSound::Ride,
        DrumSound::TomHigh,
        DrumSound::TomMid,
        DrumSound::TomLow,
    ];

    /// General MIDI percussion key number.
    pub fn pitch(self) -> i32 {
        match self {
            DrumSound::Kick => 36,        // Bass Drum 1
            DrumSound::Snare => 38,       // Acoustic Snare
            DrumSound::HihatClosed => 42, // Closed Hi-Hat
            DrumSound::HihatOpen => 46,   // Open Hi-Hat
            DrumSound::Crash => 49,       // Crash Cymbal 1
            DrumSound::Ride => 51,        // Ride Cymbal 1
            DrumSound::TomHigh => 50,     // High Tom
            DrumSound::TomMid => 47,      // Low-Mid Tom
            DrumSound::TomLow => 43,      // High Floor Tom
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            DrumSound::Kick => "kick",
            DrumSound::Snare => "snare",
            DrumSound::HihatClosed => "hihat_closed",
            DrumSound::HihatOpen => "hihat_open",
            DrumSound::Crash => "crash",
            DrumSound::Ride => "ride",
            DrumSound::TomHigh => "tom_high",
            DrumSound::TomMid => "tom_mid",
            DrumSound::TomLow => "tom_low",
        }
    }
}

/// One-measure rhythmic templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DrumPattern {
    /// Kick on 1 and 3, snare on 2 and 4, closed hats on every beat, crash
    /// on the downbeat.
    Standard,
    /// Off-beat hats with an open hat, ride and high-tom pickup.
    Syncopated,
    /// Tom run across beat 3 into a crash pickup.
    Fill,
}

const STANDARD_HITS: &[(DrumSound, f64)] = &[
    (DrumSound::Kick, 0.0),
    (DrumSound::HihatClosed, 0.0),
    (DrumSound::Snare, 1.0),
    (DrumSound::HihatClosed, 1.0),
    (DrumSound::Kick, 2.0),
    (DrumSound::HihatClosed, 2.0),
    (DrumSound::Snare, 3.0),
    (DrumSound::HihatClosed, 3.0),
    (DrumSound::Crash, 0.0),
];

const SYNCOPATED_HITS: &[(DrumSound, f64)] = &[
    (DrumSound::Kick, 0.0),
    (DrumSound::HihatClosed, 0.5),
    (DrumSound::Snare, 1.0),
    (DrumSound::HihatOpen, 1.5),
    (DrumSound::Kick, 2.0),
    (DrumSound::HihatClosed, 2.5),
    (DrumSound::Snare, 3.0),
    (DrumSound::Ride, 3.5),
    (DrumSound::TomHigh, 3.75),
];

const FILL_HITS: &[(DrumSound, f64)] = &[
    (DrumSound::Kick, 0.0),
    (DrumSound::Snare, 1.0),
    (DrumSound::TomHigh, 2.0),
    (DrumSound::TomMid, 2.25),
    (DrumSound::TomLow, 2.5),
    (DrumSound::Snare, 3.0),
    (DrumSound::Crash, 3.75),
];

impl DrumPattern {
    pub const ALL: [DrumPattern; 3] = [
        DrumPattern::Standard,
        DrumPattern::Syncopated,
        DrumPattern::Fill,
    ];

    /// (sound, beat offset within the measure) pairs, in template order.
    pub fn hits(self) -> &'static [(DrumSound, f64)] {
        match self {
            DrumPattern::Standard => STANDARD_HITS,
            DrumPattern::Syncopated => SYNCOPATED_HITS,
            DrumPattern::Fill => FILL_HITS,
        }
    }
}

/// A drum sound at an absolute beat.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DrumPlacement {
    pub sound: DrumSound,
    pub time: f64,
}

/// Generate `measures` measures of drums, each `beats_per_measure` long.
///
/// Offsets that do not fit inside the measure (only possible when
/// `beats_per_measure` is shorter than the four-beat templates) are dropped,
/// so every placement lies in `[0, measures * beats_per_measure)`.
pub fn generate_drum_pattern(
    measures: usize,
    beats_per_measure: u32,
    rng: &mut TuneRng,
) -> Vec<DrumPlacement> {
    let measure_len = f64::from(beats_per_measure);
    let mut placements = Vec::new();

    for measure in 0..measures {
        let base_time = measure as f64 * measure_len;
        let pattern = DrumPattern::ALL[rng.range_usize(0, DrumPattern::ALL.len())];
        log::trace!("measure {measure}: {pattern:?}");

        placements.extend(
            pattern
                .hits()
                .iter()
                .filter(|&&(_, offset)| offset < measure_len)
                .map(|&(sound, offset)| DrumPlacement {
                    sound,
                    time: base_time + offset,
                }),
        );
    }

    placements
}
