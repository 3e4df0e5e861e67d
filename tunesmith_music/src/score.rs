// The score: timed note events grouped into a fixed three-track layout.
//
// Every generator appends `NoteEvent`s to one track of a `Composition`.
// Times and durations are in beats (quarter notes); midi.rs converts them to
// ticks. Events are never mutated once pushed, and a track does not have to
// be sorted or overlap-free.
//
// The layout is always melody, chords, drums, in that order, even when a
// track is disabled and empty.

use serde::{Deserialize, Serialize};

/// General MIDI percussion channel (channel 10 in 1-based numbering).
pub const DRUM_CHANNEL: u8 = 9;

/// Which part of the arrangement a track carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrackRole {
    Melody = 0,
    Chords = 1,
    Drums = 2,
}

impl TrackRole {
    pub const ALL: [TrackRole; 3] = [TrackRole::Melody, TrackRole::Chords, TrackRole::Drums];

    pub fn index(self) -> usize {
        self as usize
    }

    /// MIDI channel this role plays on.
    pub fn channel(self) -> u8 {
        match self {
            TrackRole::Melody => 0,
            TrackRole::Chords => 1,
            TrackRole::Drums => DRUM_CHANNEL,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            TrackRole::Melody => "Melody",
            TrackRole::Chords => "Chords",
            TrackRole::Drums => "Drums",
        }
    }
}

/// A single sounding note.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoteEvent {
    /// Index of the owning track.
    pub track: usize,
    pub channel: u8,
    /// MIDI note number. May be out of MIDI range; the encoder rejects that.
    pub pitch: i32,
    /// Start time in beats.
    pub start: f64,
    /// Length in beats.
    pub duration: f64,
    pub velocity: u8,
}

impl NoteEvent {
    /// Build an event on `role`'s track and channel.
    pub fn new(role: TrackRole, pitch: i32, start: f64, duration: f64, velocity: u8) -> Self {
        NoteEvent {
            track: role.index(),
            channel: role.channel(),
            pitch,
            start,
            duration,
            velocity,
        }
    }

    pub fn end(&self) -> f64 {
        self.start + self.duration
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub role: TrackRole,
    pub events: Vec<NoteEvent>,
}

impl Track {
    pub fn new(role: TrackRole) -> Self {
        Track {
            role,
            events: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// A finished piece, ready for encoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Composition {
    /// Tempo in beats per minute.
    pub tempo_bpm: u32,
    /// Length of the melody in beats. Chords and drums never start at or
    /// after this point.
    pub total_duration: f64,
    /// Melody, chords, drums.
    pub tracks: [Track; 3],
}

impl Composition {
    /// An empty composition with all three track slots present.
    pub fn new(tempo_bpm: u32) -> Self {
        Composition {
            tempo_bpm,
            total_duration: 0.0,
            tracks: TrackRole::ALL.map(Track::new),
        }
    }

    pub fn track(&self, role: TrackRole) -> &Track {
        &self.tracks[role.index()]
    }

    pub fn track_mut(&mut self, role: TrackRole) -> &mut Track {
        &mut self.tracks[role.index()]
    }

    /// Total number of note events across all tracks.
    pub fn event_count(&self) -> usize {
        self.tracks.iter().map(Track::len).sum()
    }

    /// Length of the piece in seconds at its tempo.
    pub fn duration_seconds(&self) -> f64 {
        self.total_duration * 60.0 / f64::from(self.tempo_bpm.max(1))
    }

    /// Compact text summary for logs and the CLI: one line per track with
    /// its event count and the first few events as `pitch@beat`.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        for track in &self.tracks {
            out.push_str(&format!("{:>7}: {:>3} events", track.role.name(), track.len()));
            let preview: Vec<String> = track
                .events
                .iter()
                .take(6)
                .map(|e| format!("{}@{}", e.pitch, e.start))
                .collect();
            if !preview.is_empty() {
                out.push_str("  ");
                out.push_str(&preview.join(" "));
                if track.len() > preview.len() {
                    out.push_str(" ...");
                }
            }
            out.push('\n');
        }
        out
    }
}
