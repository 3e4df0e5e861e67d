// Standard MIDI File output for compositions.
//
// Produces SMF Format 1 with exactly three tracks (melody, chords, drums),
// 480 ticks per beat. Every track opens at tick 0 with its name, the tempo,
// and a program change.
//
// Events in a `Track` may overlap or arrive out of order, so each note is
// split into absolute-tick NoteOn/NoteOff messages, sorted (offs before ons
// on the same tick, so repeated pitches retrigger cleanly), then converted to
// delta times.
//
// Uses the `midly` crate for the byte format.

use std::path::Path;

use midly::{
    Format, Header, MetaMessage, MidiMessage, Smf, Timing, Track, TrackEvent, TrackEventKind,
    num::{u4, u7, u15, u24, u28},
};

use crate::config::InstrumentMap;
use crate::error::ComposeError;
use crate::score::{Composition, NoteEvent, TrackRole};

/// Ticks per quarter note (one beat).
pub const TICKS_PER_BEAT: u16 = 480;

/// MIDI mimetype served alongside encoded files.
pub const MIDI_MIME_TYPE: &str = "audio/midi";

const MICROS_PER_MINUTE: u32 = 60_000_000;

/// Largest value a 24-bit tempo field holds (microseconds per beat).
const MAX_TEMPO_MICROS: u32 = (1 << 24) - 1;

/// Largest delta time a 28-bit variable-length quantity holds.
const MAX_TICK: u32 = (1 << 28) - 1;

/// Encode a composition as SMF bytes.
pub fn encode_midi(
    composition: &Composition,
    instruments: &InstrumentMap,
) -> Result<Vec<u8>, ComposeError> {
    let smf = composition_to_smf(composition, instruments)?;
    let mut buf = Vec::new();
    smf.write_std(&mut buf)
        .map_err(|e| ComposeError::EncodingFailure(e.to_string()))?;
    log::debug!("encoded {} events into {} bytes", composition.event_count(), buf.len());
    Ok(buf)
}

/// Encode a composition and write it to `path`.
///
/// Encoding finishes before the file is created, so a failed encode never
/// leaves a partial file behind.
pub fn write_midi(
    composition: &Composition,
    instruments: &InstrumentMap,
    path: &Path,
) -> Result<(), ComposeError> {
    let bytes = encode_midi(composition, instruments)?;
    std::fs::write(path, &bytes)?;
    Ok(())
}

/// Microseconds per beat for `tempo_bpm`, the value of the tempo event.
///
/// Fails with `InvalidTempo` unless the result fits the event's 24-bit field
/// and is nonzero, i.e. for tempos outside 4..=60,000,000 bpm.
pub fn tempo_micros(tempo_bpm: u32) -> Result<u32, ComposeError> {
    match MICROS_PER_MINUTE.checked_div(tempo_bpm) {
        Some(micros) if (1..=MAX_TEMPO_MICROS).contains(&micros) => Ok(micros),
        _ => Err(ComposeError::InvalidTempo(tempo_bpm)),
    }
}

fn composition_to_smf(
    composition: &Composition,
    instruments: &InstrumentMap,
) -> Result<Smf<'static>, ComposeError> {
    let tempo_micros = tempo_micros(composition.tempo_bpm)?;

    let mut smf = Smf::new(Header::new(
        Format::Parallel,
        Timing::Metrical(u15::new(TICKS_PER_BEAT)),
    ));

    for role in TrackRole::ALL {
        let program = match role {
            TrackRole::Melody => instruments.melody_program,
            TrackRole::Chords => instruments.chord_program,
            TrackRole::Drums => instruments.drum_program,
        };
        let track = encode_track(role, &composition.track(role).events, program, tempo_micros)?;
        smf.tracks.push(track);
    }

    Ok(smf)
}

/// One note boundary at an absolute tick.
struct Boundary {
    tick: u32,
    /// 0 for NoteOff, 1 for NoteOn; sorts offs first on equal ticks.
    order: u8,
    kind: TrackEventKind<'static>,
}

fn encode_track(
    role: TrackRole,
    events: &[NoteEvent],
    program: u8,
    tempo_micros: u32,
) -> Result<Track<'static>, ComposeError> {
    let channel = checked_channel(role.channel())?;
    let mut track: Track<'static> = Vec::with_capacity(events.len() * 2 + 4);

    track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::TrackName(role.name().as_bytes())),
    });
    track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::Tempo(u24::new(tempo_micros))),
    });
    track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Midi {
            channel,
            message: MidiMessage::ProgramChange {
                program: checked_u7("program", i32::from(program))?,
            },
        },
    });

    let mut boundaries = Vec::with_capacity(events.len() * 2);
    for event in events {
        let channel = checked_channel(event.channel)?;
        let key = checked_u7("pitch", event.pitch)?;
        let vel = checked_u7("velocity", i32::from(event.velocity))?;
        let start = beats_to_ticks(event.start)?;
        let end = beats_to_ticks(event.end())?.max(start + 1);

        boundaries.push(Boundary {
            tick: start,
            order: 1,
            kind: TrackEventKind::Midi {
                channel,
                message: MidiMessage::NoteOn { key, vel },
            },
        });
        boundaries.push(Boundary {
            tick: end,
            order: 0,
            kind: TrackEventKind::Midi {
                channel,
                message: MidiMessage::NoteOff {
                    key,
                    vel: u7::new(0),
                },
            },
        });
    }
    boundaries.sort_by_key(|b| (b.tick, b.order));

    let mut last_tick = 0;
    for boundary in boundaries {
        track.push(TrackEvent {
            delta: u28::new(boundary.tick - last_tick),
            kind: boundary.kind,
        });
        last_tick = boundary.tick;
    }

    track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
    });

    Ok(track)
}

/// Convert a beat position to ticks, rounding to the nearest tick.
fn beats_to_ticks(beats: f64) -> Result<u32, ComposeError> {
    let ticks = (beats * f64::from(TICKS_PER_BEAT)).round();
    if !ticks.is_finite() || ticks < 0.0 || ticks >= f64::from(MAX_TICK) {
        return Err(ComposeError::EncodingFailure(format!(
            "time {beats} beats is outside the encodable range"
        )));
    }
    Ok(ticks as u32)
}

fn checked_u7(what: &str, value: i32) -> Result<u7, ComposeError> {
    if !(0..=127).contains(&value) {
        return Err(ComposeError::EncodingFailure(format!(
            "{what} {value} is outside MIDI range 0..=127"
        )));
    }
    Ok(u7::new(value as u8))
}

fn checked_channel(channel: u8) -> Result<u4, ComposeError> {
    if channel > 15 {
        return Err(ComposeError::EncodingFailure(format!(
            "channel {channel} is outside MIDI range 0..=15"
        )));
    }
    Ok(u4::new(channel))
}
