// End-to-end tests: request → composition → MIDI bytes → parsed back.
//
// Exercises the public API the CLI and server use, then reads the encoded
// file with `midly` to check that what lands in the file matches the
// composition: one NoteOn per event, on the right channel, nothing past the
// melody's end.

use midly::{MidiMessage, Smf, TrackEventKind};
use tunesmith_music::scale::Scale;
use tunesmith_music::score::TrackRole;
use tunesmith_music::{ComposeError, GenerationRequest, GeneratorConfig, compose, encode_midi};
use tunesmith_prng::TuneRng;

/// (absolute tick, channel, key) for every NoteOn in a track.
fn note_ons(smf: &Smf<'_>, track: usize) -> Vec<(u32, u8, u8)> {
    let mut tick = 0;
    let mut out = Vec::new();
    for event in &smf.tracks[track] {
        tick += event.delta.as_int();
        if let TrackEventKind::Midi {
            channel,
            message: MidiMessage::NoteOn { key, .. },
        } = event.kind
        {
            out.push((tick, channel.as_int(), key.as_int()));
        }
    }
    out
}

#[test]
fn c_major_scale_and_pitch_mapping() {
    let scale = Scale::from_names("C", "major", 2, 4).unwrap();
    assert_eq!(scale.len(), 14);
    let names: Vec<String> = scale
        .steps()
        .iter()
        .map(|s| format!("{}{}", s.pitch_class, s.octave))
        .collect();
    assert_eq!(
        names,
        [
            "C4", "D4", "E4", "F4", "G4", "A4", "B4", "C5", "D5", "E5", "F5", "G5", "A5", "B5"
        ]
    );
    assert_eq!(scale.steps()[0].pitch(), 60);
    assert_eq!(scale.steps()[7].pitch(), 72);
}

#[test]
fn melody_only_file_has_32_notes() {
    let request = GenerationRequest {
        enable_chords: false,
        enable_drums: false,
        ..GenerationRequest::default()
    };
    let config = GeneratorConfig::default();
    let mut rng = TuneRng::new(2024);

    let composition = compose(&request, &config, &mut rng).unwrap();
    assert_eq!(composition.track(TrackRole::Melody).len(), 32);
    assert_eq!(composition.track(TrackRole::Chords).len(), 0);
    assert_eq!(composition.track(TrackRole::Drums).len(), 0);

    let bytes = encode_midi(&composition, &config.instruments).unwrap();
    let smf = Smf::parse(&bytes).unwrap();
    assert_eq!(smf.tracks.len(), 3);
    assert_eq!(note_ons(&smf, 0).len(), 32);
    assert!(note_ons(&smf, 1).is_empty());
    assert!(note_ons(&smf, 2).is_empty());
}

#[test]
fn full_arrangement_encodes_every_event() {
    let config = GeneratorConfig::default();
    for seed in 0..20 {
        let mut rng = TuneRng::new(seed);
        let request = GenerationRequest {
            key: "F#".into(),
            mode: "minor".into(),
            tempo_bpm: 96,
            base_octave: 3,
            ..GenerationRequest::default()
        };
        let composition = compose(&request, &config, &mut rng).unwrap();
        let bytes = encode_midi(&composition, &config.instruments).unwrap();
        let smf = Smf::parse(&bytes).unwrap();

        let end_tick = (composition.total_duration * 480.0).round() as u32;
        for role in TrackRole::ALL {
            let ons = note_ons(&smf, role.index());
            assert_eq!(ons.len(), composition.track(role).len(), "seed {seed} {role:?}");
            for &(tick, channel, _) in &ons {
                assert_eq!(channel, role.channel());
                assert!(tick < end_tick, "seed {seed} {role:?}: tick {tick} >= {end_tick}");
            }
        }
    }
}

#[test]
fn same_seed_same_file() {
    let config = GeneratorConfig::default();
    let request = GenerationRequest::default();
    let a = compose(&request, &config, &mut TuneRng::new(7)).unwrap();
    let b = compose(&request, &config, &mut TuneRng::new(7)).unwrap();
    assert_eq!(
        encode_midi(&a, &config.instruments).unwrap(),
        encode_midi(&b, &config.instruments).unwrap()
    );
}

#[test]
fn invalid_key_produces_no_composition() {
    let request = GenerationRequest {
        key: "H".into(),
        ..GenerationRequest::default()
    };
    let mut rng = TuneRng::new(1);
    let result = compose(&request, &GeneratorConfig::default(), &mut rng);
    assert!(matches!(result, Err(ComposeError::InvalidKey(_))));
}

#[test]
fn out_of_range_octave_is_rejected_before_encoding() {
    let config = GeneratorConfig::default();
    for base_octave in [10, i32::MAX] {
        let request = GenerationRequest {
            base_octave,
            ..GenerationRequest::default()
        };
        let mut rng = TuneRng::new(3);
        let err = compose(&request, &config, &mut rng).unwrap_err();
        assert!(matches!(err, ComposeError::InvalidOctave(_)), "{err}");
    }
}

#[test]
fn out_of_range_pitch_fails_at_encoding() {
    let mut composition = compose(
        &GenerationRequest::default(),
        &GeneratorConfig::default(),
        &mut TuneRng::new(3),
    )
    .unwrap();
    composition.track_mut(TrackRole::Melody).events[0].pitch = 128;
    let err = encode_midi(&composition, &GeneratorConfig::default().instruments).unwrap_err();
    assert!(matches!(err, ComposeError::EncodingFailure(_)), "{err}");
}
