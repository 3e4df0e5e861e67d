// Tunesmith CLI entry point.
//
// Composes one piece and writes it to a MIDI file.
// The pipeline: scale → melody → chords + drums → MIDI output.
//
// Usage:
//   cargo run -p tunesmith_music -- [output.mid] [--key KEY] [--mode MODE]
//     [--tempo BPM] [--octave N] [--notes N] [--seed N] [--config PATH]
//     [--no-chords] [--no-drums]
//
// Keys: C C# D D# E F F# G G# A A# B
// Modes: major, minor, dorian, phrygian, lydian, mixolydian
//
// Set RUST_LOG=debug for per-stage details.

use std::path::Path;
use std::process::ExitCode;

use tunesmith_music::{ComposeError, GenerationRequest, GeneratorConfig, compose, write_midi};
use tunesmith_prng::TuneRng;

fn main() -> ExitCode {
    env_logger::init();
    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_usage();
        return ExitCode::SUCCESS;
    }

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &[String]) -> Result<(), ComposeError> {
    let output_path = args
        .get(1)
        .filter(|s| !s.starts_with("--"))
        .map(|s| s.as_str())
        .unwrap_or("output.mid");

    let mut config = match parse_flag::<String>(args, "--config")? {
        Some(path) => GeneratorConfig::load(Path::new(&path))?,
        None => GeneratorConfig::default(),
    };
    if let Some(notes) = parse_flag(args, "--notes")? {
        config.note_count = notes;
    }

    let defaults = GenerationRequest::default();
    let request = GenerationRequest {
        key: parse_flag(args, "--key")?.unwrap_or(defaults.key),
        mode: parse_flag(args, "--mode")?.unwrap_or(defaults.mode),
        tempo_bpm: parse_flag(args, "--tempo")?.unwrap_or(defaults.tempo_bpm),
        base_octave: parse_flag(args, "--octave")?.unwrap_or(defaults.base_octave),
        enable_chords: !args.iter().any(|a| a == "--no-chords"),
        enable_drums: !args.iter().any(|a| a == "--no-drums"),
    };
    let seed: Option<u64> = parse_flag(args, "--seed")?;

    println!("=== Tunesmith ===");
    println!("Output: {output_path}");
    println!("Key: {} {}", request.key, request.mode);
    println!("Tempo: {} BPM", request.tempo_bpm);
    println!("Base octave: {}", request.base_octave);
    println!("Notes: {}", config.note_count);
    println!(
        "Chords: {}, drums: {}",
        on_off(request.enable_chords),
        on_off(request.enable_drums)
    );
    if let Some(s) = seed {
        println!("Seed: {s}");
    }
    println!();

    let mut rng = match seed {
        Some(s) => TuneRng::new(s),
        None => TuneRng::from_entropy(),
    };

    println!("[1/2] Composing...");
    let composition = compose(&request, &config, &mut rng)?;
    print!("{}", composition.summary());

    println!("[2/2] Writing MIDI to {output_path}...");
    write_midi(&composition, &config.instruments, Path::new(output_path))?;
    println!(
        "  Done! Duration: {:.0}s ({} beats, {:.1} bars)",
        composition.duration_seconds(),
        composition.total_duration,
        composition.total_duration / f64::from(config.drums.beats_per_measure)
    );

    println!();
    println!("Play with: timidity {output_path} (or any MIDI player)");
    Ok(())
}

fn on_off(enabled: bool) -> &'static str {
    if enabled { "on" } else { "off" }
}

fn print_usage() {
    println!("Usage: generate [output.mid] [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --key <KEY>       Key: C C# D D# E F F# G G# A A# B (default: C)");
    println!("  --mode <MODE>     major, minor, dorian, phrygian, lydian, mixolydian (default: major)");
    println!("  --tempo <BPM>     Tempo in beats per minute (default: 120)");
    println!("  --octave <N>      Base octave of the scale (default: 4)");
    println!("  --notes <N>       Number of melody notes (default: 32)");
    println!("  --seed <N>        Seed for reproducible output");
    println!("  --config <PATH>   JSON generator config");
    println!("  --no-chords       Leave the chord track empty");
    println!("  --no-drums        Leave the drum track empty");
    println!("  --help, -h        Show this help");
}

/// Value following `flag`, if the flag is present. A flag with a missing or
/// unparseable value is an error rather than a silent fallback to the default.
fn parse_flag<T: std::str::FromStr>(args: &[String], flag: &str) -> Result<Option<T>, ComposeError> {
    let Some(i) = args.iter().position(|a| a == flag) else {
        return Ok(None);
    };
    let value = args
        .get(i + 1)
        .filter(|v| !v.starts_with("--"))
        .ok_or_else(|| ComposeError::InvalidSetting(format!("{flag} requires a value")))?;
    value.parse().map(Some).map_err(|_| {
        ComposeError::InvalidSetting(format!("invalid value '{value}' for {flag}"))
    })
}
