// Query-string parsing for generation requests.
//
// The web client sends every parameter in the query string of
// `POST /generate` (`key`, `scale`, `tempo`, `octave`, `enableChords`,
// `enableDrums`, plus an optional `seed`). Values are percent-decoded, so a
// key of `C%23` arrives as "C#". Missing parameters take the defaults of
// `GenerationRequest`. Flags are on only for the literal "true"; any other
// value turns the track off. Unknown parameters are ignored.
//
// Numbers that fail to parse are reported as `RequestError::BadParameter`;
// semantic checks (valid key and mode, tempo and octave within MIDI range)
// are left to `tunesmith_music::compose`.

use std::collections::HashMap;

use thiserror::Error;
use tunesmith_music::{ComposeError, GenerationRequest};

/// Failure to turn an HTTP request into a MIDI file.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("invalid value '{value}' for parameter '{name}'")]
    BadParameter { name: &'static str, value: String },

    #[error(transparent)]
    Compose(#[from] ComposeError),
}

impl RequestError {
    /// HTTP status for this failure: 400 for bad input, 500 otherwise.
    pub fn status_code(&self) -> u16 {
        match self {
            RequestError::BadParameter { .. } => 400,
            RequestError::Compose(e) if e.is_invalid_input() => 400,
            RequestError::Compose(_) => 500,
        }
    }
}

/// Parsed generation parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateParams {
    pub request: GenerationRequest,
    /// Seed for reproducible output; `None` means a fresh entropy seed.
    pub seed: Option<u64>,
}

impl GenerateParams {
    pub fn from_query(query: &str) -> Result<Self, RequestError> {
        let params = parse_query(query);
        let defaults = GenerationRequest::default();

        let request = GenerationRequest {
            key: params.get("key").cloned().unwrap_or(defaults.key),
            mode: params.get("scale").cloned().unwrap_or(defaults.mode),
            tempo_bpm: parse_number(&params, "tempo")?.unwrap_or(defaults.tempo_bpm),
            base_octave: parse_number(&params, "octave")?.unwrap_or(defaults.base_octave),
            enable_chords: parse_flag(&params, "enableChords", defaults.enable_chords),
            enable_drums: parse_flag(&params, "enableDrums", defaults.enable_drums),
        };
        let seed = parse_number(&params, "seed")?;

        Ok(GenerateParams { request, seed })
    }
}

/// Split `a=1&b=2` into decoded key/value pairs. Later duplicates win.
pub fn parse_query(query: &str) -> HashMap<String, String> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((k, v)) => (percent_decode(k), percent_decode(v)),
            None => (percent_decode(pair), String::new()),
        })
        .collect()
}

/// Decode `%XX` escapes and `+` as space. Malformed escapes are kept as-is.
pub fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b'%' => match bytes.get(i + 1..i + 3).and_then(|h| hex_pair(h[0], h[1])) {
                Some(decoded) => {
                    out.push(decoded);
                    i += 3;
                }
                None => {
                    out.push(b'%');
                    i += 1;
                }
            },
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_pair(hi: u8, lo: u8) -> Option<u8> {
    let hi = (hi as char).to_digit(16)?;
    let lo = (lo as char).to_digit(16)?;
    Some((hi * 16 + lo) as u8)
}

fn parse_number<T: std::str::FromStr>(
    params: &HashMap<String, String>,
    name: &'static str,
) -> Result<Option<T>, RequestError> {
    match params.get(name) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| RequestError::BadParameter {
                name,
                value: value.clone(),
            }),
    }
}

fn parse_flag(params: &HashMap<String, String>, name: &str, default: bool) -> bool {
    params.get(name).map_or(default, |v| v == "true")
}
