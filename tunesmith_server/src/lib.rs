// tunesmith_server: HTTP front end for the Tunesmith composer.
//
// Serves a small HTML page at `/` and composes a fresh MIDI file for every
// `POST /generate`. All composition happens in `tunesmith_music`; this crate
// only turns query strings into `GenerationRequest`s and results into HTTP
// responses.
//
// Module overview:
// - `request.rs`: Query-string decoding into `GenerateParams`, and the
//                 `RequestError` type with its HTTP status mapping.
// - `server.rs`:  `tiny_http` listener, worker pool, routing, and response
//                 construction.
//
// The server can run as a standalone binary (`main.rs`) or be embedded via
// the library API (`start_server`), which is how the smoke tests drive it.

pub mod request;
pub mod server;

pub use server::{ServerConfig, ServerHandle, start_server};
