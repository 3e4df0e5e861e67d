// HTTP server for on-demand composition.
//
// Architecture: one `tiny_http::Server` shared by a fixed pool of worker
// threads.
//
// - Each **worker** loops on `Server::recv_timeout`, handles one request to
//   completion, responds, and goes back to waiting. Generation is
//   synchronous and cheap, so a request never hands off to another thread.
// - Each request builds its own `TuneRng` (from the `seed` parameter, or
//   from entropy) and its own composition. Workers share only the read-only
//   `ServerConfig`, so there are no locks.
//
// Routes:
// - `GET /`: HTML page describing the generator.
// - `POST /generate`: compose and return `audio/midi` as an attachment.
//   Failures return `{"error": "..."}` with 400 or 500 (see
//   `RequestError::status_code`).
// - Anything else is 404, or 405 for a known path with the wrong method.
//
// Shutdown: `ServerHandle::stop` clears the `keep_running` flag; each worker
// notices within one poll interval and exits.

use std::io::{self, Cursor};
use std::net::SocketAddr;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use tiny_http::{Header, Method, Request, Response, Server};
use tunesmith_music::midi::MIDI_MIME_TYPE;
use tunesmith_music::{GeneratorConfig, compose, encode_midi};
use tunesmith_prng::TuneRng;

use crate::request::{GenerateParams, RequestError};

/// How long a worker blocks waiting for a request before rechecking
/// `keep_running`.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

const INDEX_HTML: &str = include_str!("../static/index.html");

type HttpResponse = Response<Cursor<Vec<u8>>>;

/// Configuration for starting a server.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Number of worker threads handling requests concurrently.
    pub workers: usize,
    /// Filename offered to the browser for the MIDI download.
    pub download_name: String,
    /// Optional JSON generator config; defaults are used when absent.
    pub config_path: Option<PathBuf>,
    pub generator: GeneratorConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 5000,
            workers: 4,
            download_name: "generated_music.mid".into(),
            config_path: None,
            generator: GeneratorConfig::default(),
        }
    }
}

/// Handle returned by `start_server` to control the running server.
pub struct ServerHandle {
    keep_running: Arc<AtomicBool>,
    workers: Vec<thread::JoinHandle<()>>,
}

impl ServerHandle {
    /// Signal the workers to stop and wait for them to exit.
    pub fn stop(self) {
        self.keep_running.store(false, Ordering::SeqCst);
        for worker in self.workers {
            let _ = worker.join();
        }
    }

    /// Block until every worker exits (normally never, for the binary).
    pub fn wait(self) {
        for worker in self.workers {
            let _ = worker.join();
        }
    }
}

/// Bind the listener and start the worker pool. Returns a handle and the
/// bound address (useful when port 0 lets the OS pick a free port).
///
/// If `config.config_path` is set, the generator config is loaded from it,
/// replacing `config.generator`.
pub fn start_server(mut config: ServerConfig) -> io::Result<(ServerHandle, SocketAddr)> {
    if let Some(path) = &config.config_path {
        config.generator = GeneratorConfig::load(path)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e.to_string()))?;
        log::info!("loaded generator config from {}", path.display());
    }
    config
        .generator
        .validate()
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e.to_string()))?;

    let server = Server::http(format!("{}:{}", config.host, config.port)).map_err(io::Error::other)?;
    let addr = server
        .server_addr()
        .to_ip()
        .ok_or_else(|| io::Error::other("listener is not bound to an IP address"))?;

    let server = Arc::new(server);
    let config = Arc::new(config);
    let keep_running = Arc::new(AtomicBool::new(true));

    let workers = (0..config.workers.max(1))
        .map(|id| {
            let server = Arc::clone(&server);
            let config = Arc::clone(&config);
            let keep_running = Arc::clone(&keep_running);
            thread::Builder::new()
                .name(format!("tunesmith-worker-{id}"))
                .spawn(move || worker_loop(&server, &config, &keep_running))
        })
        .collect::<io::Result<Vec<_>>>()?;

    log::info!("listening on {addr} with {} workers", workers.len());
    Ok((
        ServerHandle {
            keep_running,
            workers,
        },
        addr,
    ))
}

/// Worker loop. Runs until `keep_running` is cleared.
fn worker_loop(server: &Server, config: &ServerConfig, keep_running: &AtomicBool) {
    while keep_running.load(Ordering::SeqCst) {
        match server.recv_timeout(POLL_INTERVAL) {
            Ok(Some(request)) => {
                // A panicking handler drops its request, which tiny_http
                // answers with a 500; the worker itself keeps serving.
                if panic::catch_unwind(AssertUnwindSafe(|| handle_request(request, config))).is_err() {
                    log::error!("request handler panicked");
                }
            }
            Ok(None) => {}
            Err(e) => {
                log::error!("accept failed: {e}");
                thread::sleep(POLL_INTERVAL);
            }
        }
    }
}

/// Route one request and send the response.
fn handle_request(request: Request, config: &ServerConfig) {
    let started = Instant::now();
    let method = request.method().clone();
    let url = request.url().to_string();
    let (path, query) = url.split_once('?').unwrap_or((url.as_str(), ""));

    let response = match (&method, path) {
        (Method::Get, "/") => html_response(INDEX_HTML),
        (Method::Post, "/generate") => generate_response(query, config),
        (_, "/" | "/generate") => error_response(405, &format!("method {method} not allowed on {path}")),
        _ => error_response(404, &format!("no route for {path}")),
    };

    let status = response.status_code().0;
    match request.respond(response) {
        Ok(()) => log::info!("{method} {path} -> {status} in {:?}", started.elapsed()),
        Err(e) => log::warn!("{method} {path}: failed to send response: {e}"),
    }
}

/// Compose, encode, and wrap the MIDI bytes as a download.
fn generate_response(query: &str, config: &ServerConfig) -> HttpResponse {
    match generate(query, config) {
        Ok(bytes) => {
            let disposition = format!("attachment; filename=\"{}\"", config.download_name);
            with_header(
                with_header(Response::from_data(bytes), "Content-Type", MIDI_MIME_TYPE),
                "Content-Disposition",
                &disposition,
            )
        }
        Err(e) => {
            let status = e.status_code();
            if status >= 500 {
                log::error!("error generating MIDI: {e}");
            } else {
                log::warn!("rejected generation request: {e}");
            }
            error_response(status, &e.to_string())
        }
    }
}

fn generate(query: &str, config: &ServerConfig) -> Result<Vec<u8>, RequestError> {
    let params = GenerateParams::from_query(query)?;
    log::debug!(
        "generating MIDI with key={}, scale={}, tempo={}, octave={}, chords={}, drums={}, seed={:?}",
        params.request.key,
        params.request.mode,
        params.request.tempo_bpm,
        params.request.base_octave,
        params.request.enable_chords,
        params.request.enable_drums,
        params.seed
    );

    let mut rng = params.seed.map_or_else(TuneRng::from_entropy, TuneRng::new);
    let composition = compose(&params.request, &config.generator, &mut rng)?;
    let bytes = encode_midi(&composition, &config.generator.instruments)?;
    Ok(bytes)
}

fn html_response(body: &str) -> HttpResponse {
    with_header(
        Response::from_string(body),
        "Content-Type",
        "text/html; charset=utf-8",
    )
}

fn error_response(status: u16, message: &str) -> HttpResponse {
    let body = serde_json::json!({ "error": message }).to_string();
    with_header(
        Response::from_string(body).with_status_code(status),
        "Content-Type",
        "application/json",
    )
}

fn with_header(response: HttpResponse, name: &str, value: &str) -> HttpResponse {
    match Header::from_bytes(name.as_bytes(), value.as_bytes()) {
        Ok(header) => response.with_header(header),
        Err(()) => {
            log::warn!("dropping malformed header {name}: {value}");
            response
        }
    }
}
