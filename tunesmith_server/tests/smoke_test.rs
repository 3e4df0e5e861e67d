// Integration smoke test for the HTTP server.
//
// Starts a server on an OS-assigned localhost port and talks to it over
// plain TCP with hand-written HTTP/1.0 requests, so each response ends when
// the server closes the connection. Covers the generation round trip (bytes
// parsed back with `midly`), client and routing errors, the index page, and
// several requests in flight at once.

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::thread;
use std::time::Duration;

use midly::{MidiMessage, Smf, TrackEventKind};
use tunesmith_server::{ServerConfig, start_server};

struct HttpReply {
    status: u16,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl HttpReply {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

fn send(addr: SocketAddr, method: &str, target: &str) -> HttpReply {
    let mut stream = TcpStream::connect(addr).unwrap();
    stream
        .set_read_timeout(Some(Duration::from_secs(10)))
        .unwrap();
    write!(
        stream,
        "{method} {target} HTTP/1.0\r\nHost: localhost\r\nConnection: close\r\nContent-Length: 0\r\n\r\n"
    )
    .unwrap();
    stream.flush().unwrap();

    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).unwrap();
    let split = raw
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .expect("response has a header terminator");
    let head = String::from_utf8_lossy(&raw[..split]).into_owned();
    let body = raw[split + 4..].to_vec();

    let mut lines = head.lines();
    let status_line = lines.next().unwrap();
    let status = status_line
        .split_whitespace()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap();
    let headers = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect();

    HttpReply {
        status,
        headers,
        body,
    }
}

fn start() -> (tunesmith_server::ServerHandle, SocketAddr) {
    start_server(ServerConfig {
        host: "127.0.0.1".into(),
        port: 0,
        workers: 2,
        ..ServerConfig::default()
    })
    .unwrap()
}

fn note_on_count(smf: &Smf<'_>, track: usize) -> usize {
    smf.tracks[track]
        .iter()
        .filter(|e| {
            matches!(
                e.kind,
                TrackEventKind::Midi {
                    message: MidiMessage::NoteOn { .. },
                    ..
                }
            )
        })
        .count()
}

#[test]
fn generate_returns_midi_attachment() {
    let (handle, addr) = start();

    let reply = send(
        addr,
        "POST",
        "/generate?key=C&scale=major&tempo=120&octave=4&enableChords=true&enableDrums=true",
    );
    assert_eq!(reply.status, 200, "{}", reply.body_text());
    assert_eq!(reply.header("Content-Type"), Some("audio/midi"));
    let disposition = reply.header("Content-Disposition").unwrap();
    assert!(disposition.starts_with("attachment"), "{disposition}");
    assert!(disposition.contains("generated_music.mid"), "{disposition}");

    let smf = Smf::parse(&reply.body).unwrap();
    assert_eq!(smf.tracks.len(), 3);
    assert_eq!(note_on_count(&smf, 0), 32);
    assert!(note_on_count(&smf, 1) > 0);
    assert!(note_on_count(&smf, 2) > 0);

    handle.stop();
}

#[test]
fn melody_only_with_seed_is_reproducible() {
    let (handle, addr) = start();

    let target = "/generate?key=F%23&scale=minor&enableChords=false&enableDrums=false&seed=11";
    let first = send(addr, "POST", target);
    let second = send(addr, "POST", target);
    assert_eq!(first.status, 200);
    assert_eq!(first.body, second.body);

    let smf = Smf::parse(&first.body).unwrap();
    assert_eq!(note_on_count(&smf, 0), 32);
    assert_eq!(note_on_count(&smf, 1), 0);
    assert_eq!(note_on_count(&smf, 2), 0);

    handle.stop();
}

#[test]
fn invalid_input_is_a_client_error() {
    let (handle, addr) = start();

    let reply = send(addr, "POST", "/generate?key=H");
    assert_eq!(reply.status, 400);
    assert_eq!(reply.header("Content-Type"), Some("application/json"));
    let body: serde_json::Value = serde_json::from_slice(&reply.body).unwrap();
    assert!(body["error"].as_str().unwrap().contains('H'), "{body}");

    let reply = send(addr, "POST", "/generate?scale=blues");
    assert_eq!(reply.status, 400);

    let reply = send(addr, "POST", "/generate?tempo=0");
    assert_eq!(reply.status, 400);

    let reply = send(addr, "POST", "/generate?tempo=fast");
    assert_eq!(reply.status, 400);

    let reply = send(addr, "POST", "/generate?tempo=60000001");
    assert_eq!(reply.status, 400);

    // Enough extreme octaves to occupy every worker, then a normal request
    // to show the workers are still serving.
    for _ in 0..4 {
        let reply = send(addr, "POST", "/generate?octave=2147483647");
        assert_eq!(reply.status, 400);
    }
    let reply = send(addr, "POST", "/generate?seed=1");
    assert_eq!(reply.status, 200);

    handle.stop();
}

#[test]
fn index_page_and_routing_errors() {
    let (handle, addr) = start();

    let reply = send(addr, "GET", "/");
    assert_eq!(reply.status, 200);
    assert!(
        reply
            .header("Content-Type")
            .unwrap()
            .starts_with("text/html")
    );
    assert!(reply.body_text().contains("/generate"));

    assert_eq!(send(addr, "GET", "/generate").status, 405);
    assert_eq!(send(addr, "POST", "/").status, 405);
    assert_eq!(send(addr, "GET", "/nowhere").status, 404);

    handle.stop();
}

#[test]
fn concurrent_requests_all_succeed() {
    let (handle, addr) = start();

    let clients: Vec<_> = (0..8)
        .map(|i| {
            thread::spawn(move || {
                send(
                    addr,
                    "POST",
                    &format!("/generate?scale=dorian&seed={i}&tempo=100"),
                )
            })
        })
        .collect();

    for client in clients {
        let reply = client.join().unwrap();
        assert_eq!(reply.status, 200);
        assert!(Smf::parse(&reply.body).is_ok());
    }

    handle.stop();
}
