// CLI entry point for the Tunesmith HTTP server.
//
// Starts the server and blocks until the process is killed. See `server.rs`
// for the worker architecture and routes.
//
// Usage:
//   server [OPTIONS]
//     --host <HOST>      Bind address (default: 0.0.0.0)
//     --port <PORT>      Listen port (default: 5000)
//     --workers <N>      Worker threads (default: 4)
//     --config <PATH>    JSON generator config (optional)
//
// Set RUST_LOG=info to see one line per request.

use std::path::PathBuf;

use tunesmith_server::{ServerConfig, start_server};

fn main() {
    env_logger::init();
    let config = parse_args();

    let (handle, addr) = match start_server(config) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Failed to start server: {e}");
            std::process::exit(1);
        }
    };

    println!("Tunesmith listening on http://{addr}/");
    println!("Press Ctrl+C to stop.");
    handle.wait();
}

/// Parse command-line arguments into a `ServerConfig`.
fn parse_args() -> ServerConfig {
    let mut config = ServerConfig::default();
    let args: Vec<String> = std::env::args().collect();
    let mut i = 1;

    while i < args.len() {
        match args[i].as_str() {
            "--host" => {
                i += 1;
                config.host = args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("--host requires a value");
                    std::process::exit(1);
                });
            }
            "--port" => {
                i += 1;
                config.port = args.get(i).and_then(|s| s.parse().ok()).unwrap_or_else(|| {
                    eprintln!("--port requires a valid port number");
                    std::process::exit(1);
                });
            }
            "--workers" => {
                i += 1;
                config.workers = args
                    .get(i)
                    .and_then(|s| s.parse().ok())
                    .filter(|&n| n > 0)
                    .unwrap_or_else(|| {
                        eprintln!("--workers requires a positive number");
                        std::process::exit(1);
                    });
            }
            "--config" => {
                i += 1;
                config.config_path = Some(args.get(i).map(PathBuf::from).unwrap_or_else(|| {
                    eprintln!("--config requires a path");
                    std::process::exit(1);
                }));
            }
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            other => {
                eprintln!("Unknown argument: {other}");
                print_usage();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    config
}

fn print_usage() {
    println!("Usage: server [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --host <HOST>      Bind address (default: 0.0.0.0)");
    println!("  --port <PORT>      Listen port (default: 5000)");
    println!("  --workers <N>      Worker threads (default: 4)");
    println!("  --config <PATH>    JSON generator config (optional)");
    println!("  --help, -h         Show this help");
}
