//! Ladybug MCP Server
//!
//! Line-oriented JSON-RPC over stdio. Logs go to stderr, stdout carries
//! only protocol frames.
//!
//! Tools:
//! - convert: Convert values between two units of a data type
//! - to_si / to_ip: Convert values to the SI or IP default unit
//! - data_type: Describe a data type by name and/or unit
//! - list_units: List every data type and its units
//! - weather_data: Hourly values of one field from an .epw file
//!
//! Resources:
//! - ladybug://weather/{name} - Location and fields of an .epw file

mod config;
mod error;
mod server;
mod tools;

use std::io::{self, BufRead, Write};
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;
use config::Config;
use server::{McpRequest, McpResponse, Server, PROTOCOL_VERSION, SERVER_VERSION};

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn write_response(response: &McpResponse) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer(&mut stdout, response)?;
    writeln!(stdout)?;
    stdout.flush()
}

fn main() {
    init_logging();

    let config = Config::from_env();
    info!(version = SERVER_VERSION, protocol = PROTOCOL_VERSION, "Ladybug MCP Server started");
    info!(data_path = %config.data_path.display(), "configuration loaded");

    let files = config.weather_files();
    info!(count = files.len(), "available weather files");
    for name in &files {
        debug!(name = name.as_str(), "weather file");
    }

    let server = Server::new(config);

    // Use BufReader for stdin (line-based protocol)
    let stdin = io::stdin();
    let mut reader = io::BufReader::new(stdin.lock());

    loop {
        let mut line = String::new();
        match reader.read_line(&mut line) {
            Ok(0) => {
                info!("client disconnected (EOF)");
                break;
            }
            Ok(_) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                let request: McpRequest = match serde_json::from_str(line) {
                    Ok(r) => r,
                    Err(e) => {
                        warn!(error = %e, "could not parse request");
                        if let Err(e) = write_response(&McpResponse::parse_error(e)) {
                            error!(error = %e, "failed to write response");
                            break;
                        }
                        continue;
                    }
                };

                debug!(method = request.method.as_str(), "processing");
                let response = server.handle_request(&request);

                // Notifications (no id) should NOT receive a response
                if request.id.is_none() {
                    debug!(method = request.method.as_str(), "notification processed");
                    continue;
                }

                if let Err(e) = write_response(&response) {
                    error!(error = %e, "failed to write response");
                    break;
                }
            }
            Err(e) => {
                error!(error = %e, "failed to read input");
                break;
            }
        }
    }

    info!("server shutting down");
}
