//! tiny-serve: one-client-at-a-time line protocol servers
//!
//! Endpoints:
//! - File server: answers `GET <absolute path>` with the file contents,
//!   stops on `GET /exit`
//! - Hello server: answers `<name>` with `hello <name>`, stops on `bye`
//! - Hello client: greets a hello server repeatedly, then says `bye`
//!
//! Connections are accepted and handled strictly one at a time.
//! Configuration via CLI arguments or TOML file.

mod config;
mod protocols;
mod server;
mod socket;

use std::io;

use config::{Config, Mode};
use protocols::file::FileServer;
use protocols::hello::{HelloClient, HelloServer};
use socket::ServerSocket;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::load()?;

    // Initialize logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    info!(
        mode = ?config.mode,
        host = %config.host,
        ports = ?config.ports,
        read_timeout = ?config.read_timeout,
        "Starting tiny-serve"
    );

    match config.mode {
        Mode::File => run_file_server(&config),
        Mode::Hello => run_hello_server(&config),
        Mode::HelloClient => run_hello_client(&config),
    }
}

/// Serve files until a client requests `/exit`.
fn run_file_server(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let mut socket = ServerSocket::new(config.bind_host()?);
    let port = match config.ports.as_slice() {
        [] => socket.listen()?,
        ports => socket.listen_on(ports).ok_or_else(no_port_available)?,
    };
    info!(port, "File server ready, request GET /exit to stop");

    FileServer::new()
        .with_read_timeout(config.read_timeout)
        .run_single_client(&socket, &mut io::stderr())?;

    info!("Exiting due to client request");
    socket.close();
    Ok(())
}

/// Greet clients until one says bye.
fn run_hello_server(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let mut server = HelloServer::new(config.bind_host()?).with_read_timeout(config.read_timeout);
    if !config.ports.is_empty() {
        server
            .listen_on(&config.ports)
            .ok_or_else(no_port_available)?;
    }
    if let Some(listener) = server.server_socket() {
        info!(addr = ?listener.local_addr(), "Hello server bound");
    }

    server.run(&mut io::stdout())?;
    Ok(())
}

/// Drive a hello server through its greeting rounds and the bye exchange.
fn run_hello_client(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let port = config.target_port()?;
    info!(host = %config.host, port, count = config.count, "Connecting to hello server");

    HelloClient::new(config.host.as_str(), port)
        .with_count(config.count)
        .run(&mut io::stdout(), &config.name)?;
    Ok(())
}

fn no_port_available() -> io::Error {
    io::Error::new(
        io::ErrorKind::AddrInUse,
        "none of the candidate ports is available",
    )
}
