//! File protocol connection handler.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::net::TcpStream;
use std::time::Duration;
use tracing::{debug, trace};

use super::parser::{route, Route};
use super::response::{Outcome, MSG_IOERROR};
use crate::protocols::read_line;
use crate::server::{self, Flow, Service};
use crate::socket::ServerSocket;

/// Serves one request per connection until a client asks for `/exit`.
#[derive(Debug, Default)]
pub struct FileServer {
    read_timeout: Option<Duration>,
}

impl FileServer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bound how long a connection may take to send its request line.
    pub fn with_read_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Serve connections on an already listening socket.
    ///
    /// Returns after a client requests `/exit`. The listening socket is
    /// left open; closing it is up to the caller. Connection failures
    /// are written to `errors` and serving continues.
    pub fn run_single_client<W: Write>(
        &mut self,
        socket: &ServerSocket,
        errors: &mut W,
    ) -> io::Result<()> {
        server::run(socket, self, errors)
    }
}

impl Service for FileServer {
    const IO_ERROR: &'static str = MSG_IOERROR;

    fn handle(&mut self, stream: TcpStream) -> io::Result<Flow> {
        stream.set_read_timeout(self.read_timeout)?;

        let mut reader = BufReader::new(&stream);
        let line = read_line(&mut reader)?;
        trace!(line = %line, "Request line");

        let mut writer = BufWriter::new(&stream);
        let flow = match route(&line) {
            Route::Drop => {
                trace!("Malformed request line, dropping connection");
                return Ok(Flow::Continue);
            }
            Route::BadMethod => {
                respond(&mut writer, &Outcome::BadMethod)?;
                Flow::Continue
            }
            Route::Exit => {
                respond(&mut writer, &Outcome::Exit)?;
                Flow::Stop
            }
            Route::BadPath(path) => {
                respond(&mut writer, &Outcome::BadPath(path))?;
                Flow::Continue
            }
            Route::File(path) => {
                send_file(&mut writer, &path)?;
                Flow::Continue
            }
        };

        writer.flush()?;
        Ok(flow)
    }
}

fn respond<W: Write>(writer: &mut W, outcome: &Outcome) -> io::Result<()> {
    debug!(status = outcome.status(), "Response");
    writer.write_all(&outcome.encode())
}

/// Send the OK header followed by the file, or NOT_FOUND if the path is
/// not a readable regular file.
fn send_file<W: Write>(writer: &mut W, path: &str) -> io::Result<()> {
    let mut file = match open_regular_file(path) {
        Some(file) => file,
        None => return respond(writer, &Outcome::NotFound(path.to_string())),
    };

    respond(writer, &Outcome::Ok)?;
    let sent = io::copy(&mut file, writer)?;
    debug!(path, bytes = sent, "File sent");
    Ok(())
}

fn open_regular_file(path: &str) -> Option<File> {
    let file = File::open(path).ok()?;
    match file.metadata() {
        Ok(meta) if meta.is_file() => Some(file),
        _ => None,
    }
}
