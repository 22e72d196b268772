//! Sequential accept loop shared by the file and hello servers.
//!
//! One connection is accepted and handled to completion before the next
//! `accept`. Per-connection failures are written to an error sink and
//! logged; they never stop the loop. Only a service returning
//! [`Flow::Stop`] ends it.

use std::io::{self, Write};
use std::net::{TcpListener, TcpStream};
use tracing::{debug, trace, warn};

use crate::socket::ServerSocket;

/// What the accept loop does after a connection has been handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Accept the next connection.
    Continue,
    /// Stop accepting. The listening socket is left as it is.
    Stop,
}

/// A protocol that handles exactly one connection per call.
pub trait Service {
    /// Line written to the error sink when a connection fails.
    const IO_ERROR: &'static str;

    /// Handle one accepted connection.
    ///
    /// The stream is owned by the call and is closed when it returns,
    /// on every path.
    fn handle(&mut self, stream: TcpStream) -> io::Result<Flow>;
}

/// Run `service` on the listening endpoint of `socket`.
///
/// Fails before serving if `socket` has no bound endpoint.
pub fn run<S, W>(socket: &ServerSocket, service: &mut S, errors: &mut W) -> io::Result<()>
where
    S: Service,
    W: Write,
{
    let listener = socket.listener().ok_or_else(|| {
        io::Error::new(io::ErrorKind::NotConnected, "server socket is not listening")
    })?;

    serve(listener, service, errors);
    Ok(())
}

/// Accept and handle connections until the service asks to stop.
pub fn serve<S, W>(listener: &TcpListener, service: &mut S, errors: &mut W)
where
    S: Service,
    W: Write,
{
    loop {
        let (stream, addr) = match listener.accept() {
            Ok(accepted) => accepted,
            Err(e) => {
                warn!(error = %e, "Failed to accept connection");
                report(errors, S::IO_ERROR);
                continue;
            }
        };

        debug!(peer = %addr, "New connection");

        match service.handle(stream) {
            Ok(Flow::Continue) => trace!(peer = %addr, "Connection closed"),
            Ok(Flow::Stop) => {
                debug!(peer = %addr, "Stop requested");
                return;
            }
            Err(e) => {
                warn!(peer = %addr, error = %e, "Connection error");
                report(errors, S::IO_ERROR);
            }
        }
    }
}

/// Write one line to the error sink, ignoring sink failures.
fn report<W: Write>(errors: &mut W, message: &str) {
    let _ = writeln!(errors, "{message}");
    let _ = errors.flush();
}
