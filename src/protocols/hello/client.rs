//! Hello protocol client.

use std::io::{self, BufReader, Write};
use std::net::TcpStream;
use tracing::{debug, error, warn};

use super::parser::{BYE_MESSAGE, ERR_MESSAGE};
use crate::protocols::read_line;

/// Number of greeting rounds before the final bye.
pub const COUNT: usize = 10;

/// Greets a hello server a fixed number of times, then says bye.
#[derive(Debug, Clone)]
pub struct HelloClient {
    host: String,
    port: u16,
    count: usize,
}

impl HelloClient {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            count: COUNT,
        }
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }

    /// Open a fresh connection to the server.
    pub fn connect(&self) -> io::Result<TcpStream> {
        TcpStream::connect((self.host.as_str(), self.port))
    }

    /// Run the greeting rounds followed by the bye exchange.
    ///
    /// Each reply is written to `out` as one line. A failed round writes
    /// an error line and moves on to the next one; a failed bye exchange
    /// writes an error line and returns the error.
    pub fn run<W: Write>(&self, out: &mut W, name: &str) -> io::Result<()> {
        for round in 0..self.count {
            let result = self
                .exchange(name)
                .and_then(|reply| writeln!(out, "{reply}"));

            if let Err(e) = result {
                warn!(round, error = %e, "Greeting round failed");
                let _ = writeln!(out, "{ERR_MESSAGE}");
            }
        }

        let result = self
            .exchange(BYE_MESSAGE)
            .and_then(|reply| writeln!(out, "{reply}"));

        if let Err(e) = result {
            error!(error = %e, "Bye exchange failed");
            let _ = writeln!(out, "{ERR_MESSAGE}");
            return Err(e);
        }

        out.flush()
    }

    /// Send one line on a new connection and read one line back.
    fn exchange(&self, line: &str) -> io::Result<String> {
        let stream = self.connect()?;

        let mut writer = &stream;
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;

        let mut reader = BufReader::new(&stream);
        let reply = read_line(&mut reader)?;
        debug!(sent = line, reply = %reply, "Exchange done");
        Ok(reply)
    }
}
