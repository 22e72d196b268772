//! Hello protocol server.

use std::io::{self, BufReader, Write};
use std::net::{IpAddr, TcpListener, TcpStream};
use std::time::Duration;
use tracing::{debug, error, info};

use super::parser::{Reply, ERR_MESSAGE, LISTEN_MESSAGE};
use crate::protocols::read_line;
use crate::server::{self, Flow, Service};
use crate::socket::ServerSocket;

/// Answers one line per connection.
#[derive(Debug, Default)]
struct Greeter {
    read_timeout: Option<Duration>,
}

impl Service for Greeter {
    const IO_ERROR: &'static str = ERR_MESSAGE;

    fn handle(&mut self, stream: TcpStream) -> io::Result<Flow> {
        stream.set_read_timeout(self.read_timeout)?;

        let mut reader = BufReader::new(&stream);
        let line = read_line(&mut reader)?;
        let reply = Reply::for_line(&line);
        debug!(?reply, "Replying");

        let mut writer = &stream;
        writer.write_all(&reply.encode())?;
        writer.flush()?;

        Ok(match reply {
            Reply::Bye => Flow::Stop,
            Reply::Hello(_) => Flow::Continue,
        })
    }
}

/// Greeting server that stops after receiving the bye token.
#[derive(Debug)]
pub struct HelloServer {
    socket: ServerSocket,
    greeter: Greeter,
}

impl HelloServer {
    pub fn new(host: IpAddr) -> Self {
        Self {
            socket: ServerSocket::new(host),
            greeter: Greeter::default(),
        }
    }

    /// Bound how long a connection may take to send its line.
    pub fn with_read_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.greeter.read_timeout = timeout;
        self
    }

    /// The listening endpoint; `None` before a successful listen call.
    pub fn server_socket(&self) -> Option<&TcpListener> {
        self.socket.listener()
    }

    /// Listen on the first available port in `ports`.
    pub fn listen_on(&mut self, ports: &[u16]) -> Option<u16> {
        self.socket.listen_on(ports)
    }

    /// Listen on any free port.
    pub fn listen(&mut self) -> io::Result<u16> {
        self.socket.listen()
    }

    /// Serve greetings until a client sends the bye token.
    ///
    /// Binds a free port first unless already listening, and writes the
    /// port to `out`. Connection failures are written to `out` and
    /// serving continues. The server socket is closed before returning.
    pub fn run<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        let port = match self.socket.local_port() {
            Some(port) => port,
            None => match self.socket.listen() {
                Ok(port) => port,
                Err(e) => {
                    error!(error = %e, "Failed to listen");
                    let _ = writeln!(out, "{ERR_MESSAGE}");
                    self.socket.close();
                    return Err(e);
                }
            },
        };

        let _ = writeln!(out, "{LISTEN_MESSAGE}{port}");
        let _ = out.flush();

        let result = server::run(&self.socket, &mut self.greeter, out);
        self.socket.close();
        info!(port, "Hello server stopped");
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use std::net::{Ipv4Addr, Shutdown};
    use std::sync::mpsc;
    use std::thread::{self, JoinHandle};

    fn localhost() -> IpAddr {
        IpAddr::V4(Ipv4Addr::LOCALHOST)
    }

    fn start_server() -> (u16, JoinHandle<(HelloServer, String)>) {
        let mut server = HelloServer::new(localhost());
        let port = server.listen().unwrap();

        let handle = thread::spawn(move || {
            let mut out = Vec::new();
            server.run(&mut out).unwrap();
            (server, String::from_utf8(out).unwrap())
        });

        (port, handle)
    }

    fn exchange(port: u16, line: &str) -> String {
        let mut stream = TcpStream::connect((Ipv4Addr::LOCALHOST, port)).unwrap();
        stream.write_all(line.as_bytes()).unwrap();
        stream.shutdown(Shutdown::Write).unwrap();

        let mut reply = String::new();
        stream.read_to_string(&mut reply).unwrap();
        reply
    }

    #[test]
    fn test_server_socket_before_listen() {
        let server = HelloServer::new(localhost());
        assert!(server.server_socket().is_none());
    }

    #[test]
    fn test_listen_on_first_available() {
        let taken = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).unwrap();
        let taken_port = taken.local_addr().unwrap().port();

        let mut server = HelloServer::new(localhost());
        assert_eq!(server.listen_on(&[taken_port]), None);
        assert!(server.server_socket().is_none());

        let port = server.listen_on(&[taken_port, 0]).unwrap();
        let bound = server.server_socket().unwrap().local_addr().unwrap().port();
        assert_eq!(port, bound);
    }

    #[test]
    fn test_hello_then_bye() {
        let (port, handle) = start_server();

        assert_eq!(exchange(port, "hello\n"), "hello hello\n");
        assert_eq!(exchange(port, "world\r\n"), "hello world\n");
        assert_eq!(exchange(port, "bye\n"), "bye\n");

        let (server, out) = handle.join().unwrap();
        assert_eq!(out, format!("Listening on port: {port}\n"));
        assert!(server.server_socket().is_none());
        assert!(TcpStream::connect((Ipv4Addr::LOCALHOST, port)).is_err());
    }

    #[test]
    fn test_client_closing_early_is_reported() {
        let (port, handle) = start_server();

        drop(TcpStream::connect((Ipv4Addr::LOCALHOST, port)).unwrap());
        assert_eq!(exchange(port, "again\n"), "hello again\n");
        assert_eq!(exchange(port, "bye"), "bye\n");

        let (_, out) = handle.join().unwrap();
        assert_eq!(out, format!("Listening on port: {port}\nIO Error!\n"));
    }

    #[test]
    fn test_read_timeout_is_reported() {
        let mut server =
            HelloServer::new(localhost()).with_read_timeout(Some(Duration::from_millis(50)));
        let port = server.listen().unwrap();

        let handle = thread::spawn(move || {
            let mut out = Vec::new();
            server.run(&mut out).unwrap();
            String::from_utf8(out).unwrap()
        });

        // connect but never send
        let idle = TcpStream::connect((Ipv4Addr::LOCALHOST, port)).unwrap();
        assert_eq!(exchange(port, "bye\n"), "bye\n");
        drop(idle);

        let out = handle.join().unwrap();
        assert_eq!(out, format!("Listening on port: {port}\nIO Error!\n"));
    }

    #[test]
    fn test_run_binds_when_not_listening() {
        let (tx, rx) = mpsc::channel();
        let handle = thread::spawn(move || {
            let mut server = HelloServer::new(localhost());
            let mut out = PortTap { buf: Vec::new(), tx };
            server.run(&mut out).unwrap();
            String::from_utf8(out.buf).unwrap()
        });

        let port = rx.recv().unwrap();
        assert_eq!(exchange(port, "bye\n"), "bye\n");

        let out = handle.join().unwrap();
        assert_eq!(out, format!("Listening on port: {port}\n"));
    }

    /// Output sink that forwards the announced port.
    struct PortTap {
        buf: Vec<u8>,
        tx: mpsc::Sender<u16>,
    }

    impl Write for PortTap {
        fn write(&mut self, data: &[u8]) -> io::Result<usize> {
            self.buf.extend_from_slice(data);
            if self.buf.ends_with(b"\n") {
                let text = String::from_utf8_lossy(&self.buf);
                if let Some(Ok(port)) = text
                    .strip_prefix(LISTEN_MESSAGE)
                    .map(|rest| rest.trim_end().parse())
                {
                    let _ = self.tx.send(port);
                }
            }
            Ok(data.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }
}
