//! Listening socket ownership.
//!
//! A `ServerSocket` holds the one bound, listening endpoint of a server
//! instance. It starts out idle, becomes listening after `listen` or
//! `listen_on`, and releases the endpoint on `close` or drop.

use std::io;
use std::net::{IpAddr, SocketAddr, TcpListener};
use tracing::{debug, info};

/// Backlog passed to `listen(2)`.
const LISTEN_BACKLOG: i32 = 1024;

/// Listening endpoint plus the "has listen been called" flag.
#[derive(Debug)]
pub struct ServerSocket {
    host: IpAddr,
    listener: Option<TcpListener>,
    listening: bool,
}

impl ServerSocket {
    /// Create an idle socket that will bind on `host` once asked to listen.
    pub fn new(host: IpAddr) -> Self {
        Self {
            host,
            listener: None,
            listening: false,
        }
    }

    /// Listen on the first available port in `ports`.
    ///
    /// Unavailable ports are skipped without error. Returns the bound
    /// port, or `None` if none of the candidates could be bound.
    pub fn listen_on(&mut self, ports: &[u16]) -> Option<u16> {
        self.listening = true;

        for &port in ports {
            match create_listener(SocketAddr::new(self.host, port)) {
                Ok(listener) => {
                    let bound = listener.local_addr().map(|a| a.port()).unwrap_or(port);
                    info!(port = bound, "Listening");
                    self.listener = Some(listener);
                    return Some(bound);
                }
                Err(e) => {
                    debug!(port, error = %e, "Can't listen on port");
                }
            }
        }

        None
    }

    /// Listen on any free port chosen by the OS.
    pub fn listen(&mut self) -> io::Result<u16> {
        self.listening = true;

        let listener = create_listener(SocketAddr::new(self.host, 0))?;
        let port = listener.local_addr()?.port();
        info!(port, "Listening");
        self.listener = Some(listener);
        Ok(port)
    }

    /// The listening endpoint, if a listen call succeeded.
    pub fn listener(&self) -> Option<&TcpListener> {
        if !self.is_listening() {
            return None;
        }
        self.listener.as_ref()
    }

    pub fn is_listening(&self) -> bool {
        self.listening
    }

    /// Port of the bound endpoint.
    pub fn local_port(&self) -> Option<u16> {
        self.listener()
            .and_then(|l| l.local_addr().ok())
            .map(|a| a.port())
    }

    /// Release the endpoint. Calling this again is a no-op.
    pub fn close(&mut self) {
        if let Some(listener) = self.listener.take() {
            let port = listener.local_addr().map(|a| a.port()).ok();
            drop(listener);
            debug!(?port, "Listening socket closed");
        }
        self.listening = false;
    }
}

/// Create a blocking TCP listener with `SO_REUSEADDR` set.
fn create_listener(addr: SocketAddr) -> io::Result<TcpListener> {
    let socket = socket2::Socket::new(
        match addr {
            SocketAddr::V4(_) => socket2::Domain::IPV4,
            SocketAddr::V6(_) => socket2::Domain::IPV6,
        },
        socket2::Type::STREAM,
        Some(socket2::Protocol::TCP),
    )?;

    socket.set_reuse_address(true)?;
    socket.bind(&addr.into())?;
    socket.listen(LISTEN_BACKLOG)?;

    Ok(socket.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{Ipv4Addr, TcpStream};

    fn localhost() -> IpAddr {
        IpAddr::V4(Ipv4Addr::LOCALHOST)
    }

    #[test]
    fn test_not_listening_before_listen() {
        let socket = ServerSocket::new(localhost());
        assert!(!socket.is_listening());
        assert!(socket.listener().is_none());
        assert_eq!(socket.local_port(), None);
    }

    #[test]
    fn test_listen_ephemeral() {
        let mut socket = ServerSocket::new(localhost());
        let port = socket.listen().unwrap();

        assert_ne!(port, 0);
        assert_eq!(socket.local_port(), Some(port));
        assert!(TcpStream::connect((localhost(), port)).is_ok());
    }

    #[test]
    fn test_listen_on_skips_taken_ports() {
        let taken = TcpListener::bind((localhost(), 0)).unwrap();
        let taken_port = taken.local_addr().unwrap().port();

        let mut socket = ServerSocket::new(localhost());
        let port = socket.listen_on(&[taken_port, 0]).unwrap();

        assert_ne!(port, taken_port);
        assert_eq!(socket.local_port(), Some(port));
    }

    #[test]
    fn test_listen_on_none_available() {
        let taken = TcpListener::bind((localhost(), 0)).unwrap();
        let taken_port = taken.local_addr().unwrap().port();

        let mut socket = ServerSocket::new(localhost());
        assert_eq!(socket.listen_on(&[taken_port, taken_port]), None);
        assert_eq!(socket.listen_on(&[]), None);

        // listen was called, but nothing is bound
        assert!(socket.is_listening());
        assert!(socket.listener().is_none());
    }

    #[test]
    fn test_close_releases_port() {
        let mut socket = ServerSocket::new(localhost());
        let port = socket.listen().unwrap();

        socket.close();
        socket.close();

        assert!(!socket.is_listening());
        assert!(TcpStream::connect((localhost(), port)).is_err());
    }
}
