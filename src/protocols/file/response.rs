//! Fixed wire responses of the file protocol.

use bytes::BytesMut;

pub const RESP_OK: &str = "HTTP/1.0 200 OK\r\nConnection: close\r\n\r\n";
pub const RESP_BADPATH: &str = "HTTP/1.0 403 Forbidden\r\nConnection: close\r\n\r\nForbidden: ";
pub const RESP_NOTFOUND: &str = "HTTP/1.0 404 Not Found\r\nConnection: close\r\n\r\nNot found: ";
pub const RESP_BADMETHOD: &str =
    "HTTP/1.0 405 Method not allowed\r\nConnection: close\r\nAllow: GET\r\n\r\nBad";
pub const EXIT_BODY: &str = "Thanks, I'm done.";

/// Line written to the error channel when a connection fails.
pub const MSG_IOERROR: &str = "There was an IO Error";

/// Every way a well-formed request can be answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Header only; the file bytes are streamed after it.
    Ok,
    BadMethod,
    /// Carries the path echoed after the fixed prefix.
    BadPath(String),
    /// Carries the path echoed after the fixed prefix.
    NotFound(String),
    Exit,
}

impl Outcome {
    /// Encode the complete response bytes for this outcome.
    pub fn encode(&self) -> BytesMut {
        match self {
            Outcome::Ok => BytesMut::from(RESP_OK),
            Outcome::BadMethod => BytesMut::from(RESP_BADMETHOD),
            Outcome::BadPath(path) => with_suffix(RESP_BADPATH, path),
            Outcome::NotFound(path) => with_suffix(RESP_NOTFOUND, path),
            Outcome::Exit => with_suffix(RESP_OK, EXIT_BODY),
        }
    }

    /// Status code, for logging.
    pub fn status(&self) -> u16 {
        match self {
            Outcome::Ok | Outcome::Exit => 200,
            Outcome::BadPath(_) => 403,
            Outcome::NotFound(_) => 404,
            Outcome::BadMethod => 405,
        }
    }
}

fn with_suffix(prefix: &str, suffix: &str) -> BytesMut {
    let mut resp = BytesMut::with_capacity(prefix.len() + suffix.len());
    resp.extend_from_slice(prefix.as_bytes());
    resp.extend_from_slice(suffix.as_bytes());
    resp
}
