//! Protocol implementations.
//!
//! Each protocol answers exactly one request line per connection and is
//! driven by the sequential accept loop in `server`.
//!
//! - `file`: minimal HTTP/1.0 GET file server with a reserved exit path
//! - `hello`: one-line greeting server with a reserved bye token, plus
//!   the client that drives it

pub mod file;
pub mod hello;

use std::io::{self, BufRead, Read};

/// Initial capacity for a request line.
const LINE_CAPACITY: usize = 256;

/// Longest accepted line, terminator included.
pub(crate) const MAX_LINE_LENGTH: usize = 8 * 1024;

/// Read one line from `reader`, without its `\n` or `\r\n` terminator.
///
/// End-of-stream before any byte is an `UnexpectedEof` error. A final line
/// with no terminator is returned as is. A line longer than
/// `MAX_LINE_LENGTH` is an `InvalidData` error. Invalid UTF-8 is replaced.
pub(crate) fn read_line<R: BufRead>(reader: &mut R) -> io::Result<String> {
    let mut buf = Vec::with_capacity(LINE_CAPACITY);
    let n = reader
        .take(MAX_LINE_LENGTH as u64)
        .read_until(b'\n', &mut buf)?;
    if n == 0 {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "connection closed before a line was sent",
        ));
    }

    if n == MAX_LINE_LENGTH && buf.last() != Some(&b'\n') {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "line exceeds maximum length",
        ));
    }

    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    }

    Ok(String::from_utf8_lossy(&buf).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_line_strips_terminator() {
        let mut input: &[u8] = b"GET /a\r\nnext\n";
        assert_eq!(read_line(&mut input).unwrap(), "GET /a");
        assert_eq!(read_line(&mut input).unwrap(), "next");
    }

    #[test]
    fn test_read_line_unterminated() {
        let mut input: &[u8] = b"bye";
        assert_eq!(read_line(&mut input).unwrap(), "bye");
    }

    #[test]
    fn test_read_line_empty_line_is_not_eof() {
        let mut input: &[u8] = b"\n";
        assert_eq!(read_line(&mut input).unwrap(), "");
    }

    #[test]
    fn test_read_line_eof() {
        let mut input: &[u8] = b"";
        let err = read_line(&mut input).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_read_line_too_long() {
        let long = vec![b'a'; MAX_LINE_LENGTH + 10];
        let mut input: &[u8] = &long;
        let err = read_line(&mut input).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_read_line_at_limit() {
        let mut line = vec![b'a'; MAX_LINE_LENGTH - 1];
        line.push(b'\n');
        let mut input: &[u8] = &line;
        assert_eq!(read_line(&mut input).unwrap().len(), MAX_LINE_LENGTH - 1);

        // unterminated but shorter than the limit
        let short = vec![b'b'; MAX_LINE_LENGTH - 1];
        let mut input: &[u8] = &short;
        assert_eq!(read_line(&mut input).unwrap().len(), MAX_LINE_LENGTH - 1);
    }

    #[test]
    fn test_read_line_lossy() {
        let mut input: &[u8] = b"GET /caf\xe9\n";
        assert_eq!(read_line(&mut input).unwrap(), "GET /caf\u{fffd}");
    }
}
