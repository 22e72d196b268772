//! Hello protocol messages.

use bytes::BytesMut;

pub const HELLO_MESSAGE: &str = "hello ";
pub const BYE_MESSAGE: &str = "bye";
pub const LISTEN_MESSAGE: &str = "Listening on port: ";
pub const ERR_MESSAGE: &str = "IO Error!";

/// Server answer to one received line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Greet the sender by the line it sent.
    Hello(String),
    /// Echo the bye token and stop.
    Bye,
}

impl Reply {
    /// Classify a received line (terminator already stripped).
    pub fn for_line(line: &str) -> Self {
        if line == BYE_MESSAGE {
            Reply::Bye
        } else {
            Reply::Hello(line.to_string())
        }
    }

    /// Encode the reply, newline included.
    pub fn encode(&self) -> BytesMut {
        match self {
            Reply::Hello(name) => {
                let mut resp = BytesMut::with_capacity(HELLO_MESSAGE.len() + name.len() + 1);
                resp.extend_from_slice(HELLO_MESSAGE.as_bytes());
                resp.extend_from_slice(name.as_bytes());
                resp.extend_from_slice(b"\n");
                resp
            }
            Reply::Bye => {
                let mut resp = BytesMut::with_capacity(BYE_MESSAGE.len() + 1);
                resp.extend_from_slice(BYE_MESSAGE.as_bytes());
                resp.extend_from_slice(b"\n");
                resp
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_line() {
        assert_eq!(Reply::for_line("bye"), Reply::Bye);
        assert_eq!(Reply::for_line("hello"), Reply::Hello("hello".to_string()));
        // exact match only
        assert_eq!(Reply::for_line("BYE"), Reply::Hello("BYE".to_string()));
        assert_eq!(Reply::for_line("bye "), Reply::Hello("bye ".to_string()));
        assert_eq!(Reply::for_line(""), Reply::Hello(String::new()));
    }

    #[test]
    fn test_encode() {
        assert_eq!(&Reply::for_line("hello").encode()[..], b"hello hello\n");
        assert_eq!(&Reply::for_line("").encode()[..], b"hello \n");
        assert_eq!(&Reply::Bye.encode()[..], b"bye\n");
    }
}
