//! Hello protocol implementation.
//!
//! A one-line greeting service, one line per connection:
//! - Client sends: `<name>\n`
//! - Server responds: `hello <name>\n`
//!
//! ## Protocol Format
//!
//! ```text
//! Request:  world\n
//! Response: hello world\n
//!
//! Request:  bye\n
//! Response: bye\n
//! ```
//!
//! Special lines:
//! - `bye` - answered with `bye`, then the server stops accepting
//!
//! `client` connects repeatedly with a name and finishes with `bye`.

pub mod client;
pub mod handler;
pub mod parser;

pub use client::HelloClient;
pub use handler::HelloServer;
