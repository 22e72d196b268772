//! File protocol implementation.
//!
//! A minimal HTTP/1.0 GET subset, one request per connection:
//!
//! ```text
//! Request:  <METHOD> <path> [ignored...]\n
//! Response: HTTP/1.0 200 OK\r\nConnection: close\r\n\r\n<file bytes>
//!
//! Example:
//! Request:  GET /tmp/index.html
//! Response: HTTP/1.0 200 OK ... <contents of /tmp/index.html>
//!
//! Request:  GET /a/../etc/passwd
//! Response: HTTP/1.0 403 Forbidden ... Forbidden: /a/../etc/passwd
//! ```
//!
//! Special paths:
//! - `/exit` - answer with a farewell body and stop the server
//!
//! Windows-style paths (`C:\dir\file`) are accepted and converted to
//! `/dir/file` before any check.

pub mod handler;
pub mod parser;
pub mod path;
pub mod response;

pub use handler::FileServer;
