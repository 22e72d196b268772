//! File protocol request line parser.

use tracing::trace;

/// Reserved path that stops the server.
pub const PATH_EXIT: &str = "/exit";

/// The only method the server answers.
pub const METHOD_GET: &str = "GET";

/// A parsed request line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// First token, as sent.
    pub method: String,
    /// Second token, as sent.
    pub raw_path: String,
    /// `raw_path` converted to forward-slash form.
    pub normalized_path: String,
}

impl Request {
    pub fn is_get(&self) -> bool {
        self.method.eq_ignore_ascii_case(METHOD_GET)
    }
}

/// What a request line asks the server to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// No separator in the line: close without a response.
    Drop,
    /// Method other than GET.
    BadMethod,
    /// The reserved exit path.
    Exit,
    /// Path failed the legality check.
    BadPath(String),
    /// Legal path to look up on disk.
    File(String),
}

/// Split a request line into method and path.
///
/// Every run of whitespace becomes a single space, then the line is split
/// at its first space. The path runs up to the next space; the rest of the
/// line is ignored. Returns `None` when the line has no space at all.
/// Leading or trailing whitespace therefore yields an empty method or path.
pub fn parse_request_line(line: &str) -> Option<Request> {
    let line = collapse_whitespace(line);
    let (method, rest) = line.split_once(' ')?;
    let raw_path = rest.split_once(' ').map_or(rest, |(path, _)| path);

    Some(Request {
        method: method.to_string(),
        raw_path: raw_path.to_string(),
        normalized_path: normalize_path(raw_path),
    })
}

/// Replace each run of separator characters with one space.
fn collapse_whitespace(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut in_run = false;
    for c in line.chars() {
        if is_separator(c) {
            if !in_run {
                out.push(' ');
            }
            in_run = true;
        } else {
            out.push(c);
            in_run = false;
        }
    }
    out
}

/// Space, tab, newline, vertical tab, form feed, carriage return.
fn is_separator(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\x0B' | '\x0C' | '\r')
}

/// Convert a native path to forward-slash form.
///
/// A leading drive letter (`C:`) is removed and backslashes become `/`,
/// so `C:\dir\file` turns into `/dir/file`.
pub fn normalize_path(path: &str) -> String {
    let bytes = path.as_bytes();
    let rest = if bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' {
        &path[2..]
    } else {
        path
    };

    rest.replace('\\', "/")
}

/// Decide how to answer a request line.
pub fn route(line: &str) -> Route {
    let request = match parse_request_line(line) {
        Some(request) => request,
        None => return Route::Drop,
    };

    if !request.is_get() {
        return Route::BadMethod;
    }

    if request.raw_path != request.normalized_path {
        trace!(raw = %request.raw_path, path = %request.normalized_path, "Normalized path");
    }

    let path = request.normalized_path;
    if path == PATH_EXIT {
        Route::Exit
    } else if !super::path::is_legal_absolute_path(&path) {
        Route::BadPath(path)
    } else {
        Route::File(path)
    }
}
