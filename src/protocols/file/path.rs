//! Absolute path legality check.

/// Check if `path` is a well-formed absolute filesystem path.
///
/// A legal path begins with `/`, consists only of ASCII letters, digits
/// and `_ . - ~ /`, and contains no `/../`. Existence is not checked.
pub fn is_legal_absolute_path(path: &str) -> bool {
    if !path.starts_with('/') || path.contains("/../") {
        return false;
    }

    path.bytes().all(is_path_byte)
}

fn is_path_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'_' | b'.' | b'-' | b'~' | b'/')
}
