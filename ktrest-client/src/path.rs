//! # Request Path Encoding
//!
//! Purpose: Turn raw key bytes (and an optional database name) into the
//! request path understood by the server's REST handler.
//!
//! ## Design Principles
//! 1. **One Segment per Key**: Every reserved byte, `/` included, is escaped.
//! 2. **Binary-Safe**: Non-UTF-8 key bytes are escaped like any other byte.
//! 3. **Buffer Reuse**: Encoders append into a caller-provided `String`.

use crate::client::{ClientError, ClientResult};

const HEX: &[u8; 16] = b"0123456789ABCDEF";

/// Builds `/<key>` or `/<database>/<key>` with both parts percent-encoded.
pub fn request_path(database: Option<&str>, key: &[u8]) -> ClientResult<String> {
    if is_dot_segment(key) {
        return Err(ClientError::UnaddressableKey);
    }

    let mut path = String::with_capacity(key.len() * 3 + 1);
    if let Some(database) = database {
        path.push('/');
        push_encoded(&mut path, database.as_bytes());
    }
    path.push('/');
    push_encoded(&mut path, key);
    Ok(path)
}

/// A bare "." or ".." segment is removed by URL normalisation.
pub fn is_dot_segment(segment: &[u8]) -> bool {
    segment == b"." || segment == b".."
}

/// Appends `data` to `out`, escaping everything outside the unreserved set.
pub fn push_encoded(out: &mut String, data: &[u8]) {
    for &b in data {
        if is_unreserved(b) {
            out.push(b as char);
        } else {
            out.push('%');
            out.push(HEX[(b >> 4) as usize] as char);
            out.push(HEX[(b & 0x0f) as usize] as char);
        }
    }
}

fn is_unreserved(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'.' | b'_' | b'~')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoded(data: &[u8]) -> String {
        let mut out = String::new();
        push_encoded(&mut out, data);
        out
    }

    #[test]
    fn keeps_unreserved_bytes() {
        assert_eq!(encoded(b"japan-Tokyo_1.2~x"), "japan-Tokyo_1.2~x");
    }

    #[test]
    fn escapes_reserved_bytes() {
        assert_eq!(encoded(b"a b/c%d"), "a%20b%2Fc%25d");
        assert_eq!(encoded(b"?#&+="), "%3F%23%26%2B%3D");
    }

    #[test]
    fn escapes_utf8_and_binary() {
        assert_eq!(encoded("東京".as_bytes()), "%E6%9D%B1%E4%BA%AC");
        assert_eq!(encoded(&[0x00, 0xff, b'\n']), "%00%FF%0A");
    }

    #[test]
    fn builds_key_path() {
        assert_eq!(request_path(None, b"japan").unwrap(), "/japan");
        assert_eq!(request_path(None, b"").unwrap(), "/");
    }

    #[test]
    fn builds_database_path() {
        assert_eq!(request_path(Some("casket.kch"), b"a/b").unwrap(), "/casket.kch/a%2Fb");
        assert_eq!(request_path(Some("1"), b"k").unwrap(), "/1/k");
    }

    #[test]
    fn rejects_dot_segments() {
        assert!(matches!(request_path(None, b"."), Err(ClientError::UnaddressableKey)));
        assert!(matches!(request_path(None, b".."), Err(ClientError::UnaddressableKey)));
        assert_eq!(request_path(None, b"...").unwrap(), "/...");
    }

    #[test]
    fn detects_dot_segments() {
        assert!(is_dot_segment(b"."));
        assert!(is_dot_segment(b".."));
        assert!(!is_dot_segment(b"..."));
        assert!(!is_dot_segment(b".kch"));
    }
}
