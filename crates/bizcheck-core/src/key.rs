//! Service key normalization.
//!
//! The odcloud portal hands out the same API key in two representations
//! ("Encoding" and "Decoding" in its UI) and users paste either one.
//! The key goes into the query string, so the raw form must be
//! percent-encoded exactly once: a key that already contains a `%XX`
//! escape is passed through unchanged, anything else gets encoded here.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Characters left unescaped by the upstream portal's own encoder
/// (the `encodeURIComponent` set).
const QUERY_KEY: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Trim a pasted service key and bring it into its percent-encoded
/// query-string form, whichever representation the user supplied.
pub fn normalize_service_key(raw: &str) -> String {
    let key = raw.trim();
    if looks_percent_encoded(key) {
        key.to_string()
    } else {
        utf8_percent_encode(key, QUERY_KEY).to_string()
    }
}

/// True when the key contains at least one `%XX` hex escape.
fn looks_percent_encoded(key: &str) -> bool {
    let bytes = key.as_bytes();
    bytes.windows(3).any(|window| {
        window[0] == b'%'
            && window[1].is_ascii_hexdigit()
            && window[2].is_ascii_hexdigit()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_key_is_encoded() {
        // Decoding-form keys commonly end in "==".
        assert_eq!(normalize_service_key("abc123+/=="), "abc123%2B%2F%3D%3D");
    }

    #[test]
    fn test_encoded_key_passes_through() {
        let key = "abc123%2B%2F%3D%3D";
        assert_eq!(normalize_service_key(key), key);
    }

    #[test]
    fn test_key_is_trimmed() {
        assert_eq!(normalize_service_key("  plainkey  "), "plainkey");
    }

    #[test]
    fn test_unreserved_marks_survive_encoding() {
        assert_eq!(normalize_service_key("a-b_c.d!e~f"), "a-b_c.d!e~f");
    }

    #[test]
    fn test_stray_percent_is_not_an_escape() {
        // "%GG" is not a hex escape, so the key counts as raw.
        assert_eq!(normalize_service_key("abc%GGdef"), "abc%25GGdef");
    }
}
