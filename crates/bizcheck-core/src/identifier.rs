//! Identifier parsing and normalization.
//!
//! Users paste registration numbers in whatever shape their spreadsheet
//! produced: with dashes ("123-45-67890"), with spaces, one per line.
//! The upstream API only accepts digit strings, so every identifier is
//! normalized before it goes on the wire, while the original text is
//! kept for display.

/// Strip everything but ASCII digits. Never fails; may return an empty
/// string.
pub fn normalize_identifier(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Split raw multi-line input into an ordered identifier list.
///
/// Lines are trimmed; blank lines and lines with no digits at all are
/// dropped, so every returned identifier normalizes to a non-empty
/// digit string. The returned text is the original (trimmed) token, not
/// the normalized form.
pub fn parse_identifiers(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| !normalize_identifier(line).is_empty())
        .map(str::to_owned)
        .collect()
}
