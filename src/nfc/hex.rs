//! Hex helpers for tag UIDs.

/// Lowercase hex, two digits per byte, no separators.
pub fn bytes_to_hex(bytes: &[u8]) -> String {
    ::hex::encode(bytes)
}

/// Parse a UID written as hex. Accepts either case and ignores `:`, `-`
/// and whitespace separators. Returns `None` for odd-length or non-hex input.
pub fn parse_hex(text: &str) -> Option<Vec<u8>> {
    let digits: String = text
        .chars()
        .filter(|&c| !matches!(c, ':' | '-') && !c.is_whitespace())
        .collect();
    if digits.is_empty() {
        return None;
    }
    ::hex::decode(digits).ok()
}
