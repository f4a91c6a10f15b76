// Text encoding helpers for tag fields

use encoding_rs::{UTF_8, WINDOWS_1252};

/// Decode a fixed-width Latin-1 field: stops at the first NUL, trims trailing spaces
pub fn decode_latin1_field(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    WINDOWS_1252.decode(&bytes[..end]).0.trim_end().to_string()
}

/// Encode into a fixed-width Latin-1 field, NUL padded and truncated to `width`.
/// Characters with no single-byte mapping become `?`.
pub fn encode_latin1_field(text: &str, width: usize) -> Vec<u8> {
    let mut encoded = Vec::with_capacity(width);
    let mut buf = [0u8; 4];
    for c in text.chars().take(width) {
        let (bytes, _, unmappable) = WINDOWS_1252.encode(c.encode_utf8(&mut buf));
        match (unmappable, bytes.as_ref()) {
            (false, [byte]) => encoded.push(*byte),
            _ => encoded.push(b'?'),
        }
    }
    encoded.resize(width, 0);
    encoded
}

/// Decode UTF-8 bytes, replacing invalid sequences
pub fn decode_utf8(bytes: &[u8]) -> String {
    UTF_8.decode_without_bom_handling(bytes).0.into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latin1_field_round() {
        let field = encode_latin1_field("Café", 30);
        assert_eq!(field.len(), 30);
        assert_eq!(field[3], 0xE9);
        assert_eq!(decode_latin1_field(&field), "Café");
    }

    #[test]
    fn test_latin1_field_truncates() {
        let field = encode_latin1_field("abcdef", 4);
        assert_eq!(field, b"abcd");
    }

    #[test]
    fn test_latin1_field_replaces_unmappable() {
        let field = encode_latin1_field("日本 mix", 30);
        assert_eq!(&field[..6], b"?? mix");
        assert_eq!(decode_latin1_field(&field), "?? mix");

        // Truncation counts characters, never splitting a replacement
        assert_eq!(encode_latin1_field("日本語です", 3), b"???");
    }

    #[test]
    fn test_latin1_field_trims_padding() {
        assert_eq!(decode_latin1_field(b"Title   \0\0\0"), "Title");
    }

    #[test]
    fn test_utf8_lossy() {
        assert_eq!(decode_utf8("héllo".as_bytes()), "héllo");
        assert_eq!(decode_utf8(&[0x61, 0xFF]), "a\u{FFFD}");
    }
}
