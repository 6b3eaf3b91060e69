//! Text decoding with an ordered encoding fallback chain.
//!
//! Article files arrive in whatever encoding the author's editor used.
//! Decoders are tried in order and the first clean decode wins; the last
//! step is lossy UTF-8, so decoding never fails.

use std::borrow::Cow;

use encoding_rs::WINDOWS_1251;

/// Encoding that produced the decoded text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    /// UTF-8, with an optional leading signature (BOM)
    Utf8Sig,
    /// Plain UTF-8
    Utf8,
    /// Legacy single-byte Cyrillic
    Windows1251,
    /// UTF-8 with invalid sequences replaced by U+FFFD
    Utf8Lossy,
}

impl TextEncoding {
    /// Fallback order used by [`decode_text`]
    pub const CHAIN: [TextEncoding; 4] = [
        TextEncoding::Utf8Sig,
        TextEncoding::Utf8,
        TextEncoding::Windows1251,
        TextEncoding::Utf8Lossy,
    ];

    /// Decode `bytes`, or `None` if they are not valid in this encoding
    pub fn try_decode(self, bytes: &[u8]) -> Option<String> {
        match self {
            TextEncoding::Utf8Sig => {
                let body = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
                std::str::from_utf8(body).ok().map(str::to_owned)
            }
            TextEncoding::Utf8 => std::str::from_utf8(bytes).ok().map(str::to_owned),
            TextEncoding::Windows1251 => {
                let (text, had_errors) = WINDOWS_1251.decode_without_bom_handling(bytes);
                if had_errors {
                    None
                } else {
                    Some(text.into_owned())
                }
            }
            TextEncoding::Utf8Lossy => Some(match String::from_utf8_lossy(bytes) {
                Cow::Borrowed(s) => s.to_owned(),
                Cow::Owned(s) => s,
            }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TextEncoding::Utf8Sig => "utf-8-sig",
            TextEncoding::Utf8 => "utf-8",
            TextEncoding::Windows1251 => "windows-1251",
            TextEncoding::Utf8Lossy => "utf-8-lossy",
        }
    }
}

/// Decode file bytes with the fallback chain
pub fn decode_text(bytes: &[u8]) -> (String, TextEncoding) {
    for encoding in TextEncoding::CHAIN {
        if let Some(text) = encoding.try_decode(bytes) {
            return (text, encoding);
        }
    }

    // Unreachable while the chain ends with Utf8Lossy
    (
        String::from_utf8_lossy(bytes).into_owned(),
        TextEncoding::Utf8Lossy,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf8_with_bom() {
        let mut bytes = b"\xEF\xBB\xBF".to_vec();
        bytes.extend_from_slice("Название".as_bytes());

        let (text, encoding) = decode_text(&bytes);
        assert_eq!(text, "Название");
        assert_eq!(encoding, TextEncoding::Utf8Sig);
    }

    #[test]
    fn test_plain_utf8() {
        let (text, encoding) = decode_text("Сон и здоровье".as_bytes());
        assert_eq!(text, "Сон и здоровье");
        // utf-8-sig accepts unsigned input too, so it is reported first
        assert_eq!(encoding, TextEncoding::Utf8Sig);
    }

    #[test]
    fn test_windows_1251() {
        let (bytes, _, _) = WINDOWS_1251.encode("Привет, мир");
        assert!(std::str::from_utf8(&bytes).is_err());

        let (text, encoding) = decode_text(&bytes);
        assert_eq!(text, "Привет, мир");
        assert_eq!(encoding, TextEncoding::Windows1251);
    }

    #[test]
    fn test_lossy_decoder_replaces_invalid_bytes() {
        let text = TextEncoding::Utf8Lossy
            .try_decode(b"ok \xFF\xFE end")
            .unwrap();
        assert!(text.starts_with("ok "));
        assert!(text.ends_with(" end"));
        assert!(text.contains('\u{FFFD}'));
    }

    #[test]
    fn test_strict_decoders_reject_invalid_utf8() {
        assert!(TextEncoding::Utf8.try_decode(b"\xFF").is_none());
        assert!(TextEncoding::Utf8Sig.try_decode(b"\xEF\xBB\xBF\xFF").is_none());
    }
}
