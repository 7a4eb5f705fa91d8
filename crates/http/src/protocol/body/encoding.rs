//! Text encodings a consumer may ask for when reading a body.

use std::fmt;
use std::str::FromStr;

use bytes::Bytes;

use crate::protocol::ParseError;

/// The text encoding applied to the accumulated bytes of one read.
///
/// Every consumer chooses its own encoding, the underlying bytes are shared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextEncoding {
    /// UTF-8, invalid sequences are replaced by U+FFFD
    Utf8,
    /// 7-bit ASCII, the high bit of every byte is dropped
    Ascii,
    /// ISO-8859-1, every byte maps to the code point of the same value
    Latin1,
    /// UTF-16 little endian, a trailing odd byte is ignored
    Utf16Le,
    /// lower case hexadecimal
    Hex,
    /// standard base64 with padding
    Base64,
}

impl TextEncoding {
    /// Decodes `bytes` into a string with this encoding. Decoding never fails.
    pub fn decode(self, bytes: &[u8]) -> String {
        match self {
            TextEncoding::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
            TextEncoding::Ascii => bytes.iter().map(|b| char::from(b & 0x7f)).collect(),
            TextEncoding::Latin1 => bytes.iter().map(|&b| char::from(b)).collect(),
            TextEncoding::Utf16Le => {
                let units = bytes.chunks_exact(2).map(|pair| u16::from_le_bytes([pair[0], pair[1]]));
                char::decode_utf16(units).map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER)).collect()
            }
            TextEncoding::Hex => hex::encode(bytes),
            TextEncoding::Base64 => base64::encode(bytes),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            TextEncoding::Utf8 => "utf8",
            TextEncoding::Ascii => "ascii",
            TextEncoding::Latin1 => "latin1",
            TextEncoding::Utf16Le => "utf16le",
            TextEncoding::Hex => "hex",
            TextEncoding::Base64 => "base64",
        }
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TextEncoding {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "utf8" | "utf-8" => Ok(TextEncoding::Utf8),
            "ascii" => Ok(TextEncoding::Ascii),
            "latin1" | "binary" | "iso-8859-1" => Ok(TextEncoding::Latin1),
            "utf16le" | "utf-16le" | "ucs2" | "ucs-2" => Ok(TextEncoding::Utf16Le),
            "hex" => Ok(TextEncoding::Hex),
            "base64" => Ok(TextEncoding::Base64),
            _ => Err(ParseError::unknown_encoding(s)),
        }
    }
}

/// The result of one read: the raw bytes, or the bytes decoded as text when the
/// reader asked for an encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodyContent {
    Bytes(Bytes),
    Text(String),
}

impl BodyContent {
    pub(crate) fn new(bytes: Bytes, encoding: Option<TextEncoding>) -> Self {
        match encoding {
            Some(encoding) => BodyContent::Text(encoding.decode(&bytes)),
            None => BodyContent::Bytes(bytes),
        }
    }

    /// Length in bytes for raw content, in characters for text content.
    pub fn len(&self) -> usize {
        match self {
            BodyContent::Bytes(bytes) => bytes.len(),
            BodyContent::Text(text) => text.chars().count(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            BodyContent::Bytes(bytes) => bytes.is_empty(),
            BodyContent::Text(text) => text.is_empty(),
        }
    }

    pub fn into_bytes(self) -> Bytes {
        match self {
            BodyContent::Bytes(bytes) => bytes,
            BodyContent::Text(text) => Bytes::from(text),
        }
    }

    pub fn into_text(self) -> Option<String> {
        match self {
            BodyContent::Text(text) => Some(text),
            BodyContent::Bytes(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_names() {
        assert_eq!("utf8".parse::<TextEncoding>().unwrap(), TextEncoding::Utf8);
        assert_eq!("UTF-8".parse::<TextEncoding>().unwrap(), TextEncoding::Utf8);
        assert_eq!("binary".parse::<TextEncoding>().unwrap(), TextEncoding::Latin1);
        assert_eq!("ucs2".parse::<TextEncoding>().unwrap(), TextEncoding::Utf16Le);
        assert_eq!("Base64".parse::<TextEncoding>().unwrap(), TextEncoding::Base64);

        let error = "ebcdic".parse::<TextEncoding>().unwrap_err();
        assert!(matches!(error, ParseError::UnknownEncoding { ref name } if name == "ebcdic"));
    }

    #[test]
    fn decode_every_encoding() {
        let bytes = "héllo".as_bytes();

        assert_eq!(TextEncoding::Utf8.decode(bytes), "héllo");
        assert_eq!(TextEncoding::Latin1.decode(&[0x68, 0xe9]), "hé");
        assert_eq!(TextEncoding::Ascii.decode(&[0x68, 0xe9]), "hi");
        assert_eq!(TextEncoding::Hex.decode(b"\x00\xffab"), "00ff6162");
        assert_eq!(TextEncoding::Base64.decode(b"chill"), "Y2hpbGw=");
        assert_eq!(TextEncoding::Utf16Le.decode(&[0x68, 0x00, 0x69, 0x00, 0x21]), "hi");
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        assert_eq!(TextEncoding::Utf8.decode(&[0x61, 0xff, 0x62]), "a\u{fffd}b");
    }

    #[test]
    fn content_accessors() {
        let raw = BodyContent::new(Bytes::from_static("né".as_bytes()), None);
        assert_eq!(raw.len(), 3);
        assert_eq!(raw.clone().into_text(), None);

        let text = BodyContent::new(Bytes::from_static("né".as_bytes()), Some(TextEncoding::Utf8));
        assert_eq!(text.len(), 2);
        assert_eq!(text.clone().into_text().as_deref(), Some("né"));
        assert_eq!(text.into_bytes(), Bytes::from_static("né".as_bytes()));

        assert!(BodyContent::new(Bytes::new(), Some(TextEncoding::Hex)).is_empty());
    }
}
