//! Byte decoding for submitted files

use std::fmt;
use tracing::debug;

/// Encoding a submission was decoded with
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Encoding {
    Utf8,
    Latin1,
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Encoding::Utf8 => write!(f, "utf-8"),
            Encoding::Latin1 => write!(f, "latin-1"),
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Could not determine encoding of FILE.")]
    UndeterminedEncoding,
}

/// Turns submitted bytes into text
pub trait Decoder: Send + Sync + fmt::Debug {
    fn decode(&self, bytes: &[u8]) -> Result<(String, Encoding), DecodeError>;
}

/// UTF-8 with the byte order mark removed, falling back to Latin-1
#[derive(Debug, Clone, Copy, Default)]
pub struct DetectingDecoder;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

impl Decoder for DetectingDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<(String, Encoding), DecodeError> {
        let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
        if let Ok(text) = std::str::from_utf8(bytes) {
            return Ok((text.to_string(), Encoding::Utf8));
        }

        if bytes.iter().any(|&byte| is_control(byte)) {
            debug!("Bytes are neither UTF-8 nor printable Latin-1");
            return Err(DecodeError::UndeterminedEncoding);
        }
        let text = bytes.iter().map(|&byte| char::from(byte)).collect();
        Ok((text, Encoding::Latin1))
    }
}

/// C0 and C1 control bytes other than line breaks and tabs
fn is_control(byte: u8) -> bool {
    match byte {
        b'\n' | b'\r' | b'\t' => false,
        0x00..=0x1F | 0x7F..=0x9F => true,
        _ => false,
    }
}
