//! Hex text form of encoded payloads.
//!
//! Two lowercase digits per byte, high nibble first, no separators.

/// Reason hex text could not be decoded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum FormatErrorKind {
    #[error("odd number of hex digits")]
    OddLength,

    #[error("invalid hex digit {0:?}")]
    InvalidDigit(char),
}

/// Error produced by [`from_hex`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("invalid hex at offset {offset}: {kind}")]
pub struct FormatError {
    offset: usize,
    kind: FormatErrorKind,
}

impl FormatError {
    /// Byte offset into the hex text.
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    #[inline]
    pub fn kind(&self) -> FormatErrorKind {
        self.kind
    }
}

/// Formats bytes as lowercase hex.
pub fn to_hex(bytes: &[u8]) -> String {
    ::hex::encode(bytes)
}

/// Parses hex text into bytes. Digits may be upper- or lowercase.
pub fn from_hex(text: &str) -> Result<Vec<u8>, FormatError> {
    ::hex::decode(text).map_err(|err| match err {
        ::hex::FromHexError::InvalidHexCharacter { c, index } => {
            // Report the whole character when the offending byte starts a multi-byte one.
            let c = text
                .get(index..)
                .and_then(|rest| rest.chars().next())
                .unwrap_or(c);
            FormatError {
                offset: index,
                kind: FormatErrorKind::InvalidDigit(c),
            }
        }
        _ => FormatError {
            offset: text.len(),
            kind: FormatErrorKind::OddLength,
        },
    })
}
