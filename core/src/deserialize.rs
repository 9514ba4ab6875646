use core::str::Utf8Error;

use crate::{
    path::{FieldPath, PathSegment},
    serialize::LEN_PREFIX_SIZE,
    ty::Ident,
    value::Value,
};

#[inline]
#[cold]
pub(crate) fn cold_err<T>(e: DecodeError) -> Result<T, DecodeError> {
    Err(e)
}

/// Reason bytes could not be decoded.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DecodeErrorKind {
    /// Indicates that input buffer is smaller than
    /// expected value length.
    #[error("need {needed} more bytes, only {remaining} remain")]
    OutOfBounds { needed: usize, remaining: usize },

    /// Bytes slice is not UTF8 where string is expected.
    #[error("string is not valid UTF-8: {0}")]
    NonUtf8(Utf8Error),

    /// Input continues after the root value.
    #[error("{remaining} trailing bytes after the value")]
    TrailingBytes { remaining: usize },
}

/// Error that can occur during deserialization.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("cannot decode `{path}` at byte {offset}: {kind}")]
pub struct DecodeError {
    offset: usize,
    path: FieldPath,
    kind: DecodeErrorKind,
}

impl DecodeError {
    #[inline]
    pub fn new(offset: usize, kind: DecodeErrorKind) -> Self {
        DecodeError {
            offset,
            path: FieldPath::root(),
            kind,
        }
    }

    /// Byte offset at which decoding failed.
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Path of the value being decoded.
    #[inline]
    pub fn path(&self) -> &FieldPath {
        &self.path
    }

    #[inline]
    pub fn kind(&self) -> &DecodeErrorKind {
        &self.kind
    }

    #[inline]
    pub(crate) fn in_field(mut self, name: &Ident) -> Self {
        self.path.push_outer(PathSegment::Field(name.clone()));
        self
    }

    #[inline]
    pub(crate) fn at_index(mut self, index: usize) -> Self {
        self.path.push_outer(PathSegment::Index(index));
        self
    }
}

/// Decodes runtime values against a schema node.
pub trait Deserialize {
    /// Reads one value from the deserializer.
    ///
    /// # Errors
    ///
    /// Returns `DecodeError` if input is too short or malformed.
    fn deserialize(&self, deserializer: &mut Deserializer<'_>) -> Result<Value, DecodeError>;
}

/// Forward-only reader over encoded bytes.
#[must_use = "Deserializer should be used to deserialize values"]
pub struct Deserializer<'de> {
    input: &'de [u8],
    pos: usize,
}

impl<'de> Deserializer<'de> {
    #[inline]
    pub const fn new(input: &'de [u8]) -> Self {
        Deserializer { input, pos: 0 }
    }

    /// Offset of the next unread byte.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.input.len() - self.pos
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pos >= self.input.len()
    }

    /// Reads specified number of bytes from the input buffer.
    /// Advances the input buffer.
    ///
    /// # Errors
    ///
    /// Returns `DecodeError` if not enough bytes remain.
    #[inline]
    pub fn read_bytes(&mut self, len: usize) -> Result<&'de [u8], DecodeError> {
        if len > self.remaining() {
            return cold_err(DecodeError::new(
                self.pos,
                DecodeErrorKind::OutOfBounds {
                    needed: len,
                    remaining: self.remaining(),
                },
            ));
        }
        let bytes = &self.input[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    #[inline]
    pub fn read_byte(&mut self) -> Result<u8, DecodeError> {
        let [byte] = self.read_byte_array::<1>()?;
        Ok(byte)
    }

    #[inline]
    pub fn read_byte_array<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let bytes = self.read_bytes(N)?;
        let mut array = [0; N];
        array.copy_from_slice(bytes);
        Ok(array)
    }

    /// Reads 2-byte little-endian length prefix.
    #[inline]
    pub fn read_len(&mut self) -> Result<usize, DecodeError> {
        let bytes = self.read_byte_array::<LEN_PREFIX_SIZE>()?;
        Ok(usize::from(u16::from_le_bytes(bytes)))
    }

    /// Fails if any input is left unread.
    pub fn finish(self) -> Result<usize, DecodeError> {
        if !self.is_empty() {
            return cold_err(DecodeError::new(
                self.pos,
                DecodeErrorKind::TrailingBytes {
                    remaining: self.remaining(),
                },
            ));
        }
        Ok(self.pos)
    }
}

/// Deserializes a value that must span the whole input.
pub fn deserialize<T>(ty: &T, input: &[u8]) -> Result<Value, DecodeError>
where
    T: Deserialize + ?Sized,
{
    let mut deserializer = Deserializer::new(input);
    let value = ty.deserialize(&mut deserializer)?;
    deserializer.finish()?;
    Ok(value)
}

/// Deserializes a value from the start of the input.
/// Returns the value and the number of bytes consumed.
pub fn deserialize_prefix<T>(ty: &T, input: &[u8]) -> Result<(Value, usize), DecodeError>
where
    T: Deserialize + ?Sized,
{
    let mut deserializer = Deserializer::new(input);
    let value = ty.deserialize(&mut deserializer)?;
    Ok((value, deserializer.position()))
}
