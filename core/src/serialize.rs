use crate::{
    path::{FieldPath, PathSegment},
    ty::Ident,
    value::Value,
};

/// Size of the little-endian length prefix
/// written before strings and variable-length arrays.
pub const LEN_PREFIX_SIZE: usize = 2;

/// Largest length that fits into the length prefix.
pub const MAX_PREFIXED_LEN: usize = u16::MAX as usize;

#[inline]
#[cold]
pub(crate) fn cold_err<T>(e: EncodeError) -> Result<T, EncodeError> {
    Err(e)
}

/// Reason a value could not be encoded.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum EncodeErrorKind {
    /// Record lacks a declared field.
    #[error("missing field `{0}`")]
    MissingField(Ident),

    /// Sequence length differs from the fixed array length.
    #[error("expected {expected} elements, found {found}")]
    LengthMismatch { expected: usize, found: usize },

    /// Value kind cannot be coerced to the declared type.
    #[error("expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    /// Number does not fit into the declared primitive.
    #[error("{value} is out of range for {ty}")]
    OutOfRange { ty: &'static str, value: String },

    /// String or variable-length array does not fit the length prefix.
    #[error("length {len} exceeds the maximum of {max}")]
    TooLong { len: usize, max: usize },
}

/// Error that can occur during serialization.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
#[error("cannot encode `{path}`: {kind}")]
pub struct EncodeError {
    path: FieldPath,
    kind: EncodeErrorKind,
}

impl EncodeError {
    #[inline]
    pub fn new(kind: EncodeErrorKind) -> Self {
        EncodeError {
            path: FieldPath::root(),
            kind,
        }
    }

    pub(crate) fn missing_field(name: &Ident) -> Self {
        EncodeError::new(EncodeErrorKind::MissingField(name.clone())).in_field(name)
    }

    pub(crate) fn type_mismatch(expected: &'static str, found: &Value) -> Self {
        EncodeError::new(EncodeErrorKind::TypeMismatch {
            expected,
            found: found.kind_name(),
        })
    }

    /// Path of the offending value.
    #[inline]
    pub fn path(&self) -> &FieldPath {
        &self.path
    }

    #[inline]
    pub fn kind(&self) -> &EncodeErrorKind {
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

/// Encodes runtime values against a schema node.
pub trait Serialize {
    /// Appends encoding of `value` to the serializer.
    ///
    /// # Errors
    ///
    /// Returns `EncodeError` if `value` does not conform to the type.
    fn serialize(&self, value: &Value, serializer: &mut Serializer<'_>) -> Result<(), EncodeError>;

    /// Returns number of bytes `serialize` would write.
    ///
    /// Fixed-size types return their static size without inspecting `value`.
    fn encoded_size(&self, value: &Value) -> Result<usize, EncodeError>;
}

/// Byte sink used by [`Serialize`] implementations.
#[must_use = "Serializer should be used to serialize values"]
pub struct Serializer<'a> {
    output: &'a mut Vec<u8>,
    start: usize,
}

impl<'a> Serializer<'a> {
    #[inline]
    pub fn new(output: &'a mut Vec<u8>) -> Self {
        let start = output.len();
        Serializer { output, start }
    }

    #[inline]
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.output.extend_from_slice(bytes);
    }

    #[inline]
    pub fn write_byte(&mut self, byte: u8) {
        self.output.push(byte);
    }

    /// Writes 2-byte little-endian length prefix.
    ///
    /// # Errors
    ///
    /// Returns `EncodeError` if `len` does not fit into the prefix.
    #[inline]
    pub fn write_len(&mut self, len: usize) -> Result<(), EncodeError> {
        match u16::try_from(len) {
            Ok(len) => {
                self.write_bytes(&len.to_le_bytes());
                Ok(())
            }
            Err(_) => cold_err(EncodeError::new(EncodeErrorKind::TooLong {
                len,
                max: MAX_PREFIXED_LEN,
            })),
        }
    }

    /// Number of bytes written by this serializer so far.
    #[inline]
    pub fn written(&self) -> usize {
        self.output.len() - self.start
    }
}

/// Serialize value into byte vector.
/// Returns the number of bytes written.
///
/// Either the whole encoding is appended or `output` is left as it was.
pub fn serialize_to_vec<T>(ty: &T, value: &Value, output: &mut Vec<u8>) -> Result<usize, EncodeError>
where
    T: Serialize + ?Sized,
{
    let start = output.len();
    let mut serializer = Serializer::new(output);

    match ty.serialize(value, &mut serializer) {
        Ok(()) => Ok(serializer.written()),
        Err(err) => {
            output.truncate(start);
            Err(err)
        }
    }
}
