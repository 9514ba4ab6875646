//! Protopack compiles compact C-style schemas
//! and encodes values into little-endian binary payloads.
//!
//! ```
//! use protopack::{Schema, Value};
//!
//! let schema = Schema::compile("{ {int32 id;}[] items; }").unwrap();
//!
//! let value = Value::record([(
//!     "items",
//!     Value::list([Value::record([("id", 1)]), Value::record([("id", 2)])]),
//! )]);
//!
//! let bytes = schema.encode(&value).unwrap();
//! assert_eq!(protopack::to_hex(&bytes), "02000100000002000000");
//! assert_eq!(schema.decode(&bytes).unwrap(), value);
//! ```
//!
//! Values are plain trees of [`Value`]s and never stored in the schema,
//! so one compiled [`Schema`] can be shared between threads.

#![forbid(unsafe_code)]

mod error;
mod format;

#[cfg(test)]
mod tests;

use core::{fmt, str::FromStr};
use std::sync::Arc;

pub use protopack_core::{
    deserialize, deserialize_prefix, serialize_to_vec, ArrayField, ArrayLen, ArrayType,
    CompositeBuilder, CompositeField, CompositeFieldBuilder, CompositeType, DecodeError,
    DecodeErrorKind, Deserialize, Deserializer, Descriptor, DescriptorsCache, EncodeError,
    EncodeErrorKind, Field, FieldPath, Ident, NamedType, PathSegment, PrimitiveKind, Record,
    ScalarField, Serialize, Serializer, SizeBound, Type, Value, LEN_PREFIX_SIZE,
    MAX_PREFIXED_LEN,
};
pub use protopack_parse::{SyntaxError, SyntaxErrorKind, ROOT_NAME};

pub use crate::{
    error::Error,
    format::{from_hex, to_hex, FormatError, FormatErrorKind},
};

cfg_if::cfg_if! {
    if #[cfg(feature = "global-cache")] {
        pub use protopack_core::cached_descriptor;
    }
}

/// Compiled schema.
///
/// Cheap to clone, immutable and shareable between threads.
#[derive(Clone, Debug)]
pub struct Schema {
    root: Arc<CompositeField>,
}

impl Schema {
    /// Compiles schema text.
    ///
    /// # Errors
    ///
    /// Returns `SyntaxError` pointing at the first malformed token.
    pub fn compile(source: &str) -> Result<Self, SyntaxError> {
        let root = protopack_parse::parse(source)?;
        Ok(Schema::from_root(root))
    }

    /// Wraps a field tree built without the parser.
    pub fn from_root(root: CompositeField) -> Self {
        Schema {
            root: Arc::new(root),
        }
    }

    #[inline]
    pub fn root(&self) -> &CompositeField {
        &self.root
    }

    /// Composite type of the root record.
    #[inline]
    pub fn ty(&self) -> &CompositeType {
        self.root.composite_type()
    }

    /// Encoded size when every field is fixed-size.
    #[inline]
    pub fn size(&self) -> SizeBound {
        self.ty().size()
    }

    #[inline]
    pub fn descriptor(&self) -> &str {
        self.ty().descriptor()
    }

    /// Looks up a field by dotted path, e.g. `pet.name`.
    pub fn field(&self, path: &str) -> Option<&Field> {
        self.root.lookup(path)
    }

    /// Encodes a record into a new byte vector.
    ///
    /// # Errors
    ///
    /// Returns `EncodeError` if `value` does not conform to the schema.
    pub fn encode(&self, value: &Value) -> Result<Vec<u8>, EncodeError> {
        let mut output = Vec::new();
        self.encode_into(value, &mut output)?;
        Ok(output)
    }

    /// Appends encoding of a record to `output`.
    /// Returns the number of bytes written.
    ///
    /// On error `output` is truncated back to its original length.
    pub fn encode_into(&self, value: &Value, output: &mut Vec<u8>) -> Result<usize, EncodeError> {
        let size = serialize_to_vec(self.ty(), value, output)?;
        log::debug!("encoded {size} bytes");
        Ok(size)
    }

    /// Returns the number of bytes [`encode`](Schema::encode) would produce.
    pub fn encoded_size(&self, value: &Value) -> Result<usize, EncodeError> {
        self.ty().encoded_size(value)
    }

    /// Decodes a record that spans all of `bytes`.
    ///
    /// # Errors
    ///
    /// Returns `DecodeError` if `bytes` are truncated, malformed
    /// or continue after the record.
    pub fn decode(&self, bytes: &[u8]) -> Result<Value, DecodeError> {
        let value = deserialize(self.ty(), bytes)?;
        log::debug!("decoded {} bytes", bytes.len());
        Ok(value)
    }

    /// Decodes a record from the start of `bytes`.
    /// Returns the record and the number of bytes it occupied.
    pub fn decode_prefix(&self, bytes: &[u8]) -> Result<(Value, usize), DecodeError> {
        let (value, consumed) = deserialize_prefix(self.ty(), bytes)?;
        log::debug!("decoded {consumed} of {} bytes", bytes.len());
        Ok((value, consumed))
    }

    /// Encodes a record straight into hex text.
    pub fn dumps(&self, value: &Value) -> Result<String, EncodeError> {
        self.encode(value).map(|bytes| to_hex(&bytes))
    }

    /// Decodes a record from hex text.
    pub fn loads(&self, text: &str) -> Result<Value, Error> {
        let bytes = from_hex(text)?;
        Ok(self.decode(&bytes)?)
    }
}

impl FromStr for Schema {
    type Err = SyntaxError;

    #[inline]
    fn from_str(source: &str) -> Result<Self, SyntaxError> {
        Schema::compile(source)
    }
}

/// Prints canonical schema text that compiles back to the same layout.
impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&*self.root, f)
    }
}

/// Compiles schema text.
#[inline]
pub fn compile(source: &str) -> Result<Schema, SyntaxError> {
    Schema::compile(source)
}

/// Encodes a record with the schema.
#[inline]
pub fn encode(schema: &Schema, value: &Value) -> Result<Vec<u8>, EncodeError> {
    schema.encode(value)
}

/// Decodes a record with the schema.
#[inline]
pub fn decode(schema: &Schema, bytes: &[u8]) -> Result<Value, DecodeError> {
    schema.decode(bytes)
}
