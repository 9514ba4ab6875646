use core::fmt;

use crate::{
    deserialize::{DecodeError, Deserialize, Deserializer},
    serialize::{cold_err, EncodeError, EncodeErrorKind, Serialize, Serializer, LEN_PREFIX_SIZE},
    size::SizeBound,
    ty::Type,
    value::Value,
};

/// Element count of an array type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ArrayLen {
    /// Declared in the schema, not written to the wire.
    Fixed(usize),

    /// Carried in a 2-byte prefix before the elements.
    Variable,
}

impl ArrayLen {
    #[inline]
    pub const fn fixed(self) -> Option<usize> {
        match self {
            ArrayLen::Fixed(len) => Some(len),
            ArrayLen::Variable => None,
        }
    }
}

/// Prints the part between brackets of an array suffix.
impl fmt::Display for ArrayLen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArrayLen::Fixed(len) => write!(f, "{len}"),
            ArrayLen::Variable => Ok(()),
        }
    }
}

/// Sequence of elements of the same type.
#[derive(Clone, Debug, PartialEq)]
pub struct ArrayType {
    element: Type,
    len: ArrayLen,
    size: SizeBound,
}

impl ArrayType {
    pub fn new(element: Type, len: ArrayLen) -> Self {
        let size = match len {
            ArrayLen::Fixed(len) => element.size() * len,
            ArrayLen::Variable => SizeBound::Unbounded,
        };

        ArrayType { element, len, size }
    }

    #[inline]
    pub fn element(&self) -> &Type {
        &self.element
    }

    #[inline]
    pub fn len(&self) -> ArrayLen {
        self.len
    }

    #[inline]
    pub fn is_fixed_len(&self) -> bool {
        matches!(self.len, ArrayLen::Fixed(_))
    }

    #[inline]
    pub fn size(&self) -> SizeBound {
        self.size
    }

    /// Returns the elements of `value` checked against the declared length.
    pub fn elements<'a>(&self, value: &'a Value) -> Result<&'a [Value], EncodeError> {
        let elements = match value {
            Value::List(elements) => elements.as_slice(),
            other => return cold_err(EncodeError::type_mismatch("array", other)),
        };

        if let ArrayLen::Fixed(expected) = self.len {
            if elements.len() != expected {
                return cold_err(EncodeError::new(EncodeErrorKind::LengthMismatch {
                    expected,
                    found: elements.len(),
                }));
            }
        }
        Ok(elements)
    }
}

impl Serialize for ArrayType {
    fn serialize(&self, value: &Value, serializer: &mut Serializer<'_>) -> Result<(), EncodeError> {
        let elements = self.elements(value)?;

        if let ArrayLen::Variable = self.len {
            serializer.write_len(elements.len())?;
        }

        for (idx, element) in elements.iter().enumerate() {
            self.element
                .serialize(element, serializer)
                .map_err(|err| err.at_index(idx))?;
        }
        Ok(())
    }

    fn encoded_size(&self, value: &Value) -> Result<usize, EncodeError> {
        if let SizeBound::Exact(size) = self.size {
            return Ok(size);
        }

        let elements = self.elements(value)?;
        let mut size = match self.len {
            ArrayLen::Fixed(_) => 0,
            ArrayLen::Variable => LEN_PREFIX_SIZE,
        };

        for (idx, element) in elements.iter().enumerate() {
            size += self
                .element
                .encoded_size(element)
                .map_err(|err| err.at_index(idx))?;
        }
        Ok(size)
    }
}

impl Deserialize for ArrayType {
    fn deserialize(&self, deserializer: &mut Deserializer<'_>) -> Result<Value, DecodeError> {
        let len = match self.len {
            ArrayLen::Fixed(len) => len,
            ArrayLen::Variable => deserializer.read_len()?,
        };

        let mut elements = Vec::with_capacity(len.min(deserializer.remaining()));
        for idx in 0..len {
            let element = self
                .element
                .deserialize(deserializer)
                .map_err(|err| err.at_index(idx))?;
            elements.push(element);
        }
        Ok(Value::List(elements))
    }
}
