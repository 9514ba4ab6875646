use core::{
    borrow::Borrow,
    fmt,
    hash::{Hash, Hasher},
    ops::Deref,
};
use std::sync::Arc;

use crate::{
    array::{ArrayLen, ArrayType},
    composite::CompositeType,
    deserialize::{DecodeError, Deserialize, Deserializer},
    serialize::{EncodeError, Serialize, Serializer},
    size::SizeBound,
    string,
    value::Value,
};

/// Field name.
///
/// Cheaply cloneable and shareable between threads.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Ident(Arc<str>);

impl Ident {
    pub fn new(name: &str) -> Self {
        Ident(Arc::from(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Deref for Ident {
    type Target = str;

    #[inline(always)]
    fn deref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Ident {
    #[inline(always)]
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Ident {
    #[inline(always)]
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Ident {
    #[inline]
    fn from(name: &str) -> Self {
        Ident::new(name)
    }
}

impl From<String> for Ident {
    #[inline]
    fn from(name: String) -> Self {
        Ident(Arc::from(name))
    }
}

impl fmt::Debug for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fixed-size primitive kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PrimitiveKind {
    Int8,
    Int16,
    Int32,
    UInt8,
    UInt16,
    UInt32,
    Float,
    Double,
    Bool,
}

impl PrimitiveKind {
    pub const ALL: [PrimitiveKind; 9] = [
        PrimitiveKind::Int8,
        PrimitiveKind::Int16,
        PrimitiveKind::Int32,
        PrimitiveKind::UInt8,
        PrimitiveKind::UInt16,
        PrimitiveKind::UInt32,
        PrimitiveKind::Float,
        PrimitiveKind::Double,
        PrimitiveKind::Bool,
    ];

    /// Encoded size in bytes.
    pub const fn size(self) -> usize {
        match self {
            PrimitiveKind::Int8 | PrimitiveKind::UInt8 | PrimitiveKind::Bool => 1,
            PrimitiveKind::Int16 | PrimitiveKind::UInt16 => 2,
            PrimitiveKind::Int32 | PrimitiveKind::UInt32 | PrimitiveKind::Float => 4,
            PrimitiveKind::Double => 8,
        }
    }

    /// Schema keyword of the kind.
    pub const fn keyword(self) -> &'static str {
        match self {
            PrimitiveKind::Int8 => "int8",
            PrimitiveKind::Int16 => "int16",
            PrimitiveKind::Int32 => "int32",
            PrimitiveKind::UInt8 => "uint8",
            PrimitiveKind::UInt16 => "uint16",
            PrimitiveKind::UInt32 => "uint32",
            PrimitiveKind::Float => "float",
            PrimitiveKind::Double => "double",
            PrimitiveKind::Bool => "bool",
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        PrimitiveKind::ALL
            .into_iter()
            .find(|kind| kind.keyword() == keyword)
    }

    pub const fn is_integer(self) -> bool {
        !matches!(
            self,
            PrimitiveKind::Float | PrimitiveKind::Double | PrimitiveKind::Bool
        )
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Encodable shape.
///
/// Equality and hashing are structural.
/// Composites compare by the multiset of their member types,
/// so field names and declaration order do not participate.
/// Use [`Type::same_layout`] to compare full wire layouts.
#[derive(Clone, Debug)]
pub enum Type {
    Primitive(PrimitiveKind),

    /// UTF-8 string with a 2-byte length prefix.
    String,

    Composite(Arc<CompositeType>),

    Array(Arc<ArrayType>),
}

impl Type {
    pub const STRING_KEYWORD: &'static str = "string";

    #[inline]
    pub fn array(element: Type, len: ArrayLen) -> Self {
        Type::Array(Arc::new(ArrayType::new(element, len)))
    }

    #[inline]
    pub fn composite(composite: CompositeType) -> Self {
        Type::Composite(Arc::new(composite))
    }

    /// Looks up a scalar type by its schema keyword.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        if keyword == Self::STRING_KEYWORD {
            return Some(Type::String);
        }
        PrimitiveKind::from_keyword(keyword).map(Type::Primitive)
    }

    pub fn size(&self) -> SizeBound {
        match self {
            Type::Primitive(kind) => SizeBound::Exact(kind.size()),
            Type::String => SizeBound::Unbounded,
            Type::Composite(composite) => composite.size(),
            Type::Array(array) => array.size(),
        }
    }

    #[inline]
    pub fn is_fixed_size(&self) -> bool {
        self.size().is_exact()
    }

    #[inline]
    pub fn is_scalar(&self) -> bool {
        matches!(self, Type::Primitive(_) | Type::String)
    }

    pub fn as_composite(&self) -> Option<&Arc<CompositeType>> {
        match self {
            Type::Composite(composite) => Some(composite),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Arc<ArrayType>> {
        match self {
            Type::Array(array) => Some(array),
            _ => None,
        }
    }

    /// Canonical descriptor string.
    ///
    /// Equal types always have equal descriptors.
    pub fn descriptor(&self) -> String {
        match self {
            Type::Composite(composite) => composite.descriptor().to_owned(),
            _ => {
                let mut out = String::new();
                self.write_descriptor(&mut out);
                out
            }
        }
    }

    /// Appends the descriptor as it appears inside another descriptor.
    /// Composites are wrapped in braces to keep the token unambiguous.
    pub(crate) fn write_descriptor(&self, out: &mut String) {
        match self {
            Type::Primitive(kind) => out.push_str(kind.keyword()),
            Type::String => out.push_str(Self::STRING_KEYWORD),
            Type::Composite(composite) => {
                out.push('{');
                out.push_str(composite.descriptor());
                out.push('}');
            }
            Type::Array(array) => {
                array.element().write_descriptor(out);
                match array.len() {
                    ArrayLen::Fixed(len) => {
                        out.push('[');
                        out.push_str(&len.to_string());
                        out.push(']');
                    }
                    ArrayLen::Variable => out.push_str("[]"),
                }
            }
        }
    }

    /// Returns `true` if both types have identical wire layout
    /// including member names and declaration order.
    pub fn same_layout(&self, other: &Type) -> bool {
        match (self, other) {
            (Type::Primitive(a), Type::Primitive(b)) => a == b,
            (Type::String, Type::String) => true,
            (Type::Composite(a), Type::Composite(b)) => a.same_layout(b),
            (Type::Array(a), Type::Array(b)) => {
                a.len() == b.len() && a.element().same_layout(b.element())
            }
            _ => false,
        }
    }
}

impl From<PrimitiveKind> for Type {
    #[inline]
    fn from(kind: PrimitiveKind) -> Self {
        Type::Primitive(kind)
    }
}

impl PartialEq for Type {
    fn eq(&self, other: &Type) -> bool {
        match (self, other) {
            (Type::Primitive(a), Type::Primitive(b)) => a == b,
            (Type::String, Type::String) => true,
            (Type::Composite(a), Type::Composite(b)) => {
                Arc::ptr_eq(a, b) || a.descriptor() == b.descriptor()
            }
            (Type::Array(a), Type::Array(b)) => Arc::ptr_eq(a, b) || **a == **b,
            _ => false,
        }
    }
}

impl Eq for Type {}

impl Hash for Type {
    fn hash<H: Hasher>(&self, state: &mut H) {
        core::mem::discriminant(self).hash(state);
        match self {
            Type::Primitive(kind) => kind.hash(state),
            Type::String => {}
            Type::Composite(composite) => composite.descriptor().hash(state),
            Type::Array(array) => {
                array.element().hash(state);
                array.len().hash(state);
            }
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Primitive(kind) => f.write_str(kind.keyword()),
            Type::String => f.write_str(Self::STRING_KEYWORD),
            Type::Composite(composite) => composite.fmt_inline(f),
            Type::Array(array) => write!(f, "{}[{}]", array.element(), array.len()),
        }
    }
}

impl Serialize for Type {
    fn serialize(&self, value: &Value, serializer: &mut Serializer<'_>) -> Result<(), EncodeError> {
        match self {
            Type::Primitive(kind) => kind.serialize(value, serializer),
            Type::String => string::serialize(value, serializer),
            Type::Composite(composite) => composite.serialize(value, serializer),
            Type::Array(array) => array.serialize(value, serializer),
        }
    }

    fn encoded_size(&self, value: &Value) -> Result<usize, EncodeError> {
        match self {
            Type::Primitive(kind) => kind.encoded_size(value),
            Type::String => string::encoded_size(value),
            Type::Composite(composite) => composite.encoded_size(value),
            Type::Array(array) => array.encoded_size(value),
        }
    }
}

impl Deserialize for Type {
    fn deserialize(&self, deserializer: &mut Deserializer<'_>) -> Result<Value, DecodeError> {
        match self {
            Type::Primitive(kind) => kind.deserialize(deserializer),
            Type::String => string::deserialize(deserializer),
            Type::Composite(composite) => composite.deserialize(deserializer),
            Type::Array(array) => array.deserialize(deserializer),
        }
    }
}
