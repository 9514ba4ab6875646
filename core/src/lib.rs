//! Type system and binary codec of protopack.
//!
//! A [`Type`] describes an encodable shape, a [`Value`] is a runtime value
//! of that shape. [`Serialize`] and [`Deserialize`] convert between values
//! and their compact little-endian encoding.
//!
//! Schemas are usually compiled from text by `protopack-parse`,
//! but every node can be constructed directly as well.

#![forbid(unsafe_code)]

mod array;
mod composite;
mod descriptor;
mod deserialize;
mod field;
mod path;
mod primitive;
mod serialize;
mod size;
mod string;
mod ty;
mod value;

#[cfg(test)]
mod tests;

pub use crate::{
    array::{ArrayLen, ArrayType},
    composite::{CompositeBuilder, CompositeType, NamedType},
    descriptor::{Descriptor, DescriptorsCache},
    deserialize::{
        deserialize, deserialize_prefix, DecodeError, DecodeErrorKind, Deserialize, Deserializer,
    },
    field::{ArrayField, CompositeField, CompositeFieldBuilder, Field, ScalarField},
    path::{FieldPath, PathSegment},
    serialize::{
        serialize_to_vec, EncodeError, EncodeErrorKind, Serialize, Serializer, LEN_PREFIX_SIZE,
        MAX_PREFIXED_LEN,
    },
    size::SizeBound,
    ty::{Ident, PrimitiveKind, Type},
    value::{Record, Value},
};

cfg_if::cfg_if! {
    if #[cfg(feature = "global-cache")] {
        pub use crate::descriptor::descriptor as cached_descriptor;
    }
}
