//! Named schema nodes.
//!
//! Fields bind types to names and give access to the matching runtime value.
//! They never hold values themselves, so one compiled tree can serve
//! any number of concurrent encode and decode calls.

use core::fmt;
use std::sync::Arc;

use crate::{
    array::ArrayType,
    composite::{CompositeBuilder, CompositeType},
    serialize::EncodeError,
    size::SizeBound,
    ty::{Ident, Type},
    value::Value,
};

/// Leaf field of a primitive or string type.
#[derive(Clone, Debug)]
pub struct ScalarField {
    name: Ident,
    ty: Type,
}

impl ScalarField {
    /// # Panics
    ///
    /// Panics if `ty` is not a primitive or string type.
    pub fn new(name: Ident, ty: Type) -> Self {
        assert!(ty.is_scalar(), "scalar field `{name}` declared with type `{ty}`");
        ScalarField { name, ty }
    }

    #[inline]
    pub fn name(&self) -> &Ident {
        &self.name
    }

    #[inline]
    pub fn ty(&self) -> &Type {
        &self.ty
    }
}

/// Field holding a sequence of elements.
#[derive(Clone, Debug)]
pub struct ArrayField {
    name: Ident,
    ty: Type,
}

impl ArrayField {
    pub fn new(name: Ident, array: ArrayType) -> Self {
        ArrayField {
            name,
            ty: Type::Array(Arc::new(array)),
        }
    }

    #[inline]
    pub fn name(&self) -> &Ident {
        &self.name
    }

    pub fn array_type(&self) -> &ArrayType {
        match &self.ty {
            Type::Array(array) => array,
            _ => unreachable!("array field always has array type"),
        }
    }

    /// Number of elements in the field's value.
    pub fn element_count(&self, value: &Value) -> Result<usize, EncodeError> {
        self.array_type()
            .elements(value)
            .map(<[Value]>::len)
            .map_err(|err| err.in_field(&self.name))
    }
}

/// Field with ordered child fields.
///
/// Built through [`CompositeFieldBuilder`] and immutable afterwards.
#[derive(Clone, Debug)]
pub struct CompositeField {
    name: Ident,
    fields: Vec<Field>,
    ty: Type,
}

impl CompositeField {
    #[inline]
    pub fn name(&self) -> &Ident {
        &self.name
    }

    #[inline]
    pub fn ty(&self) -> &Type {
        &self.ty
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn composite_type(&self) -> &Arc<CompositeType> {
        match &self.ty {
            Type::Composite(composite) => composite,
            _ => unreachable!("composite field always has composite type"),
        }
    }

    /// Returns direct child field by name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.name().as_str() == name)
    }

    /// Looks up a nested field by dotted path, e.g. `pet.name`.
    pub fn lookup(&self, path: &str) -> Option<&Field> {
        let mut segments = path.split('.');
        let mut field = self.field(segments.next()?)?;

        for segment in segments {
            match field {
                Field::Composite(composite) => field = composite.field(segment)?,
                _ => return None,
            }
        }
        Some(field)
    }
}

/// Writes the field tree in schema syntax.
impl fmt::Display for CompositeField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{\n")?;
        self.composite_type().write_members(f, Some(1))?;
        f.write_str("}")
    }
}

/// In-progress composite field.
///
/// Children and the composite type grow in lock-step,
/// one [`add_field`](CompositeFieldBuilder::add_field) at a time.
#[derive(Debug, Default)]
pub struct CompositeFieldBuilder {
    fields: Vec<Field>,
    ty: CompositeBuilder,
}

impl CompositeFieldBuilder {
    #[inline]
    pub fn new() -> Self {
        CompositeFieldBuilder {
            fields: Vec::new(),
            ty: CompositeBuilder::new(),
        }
    }

    pub fn add_field(&mut self, field: Field) {
        self.ty.push(field.name().clone(), field.ty().clone());
        self.fields.push(field);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.ty.contains(name)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Size of the fields added so far.
    #[inline]
    pub fn size(&self) -> SizeBound {
        self.ty.size()
    }

    /// Freezes into a named field.
    pub fn finish(self, name: Ident) -> CompositeField {
        CompositeField {
            name,
            fields: self.fields,
            ty: Type::composite(self.ty.finish()),
        }
    }

    /// Freezes into a bare type, dropping child fields.
    /// Used when the composite becomes an array element.
    pub fn finish_type(self) -> Type {
        Type::composite(self.ty.finish())
    }
}

/// Schema tree node.
#[derive(Clone, Debug)]
pub enum Field {
    Scalar(ScalarField),
    Array(ArrayField),
    Composite(CompositeField),
}

impl Field {
    pub fn name(&self) -> &Ident {
        match self {
            Field::Scalar(field) => &field.name,
            Field::Array(field) => &field.name,
            Field::Composite(field) => &field.name,
        }
    }

    pub fn ty(&self) -> &Type {
        match self {
            Field::Scalar(field) => &field.ty,
            Field::Array(field) => &field.ty,
            Field::Composite(field) => &field.ty,
        }
    }
}

impl From<ScalarField> for Field {
    fn from(field: ScalarField) -> Self {
        Field::Scalar(field)
    }
}

impl From<ArrayField> for Field {
    fn from(field: ArrayField) -> Self {
        Field::Array(field)
    }
}

impl From<CompositeField> for Field {
    fn from(field: CompositeField) -> Self {
        Field::Composite(field)
    }
}
