use core::fmt::{self, Write as _};

use hashbrown::{hash_map::Entry, HashMap};

use crate::{
    deserialize::{DecodeError, Deserialize, Deserializer},
    serialize::{cold_err, EncodeError, Serialize, Serializer},
    size::SizeBound,
    ty::{Ident, Type},
    value::{Record, Value},
};

/// Composite member: a type bound to a field name.
#[derive(Clone, Debug)]
pub struct NamedType {
    pub name: Ident,
    pub ty: Type,
}

/// Record type with ordered named members.
///
/// Member order is the wire order.
/// Size and descriptor are computed once when the type is built.
#[derive(Clone, Debug)]
pub struct CompositeType {
    members: Vec<NamedType>,
    size: SizeBound,
    descriptor: Box<str>,
}

/// Groups types by structural equality, in order of first appearance.
fn group_types<'a>(members: impl Iterator<Item = &'a Type>) -> Vec<(&'a Type, usize)> {
    let mut index: HashMap<&Type, usize> = HashMap::new();
    let mut groups: Vec<(&Type, usize)> = Vec::new();

    for ty in members {
        match index.entry(ty) {
            Entry::Occupied(entry) => groups[*entry.get()].1 += 1,
            Entry::Vacant(entry) => {
                entry.insert(groups.len());
                groups.push((ty, 1));
            }
        }
    }
    groups
}

impl CompositeType {
    pub fn empty() -> Self {
        CompositeBuilder::new().finish()
    }

    #[inline]
    pub fn members(&self) -> &[NamedType] {
        &self.members
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Type> {
        self.members
            .iter()
            .find(|member| &*member.name == name)
            .map(|member| &member.ty)
    }

    #[inline]
    pub fn size(&self) -> SizeBound {
        self.size
    }

    /// Descriptor built from the multiset of member types,
    /// e.g. `int32_2:string_1`. Member names do not participate.
    #[inline]
    pub fn descriptor(&self) -> &str {
        &self.descriptor
    }

    /// Member types grouped by structural equality with their counts,
    /// in order of first appearance.
    pub fn type_map(&self) -> Vec<(&Type, usize)> {
        group_types(self.members.iter().map(|member| &member.ty))
    }

    /// Compares member names, order and layouts.
    pub fn same_layout(&self, other: &CompositeType) -> bool {
        self.members.len() == other.members.len()
            && self
                .members
                .iter()
                .zip(&other.members)
                .all(|(a, b)| a.name == b.name && a.ty.same_layout(&b.ty))
    }

    fn record<'a>(&self, value: &'a Value) -> Result<&'a Record, EncodeError> {
        match value {
            Value::Record(record) => Ok(record),
            other => cold_err(EncodeError::type_mismatch("record", other)),
        }
    }

    /// Writes members in schema syntax.
    /// With `indent` set, each member goes on its own line.
    pub fn write_members(&self, out: &mut dyn fmt::Write, indent: Option<usize>) -> fmt::Result {
        for member in &self.members {
            match indent {
                Some(depth) => write_indent(out, depth)?,
                None => out.write_char(' ')?,
            }
            write_type_head(&member.ty, out, indent)?;
            write!(out, " {};", member.name)?;
            if indent.is_some() {
                out.write_char('\n')?;
            }
        }
        Ok(())
    }

    pub(crate) fn fmt_inline(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_char('{')?;
        self.write_members(f, None)?;
        f.write_str(" }")
    }
}

fn write_indent(out: &mut dyn fmt::Write, depth: usize) -> fmt::Result {
    for _ in 0..depth {
        out.write_str("    ")?;
    }
    Ok(())
}

/// Writes everything of a member declaration that precedes its name.
fn write_type_head(ty: &Type, out: &mut dyn fmt::Write, indent: Option<usize>) -> fmt::Result {
    match ty {
        Type::Primitive(kind) => out.write_str(kind.keyword()),
        Type::String => out.write_str(Type::STRING_KEYWORD),
        Type::Composite(composite) => match indent {
            Some(depth) => {
                out.write_str("{\n")?;
                composite.write_members(out, Some(depth + 1))?;
                write_indent(out, depth)?;
                out.write_char('}')
            }
            None => {
                out.write_char('{')?;
                composite.write_members(out, None)?;
                out.write_str(" }")
            }
        },
        Type::Array(array) => {
            write_type_head(array.element(), out, indent)?;
            write!(out, "[{}]", array.len())
        }
    }
}

impl PartialEq for CompositeType {
    fn eq(&self, other: &CompositeType) -> bool {
        self.descriptor == other.descriptor
    }
}

impl Eq for CompositeType {}

impl Serialize for CompositeType {
    fn serialize(&self, value: &Value, serializer: &mut Serializer<'_>) -> Result<(), EncodeError> {
        let record = self.record(value)?;

        for member in &self.members {
            let field = record
                .get(member.name.as_str())
                .ok_or_else(|| EncodeError::missing_field(&member.name))?;

            member
                .ty
                .serialize(field, serializer)
                .map_err(|err| err.in_field(&member.name))?;
        }

        if log::log_enabled!(log::Level::Trace) {
            for key in record.keys().filter(|key| self.get(key).is_none()) {
                log::trace!("ignoring undeclared field `{key}`");
            }
        }
        Ok(())
    }

    fn encoded_size(&self, value: &Value) -> Result<usize, EncodeError> {
        if let SizeBound::Exact(size) = self.size {
            return Ok(size);
        }

        let record = self.record(value)?;
        let mut size = 0;

        for member in &self.members {
            let field = record
                .get(member.name.as_str())
                .ok_or_else(|| EncodeError::missing_field(&member.name))?;

            size += member
                .ty
                .encoded_size(field)
                .map_err(|err| err.in_field(&member.name))?;
        }
        Ok(size)
    }
}

impl Deserialize for CompositeType {
    fn deserialize(&self, deserializer: &mut Deserializer<'_>) -> Result<Value, DecodeError> {
        let mut record = Record::new();

        for member in &self.members {
            let field = member
                .ty
                .deserialize(deserializer)
                .map_err(|err| err.in_field(&member.name))?;

            record.insert(member.name.to_string(), field);
        }
        Ok(Value::Record(record))
    }
}

/// Accumulates composite members in declaration order.
#[derive(Clone, Debug, Default)]
pub struct CompositeBuilder {
    members: Vec<NamedType>,
    size: SizeBound,
}

impl CompositeBuilder {
    #[inline]
    pub fn new() -> Self {
        CompositeBuilder {
            members: Vec::new(),
            size: SizeBound::ZERO,
        }
    }

    #[inline]
    pub fn push(&mut self, name: Ident, ty: Type) {
        self.size += ty.size();
        self.members.push(NamedType { name, ty });
    }

    /// Size of the members pushed so far.
    #[inline]
    pub fn size(&self) -> SizeBound {
        self.size
    }

    pub fn contains(&self, name: &str) -> bool {
        self.members.iter().any(|member| &*member.name == name)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Freezes members, computing size and descriptor.
    pub fn finish(self) -> CompositeType {
        let mut tokens: Vec<String> = group_types(self.members.iter().map(|member| &member.ty))
            .into_iter()
            .map(|(ty, count)| {
                let mut token = String::new();
                ty.write_descriptor(&mut token);
                token.push('_');
                token.push_str(&count.to_string());
                token
            })
            .collect();
        tokens.sort_unstable();

        CompositeType {
            members: self.members,
            size: self.size,
            descriptor: tokens.join(":").into_boxed_str(),
        }
    }
}

impl FromIterator<(Ident, Type)> for CompositeBuilder {
    fn from_iter<I: IntoIterator<Item = (Ident, Type)>>(iter: I) -> Self {
        let mut builder = CompositeBuilder::new();
        for (name, ty) in iter {
            builder.push(name, ty);
        }
        builder
    }
}
