use core::fmt;

use crate::ty::Ident;

/// One step from a record to one of its values.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PathSegment {
    Field(Ident),
    Index(usize),
}

/// Location of a value inside the root record, e.g. `pet.skill[1].id`.
///
/// Paths are built while an error travels outwards,
/// so segments are stored innermost first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldPath {
    rev: Vec<PathSegment>,
}

impl FieldPath {
    #[inline]
    pub const fn root() -> Self {
        FieldPath { rev: Vec::new() }
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.rev.is_empty()
    }

    /// Prepends a segment.
    #[inline]
    pub(crate) fn push_outer(&mut self, segment: PathSegment) {
        self.rev.push(segment);
    }

    /// Iterates segments from the root outwards.
    pub fn segments(&self) -> impl DoubleEndedIterator<Item = &PathSegment> + '_ {
        self.rev.iter().rev()
    }

    /// Returns the innermost field name, if any.
    pub fn last_field(&self) -> Option<&str> {
        self.rev.iter().find_map(|segment| match segment {
            PathSegment::Field(name) => Some(name.as_str()),
            PathSegment::Index(_) => None,
        })
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.rev.is_empty() {
            return f.write_str("<root>");
        }

        for (idx, segment) in self.segments().enumerate() {
            match segment {
                PathSegment::Field(name) if idx == 0 => f.write_str(name)?,
                PathSegment::Field(name) => write!(f, ".{name}")?,
                PathSegment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}
