use core::{
    fmt,
    ops::{Add, AddAssign, Mul},
};

/// Statically known encoded size of a type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SizeBound {
    /// Encoded size depends on the value.
    Unbounded,

    /// Every value of the type encodes to exactly this many bytes.
    Exact(usize),
}

impl SizeBound {
    pub const ZERO: SizeBound = SizeBound::Exact(0);

    /// Sum of two bounds.
    /// Returns `None` if both are exact and the sum overflows `usize`.
    pub const fn checked_add(self, rhs: SizeBound) -> Option<SizeBound> {
        match (self, rhs) {
            (SizeBound::Exact(s), SizeBound::Exact(r)) => match s.checked_add(r) {
                Some(size) => Some(SizeBound::Exact(size)),
                None => None,
            },
            _ => Some(SizeBound::Unbounded),
        }
    }

    /// Returns `None` if the bound is exact and the product overflows `usize`.
    pub const fn checked_mul(self, rhs: usize) -> Option<SizeBound> {
        match self {
            SizeBound::Unbounded => Some(SizeBound::Unbounded),
            SizeBound::Exact(size) => match size.checked_mul(rhs) {
                Some(size) => Some(SizeBound::Exact(size)),
                None => None,
            },
        }
    }

    /// Sizes that do not fit into `usize` become `Unbounded`.
    pub const fn add(self, rhs: SizeBound) -> SizeBound {
        match self.checked_add(rhs) {
            Some(size) => size,
            None => SizeBound::Unbounded,
        }
    }

    /// Sizes that do not fit into `usize` become `Unbounded`.
    pub const fn mul(self, rhs: usize) -> SizeBound {
        match self.checked_mul(rhs) {
            Some(size) => size,
            None => SizeBound::Unbounded,
        }
    }

    /// Returns exact size if known.
    #[inline]
    pub const fn exact(self) -> Option<usize> {
        match self {
            SizeBound::Exact(size) => Some(size),
            SizeBound::Unbounded => None,
        }
    }

    #[inline]
    pub const fn is_exact(self) -> bool {
        matches!(self, SizeBound::Exact(_))
    }
}

impl Default for SizeBound {
    #[inline]
    fn default() -> Self {
        SizeBound::ZERO
    }
}

impl Add<SizeBound> for SizeBound {
    type Output = SizeBound;

    #[inline]
    fn add(self, rhs: SizeBound) -> SizeBound {
        SizeBound::add(self, rhs)
    }
}

impl AddAssign<SizeBound> for SizeBound {
    #[inline]
    fn add_assign(&mut self, rhs: SizeBound) {
        *self = SizeBound::add(*self, rhs);
    }
}

impl Mul<usize> for SizeBound {
    type Output = SizeBound;

    #[inline]
    fn mul(self, rhs: usize) -> SizeBound {
        SizeBound::mul(self, rhs)
    }
}

impl fmt::Display for SizeBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SizeBound::Exact(size) => write!(f, "{size} bytes"),
            SizeBound::Unbounded => f.write_str("variable"),
        }
    }
}
