/// Reason schema text could not be compiled.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SyntaxErrorKind {
    #[error("unexpected end of input, expected {expected}")]
    UnexpectedEndOfInput { expected: &'static str },

    #[error("unexpected character {found:?}, expected {expected}")]
    UnexpectedCharacter { found: char, expected: &'static str },

    /// Type keyword does not match any known type.
    #[error("unknown type `{found}`, expected `{expected}`")]
    UnknownType { expected: &'static str, found: String },

    #[error("array size is not closed with `]`")]
    UnclosedArraySize { found: Option<char> },

    #[error("array size is too large")]
    ArraySizeOverflow,

    /// Encoded size of a fixed-size type does not fit into `usize`.
    #[error("encoded size is too large")]
    SizeOverflow,

    /// Fixed-length array of elements that occupy no bytes.
    #[error("fixed-length array of zero-size elements")]
    ZeroSizeArray,

    /// Input ended inside a block.
    #[error("block is not closed with `}}`")]
    UnclosedBlock,

    #[error("field `{name}` is declared twice")]
    DuplicateField { name: String },
}

/// Error produced when compiling schema text.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("syntax error at offset {offset}: {kind}")]
pub struct SyntaxError {
    offset: usize,
    kind: SyntaxErrorKind,
}

impl SyntaxError {
    #[inline]
    pub fn new(offset: usize, kind: SyntaxErrorKind) -> Self {
        SyntaxError { offset, kind }
    }

    /// Byte offset into the source text.
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    #[inline]
    pub fn kind(&self) -> &SyntaxErrorKind {
        &self.kind
    }

    /// Converts the offset into 1-based line and column in `source`.
    /// Columns count characters.
    pub fn line_col(&self, source: &str) -> (usize, usize) {
        let offset = self.offset.min(source.len());
        let before = source.get(..offset).unwrap_or(source);

        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map_or(0, |idx| idx + 1);
        let column = before[line_start..].chars().count() + 1;
        (line, column)
    }
}
