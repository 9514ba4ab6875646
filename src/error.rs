use protopack_core::{DecodeError, EncodeError};
use protopack_parse::SyntaxError;

use crate::format::FormatError;

/// Any error protopack can produce.
///
/// Each stage has its own error type,
/// this one lets callers chain stages with `?`.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Format(#[from] FormatError),
}
