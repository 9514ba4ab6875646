//! Protopack schema parsing.
//!
//! This crate compiles C-style schema text into a `protopack-core` field tree.
//!
//! ```text
//! {
//!     int32 id;
//!     string name;
//!     { uint16 id; uint8 level; }[] skills;
//! }
//! ```

#![forbid(unsafe_code)]

mod error;
mod lex;
mod schema;
mod stream;


pub use crate::{
    error::{SyntaxError, SyntaxErrorKind},
    schema::{parse, ROOT_NAME},
    stream::{is_blank, ParseStream},
};
