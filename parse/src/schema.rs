use protopack_core::{
    ArrayField, ArrayLen, ArrayType, CompositeField, CompositeFieldBuilder, Field, Ident,
    ScalarField, SizeBound, Type,
};

use crate::{
    error::{SyntaxError, SyntaxErrorKind},
    lex,
    stream::{cold_err, ParseStream},
};

/// Name of the composite that holds all top-level fields.
pub const ROOT_NAME: &str = "root";

/// Composite opened with `{` inside a block and not yet closed.
struct Nested {
    builder: CompositeFieldBuilder,
    open: usize,
}

/// Compiles schema text into the root composite field.
///
/// Every top-level block appends its fields to the same root,
/// so `{ int8 a; } { int8 b; }` is the same as `{ int8 a; int8 b; }`.
///
/// # Errors
///
/// Returns `SyntaxError` on the first malformed token.
/// No partial schema is produced.
pub fn parse(source: &str) -> Result<CompositeField, SyntaxError> {
    let mut stream = ParseStream::new(source);
    let mut root = CompositeFieldBuilder::new();
    let mut blocks = 0usize;

    loop {
        stream.skip_blank();
        let open = stream.position();

        match stream.peek() {
            None if blocks == 0 => {
                return cold_err(stream.error(SyntaxErrorKind::UnexpectedEndOfInput {
                    expected: "`{`",
                }))
            }
            None => break,
            Some('{') => stream.advance(1),
            Some(found) => {
                return cold_err(stream.error(SyntaxErrorKind::UnexpectedCharacter {
                    found,
                    expected: "`{`",
                }))
            }
        }

        parse_block(&mut stream, &mut root, open)?;
        blocks += 1;
    }

    let root = root.finish(Ident::new(ROOT_NAME));
    log::debug!(
        "compiled schema: {} blocks, {} fields, descriptor `{}`",
        blocks,
        root.fields().len(),
        root.composite_type().descriptor(),
    );
    Ok(root)
}

/// Parses fields of one top-level block up to its closing `}`.
/// The opening `{` at `open` is already consumed.
fn parse_block(
    stream: &mut ParseStream<'_>,
    root: &mut CompositeFieldBuilder,
    open: usize,
) -> Result<(), SyntaxError> {
    let mut stack: Vec<Nested> = Vec::new();

    loop {
        stream.skip_blank();
        let start = stream.position();

        let Some(ch) = stream.peek() else {
            let open = stack.last().map_or(open, |nested| nested.open);
            return cold_err(SyntaxError::new(open, SyntaxErrorKind::UnclosedBlock));
        };
        stream.advance(1);

        let field = match ch {
            '{' => {
                log::trace!("open nested composite at {start}");
                stack.push(Nested {
                    builder: CompositeFieldBuilder::new(),
                    open: start,
                });
                continue;
            }
            '}' => match stack.pop() {
                None => return Ok(()),
                Some(nested) => {
                    let len = lex::read_array_suffix(stream)?;
                    let name = read_name(stream)?;

                    match len {
                        Some(len) => array_field(name, nested.builder.finish_type(), len, start)?,
                        None => nested.builder.finish(name).into(),
                    }
                }
            },
            first => {
                let ty = lex::read_type(stream, first, start)?;
                let len = lex::read_array_suffix(stream)?;
                let name = read_name(stream)?;

                match len {
                    Some(len) => array_field(name, ty, len, start)?,
                    None => ScalarField::new(name, ty).into(),
                }
            }
        };

        let current = match stack.last_mut() {
            Some(nested) => &mut nested.builder,
            None => &mut *root,
        };
        add_field(current, field, start)?;
    }
}

fn read_name(stream: &mut ParseStream<'_>) -> Result<Ident, SyntaxError> {
    stream.read_identifier().map(Ident::new)
}

/// Wraps `element` into an array field.
///
/// A fixed-length array must have a size that fits into `usize`
/// and must not repeat zero-size elements, which decode from no input.
fn array_field(
    name: Ident,
    element: Type,
    len: ArrayLen,
    start: usize,
) -> Result<Field, SyntaxError> {
    if let ArrayLen::Fixed(count) = len {
        match element.size() {
            SizeBound::Exact(0) if count > 0 => {
                return cold_err(SyntaxError::new(start, SyntaxErrorKind::ZeroSizeArray))
            }
            size if size.checked_mul(count).is_none() => {
                return cold_err(SyntaxError::new(start, SyntaxErrorKind::SizeOverflow))
            }
            _ => {}
        }
    }
    Ok(ArrayField::new(name, ArrayType::new(element, len)).into())
}

fn add_field(
    builder: &mut CompositeFieldBuilder,
    field: Field,
    start: usize,
) -> Result<(), SyntaxError> {
    if builder.contains(field.name()) {
        return cold_err(SyntaxError::new(
            start,
            SyntaxErrorKind::DuplicateField {
                name: field.name().to_string(),
            },
        ));
    }

    if builder.size().checked_add(field.ty().size()).is_none() {
        return cold_err(SyntaxError::new(start, SyntaxErrorKind::SizeOverflow));
    }

    log::trace!("field `{}`: {}", field.name(), field.ty());
    builder.add_field(field);
    Ok(())
}
