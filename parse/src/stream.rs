use crate::error::{SyntaxError, SyntaxErrorKind};

#[inline]
#[cold]
pub(crate) fn cold_err<T>(e: SyntaxError) -> Result<T, SyntaxError> {
    Err(e)
}

/// Characters that separate tokens.
#[inline]
pub fn is_blank(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\r' | '\n')
}

/// A position-tracked reader over schema text.
///
/// Positions are byte offsets into the source,
/// counts passed to methods are in characters.
#[derive(Clone, Debug)]
pub struct ParseStream<'a> {
    source: &'a str,
    pos: usize,
}

impl<'a> ParseStream<'a> {
    pub fn new(source: &'a str) -> Self {
        ParseStream { source, pos: 0 }
    }

    /// Returns the current position in the stream.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn at_end(&self) -> bool {
        self.pos >= self.source.len()
    }

    #[inline]
    pub fn as_str(&self) -> &'a str {
        &self.source[self.pos..]
    }

    /// Text between `start` and the current position.
    #[inline]
    pub fn consumed_since(&self, start: usize) -> &'a str {
        &self.source[start..self.pos]
    }

    /// Builds an error positioned at the current offset.
    #[inline]
    pub fn error(&self, kind: SyntaxErrorKind) -> SyntaxError {
        SyntaxError::new(self.pos, kind)
    }

    /// Byte length of the next `count` characters,
    /// or `None` if fewer remain.
    fn byte_len(&self, count: usize) -> Option<usize> {
        if count == 0 {
            return Some(0);
        }
        self.as_str()
            .char_indices()
            .nth(count - 1)
            .map(|(idx, ch)| idx + ch.len_utf8())
    }

    /// Peeks at the next character in the stream without consuming it.
    #[inline]
    pub fn peek(&self) -> Option<char> {
        self.as_str().chars().next()
    }

    /// Peeks at the next `count` characters.
    pub fn peek_n(&self, count: usize) -> Option<&'a str> {
        let len = self.byte_len(count)?;
        Some(&self.as_str()[..len])
    }

    /// Moves forward by `count` characters, stopping at the end.
    pub fn advance(&mut self, count: usize) {
        match self.byte_len(count) {
            Some(len) => self.pos += len,
            None => self.pos = self.source.len(),
        }
    }

    /// Moves back by `count` characters, stopping at the start.
    pub fn rewind(&mut self, count: usize) {
        if count == 0 {
            return;
        }
        self.pos = self.source[..self.pos]
            .char_indices()
            .rev()
            .nth(count - 1)
            .map_or(0, |(idx, _)| idx);
    }

    /// Consumes the next character.
    ///
    /// # Errors
    ///
    /// Fails at end of input, reporting `expected`.
    pub fn read(&mut self, expected: &'static str) -> Result<char, SyntaxError> {
        match self.peek() {
            Some(ch) => {
                self.pos += ch.len_utf8();
                Ok(ch)
            }
            None => cold_err(self.error(SyntaxErrorKind::UnexpectedEndOfInput { expected })),
        }
    }

    /// Consumes the next `count` characters.
    ///
    /// # Errors
    ///
    /// Fails if fewer than `count` characters remain. Nothing is consumed then.
    pub fn read_n(&mut self, count: usize, expected: &'static str) -> Result<&'a str, SyntaxError> {
        match self.peek_n(count) {
            Some(s) => {
                self.pos += s.len();
                Ok(s)
            }
            None => cold_err(SyntaxError::new(
                self.source.len(),
                SyntaxErrorKind::UnexpectedEndOfInput { expected },
            )),
        }
    }

    /// Advances the stream past any blank characters.
    pub fn skip_blank(&mut self) {
        let s = self.as_str();
        match s.find(|ch: char| !is_blank(ch)) {
            Some(len) => self.pos += len,
            None => self.pos = self.source.len(),
        }
    }

    /// Skips blanks and consumes the first character after them.
    pub fn skip_blank_and_read(&mut self, expected: &'static str) -> Result<char, SyntaxError> {
        self.skip_blank();
        self.read(expected)
    }

    /// Reads a C-style identifier terminated by `;`.
    ///
    /// Leading blanks and blanks before `;` are skipped.
    /// The terminator is consumed and not part of the result.
    pub fn read_identifier(&mut self) -> Result<&'a str, SyntaxError> {
        self.skip_blank();
        let start = self.pos;

        match self.peek() {
            Some(ch) if ch.is_ascii_alphabetic() || ch == '_' => self.pos += 1,
            Some(found) => {
                return cold_err(self.error(SyntaxErrorKind::UnexpectedCharacter {
                    found,
                    expected: "identifier",
                }))
            }
            None => {
                return cold_err(self.error(SyntaxErrorKind::UnexpectedEndOfInput {
                    expected: "identifier",
                }))
            }
        }

        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                self.pos += 1;
            } else {
                break;
            }
        }
        let ident = &self.source[start..self.pos];

        match self.skip_blank_and_read("`;`") {
            Ok(';') => Ok(ident),
            Ok(found) => {
                self.rewind(1);
                cold_err(self.error(SyntaxErrorKind::UnexpectedCharacter {
                    found,
                    expected: "`;`",
                }))
            }
            Err(err) => Err(err),
        }
    }

    /// Reads a run of decimal digits.
    /// Returns `None` if the stream is not at a digit.
    pub fn read_unsigned_int(&mut self) -> Result<Option<usize>, SyntaxError> {
        let start = self.pos;
        let mut value: Option<usize> = None;

        while let Some(digit) = self.peek().and_then(|ch| ch.to_digit(10)) {
            let acc = value.unwrap_or(0);
            match acc
                .checked_mul(10)
                .and_then(|acc| acc.checked_add(digit as usize))
            {
                Some(acc) => value = Some(acc),
                None => {
                    return cold_err(SyntaxError::new(start, SyntaxErrorKind::ArraySizeOverflow))
                }
            }
            self.pos += 1;
        }
        Ok(value)
    }
}
