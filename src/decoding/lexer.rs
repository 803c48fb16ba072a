use std::str;

use crate::state_tracker::{StateTracker, StructureError, Token};

/// A token reader over a buffer holding bencode.
///
/// The lexer guarantees that the tokens it hands out form a valid structure: ends are matched
/// to the container they close, dictionary keys are strings, and nesting stays within the
/// configured depth. The first error is reported once; after it (or after the input is
/// exhausted) the lexer only returns `None`.
#[derive(Debug)]
pub struct Lexer<'a> {
    source: &'a [u8],
    offset: usize,
    state: StateTracker,
    peeked: Option<Peeked<'a>>,
}

#[derive(Debug)]
struct Peeked<'a> {
    start: usize,
    item: Option<Result<Token<'a>, StructureError>>,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer from the given byte array
    pub fn new(buffer: &'a [u8]) -> Self {
        Lexer {
            source: buffer,
            offset: 0,
            state: StateTracker::new(),
            peeked: None,
        }
    }

    /// Set the maximum nesting depth of the lexer. The default is
    /// [`DEFAULT_MAX_DEPTH`](crate::DEFAULT_MAX_DEPTH).
    pub fn with_max_depth(mut self, new_max_depth: usize) -> Self {
        self.state.set_max_depth(new_max_depth);
        self
    }

    /// The position where the next token starts.
    pub fn offset(&self) -> usize {
        self.peeked.as_ref().map_or(self.offset, |peeked| peeked.start)
    }

    /// Read the next token. `None` means the input is exhausted, or an error was already
    /// returned.
    pub fn next_token(&mut self) -> Option<Result<Token<'a>, StructureError>> {
        match self.peeked.take() {
            Some(peeked) => peeked.item,
            None => self.lex(),
        }
    }

    /// Look at the next token without consuming it.
    pub fn peek_token(&mut self) -> Option<Result<Token<'a>, StructureError>> {
        if self.peeked.is_none() {
            let start = self.offset;
            let item = self.lex();
            self.peeked = Some(Peeked { start, item });
        }
        self.peeked.as_ref().and_then(|peeked| peeked.item.clone())
    }

    /// Consume one complete value and return the exact bytes it was encoded as.
    pub fn capture_raw(&mut self) -> Result<&'a [u8], StructureError> {
        let start = self.offset();
        let mut depth = 0usize;

        loop {
            match self.next_token() {
                None => return Err(StructureError::eof("where a value was expected")),
                Some(Err(error)) => return Err(error),
                Some(Ok(Token::ListStart | Token::DictStart)) => depth += 1,
                Some(Ok(token @ (Token::ListEnd | Token::DictEnd))) => {
                    if depth == 0 {
                        return Err(StructureError::terminator(format!(
                            "Found {} where a value was expected",
                            token.name()
                        )));
                    }
                    depth -= 1;
                },
                Some(Ok(_)) => {},
            }

            if depth == 0 {
                return Ok(&self.source[start..self.offset]);
            }
        }
    }

    fn lex(&mut self) -> Option<Result<Token<'a>, StructureError>> {
        // Only report an error once
        if self.state.check_error().is_err() {
            return None;
        }

        if self.offset == self.source.len() {
            return self.state.observe_eof().err().map(Err);
        }

        let start = self.offset;
        let result = self.raw_next_token();
        let result = self.state.latch_err(result).and_then(|token| {
            if !token.is_end() {
                self.state.observe_token(&token, start)?;
            }
            Ok(token)
        });
        Some(result)
    }

    fn take_byte(&mut self) -> Option<u8> {
        let byte = self.source.get(self.offset).copied();
        if byte.is_some() {
            self.offset += 1;
        }
        byte
    }

    fn take_chunk(&mut self, count: usize) -> Option<&'a [u8]> {
        match self.offset.checked_add(count) {
            Some(end_pos) if end_pos <= self.source.len() => {
                let ret = &self.source[self.offset..end_pos];
                self.offset = end_pos;
                Some(ret)
            },
            _ => None,
        }
    }

    /// Read the body of an `i...e` integer. Leading zeros, `-0` and empty bodies are rejected.
    fn take_int(&mut self) -> Result<&'a str, StructureError> {
        enum State {
            Start,
            Sign,
            Zero,
            Digits,
        }

        let mut curpos = self.offset;
        let mut state = State::Start;

        loop {
            let Some(&byte) = self.source.get(curpos) else {
                return Err(StructureError::eof("inside an integer"));
            };
            let c = byte as char;
            match state {
                State::Start => match c {
                    '-' => state = State::Sign,
                    '0' => state = State::Zero,
                    '1'..='9' => state = State::Digits,
                    _ => return Err(StructureError::unexpected("'-' or '0'..'9'", c, curpos)),
                },
                State::Zero => match c {
                    'e' => break,
                    _ => return Err(StructureError::unexpected("'e'", c, curpos)),
                },
                State::Sign => match c {
                    '1'..='9' => state = State::Digits,
                    _ => return Err(StructureError::unexpected("'1'..'9'", c, curpos)),
                },
                State::Digits => match c {
                    '0'..='9' => {},
                    'e' => break,
                    _ => return Err(StructureError::unexpected("'e' or '0'..'9'", c, curpos)),
                },
            }
            curpos += 1;
        }

        let slice = &self.source[self.offset..curpos];
        self.offset = curpos + 1;
        // Every byte was checked to be ASCII above
        str::from_utf8(slice).map_err(|_| StructureError::unexpected("ASCII", '?', curpos))
    }

    /// Read the `N:` prefix of a string.
    fn take_length(&mut self) -> Result<usize, StructureError> {
        let start = self.offset;
        let mut curpos = start;

        loop {
            match self.source.get(curpos) {
                None => {
                    return Err(StructureError::invalid_length(format!(
                        "Reached EOF in string length starting at offset {start}"
                    )));
                },
                Some(b':') if curpos > start => break,
                Some(b'0'..=b'9') => curpos += 1,
                Some(&other) => {
                    return Err(StructureError::invalid_length(format!(
                        "Expected ':' or '0'..'9', got {:?} at offset {curpos}",
                        other as char
                    )));
                },
            }
        }

        let digits = &self.source[start..curpos];
        self.offset = curpos + 1;
        str::from_utf8(digits)
            .ok()
            .and_then(|digits| digits.parse().ok())
            .ok_or_else(|| {
                StructureError::invalid_length(format!(
                    "String length at offset {start} does not fit in memory"
                ))
            })
    }

    fn raw_next_token(&mut self) -> Result<Token<'a>, StructureError> {
        let offset = self.offset;
        let Some(byte) = self.take_byte() else {
            return Err(StructureError::eof("where a token was expected"));
        };

        let token = match byte {
            b'e' => self.state.observe_end()?,
            b'l' => Token::ListStart,
            b'd' => Token::DictStart,
            b'i' => Token::Integer(self.take_int()?),
            b'0'..=b'9' => {
                self.offset = offset;
                let len = self.take_length()?;
                let body = self.take_chunk(len).ok_or_else(|| {
                    StructureError::invalid_length(format!(
                        "String at offset {offset} claims {len} bytes, only {} remain",
                        self.source.len() - self.offset
                    ))
                })?;
                Token::String(body)
            },
            b'-' if self.state.expects_key() => {
                return Err(StructureError::invalid_length(format!(
                    "Negative string length at offset {offset}"
                )));
            },
            other => return Err(StructureError::unexpected("a value", other as char, offset)),
        };

        Ok(token)
    }
}

/// Iterate over the tokens in the input. This guarantees that the resulting stream
/// of tokens constitutes a valid bencoded structure.
impl<'a> Iterator for Lexer<'a> {
    type Item = Result<Token<'a>, StructureError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
    }
}
