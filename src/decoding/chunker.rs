use std::io::{self, BufRead};

use crate::{
    decoding::Error,
    state_tracker::{DEFAULT_MAX_DEPTH, StructureError},
};

/// Longest length prefix accepted for a string; `usize::MAX` has 20 digits.
const MAX_LENGTH_DIGITS: usize = 20;

/// Splits a byte stream into complete top-level values without interpreting them.
///
/// The chunker reads exactly the bytes of one value and no further, so the source is left
/// positioned at the next value. Only as much structure is checked as is needed to find the
/// end of the value; the [`Lexer`](crate::decoding::Lexer) validates the rest.
#[derive(Debug)]
pub struct Chunker<R> {
    source: R,
    position: u64,
    max_depth: usize,
    failed: bool,
}

impl<R: BufRead> Chunker<R> {
    pub fn new(source: R) -> Self {
        Chunker {
            source,
            position: 0,
            max_depth: DEFAULT_MAX_DEPTH,
            failed: false,
        }
    }

    /// Set the maximum nesting depth accepted while scanning.
    pub fn with_max_depth(mut self, new_max_depth: usize) -> Self {
        self.max_depth = new_max_depth;
        self
    }

    /// Number of bytes consumed from the source so far.
    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn into_inner(self) -> R {
        self.source
    }

    /// Read the bytes of the next complete value. Returns `Ok(None)` if the source is
    /// exhausted before the value starts.
    pub fn next_value(&mut self) -> Result<Option<Vec<u8>>, Error> {
        if self.peek_byte()?.is_none() {
            return Ok(None);
        }

        let start = self.position;
        let mut chunk = Vec::new();
        self.read_value(&mut chunk)?;
        tracing::trace!(start, len = chunk.len(), "isolated bencode value");
        Ok(Some(chunk))
    }

    fn peek_byte(&mut self) -> Result<Option<u8>, Error> {
        loop {
            match self.source.fill_buf() {
                Ok(buf) => return Ok(buf.first().copied()),
                Err(error) if error.kind() == io::ErrorKind::Interrupted => continue,
                Err(error) => {
                    tracing::debug!(%error, position = self.position, "bencode source failed");
                    return Err(Error::io(error));
                },
            }
        }
    }

    fn consume(&mut self, count: usize) {
        self.source.consume(count);
        self.position += count as u64;
    }

    /// Take one byte; running out of input is reported with `context`.
    fn take_byte(&mut self, context: &str) -> Result<u8, Error> {
        match self.peek_byte()? {
            Some(byte) => {
                self.consume(1);
                Ok(byte)
            },
            None => Err(StructureError::eof(context).into()),
        }
    }

    /// Copy one complete value into `out`. Open containers are tracked on a heap stack, one
    /// flag per level saying whether it is a dictionary.
    fn read_value(&mut self, out: &mut Vec<u8>) -> Result<(), Error> {
        let mut open: Vec<bool> = Vec::new();

        loop {
            if let Some(&is_dict) = open.last() {
                let context = if is_dict {
                    "inside a dictionary"
                } else {
                    "inside a list"
                };
                let Some(next) = self.peek_byte()? else {
                    return Err(StructureError::eof(context).into());
                };

                if next == b'e' {
                    self.consume(1);
                    out.push(b'e');
                    open.pop();
                    if open.is_empty() {
                        return Ok(());
                    }
                    continue;
                }

                if is_dict {
                    self.read_key(out, next)?;
                    if self.peek_byte()? == Some(b'e') {
                        return Err(StructureError::terminator("Missing dictionary value").into());
                    }
                }
            }

            let offset = self.position;
            let Some(first) = self.peek_byte()? else {
                return Err(StructureError::eof("where a value was expected").into());
            };

            match first {
                b'0'..=b'9' => self.read_string(out)?,
                b'i' => self.read_integer(out)?,
                b'l' | b'd' => {
                    if open.len() >= self.max_depth {
                        return Err(StructureError::NestingTooDeep.into());
                    }
                    self.consume(1);
                    out.push(first);
                    open.push(first == b'd');
                    continue;
                },
                b'e' => {
                    return Err(StructureError::terminator(format!(
                        "Found end where a value was expected at offset {offset}"
                    ))
                    .into());
                },
                other => {
                    return Err(
                        StructureError::unexpected("a value", other as char, offset as usize).into(),
                    );
                },
            }

            if open.is_empty() {
                return Ok(());
            }
        }
    }

    /// Copy a dictionary key whose first byte is `first`.
    fn read_key(&mut self, out: &mut Vec<u8>, first: u8) -> Result<(), Error> {
        let offset = self.position as usize;
        match first {
            b'0'..=b'9' | b'-' => self.read_string(out),
            b'l' | b'd' | b'i' => Err(StructureError::InvalidKeyType {
                found: match first {
                    b'l' => "list",
                    b'd' => "dictionary",
                    _ => "integer",
                },
                offset,
            }
            .into()),
            other => Err(StructureError::unexpected("a dictionary key", other as char, offset).into()),
        }
    }

    /// Copy an integer through its terminating `e`. Its grammar is left to the lexer.
    fn read_integer(&mut self, out: &mut Vec<u8>) -> Result<(), Error> {
        self.consume(1);
        out.push(b'i');

        loop {
            let offset = self.position;
            match self.take_byte("inside an integer")? {
                b'e' => {
                    out.push(b'e');
                    return Ok(());
                },
                byte @ (b'-' | b'0'..=b'9') => out.push(byte),
                other => {
                    return Err(StructureError::unexpected(
                        "'e' or '0'..'9'",
                        other as char,
                        offset as usize,
                    )
                    .into());
                },
            }
        }
    }

    fn read_string(&mut self, out: &mut Vec<u8>) -> Result<(), Error> {
        let offset = self.position;
        let mut digits = String::new();

        loop {
            let byte = match self.peek_byte()? {
                Some(byte) => byte,
                None => {
                    return Err(StructureError::invalid_length(format!(
                        "Reached EOF in string length starting at offset {offset}"
                    ))
                    .into());
                },
            };
            self.consume(1);

            match byte {
                b':' if !digits.is_empty() => break,
                b'-' if digits.is_empty() => {
                    return Err(StructureError::invalid_length(format!(
                        "Negative string length at offset {offset}"
                    ))
                    .into());
                },
                b'0'..=b'9' if digits.len() < MAX_LENGTH_DIGITS => digits.push(byte as char),
                other => {
                    return Err(StructureError::invalid_length(format!(
                        "Expected ':' or '0'..'9', got {:?} in string length at offset {offset}",
                        other as char
                    ))
                    .into());
                },
            }
        }

        let len: usize = digits.parse().map_err(|_| {
            StructureError::invalid_length(format!(
                "String length at offset {offset} does not fit in memory"
            ))
        })?;

        out.extend_from_slice(digits.as_bytes());
        out.push(b':');
        self.read_exact_into(out, len, offset)
    }

    /// Append exactly `len` bytes, retrying short reads. Memory grows with the data actually
    /// received, never with the claimed length.
    fn read_exact_into(&mut self, out: &mut Vec<u8>, len: usize, offset: u64) -> Result<(), Error> {
        let mut remaining = len;
        while remaining > 0 {
            let available = loop {
                match self.source.fill_buf() {
                    Ok(buf) => break buf,
                    Err(error) if error.kind() == io::ErrorKind::Interrupted => continue,
                    Err(error) => {
                        tracing::debug!(%error, position = self.position, "bencode source failed");
                        return Err(Error::io(error));
                    },
                }
            };

            if available.is_empty() {
                return Err(StructureError::invalid_length(format!(
                    "String at offset {offset} claims {len} bytes, only {} remain",
                    len - remaining
                ))
                .into());
            }

            let count = available.len().min(remaining);
            out.extend_from_slice(&available[..count]);
            self.consume(count);
            remaining -= count;

            if remaining > 0 {
                tracing::trace!(remaining, "partial read of string body");
            }
        }
        Ok(())
    }
}

/// Iterate over the complete values of the source, stopping after the first error.
impl<R: BufRead> Iterator for Chunker<R> {
    type Item = Result<Vec<u8>, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.next_value() {
            Ok(chunk) => chunk.map(Ok),
            Err(error) => {
                self.failed = true;
                Some(Err(error))
            },
        }
    }
}
