use std::io::BufRead;

use crate::{
    decoding::{Chunker, Decode, Error, Lexer, engine},
    state_tracker::{DEFAULT_MAX_DEPTH, StructureError},
};

/// Decodes successive values from a byte stream.
///
/// Each call to [`Decoder::decode`] isolates the next complete value with a [`Chunker`], then
/// decodes it from memory. Bytes after that value stay unread until the next call.
#[derive(Debug)]
pub struct Decoder<R> {
    chunker: Chunker<R>,
    max_depth: usize,
}

impl<R: BufRead> Decoder<R> {
    pub fn new(source: R) -> Self {
        Decoder {
            chunker: Chunker::new(source),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Set the maximum nesting depth accepted from the input. An unlimited-depth decoder may be
    /// created using `with_max_depth(usize::MAX)`, but be warned that hostile input can then
    /// make decoding into a [`Value`](crate::Value) exhaust the stack.
    pub fn with_max_depth(mut self, new_max_depth: usize) -> Self {
        self.chunker = self.chunker.with_max_depth(new_max_depth);
        self.max_depth = new_max_depth;
        self
    }

    /// Decode the next value into `dest`. Running out of input before the value starts is an
    /// error; use [`Decoder::decode_next`] to detect a clean end.
    pub fn decode<T: Decode + ?Sized>(&mut self, dest: &mut T) -> Result<(), Error> {
        if self.decode_next(dest)? {
            Ok(())
        } else {
            Err(StructureError::eof("before any value").into())
        }
    }

    /// Decode the next value into `dest` if there is one. Returns `false`, leaving `dest`
    /// untouched, when the input is exhausted.
    pub fn decode_next<T: Decode + ?Sized>(&mut self, dest: &mut T) -> Result<bool, Error> {
        let Some(chunk) = self.chunker.next_value()? else {
            return Ok(false);
        };
        let mut tokens = Lexer::new(&chunk).with_max_depth(self.max_depth);
        engine::decode_into(&mut tokens, dest)?;
        Ok(true)
    }

    pub fn into_inner(self) -> R {
        self.chunker.into_inner()
    }
}
