use crate::{
    decoding::Lexer,
    encoding::{Encode, Error, PrintableInteger},
    shape::Shape,
    state_tracker::{StateTracker, StructureError, Token},
};

/// Builds bencode in memory.
///
/// Every token goes through the same nesting checks the lexer applies to input, so the
/// finished buffer always holds exactly one well-formed value. The first failure is latched:
/// later calls return it again without writing anything.
#[derive(Default, Debug)]
pub struct Encoder {
    state: StateTracker<Error>,
    output: Vec<u8>,
}

impl Encoder {
    pub fn new() -> Self {
        Encoder::default()
    }

    /// Limit how deeply lists and dictionaries may nest in the output.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.state.set_max_depth(max_depth);
        self
    }

    fn emit_token(&mut self, token: Token) -> Result<(), Error> {
        self.state.check_error()?;
        if token.is_end() {
            let expected = self.state.observe_end()?;
            if expected != token {
                let error = StructureError::terminator(format!(
                    "{} emitted where a {} was due",
                    token.name(),
                    expected.name()
                ));
                return self.state.latch_err(Err(error.into()));
            }
        } else {
            self.state.observe_token(&token, self.output.len())?;
        }
        write_token(&mut self.output, &token);
        Ok(())
    }

    /// Emit any [`Encode`] value.
    pub fn emit<E: Encode + ?Sized>(&mut self, value: &E) -> Result<(), Error> {
        self.emit_with(|e| value.encode(e))
    }

    /// Hand a [`SingleItemEncoder`] to `value_cb`, which must emit exactly one value through it.
    pub fn emit_with<F>(&mut self, value_cb: F) -> Result<(), Error>
    where
        F: FnOnce(SingleItemEncoder) -> Result<(), Error>,
    {
        let mut emitted = false;
        let result = value_cb(SingleItemEncoder {
            encoder: self,
            emitted: &mut emitted,
        });
        self.state.latch_err(result)?;

        if emitted {
            Ok(())
        } else {
            let error = Error::unencodable(
                Shape::Custom,
                "encoder callback returned without emitting a value",
            );
            self.state.latch_err(Err(error))
        }
    }

    pub fn emit_int<T: PrintableInteger>(&mut self, value: T) -> Result<(), Error> {
        let digits = value.to_string();
        self.emit_token(Token::Integer(&digits))
    }

    pub fn emit_str(&mut self, value: &str) -> Result<(), Error> {
        self.emit_bytes(value.as_bytes())
    }

    pub fn emit_bytes(&mut self, value: &[u8]) -> Result<(), Error> {
        self.emit_token(Token::String(value))
    }

    /// Splice the complete encoding of one value into the output.
    ///
    /// `raw` must hold exactly one well-formed value that fits in the nesting depth left at
    /// this point. Its dictionaries are copied as they are, sorted or not.
    pub fn emit_raw(&mut self, raw: &[u8]) -> Result<(), Error> {
        self.state.check_error()?;

        let mut tokens = Lexer::new(raw).with_max_depth(self.state.remaining_depth());
        let checked = tokens.capture_raw().and_then(|value| match raw.len() - value.len() {
            0 => Ok(()),
            trailing => Err(StructureError::MalformedInput {
                detail: format!("{trailing} trailing bytes after raw value"),
            }),
        });
        self.state.latch_err(checked.map_err(Error::from))?;

        // Stands in for the spliced value; an integer is never a valid key
        self.state
            .observe_token(&Token::Integer(""), self.output.len())?;
        self.output.extend_from_slice(raw);
        Ok(())
    }

    /// Emit a dictionary. `content_cb` writes the pairs, keys in strictly ascending byte order.
    ///
    /// ```
    /// # use bencodec::encoding::{Encoder, Error};
    /// # fn main() -> Result<(), Error> {
    /// let mut encoder = Encoder::new();
    /// encoder.emit_dict(|mut e| {
    ///     e.emit_pair(b"name", "ferris")?;
    ///     e.emit_pair(b"size", &7)
    /// })?;
    /// assert_eq!(encoder.finish()?, b"d4:name6:ferris4:sizei7ee");
    /// # Ok(())
    /// # }
    /// ```
    pub fn emit_dict<F>(&mut self, content_cb: F) -> Result<(), Error>
    where
        F: FnOnce(SortedDictEncoder) -> Result<(), Error>,
    {
        self.emit_token(Token::DictStart)?;
        content_cb(SortedDictEncoder {
            encoder: self,
            previous_key: None,
        })?;
        self.emit_token(Token::DictEnd)
    }

    /// Emit a list whose elements `content_cb` writes in order.
    ///
    /// ```
    /// # use bencodec::encoding::{Encoder, Error};
    /// # fn main() -> Result<(), Error> {
    /// let mut encoder = Encoder::new();
    /// encoder.emit_list(|e| {
    ///     e.emit_str("spam")?;
    ///     e.emit_int(-1)
    /// })?;
    /// assert_eq!(encoder.finish()?, b"l4:spami-1ee");
    /// # Ok(())
    /// # }
    /// ```
    pub fn emit_list<F>(&mut self, content_cb: F) -> Result<(), Error>
    where
        F: FnOnce(&mut Encoder) -> Result<(), Error>,
    {
        self.emit_token(Token::ListStart)?;
        content_cb(self)?;
        self.emit_token(Token::ListEnd)
    }

    /// Take the output. Fails if an error was latched or a container is still open.
    pub fn finish(mut self) -> Result<Vec<u8>, Error> {
        self.state.observe_eof()?;
        Ok(self.output)
    }
}

fn write_token(output: &mut Vec<u8>, token: &Token) {
    match *token {
        Token::ListStart => output.push(b'l'),
        Token::DictStart => output.push(b'd'),
        Token::ListEnd | Token::DictEnd => output.push(b'e'),
        Token::String(bytes) => {
            output.extend_from_slice(bytes.len().to_string().as_bytes());
            output.push(b':');
            output.extend_from_slice(bytes);
        },
        Token::Integer(digits) => {
            output.push(b'i');
            output.extend_from_slice(digits.as_bytes());
            output.push(b'e');
        },
    }
}

/// Emits exactly one value into an [`Encoder`]. Every method consumes the encoder, and
/// [`Encoder::emit_with`] fails if none was called.
pub struct SingleItemEncoder<'a> {
    encoder: &'a mut Encoder,
    emitted: &'a mut bool,
}

impl SingleItemEncoder<'_> {
    pub fn emit<E: Encode + ?Sized>(self, value: &E) -> Result<(), Error> {
        value.encode(self)
    }

    pub fn emit_with<F>(self, value_cb: F) -> Result<(), Error>
    where
        F: FnOnce(SingleItemEncoder) -> Result<(), Error>,
    {
        value_cb(self)
    }

    pub fn emit_int<T: PrintableInteger>(self, value: T) -> Result<(), Error> {
        *self.emitted = true;
        self.encoder.emit_int(value)
    }

    pub fn emit_str(self, value: &str) -> Result<(), Error> {
        *self.emitted = true;
        self.encoder.emit_str(value)
    }

    pub fn emit_bytes(self, value: &[u8]) -> Result<(), Error> {
        *self.emitted = true;
        self.encoder.emit_bytes(value)
    }

    /// See [`Encoder::emit_raw`].
    pub fn emit_raw(self, raw: &[u8]) -> Result<(), Error> {
        *self.emitted = true;
        self.encoder.emit_raw(raw)
    }

    /// See [`Encoder::emit_list`].
    pub fn emit_list<F>(self, content_cb: F) -> Result<(), Error>
    where
        F: FnOnce(&mut Encoder) -> Result<(), Error>,
    {
        *self.emitted = true;
        self.encoder.emit_list(content_cb)
    }

    /// See [`Encoder::emit_dict`].
    pub fn emit_dict<F>(self, content_cb: F) -> Result<(), Error>
    where
        F: FnOnce(SortedDictEncoder) -> Result<(), Error>,
    {
        *self.emitted = true;
        self.encoder.emit_dict(content_cb)
    }
}

/// Writes the pairs of one dictionary, rejecting keys that do not ascend.
pub struct SortedDictEncoder<'a> {
    encoder: &'a mut Encoder,
    previous_key: Option<Vec<u8>>,
}

impl SortedDictEncoder<'_> {
    pub fn emit_pair<E>(&mut self, key: &[u8], value: &E) -> Result<(), Error>
    where
        E: Encode + ?Sized,
    {
        self.emit_key(key)?;
        self.encoder.emit(value)
    }

    /// Like [`SortedDictEncoder::emit_pair`], with the value written by a callback.
    pub fn emit_pair_with<F>(&mut self, key: &[u8], value_cb: F) -> Result<(), Error>
    where
        F: FnOnce(SingleItemEncoder) -> Result<(), Error>,
    {
        self.emit_key(key)?;
        self.encoder.emit_with(value_cb)
    }

    fn emit_key(&mut self, key: &[u8]) -> Result<(), Error> {
        if self.previous_key.as_deref().is_some_and(|previous| previous >= key) {
            let error = StructureError::UnsortedKeys {
                key: String::from_utf8_lossy(key).into_owned(),
            };
            return self.encoder.state.latch_err(Err(error.into()));
        }
        self.encoder.emit_bytes(key)?;
        self.previous_key = Some(key.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn nested_containers() {
        let mut encoder = Encoder::new();
        encoder
            .emit_dict(|mut e| {
                e.emit_pair(b"bar", &25)?;
                e.emit_pair_with(b"foo", |e| {
                    e.emit_list(|e| {
                        e.emit_str("baz")?;
                        e.emit_bytes(b"\xff")
                    })
                })
            })
            .unwrap();
        assert_eq!(encoder.finish().unwrap(), b"d3:bari25e3:fool3:baz1:\xffee");
    }

    #[test]
    fn callbacks_must_emit_a_value() {
        let mut encoder = Encoder::new();
        let error = encoder.emit_with(|_| Ok(())).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::UnencodableShape);
        assert!(error.to_string().contains("without emitting a value"));

        // Latched
        assert!(encoder.emit_int(1).is_err());
    }

    #[test]
    fn unsorted_keys_are_rejected() {
        let mut encoder = Encoder::new();
        let error = encoder
            .emit_dict(|mut e| {
                e.emit_pair(b"b", &1)?;
                e.emit_pair(b"a", &2)
            })
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::UnencodableShape);
        assert!(error.to_string().contains("Keys were not sorted"));
    }

    #[test]
    fn repeated_keys_are_rejected() {
        let mut encoder = Encoder::new();
        let result = encoder.emit_dict(|mut e| {
            e.emit_pair(b"a", &1)?;
            e.emit_pair(b"a", &2)
        });
        assert!(result.is_err());
    }

    #[test]
    fn mismatched_terminators_are_rejected() {
        let mut encoder = Encoder::new();
        encoder.emit_token(Token::ListStart).unwrap();
        let error = encoder.emit_token(Token::DictEnd).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::UnexpectedTerminator);
    }

    #[test]
    fn raw_values_are_spliced() {
        let mut encoder = Encoder::new();
        encoder
            .emit_list(|e| {
                e.emit_raw(b"d1:bi1e1:ai2ee")?;
                e.emit_int(-3)
            })
            .unwrap();
        assert_eq!(encoder.finish().unwrap(), b"ld1:bi1e1:ai2eei-3ee");
    }

    #[test]
    fn raw_values_must_be_one_complete_value() {
        assert!(Encoder::new().emit_raw(b"li1e").is_err());
        assert!(Encoder::new().emit_raw(b"i1ei2e").is_err());
        assert!(Encoder::new().emit_raw(b"").is_err());
    }

    #[test]
    fn raw_values_cannot_be_keys() {
        let mut encoder = Encoder::new();
        encoder.emit_token(Token::DictStart).unwrap();
        let error = encoder.emit_raw(b"1:a").unwrap_err();
        assert_eq!(error.kind(), ErrorKind::InvalidKeyType);
    }

    #[test]
    fn incomplete_output_is_rejected() {
        let mut encoder = Encoder::new();
        encoder.emit_token(Token::ListStart).unwrap();
        assert!(encoder.finish().is_err());
    }

    #[test]
    fn depth_is_limited() {
        let mut encoder = Encoder::new().with_max_depth(1);
        let result = encoder.emit_list(|e| e.emit_list(|_| Ok(())));
        assert!(matches!(
            result,
            Err(Error::Structure {
                source: StructureError::NestingTooDeep
            })
        ));
    }
}
