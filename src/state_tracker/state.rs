use crate::state_tracker::{StructureError, Token};

/// How deep lists and dictionaries may nest unless configured otherwise.
pub const DEFAULT_MAX_DEPTH: usize = 2048;

/// The state of current level of the token stream
#[derive(Clone, Eq, PartialEq, Debug)]
enum State<E> {
    /// An inner list. Allows any token
    List,
    /// Inside a dictionary, expecting a key or the end
    DictKey,
    /// Inside a dictionary, expecting the value for the key just read
    DictValue,
    /// Received an error; every later observation reports it again
    Failed(E),
}

/// Used to validate that a token stream is well-formed.
///
/// The lexer feeds it every token it reads and the encoder every token it writes. The first
/// error is latched: once an observation fails, every later call fails the same way.
#[derive(Debug)]
pub struct StateTracker<E = StructureError> {
    state: Vec<State<E>>,
    max_depth: usize,
}

impl<E> Default for StateTracker<E> {
    fn default() -> Self {
        StateTracker {
            state: Vec::new(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl<E> StateTracker<E>
where
    E: From<StructureError> + Clone,
{
    pub fn new() -> Self {
        <Self as Default>::default()
    }

    pub fn set_max_depth(&mut self, new_max_depth: usize) {
        self.max_depth = new_max_depth
    }

    /// How many more containers may be opened from the current position.
    pub fn remaining_depth(&self) -> usize {
        self.max_depth.saturating_sub(self.state.len())
    }

    /// True when the next token sits in dictionary key position.
    pub fn expects_key(&self) -> bool {
        matches!(self.state.last(), Some(State::DictKey))
    }

    /// Observe that the input ended. This function is idempotent.
    pub fn observe_eof(&mut self) -> Result<(), E> {
        self.check_error()?;

        match self.state.last() {
            None => Ok(()),
            Some(State::List) => self.fail(StructureError::eof("inside a list")),
            Some(_) => self.fail(StructureError::eof("inside a dictionary")),
        }
    }

    /// Observe an `e` byte, classifying it as the end of the innermost open container.
    pub fn observe_end(&mut self) -> Result<Token<'static>, E> {
        self.check_error()?;

        match self.state.pop() {
            Some(State::List) => Ok(Token::ListEnd),
            Some(State::DictKey) => Ok(Token::DictEnd),
            Some(State::DictValue) => {
                self.state.push(State::DictValue);
                self.fail(StructureError::terminator("Missing dictionary value"))
            },
            Some(State::Failed(error)) => {
                self.state.push(State::Failed(error.clone()));
                Err(error)
            },
            None => self.fail(StructureError::terminator("End not allowed at top level")),
        }
    }

    /// Observe any token other than an end; `offset` is where it started.
    pub fn observe_token(&mut self, token: &Token<'_>, offset: usize) -> Result<(), E> {
        self.check_error()?;

        match (self.state.last_mut(), *token) {
            (_, Token::ListEnd | Token::DictEnd) => {
                return self.fail(StructureError::terminator(
                    "End tokens must be observed with observe_end",
                ));
            },
            (Some(top @ State::DictKey), Token::String(_)) => {
                *top = State::DictValue;
                return Ok(());
            },
            (Some(State::DictKey), other) => {
                return self.fail(StructureError::InvalidKeyType {
                    found: other.name(),
                    offset,
                });
            },
            (Some(top @ State::DictValue), _) => *top = State::DictKey,
            _ => {},
        }

        match *token {
            Token::ListStart => self.push(State::List),
            Token::DictStart => self.push(State::DictKey),
            _ => Ok(()),
        }
    }

    fn push(&mut self, state: State<E>) -> Result<(), E> {
        if self.state.len() >= self.max_depth {
            return self.fail(StructureError::NestingTooDeep);
        }
        self.state.push(state);
        Ok(())
    }

    fn fail<T>(&mut self, error: StructureError) -> Result<T, E> {
        self.latch_err(Err(E::from(error)))
    }

    pub fn latch_err<T>(&mut self, result: Result<T, E>) -> Result<T, E> {
        self.check_error()?;
        if let Err(ref err) = result {
            self.state.push(State::Failed(err.clone()))
        }
        result
    }

    pub fn check_error(&self) -> Result<(), E> {
        if let Some(State::Failed(error)) = self.state.last() {
            Err(error.clone())
        } else {
            Ok(())
        }
    }
}
