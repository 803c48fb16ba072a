/// A single bencode token.
///
/// Ends of input are not tokens; iterators over tokens simply stop.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug)]
pub enum Token<'a> {
    /// The beginning of a list
    ListStart,
    /// The `e` closing a list
    ListEnd,
    /// The beginning of a dictionary
    DictStart,
    /// The `e` closing a dictionary
    DictEnd,
    /// A byte string; may not be UTF-8
    String(&'a [u8]),
    /// An integer; the text is validated but not parsed, so any width can consume it
    Integer(&'a str),
}

impl Token<'_> {
    pub fn name(&self) -> &'static str {
        match *self {
            Token::ListStart => "list",
            Token::ListEnd => "list end",
            Token::DictStart => "dictionary",
            Token::DictEnd => "dictionary end",
            Token::String(_) => "string",
            Token::Integer(_) => "integer",
        }
    }

    /// Whether this token closes a container.
    pub fn is_end(&self) -> bool {
        matches!(*self, Token::ListEnd | Token::DictEnd)
    }
}
