//! Bookkeeping shared by the lexer and the encoder to keep token streams well formed.

mod state;
mod structure_error;
mod token;

pub use self::{
    state::{DEFAULT_MAX_DEPTH, StateTracker},
    structure_error::StructureError,
    token::Token,
};
