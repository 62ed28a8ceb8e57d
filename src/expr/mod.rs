//! The restricted expression language of the playground.
//!
//! Expressions are single call chains against the client binding, e.g.
//! `supabase.from('users').select('id,name').eq('active', true)`. They are
//! tokenized, parsed into a [`CallChain`], and interpreted onto the
//! whitelisted builder surface, yielding a [`QueryRequest`](crate::client::QueryRequest)
//! without ever evaluating user text as code.

mod interp;
mod parser;
mod token;

pub use interp::{interpret, CLIENT_BINDING};
pub use parser::{parse, Call, CallChain};
pub use token::{tokenize, Spanned, Token};

use crate::client::QueryRequest;
use crate::error::Result;

/// Parses and interprets an expression in one step.
pub fn compile(input: &str) -> Result<QueryRequest> {
    interpret(&parse(input)?)
}
