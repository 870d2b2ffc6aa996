//! Tangle Parser
//!
//! This crate turns query text into expression trees:
//! - Lexing (parentheses, quoted strings, numbers, bareword symbols)
//! - Reading a single parenthesized form into a `Sexp`
//! - Expanding the `->>` pipeline macro into nested calls
//! - Error handling with location information

mod error;
mod expand;
mod lexer;
mod reader;
mod sexp;

pub use error::*;
pub use expand::{expand, PIPELINE};
pub use lexer::{Lexer, Token, TokenKind};
pub use reader::{read, Reader};
pub use sexp::*;

/// Source location for error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub column: usize,
}

impl Span {
    pub fn new(start: usize, end: usize, line: usize, column: usize) -> Self {
        Self {
            start,
            end,
            line,
            column,
        }
    }
}

/// Read one form from `text` and expand every pipeline inside it.
pub fn parse(text: &str) -> ParseResult<Sexp> {
    read(text).map(expand)
}
