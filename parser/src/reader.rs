//! Recursive-descent reader from tokens to `Sexp`.

use crate::{Lexer, ParseError, ParseResult, Sexp, Token, TokenKind};

/// Read exactly one form from `text`.
pub fn read(text: &str) -> ParseResult<Sexp> {
    let tokens = Lexer::new(text).tokenize()?;
    let mut reader = Reader::new(tokens);
    let form = reader.read_form()?;
    reader.expect_eof()?;
    Ok(form)
}

pub struct Reader {
    tokens: Vec<Token>,
    pos: usize,
}

impl Reader {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> &Token {
        // The lexer always terminates the stream with Eof.
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    pub fn read_form(&mut self) -> ParseResult<Sexp> {
        let token = self.advance();
        match token.kind {
            TokenKind::LParen => self.read_list(token),
            TokenKind::Quote => Ok(Sexp::Quote(Box::new(self.read_form()?))),
            TokenKind::Symbol(s) => Ok(Sexp::Symbol(s)),
            TokenKind::Str(s) => Ok(Sexp::Str(s)),
            TokenKind::Int(i) => Ok(Sexp::Int(i)),
            TokenKind::Float(f) => Ok(Sexp::Float(f)),
            TokenKind::RParen => Err(ParseError::unexpected_token(
                token.span,
                "expression",
                "')'",
            )),
            TokenKind::Eof => Err(ParseError::unexpected_eof(token.span, "expression")),
        }
    }

    fn read_list(&mut self, open: Token) -> ParseResult<Sexp> {
        let mut items = Vec::new();
        loop {
            match self.peek().kind {
                TokenKind::RParen => {
                    self.advance();
                    return Ok(Sexp::List(items));
                }
                TokenKind::Eof => {
                    return Err(ParseError::new(
                        "unterminated list, missing ')'",
                        open.span,
                    )
                    .with_found("end of input"));
                }
                _ => items.push(self.read_form()?),
            }
        }
    }

    pub fn expect_eof(&mut self) -> ParseResult<()> {
        let token = self.peek();
        match &token.kind {
            TokenKind::Eof => Ok(()),
            other => Err(ParseError::unexpected_token(
                token.span,
                "end of input",
                &other.name(),
            )),
        }
    }
}
