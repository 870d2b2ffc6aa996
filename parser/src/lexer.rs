//! Lexer (tokenizer) for query text.

use crate::{ParseError, ParseResult, Span};

/// Token types.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    LParen, // (
    RParen, // )
    Quote,  // '

    Symbol(String),
    Str(String),
    Int(i64),
    Float(f64),

    Eof,
}

impl TokenKind {
    pub fn name(&self) -> String {
        match self {
            TokenKind::LParen => "'('".to_string(),
            TokenKind::RParen => "')'".to_string(),
            TokenKind::Quote => "'''".to_string(),
            TokenKind::Symbol(s) => format!("symbol '{}'", s),
            TokenKind::Str(s) => format!("string \"{}\"", s),
            TokenKind::Int(i) => format!("number {}", i),
            TokenKind::Float(f) => format!("number {}", f),
            TokenKind::Eof => "end of input".to_string(),
        }
    }
}

/// A token with its span.
#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn eof(pos: usize, line: usize, column: usize) -> Self {
        Self {
            kind: TokenKind::Eof,
            span: Span::new(pos, pos, line, column),
        }
    }
}

/// Lexer state.
pub struct Lexer<'a> {
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    pos: usize,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            chars: input.char_indices().peekable(),
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    /// Tokenize all input into a vector of tokens.
    pub fn tokenize(mut self) -> ParseResult<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let is_eof = matches!(token.kind, TokenKind::Eof);
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        Ok(tokens)
    }

    fn current_span(&self) -> Span {
        Span::new(self.pos, self.pos, self.line, self.column)
    }

    fn span_from(&self, start: usize, start_line: usize, start_col: usize) -> Span {
        Span::new(start, self.pos, start_line, start_col)
    }

    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, c)| *c)
    }

    fn next_char(&mut self) -> Option<char> {
        if let Some((pos, c)) = self.chars.next() {
            self.pos = pos + c.len_utf8();
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
            Some(c)
        } else {
            None
        }
    }

    // Commas are separators between list items, like whitespace.
    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek_char() {
            if c.is_whitespace() || c == ',' {
                self.next_char();
            } else {
                break;
            }
        }
    }

    fn next_token(&mut self) -> ParseResult<Token> {
        self.skip_whitespace();

        let start = self.pos;
        let start_line = self.line;
        let start_col = self.column;

        let Some(c) = self.next_char() else {
            return Ok(Token::eof(self.pos, self.line, self.column));
        };

        let kind = match c {
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '\'' => TokenKind::Quote,
            '"' => self.scan_string(start, start_line, start_col)?,
            _ => self.scan_atom(c, start, start_line, start_col)?,
        };

        Ok(Token::new(
            kind,
            self.span_from(start, start_line, start_col),
        ))
    }

    fn scan_string(
        &mut self,
        start: usize,
        start_line: usize,
        start_col: usize,
    ) -> ParseResult<TokenKind> {
        let mut value = String::new();

        loop {
            match self.next_char() {
                None => {
                    return Err(ParseError::new(
                        "unterminated string literal",
                        self.span_from(start, start_line, start_col),
                    ));
                }
                Some('"') => break,
                Some('\\') => match self.next_char() {
                    Some('n') => value.push('\n'),
                    Some('t') => value.push('\t'),
                    // Any other escaped character stands for itself.
                    Some(c) => value.push(c),
                    None => {
                        return Err(ParseError::new(
                            "unterminated string literal",
                            self.current_span(),
                        ));
                    }
                },
                Some(c) => value.push(c),
            }
        }

        Ok(TokenKind::Str(value))
    }

    fn is_delimiter(c: char) -> bool {
        c.is_whitespace() || matches!(c, '(' | ')' | '"' | '\'' | ',')
    }

    fn scan_atom(
        &mut self,
        first: char,
        start: usize,
        start_line: usize,
        start_col: usize,
    ) -> ParseResult<TokenKind> {
        let mut text = String::from(first);
        while let Some(c) = self.peek_char() {
            // Inside a number, commas are digit separators.
            if Self::is_delimiter(c) && !(c == ',' && Self::looks_numeric(&text)) {
                break;
            }
            text.push(c);
            self.next_char();
        }
        let text = text.trim_end_matches(',').to_string();

        if Self::looks_numeric(&text) {
            return Self::parse_number(&text).ok_or_else(|| {
                ParseError::new(
                    format!("invalid number literal '{}'", text),
                    self.span_from(start, start_line, start_col),
                )
                .with_found(text.clone())
            });
        }
        Ok(TokenKind::Symbol(text))
    }

    fn looks_numeric(text: &str) -> bool {
        let digits = text.strip_prefix('-').unwrap_or(text);
        digits.starts_with(|c: char| c.is_ascii_digit())
    }

    fn parse_number(text: &str) -> Option<TokenKind> {
        let cleaned: String = text.chars().filter(|c| !matches!(c, ',' | '_')).collect();
        if cleaned.contains(['.', 'e', 'E']) {
            cleaned.parse::<f64>().ok().map(TokenKind::Float)
        } else {
            cleaned.parse::<i64>().ok().map(TokenKind::Int)
        }
    }
}
