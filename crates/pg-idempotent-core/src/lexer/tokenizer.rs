//! Statement tokenizer.

use super::cursor::{Cursor, is_ident_char};
use super::{Keyword, Span, Token, TokenKind};

/// A lexer that tokenizes one SQL statement.
///
/// Whitespace and comments are skipped. Quoted constructs become single
/// tokens, so keywords inside strings or function bodies never surface.
pub struct Lexer<'a> {
    cursor: Cursor<'a>,
    /// The byte position of the start of the current token.
    start: usize,
    done: bool,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given input.
    #[must_use]
    pub const fn new(input: &'a str) -> Self {
        Self {
            cursor: Cursor::new(input),
            start: 0,
            done: false,
        }
    }

    /// Skips whitespace and comments.
    ///
    /// An unterminated block comment is returned as an error token.
    fn skip_whitespace_and_comments(&mut self) -> Option<Token> {
        loop {
            self.cursor.eat_while(char::is_whitespace);
            if !self.cursor.at_comment() {
                return None;
            }
            self.start = self.cursor.pos();
            if let Err(e) = self.cursor.skip_comment() {
                return Some(self.make_token(TokenKind::Error(e)));
            }
        }
    }

    /// Creates a span from start to current position.
    fn make_span(&self) -> Span {
        Span::new(self.start, self.cursor.pos())
    }

    /// Creates a token with the current span.
    fn make_token(&self, kind: TokenKind) -> Token {
        Token::new(kind, self.make_span())
    }

    fn text(&self) -> &'a str {
        &self.cursor.input()[self.start..self.cursor.pos()]
    }

    /// Scans an identifier or keyword.
    fn scan_identifier(&mut self) -> Token {
        self.cursor.eat_while(is_ident_char);
        let text = self.text();

        if let Some(keyword) = Keyword::from_str(text) {
            self.make_token(TokenKind::Keyword(keyword))
        } else {
            self.make_token(TokenKind::Identifier(text.to_string()))
        }
    }

    /// Scans a quoted identifier (e.g., "column name").
    fn scan_quoted_identifier(&mut self) -> Token {
        match self.cursor.skip_quoted_identifier() {
            Ok(()) => {
                let text = self.text();
                let content = &text[1..text.len() - 1];
                self.make_token(TokenKind::QuotedIdentifier(content.replace("\"\"", "\"")))
            }
            Err(e) => self.make_token(TokenKind::Error(e)),
        }
    }

    /// Scans a string literal.
    fn scan_string(&mut self, backslash_escapes: bool) -> Token {
        let quote_start = self.cursor.pos();
        match self.cursor.skip_string(backslash_escapes) {
            Ok(()) => {
                let raw = &self.cursor.input()[quote_start + 1..self.cursor.pos() - 1];
                let mut value = raw.replace("''", "'");
                if backslash_escapes {
                    value = value.replace("\\'", "'").replace("\\\\", "\\");
                }
                self.make_token(TokenKind::String(value))
            }
            Err(e) => self.make_token(TokenKind::Error(e)),
        }
    }

    fn scan_dollar_string(&mut self, delimiter: &str) -> Token {
        match self.cursor.skip_dollar_body(delimiter) {
            Ok(()) => self.make_token(TokenKind::DollarString(delimiter.to_string())),
            Err(e) => self.make_token(TokenKind::Error(e)),
        }
    }

    /// Scans a number.
    fn scan_number(&mut self) -> Token {
        self.cursor
            .eat_while(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_');
        self.make_token(TokenKind::Number)
    }

    /// Scans the next token.
    #[must_use]
    pub fn next_token(&mut self) -> Token {
        if let Some(error) = self.skip_whitespace_and_comments() {
            return error;
        }
        self.start = self.cursor.pos();

        let Some(c) = self.cursor.peek() else {
            return self.make_token(TokenKind::Eof);
        };

        match c {
            '\'' => {
                let escapes = self.cursor.at_escape_string();
                self.scan_string(escapes)
            }
            '"' => self.scan_quoted_identifier(),
            '$' => {
                if let Some(delimiter) = self.cursor.dollar_delimiter() {
                    self.scan_dollar_string(delimiter)
                } else {
                    self.cursor.advance();
                    self.cursor.eat_while(|c| c.is_ascii_digit());
                    self.make_token(TokenKind::Symbol('$'))
                }
            }
            c if c.is_ascii_digit() => self.scan_number(),
            c if c.is_alphabetic() || c == '_' => {
                // E'...' escape strings start with an identifier character
                if matches!(c, 'e' | 'E') && self.cursor.peek_next() == Some('\'') {
                    self.cursor.advance();
                    return self.scan_string(true);
                }
                self.scan_identifier()
            }
            _ => {
                self.cursor.advance();
                let kind = match c {
                    '.' => TokenKind::Dot,
                    ',' => TokenKind::Comma,
                    '(' => TokenKind::LeftParen,
                    ')' => TokenKind::RightParen,
                    ';' => TokenKind::Semicolon,
                    other => TokenKind::Symbol(other),
                };
                self.make_token(kind)
            }
        }
    }

    /// Tokenizes the entire input and returns all tokens.
    #[must_use]
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let is_eof = token.is_eof();
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        tokens
    }
}

/// Yields tokens up to, not including, end of input.
///
/// Stops after the first error token.
impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if self.done {
            return None;
        }
        let token = self.next_token();
        match token.kind {
            TokenKind::Eof => {
                self.done = true;
                None
            }
            TokenKind::Error(_) => {
                self.done = true;
                Some(token)
            }
            _ => Some(token),
        }
    }
}
