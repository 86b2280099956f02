//! Character cursor shared by the splitter and the tokenizer.
//!
//! Knows PostgreSQL's quoting rules: `''` escapes in strings, backslash
//! escapes in `E'...'` strings, `""` escapes in identifiers, nested block
//! comments and tagged dollar quotes.

use crate::error::{Construct, SplitError};

/// Returns true for characters that may continue an unquoted identifier.
pub(crate) fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// Returns true if `tag` can sit between the `$` of a dollar quote.
#[must_use]
pub fn is_valid_dollar_tag(tag: &str) -> bool {
    let mut chars = tag.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_')
}

pub(crate) struct Cursor<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) const fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    pub(crate) const fn pos(&self) -> usize {
        self.pos
    }

    pub(crate) const fn input(&self) -> &'a str {
        self.input
    }

    /// Returns the current character without advancing.
    pub(crate) fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    /// Returns the next character without advancing.
    pub(crate) fn peek_next(&self) -> Option<char> {
        let mut chars = self.input[self.pos..].chars();
        chars.next();
        chars.next()
    }

    /// Advances to the next character and returns it.
    pub(crate) fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    pub(crate) fn eat_while(&mut self, pred: impl Fn(char) -> bool) {
        while self.peek().is_some_and(&pred) {
            self.advance();
        }
    }

    fn starts_with(&self, s: &str) -> bool {
        self.input[self.pos..].starts_with(s)
    }

    fn prev_char(&self) -> Option<char> {
        self.input[..self.pos].chars().next_back()
    }

    /// True when the cursor sits on `--` or `/*`.
    pub(crate) fn at_comment(&self) -> bool {
        self.starts_with("--") || self.starts_with("/*")
    }

    /// Skips one comment; the cursor must be on `--` or `/*`.
    pub(crate) fn skip_comment(&mut self) -> Result<(), SplitError> {
        if self.starts_with("--") {
            self.eat_while(|c| c != '\n');
            return Ok(());
        }

        let start = self.pos;
        self.pos += 2;
        let mut depth = 1usize;
        loop {
            if self.starts_with("/*") {
                self.pos += 2;
                depth += 1;
            } else if self.starts_with("*/") {
                self.pos += 2;
                depth -= 1;
                if depth == 0 {
                    return Ok(());
                }
            } else if self.advance().is_none() {
                return Err(SplitError::unterminated(Construct::BlockComment, start));
            }
        }
    }

    /// True if a `'` at the cursor opens an `E'...'` escape string.
    pub(crate) fn at_escape_string(&self) -> bool {
        let before = &self.input[..self.pos];
        let mut rev = before.chars().rev();
        match rev.next() {
            Some('e' | 'E') => !rev.next().is_some_and(is_ident_char),
            _ => false,
        }
    }

    /// Skips a string literal; the cursor must be on the opening `'`.
    pub(crate) fn skip_string(&mut self, backslash_escapes: bool) -> Result<(), SplitError> {
        let start = self.pos;
        self.advance();
        loop {
            match self.advance() {
                Some('\\') if backslash_escapes => {
                    self.advance();
                }
                Some('\'') => {
                    if self.peek() == Some('\'') {
                        self.advance();
                    } else {
                        return Ok(());
                    }
                }
                Some(_) => {}
                None => return Err(SplitError::unterminated(Construct::StringLiteral, start)),
            }
        }
    }

    /// Skips a quoted identifier; the cursor must be on the opening `"`.
    pub(crate) fn skip_quoted_identifier(&mut self) -> Result<(), SplitError> {
        let start = self.pos;
        self.advance();
        loop {
            match self.advance() {
                Some('"') => {
                    if self.peek() == Some('"') {
                        self.advance();
                    } else {
                        return Ok(());
                    }
                }
                Some(_) => {}
                None => {
                    return Err(SplitError::unterminated(Construct::QuotedIdentifier, start));
                }
            }
        }
    }

    /// Returns the dollar-quote delimiter (`$$` or `$tag$`) opening at the
    /// cursor, if any.
    ///
    /// `$1` parameters and `$` inside identifiers do not open a quote.
    pub(crate) fn dollar_delimiter(&self) -> Option<&'a str> {
        let rest = &self.input[self.pos..];
        if !rest.starts_with('$') || self.prev_char().is_some_and(is_ident_char) {
            return None;
        }
        let close = rest[1..].find('$')? + 1;
        let tag = &rest[1..close];
        if tag.is_empty() || is_valid_dollar_tag(tag) {
            Some(&rest[..=close])
        } else {
            None
        }
    }

    /// Skips a dollar-quoted body, delimiters included.
    pub(crate) fn skip_dollar_body(&mut self, delimiter: &str) -> Result<(), SplitError> {
        let start = self.pos;
        self.pos += delimiter.len();
        if let Some(offset) = self.input[self.pos..].find(delimiter) {
            self.pos += offset + delimiter.len();
            Ok(())
        } else {
            self.pos = self.input.len();
            Err(SplitError::unterminated(
                Construct::DollarQuoted(delimiter.to_string()),
                start,
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cursor_at(input: &str, pos: usize) -> Cursor<'_> {
        let mut cursor = Cursor::new(input);
        cursor.pos = pos;
        cursor
    }

    #[test]
    fn test_dollar_delimiters() {
        assert_eq!(cursor_at("AS $$ x $$", 3).dollar_delimiter(), Some("$$"));
        assert_eq!(
            cursor_at("AS $body$ x $body$", 3).dollar_delimiter(),
            Some("$body$")
        );
        assert_eq!(cursor_at("WHERE a = $1", 10).dollar_delimiter(), None);
        assert_eq!(cursor_at("foo$bar$", 3).dollar_delimiter(), None);
    }

    #[test]
    fn test_valid_tags() {
        assert!(is_valid_dollar_tag("pg_idempotent"));
        assert!(is_valid_dollar_tag("_x1"));
        assert!(!is_valid_dollar_tag(""));
        assert!(!is_valid_dollar_tag("1abc"));
        assert!(!is_valid_dollar_tag("a-b"));
    }

    #[test]
    fn test_nested_block_comment() {
        let mut cursor = Cursor::new("/* a /* b */ c */ rest");
        cursor.skip_comment().unwrap();
        assert_eq!(&cursor.input()[cursor.pos()..], " rest");
    }

    #[test]
    fn test_escape_string() {
        let mut cursor = cursor_at(r"E'it\'s' x", 1);
        assert!(cursor.at_escape_string());
        cursor.skip_string(true).unwrap();
        assert_eq!(&cursor.input()[cursor.pos()..], " x");

        assert!(!cursor_at("name'x'", 4).at_escape_string());
    }

    #[test]
    fn test_unterminated_string_reports_offset() {
        let mut cursor = cursor_at("SELECT 'abc", 7);
        let err = cursor.skip_string(false).unwrap_err();
        assert_eq!(err, SplitError::unterminated(Construct::StringLiteral, 7));
    }
}
