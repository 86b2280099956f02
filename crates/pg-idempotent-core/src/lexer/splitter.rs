//! Statement splitter.
//!
//! Partitions a script into top-level statements. A `;` ends a statement
//! only outside strings, quoted identifiers, comments and dollar-quoted
//! bodies, so function bodies with embedded statements stay whole.

use super::Span;
use super::cursor::Cursor;
use crate::error::SplitError;

/// A top-level statement located in a script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawStatement {
    /// From the first significant character to the terminating `;`
    /// inclusive, or to the last significant character when the script
    /// ends without one.
    pub span: Span,
    /// Set when the script ended inside a quoted construct; the span then
    /// covers the whole remainder of the script.
    pub fault: Option<SplitError>,
}

impl RawStatement {
    const fn new(span: Span) -> Self {
        Self { span, fault: None }
    }

    const fn faulted(span: Span, fault: SplitError) -> Self {
        Self {
            span,
            fault: Some(fault),
        }
    }
}

/// Splits a script into statements.
pub struct Splitter<'a> {
    cursor: Cursor<'a>,
    /// Start of the statement being scanned, once significant text is seen.
    start: Option<usize>,
    /// End of the last significant character of the current statement.
    last_end: usize,
    statements: Vec<RawStatement>,
}

impl<'a> Splitter<'a> {
    /// Creates a new splitter for the given script.
    #[must_use]
    pub const fn new(input: &'a str) -> Self {
        Self {
            cursor: Cursor::new(input),
            start: None,
            last_end: 0,
            statements: Vec::new(),
        }
    }

    /// Splits the whole script.
    ///
    /// Inter-statement text (whitespace, comments, stray `;`) is not part of
    /// any span. On unterminated quoting the last statement carries the
    /// error and scanning stops.
    #[must_use]
    pub fn split(mut self) -> Vec<RawStatement> {
        while let Some(c) = self.cursor.peek() {
            let pos = self.cursor.pos();

            if self.cursor.at_comment() {
                if let Err(e) = self.cursor.skip_comment() {
                    self.fail(pos, e);
                    return self.statements;
                }
                continue;
            }
            if c.is_whitespace() {
                self.cursor.advance();
                continue;
            }
            if c == ';' {
                self.cursor.advance();
                if let Some(start) = self.start.take() {
                    self.statements
                        .push(RawStatement::new(Span::new(start, self.cursor.pos())));
                }
                continue;
            }

            if self.start.is_none() {
                self.start = Some(pos);
            }
            let scanned = match c {
                '\'' => {
                    let escapes = self.cursor.at_escape_string();
                    self.cursor.skip_string(escapes)
                }
                '"' => self.cursor.skip_quoted_identifier(),
                '$' => match self.cursor.dollar_delimiter() {
                    Some(delimiter) => self.cursor.skip_dollar_body(delimiter),
                    None => {
                        self.cursor.advance();
                        Ok(())
                    }
                },
                _ => {
                    self.cursor.advance();
                    Ok(())
                }
            };
            if let Err(e) = scanned {
                self.fail(pos, e);
                return self.statements;
            }
            self.last_end = self.cursor.pos();
        }

        if let Some(start) = self.start {
            self.statements
                .push(RawStatement::new(Span::new(start, self.last_end)));
        }
        self.statements
    }

    /// Records an error statement covering the rest of the script.
    fn fail(&mut self, pos: usize, error: SplitError) {
        let start = self.start.unwrap_or(pos);
        let end = self.cursor.input().len();
        self.statements
            .push(RawStatement::faulted(Span::new(start, end), error));
    }
}

/// Splits `input` into top-level statements.
#[must_use]
pub fn split(input: &str) -> Vec<RawStatement> {
    Splitter::new(input).split()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Construct;

    fn texts(input: &str) -> Vec<&str> {
        split(input).iter().map(|s| s.span.slice(input)).collect()
    }

    #[test]
    fn test_empty_input() {
        assert!(split("").is_empty());
        assert!(split("  \n\t ").is_empty());
    }

    #[test]
    fn test_comments_only() {
        let statements = split("-- header\n/* block */\n-- trailer");
        assert!(statements.is_empty());
    }

    #[test]
    fn test_two_statements() {
        assert_eq!(
            texts("CREATE TABLE a (id int);\n\nCREATE TABLE b (id int);\n"),
            vec!["CREATE TABLE a (id int);", "CREATE TABLE b (id int);"]
        );
    }

    #[test]
    fn test_leading_comment_is_not_part_of_statement() {
        assert_eq!(
            texts("-- users\nCREATE TABLE users (id int);"),
            vec!["CREATE TABLE users (id int);"]
        );
    }

    #[test]
    fn test_missing_final_semicolon() {
        assert_eq!(
            texts("SET x = 1;\nSELECT 1 -- done\n"),
            vec!["SET x = 1;", "SELECT 1"]
        );
    }

    #[test]
    fn test_semicolons_inside_quotes() {
        assert_eq!(
            texts("INSERT INTO t VALUES ('a;b', E'c\\';d');\nCREATE TABLE \"x;y\" (id int);"),
            vec![
                "INSERT INTO t VALUES ('a;b', E'c\\';d');",
                "CREATE TABLE \"x;y\" (id int);"
            ]
        );
    }

    #[test]
    fn test_nested_dollar_tags() {
        let sql = "CREATE FUNCTION f() RETURNS void AS $outer$\n\
                   BEGIN\n\
                   EXECUTE $inner$ SELECT 1; $inner$;\n\
                   PERFORM 2;\n\
                   END;\n\
                   $outer$ LANGUAGE plpgsql;\n\
                   SELECT 3;";
        let statements = split(sql);
        assert_eq!(statements.len(), 2);
        assert!(statements[0].span.slice(sql).ends_with("LANGUAGE plpgsql;"));
    }

    #[test]
    fn test_stray_semicolons_are_skipped() {
        assert_eq!(texts(";;SELECT 1;;"), vec!["SELECT 1;"]);
    }

    #[test]
    fn test_unterminated_dollar_body() {
        let sql = "SELECT 1;\nCREATE FUNCTION f() AS $tag$ unterminated";
        let statements = split(sql);
        assert_eq!(statements.len(), 2);
        assert!(statements[0].fault.is_none());
        assert_eq!(statements[1].span.slice(sql), "CREATE FUNCTION f() AS $tag$ unterminated");
        assert_eq!(
            statements[1].fault,
            Some(SplitError::unterminated(
                Construct::DollarQuoted("$tag$".into()),
                33
            ))
        );
    }

    #[test]
    fn test_unterminated_comment_between_statements() {
        let sql = "SELECT 1;\n/* open";
        let statements = split(sql);
        assert_eq!(statements.len(), 2);
        assert_eq!(statements[1].span.slice(sql), "/* open");
        assert!(statements[1].fault.is_some());
    }
}
