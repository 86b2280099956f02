//! Structural validation of rewritten scripts.

use serde::Serialize;

use crate::config::DEFAULT_WRAPPER_TAG;
use crate::lexer::{Keyword, Lexer, Span, Token, TokenKind, split};

/// Outcome of validating a script.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    /// Structural problems, in script order.
    pub issues: Vec<String>,
}

impl ValidationReport {
    fn from_issues(issues: Vec<String>) -> Self {
        Self {
            valid: issues.is_empty(),
            issues,
        }
    }
}

/// Checks that a script still splits into well-formed statements.
#[derive(Debug, Clone, Copy)]
pub struct Validator<'a> {
    wrapper_tag: &'a str,
}

impl Default for Validator<'_> {
    fn default() -> Self {
        Self::new(DEFAULT_WRAPPER_TAG)
    }
}

impl<'a> Validator<'a> {
    /// Creates a validator recognising wrappers tagged `wrapper_tag`.
    #[must_use]
    pub const fn new(wrapper_tag: &'a str) -> Self {
        Self { wrapper_tag }
    }

    /// Re-splits `sql` and reports unterminated quoting and broken
    /// wrapper blocks.
    #[must_use]
    pub fn validate(&self, sql: &str) -> ValidationReport {
        ValidationReport::from_issues(self.issues(sql).1)
    }

    /// Like [`validate`](Self::validate), and also reports a statement count
    /// different from `expected`.
    #[must_use]
    pub fn validate_against(&self, sql: &str, expected: usize) -> ValidationReport {
        let (count, mut issues) = self.issues(sql);
        if count != expected {
            issues.push(format!(
                "Statement count changed: expected {expected}, found {count}"
            ));
        }
        ValidationReport::from_issues(issues)
    }

    /// Checks that `text` is exactly one well-formed statement.
    pub(crate) fn check_single(&self, text: &str) -> Result<(), String> {
        let statements = split(text);
        match statements.as_slice() {
            [statement] => {
                if let Some(fault) = &statement.fault {
                    return Err(fault.to_string());
                }
                self.check_wrapper(statement.span.slice(text))
            }
            _ => Err(format!(
                "expected one statement, found {}",
                statements.len()
            )),
        }
    }

    fn issues(&self, sql: &str) -> (usize, Vec<String>) {
        let statements = split(sql);
        let mut issues = Vec::new();
        for (i, statement) in statements.iter().enumerate() {
            if let Some(fault) = &statement.fault {
                issues.push(format!("Statement {}: {fault}", i + 1));
            } else if let Err(problem) = self.check_wrapper(statement.span.slice(sql)) {
                issues.push(format!("Statement {}: {problem}", i + 1));
            }
        }
        (statements.len(), issues)
    }

    /// A `DO` block carrying our tag must read `BEGIN ... EXCEPTION ... END`.
    fn check_wrapper(&self, text: &str) -> Result<(), String> {
        let mut lexer = Lexer::new(text);
        if lexer.next().as_ref().and_then(Token::keyword) != Some(Keyword::Do) {
            return Ok(());
        }
        let Some(body) = lexer.next() else {
            return Ok(());
        };
        let TokenKind::DollarString(delimiter) = &body.kind else {
            return Ok(());
        };
        if !delimiter.trim_matches('$').starts_with(self.wrapper_tag) {
            return Ok(());
        }

        let inner = Span::new(body.span.start + delimiter.len(), body.span.end - delimiter.len());
        let tokens: Vec<_> = Lexer::new(inner.slice(text)).collect();
        if let Some(error) = tokens.iter().find_map(|t| match &t.kind {
            TokenKind::Error(e) => Some(e),
            _ => None,
        }) {
            return Err(format!("wrapper body is malformed: {error}"));
        }

        let starts = tokens.first().and_then(Token::keyword) == Some(Keyword::Begin);
        let catches = tokens.iter().any(|t| t.keyword() == Some(Keyword::Exception));
        let ends = tokens
            .iter()
            .rev()
            .find(|t| t.kind != TokenKind::Semicolon)
            .and_then(Token::keyword)
            == Some(Keyword::End);
        if starts && catches && ends {
            Ok(())
        } else {
            Err(format!(
                "wrapper block ${delimiter}$ lacks BEGIN/EXCEPTION/END",
                delimiter = delimiter.trim_matches('$')
            ))
        }
    }
}

/// Validates `sql` with the default wrapper tag.
#[must_use]
pub fn validate(sql: &str) -> ValidationReport {
    Validator::default().validate(sql)
}

/// Validates `sql` and checks it holds `expected` statements.
#[must_use]
pub fn validate_against(sql: &str, expected: usize) -> ValidationReport {
    Validator::default().validate_against(sql, expected)
}

#[cfg(test)]
mod tests {
    use super::*;

    const WRAPPED: &str = "DO $pg_idempotent$\nBEGIN\nCREATE TYPE t AS ENUM ('a');\nEXCEPTION\n    WHEN duplicate_object THEN\n        NULL;\nEND\n$pg_idempotent$;";

    #[test]
    fn test_valid_script() {
        let sql = format!("CREATE TABLE IF NOT EXISTS t (id int);\n{WRAPPED}\n");
        let report = validate_against(&sql, 2);
        assert!(report.valid, "{:?}", report.issues);
    }

    #[test]
    fn test_unterminated_string() {
        let report = validate("SELECT 1;\nSELECT 'open;");
        assert!(!report.valid);
        assert_eq!(report.issues.len(), 1);
        assert!(report.issues[0].starts_with("Statement 2: Unterminated"));
    }

    #[test]
    fn test_count_mismatch() {
        let report = validate_against("SELECT 1; SELECT 2;", 3);
        assert_eq!(
            report.issues,
            vec!["Statement count changed: expected 3, found 2".to_string()]
        );
    }

    #[test]
    fn test_broken_wrapper() {
        let report = validate("DO $pg_idempotent$ BEGIN CREATE TYPE t AS (a int); END $pg_idempotent$;");
        assert!(!report.valid);
        assert!(report.issues[0].contains("lacks BEGIN/EXCEPTION/END"));
    }

    #[test]
    fn test_foreign_do_blocks_are_not_inspected() {
        assert!(validate("DO $$ BEGIN PERFORM 1; END $$;").valid);
    }

    #[test]
    fn test_check_single() {
        let validator = Validator::default();
        assert!(validator.check_single(WRAPPED).is_ok());
        assert!(validator.check_single("SELECT 1; SELECT 2;").is_err());
        assert!(validator.check_single("SELECT $x$;").is_err());
    }
}
