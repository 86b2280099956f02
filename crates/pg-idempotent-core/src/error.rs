//! Error types for splitting, rewriting and configuring the transformer.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::statement::StatementType;

/// A quoted or commented construct the splitter can leave open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Construct {
    /// A `'...'` or `E'...'` string literal.
    StringLiteral,
    /// A `"..."` quoted identifier.
    QuotedIdentifier,
    /// A `/* ... */` comment.
    BlockComment,
    /// A dollar-quoted body, carrying its full delimiter (e.g. `$body$`).
    DollarQuoted(String),
}

impl fmt::Display for Construct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StringLiteral => f.write_str("string literal"),
            Self::QuotedIdentifier => f.write_str("quoted identifier"),
            Self::BlockComment => f.write_str("block comment"),
            Self::DollarQuoted(delimiter) => write!(f, "dollar-quoted body {delimiter}"),
        }
    }
}

/// Errors raised while splitting a script into statements.
///
/// These are fatal: nothing after the break can be trusted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SplitError {
    /// Input ended inside a string, identifier, comment or dollar body.
    #[error("Unterminated {construct} starting at byte {offset}")]
    Unterminated {
        /// The construct left open.
        construct: Construct,
        /// Byte offset of the opening delimiter.
        offset: usize,
    },
}

impl SplitError {
    /// Creates an "unterminated construct" error.
    #[must_use]
    pub const fn unterminated(construct: Construct, offset: usize) -> Self {
        Self::Unterminated { construct, offset }
    }
}

/// Errors raised while rewriting a single statement.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RewriteError {
    /// `CREATE INDEX` without a name cannot take `IF NOT EXISTS`.
    #[error("Index has no name; IF NOT EXISTS requires a named index")]
    UnnamedIndex,

    /// A constraint added without a name gets a fresh generated name on
    /// every run, so no error condition marks it as already present.
    #[error("Constraint has no name; a re-run would add a duplicate")]
    UnnamedConstraint,

    /// Later `ALTER TABLE` actions need guards the first action's strategy
    /// does not provide.
    #[error("{0} statement has further actions that cannot be guarded; split it or guard each action")]
    MixedActions(StatementType),

    /// No rewrite strategy exists for this statement kind.
    #[error("No idempotency strategy for {0}")]
    NoStrategy(StatementType),

    /// The classifier did not record where the guard clause goes.
    #[error("Could not locate the guard position in {0} statement")]
    MissingAnchor(StatementType),

    /// The rewritten text did not re-split into exactly one statement.
    #[error("Rewritten statement is malformed: {reason}")]
    Malformed {
        /// What the structural check found.
        reason: String,
    },
}

/// An error attached to one statement.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StatementError {
    /// The statement could not be split out of the script.
    #[error(transparent)]
    Split(#[from] SplitError),

    /// The statement was classified but its rewrite failed.
    #[error(transparent)]
    Rewrite(#[from] RewriteError),
}

impl StatementError {
    /// Returns true if this error blocks the whole script.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Split(_))
    }
}

impl Serialize for StatementError {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Invalid transformer configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// The wrapper tag is not usable between `$` delimiters.
    #[error("Invalid wrapper tag '{0}': expected a letter or underscore followed by letters, digits or underscores")]
    InvalidWrapperTag(String),
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_error_message() {
        let err = SplitError::unterminated(Construct::DollarQuoted("$tag$".into()), 27);
        assert_eq!(
            err.to_string(),
            "Unterminated dollar-quoted body $tag$ starting at byte 27"
        );
    }

    #[test]
    fn test_fatality() {
        let split: StatementError = SplitError::unterminated(Construct::StringLiteral, 0).into();
        let rewrite: StatementError = RewriteError::UnnamedIndex.into();
        assert!(split.is_fatal());
        assert!(!rewrite.is_fatal());
    }

    #[test]
    fn test_statement_error_serializes_as_message() {
        let err: StatementError = RewriteError::UnnamedIndex.into();
        let json = serde_json::to_string(&err).unwrap();
        assert_eq!(
            json,
            "\"Index has no name; IF NOT EXISTS requires a named index\""
        );
    }
}
