//! # pg-idempotent-core
//!
//! Rewrites PostgreSQL DDL scripts so they can be run more than once.
//!
//! This crate provides:
//! - A statement splitter aware of strings, quoted identifiers, nested
//!   comments and dollar-quoted bodies
//! - A classifier that finds each statement's kind, target object and
//!   existing guards
//! - A rewriter adding `IF [NOT] EXISTS` or `OR REPLACE` where PostgreSQL
//!   supports them, and wrapping the rest in exception-tolerant `DO` blocks
//! - A validator re-checking the output structure
//!
//! ```rust
//! use pg_idempotent_core::transform;
//!
//! let result = transform("CREATE TABLE users (id int);\nCREATE TYPE mood AS ENUM ('ok');");
//!
//! assert!(result.success);
//! assert_eq!(result.transformed_count, 2);
//! assert!(result.transformed_sql.starts_with("CREATE TABLE IF NOT EXISTS users"));
//! assert!(result.transformed_sql.contains("WHEN duplicate_object THEN"));
//! ```
//!
//! Statements that cannot be made idempotent, such as
//! `CREATE INDEX CONCURRENTLY`, are left unchanged and reported in
//! [`TransformationResult::warnings`].

pub mod classifier;
pub mod config;
pub mod error;
pub mod lexer;
pub mod policy;
pub mod rewriter;
pub mod statement;
pub mod transformer;
pub mod validator;

pub use classifier::{Classification, classify};
pub use config::TransformOptions;
pub use error::{ConfigError, RewriteError, SplitError, StatementError};
pub use policy::{WrapEligibility, wrap_eligibility};
pub use rewriter::{Rewriter, Strategy};
pub use statement::{Statement, StatementStatus, StatementType};
pub use transformer::{StatisticsSummary, TransformationResult, Transformer};
pub use validator::{ValidationReport, Validator};

/// Transforms `sql` with default options.
#[must_use]
pub fn transform(sql: &str) -> TransformationResult {
    Transformer::new().transform(sql)
}

/// Classification-only statistics for `sql`.
#[must_use]
pub fn stats(sql: &str) -> StatisticsSummary {
    Transformer::new().stats(sql)
}

/// Checks the structure of already transformed `sql`.
#[must_use]
pub fn validate(sql: &str) -> ValidationReport {
    validator::validate(sql)
}

/// Per-statement classification of `sql`.
#[must_use]
pub fn split_and_classify(sql: &str) -> Vec<Statement> {
    Transformer::new().split_and_classify(sql)
}
