//! Transformation pipeline.
//!
//! Splits a script, classifies each statement, rewrites the ones that need
//! it and splices the results back between the original inter-statement
//! text.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, warn};

use crate::classifier::classify;
use crate::config::TransformOptions;
use crate::error::RewriteError;
use crate::lexer::split;
use crate::policy::{WrapEligibility, wrap_eligibility};
use crate::rewriter::Rewriter;
use crate::statement::{Statement, StatementStatus, StatementType};
use crate::validator::{ValidationReport, Validator};

/// Outcome of transforming one script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransformationResult {
    /// False when the script could not be split; the output then holds
    /// everything from the break onwards unchanged.
    pub success: bool,
    pub statement_count: usize,
    /// Statements whose text changed.
    pub transformed_count: usize,
    /// Statements left unchanged that a re-run may still trip over.
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
    pub transformed_sql: String,
    pub statements: Vec<Statement>,
    /// Structural check of `transformed_sql`, when enabled.
    pub validation: Option<ValidationReport>,
}

impl TransformationResult {
    /// Aggregate counts over the transformed statements.
    #[must_use]
    pub fn summary(&self) -> StatisticsSummary {
        StatisticsSummary::from_statements(&self.statements)
    }
}

/// Aggregate counts over a script's statements.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatisticsSummary {
    pub total_statements: usize,
    pub already_idempotent: usize,
    pub transformable: usize,
    pub not_transformable: usize,
    pub errors: usize,
    /// Statement count per type label.
    pub by_type: BTreeMap<String, usize>,
}

impl StatisticsSummary {
    /// Counts statements by [`StatementStatus`] and type.
    #[must_use]
    pub fn from_statements(statements: &[Statement]) -> Self {
        let mut summary = Self {
            total_statements: statements.len(),
            ..Self::default()
        };
        for statement in statements {
            match statement.status() {
                StatementStatus::AlreadyIdempotent => summary.already_idempotent += 1,
                StatementStatus::NeedsTransform => summary.transformable += 1,
                StatementStatus::CannotTransform => summary.not_transformable += 1,
                StatementStatus::Error => summary.errors += 1,
            }
            *summary
                .by_type
                .entry(statement.statement_type.to_string())
                .or_default() += 1;
        }
        summary
    }
}

/// Turns DDL scripts into scripts that can be re-run.
#[derive(Debug, Clone, Default)]
pub struct Transformer {
    options: TransformOptions,
}

impl Transformer {
    /// Creates a transformer with default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn with_options(options: TransformOptions) -> Self {
        Self { options }
    }

    #[must_use]
    pub const fn options(&self) -> &TransformOptions {
        &self.options
    }

    /// Splits `sql` and classifies every statement, without rewriting.
    #[must_use]
    pub fn split_and_classify(&self, sql: &str) -> Vec<Statement> {
        split(sql)
            .into_iter()
            .map(|raw| {
                let text = raw.span.slice(sql);
                match raw.fault {
                    Some(fault) => Statement::faulted(text, raw.span, fault),
                    None => {
                        let classification = classify(text, &self.options.wrapper_tag);
                        let eligible =
                            wrap_eligibility(classification.statement_type).is_eligible();
                        Statement::classified(text, raw.span, classification, eligible)
                    }
                }
            })
            .collect()
    }

    /// Classification-only statistics.
    #[must_use]
    pub fn stats(&self, sql: &str) -> StatisticsSummary {
        StatisticsSummary::from_statements(&self.split_and_classify(sql))
    }

    /// Rewrites every statement of `sql` that is not idempotent yet.
    #[must_use]
    pub fn transform(&self, sql: &str) -> TransformationResult {
        let mut statements = self.split_and_classify(sql);
        let rewriter = Rewriter::new(&self.options);
        let validator = Validator::new(&self.options.wrapper_tag);

        let mut success = true;
        let mut warnings = Vec::new();
        let mut errors = Vec::new();

        for (i, statement) in statements.iter_mut().enumerate() {
            let n = i + 1;

            if let Some(error) = &statement.error {
                // Only the last statement can carry a split fault.
                warn!(statement = n, error = %error, "Cannot split script");
                errors.push(format!("Statement {n} ({}): {error}", statement.statement_type));
                success = false;
                continue;
            }

            if statement.is_idempotent {
                debug!(statement = n, kind = %statement.statement_type, "Already idempotent");
                continue;
            }

            if let WrapEligibility::Ineligible { reason } =
                wrap_eligibility(statement.statement_type)
            {
                skip_ineligible(n, statement, reason, &mut warnings);
                continue;
            }

            let rewritten = rewriter.rewrite(statement).and_then(|text| {
                validator
                    .check_single(&text)
                    .map(|()| text)
                    .map_err(|reason| RewriteError::Malformed { reason })
            });
            match rewritten {
                Ok(text) => {
                    debug!(statement = n, kind = %statement.statement_type, "Rewritten");
                    statement.transformed_text = text;
                }
                Err(e) => {
                    warn!(statement = n, error = %e, "Rewrite failed, keeping original text");
                    errors.push(format!("Statement {n} ({}): {e}", statement.describe()));
                    statement.error = Some(e.into());
                }
            }
        }

        let transformed_sql = reassemble(sql, &statements);
        let validation = (success && self.options.validate_output)
            .then(|| validator.validate_against(&transformed_sql, statements.len()));
        if let Some(report) = &validation {
            errors.extend(
                report
                    .issues
                    .iter()
                    .map(|issue| format!("Output validation: {issue}")),
            );
        }

        TransformationResult {
            success,
            statement_count: statements.len(),
            transformed_count: statements.iter().filter(|s| s.is_changed()).count(),
            warnings,
            errors,
            transformed_sql,
            statements,
            validation,
        }
    }
}

fn skip_ineligible(n: usize, statement: &Statement, reason: &str, warnings: &mut Vec<String>) {
    match statement.statement_type {
        StatementType::Unknown => {
            debug!(statement = n, "Unrecognized statement, leaving unchanged");
        }
        kind if kind.is_ddl() => {
            warn!(statement = n, kind = %kind, reason, "Statement cannot be wrapped");
            warnings.push(format!(
                "Statement {n} ({}) cannot be wrapped: {reason}",
                statement.describe()
            ));
        }
        _ => {}
    }
}

/// Splices each statement's text back between the original gaps.
fn reassemble(sql: &str, statements: &[Statement]) -> String {
    let mut out = String::with_capacity(sql.len() + statements.len() * 16);
    let mut cursor = 0;
    for statement in statements {
        out.push_str(&sql[cursor..statement.span.start]);
        out.push_str(&statement.transformed_text);
        cursor = statement.span.end;
    }
    out.push_str(&sql[cursor..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preserves_gaps() {
        let sql = "-- header\nCREATE TABLE a (id int);\n\n/* b */ CREATE TABLE b (id int); -- tail\n";
        let result = Transformer::new().transform(sql);
        assert!(result.success);
        assert_eq!(
            result.transformed_sql,
            "-- header\nCREATE TABLE IF NOT EXISTS a (id int);\n\n/* b */ CREATE TABLE IF NOT EXISTS b (id int); -- tail\n"
        );
        assert_eq!(result.transformed_count, 2);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn test_ineligible_ddl_warns() {
        let result = Transformer::new().transform("ALTER TYPE mood ADD VALUE 'happy';");
        assert!(result.success);
        assert_eq!(result.transformed_count, 0);
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].starts_with("Statement 1 (ALTER TYPE ADD VALUE mood) cannot be wrapped"));
    }

    #[test]
    fn test_other_and_unknown_are_silent() {
        let result = Transformer::new().transform("INSERT INTO t VALUES (1);\nVACUUM t;\nDO $$ BEGIN END $$;");
        assert!(result.success);
        assert!(result.warnings.is_empty());
        assert!(result.errors.is_empty());
        assert_eq!(result.transformed_count, 0);
    }

    #[test]
    fn test_rewrite_error_is_per_statement() {
        let sql = "CREATE INDEX ON t (c);\nCREATE TABLE t2 (id int);";
        let result = Transformer::new().transform(sql);
        assert!(result.success);
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].starts_with("Statement 1 (CREATE INDEX):"));
        assert_eq!(result.statements[0].status(), StatementStatus::Error);
        assert_eq!(
            result.transformed_sql,
            "CREATE INDEX ON t (c);\nCREATE TABLE IF NOT EXISTS t2 (id int);"
        );
    }

    #[test]
    fn test_fatal_split_keeps_remainder() {
        let sql = "CREATE TABLE a (id int);\nCREATE FUNCTION f() AS $body$ unterminated";
        let result = Transformer::new().transform(sql);
        assert!(!result.success);
        assert_eq!(result.statement_count, 2);
        assert!(result.validation.is_none());
        assert!(result.errors[0].contains("Unterminated dollar-quoted body $body$"));
        assert_eq!(
            result.transformed_sql,
            "CREATE TABLE IF NOT EXISTS a (id int);\nCREATE FUNCTION f() AS $body$ unterminated"
        );
    }

    #[test]
    fn test_validation_report_attached() {
        let result = Transformer::new().transform("CREATE TYPE t AS (a int);");
        let report = result.validation.unwrap();
        assert!(report.valid);

        let options = TransformOptions::new().without_validation();
        let result = Transformer::with_options(options).transform("CREATE TYPE t AS (a int);");
        assert!(result.validation.is_none());
    }

    #[test]
    fn test_summary() {
        let sql = "CREATE TABLE IF NOT EXISTS a (id int);\n\
                   CREATE TABLE b (id int);\n\
                   CREATE INDEX CONCURRENTLY i ON b (id);\n\
                   SELECT 1;";
        let summary = Transformer::new().stats(sql);
        assert_eq!(summary.total_statements, 4);
        assert_eq!(summary.already_idempotent, 1);
        assert_eq!(summary.transformable, 1);
        assert_eq!(summary.not_transformable, 2);
        assert_eq!(summary.errors, 0);
        assert_eq!(summary.by_type["CREATE TABLE"], 2);
        assert_eq!(summary.by_type["OTHER"], 1);
    }
}
