//! Idempotency rewriting.
//!
//! Each eligible statement kind maps to one [`Strategy`]. Native guards and
//! `OR REPLACE` insert a clause at the offset the classifier recorded; the
//! wrapper embeds the statement unchanged in a `DO` block that swallows
//! only the "already exists" conditions of that kind.

use crate::classifier::adds_primary_key;
use crate::config::TransformOptions;
use crate::error::RewriteError;
use crate::statement::{Statement, StatementType};

/// How a statement kind is made idempotent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Insert `IF NOT EXISTS` at the guard offset.
    IfNotExists,
    /// Insert `IF EXISTS` at the guard offset.
    IfExists,
    /// Insert `OR REPLACE` after `CREATE`.
    OrReplace,
    /// Wrap in a `DO` block catching the given error conditions.
    Wrap(&'static [&'static str]),
}

const DUPLICATE_OBJECT: &[&str] = &["duplicate_object"];
const DUPLICATE_COLUMN: &[&str] = &["duplicate_column"];
// Primary key and unique constraints also create an index relation.
const DUPLICATE_CONSTRAINT: &[&str] = &["duplicate_object", "duplicate_table"];
// A second primary key fails with "multiple primary keys" before the name
// is checked.
const DUPLICATE_PRIMARY_KEY: &[&str] =
    &["duplicate_object", "duplicate_table", "invalid_table_definition"];

impl Strategy {
    /// Returns the strategy for `kind`, if it has one.
    #[must_use]
    pub const fn for_kind(kind: StatementType) -> Option<Self> {
        Some(match kind {
            StatementType::CreateTable
            | StatementType::CreateIndex
            | StatementType::CreateSchema
            | StatementType::CreateExtension
            | StatementType::CreateSequence
            | StatementType::CreateMaterializedView => Self::IfNotExists,
            StatementType::Drop
            | StatementType::AlterTableDropColumn
            | StatementType::AlterTableDropConstraint => Self::IfExists,
            StatementType::CreateFunction
            | StatementType::CreateProcedure
            | StatementType::CreateView => Self::OrReplace,
            StatementType::CreateType
            | StatementType::CreateDomain
            | StatementType::CreatePolicy
            | StatementType::CreateTrigger => Self::Wrap(DUPLICATE_OBJECT),
            StatementType::AlterTableAddColumn => Self::Wrap(DUPLICATE_COLUMN),
            StatementType::AlterTableAddConstraint => Self::Wrap(DUPLICATE_CONSTRAINT),
            _ => return None,
        })
    }
}

/// Produces the idempotent form of single statements.
#[derive(Debug, Clone, Copy)]
pub struct Rewriter<'a> {
    options: &'a TransformOptions,
}

impl<'a> Rewriter<'a> {
    #[must_use]
    pub const fn new(options: &'a TransformOptions) -> Self {
        Self { options }
    }

    /// Rewrites `statement`, returning the new text.
    ///
    /// # Errors
    ///
    /// Returns [`RewriteError`] if the kind has no strategy, the guard
    /// clause has nowhere to go, or a re-run could not be recognised.
    pub fn rewrite(&self, statement: &Statement) -> Result<String, RewriteError> {
        let kind = statement.statement_type;
        let strategy = Strategy::for_kind(kind).ok_or(RewriteError::NoStrategy(kind))?;
        if statement.mixed_actions {
            return Err(RewriteError::MixedActions(kind));
        }
        match strategy {
            Strategy::IfNotExists => {
                if kind == StatementType::CreateIndex && statement.object_name.is_none() {
                    return Err(RewriteError::UnnamedIndex);
                }
                insert_at(statement, " IF NOT EXISTS")
            }
            Strategy::IfExists => insert_at(statement, " IF EXISTS"),
            Strategy::OrReplace => insert_at(statement, " OR REPLACE"),
            Strategy::Wrap(_) if kind == StatementType::AlterTableAddConstraint => {
                if statement.member_name.is_none() {
                    return Err(RewriteError::UnnamedConstraint);
                }
                let conditions = if adds_primary_key(&statement.raw_text) {
                    DUPLICATE_PRIMARY_KEY
                } else {
                    DUPLICATE_CONSTRAINT
                };
                Ok(self.wrap(statement, conditions))
            }
            Strategy::Wrap(conditions) => Ok(self.wrap(statement, conditions)),
        }
    }

    fn wrap(&self, statement: &Statement, conditions: &[&str]) -> String {
        let raw = statement.raw_text.as_str();
        let tag = unique_tag(&self.options.wrapper_tag, raw);

        let mut out = String::with_capacity(raw.len() + 128);
        out.push_str(&format!("DO ${tag}$\nBEGIN\n"));
        out.push_str(raw);
        if !statement.is_terminated() {
            out.push(';');
        }
        out.push_str("\nEXCEPTION\n");
        out.push_str(&format!("    WHEN {} THEN\n", conditions.join(" OR ")));
        if self.options.emit_notices {
            let notice = format!("{} already exists, skipping", subject(statement));
            out.push_str(&format!("        RAISE NOTICE '{}';\n", escape_notice(&notice)));
        } else {
            out.push_str("        NULL;\n");
        }
        out.push_str(&format!("END\n${tag}$"));
        if statement.is_terminated() {
            out.push(';');
        }
        out
    }
}

fn insert_at(statement: &Statement, clause: &str) -> Result<String, RewriteError> {
    let raw = statement.raw_text.as_str();
    let offset = statement
        .guard_offset
        .filter(|&offset| raw.is_char_boundary(offset))
        .ok_or(RewriteError::MissingAnchor(statement.statement_type))?;
    Ok(format!("{}{clause}{}", &raw[..offset], &raw[offset..]))
}

/// `tag`, or `tag_1`, `tag_2`, ... whichever does not occur as `$tag$` in
/// `body`.
fn unique_tag(tag: &str, body: &str) -> String {
    let mut candidate = tag.to_string();
    let mut n = 1;
    while body.contains(&format!("${candidate}$")) {
        candidate = format!("{tag}_{n}");
        n += 1;
    }
    candidate
}

/// What the NOTICE names, e.g. `CREATE TYPE mood`.
fn subject(statement: &Statement) -> String {
    match (&statement.member_name, &statement.object_name) {
        (Some(member), Some(object)) => {
            format!("{} {member} on {object}", statement.statement_type)
        }
        _ => statement.describe(),
    }
}

/// Makes `text` safe inside a single-quoted `RAISE` format string.
fn escape_notice(text: &str) -> String {
    text.replace('\'', "''").replace('%', "%%")
}
