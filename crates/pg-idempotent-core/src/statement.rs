//! Statement model.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::classifier::Classification;
use crate::error::{SplitError, StatementError};
use crate::lexer::Span;

/// The kind of a SQL statement, as far as idempotency is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StatementType {
    CreateTable,
    CreateIndex,
    CreateIndexConcurrently,
    CreateType,
    CreateDomain,
    CreateFunction,
    CreateProcedure,
    CreateView,
    CreateMaterializedView,
    CreateTrigger,
    CreatePolicy,
    CreateExtension,
    CreateSchema,
    CreateSequence,
    CreateDatabase,
    AlterTableAddColumn,
    AlterTableAddConstraint,
    AlterTableDropColumn,
    AlterTableDropConstraint,
    AlterTypeAddValue,
    Drop,
    DoBlock,
    /// Recognized statements with no idempotent form: DML, session and
    /// transaction control, grants, comments, other `ALTER` actions.
    Other,
    /// Anything the classifier does not recognize.
    Unknown,
}

impl StatementType {
    /// Returns the display label, e.g. `CREATE TABLE`.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CreateTable => "CREATE TABLE",
            Self::CreateIndex => "CREATE INDEX",
            Self::CreateIndexConcurrently => "CREATE INDEX CONCURRENTLY",
            Self::CreateType => "CREATE TYPE",
            Self::CreateDomain => "CREATE DOMAIN",
            Self::CreateFunction => "CREATE FUNCTION",
            Self::CreateProcedure => "CREATE PROCEDURE",
            Self::CreateView => "CREATE VIEW",
            Self::CreateMaterializedView => "CREATE MATERIALIZED VIEW",
            Self::CreateTrigger => "CREATE TRIGGER",
            Self::CreatePolicy => "CREATE POLICY",
            Self::CreateExtension => "CREATE EXTENSION",
            Self::CreateSchema => "CREATE SCHEMA",
            Self::CreateSequence => "CREATE SEQUENCE",
            Self::CreateDatabase => "CREATE DATABASE",
            Self::AlterTableAddColumn => "ALTER TABLE ADD COLUMN",
            Self::AlterTableAddConstraint => "ALTER TABLE ADD CONSTRAINT",
            Self::AlterTableDropColumn => "ALTER TABLE DROP COLUMN",
            Self::AlterTableDropConstraint => "ALTER TABLE DROP CONSTRAINT",
            Self::AlterTypeAddValue => "ALTER TYPE ADD VALUE",
            Self::Drop => "DROP",
            Self::DoBlock => "DO",
            Self::Other => "OTHER",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Returns true for data-definition kinds that name an object.
    #[must_use]
    pub const fn is_ddl(&self) -> bool {
        !matches!(self, Self::DoBlock | Self::Other | Self::Unknown)
    }
}

impl fmt::Display for StatementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for StatementType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Where a statement stands with respect to idempotency.
///
/// Exactly one holds for every statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatementStatus {
    /// Already guarded; left as written.
    AlreadyIdempotent,
    /// Not guarded, and a rewrite strategy applies.
    NeedsTransform,
    /// Not guarded, and left unchanged.
    CannotTransform,
    /// Splitting or rewriting failed.
    Error,
}

impl fmt::Display for StatementStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::AlreadyIdempotent => "idempotent",
            Self::NeedsTransform => "needs transform",
            Self::CannotTransform => "cannot transform",
            Self::Error => "error",
        })
    }
}

/// One statement of a script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Statement {
    /// Exact source text.
    pub raw_text: String,
    /// Location of `raw_text` in the script.
    pub span: Span,
    pub statement_type: StatementType,
    /// Qualified, unquoted name of the affected object.
    pub object_name: Option<String>,
    /// Column, constraint or enum label for member-level DDL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member_name: Option<String>,
    pub is_idempotent: bool,
    pub can_be_wrapped: bool,
    pub error: Option<StatementError>,
    /// Rewritten text; equals `raw_text` when nothing changed.
    pub transformed_text: String,
    /// Byte offset in `raw_text` where a guard clause is inserted.
    #[serde(skip)]
    pub(crate) guard_offset: Option<usize>,
    #[serde(skip)]
    pub(crate) mixed_actions: bool,
}

impl Statement {
    pub(crate) fn classified(
        raw_text: &str,
        span: Span,
        classification: Classification,
        can_be_wrapped: bool,
    ) -> Self {
        Self {
            raw_text: raw_text.to_string(),
            span,
            statement_type: classification.statement_type,
            object_name: classification.object_name,
            member_name: classification.member_name,
            is_idempotent: classification.is_idempotent,
            can_be_wrapped,
            error: None,
            transformed_text: raw_text.to_string(),
            guard_offset: classification.guard_offset,
            mixed_actions: classification.mixed_actions,
        }
    }

    /// An unsplittable remainder of a script.
    pub(crate) fn faulted(raw_text: &str, span: Span, fault: SplitError) -> Self {
        Self {
            raw_text: raw_text.to_string(),
            span,
            statement_type: StatementType::Unknown,
            object_name: None,
            member_name: None,
            is_idempotent: false,
            can_be_wrapped: false,
            error: Some(fault.into()),
            transformed_text: raw_text.to_string(),
            guard_offset: None,
            mixed_actions: false,
        }
    }

    /// Returns the statement's idempotency status.
    #[must_use]
    pub const fn status(&self) -> StatementStatus {
        if self.error.is_some() {
            StatementStatus::Error
        } else if self.is_idempotent {
            StatementStatus::AlreadyIdempotent
        } else if self.can_be_wrapped {
            StatementStatus::NeedsTransform
        } else {
            StatementStatus::CannotTransform
        }
    }

    /// Returns true if the rewritten text differs from the source.
    #[must_use]
    pub fn is_changed(&self) -> bool {
        self.transformed_text != self.raw_text
    }

    /// Returns true if the source text ends with `;`.
    #[must_use]
    pub fn is_terminated(&self) -> bool {
        self.raw_text.ends_with(';')
    }

    /// Returns a short label such as `CREATE TABLE public.users`.
    #[must_use]
    pub fn describe(&self) -> String {
        match &self.object_name {
            Some(name) => format!("{} {name}", self.statement_type),
            None => self.statement_type.to_string(),
        }
    }
}
