//! Wrap eligibility policy.

use crate::statement::StatementType;

/// Whether a statement kind may be rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WrapEligibility {
    Eligible,
    Ineligible {
        /// Why the statement is left as written.
        reason: &'static str,
    },
}

impl WrapEligibility {
    #[must_use]
    pub const fn is_eligible(&self) -> bool {
        matches!(self, Self::Eligible)
    }

    /// The reason, when ineligible.
    #[must_use]
    pub const fn reason(&self) -> Option<&'static str> {
        match self {
            Self::Eligible => None,
            Self::Ineligible { reason } => Some(reason),
        }
    }
}

/// Decides whether statements of `kind` may be rewritten.
#[must_use]
pub const fn wrap_eligibility(kind: StatementType) -> WrapEligibility {
    let reason = match kind {
        StatementType::CreateIndexConcurrently => {
            "CREATE INDEX CONCURRENTLY cannot run inside a procedural block (non-transactional)"
        }
        StatementType::AlterTypeAddValue => {
            "ALTER TYPE ... ADD VALUE cannot be used inside a transaction-guarded block before commit"
        }
        StatementType::CreateDatabase => "CREATE DATABASE cannot run inside a transaction block",
        StatementType::DoBlock | StatementType::Other => "statement kind has no idempotent form",
        StatementType::Unknown => "unrecognized statement kind",
        _ => return WrapEligibility::Eligible,
    };
    WrapEligibility::Ineligible { reason }
}
