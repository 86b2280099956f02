//! Statement classification.
//!
//! Matches the leading keywords of a statement against the DDL shapes the
//! rewriter knows, extracts the target object name and detects existing
//! guards. Only the first [`LOOKAHEAD`] tokens are read; everything after
//! them (column lists, function bodies, ...) is opaque.

use crate::lexer::{Keyword, Lexer, Token, TokenKind};
use crate::statement::StatementType;

/// Maximum number of leading tokens inspected per statement.
pub const LOOKAHEAD: usize = 32;

/// What the classifier learned about one statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub statement_type: StatementType,
    pub object_name: Option<String>,
    pub member_name: Option<String>,
    pub is_idempotent: bool,
    /// Byte offset where `IF [NOT] EXISTS` or `OR REPLACE` is inserted.
    pub guard_offset: Option<usize>,
    /// An `ALTER TABLE` whose later actions need guards that neither the
    /// guard clause nor the wrapper of its first action provides.
    pub mixed_actions: bool,
}

impl Classification {
    const fn bare(statement_type: StatementType) -> Self {
        Self {
            statement_type,
            object_name: None,
            member_name: None,
            is_idempotent: false,
            guard_offset: None,
            mixed_actions: false,
        }
    }

    const fn other() -> Self {
        Self::bare(StatementType::Other)
    }

    const fn unknown() -> Self {
        Self::bare(StatementType::Unknown)
    }
}

/// Classifies one statement.
///
/// `wrapper_tag` is the dollar tag of generated `DO` blocks; a `DO` block
/// using it counts as already idempotent.
#[must_use]
pub fn classify(text: &str, wrapper_tag: &str) -> Classification {
    Classifier::new(text, wrapper_tag).classify()
}

/// Returns true if the first `ADD` of `text` adds a primary key.
pub(crate) fn adds_primary_key(text: &str) -> bool {
    let classifier = Classifier::new(text, "");
    let Some(add) = (0..classifier.tokens.len()).find(|&i| classifier.is(i, Keyword::Add)) else {
        return false;
    };
    let constraint = if classifier.is(add + 1, Keyword::Constraint) { add + 3 } else { add + 1 };
    classifier.is(constraint, Keyword::Primary)
}

/// How one `ALTER TABLE` action behaves when the statement runs twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    /// Carries its own guard, or is harmless to repeat.
    Guarded,
    /// Unguarded `ADD COLUMN`; fails with `duplicate_column`.
    AddColumn,
    /// Unguarded `ADD` of a constraint or `DROP`.
    Unguarded,
}

struct Classifier<'a> {
    text: &'a str,
    tokens: Vec<Token>,
    wrapper_tag: &'a str,
}

impl<'a> Classifier<'a> {
    fn new(text: &'a str, wrapper_tag: &'a str) -> Self {
        Self {
            text,
            tokens: Lexer::new(text).take(LOOKAHEAD).collect(),
            wrapper_tag,
        }
    }

    fn kind(&self, i: usize) -> Option<&TokenKind> {
        self.tokens.get(i).map(|t| &t.kind)
    }

    fn kw(&self, i: usize) -> Option<Keyword> {
        self.tokens.get(i).and_then(Token::keyword)
    }

    fn is(&self, i: usize, keyword: Keyword) -> bool {
        self.kw(i) == Some(keyword)
    }

    fn end(&self, i: usize) -> Option<usize> {
        self.tokens.get(i).map(|t| t.span.end)
    }

    /// Number of tokens taken by `IF NOT EXISTS` at `i` (0 or 3).
    fn if_not_exists_len(&self, i: usize) -> usize {
        if self.is(i, Keyword::If) && self.is(i + 1, Keyword::Not) && self.is(i + 2, Keyword::Exists)
        {
            3
        } else {
            0
        }
    }

    /// Number of tokens taken by `IF EXISTS` at `i` (0 or 2).
    fn if_exists_len(&self, i: usize) -> usize {
        if self.is(i, Keyword::If) && self.is(i + 1, Keyword::Exists) {
            2
        } else {
            0
        }
    }

    /// One identifier, unquoted. Non-reserved keywords are valid names.
    fn name_part(&self, i: usize) -> Option<String> {
        let token = self.tokens.get(i)?;
        match &token.kind {
            TokenKind::Identifier(name) | TokenKind::QuotedIdentifier(name) => Some(name.clone()),
            TokenKind::Keyword(_) => Some(token.span.slice(self.text).to_string()),
            _ => None,
        }
    }

    /// A possibly schema-qualified name at `i`, and the index after it.
    fn qualified_name(&self, i: usize) -> Option<(String, usize)> {
        let mut name = self.name_part(i)?;
        let mut next = i + 1;
        while matches!(self.kind(next), Some(TokenKind::Dot)) {
            let Some(part) = self.name_part(next + 1) else {
                break;
            };
            name.push('.');
            name.push_str(&part);
            next += 2;
        }
        Some((name, next))
    }

    fn name_at(&self, i: usize) -> Option<String> {
        self.qualified_name(i).map(|(name, _)| name)
    }

    fn classify(&self) -> Classification {
        match self.kw(0) {
            Some(Keyword::Create) => self.classify_create(),
            Some(Keyword::Alter) => self.classify_alter(),
            Some(Keyword::Drop) => self.classify_drop(),
            Some(Keyword::Do) => self.classify_do(),
            Some(
                Keyword::Select
                | Keyword::Insert
                | Keyword::Update
                | Keyword::Delete
                | Keyword::With
                | Keyword::Set
                | Keyword::Reset
                | Keyword::Begin
                | Keyword::Start
                | Keyword::Commit
                | Keyword::End
                | Keyword::Rollback
                | Keyword::Savepoint
                | Keyword::Release
                | Keyword::Grant
                | Keyword::Revoke
                | Keyword::Comment
                | Keyword::Truncate
                | Keyword::Copy,
            ) => Classification::other(),
            _ => Classification::unknown(),
        }
    }

    fn classify_create(&self) -> Classification {
        let or_replace = self.is(1, Keyword::Or) && self.is(2, Keyword::Replace);
        let mut i = if or_replace { 3 } else { 1 };
        while matches!(
            self.kw(i),
            Some(
                Keyword::Global
                    | Keyword::Local
                    | Keyword::Temp
                    | Keyword::Temporary
                    | Keyword::Unlogged
                    | Keyword::Unique
                    | Keyword::Recursive
                    | Keyword::Constraint
            )
        ) {
            i += 1;
        }

        match self.kw(i) {
            Some(Keyword::Table) => self.native_guard(StatementType::CreateTable, i, or_replace),
            Some(Keyword::Index) => {
                if self.is(i + 1, Keyword::Concurrently) {
                    self.create_index(StatementType::CreateIndexConcurrently, i + 1)
                } else {
                    self.create_index(StatementType::CreateIndex, i)
                }
            }
            Some(Keyword::Materialized) if self.is(i + 1, Keyword::View) => {
                self.native_guard(StatementType::CreateMaterializedView, i + 1, false)
            }
            Some(Keyword::Sequence) => self.native_guard(StatementType::CreateSequence, i, false),
            Some(Keyword::Extension) => {
                self.native_guard(StatementType::CreateExtension, i, false)
            }
            Some(Keyword::Schema) => self.create_schema(i),
            Some(Keyword::Function) => self.replaceable(StatementType::CreateFunction, i, or_replace),
            Some(Keyword::Procedure) => {
                self.replaceable(StatementType::CreateProcedure, i, or_replace)
            }
            Some(Keyword::View) => self.replaceable(StatementType::CreateView, i, or_replace),
            Some(Keyword::Trigger) => self.named(StatementType::CreateTrigger, i, or_replace),
            Some(Keyword::Type) => self.named(StatementType::CreateType, i, false),
            Some(Keyword::Domain) => self.named(StatementType::CreateDomain, i, false),
            Some(Keyword::Policy) => self.named(StatementType::CreatePolicy, i, false),
            Some(Keyword::Database) => self.named(StatementType::CreateDatabase, i, false),
            _ => Classification::unknown(),
        }
    }

    /// `CREATE ... <kind> [IF NOT EXISTS] name`, guard goes after `<kind>`.
    fn native_guard(&self, kind: StatementType, kw: usize, already: bool) -> Classification {
        let guard = self.if_not_exists_len(kw + 1);
        Classification {
            statement_type: kind,
            object_name: self.name_at(kw + 1 + guard),
            member_name: None,
            is_idempotent: already || guard > 0,
            guard_offset: self.end(kw),
            mixed_actions: false,
        }
    }

    fn create_index(&self, kind: StatementType, kw: usize) -> Classification {
        let guard = self.if_not_exists_len(kw + 1);
        let name_idx = kw + 1 + guard;
        let object_name = if self.is(name_idx, Keyword::On) {
            None
        } else {
            self.name_at(name_idx)
        };
        Classification {
            statement_type: kind,
            object_name,
            member_name: None,
            is_idempotent: guard > 0,
            guard_offset: self.end(kw),
            mixed_actions: false,
        }
    }

    fn create_schema(&self, kw: usize) -> Classification {
        let guard = self.if_not_exists_len(kw + 1);
        let mut name_idx = kw + 1 + guard;
        if self.is(name_idx, Keyword::Authorization) {
            name_idx += 1;
        }
        Classification {
            statement_type: StatementType::CreateSchema,
            object_name: self.name_at(name_idx),
            member_name: None,
            is_idempotent: guard > 0,
            guard_offset: self.end(kw),
            mixed_actions: false,
        }
    }

    /// `CREATE [OR REPLACE] <kind> name`, guard goes after `CREATE`.
    fn replaceable(&self, kind: StatementType, kw: usize, or_replace: bool) -> Classification {
        Classification {
            statement_type: kind,
            object_name: self.name_at(kw + 1),
            member_name: None,
            is_idempotent: or_replace,
            guard_offset: self.end(0),
            mixed_actions: false,
        }
    }

    /// Kinds without a guard clause; rewritten by wrapping, if at all.
    fn named(&self, kind: StatementType, kw: usize, already: bool) -> Classification {
        Classification {
            statement_type: kind,
            object_name: self.name_at(kw + 1),
            member_name: None,
            is_idempotent: already,
            guard_offset: None,
            mixed_actions: false,
        }
    }

    fn classify_alter(&self) -> Classification {
        match self.kw(1) {
            Some(Keyword::Table) => self.alter_table(),
            Some(Keyword::Type) => self.alter_type(),
            _ => Classification::other(),
        }
    }

    fn alter_table(&self) -> Classification {
        let mut i = 2 + self.if_exists_len(2);
        if self.is(i, Keyword::Only) {
            i += 1;
        }
        let Some((table, mut i)) = self.qualified_name(i) else {
            return Classification::other();
        };
        if matches!(self.kind(i), Some(TokenKind::Symbol('*'))) {
            i += 1;
        }

        let first = match self.kw(i) {
            Some(Keyword::Add) => self.alter_table_add(table, i + 1),
            Some(Keyword::Drop) => self.alter_table_drop(table, i),
            _ => return Classification::other(),
        };
        self.with_later_actions(first, i)
    }

    /// Folds the actions after the first comma-separated one into `first`.
    ///
    /// Every action is re-read, so the whole statement is tokenized here
    /// rather than only the first [`LOOKAHEAD`] tokens.
    fn with_later_actions(&self, mut first: Classification, action: usize) -> Classification {
        let full = Classifier {
            text: self.text,
            tokens: Lexer::new(self.text).collect(),
            wrapper_tag: self.wrapper_tag,
        };
        let later = full.later_actions(action);
        if later.iter().all(|a| *a == Action::Guarded) {
            return first;
        }
        first.is_idempotent = false;
        // A duplicate_column wrapper covers further ADD COLUMN actions.
        let wrappable = first.statement_type == StatementType::AlterTableAddColumn
            && !later.contains(&Action::Unguarded);
        first.mixed_actions = !wrappable;
        first
    }

    /// Actions after the top-level commas following token `from`.
    fn later_actions(&self, from: usize) -> Vec<Action> {
        let mut depth = 0usize;
        let mut actions = Vec::new();
        for (i, token) in self.tokens.iter().enumerate().skip(from) {
            match token.kind {
                TokenKind::LeftParen => depth += 1,
                TokenKind::RightParen => depth = depth.saturating_sub(1),
                TokenKind::Comma if depth == 0 => actions.push(self.action_at(i + 1)),
                _ => {}
            }
        }
        actions
    }

    fn action_at(&self, i: usize) -> Action {
        match self.kw(i) {
            Some(Keyword::Add) => {
                if matches!(
                    self.kw(i + 1),
                    Some(
                        Keyword::Constraint
                            | Keyword::Primary
                            | Keyword::Unique
                            | Keyword::Foreign
                            | Keyword::Check
                            | Keyword::Exclude
                    )
                ) {
                    return Action::Unguarded;
                }
                let column = if self.is(i + 1, Keyword::Column) { i + 2 } else { i + 1 };
                if self.if_not_exists_len(column) > 0 {
                    Action::Guarded
                } else {
                    Action::AddColumn
                }
            }
            Some(Keyword::Drop) => {
                let member = if matches!(self.kw(i + 1), Some(Keyword::Column | Keyword::Constraint)) {
                    i + 2
                } else {
                    i + 1
                };
                if self.if_exists_len(member) > 0 {
                    Action::Guarded
                } else {
                    Action::Unguarded
                }
            }
            // ALTER COLUMN, SET, OWNER TO, ... re-run cleanly
            _ => Action::Guarded,
        }
    }

    fn alter_table_add(&self, table: String, i: usize) -> Classification {
        match self.kw(i) {
            Some(Keyword::Constraint) => Classification {
                statement_type: StatementType::AlterTableAddConstraint,
                object_name: Some(table),
                member_name: self.name_part(i + 1),
                is_idempotent: false,
                guard_offset: None,
                mixed_actions: false,
            },
            Some(
                Keyword::Primary
                | Keyword::Unique
                | Keyword::Foreign
                | Keyword::Check
                | Keyword::Exclude,
            ) => Classification {
                statement_type: StatementType::AlterTableAddConstraint,
                object_name: Some(table),
                member_name: None,
                is_idempotent: false,
                guard_offset: None,
                mixed_actions: false,
            },
            _ => {
                let column = if self.is(i, Keyword::Column) { i + 1 } else { i };
                let guard = self.if_not_exists_len(column);
                Classification {
                    statement_type: StatementType::AlterTableAddColumn,
                    object_name: Some(table),
                    member_name: self.name_part(column + guard),
                    is_idempotent: guard > 0,
                    guard_offset: None,
                    mixed_actions: false,
                }
            }
        }
    }

    fn alter_table_drop(&self, table: String, drop: usize) -> Classification {
        let (kind, anchor) = match self.kw(drop + 1) {
            Some(Keyword::Constraint) => (StatementType::AlterTableDropConstraint, drop + 1),
            Some(Keyword::Column) => (StatementType::AlterTableDropColumn, drop + 1),
            _ => (StatementType::AlterTableDropColumn, drop),
        };
        let guard = self.if_exists_len(anchor + 1);
        Classification {
            statement_type: kind,
            object_name: Some(table),
            member_name: self.name_part(anchor + 1 + guard),
            is_idempotent: guard > 0,
            guard_offset: self.end(anchor),
            mixed_actions: false,
        }
    }

    fn alter_type(&self) -> Classification {
        let Some((name, i)) = self.qualified_name(2) else {
            return Classification::other();
        };
        if !(self.is(i, Keyword::Add) && self.is(i + 1, Keyword::Value)) {
            return Classification::other();
        }
        let guard = self.if_not_exists_len(i + 2);
        let member_name = match self.kind(i + 2 + guard) {
            Some(TokenKind::String(label)) => Some(label.clone()),
            _ => None,
        };
        Classification {
            statement_type: StatementType::AlterTypeAddValue,
            object_name: Some(name),
            member_name,
            is_idempotent: guard > 0,
            guard_offset: self.end(i + 1),
            mixed_actions: false,
        }
    }

    fn classify_drop(&self) -> Classification {
        if self.name_part(1).is_none() {
            return Classification::unknown();
        }
        let words = match self.kw(1) {
            // DROP OWNED BY takes no IF EXISTS
            Some(Keyword::Owned) => return Classification::other(),
            Some(Keyword::Materialized | Keyword::Event | Keyword::Access) => 2,
            Some(Keyword::Foreign) => {
                if self.is(2, Keyword::Data) {
                    3
                } else {
                    2
                }
            }
            Some(Keyword::Text) => 3,
            Some(Keyword::Operator)
                if matches!(self.kw(2), Some(Keyword::Class | Keyword::Family)) =>
            {
                2
            }
            Some(Keyword::User) if self.is(2, Keyword::Mapping) => 2,
            _ => 1,
        };

        let mut anchor = words;
        if self.is(anchor + 1, Keyword::Concurrently) {
            anchor += 1;
        }
        let guard = self.if_exists_len(anchor + 1);
        Classification {
            statement_type: StatementType::Drop,
            object_name: self.name_at(anchor + 1 + guard),
            member_name: None,
            is_idempotent: guard > 0,
            guard_offset: self.end(anchor),
            mixed_actions: false,
        }
    }

    fn classify_do(&self) -> Classification {
        let body = if self.is(1, Keyword::Language) { 3 } else { 1 };
        let is_idempotent = match self.kind(body) {
            Some(TokenKind::DollarString(delimiter)) => {
                let tag = delimiter.trim_matches('$');
                !self.wrapper_tag.is_empty() && tag.starts_with(self.wrapper_tag)
            }
            _ => false,
        };
        Classification {
            is_idempotent,
            ..Classification::bare(StatementType::DoBlock)
        }
    }
}
