//! Token types for the statement tokenizer.

use super::Span;

/// PostgreSQL keywords the classifier cares about.
///
/// Anything else tokenizes as an identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    // Statement verbs
    Create,
    Alter,
    Drop,
    Do,
    Select,
    Insert,
    Update,
    Delete,
    With,
    Set,
    Reset,
    Begin,
    Start,
    Commit,
    End,
    Rollback,
    Savepoint,
    Release,
    Grant,
    Revoke,
    Comment,
    Truncate,
    Copy,

    // Guards
    Or,
    Replace,
    If,
    Not,
    Exists,

    // Object kinds
    Table,
    Index,
    Type,
    Domain,
    Function,
    Procedure,
    View,
    Materialized,
    Trigger,
    Policy,
    Extension,
    Schema,
    Sequence,
    Database,
    Column,
    Constraint,
    Value,

    // Multi-word object kinds
    Foreign,
    Data,
    Wrapper,
    Event,
    Text,
    Search,
    Access,
    Method,
    Operator,
    Class,
    Family,
    User,
    Mapping,
    Owned,

    // Modifiers
    Global,
    Local,
    Temp,
    Temporary,
    Unlogged,
    Unique,
    Concurrently,
    Recursive,
    Only,
    Authorization,
    Add,
    On,
    Language,
    Exception,

    // Constraint kinds
    Primary,
    Check,
    Exclude,
}

impl Keyword {
    /// Attempts to parse a keyword from a string (case-insensitive).
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "CREATE" => Some(Self::Create),
            "ALTER" => Some(Self::Alter),
            "DROP" => Some(Self::Drop),
            "DO" => Some(Self::Do),
            "SELECT" => Some(Self::Select),
            "INSERT" => Some(Self::Insert),
            "UPDATE" => Some(Self::Update),
            "DELETE" => Some(Self::Delete),
            "WITH" => Some(Self::With),
            "SET" => Some(Self::Set),
            "RESET" => Some(Self::Reset),
            "BEGIN" => Some(Self::Begin),
            "START" => Some(Self::Start),
            "COMMIT" => Some(Self::Commit),
            "END" => Some(Self::End),
            "ROLLBACK" => Some(Self::Rollback),
            "SAVEPOINT" => Some(Self::Savepoint),
            "RELEASE" => Some(Self::Release),
            "GRANT" => Some(Self::Grant),
            "REVOKE" => Some(Self::Revoke),
            "COMMENT" => Some(Self::Comment),
            "TRUNCATE" => Some(Self::Truncate),
            "COPY" => Some(Self::Copy),
            "OR" => Some(Self::Or),
            "REPLACE" => Some(Self::Replace),
            "IF" => Some(Self::If),
            "NOT" => Some(Self::Not),
            "EXISTS" => Some(Self::Exists),
            "TABLE" => Some(Self::Table),
            "INDEX" => Some(Self::Index),
            "TYPE" => Some(Self::Type),
            "DOMAIN" => Some(Self::Domain),
            "FUNCTION" => Some(Self::Function),
            "PROCEDURE" => Some(Self::Procedure),
            "VIEW" => Some(Self::View),
            "MATERIALIZED" => Some(Self::Materialized),
            "TRIGGER" => Some(Self::Trigger),
            "POLICY" => Some(Self::Policy),
            "EXTENSION" => Some(Self::Extension),
            "SCHEMA" => Some(Self::Schema),
            "SEQUENCE" => Some(Self::Sequence),
            "DATABASE" => Some(Self::Database),
            "COLUMN" => Some(Self::Column),
            "CONSTRAINT" => Some(Self::Constraint),
            "VALUE" => Some(Self::Value),
            "FOREIGN" => Some(Self::Foreign),
            "DATA" => Some(Self::Data),
            "WRAPPER" => Some(Self::Wrapper),
            "EVENT" => Some(Self::Event),
            "TEXT" => Some(Self::Text),
            "SEARCH" => Some(Self::Search),
            "ACCESS" => Some(Self::Access),
            "METHOD" => Some(Self::Method),
            "OPERATOR" => Some(Self::Operator),
            "CLASS" => Some(Self::Class),
            "FAMILY" => Some(Self::Family),
            "USER" => Some(Self::User),
            "MAPPING" => Some(Self::Mapping),
            "OWNED" => Some(Self::Owned),
            "GLOBAL" => Some(Self::Global),
            "LOCAL" => Some(Self::Local),
            "TEMP" => Some(Self::Temp),
            "TEMPORARY" => Some(Self::Temporary),
            "UNLOGGED" => Some(Self::Unlogged),
            "UNIQUE" => Some(Self::Unique),
            "CONCURRENTLY" => Some(Self::Concurrently),
            "RECURSIVE" => Some(Self::Recursive),
            "ONLY" => Some(Self::Only),
            "AUTHORIZATION" => Some(Self::Authorization),
            "ADD" => Some(Self::Add),
            "ON" => Some(Self::On),
            "LANGUAGE" => Some(Self::Language),
            "EXCEPTION" => Some(Self::Exception),
            "PRIMARY" => Some(Self::Primary),
            "CHECK" => Some(Self::Check),
            "EXCLUDE" => Some(Self::Exclude),
            _ => None,
        }
    }
}

/// The kind of token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// SQL keyword
    Keyword(Keyword),
    /// Unquoted identifier, as written
    Identifier(String),
    /// `"quoted"` identifier, with `""` unescaped
    QuotedIdentifier(String),
    /// String literal value, with escapes resolved
    String(String),
    /// Dollar-quoted string; holds the full delimiter (`$$`, `$tag$`)
    DollarString(String),
    /// Numeric literal
    Number,
    /// .
    Dot,
    /// ,
    Comma,
    /// (
    LeftParen,
    /// )
    RightParen,
    /// ;
    Semicolon,
    /// Any other operator or punctuation character
    Symbol(char),
    /// Unterminated quoted construct
    Error(crate::error::SplitError),
    /// End of input
    Eof,
}

/// A token with its location in the statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The kind of token.
    pub kind: TokenKind,
    /// Location of the token.
    pub span: Span,
}

impl Token {
    /// Creates a new token.
    #[must_use]
    pub const fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Returns the keyword, if this token is one.
    #[must_use]
    pub const fn keyword(&self) -> Option<Keyword> {
        match &self.kind {
            TokenKind::Keyword(k) => Some(*k),
            _ => None,
        }
    }

    /// Returns true if this is the end-of-input token.
    #[must_use]
    pub const fn is_eof(&self) -> bool {
        matches!(self.kind, TokenKind::Eof)
    }
}
