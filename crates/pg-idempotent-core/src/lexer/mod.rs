//! SQL lexing: statement splitting and statement tokenization.
//!
//! Both are hand-written scanners over the same quoting rules; neither is a
//! grammar. The splitter only needs statement boundaries and the tokenizer
//! only needs the leading keywords of one statement.

mod cursor;
mod span;
mod splitter;
mod token;
mod tokenizer;

pub use cursor::is_valid_dollar_tag;
pub use span::Span;
pub use splitter::{RawStatement, Splitter, split};
pub use token::{Keyword, Token, TokenKind};
pub use tokenizer::Lexer;
