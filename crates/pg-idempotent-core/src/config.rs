//! Transformer configuration.

use serde::Serialize;

use crate::error::{ConfigError, Result};
use crate::lexer::is_valid_dollar_tag;

/// Default dollar tag of generated `DO` blocks.
pub const DEFAULT_WRAPPER_TAG: &str = "pg_idempotent";

/// Options controlling how scripts are rewritten.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransformOptions {
    /// Dollar tag of generated `DO` blocks, without the `$` delimiters.
    pub wrapper_tag: String,
    /// Whether the reassembled output is re-split and checked.
    pub validate_output: bool,
    /// Whether wrappers raise a NOTICE when they skip an existing object.
    pub emit_notices: bool,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl TransformOptions {
    /// Creates default options.
    #[must_use]
    pub fn new() -> Self {
        Self {
            wrapper_tag: DEFAULT_WRAPPER_TAG.to_string(),
            validate_output: true,
            emit_notices: true,
        }
    }

    /// Sets the wrapper tag.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidWrapperTag`] if `tag` cannot appear
    /// between `$` delimiters.
    pub fn with_wrapper_tag(mut self, tag: impl Into<String>) -> Result<Self> {
        let tag = tag.into();
        if !is_valid_dollar_tag(&tag) {
            return Err(ConfigError::InvalidWrapperTag(tag));
        }
        self.wrapper_tag = tag;
        Ok(self)
    }

    /// Disables output validation.
    #[must_use]
    pub const fn without_validation(mut self) -> Self {
        self.validate_output = false;
        self
    }

    /// Makes wrappers skip silently (`NULL;`) instead of raising a NOTICE.
    #[must_use]
    pub const fn without_notices(mut self) -> Self {
        self.emit_notices = false;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = TransformOptions::default();
        assert_eq!(options.wrapper_tag, "pg_idempotent");
        assert!(options.validate_output);
        assert!(options.emit_notices);
    }

    #[test]
    fn test_wrapper_tag_validation() {
        let options = TransformOptions::new().with_wrapper_tag("migr_01").unwrap();
        assert_eq!(options.wrapper_tag, "migr_01");

        let err = TransformOptions::new().with_wrapper_tag("bad$tag").unwrap_err();
        assert_eq!(err, ConfigError::InvalidWrapperTag("bad$tag".into()));
    }

    #[test]
    fn test_builders() {
        let options = TransformOptions::new().without_validation().without_notices();
        assert!(!options.validate_output);
        assert!(!options.emit_notices);
    }
}
