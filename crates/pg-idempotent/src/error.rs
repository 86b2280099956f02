//! Error types for the command-line tool.

use std::path::PathBuf;

/// Errors that can occur while reading, backing up or writing files.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Input file does not exist.
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// Batch directory does not exist.
    #[error("Directory not found: {0}")]
    DirectoryNotFound(PathBuf),

    /// IO error (reading, copying or writing SQL files).
    #[error("IO error on '{path}': {source}")]
    Io {
        /// File or directory being accessed.
        path: PathBuf,
        source: std::io::Error,
    },

    /// `--pattern` could not be turned into a matcher.
    #[error("Invalid file pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        source: regex::Error,
    },

    /// The script could not be split; nothing was written.
    #[error("Transformation of '{path}' failed:\n{}", .errors.iter().map(|e| format!("  - {e}")).collect::<Vec<_>>().join("\n"))]
    TransformFailed {
        path: PathBuf,
        errors: Vec<String>,
    },
}

impl CliError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { path, source }
    }
}

/// Result type for file operations.
pub type Result<T> = std::result::Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_failed_lists_errors() {
        let err = CliError::TransformFailed {
            path: PathBuf::from("001.sql"),
            errors: vec!["first".into(), "second".into()],
        };
        assert_eq!(
            err.to_string(),
            "Transformation of '001.sql' failed:\n  - first\n  - second"
        );
    }

    #[test]
    fn test_io_context() {
        let err = CliError::io("a.sql")(std::io::Error::other("denied"));
        assert_eq!(err.to_string(), "IO error on 'a.sql': denied");
    }
}
