//! Error types for dtsgen.
//!
//! Uses `thiserror` for library errors; the binary wraps these in `anyhow`.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for dtsgen operations
pub type DtsgenResult<T> = Result<T, DtsgenError>;

/// Main error type for dtsgen operations
#[derive(Error, Debug)]
pub enum DtsgenError {
    /// No generator registered under the configured name
    #[error("generator '{name}' does not exist")]
    GeneratorNotFound { name: String },

    /// Source text the resolver could not tokenize or parse
    #[error("parse error at byte {offset}: {message}")]
    Parse { offset: usize, message: String },

    /// Invalid configuration value
    #[error("invalid config: {message}")]
    Config { message: String },

    /// File-system watch subscription failure
    #[error("cannot watch {}: {source}", path.display())]
    Watch {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },

    /// Another process holds the watch lock
    #[error("another dtsgen process holds the lock at {}", path.display())]
    Locked { path: PathBuf },

    /// Glob pattern or walk error
    #[error("glob error: {0}")]
    Glob(#[from] ignore::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_generator_not_found() {
        let err = DtsgenError::GeneratorNotFound {
            name: "custom".to_string(),
        };
        assert_eq!(err.to_string(), "generator 'custom' does not exist");
    }

    #[test]
    fn test_error_display_parse() {
        let err = DtsgenError::Parse {
            offset: 12,
            message: "unterminated string literal".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "parse error at byte 12: unterminated string literal"
        );
    }
}
