//! Error types for iac-tagger

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for iac-tagger
#[derive(Debug, Error)]
pub enum TaggerError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("No parser found for file type: {0}")]
    UnsupportedFormat(PathBuf),

    #[error("Failed to parse {dialect} source: {message}")]
    Parse {
        dialect: &'static str,
        message: String,
    },

    #[error("Resource block not found in source text: {0}")]
    InjectionNotFound(String),

    #[error("Could not lock file: {0}")]
    Lock(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("TOML deserialization error: {0}")]
    TomlDeserialize(#[from] toml::de::Error),
}

impl TaggerError {
    pub(crate) fn parse(dialect: &'static str, message: impl Into<String>) -> Self {
        TaggerError::Parse {
            dialect,
            message: message.into(),
        }
    }

    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            TaggerError::NotFound(_) | TaggerError::NotADirectory(_) => 3,
            TaggerError::UnsupportedFormat(_) => 4,
            TaggerError::Config(_) | TaggerError::TomlDeserialize(_) => 5,
            _ => 1,
        }
    }

    /// Get a user-friendly error message with suggestions
    pub fn display_with_suggestions(&self) -> String {
        match self {
            TaggerError::UnsupportedFormat(path) => {
                format!(
                    "No parser found for file type: {}\n\n\
                    Supported by default: .tf, .yaml, .yml\n\
                    Map additional suffixes in .iac-tagger.toml, e.g.:\n\
                    [extensions]\n\
                    \".tofu\" = \"hcl\"",
                    path.display()
                )
            }
            TaggerError::NotADirectory(path) => {
                format!(
                    "Not a directory: {}\n\n\
                    Suggestions:\n\
                    • Use --files to tag individual files\n\
                    • Check the path passed to --directory",
                    path.display()
                )
            }
            TaggerError::Config(msg) => {
                if msg.contains("fingerprint_length") {
                    format!("{}\n\nValid range: 20 to 64 hex characters", msg)
                } else {
                    msg.clone()
                }
            }
            _ => self.to_string(),
        }
    }
}

/// Result type using TaggerError
pub type Result<T> = std::result::Result<T, TaggerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_format_suggestions() {
        let err = TaggerError::UnsupportedFormat(PathBuf::from("main.json"));
        let msg = err.display_with_suggestions();
        assert!(msg.contains("main.json"));
        assert!(msg.contains(".tf, .yaml, .yml"));
        assert!(msg.contains("[extensions]"));
    }

    #[test]
    fn test_not_a_directory_suggestions() {
        let err = TaggerError::NotADirectory(PathBuf::from("/tmp/file.tf"));
        let msg = err.display_with_suggestions();
        assert!(msg.contains("--files"));
        assert!(msg.contains("Suggestions"));
    }

    #[test]
    fn test_config_length_hint() {
        let err = TaggerError::Config("fingerprint_length must be between 20 and 64".to_string());
        assert!(err.display_with_suggestions().contains("Valid range"));
    }

    #[test]
    fn test_parse_error_display() {
        let err = TaggerError::parse("HCL", "unexpected token");
        assert_eq!(
            err.to_string(),
            "Failed to parse HCL source: unexpected token"
        );
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(TaggerError::NotFound(PathBuf::from("x")).exit_code(), 3);
        assert_eq!(
            TaggerError::UnsupportedFormat(PathBuf::from("x")).exit_code(),
            4
        );
        assert_eq!(TaggerError::Config("bad".to_string()).exit_code(), 5);
        assert_eq!(TaggerError::InjectionNotFound("a.b".to_string()).exit_code(), 1);
    }

    #[test]
    fn test_other_errors_fallback() {
        let err = TaggerError::InjectionNotFound("aws_s3_bucket.logs".to_string());
        assert_eq!(
            err.display_with_suggestions(),
            "Resource block not found in source text: aws_s3_bucket.logs"
        );
    }
}
