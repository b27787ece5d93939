use std::error::Error as StdError;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorCategory {
    /// Any failure that cannot be confidently attributed to any other error
    /// category in this enum.
    ///
    /// In particular this means that use of Internal is never a guarantee
    /// the error is not, for example, due to a user error - merely that it
    /// cannot be confidently determined by the code.
    Internal,

    /// The user provided invalid input or performed an action that is
    /// unsupported or impossible to complete.
    User,
}

/// Fine-grained condition flags for consumers that want to branch on error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The input does not begin with the container magic number; not an
    /// encbox container at all.
    Format,
    /// Input data ended before the 16-byte container header could be read.
    Truncated,
    /// The header's declared plaintext length exceeds the available input.
    Length,
    /// Additional bytes were present after the declared cipher body.
    TrailingData,
    /// Recomputed plaintext checksum does not match the stored one: wrong
    /// key, or corrupted/tampered ciphertext. Raised only after the full
    /// (incorrect) plaintext has been written.
    Integrity,
    /// Key could not be obtained from the configured reader.
    KeyUnavailable,
    /// Unexpected state reached within encbox logic.
    InternalInvariant,
    /// Interaction with the filesystem, stdin/stdout, or other I/O failed.
    Io,
}

#[derive(Debug, Error)]
#[error("{msg}")]
pub struct EncboxError {
    /// Broad error category, always provided.
    pub category: ErrorCategory,
    /// Optional specific condition tag for consumers that need to
    /// branch their behavior. Any code consuming errors MUST handle
    /// the absence of a defined kind.
    pub kind: Option<ErrorKind>,
    #[source]
    source: Option<Box<dyn StdError + Send + Sync + 'static>>,
    msg: String,
}

impl EncboxError {
    /// Creates a new error with a required category and display message.
    pub fn new(category: ErrorCategory, msg: impl Into<String>) -> Self {
        Self {
            category,
            kind: None,
            source: None,
            msg: msg.into(),
        }
    }

    /// Creates a new error that also tags the failure with a kind.
    pub fn with_kind(category: ErrorCategory, kind: ErrorKind, msg: impl Into<String>) -> Self {
        Self {
            category,
            kind: Some(kind),
            source: None,
            msg: msg.into(),
        }
    }

    /// Creates a new error that carries both a kind tag and the originating source error.
    pub fn with_kind_and_source(
        category: ErrorCategory,
        kind: ErrorKind,
        msg: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self {
            category,
            kind: Some(kind),
            source: Some(Box::new(source)),
            msg: msg.into(),
        }
    }

    /// The user-facing message carried by the error.
    pub fn message(&self) -> &str {
        &self.msg
    }

    /// Returns the preserved source error if present.
    pub fn source_error(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.source.as_deref()
    }

    /// Wraps the current error with a higher-level message while preserving the original as source.
    pub fn with_context(self, msg: impl Into<String>) -> Self {
        let category = self.category;
        let kind = self.kind;
        Self {
            category,
            kind,
            source: Some(Box::new(self)),
            msg: msg.into(),
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, EncboxError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_preserved_through_context() {
        let err = EncboxError::with_kind(ErrorCategory::User, ErrorKind::Format, "bad magic")
            .with_context("failed to decode header");
        assert_eq!(err.kind, Some(ErrorKind::Format));
        assert_eq!(err.category, ErrorCategory::User);
        assert_eq!(err.message(), "failed to decode header");
        assert!(err.source_error().is_some());
    }

    #[test]
    fn test_display_is_message_only() {
        let err = EncboxError::new(ErrorCategory::Internal, "something broke");
        assert_eq!(err.to_string(), "something broke");
    }
}
