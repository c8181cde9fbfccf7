//! Error types for the core library
//!
//! Every repository operation fails with one of four kinds. The service
//! layer maps each kind to exactly one HTTP status class, so new variants
//! must not be added without a matching mapping there.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Caller-supplied data violates a required-field or enumeration rule.
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Backend unavailable or failed. The message is safe to show in logs
    /// but carries no driver detail.
    #[error("Internal error: {0}")]
    Internal(String),

    /// Deadline elapsed or the caller cancelled before completion.
    #[error("Operation cancelled: {0}")]
    Cancelled(String),
}

/// Discriminant of [`Error`], for callers that only branch on the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Internal,
    Cancelled,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Internal(_) => ErrorKind::Internal,
            Self::Cancelled(_) => ErrorKind::Cancelled,
        }
    }

    /// Cancellation is transient; the caller may retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Cancelled(_))
    }

    pub(crate) fn task_not_found(id: impl std::fmt::Display) -> Self {
        Self::NotFound(format!("task {id}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(Error::Validation("x".into()).kind(), ErrorKind::Validation);
        assert_eq!(Error::task_not_found(7).kind(), ErrorKind::NotFound);
        assert_eq!(Error::Internal("x".into()).kind(), ErrorKind::Internal);
        assert_eq!(Error::Cancelled("x".into()).kind(), ErrorKind::Cancelled);
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(Error::task_not_found(42).to_string(), "Not found: task 42");
        assert_eq!(
            Error::Validation("title is required".into()).to_string(),
            "Invalid input: title is required"
        );
    }

    #[test]
    fn test_only_cancellation_is_retryable() {
        assert!(Error::Cancelled("deadline".into()).is_retryable());
        assert!(!Error::Internal("down".into()).is_retryable());
        assert!(!Error::Validation("bad".into()).is_retryable());
    }
}
