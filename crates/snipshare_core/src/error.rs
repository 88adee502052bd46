//! Error types for the domain layer.

use snipshare_store::StoreError;
use std::fmt;
use thiserror::Error;

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;

/// Kind of record named in not-found and ownership errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    /// A snippet record.
    Snippet,
    /// A comment record.
    Comment,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Snippet => write!(f, "snippet"),
            RecordKind::Comment => write!(f, "comment"),
        }
    }
}

/// Phase of the snippet cascade delete.
///
/// The cascade removes dependents before the parent: comments, then
/// stars, then the snippet itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CascadePhase {
    /// Removing comments referencing the snippet.
    Comments,
    /// Removing stars referencing the snippet.
    Stars,
    /// Removing the snippet record itself.
    Snippet,
}

impl fmt::Display for CascadePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CascadePhase::Comments => write!(f, "comments"),
            CascadePhase::Stars => write!(f, "stars"),
            CascadePhase::Snippet => write!(f, "snippet"),
        }
    }
}

/// Errors raised by domain operations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// No identity is attached to the request.
    #[error("not logged in")]
    AuthenticationRequired,

    /// The caller's identity has no synchronized user record yet.
    #[error("user not found: {subject}")]
    UserNotFound {
        /// The identity-provider subject with no local record.
        subject: String,
    },

    /// A referenced record does not exist.
    #[error("{kind} not found")]
    NotFound {
        /// The kind of record that was looked up.
        kind: RecordKind,
    },

    /// The caller does not own the record it is trying to mutate.
    #[error("not allowed: caller does not own this {kind}")]
    Forbidden {
        /// The kind of record the caller tried to mutate.
        kind: RecordKind,
    },

    /// A storage operation failed.
    #[error("internal save failure: {message}")]
    SaveFailed {
        /// Description of the failure.
        message: String,
    },

    /// A snippet cascade delete stopped partway.
    ///
    /// Carries how far the cascade progressed so the orphaned remainder
    /// can be identified and repaired.
    #[error(
        "snippet delete halted in {phase} phase \
         ({comments_removed} comments, {stars_removed} stars removed): {message}"
    )]
    CascadeHalted {
        /// The phase that failed.
        phase: CascadePhase,
        /// Comments removed before the failure.
        comments_removed: usize,
        /// Stars removed before the failure.
        stars_removed: usize,
        /// Description of the underlying failure.
        message: String,
    },
}

impl DomainError {
    /// Creates a user-not-found error.
    pub fn user_not_found(subject: impl Into<String>) -> Self {
        Self::UserNotFound {
            subject: subject.into(),
        }
    }

    /// Creates a not-found error for the given record kind.
    pub fn not_found(kind: RecordKind) -> Self {
        Self::NotFound { kind }
    }

    /// Creates an ownership-violation error for the given record kind.
    pub fn forbidden(kind: RecordKind) -> Self {
        Self::Forbidden { kind }
    }

    /// Creates a save-failure error.
    pub fn save_failed(message: impl Into<String>) -> Self {
        Self::SaveFailed {
            message: message.into(),
        }
    }

    /// Creates a cascade-halted error.
    pub fn cascade_halted(
        phase: CascadePhase,
        comments_removed: usize,
        stars_removed: usize,
        source: &DomainError,
    ) -> Self {
        Self::CascadeHalted {
            phase,
            comments_removed,
            stars_removed,
            message: source.to_string(),
        }
    }

    /// Returns true if this error reflects an internal failure rather
    /// than a caller mistake.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            DomainError::SaveFailed { .. } | DomainError::CascadeHalted { .. }
        )
    }
}

impl From<StoreError> for DomainError {
    fn from(err: StoreError) -> Self {
        DomainError::SaveFailed {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification() {
        assert!(!DomainError::AuthenticationRequired.is_internal());
        assert!(!DomainError::forbidden(RecordKind::Snippet).is_internal());
        assert!(DomainError::save_failed("disk on fire").is_internal());
    }

    #[test]
    fn cascade_message_reports_progress() {
        let inner = DomainError::save_failed("write rejected");
        let err = DomainError::cascade_halted(CascadePhase::Stars, 4, 2, &inner);
        let msg = err.to_string();
        assert!(msg.contains("stars"));
        assert!(msg.contains("4 comments"));
        assert!(msg.contains("2 stars"));
    }

    #[test]
    fn user_messages_are_distinct() {
        let not_logged_in = DomainError::AuthenticationRequired.to_string();
        let not_found = DomainError::not_found(RecordKind::Snippet).to_string();
        let not_allowed = DomainError::forbidden(RecordKind::Snippet).to_string();
        assert_ne!(not_logged_in, not_found);
        assert_ne!(not_found, not_allowed);
    }
}
