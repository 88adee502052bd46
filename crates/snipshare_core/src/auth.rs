//! Identity resolution and the authorization guard.

use crate::error::{DomainError, DomainResult};

/// The caller's resolved identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Identity-provider subject id.
    pub subject: String,
}

impl Identity {
    /// Creates an identity for the given subject.
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
        }
    }
}

/// Per-request context carrying the caller's identity, if any.
///
/// The hosting session layer resolves the identity before invoking the
/// domain; the domain never authenticates, it only checks presence and
/// compares subjects.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    identity: Option<Identity>,
}

impl RequestContext {
    /// A context with no identity attached.
    pub fn anonymous() -> Self {
        Self { identity: None }
    }

    /// A context authenticated as the given subject.
    pub fn authenticated(subject: impl Into<String>) -> Self {
        Self {
            identity: Some(Identity::new(subject)),
        }
    }

    /// Returns the attached identity, if any.
    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }
}

/// Returns the caller's identity, failing closed when none is attached.
///
/// Every mutating operation calls this before touching the store.
pub fn require_identity(ctx: &RequestContext) -> DomainResult<&Identity> {
    ctx.identity().ok_or(DomainError::AuthenticationRequired)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_is_rejected() {
        let ctx = RequestContext::anonymous();
        assert!(matches!(
            require_identity(&ctx),
            Err(DomainError::AuthenticationRequired)
        ));
    }

    #[test]
    fn authenticated_resolves_subject() {
        let ctx = RequestContext::authenticated("usr_42");
        let identity = require_identity(&ctx).unwrap();
        assert_eq!(identity.subject, "usr_42");
    }

    #[test]
    fn default_is_anonymous() {
        assert!(RequestContext::default().identity().is_none());
    }
}
