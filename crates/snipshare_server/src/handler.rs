//! Webhook request handling.
//!
//! The handler is transport-agnostic: it takes headers and a raw body
//! and produces a status code plus plain-text body. The HTTP listener
//! in [`crate::http`] is one thin transport over it.

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::event::{DispatchOutcome, EventDispatcher, IdentityEvent};
use crate::verify::{SigningSecret, WebhookVerifier};
use snipshare_core::SnippetService;
use std::sync::Arc;

/// Header carrying the delivery id.
pub const ID_HEADER: &str = "provider-id";
/// Header carrying the delivery timestamp (unix seconds).
pub const TIMESTAMP_HEADER: &str = "provider-timestamp";
/// Header carrying the delivery signature entries.
pub const SIGNATURE_HEADER: &str = "provider-signature";

/// Case-insensitive request headers.
#[derive(Debug, Clone, Default)]
pub struct Headers {
    entries: Vec<(String, String)>,
}

impl Headers {
    /// Creates an empty header set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a header.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push((name.into(), value.into()));
    }

    /// Returns the first value for the named header, if present.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// A status code and plain-text body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    /// HTTP status code.
    pub status: u16,
    /// Plain-text response body.
    pub body: String,
}

impl HttpReply {
    fn ok() -> Self {
        Self {
            status: 200,
            body: "webhook processed".into(),
        }
    }
}

/// Handler for identity-webhook deliveries.
pub struct WebhookHandler {
    verifier: WebhookVerifier,
    dispatcher: EventDispatcher,
}

impl std::fmt::Debug for WebhookHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookHandler").finish_non_exhaustive()
    }
}

impl WebhookHandler {
    /// Creates a handler from configuration.
    ///
    /// Fails with [`ServerError::ConfigMissing`] when no signing secret
    /// is configured: the route must never be served unverified.
    pub fn new(config: &ServerConfig, service: Arc<SnippetService>) -> ServerResult<Self> {
        let secret = config.secret.as_deref().ok_or(ServerError::ConfigMissing)?;
        let verifier =
            WebhookVerifier::new(SigningSecret::parse(secret)?).with_tolerance(config.tolerance);
        Ok(Self {
            verifier,
            dispatcher: EventDispatcher::new(service),
        })
    }

    /// Handles a delivery, mapping every outcome to a reply.
    pub fn handle(&self, headers: &Headers, body: &[u8]) -> HttpReply {
        match self.process(headers, body) {
            Ok(outcome) => {
                tracing::debug!(?outcome, "webhook delivery processed");
                HttpReply::ok()
            }
            Err(e) => {
                if e.is_server_error() {
                    tracing::error!(error = %e, "webhook delivery failed");
                } else {
                    tracing::warn!(error = %e, "webhook delivery rejected");
                }
                HttpReply {
                    status: e.status_code(),
                    body: e.to_string(),
                }
            }
        }
    }

    fn process(&self, headers: &Headers, body: &[u8]) -> ServerResult<DispatchOutcome> {
        let id = headers
            .get(ID_HEADER)
            .ok_or(ServerError::MissingHeader(ID_HEADER))?;
        let timestamp = headers
            .get(TIMESTAMP_HEADER)
            .ok_or(ServerError::MissingHeader(TIMESTAMP_HEADER))?;
        let signature = headers
            .get(SIGNATURE_HEADER)
            .ok_or(ServerError::MissingHeader(SIGNATURE_HEADER))?;

        self.verifier.verify(id, timestamp, signature, body)?;
        let event = IdentityEvent::parse(body)?;
        self.dispatcher.dispatch(event)
    }
}
