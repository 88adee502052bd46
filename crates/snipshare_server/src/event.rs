//! Identity event parsing and dispatch.

use crate::error::{ServerError, ServerResult};
use serde::Deserialize;
use snipshare_core::{RecordId, SnippetService};
use std::sync::Arc;

/// Event type string for account creation.
pub const ACCOUNT_CREATED: &str = "user.created";

/// A verified identity-provider event.
///
/// The payload is discriminated by `type`; `data` stays untyped until a
/// handler claims the event, so unknown event shapes never fail parsing.
#[derive(Debug, Deserialize)]
pub struct IdentityEvent {
    /// Event type discriminant.
    #[serde(rename = "type")]
    pub kind: String,
    /// Event payload, shaped per event type.
    #[serde(default)]
    pub data: serde_json::Value,
}

impl IdentityEvent {
    /// Parses an event from a verified request body.
    pub fn parse(body: &[u8]) -> ServerResult<Self> {
        serde_json::from_slice(body).map_err(|e| ServerError::malformed_payload(e.to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct ProviderAccount {
    id: String,
    #[serde(default)]
    email_addresses: Vec<EmailAddress>,
    first_name: Option<String>,
    last_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EmailAddress {
    email_address: String,
}

/// Outcome of dispatching an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The event synchronized a user record.
    Synced(RecordId),
    /// The event type carries no local side effect.
    Ignored,
}

/// Routes verified events to their handlers.
///
/// Only recognized event types mutate anything; everything else is
/// accepted and ignored, so new provider event types never break
/// delivery.
pub struct EventDispatcher {
    service: Arc<SnippetService>,
}

impl EventDispatcher {
    /// Creates a dispatcher over the given service.
    pub fn new(service: Arc<SnippetService>) -> Self {
        Self { service }
    }

    /// Dispatches a verified event.
    pub fn dispatch(&self, event: IdentityEvent) -> ServerResult<DispatchOutcome> {
        match event.kind.as_str() {
            ACCOUNT_CREATED => self.on_account_created(event.data),
            other => {
                tracing::debug!(kind = other, "ignoring unhandled event type");
                Ok(DispatchOutcome::Ignored)
            }
        }
    }

    fn on_account_created(&self, data: serde_json::Value) -> ServerResult<DispatchOutcome> {
        let account: ProviderAccount = serde_json::from_value(data)
            .map_err(|e| ServerError::malformed_payload(e.to_string()))?;
        let email = account
            .email_addresses
            .first()
            .map(|e| e.email_address.as_str())
            .ok_or_else(|| ServerError::malformed_payload("account has no email addresses"))?;

        let id = self.service.sync_user(
            &account.id,
            email,
            account.first_name.as_deref(),
            account.last_name.as_deref(),
        )?;
        tracing::info!(subject = %account.id, "account-created event synchronized");
        Ok(DispatchOutcome::Synced(id))
    }
}
