//! # SnipShare Server
//!
//! Identity-webhook surface for SnipShare.
//!
//! This crate provides:
//! - Webhook signature verification (HMAC-SHA256 over id, timestamp,
//!   and body, with a replay-tolerance window)
//! - Event parsing and dispatch (`user.created` synchronizes a local
//!   user; unrecognized event types are accepted as no-ops so new
//!   provider events never break delivery)
//! - A transport-agnostic request handler mapping outcomes to HTTP
//!   status codes
//! - A minimal tokio HTTP listener for `POST /identity-webhook`
//!
//! # Configuration
//!
//! The signing secret is mandatory: [`WebhookHandler::new`] and
//! [`WebhookServer::new`] fail with [`ServerError::ConfigMissing`] when
//! it is absent, so a misconfigured process never serves the route.
//!
//! ```rust
//! use snipshare_core::SnippetService;
//! use snipshare_server::{ServerConfig, WebhookServer};
//! use std::sync::Arc;
//!
//! let config = ServerConfig::default().with_secret("whsec_c2VjcmV0LXNlY3JldC1zZWNyZXQ=");
//! let service = Arc::new(SnippetService::new());
//! let server = WebhookServer::new(config, service).unwrap();
//! // server.serve().await runs the listener
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod event;
mod handler;
mod http;
mod verify;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use event::{DispatchOutcome, EventDispatcher, IdentityEvent, ACCOUNT_CREATED};
pub use handler::{
    Headers, HttpReply, WebhookHandler, ID_HEADER, SIGNATURE_HEADER, TIMESTAMP_HEADER,
};
pub use http::WebhookServer;
pub use verify::{SigningSecret, WebhookVerifier};
