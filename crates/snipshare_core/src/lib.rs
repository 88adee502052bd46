//! # SnipShare Core
//!
//! Domain layer for the SnipShare snippet-sharing platform.
//!
//! This crate provides:
//! - Entity models (users, snippets, comments, stars)
//! - Identity resolution and the fail-closed authorization guard
//! - User synchronization from identity-provider account events
//! - Directories enforcing the index and uniqueness invariants
//! - [`SnippetService`]: the mutation/query surface, including the
//!   cascade delete that keeps the snippet graph free of orphans
//!
//! # Invariants
//!
//! - Exactly one user per identity-provider subject (unique index).
//! - Snippet and comment ownership is keyed on the external subject id,
//!   never on an internal record id.
//! - At most one star per (subject, snippet) pair.
//! - Deleting a snippet removes every comment and star referencing it
//!   before the snippet itself.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod auth;
mod comments;
mod error;
mod model;
mod service;
mod snippets;
mod stars;
mod users;

pub use auth::{require_identity, Identity, RequestContext};
pub use comments::CommentDirectory;
pub use error::{CascadePhase, DomainError, DomainResult, RecordKind};
pub use model::{Comment, Snippet, Star, User};
pub use service::SnippetService;
pub use snippets::SnippetDirectory;
pub use stars::{StarDirectory, StarToggle};
pub use users::UserDirectory;

pub use snipshare_store::RecordId;
