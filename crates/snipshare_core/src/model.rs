//! Entity models.
//!
//! Owner and author fields store the external identity-provider subject,
//! not the internal record id: authorization compares subjects, and a
//! user's record id is free to differ across environments. Display names
//! are denormalized at creation time and may go stale; readers accept
//! that in exchange for list rendering without a join.

use serde::{Deserialize, Serialize};
use snipshare_store::{EntityCodec, RecordId};

/// A platform user, synchronized from the identity provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Internal record id.
    pub id: RecordId,
    /// Identity-provider subject. Unique and immutable.
    pub subject: String,
    /// Display name.
    pub name: String,
    /// Primary email address.
    pub email: String,
    /// Whether the user has a pro subscription.
    pub is_pro: bool,
    /// When the pro subscription started (unix seconds).
    pub pro_since: Option<u64>,
    /// Billing-provider customer reference.
    pub billing_customer_ref: Option<String>,
    /// Billing-provider order reference.
    pub billing_order_ref: Option<String>,
}

impl User {
    /// Creates a new non-pro user.
    pub fn new(subject: impl Into<String>, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: RecordId::new(),
            subject: subject.into(),
            name: name.into(),
            email: email.into(),
            is_pro: false,
            pro_since: None,
            billing_customer_ref: None,
            billing_order_ref: None,
        }
    }
}

impl EntityCodec for User {
    fn record_id(&self) -> RecordId {
        self.id
    }
}

/// A shared code snippet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snippet {
    /// Internal record id.
    pub id: RecordId,
    /// Identity subject of the owner. Immutable after creation.
    pub owner_subject: String,
    /// Owner display name, denormalized at creation time.
    pub owner_name: String,
    /// Snippet title.
    pub title: String,
    /// Language tag.
    pub language: String,
    /// Code body.
    pub code: String,
}

impl Snippet {
    /// Creates a new snippet owned by the given subject.
    pub fn new(
        owner_subject: impl Into<String>,
        owner_name: impl Into<String>,
        title: impl Into<String>,
        language: impl Into<String>,
        code: impl Into<String>,
    ) -> Self {
        Self {
            id: RecordId::new(),
            owner_subject: owner_subject.into(),
            owner_name: owner_name.into(),
            title: title.into(),
            language: language.into(),
            code: code.into(),
        }
    }
}

impl EntityCodec for Snippet {
    fn record_id(&self) -> RecordId {
        self.id
    }
}

/// A comment on a snippet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    /// Internal record id.
    pub id: RecordId,
    /// The snippet this comment belongs to.
    pub snippet_id: RecordId,
    /// Identity subject of the author.
    pub author_subject: String,
    /// Author display name, denormalized at creation time.
    pub author_name: String,
    /// Comment body.
    pub content: String,
}

impl Comment {
    /// Creates a new comment.
    pub fn new(
        snippet_id: RecordId,
        author_subject: impl Into<String>,
        author_name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: RecordId::new(),
            snippet_id,
            author_subject: author_subject.into(),
            author_name: author_name.into(),
            content: content.into(),
        }
    }
}

impl EntityCodec for Comment {
    fn record_id(&self) -> RecordId {
        self.id
    }
}

/// A user's star on a snippet.
///
/// At most one star exists per (subject, snippet) pair; the star
/// directory's unique index enforces it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Star {
    /// Internal record id.
    pub id: RecordId,
    /// Identity subject of the starring user.
    pub subject: String,
    /// The starred snippet.
    pub snippet_id: RecordId,
}

impl Star {
    /// Creates a new star.
    pub fn new(subject: impl Into<String>, snippet_id: RecordId) -> Self {
        Self {
            id: RecordId::new(),
            subject: subject.into(),
            snippet_id,
        }
    }
}

impl EntityCodec for Star {
    fn record_id(&self) -> RecordId {
        self.id
    }
}
