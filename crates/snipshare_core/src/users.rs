//! User directory and identity synchronization.

use crate::error::{DomainError, DomainResult};
use crate::model::User;
use parking_lot::RwLock;
use snipshare_store::{Collection, HashIndex, IndexSpec, RecordId};

struct UserState {
    users: Collection<User>,
    by_subject: HashIndex<String>,
}

/// Directory of platform users.
///
/// Enforces the one-user-per-subject invariant with a unique index on
/// the identity-provider subject. Users are created by webhook-driven
/// synchronization and never deleted by this layer.
pub struct UserDirectory {
    state: RwLock<UserState>,
}

impl UserDirectory {
    /// Creates an empty user directory.
    pub fn new() -> Self {
        Self {
            state: RwLock::new(UserState {
                users: Collection::new("users"),
                by_subject: HashIndex::new(IndexSpec::new("users", "by_subject").unique()),
            }),
        }
    }

    /// Synchronizes a user record from an identity-provider account.
    ///
    /// Idempotent upsert keyed on the subject: the first delivery inserts
    /// a non-pro user; redelivery updates the display name and email in
    /// place and returns the existing record id. Duplicate rows for one
    /// subject cannot be created.
    ///
    /// The display name is `"{first} {last} "` with absent parts replaced
    /// by the empty string: the provider-compatible historical format,
    /// trailing space included.
    pub fn sync_from_provider_account(
        &self,
        subject: &str,
        email: &str,
        first_name: Option<&str>,
        last_name: Option<&str>,
    ) -> DomainResult<RecordId> {
        if subject.is_empty() {
            return Err(DomainError::save_failed("provider account id is empty"));
        }

        let name = display_name(first_name, last_name);
        let mut state = self.state.write();

        if let Some(existing_id) = state.by_subject.lookup_unique(&subject.to_string()) {
            let mut user = state
                .users
                .get(existing_id)?
                .ok_or_else(|| DomainError::save_failed("subject index points at a missing user"))?;
            user.name = name;
            user.email = email.to_string();
            state.users.put(&user)?;
            tracing::debug!(%subject, "user already synchronized, refreshed profile");
            return Ok(existing_id);
        }

        let user = User::new(subject, name, email);
        let id = user.id;
        state.users.put(&user)?;
        state.by_subject.insert(subject.to_string(), id)?;
        tracing::info!(%subject, "user synchronized");
        Ok(id)
    }

    /// Marks a user as pro, recording the billing references.
    ///
    /// This is the single billing side effect this layer carries; the
    /// billing flow itself lives elsewhere.
    pub fn mark_pro(
        &self,
        subject: &str,
        customer_ref: &str,
        order_ref: &str,
        since: u64,
    ) -> DomainResult<()> {
        let mut state = self.state.write();
        let id = state
            .by_subject
            .lookup_unique(&subject.to_string())
            .ok_or_else(|| DomainError::user_not_found(subject))?;
        let mut user = state
            .users
            .get(id)?
            .ok_or_else(|| DomainError::user_not_found(subject))?;
        user.is_pro = true;
        user.pro_since = Some(since);
        user.billing_customer_ref = Some(customer_ref.to_string());
        user.billing_order_ref = Some(order_ref.to_string());
        state.users.put(&user)?;
        tracing::info!(%subject, "user marked pro");
        Ok(())
    }

    /// Looks up a user by identity-provider subject.
    pub fn by_subject(&self, subject: &str) -> DomainResult<Option<User>> {
        let state = self.state.read();
        match state.by_subject.lookup_unique(&subject.to_string()) {
            Some(id) => Ok(state.users.get(id)?),
            None => Ok(None),
        }
    }

    /// Returns the number of users.
    pub fn len(&self) -> usize {
        self.state.read().users.len()
    }

    /// Returns true if no users exist.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for UserDirectory {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds the provider-compatible display name.
fn display_name(first: Option<&str>, last: Option<&str>) -> String {
    format!("{} {} ", first.unwrap_or(""), last.unwrap_or(""))
}
