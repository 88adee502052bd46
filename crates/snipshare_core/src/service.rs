//! The mutation/query surface of the platform.

use crate::auth::{require_identity, RequestContext};
use crate::comments::CommentDirectory;
use crate::error::{CascadePhase, DomainError, DomainResult, RecordKind};
use crate::model::{Comment, Snippet, User};
use crate::snippets::SnippetDirectory;
use crate::stars::StarDirectory;
use crate::users::UserDirectory;
use snipshare_store::RecordId;

/// The snippet platform's data and authorization surface.
///
/// Owns the four directories and is the only mutation path into them.
/// Every mutating operation resolves the caller's identity first and
/// fails closed; reads are unauthenticated unless their results are
/// identity-scoped.
pub struct SnippetService {
    users: UserDirectory,
    snippets: SnippetDirectory,
    comments: CommentDirectory,
    stars: StarDirectory,
}

impl SnippetService {
    /// Creates a service over empty directories.
    pub fn new() -> Self {
        Self {
            users: UserDirectory::new(),
            snippets: SnippetDirectory::new(),
            comments: CommentDirectory::new(),
            stars: StarDirectory::new(),
        }
    }

    // --- identity synchronization ---

    /// Upserts a user record from an identity-provider account.
    ///
    /// See [`UserDirectory::sync_from_provider_account`].
    pub fn sync_user(
        &self,
        subject: &str,
        email: &str,
        first_name: Option<&str>,
        last_name: Option<&str>,
    ) -> DomainResult<RecordId> {
        self.users
            .sync_from_provider_account(subject, email, first_name, last_name)
    }

    /// Marks a user as pro. See [`UserDirectory::mark_pro`].
    pub fn mark_user_pro(
        &self,
        subject: &str,
        customer_ref: &str,
        order_ref: &str,
        since: u64,
    ) -> DomainResult<()> {
        self.users.mark_pro(subject, customer_ref, order_ref, since)
    }

    /// Looks up a user by identity-provider subject.
    pub fn user_by_subject(&self, subject: &str) -> DomainResult<Option<User>> {
        self.users.by_subject(subject)
    }

    // --- snippets ---

    /// Creates a snippet owned by the caller.
    ///
    /// Fails with [`DomainError::UserNotFound`] when the caller's account
    /// exists at the provider but has not been synchronized yet: an
    /// expected transient state shortly after signup.
    pub fn create_snippet(
        &self,
        ctx: &RequestContext,
        title: &str,
        language: &str,
        code: &str,
    ) -> DomainResult<RecordId> {
        let identity = require_identity(ctx)?;
        let user = self
            .users
            .by_subject(&identity.subject)?
            .ok_or_else(|| DomainError::user_not_found(&identity.subject))?;

        let snippet = Snippet::new(&identity.subject, &user.name, title, language, code);
        let id = self.snippets.insert(snippet)?;
        tracing::debug!(subject = %identity.subject, snippet = %id, "snippet created");
        Ok(id)
    }

    /// Deletes a snippet and everything referencing it.
    ///
    /// Owner only. Cascade order is comments, then stars, then the
    /// snippet itself, so no dependent outlives its parent on the happy
    /// path. The three phases are not one transaction; a failure
    /// partway is reported as [`DomainError::CascadeHalted`] with the
    /// progress made, so the remainder can be repaired.
    pub fn delete_snippet(&self, ctx: &RequestContext, snippet_id: RecordId) -> DomainResult<()> {
        let identity = require_identity(ctx)?;
        let snippet = self
            .snippets
            .get(snippet_id)?
            .ok_or_else(|| DomainError::not_found(RecordKind::Snippet))?;
        if snippet.owner_subject != identity.subject {
            return Err(DomainError::forbidden(RecordKind::Snippet));
        }

        let comments_removed = self
            .comments
            .remove_all_for_snippet(snippet_id)
            .map_err(|e| DomainError::cascade_halted(CascadePhase::Comments, 0, 0, &e))?;
        let stars_removed = self
            .stars
            .remove_all_for_snippet(snippet_id)
            .map_err(|e| {
                DomainError::cascade_halted(CascadePhase::Stars, comments_removed, 0, &e)
            })?;
        self.snippets.remove(snippet_id).map_err(|e| {
            DomainError::cascade_halted(
                CascadePhase::Snippet,
                comments_removed,
                stars_removed,
                &e,
            )
        })?;

        tracing::info!(
            snippet = %snippet_id,
            comments_removed,
            stars_removed,
            "snippet deleted"
        );
        Ok(())
    }

    /// Gets a snippet by id.
    pub fn get_snippet(&self, snippet_id: RecordId) -> DomainResult<Snippet> {
        self.snippets
            .get(snippet_id)?
            .ok_or_else(|| DomainError::not_found(RecordKind::Snippet))
    }

    /// All snippets, newest first.
    pub fn list_snippets(&self) -> DomainResult<Vec<Snippet>> {
        self.snippets.list_newest_first()
    }

    /// Snippets owned by the given subject, newest first.
    pub fn snippets_by_owner(&self, subject: &str) -> DomainResult<Vec<Snippet>> {
        self.snippets.by_owner(subject)
    }

    // --- comments ---

    /// Adds a comment to a snippet.
    pub fn add_comment(
        &self,
        ctx: &RequestContext,
        snippet_id: RecordId,
        content: &str,
    ) -> DomainResult<RecordId> {
        let identity = require_identity(ctx)?;
        let user = self
            .users
            .by_subject(&identity.subject)?
            .ok_or_else(|| DomainError::user_not_found(&identity.subject))?;
        if self.snippets.get(snippet_id)?.is_none() {
            return Err(DomainError::not_found(RecordKind::Snippet));
        }

        let comment = Comment::new(snippet_id, &identity.subject, &user.name, content);
        self.comments.insert(comment)
    }

    /// Deletes a comment. Author only.
    pub fn delete_comment(&self, ctx: &RequestContext, comment_id: RecordId) -> DomainResult<()> {
        let identity = require_identity(ctx)?;
        let comment = self
            .comments
            .get(comment_id)?
            .ok_or_else(|| DomainError::not_found(RecordKind::Comment))?;
        if comment.author_subject != identity.subject {
            return Err(DomainError::forbidden(RecordKind::Comment));
        }
        self.comments.remove(comment_id)?;
        Ok(())
    }

    /// Comments on a snippet, newest first.
    pub fn list_comments(&self, snippet_id: RecordId) -> DomainResult<Vec<Comment>> {
        self.comments.list_for_snippet(snippet_id)
    }

    // --- stars ---

    /// Flips the caller's star on a snippet.
    pub fn toggle_star(&self, ctx: &RequestContext, snippet_id: RecordId) -> DomainResult<()> {
        let identity = require_identity(ctx)?;
        if self.snippets.get(snippet_id)?.is_none() {
            return Err(DomainError::not_found(RecordKind::Snippet));
        }
        self.stars.toggle(&identity.subject, snippet_id)?;
        Ok(())
    }

    /// Whether the caller has starred the snippet.
    pub fn is_starred(&self, ctx: &RequestContext, snippet_id: RecordId) -> DomainResult<bool> {
        let identity = require_identity(ctx)?;
        Ok(self.stars.is_starred(&identity.subject, snippet_id))
    }

    /// Number of stars on a snippet. Unauthenticated.
    pub fn star_count(&self, snippet_id: RecordId) -> usize {
        self.stars.count_for_snippet(snippet_id)
    }

    /// Snippets starred by the caller, newest first.
    ///
    /// Returns an empty list, not an error, when no identity is
    /// attached.
    pub fn starred_snippets(&self, ctx: &RequestContext) -> DomainResult<Vec<Snippet>> {
        let Some(identity) = ctx.identity() else {
            return Ok(Vec::new());
        };
        let ids = self.stars.snippet_ids_for(&identity.subject)?;
        self.snippets.fetch_newest_first(&ids)
    }
}

impl Default for SnippetService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service_with_user(subject: &str) -> SnippetService {
        let service = SnippetService::new();
        service
            .sync_user(subject, "user@example.com", Some("Ada"), Some("Lovelace"))
            .unwrap();
        service
    }

    fn create(service: &SnippetService, ctx: &RequestContext) -> RecordId {
        service
            .create_snippet(ctx, "fizzbuzz", "rust", "fn main() {}")
            .unwrap()
    }

    #[test]
    fn create_requires_identity() {
        let service = service_with_user("usr_1");
        let err = service
            .create_snippet(&RequestContext::anonymous(), "t", "rust", "c")
            .unwrap_err();
        assert!(matches!(err, DomainError::AuthenticationRequired));
        assert!(service.list_snippets().unwrap().is_empty());
    }

    #[test]
    fn create_requires_synced_user() {
        let service = SnippetService::new();
        let ctx = RequestContext::authenticated("usr_unsynced");
        let err = service.create_snippet(&ctx, "t", "rust", "c").unwrap_err();
        assert!(matches!(err, DomainError::UserNotFound { .. }));
    }

    #[test]
    fn create_denormalizes_owner_name_and_subject() {
        let service = service_with_user("usr_1");
        let ctx = RequestContext::authenticated("usr_1");
        let id = create(&service, &ctx);

        let snippet = service.get_snippet(id).unwrap();
        assert_eq!(snippet.owner_subject, "usr_1");
        assert_eq!(snippet.owner_name, "Ada Lovelace ");
    }

    #[test]
    fn delete_cascades_comments_and_stars() {
        let service = service_with_user("usr_1");
        service
            .sync_user("usr_2", "g@example.com", Some("Grace"), Some("Hopper"))
            .unwrap();
        let owner = RequestContext::authenticated("usr_1");
        let other = RequestContext::authenticated("usr_2");
        let id = create(&service, &owner);

        service.add_comment(&owner, id, "mine").unwrap();
        service.add_comment(&other, id, "nice").unwrap();
        service.toggle_star(&owner, id).unwrap();
        service.toggle_star(&other, id).unwrap();

        service.delete_snippet(&owner, id).unwrap();

        assert!(matches!(
            service.get_snippet(id),
            Err(DomainError::NotFound { .. })
        ));
        assert!(service.list_comments(id).unwrap().is_empty());
        assert_eq!(service.star_count(id), 0);
    }

    #[test]
    fn delete_by_non_owner_is_forbidden() {
        let service = service_with_user("usr_1");
        service
            .sync_user("usr_2", "g@example.com", Some("Grace"), None)
            .unwrap();
        let owner = RequestContext::authenticated("usr_1");
        let intruder = RequestContext::authenticated("usr_2");
        let id = create(&service, &owner);

        let err = service.delete_snippet(&intruder, id).unwrap_err();
        assert!(matches!(err, DomainError::Forbidden { .. }));
        // Still retrievable afterwards.
        assert!(service.get_snippet(id).is_ok());
    }

    #[test]
    fn delete_missing_snippet_is_not_found() {
        let service = service_with_user("usr_1");
        let ctx = RequestContext::authenticated("usr_1");
        let err = service.delete_snippet(&ctx, RecordId::new()).unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[test]
    fn comment_delete_is_author_only() {
        let service = service_with_user("usr_1");
        service
            .sync_user("usr_2", "g@example.com", Some("Grace"), None)
            .unwrap();
        let owner = RequestContext::authenticated("usr_1");
        let other = RequestContext::authenticated("usr_2");
        let snippet = create(&service, &owner);
        let comment = service.add_comment(&other, snippet, "hello").unwrap();

        // The snippet owner is not the comment author.
        let err = service.delete_comment(&owner, comment).unwrap_err();
        assert!(matches!(err, DomainError::Forbidden { .. }));

        service.delete_comment(&other, comment).unwrap();
        assert!(service.list_comments(snippet).unwrap().is_empty());
    }

    #[test]
    fn comment_requires_existing_snippet() {
        let service = service_with_user("usr_1");
        let ctx = RequestContext::authenticated("usr_1");
        let err = service
            .add_comment(&ctx, RecordId::new(), "into the void")
            .unwrap_err();
        assert!(matches!(
            err,
            DomainError::NotFound {
                kind: RecordKind::Snippet
            }
        ));
    }

    #[test]
    fn toggle_star_twice_restores_state() {
        let service = service_with_user("usr_1");
        let ctx = RequestContext::authenticated("usr_1");
        let id = create(&service, &ctx);

        assert!(!service.is_starred(&ctx, id).unwrap());
        service.toggle_star(&ctx, id).unwrap();
        assert!(service.is_starred(&ctx, id).unwrap());
        assert_eq!(service.star_count(id), 1);

        service.toggle_star(&ctx, id).unwrap();
        assert!(!service.is_starred(&ctx, id).unwrap());
        assert_eq!(service.star_count(id), 0);
    }

    #[test]
    fn unauthenticated_mutations_change_nothing() {
        let service = service_with_user("usr_1");
        let owner = RequestContext::authenticated("usr_1");
        let id = create(&service, &owner);
        let anon = RequestContext::anonymous();

        assert!(matches!(
            service.add_comment(&anon, id, "hi"),
            Err(DomainError::AuthenticationRequired)
        ));
        assert!(matches!(
            service.toggle_star(&anon, id),
            Err(DomainError::AuthenticationRequired)
        ));
        assert!(matches!(
            service.is_starred(&anon, id),
            Err(DomainError::AuthenticationRequired)
        ));

        assert!(service.list_comments(id).unwrap().is_empty());
        assert_eq!(service.star_count(id), 0);
    }

    #[test]
    fn starred_snippets_empty_without_identity() {
        let service = service_with_user("usr_1");
        let ctx = RequestContext::authenticated("usr_1");
        let id = create(&service, &ctx);
        service.toggle_star(&ctx, id).unwrap();

        let anon = service.starred_snippets(&RequestContext::anonymous()).unwrap();
        assert!(anon.is_empty());

        let mine = service.starred_snippets(&ctx).unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].id, id);
    }

    #[test]
    fn listings_are_newest_first() {
        let service = service_with_user("usr_1");
        let ctx = RequestContext::authenticated("usr_1");
        let first = service
            .create_snippet(&ctx, "first", "rust", "a")
            .unwrap();
        let second = service
            .create_snippet(&ctx, "second", "go", "b")
            .unwrap();

        let listed = service.list_snippets().unwrap();
        assert_eq!(listed[0].id, second);
        assert_eq!(listed[1].id, first);
    }
}
