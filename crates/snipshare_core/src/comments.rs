//! Comment directory.

use crate::error::DomainResult;
use crate::model::Comment;
use parking_lot::RwLock;
use snipshare_store::{Collection, HashIndex, IndexSpec, RecordId};

struct CommentState {
    comments: Collection<Comment>,
    by_snippet: HashIndex<RecordId>,
}

/// Directory of comments, indexed by snippet.
pub struct CommentDirectory {
    state: RwLock<CommentState>,
}

impl CommentDirectory {
    /// Creates an empty comment directory.
    pub fn new() -> Self {
        Self {
            state: RwLock::new(CommentState {
                comments: Collection::new("comments"),
                by_snippet: HashIndex::new(IndexSpec::new("comments", "by_snippet")),
            }),
        }
    }

    /// Inserts a comment.
    pub fn insert(&self, comment: Comment) -> DomainResult<RecordId> {
        let mut state = self.state.write();
        let id = comment.id;
        state.comments.put(&comment)?;
        state.by_snippet.insert(comment.snippet_id, id)?;
        Ok(id)
    }

    /// Gets a comment by id.
    pub fn get(&self, id: RecordId) -> DomainResult<Option<Comment>> {
        Ok(self.state.read().comments.get(id)?)
    }

    /// Removes a comment. Returns whether it was present.
    pub fn remove(&self, id: RecordId) -> DomainResult<bool> {
        let mut state = self.state.write();
        let Some(comment) = state.comments.get(id)? else {
            return Ok(false);
        };
        state.by_snippet.remove(&comment.snippet_id, id);
        Ok(state.comments.remove(id))
    }

    /// Comments on the given snippet, newest first.
    pub fn list_for_snippet(&self, snippet_id: RecordId) -> DomainResult<Vec<Comment>> {
        let state = self.state.read();
        let ids = state.by_snippet.lookup(&snippet_id);
        Ok(state.comments.fetch_newest_first(&ids)?)
    }

    /// Removes every comment referencing the snippet. Returns the count.
    ///
    /// Runs under one write lock, so no comment can be added to the
    /// snippet while the sweep is in flight.
    pub fn remove_all_for_snippet(&self, snippet_id: RecordId) -> DomainResult<usize> {
        let mut state = self.state.write();
        let ids = state.by_snippet.lookup(&snippet_id);
        let mut removed = 0;
        for id in ids {
            state.by_snippet.remove(&snippet_id, id);
            if state.comments.remove(id) {
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// Returns the number of comments.
    pub fn len(&self) -> usize {
        self.state.read().comments.len()
    }

    /// Returns true if no comments exist.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for CommentDirectory {
    fn default() -> Self {
        Self::new()
    }
}
