//! Snippet directory.

use crate::error::DomainResult;
use crate::model::Snippet;
use parking_lot::RwLock;
use snipshare_store::{Collection, HashIndex, IndexSpec, RecordId};

struct SnippetState {
    snippets: Collection<Snippet>,
    by_owner: HashIndex<String>,
}

/// Directory of snippets, indexed by owner subject.
pub struct SnippetDirectory {
    state: RwLock<SnippetState>,
}

impl SnippetDirectory {
    /// Creates an empty snippet directory.
    pub fn new() -> Self {
        Self {
            state: RwLock::new(SnippetState {
                snippets: Collection::new("snippets"),
                by_owner: HashIndex::new(IndexSpec::new("snippets", "by_owner")),
            }),
        }
    }

    /// Inserts a snippet.
    pub fn insert(&self, snippet: Snippet) -> DomainResult<RecordId> {
        let mut state = self.state.write();
        let id = snippet.id;
        state.snippets.put(&snippet)?;
        state.by_owner.insert(snippet.owner_subject.clone(), id)?;
        Ok(id)
    }

    /// Gets a snippet by id.
    pub fn get(&self, id: RecordId) -> DomainResult<Option<Snippet>> {
        Ok(self.state.read().snippets.get(id)?)
    }

    /// Removes a snippet. Returns whether it was present.
    pub fn remove(&self, id: RecordId) -> DomainResult<bool> {
        let mut state = self.state.write();
        let Some(snippet) = state.snippets.get(id)? else {
            return Ok(false);
        };
        state.by_owner.remove(&snippet.owner_subject, id);
        Ok(state.snippets.remove(id))
    }

    /// All snippets, newest first.
    pub fn list_newest_first(&self) -> DomainResult<Vec<Snippet>> {
        Ok(self.state.read().snippets.scan_newest_first()?)
    }

    /// Snippets owned by the given subject, newest first.
    pub fn by_owner(&self, subject: &str) -> DomainResult<Vec<Snippet>> {
        let state = self.state.read();
        let ids = state.by_owner.lookup(&subject.to_string());
        Ok(state.snippets.fetch_newest_first(&ids)?)
    }

    /// Decodes the given snippets, newest first. Absent ids are skipped.
    pub fn fetch_newest_first(&self, ids: &[RecordId]) -> DomainResult<Vec<Snippet>> {
        Ok(self.state.read().snippets.fetch_newest_first(ids)?)
    }

    /// Returns the number of snippets.
    pub fn len(&self) -> usize {
        self.state.read().snippets.len()
    }

    /// Returns true if no snippets exist.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for SnippetDirectory {
    fn default() -> Self {
        Self::new()
    }
}
