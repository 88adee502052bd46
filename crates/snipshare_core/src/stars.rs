//! Star directory.
//!
//! Membership is unique per (subject, snippet). The toggle's
//! check-and-flip runs entirely under the directory write lock, so two
//! concurrent toggles serialize instead of both observing the same
//! state. The unique index remains as a backstop: if an insert ever
//! hits a unique violation the star is treated as already present and
//! the toggle resolves by removing it.

use crate::error::DomainResult;
use crate::model::Star;
use parking_lot::RwLock;
use snipshare_store::{Collection, HashIndex, IndexSpec, PairKey, RecordId, StoreError};

/// Outcome of a star toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StarToggle {
    /// A star was created.
    Starred,
    /// An existing star was removed.
    Unstarred,
}

struct StarState {
    stars: Collection<Star>,
    by_snippet: HashIndex<RecordId>,
    by_user: HashIndex<String>,
    by_user_and_snippet: HashIndex<PairKey<String, RecordId>>,
}

impl StarState {
    fn unlink(&mut self, star_id: RecordId, key: &PairKey<String, RecordId>) {
        self.by_user_and_snippet.remove(key, star_id);
        self.by_snippet.remove(&key.second, star_id);
        self.by_user.remove(&key.first, star_id);
        self.stars.remove(star_id);
    }
}

/// Directory of stars with the uniqueness invariant.
pub struct StarDirectory {
    state: RwLock<StarState>,
}

impl StarDirectory {
    /// Creates an empty star directory.
    pub fn new() -> Self {
        Self {
            state: RwLock::new(StarState {
                stars: Collection::new("stars"),
                by_snippet: HashIndex::new(IndexSpec::new("stars", "by_snippet")),
                by_user: HashIndex::new(IndexSpec::new("stars", "by_user")),
                by_user_and_snippet: HashIndex::new(
                    IndexSpec::new("stars", "by_user_and_snippet").unique(),
                ),
            }),
        }
    }

    /// Flips the caller's star on a snippet.
    ///
    /// Removes the star if present, creates it otherwise. Atomic with
    /// respect to other toggles: the lookup and the flip happen under
    /// one write lock.
    pub fn toggle(&self, subject: &str, snippet_id: RecordId) -> DomainResult<StarToggle> {
        let key = PairKey::new(subject.to_string(), snippet_id);
        let mut state = self.state.write();

        if let Some(existing) = state.by_user_and_snippet.lookup_unique(&key) {
            state.unlink(existing, &key);
            return Ok(StarToggle::Unstarred);
        }

        let star = Star::new(subject, snippet_id);
        let id = star.id;
        match state.by_user_and_snippet.insert(key.clone(), id) {
            Ok(()) => {}
            Err(StoreError::UniqueViolation { .. }) => {
                // Backstop: someone holds the pair already. Resolve the
                // toggle as an un-star instead of erroring.
                if let Some(existing) = state.by_user_and_snippet.lookup_unique(&key) {
                    state.unlink(existing, &key);
                }
                return Ok(StarToggle::Unstarred);
            }
            Err(e) => return Err(e.into()),
        }
        if let Err(e) = state.stars.put(&star) {
            // Keep the unique index consistent with the collection.
            state.by_user_and_snippet.remove(&key, id);
            return Err(e.into());
        }
        state.by_snippet.insert(snippet_id, id)?;
        state.by_user.insert(subject.to_string(), id)?;
        Ok(StarToggle::Starred)
    }

    /// Whether the subject has starred the snippet.
    pub fn is_starred(&self, subject: &str, snippet_id: RecordId) -> bool {
        let key = PairKey::new(subject.to_string(), snippet_id);
        self.state.read().by_user_and_snippet.contains(&key)
    }

    /// Number of stars on the snippet.
    pub fn count_for_snippet(&self, snippet_id: RecordId) -> usize {
        self.state.read().by_snippet.count_for(&snippet_id)
    }

    /// Ids of the snippets starred by the subject.
    pub fn snippet_ids_for(&self, subject: &str) -> DomainResult<Vec<RecordId>> {
        let state = self.state.read();
        let star_ids = state.by_user.lookup(&subject.to_string());
        let mut snippet_ids = Vec::with_capacity(star_ids.len());
        for star_id in star_ids {
            if let Some(star) = state.stars.get(star_id)? {
                snippet_ids.push(star.snippet_id);
            }
        }
        Ok(snippet_ids)
    }

    /// Removes every star referencing the snippet. Returns the count.
    pub fn remove_all_for_snippet(&self, snippet_id: RecordId) -> DomainResult<usize> {
        let mut state = self.state.write();
        let star_ids = state.by_snippet.lookup(&snippet_id);
        let mut removed = 0;
        for star_id in star_ids {
            let Some(star) = state.stars.get(star_id)? else {
                continue;
            };
            let key = PairKey::new(star.subject, snippet_id);
            state.unlink(star_id, &key);
            removed += 1;
        }
        Ok(removed)
    }

    /// Returns the number of stars.
    pub fn len(&self) -> usize {
        self.state.read().stars.len()
    }

    /// Returns true if no stars exist.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for StarDirectory {
    fn default() -> Self {
        Self::new()
    }
}
