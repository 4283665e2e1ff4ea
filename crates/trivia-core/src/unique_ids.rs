//! Order-preserving set of record ids with referential integrity.

use crate::error::{DomainError, ValidationError};
use crate::id::{Collection, RecordId};
use crate::repository::DocumentRepository;

/// An insertion-ordered set of ids that all refer to records in one
/// collection.
///
/// Every insert is checked against the repository: the id must resolve to
/// a stored record and must not already be in the set. There is no removal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniqueIdSet {
    collection: Collection,
    ids: Vec<RecordId>,
}

impl UniqueIdSet {
    /// Creates an empty set whose ids must exist in `collection`.
    #[must_use]
    pub fn referencing(collection: Collection) -> Self {
        Self {
            collection,
            ids: Vec::new(),
        }
    }

    /// Rebuilds a set from stored ids without re-checking them.
    ///
    /// Repeated ids are dropped, keeping the first occurrence.
    #[must_use]
    pub fn restore(collection: Collection, ids: impl IntoIterator<Item = RecordId>) -> Self {
        let mut set = Self::referencing(collection);
        for id in ids {
            if !set.contains(id) {
                set.ids.push(id);
            }
        }
        set
    }

    /// The collection the ids refer to.
    #[must_use]
    pub fn collection(&self) -> Collection {
        self.collection
    }

    /// Appends `id` after validating it.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::DuplicateId` if the id is already present,
    /// `ValidationError::UnknownId` if no such record exists, or the
    /// repository's error if the existence check fails.
    pub async fn append(
        &mut self,
        id: RecordId,
        repo: &dyn DocumentRepository,
    ) -> Result<(), DomainError> {
        self.validate(id, repo).await?;
        self.ids.push(id);
        Ok(())
    }

    /// Replaces the id at `index` after validating the new one.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::IndexOutOfRange` for a bad index, otherwise
    /// the same errors as [`UniqueIdSet::append`].
    pub async fn set(
        &mut self,
        index: usize,
        id: RecordId,
        repo: &dyn DocumentRepository,
    ) -> Result<(), DomainError> {
        if index >= self.ids.len() {
            return Err(ValidationError::IndexOutOfRange {
                index,
                len: self.ids.len(),
            }
            .into());
        }
        self.validate(id, repo).await?;
        self.ids[index] = id;
        Ok(())
    }

    async fn validate(&self, id: RecordId, repo: &dyn DocumentRepository) -> Result<(), DomainError> {
        if self.contains(id) {
            return Err(ValidationError::DuplicateId(id).into());
        }
        if !repo.exists(self.collection, id).await? {
            return Err(ValidationError::UnknownId {
                collection: self.collection,
                id,
            }
            .into());
        }
        Ok(())
    }

    /// Returns the id at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<RecordId> {
        self.ids.get(index).copied()
    }

    /// Returns whether `id` is in the set.
    #[must_use]
    pub fn contains(&self, id: RecordId) -> bool {
        self.ids.contains(&id)
    }

    /// Iterates ids in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = RecordId> + '_ {
        self.ids.iter().copied()
    }

    /// Number of ids.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// The ids as a slice, in insertion order.
    #[must_use]
    pub fn as_slice(&self) -> &[RecordId] {
        &self.ids
    }

    /// Whether both sets hold the same ids, ignoring order.
    #[must_use]
    pub fn same_members(&self, ids: &[RecordId]) -> bool {
        self.ids.len() == ids.len() && ids.iter().all(|id| self.contains(*id))
    }
}
