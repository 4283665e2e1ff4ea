//! Test repositories — `DocumentRepository` implementations for tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;
use trivia_core::error::DomainError;
use trivia_core::id::{Collection, RecordId};
use trivia_core::repository::{DocumentRepository, Filter, StoredDocument};

/// A fully working document store kept in memory.
///
/// Evaluates filters with [`Filter::matches`] and counts writes, so tests
/// can assert on what was persisted and how often.
#[derive(Debug, Default)]
pub struct InMemoryDocumentRepository {
    collections: Mutex<HashMap<Collection, Vec<StoredDocument>>>,
    inserts: Mutex<usize>,
    updates: Mutex<usize>,
}

impl InMemoryDocumentRepository {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of every document in `collection`.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn documents(&self, collection: Collection) -> Vec<StoredDocument> {
        self.collections
            .lock()
            .unwrap()
            .get(&collection)
            .cloned()
            .unwrap_or_default()
    }

    /// Inserts a document directly, bypassing the trait (for seeding).
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn seed(&self, collection: Collection, body: Value) -> RecordId {
        let id = RecordId::new();
        self.collections
            .lock()
            .unwrap()
            .entry(collection)
            .or_default()
            .push(StoredDocument { id, body });
        id
    }

    /// Number of successful `insert_one` calls.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn insert_count(&self) -> usize {
        *self.inserts.lock().unwrap()
    }

    /// Number of successful `update_one` calls.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn update_count(&self) -> usize {
        *self.updates.lock().unwrap()
    }
}

#[async_trait]
impl DocumentRepository for InMemoryDocumentRepository {
    async fn find(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<Vec<StoredDocument>, DomainError> {
        Ok(self
            .collections
            .lock()
            .unwrap()
            .get(&collection)
            .map(|docs| docs.iter().filter(|d| filter.matches(d)).cloned().collect())
            .unwrap_or_default())
    }

    async fn insert_one(
        &self,
        collection: Collection,
        body: Value,
    ) -> Result<RecordId, DomainError> {
        let id = self.seed(collection, body);
        *self.inserts.lock().unwrap() += 1;
        Ok(id)
    }

    async fn update_one(
        &self,
        collection: Collection,
        id: RecordId,
        body: Value,
    ) -> Result<(), DomainError> {
        let mut collections = self.collections.lock().unwrap();
        let doc = collections
            .get_mut(&collection)
            .and_then(|docs| docs.iter_mut().find(|d| d.id == id))
            .ok_or(DomainError::RecordNotFound { collection, id })?;
        doc.body = body;
        *self.updates.lock().unwrap() += 1;
        Ok(())
    }
}

/// A document repository that always returns an infrastructure error. Useful
/// for testing error-handling paths.
#[derive(Debug)]
pub struct FailingDocumentRepository;

#[async_trait]
impl DocumentRepository for FailingDocumentRepository {
    async fn find(
        &self,
        _collection: Collection,
        _filter: &Filter,
    ) -> Result<Vec<StoredDocument>, DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    async fn insert_one(
        &self,
        _collection: Collection,
        _body: Value,
    ) -> Result<RecordId, DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    async fn update_one(
        &self,
        _collection: Collection,
        _id: RecordId,
        _body: Value,
    ) -> Result<(), DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn test_in_memory_repository_round_trips_and_counts_writes() {
        // Arrange
        let repo = InMemoryDocumentRepository::new();

        // Act
        let id = repo
            .insert_one(Collection::Users, json!({ "name": "Ann" }))
            .await
            .unwrap();
        repo.update_one(Collection::Users, id, json!({ "name": "Ann", "x": 1 }))
            .await
            .unwrap();
        let found = repo
            .find(Collection::Users, &Filter::eq("name", "Ann"))
            .await
            .unwrap();

        // Assert
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, id);
        assert_eq!(found[0].body["x"], 1);
        assert_eq!(repo.insert_count(), 1);
        assert_eq!(repo.update_count(), 1);
        assert!(repo.exists(Collection::Users, id).await.unwrap());
        assert!(!repo.exists(Collection::Games, id).await.unwrap());
    }

    #[tokio::test]
    async fn test_in_memory_update_of_missing_record_is_not_found() {
        let repo = InMemoryDocumentRepository::new();
        let id = RecordId::new();

        let result = repo.update_one(Collection::Games, id, json!({})).await;

        assert!(matches!(
            result,
            Err(DomainError::RecordNotFound { collection: Collection::Games, id: missing }) if missing == id
        ));
    }
}
