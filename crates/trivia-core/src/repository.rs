//! Document repository abstraction.
//!
//! Records are persisted as JSON objects grouped into collections. The
//! [`Filter`] type is the small query language the quiz needs; adapters
//! either evaluate it directly ([`Filter::matches`]) or translate it into
//! their native query form.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::DomainError;
use crate::id::{Collection, RecordId};

/// A document as returned by the repository.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    /// Identity assigned on insert.
    pub id: RecordId,
    /// The persisted body (always a JSON object).
    pub body: Value,
}

/// Predicate over stored documents.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Matches the document with this identity.
    Id(RecordId),
    /// `body[field] == value`.
    Eq(String, Value),
    /// `body[field]` is absent or not any of the values.
    NotIn(String, Vec<Value>),
    /// `body[field]` is an array containing every one of the values.
    ContainsAll(String, Vec<Value>),
    /// The whole body equals this value.
    Matches(Value),
    /// Every inner filter matches.
    And(Vec<Filter>),
}

impl Filter {
    /// Shorthand for [`Filter::Eq`].
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Eq(field.into(), value.into())
    }

    /// Evaluates the filter against a document.
    #[must_use]
    pub fn matches(&self, doc: &StoredDocument) -> bool {
        match self {
            Self::Id(id) => doc.id == *id,
            Self::Eq(field, value) => doc.body.get(field) == Some(value),
            Self::NotIn(field, values) => doc
                .body
                .get(field)
                .is_none_or(|current| !values.contains(current)),
            Self::ContainsAll(field, values) => match doc.body.get(field) {
                Some(Value::Array(items)) => values.iter().all(|v| items.contains(v)),
                _ => false,
            },
            Self::Matches(body) => doc.body == *body,
            Self::And(filters) => filters.iter().all(|f| f.matches(doc)),
        }
    }
}

/// Repository trait for loading and saving documents.
#[async_trait]
pub trait DocumentRepository: Send + Sync {
    /// Returns every document in `collection` matching `filter`, in insertion order.
    async fn find(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<Vec<StoredDocument>, DomainError>;

    /// Inserts a new document and returns its assigned identity.
    async fn insert_one(&self, collection: Collection, body: Value)
    -> Result<RecordId, DomainError>;

    /// Replaces the body of an existing document.
    ///
    /// Returns `DomainError::RecordNotFound` if no document has that identity.
    async fn update_one(
        &self,
        collection: Collection,
        id: RecordId,
        body: Value,
    ) -> Result<(), DomainError>;

    /// Returns whether a document with this identity exists.
    async fn exists(&self, collection: Collection, id: RecordId) -> Result<bool, DomainError> {
        Ok(!self.find(collection, &Filter::Id(id)).await?.is_empty())
    }
}
