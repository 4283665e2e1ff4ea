//! Save/load plumbing shared by the record types.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use trivia_core::error::DomainError;
use trivia_core::id::{Collection, RecordId};
use trivia_core::repository::{DocumentRepository, Filter, StoredDocument};
use trivia_core::write_once::WriteOnce;

/// Serializes a document body.
pub(crate) fn to_body<T: Serialize>(collection: Collection, document: &T) -> Result<Value, DomainError> {
    serde_json::to_value(document).map_err(|e| {
        DomainError::Infrastructure(format!("{collection} serialization failed: {e}"))
    })
}

/// Deserializes a stored body into its document type.
pub(crate) fn from_body<T: DeserializeOwned>(
    collection: Collection,
    stored: &StoredDocument,
) -> Result<T, DomainError> {
    serde_json::from_value(stored.body.clone()).map_err(|e| {
        DomainError::Infrastructure(format!(
            "{collection} record {} is malformed: {e}",
            stored.id
        ))
    })
}

/// Loads exactly one document by identity.
pub(crate) async fn load_one(
    repo: &dyn DocumentRepository,
    collection: Collection,
    id: RecordId,
) -> Result<StoredDocument, DomainError> {
    repo.find(collection, &Filter::Id(id))
        .await?
        .into_iter()
        .next()
        .ok_or(DomainError::RecordNotFound { collection, id })
}

/// Inserts `body` when `id` is unassigned, otherwise replaces the stored
/// document. A first insert is refused when an identical document exists.
pub(crate) async fn save(
    repo: &dyn DocumentRepository,
    collection: Collection,
    id: &mut WriteOnce<RecordId>,
    body: Value,
) -> Result<RecordId, DomainError> {
    if let Some(existing) = id.value() {
        repo.update_one(collection, existing, body).await?;
        return Ok(existing);
    }

    let duplicates = repo.find(collection, &Filter::Matches(body.clone())).await?;
    if let Some(duplicate) = duplicates.first() {
        return Err(DomainError::Conflict(format!(
            "an identical {collection} record already exists ({})",
            duplicate.id
        )));
    }

    let assigned = repo.insert_one(collection, body).await?;
    id.set(assigned)?;
    Ok(assigned)
}
