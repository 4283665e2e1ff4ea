//! Domain error types.

use thiserror::Error;

use crate::id::{Collection, RecordId};

/// Top-level domain error type.
///
/// Everything here propagates to the caller unchanged. Soft failures
/// (an answer from an unknown participant, an invalid choice letter) are
/// not errors and are reported as values by the quiz context instead.
#[derive(Debug, Error)]
pub enum DomainError {
    /// A record lookup by identity found nothing.
    #[error("{collection} record not found: {id}")]
    RecordNotFound {
        /// The collection that was searched.
        collection: Collection,
        /// The identity that was looked up.
        id: RecordId,
    },

    /// An insert would duplicate a record that already exists.
    #[error("conflict: {0}")]
    Conflict(String),

    /// A validation rule was violated.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The external question provider failed or returned unusable data.
    #[error("question provider error: {0}")]
    Provider(String),

    /// An infrastructure/persistence error.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}

/// Validation failures raised to the immediate caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A write-once field was assigned a second time.
    #[error("field `{field}` is already assigned")]
    AlreadyAssigned {
        /// Name of the write-once field.
        field: &'static str,
    },

    /// An identifier is already present in a unique set.
    #[error("id {0} is already in the set")]
    DuplicateId(RecordId),

    /// An identifier does not resolve to a stored record.
    #[error("no {collection} record with id {id}")]
    UnknownId {
        /// The collection the id should belong to.
        collection: Collection,
        /// The unresolved id.
        id: RecordId,
    },

    /// Positional assignment outside the current bounds.
    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange {
        /// The requested index.
        index: usize,
        /// The container length.
        len: usize,
    },

    /// A value is not a permutation of the four answer slots.
    #[error("invalid answer permutation: {0:?}")]
    InvalidPermutation(Vec<u8>),

    /// Question content is malformed.
    #[error("invalid question: {0}")]
    InvalidQuestion(String),

    /// Participants are fixed while a game is running.
    #[error("cannot register `{0}`: a game is in progress")]
    GameInProgress(String),

    /// A game cannot start without participants.
    #[error("no users are registered")]
    NoUsersLoaded,

    /// The operation requires an active game.
    #[error("no game is active")]
    NoActiveGame,

    /// A record must be persisted before it can be referenced.
    #[error("{0} record has no identity yet")]
    Unsaved(Collection),

    /// A required field was never assigned.
    #[error("field `{0}` is not assigned")]
    MissingField(&'static str),

    /// A started game's participant set cannot change.
    #[error("participants of a started game are fixed")]
    ParticipantsFixed,
}
