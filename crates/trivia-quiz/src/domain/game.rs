//! The `Game` record.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use trivia_core::clock::Clock;
use trivia_core::error::{DomainError, ValidationError};
use trivia_core::id::{Collection, RecordId};
use trivia_core::repository::{DocumentRepository, Filter, StoredDocument};
use trivia_core::unique_ids::UniqueIdSet;
use trivia_core::write_once::WriteOnce;

use super::persistence;
use super::question_code::QuestionCode;

#[derive(Debug, Serialize, Deserialize)]
struct GameDocument {
    date: Option<DateTime<Utc>>,
    users: Vec<RecordId>,
    questions: Vec<QuestionCode>,
    winner: Option<RecordId>,
    is_finished: bool,
    #[serde(default)]
    scores: BTreeMap<RecordId, u32>,
}

/// One run of the quiz by a fixed set of participants.
///
/// Scores are kept per participant id. The positional score vector views
/// expose is derived from them in participant order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Game {
    id: WriteOnce<RecordId>,
    participants: UniqueIdSet,
    question_history: Vec<QuestionCode>,
    scores: BTreeMap<RecordId, u32>,
    winner: WriteOnce<RecordId>,
    finished: bool,
    started_at: WriteOnce<DateTime<Utc>>,
}

impl Default for Game {
    fn default() -> Self {
        Self {
            id: WriteOnce::unset("game.id"),
            participants: UniqueIdSet::referencing(Collection::Users),
            question_history: Vec::new(),
            scores: BTreeMap::new(),
            winner: WriteOnce::unset("game.winner"),
            finished: false,
            started_at: WriteOnce::unset("game.date"),
        }
    }
}

impl Game {
    /// Creates a fresh, unsaved game.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Identity, once persisted.
    #[must_use]
    pub fn id(&self) -> Option<RecordId> {
        self.id.value()
    }

    /// Participant ids in join order.
    #[must_use]
    pub fn participants(&self) -> &UniqueIdSet {
        &self.participants
    }

    /// Adds a stored user to a game that has not been saved yet.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::ParticipantsFixed` once the game has an
    /// identity, or the set's validation errors.
    pub async fn add_participant(
        &mut self,
        user_id: RecordId,
        repo: &dyn DocumentRepository,
    ) -> Result<(), DomainError> {
        if self.id.is_set() {
            return Err(ValidationError::ParticipantsFixed.into());
        }
        self.participants.append(user_id, repo).await
    }

    /// Codes of the questions asked in this game, in order.
    #[must_use]
    pub fn question_history(&self) -> &[QuestionCode] {
        &self.question_history
    }

    /// Appends `code` unless it was already asked. Returns whether it was new.
    pub fn record_question(&mut self, code: &QuestionCode) -> bool {
        if self.question_history.contains(code) {
            return false;
        }
        self.question_history.push(code.clone());
        true
    }

    /// Overwrites the score of a participant. Non-participants are ignored.
    pub fn set_score(&mut self, user_id: RecordId, score: u32) {
        if self.participants.contains(user_id) {
            self.scores.insert(user_id, score);
        }
    }

    /// A participant's score, zero if none was recorded.
    #[must_use]
    pub fn score_of(&self, user_id: RecordId) -> u32 {
        self.scores.get(&user_id).copied().unwrap_or(0)
    }

    /// Scores aligned with participant order.
    #[must_use]
    pub fn score_vector(&self) -> Vec<u32> {
        self.participants.iter().map(|id| self.score_of(id)).collect()
    }

    /// The winner, if one was declared.
    #[must_use]
    pub fn winner(&self) -> Option<RecordId> {
        self.winner.value()
    }

    /// Whether the game has been finished.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// When the game was first saved.
    #[must_use]
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at.value()
    }

    /// Marks the game finished, recording `winner` if given.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::AlreadyAssigned` if a different winner was
    /// already recorded.
    pub fn finish(&mut self, winner: Option<RecordId>) -> Result<(), ValidationError> {
        if let Some(winner) = winner {
            self.winner.set(winner)?;
        }
        self.finished = true;
        Ok(())
    }

    /// The canonical stored form.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if serialization fails.
    pub fn to_document(&self) -> Result<Value, DomainError> {
        persistence::to_body(
            Collection::Games,
            &GameDocument {
                date: self.started_at.value(),
                users: self.participants.as_slice().to_vec(),
                questions: self.question_history.clone(),
                winner: self.winner.value(),
                is_finished: self.finished,
                scores: self.scores.clone(),
            },
        )
    }

    fn from_stored(stored: &StoredDocument) -> Result<Self, DomainError> {
        let doc: GameDocument = persistence::from_body(Collection::Games, stored)?;
        Ok(Self {
            id: WriteOnce::with_value("game.id", stored.id),
            participants: UniqueIdSet::restore(Collection::Users, doc.users),
            question_history: doc.questions,
            scores: doc.scores,
            winner: WriteOnce::restore("game.winner", doc.winner),
            finished: doc.is_finished,
            started_at: WriteOnce::restore("game.date", doc.date),
        })
    }

    /// Loads a game by identity.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::RecordNotFound` if no such game exists.
    pub async fn load_by_id(
        repo: &dyn DocumentRepository,
        id: RecordId,
    ) -> Result<Self, DomainError> {
        let stored = persistence::load_one(repo, Collection::Games, id).await?;
        Self::from_stored(&stored)
    }

    /// Loads every game matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns the repository's error or `DomainError::Infrastructure` for
    /// a malformed record.
    pub async fn load_by_query(
        repo: &dyn DocumentRepository,
        filter: &Filter,
    ) -> Result<Vec<Self>, DomainError> {
        repo.find(Collection::Games, filter)
            .await?
            .iter()
            .map(Self::from_stored)
            .collect()
    }

    /// Finds an unfinished game played by exactly `user_ids`, in any order.
    ///
    /// When several qualify, the most recently created one wins.
    ///
    /// # Errors
    ///
    /// Returns the repository's error.
    pub async fn find_by_participants(
        repo: &dyn DocumentRepository,
        user_ids: &[RecordId],
    ) -> Result<Option<Self>, DomainError> {
        if user_ids.is_empty() {
            return Ok(None);
        }
        let members = user_ids
            .iter()
            .map(|id| Value::String(id.to_string()))
            .collect();
        let filter = Filter::And(vec![
            Filter::eq("is_finished", false),
            Filter::ContainsAll("users".to_owned(), members),
        ]);
        let candidates = Self::load_by_query(repo, &filter).await?;
        Ok(candidates
            .into_iter()
            .rev()
            .find(|game| game.participants.same_members(user_ids)))
    }

    /// Persists the game, stamping its start time on the first save.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Conflict` for a duplicate first insert, or the
    /// repository's error.
    pub async fn save(
        &mut self,
        repo: &dyn DocumentRepository,
        clock: &dyn Clock,
    ) -> Result<RecordId, DomainError> {
        if !self.started_at.is_set() {
            self.started_at.set(clock.now())?;
        }
        let body = self.to_document()?;
        persistence::save(repo, Collection::Games, &mut self.id, body).await
    }
}
