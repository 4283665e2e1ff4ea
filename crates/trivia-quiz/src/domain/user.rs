//! The `User` record.

use serde::{Deserialize, Serialize};
use tracing::debug;
use trivia_core::error::{DomainError, ValidationError};
use trivia_core::id::{Collection, RecordId};
use trivia_core::repository::{DocumentRepository, Filter, StoredDocument};
use trivia_core::unique_ids::UniqueIdSet;
use trivia_core::write_once::WriteOnce;

use super::persistence;
use super::question_code::QuestionCode;

#[derive(Debug, Serialize, Deserialize)]
struct UserDocument {
    name: Option<String>,
    correct_answers: u32,
    questions: Vec<QuestionCode>,
    games: Vec<RecordId>,
}

/// A quiz participant and their lifetime statistics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: WriteOnce<RecordId>,
    name: WriteOnce<String>,
    correct_answers: u32,
    question_history: Vec<QuestionCode>,
    games: UniqueIdSet,
}

impl Default for User {
    fn default() -> Self {
        Self {
            id: WriteOnce::unset("user.id"),
            name: WriteOnce::unset("user.name"),
            correct_answers: 0,
            question_history: Vec::new(),
            games: UniqueIdSet::referencing(Collection::Games),
        }
    }
}

impl User {
    /// Creates an unsaved user with every field at its default.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an unsaved user with the given name.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        let mut user = Self::new();
        user.name = WriteOnce::with_value("user.name", name.into());
        user
    }

    /// Identity, once persisted.
    #[must_use]
    pub fn id(&self) -> Option<RecordId> {
        self.id.value()
    }

    /// The user's name, if assigned.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.get().map(String::as_str)
    }

    /// Assigns the name.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::AlreadyAssigned` if the user already has one.
    pub fn set_name(&mut self, name: impl Into<String>) -> Result<(), ValidationError> {
        self.name.set(name.into())
    }

    /// Lifetime count of correctly answered questions.
    #[must_use]
    pub fn correct_answers(&self) -> u32 {
        self.correct_answers
    }

    /// Codes of every question this user was asked, oldest first.
    #[must_use]
    pub fn question_history(&self) -> &[QuestionCode] {
        &self.question_history
    }

    /// Games this user took part in.
    #[must_use]
    pub fn games(&self) -> &UniqueIdSet {
        &self.games
    }

    /// Records that the user was asked `code`, counting it if answered
    /// correctly.
    pub fn record_answer(&mut self, code: QuestionCode, correct: bool) {
        if correct {
            self.correct_answers += 1;
        }
        self.question_history.push(code);
    }

    /// Adds a stored game to the user's history.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the game is unknown or already listed.
    pub async fn join_game(
        &mut self,
        game_id: RecordId,
        repo: &dyn DocumentRepository,
    ) -> Result<(), DomainError> {
        self.games.append(game_id, repo).await
    }

    /// The canonical stored form.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if serialization fails.
    pub fn to_document(&self) -> Result<serde_json::Value, DomainError> {
        persistence::to_body(
            Collection::Users,
            &UserDocument {
                name: self.name.get().cloned(),
                correct_answers: self.correct_answers,
                questions: self.question_history.clone(),
                games: self.games.as_slice().to_vec(),
            },
        )
    }

    fn from_stored(stored: &StoredDocument) -> Result<Self, DomainError> {
        let doc: UserDocument = persistence::from_body(Collection::Users, stored)?;
        Ok(Self {
            id: WriteOnce::with_value("user.id", stored.id),
            name: WriteOnce::restore("user.name", doc.name),
            correct_answers: doc.correct_answers,
            question_history: doc.questions,
            games: UniqueIdSet::restore(Collection::Games, doc.games),
        })
    }

    /// Loads a user by identity.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::RecordNotFound` if no such user exists.
    pub async fn load_by_id(
        repo: &dyn DocumentRepository,
        id: RecordId,
    ) -> Result<Self, DomainError> {
        let stored = persistence::load_one(repo, Collection::Users, id).await?;
        Self::from_stored(&stored)
    }

    /// Loads every user matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns the repository's error or `DomainError::Infrastructure` for
    /// a malformed record.
    pub async fn load_by_query(
        repo: &dyn DocumentRepository,
        filter: &Filter,
    ) -> Result<Vec<Self>, DomainError> {
        repo.find(Collection::Users, filter)
            .await?
            .iter()
            .map(Self::from_stored)
            .collect()
    }

    /// Loads the user called `name`, creating and persisting one if none
    /// exists yet.
    ///
    /// # Errors
    ///
    /// Returns the repository's error.
    pub async fn find_or_create_by_name(
        repo: &dyn DocumentRepository,
        name: &str,
    ) -> Result<Self, DomainError> {
        let existing = Self::load_by_query(repo, &Filter::eq("name", name)).await?;
        if let Some(user) = existing.into_iter().next() {
            return Ok(user);
        }
        let mut user = Self::named(name);
        let id = user.save(repo).await?;
        debug!(user_id = %id, name, "Created user");
        Ok(user)
    }

    /// Persists the user.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Conflict` for a duplicate first insert, or the
    /// repository's error.
    pub async fn save(&mut self, repo: &dyn DocumentRepository) -> Result<RecordId, DomainError> {
        let body = self.to_document()?;
        persistence::save(repo, Collection::Users, &mut self.id, body).await
    }
}
