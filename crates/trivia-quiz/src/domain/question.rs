//! The `Question` record.

use serde::{Deserialize, Serialize};
use trivia_core::error::{DomainError, ValidationError};
use trivia_core::id::{Collection, RecordId};
use trivia_core::provider::{INCORRECT_ANSWER_COUNT, ProviderQuestion};
use trivia_core::repository::{DocumentRepository, Filter, StoredDocument};
use trivia_core::write_once::WriteOnce;

use super::answer::{ANSWER_SLOTS, AnswerPermutation, AnswerSlot};
use super::persistence;
use super::question_code::QuestionCode;

/// Stored form of a question.
#[derive(Debug, Serialize, Deserialize)]
struct QuestionDocument {
    question: String,
    category: String,
    correct_answer: String,
    incorrect_answers: Vec<String>,
    question_code: QuestionCode,
}

/// A multiple-choice question. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    id: WriteOnce<RecordId>,
    code: QuestionCode,
    category: String,
    text: String,
    correct_answer: String,
    incorrect_answers: [String; INCORRECT_ANSWER_COUNT],
}

impl Question {
    /// Builds an unsaved question from provider content, deriving its code.
    #[must_use]
    pub fn from_provider(question: ProviderQuestion) -> Self {
        Self {
            id: WriteOnce::unset("question.id"),
            code: QuestionCode::derive(&question.text),
            category: question.category,
            text: question.text,
            correct_answer: question.correct_answer,
            incorrect_answers: question.incorrect_answers,
        }
    }

    /// Identity, once persisted.
    #[must_use]
    pub fn id(&self) -> Option<RecordId> {
        self.id.value()
    }

    /// The question's code.
    #[must_use]
    pub fn code(&self) -> &QuestionCode {
        &self.code
    }

    /// Category label.
    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Question text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The correct answer's text.
    #[must_use]
    pub fn correct_answer(&self) -> &str {
        &self.correct_answer
    }

    /// The answers in display order under `permutation`, paired with slots.
    #[must_use]
    pub fn answers(&self, permutation: AnswerPermutation) -> Vec<(AnswerSlot, &str)> {
        (0..ANSWER_SLOTS)
            .filter_map(|index| AnswerSlot::try_from(index).ok())
            .map(|slot| {
                let text = match permutation.answer_at(slot) {
                    0 => self.correct_answer.as_str(),
                    n => self.incorrect_answers[n - 1].as_str(),
                };
                (slot, text)
            })
            .collect()
    }

    /// The canonical stored form.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if serialization fails.
    pub fn to_document(&self) -> Result<serde_json::Value, DomainError> {
        persistence::to_body(
            Collection::Questions,
            &QuestionDocument {
                question: self.text.clone(),
                category: self.category.clone(),
                correct_answer: self.correct_answer.clone(),
                incorrect_answers: self.incorrect_answers.to_vec(),
                question_code: self.code.clone(),
            },
        )
    }

    fn from_stored(stored: &StoredDocument) -> Result<Self, DomainError> {
        let doc: QuestionDocument = persistence::from_body(Collection::Questions, stored)?;
        let incorrect_answers: [String; INCORRECT_ANSWER_COUNT] =
            doc.incorrect_answers.try_into().map_err(|answers: Vec<String>| {
                ValidationError::InvalidQuestion(format!(
                    "question {} has {} incorrect answers",
                    stored.id,
                    answers.len()
                ))
            })?;
        Ok(Self {
            id: WriteOnce::with_value("question.id", stored.id),
            code: doc.question_code,
            category: doc.category,
            text: doc.question,
            correct_answer: doc.correct_answer,
            incorrect_answers,
        })
    }

    /// Loads a question by identity.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::RecordNotFound` if no such question exists.
    pub async fn load_by_id(
        repo: &dyn DocumentRepository,
        id: RecordId,
    ) -> Result<Self, DomainError> {
        let stored = persistence::load_one(repo, Collection::Questions, id).await?;
        Self::from_stored(&stored)
    }

    /// Loads every question matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns the repository's error, or `DomainError` if a stored
    /// question is malformed.
    pub async fn load_by_query(
        repo: &dyn DocumentRepository,
        filter: &Filter,
    ) -> Result<Vec<Self>, DomainError> {
        repo.find(Collection::Questions, filter)
            .await?
            .iter()
            .map(Self::from_stored)
            .collect()
    }

    /// Persists the question.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Conflict` when an identical question is
    /// already stored, or the repository's error.
    pub async fn save(&mut self, repo: &dyn DocumentRepository) -> Result<RecordId, DomainError> {
        let body = self.to_document()?;
        persistence::save(repo, Collection::Questions, &mut self.id, body).await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use trivia_test_support::{InMemoryDocumentRepository, sample_question};

    use super::*;

    #[tokio::test]
    async fn test_save_then_load_round_trips_and_rejects_duplicates() {
        // Arrange
        let repo = InMemoryDocumentRepository::new();
        let mut question = Question::from_provider(sample_question("Capital of Peru?"));

        // Act
        let id = question.save(&repo).await.unwrap();
        let loaded = Question::load_by_id(&repo, id).await.unwrap();
        let mut twin = Question::from_provider(sample_question("Capital of Peru?"));
        let duplicate = twin.save(&repo).await;

        // Assert
        assert_eq!(loaded, question);
        assert_eq!(loaded.code(), &QuestionCode::derive("Capital of Peru?"));
        assert!(matches!(duplicate, Err(DomainError::Conflict(_))));
        assert_eq!(repo.insert_count(), 1);
    }

    #[test]
    fn test_stored_form_uses_question_field_names() {
        let question = Question::from_provider(sample_question("Q"));

        let body = question.to_document().unwrap();

        assert_eq!(body["question"], "Q");
        assert_eq!(body["correct_answer"], "right");
        assert_eq!(body["incorrect_answers"].as_array().map(Vec::len), Some(3));
        assert_eq!(body["question_code"], json!(QuestionCode::derive("Q")));
    }

    #[test]
    fn test_answers_follow_permutation() {
        let question = Question::from_provider(sample_question("Q"));
        let permutation = AnswerPermutation::new([2, 0, 3, 1]).unwrap();

        let answers: Vec<&str> = question
            .answers(permutation)
            .into_iter()
            .map(|(_, text)| text)
            .collect();

        assert_eq!(answers, ["wrong 2", "right", "wrong 3", "wrong 1"]);
    }

    #[tokio::test]
    async fn test_load_rejects_wrong_answer_count() {
        let repo = InMemoryDocumentRepository::new();
        let id = repo.seed(
            Collection::Questions,
            json!({
                "question": "Q",
                "category": "C",
                "correct_answer": "a",
                "incorrect_answers": ["b"],
                "question_code": "abc",
            }),
        );

        let result = Question::load_by_id(&repo, id).await;

        assert!(matches!(
            result,
            Err(DomainError::Validation(ValidationError::InvalidQuestion(_)))
        ));
    }

    #[tokio::test]
    async fn test_load_missing_question_is_not_found() {
        let repo = InMemoryDocumentRepository::new();

        let result = Question::load_by_id(&repo, RecordId::new()).await;

        assert!(matches!(
            result,
            Err(DomainError::RecordNotFound {
                collection: Collection::Questions,
                ..
            })
        ));
    }
}
