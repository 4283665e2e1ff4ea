//! External question provider abstraction.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, ValidationError};

/// Number of wrong answers every multiple-choice question carries.
pub const INCORRECT_ANSWER_COUNT: usize = 3;

/// Difficulty filter understood by question banks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// Easy questions.
    Easy,
    /// Medium questions.
    Medium,
    /// Hard questions.
    Hard,
}

impl Difficulty {
    /// Wire name of the difficulty.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Self::Easy),
            "medium" => Ok(Self::Medium),
            "hard" => Ok(Self::Hard),
            other => Err(format!("unknown difficulty `{other}`")),
        }
    }
}

/// Options narrowing which question the provider returns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchOptions {
    /// Provider-specific category number.
    pub category: Option<u32>,
    /// Requested difficulty.
    pub difficulty: Option<Difficulty>,
}

/// A question as delivered by the provider, before it gets a code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderQuestion {
    /// Category label.
    pub category: String,
    /// Question text.
    pub text: String,
    /// The correct answer.
    pub correct_answer: String,
    /// Exactly three wrong answers.
    pub incorrect_answers: [String; INCORRECT_ANSWER_COUNT],
}

impl ProviderQuestion {
    /// Builds a provider question from loosely typed parts.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidQuestion` if the text is blank or
    /// there are not exactly three incorrect answers.
    pub fn new(
        category: impl Into<String>,
        text: impl Into<String>,
        correct_answer: impl Into<String>,
        incorrect_answers: Vec<String>,
    ) -> Result<Self, ValidationError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(ValidationError::InvalidQuestion(
                "question text is empty".to_owned(),
            ));
        }
        let found = incorrect_answers.len();
        let incorrect_answers: [String; INCORRECT_ANSWER_COUNT] =
            incorrect_answers.try_into().map_err(|_| {
                ValidationError::InvalidQuestion(format!(
                    "expected {INCORRECT_ANSWER_COUNT} incorrect answers, got {found}"
                ))
            })?;
        Ok(Self {
            category: category.into(),
            text,
            correct_answer: correct_answer.into(),
            incorrect_answers,
        })
    }
}

/// Source of brand-new trivia questions, usually over the network.
#[async_trait]
pub trait QuestionProvider: Send + Sync {
    /// Fetches one random multiple-choice question.
    ///
    /// Implementations do not retry; a failure is final for this attempt.
    async fn fetch_random_question(
        &self,
        options: &FetchOptions,
    ) -> Result<ProviderQuestion, DomainError>;
}
