//! Finds a question the session has not seen yet.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use serde_json::Value;
use tracing::{debug, info, warn};
use trivia_core::error::DomainError;
use trivia_core::provider::{FetchOptions, QuestionProvider};
use trivia_core::repository::{DocumentRepository, Filter};
use trivia_core::rng::DeterministicRng;

use crate::domain::question::Question;
use crate::domain::question_code::QuestionCode;

/// Default number of provider fetches before giving up on repeats.
pub const DEFAULT_MAX_FETCH_ATTEMPTS: u32 = 3;

/// Serves unseen questions, preferring stored ones over the provider.
#[derive(Clone)]
pub struct QuestionSource {
    provider: Arc<dyn QuestionProvider>,
    options: FetchOptions,
    max_fetch_attempts: u32,
}

impl std::fmt::Debug for QuestionSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuestionSource")
            .field("options", &self.options)
            .field("max_fetch_attempts", &self.max_fetch_attempts)
            .finish_non_exhaustive()
    }
}

impl QuestionSource {
    /// Creates a source backed by `provider` with default options.
    #[must_use]
    pub fn new(provider: Arc<dyn QuestionProvider>) -> Self {
        Self {
            provider,
            options: FetchOptions::default(),
            max_fetch_attempts: DEFAULT_MAX_FETCH_ATTEMPTS,
        }
    }

    /// Sets the category/difficulty passed to the provider.
    #[must_use]
    pub fn with_options(mut self, options: FetchOptions) -> Self {
        self.options = options;
        self
    }

    /// Sets how many provider fetches may return already-seen questions
    /// before giving up. At least one fetch is always made.
    #[must_use]
    pub fn with_max_fetch_attempts(mut self, attempts: u32) -> Self {
        self.max_fetch_attempts = attempts.max(1);
        self
    }

    /// Returns a question whose code is not in `excluded`.
    ///
    /// A random stored question is picked when one qualifies. Otherwise
    /// the provider is asked and its question is stored before returning.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Provider` if the provider fails or keeps
    /// returning excluded questions, or the repository's error.
    pub async fn fetch_unseen(
        &self,
        repo: &dyn DocumentRepository,
        excluded: &BTreeSet<QuestionCode>,
        rng: &Mutex<dyn DeterministicRng + Send>,
    ) -> Result<Question, DomainError> {
        let codes: Vec<Value> = excluded
            .iter()
            .map(|code| Value::String(code.as_str().to_owned()))
            .collect();
        let mut stored =
            Question::load_by_query(repo, &Filter::NotIn("question_code".to_owned(), codes))
                .await?;

        if !stored.is_empty() {
            let index = {
                let mut rng = rng.lock().map_err(|e| {
                    DomainError::Infrastructure(format!("RNG mutex poisoned: {e}"))
                })?;
                rng.pick_index(stored.len())
            };
            let question = stored.swap_remove(index);
            debug!(code = %question.code(), candidates = stored.len() + 1, "Picked stored question");
            return Ok(question);
        }

        for attempt in 1..=self.max_fetch_attempts {
            let fetched = self.provider.fetch_random_question(&self.options).await?;
            let mut question = Question::from_provider(fetched);
            if excluded.contains(question.code()) {
                warn!(code = %question.code(), attempt, "Provider returned an already-seen question");
                continue;
            }
            question.save(repo).await?;
            info!(code = %question.code(), "Stored new question from provider");
            return Ok(question);
        }

        Err(DomainError::Provider(format!(
            "no unseen question after {} attempts",
            self.max_fetch_attempts
        )))
    }
}
