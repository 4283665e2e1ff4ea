//! Test question providers.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use trivia_core::error::DomainError;
use trivia_core::provider::{FetchOptions, ProviderQuestion, QuestionProvider};

/// Builds a well-formed provider question whose text is `text`.
///
/// The correct answer is `"right"` and the wrong ones are `"wrong 1..3"`.
#[must_use]
pub fn sample_question(text: &str) -> ProviderQuestion {
    ProviderQuestion {
        category: "General Knowledge".to_owned(),
        text: text.to_owned(),
        correct_answer: "right".to_owned(),
        incorrect_answers: [
            "wrong 1".to_owned(),
            "wrong 2".to_owned(),
            "wrong 3".to_owned(),
        ],
    }
}

/// A provider that hands out queued questions in order.
///
/// Once the queue is empty it invents numbered questions
/// (`"Generated question N"`), so sessions can run indefinitely. Every call
/// is recorded with the options it received.
#[derive(Debug, Default)]
pub struct StubQuestionProvider {
    queue: Mutex<VecDeque<ProviderQuestion>>,
    calls: Mutex<Vec<FetchOptions>>,
}

impl StubQuestionProvider {
    /// Creates a provider that serves `questions` first.
    #[must_use]
    pub fn new(questions: Vec<ProviderQuestion>) -> Self {
        Self {
            queue: Mutex::new(questions.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Number of fetches made so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// The options passed to each fetch, in call order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn calls(&self) -> Vec<FetchOptions> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl QuestionProvider for StubQuestionProvider {
    async fn fetch_random_question(
        &self,
        options: &FetchOptions,
    ) -> Result<ProviderQuestion, DomainError> {
        let call_number = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(*options);
            calls.len()
        };
        let queued = self.queue.lock().unwrap().pop_front();
        Ok(queued.unwrap_or_else(|| sample_question(&format!("Generated question {call_number}"))))
    }
}

/// A provider that always fails, like an unreachable question bank.
#[derive(Debug)]
pub struct FailingQuestionProvider;

#[async_trait]
impl QuestionProvider for FailingQuestionProvider {
    async fn fetch_random_question(
        &self,
        _options: &FetchOptions,
    ) -> Result<ProviderQuestion, DomainError> {
        Err(DomainError::Provider("question bank unreachable".into()))
    }
}
