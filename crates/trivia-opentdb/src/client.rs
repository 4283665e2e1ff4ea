//! HTTP client for the Open Trivia Database.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};
use trivia_core::error::DomainError;
use trivia_core::provider::{FetchOptions, ProviderQuestion, QuestionProvider};

use crate::error::OpenTdbError;

/// Public endpoint of the Open Trivia Database.
pub const DEFAULT_BASE_URL: &str = "https://opentdb.com/api.php";

/// Connection settings for the question bank.
#[derive(Clone, Debug)]
pub struct OpenTdbConfig {
    /// Full URL of the `api.php` endpoint.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for OpenTdbConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Fetches single multiple-choice questions from the Open Trivia Database.
#[derive(Clone, Debug)]
pub struct OpenTdbClient {
    client: Client,
    config: OpenTdbConfig,
}

impl OpenTdbClient {
    /// Builds a client with the configured timeout.
    ///
    /// # Errors
    ///
    /// Returns `OpenTdbError::Http` if the HTTP client cannot be built.
    pub fn new(config: OpenTdbConfig) -> Result<Self, OpenTdbError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    /// Query parameters for one request.
    fn query(options: &FetchOptions) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("amount", "1".to_owned()),
            ("type", "multiple".to_owned()),
            ("encode", "base64".to_owned()),
        ];
        if let Some(category) = options.category {
            query.push(("category", category.to_string()));
        }
        if let Some(difficulty) = options.difficulty {
            query.push(("difficulty", difficulty.as_str().to_owned()));
        }
        query
    }

    /// Fetches one question.
    ///
    /// # Errors
    ///
    /// Returns `OpenTdbError` when the request fails, the service reports a
    /// non-zero response code, or the payload cannot be decoded.
    #[instrument(skip(self), fields(base_url = %self.config.base_url))]
    pub async fn fetch(&self, options: &FetchOptions) -> Result<ProviderQuestion, OpenTdbError> {
        let response = self
            .client
            .get(&self.config.base_url)
            .query(&Self::query(options))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(OpenTdbError::HttpStatus(response.status()));
        }

        let body: ApiResponse = response.json().await?;
        let question = parse_response(body)?;
        debug!(category = %question.category, "Fetched question");
        Ok(question)
    }
}

#[async_trait]
impl QuestionProvider for OpenTdbClient {
    async fn fetch_random_question(
        &self,
        options: &FetchOptions,
    ) -> Result<ProviderQuestion, DomainError> {
        Ok(self.fetch(options).await?)
    }
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    response_code: u8,
    #[serde(default)]
    results: Vec<ApiQuestion>,
}

#[derive(Debug, Deserialize)]
struct ApiQuestion {
    category: String,
    question: String,
    correct_answer: String,
    incorrect_answers: Vec<String>,
}

fn decode(field: &'static str, encoded: &str) -> Result<String, OpenTdbError> {
    let bytes = STANDARD
        .decode(encoded)
        .map_err(|source| OpenTdbError::Base64 { field, source })?;
    String::from_utf8(bytes).map_err(|_| OpenTdbError::Utf8(field))
}

/// Turns a base64-encoded response into a question.
fn parse_response(body: ApiResponse) -> Result<ProviderQuestion, OpenTdbError> {
    if body.response_code != 0 {
        return Err(OpenTdbError::from_response_code(body.response_code));
    }
    let raw = body.results.into_iter().next().ok_or(OpenTdbError::Empty)?;
    let incorrect_answers = raw
        .incorrect_answers
        .iter()
        .map(|answer| decode("incorrect_answers", answer))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ProviderQuestion::new(
        decode("category", &raw.category)?,
        decode("question", &raw.question)?,
        decode("correct_answer", &raw.correct_answer)?,
        incorrect_answers,
    )?)
}
