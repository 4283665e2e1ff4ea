//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;
use trivia_core::clock::Clock;
use trivia_core::provider::ProviderQuestion;
use trivia_core::rng::DeterministicRng;
use trivia_quiz::application::question_source::QuestionSource;
use trivia_test_support::{
    FixedClock, InMemoryDocumentRepository, SequenceRng, StubQuestionProvider,
};

use trivia_api::routes;
use trivia_api::state::AppState;

/// Build the full app router over an in-memory document store, a scripted
/// question bank and a deterministic Clock/RNG. Uses the same route
/// structure as `main.rs`.
pub fn build_test_app() -> Router {
    build_test_app_with(Vec::new(), SequenceRng::new(vec![]))
}

/// Build the full app router with queued provider questions and a custom
/// `SequenceRng` for tests that need a known answer order.
pub fn build_test_app_with(questions: Vec<ProviderQuestion>, rng: SequenceRng) -> Router {
    let clock: Arc<dyn Clock + Send + Sync> = Arc::new(FixedClock::standard());
    let rng: Arc<Mutex<dyn DeterministicRng + Send>> = Arc::new(Mutex::new(rng));
    let repository = Arc::new(InMemoryDocumentRepository::new());
    let provider = Arc::new(StubQuestionProvider::new(questions));
    let app_state = AppState::new(
        clock,
        rng,
        repository,
        Arc::new(QuestionSource::new(provider)),
    );

    routes::router().with_state(app_state)
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

/// Send a POST request with a JSON body and return the response.
pub async fn post_json(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();

    send(app, request).await
}

/// Send a POST request without a body and return the response.
pub async fn post_empty(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    send(app, request).await
}

/// Send a GET request and return the response.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    send(app, request).await
}

/// Send a DELETE request and return the response.
pub async fn delete_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    send(app, request).await
}
