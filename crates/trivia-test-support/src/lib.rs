//! Shared test mocks and utilities for the trivia quiz backend.

mod clock;
mod provider;
mod repository;
mod rng;

pub use clock::FixedClock;
pub use provider::{FailingQuestionProvider, StubQuestionProvider, sample_question};
pub use repository::{FailingDocumentRepository, InMemoryDocumentRepository};
pub use rng::{MockRng, SequenceRng};
