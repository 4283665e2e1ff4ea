//! Shared application state.

use std::sync::{Arc, Mutex};

use trivia_core::clock::Clock;
use trivia_core::repository::DocumentRepository;
use trivia_core::rng::DeterministicRng;
use trivia_quiz::application::command_handlers::QuizContext;
use trivia_quiz::application::question_source::QuestionSource;
use trivia_quiz::domain::session::QuizSession;

/// Application state shared across all request handlers.
///
/// The server hosts a single quiz room. Handlers hold `session` for the
/// whole command, writes included, so commands apply one at a time.
#[derive(Clone)]
pub struct AppState {
    /// Clock for game start times.
    pub clock: Arc<dyn Clock + Send + Sync>,
    /// RNG for answer shuffles and stored-question picks.
    pub rng: Arc<Mutex<dyn DeterministicRng + Send>>,
    /// Document storage for users, games and questions.
    pub repository: Arc<dyn DocumentRepository>,
    /// Where new questions come from.
    pub questions: Arc<QuestionSource>,
    /// The live quiz room.
    pub session: Arc<tokio::sync::Mutex<QuizSession>>,
}

impl AppState {
    /// Create new application state with an empty quiz room.
    #[must_use]
    pub fn new(
        clock: Arc<dyn Clock + Send + Sync>,
        rng: Arc<Mutex<dyn DeterministicRng + Send>>,
        repository: Arc<dyn DocumentRepository>,
        questions: Arc<QuestionSource>,
    ) -> Self {
        Self {
            clock,
            rng,
            repository,
            questions,
            session: Arc::new(tokio::sync::Mutex::new(QuizSession::new())),
        }
    }

    /// Borrows the collaborators the quiz command handlers take.
    #[must_use]
    pub fn quiz_context(&self) -> QuizContext<'_> {
        QuizContext {
            clock: self.clock.as_ref(),
            rng: self.rng.as_ref(),
            repo: self.repository.as_ref(),
            questions: self.questions.as_ref(),
        }
    }
}
