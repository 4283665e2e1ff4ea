//! Query handlers for the quiz context.
//!
//! Read-only view DTOs of the live session and of stored games.

use chrono::{DateTime, Utc};
use serde::Serialize;
use trivia_core::error::DomainError;
use trivia_core::id::RecordId;
use trivia_core::repository::DocumentRepository;

use crate::domain::game::Game;
use crate::domain::session::{QuizSession, SessionPhase};

/// One answer option as displayed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnswerOptionView {
    /// Choice letter.
    pub letter: char,
    /// Answer text.
    pub text: String,
}

/// The question on display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionView {
    /// Question code.
    pub code: String,
    /// Category label.
    pub category: String,
    /// Question text.
    pub text: String,
    /// Options in display order.
    pub answers: Vec<AnswerOptionView>,
}

/// A seated user's score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreView {
    /// User name.
    pub name: String,
    /// Score in the running game.
    pub score: u32,
}

/// A seated user's answer to the open question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingAnswerView {
    /// User name.
    pub name: String,
    /// Chosen letter, if answered.
    pub choice: Option<char>,
}

/// Diagnostic snapshot of the live session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionView {
    /// Coarse state.
    pub phase: SessionPhase,
    /// The running game's identity, if it has one.
    pub game_id: Option<RecordId>,
    /// The question on display.
    pub current_question: Option<QuestionView>,
    /// Scores in seat order.
    pub scores: Vec<ScoreView>,
    /// Answers in seat order.
    pub pending_answers: Vec<PendingAnswerView>,
    /// Names in answer arrival order.
    pub answer_order: Vec<String>,
    /// Every question code a seated user has seen, sorted.
    pub known_question_codes: Vec<String>,
}

/// Read-only view of a stored game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameView {
    /// The game identifier.
    pub game_id: RecordId,
    /// Participant ids in join order.
    pub participants: Vec<RecordId>,
    /// Codes of the questions asked, in order.
    pub question_codes: Vec<String>,
    /// Scores aligned with `participants`.
    pub score_vector: Vec<u32>,
    /// The winner, if declared.
    pub winner: Option<RecordId>,
    /// Whether the game is over.
    pub finished: bool,
    /// When the game was first stored.
    pub started_at: Option<DateTime<Utc>>,
}

/// Snapshots the live session.
#[must_use]
pub fn get_session_view(session: &QuizSession) -> SessionView {
    let permutation = session.permutation();
    SessionView {
        phase: session.phase(),
        game_id: session.active_game().and_then(Game::id),
        current_question: session.current_question().map(|question| QuestionView {
            code: question.code().to_string(),
            category: question.category().to_owned(),
            text: question.text().to_owned(),
            answers: question
                .answers(permutation)
                .into_iter()
                .map(|(slot, text)| AnswerOptionView {
                    letter: slot.letter(),
                    text: text.to_owned(),
                })
                .collect(),
        }),
        scores: session
            .scores()
            .into_iter()
            .map(|(name, score)| ScoreView {
                name: name.to_owned(),
                score,
            })
            .collect(),
        pending_answers: session
            .pending_answers()
            .into_iter()
            .map(|(name, slot)| PendingAnswerView {
                name: name.to_owned(),
                choice: slot.map(|s| s.letter()),
            })
            .collect(),
        answer_order: session.arrival_order().to_vec(),
        known_question_codes: session
            .known_question_codes()
            .iter()
            .map(ToString::to_string)
            .collect(),
    }
}

/// Retrieves a stored game by identity.
///
/// # Errors
///
/// Returns `DomainError::RecordNotFound` if no game has that id.
pub async fn get_game_by_id(
    game_id: RecordId,
    repo: &dyn DocumentRepository,
) -> Result<GameView, DomainError> {
    let game = Game::load_by_id(repo, game_id).await?;
    Ok(GameView {
        game_id,
        participants: game.participants().as_slice().to_vec(),
        question_codes: game
            .question_history()
            .iter()
            .map(ToString::to_string)
            .collect(),
        score_vector: game.score_vector(),
        winner: game.winner(),
        finished: game.is_finished(),
        started_at: game.started_at(),
    })
}
