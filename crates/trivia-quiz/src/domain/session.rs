//! The quiz session state machine.
//!
//! A [`QuizSession`] holds everything about the live quiz that is not
//! stored: who is playing, which question is up, who has answered what and
//! in which order, and the running score. It performs no I/O. The command
//! handlers drive it and persist what it changes.
//!
//! Per-user state lives in one roster of seats, so the loaded users, their
//! pending answers and their scores always share the same key set.

use std::collections::BTreeSet;

use serde::Serialize;
use trivia_core::error::ValidationError;
use trivia_core::id::{Collection, RecordId};

use super::answer::{AnswerPermutation, AnswerSlot};
use super::game::Game;
use super::question::Question;
use super::question_code::QuestionCode;
use super::user::User;

/// Coarse state of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// No game is running.
    NoGame,
    /// A game is running and its current question awaits answers.
    QuestionPending,
    /// A game is running and its current question has been scored.
    QuestionResolved,
}

/// How a registration was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Registration {
    /// A new seat was created.
    Joined,
    /// The name already had a seat; it was kept as is.
    Reconnected,
    /// A participant of the running game came back; their score was restored.
    Rejoined,
}

/// Result of submitting an answer. Only `Recorded` and `Resolved` mean the
/// answer was taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerOutcome {
    /// The answer was stored; others are still pending.
    Recorded,
    /// The answer completed the question, which was then scored.
    Resolved,
    /// There is no running game.
    NoActiveGame,
    /// The running game has no open question.
    NoPendingQuestion,
    /// The name has no seat in the session.
    UnknownUser,
    /// The choice is not one of `A`..`D`.
    InvalidChoice,
}

impl AnswerOutcome {
    /// Whether the answer was taken.
    #[must_use]
    pub fn accepted(self) -> bool {
        matches!(self, Self::Recorded | Self::Resolved)
    }
}

/// What happened when a question was scored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedQuestion {
    /// The scored question.
    pub code: QuestionCode,
    /// Where the correct answer was shown.
    pub correct_slot: AnswerSlot,
    /// Names of the users who answered correctly, in seat order.
    pub correct_users: Vec<String>,
}

#[derive(Debug, Clone)]
struct Seat {
    name: String,
    user: User,
    pending: Option<AnswerSlot>,
    score: u32,
}

/// Live state of one quiz room.
#[derive(Debug, Default)]
pub struct QuizSession {
    seats: Vec<Seat>,
    current_question: Option<Question>,
    permutation: AnswerPermutation,
    question_resolved: bool,
    arrival_order: Vec<String>,
    active_game: Option<Game>,
}

impl QuizSession {
    /// Creates an empty session with no game.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn seat(&self, name: &str) -> Option<&Seat> {
        self.seats.iter().find(|seat| seat.name == name)
    }

    fn seat_mut(&mut self, name: &str) -> Option<&mut Seat> {
        self.seats.iter_mut().find(|seat| seat.name == name)
    }

    /// Seats a stored user.
    ///
    /// Re-registering a seated name keeps its pending answer and score.
    /// While a game runs, only its participants may take a new seat.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::MissingField` for a user without a name,
    /// `ValidationError::Unsaved` for one never persisted, and
    /// `ValidationError::GameInProgress` for a non-participant mid-game.
    pub fn register_user(&mut self, user: User) -> Result<Registration, ValidationError> {
        let name = user
            .name()
            .ok_or(ValidationError::MissingField("user.name"))?
            .to_owned();
        let user_id = user.id().ok_or(ValidationError::Unsaved(Collection::Users))?;

        if self.seat(&name).is_some() {
            return Ok(Registration::Reconnected);
        }

        let (registration, score) = match &self.active_game {
            None => (Registration::Joined, 0),
            Some(game) if game.participants().contains(user_id) => {
                (Registration::Rejoined, game.score_of(user_id))
            }
            Some(_) => return Err(ValidationError::GameInProgress(name)),
        };
        self.seats.push(Seat {
            name,
            user,
            pending: None,
            score,
        });
        Ok(registration)
    }

    /// Frees a seat. Returns `false` if the name was not seated.
    pub fn remove_user(&mut self, name: &str) -> bool {
        let before = self.seats.len();
        self.seats.retain(|seat| seat.name != name);
        self.arrival_order.retain(|arrived| arrived != name);
        self.seats.len() != before
    }

    /// Whether `name` holds a seat.
    #[must_use]
    pub fn contains_user(&self, name: &str) -> bool {
        self.seat(name).is_some()
    }

    /// Number of seated users.
    #[must_use]
    pub fn user_count(&self) -> usize {
        self.seats.len()
    }

    /// Seated users in registration order.
    pub fn users(&self) -> impl Iterator<Item = &User> {
        self.seats.iter().map(|seat| &seat.user)
    }

    /// Mutable access to seated users, for persisting them.
    pub fn users_mut(&mut self) -> impl Iterator<Item = &mut User> {
        self.seats.iter_mut().map(|seat| &mut seat.user)
    }

    /// Identities of the seated users in registration order.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::NoUsersLoaded` when nobody is seated.
    pub fn user_ids(&self) -> Result<Vec<RecordId>, ValidationError> {
        if self.seats.is_empty() {
            return Err(ValidationError::NoUsersLoaded);
        }
        self.seats
            .iter()
            .map(|seat| {
                seat.user
                    .id()
                    .ok_or(ValidationError::Unsaved(Collection::Users))
            })
            .collect()
    }

    /// Scores by name, in seat order.
    #[must_use]
    pub fn scores(&self) -> Vec<(&str, u32)> {
        self.seats
            .iter()
            .map(|seat| (seat.name.as_str(), seat.score))
            .collect()
    }

    /// Pending answers by name, in seat order.
    #[must_use]
    pub fn pending_answers(&self) -> Vec<(&str, Option<AnswerSlot>)> {
        self.seats
            .iter()
            .map(|seat| (seat.name.as_str(), seat.pending))
            .collect()
    }

    /// Names in the order their latest answers arrived.
    #[must_use]
    pub fn arrival_order(&self) -> &[String] {
        &self.arrival_order
    }

    /// The question on display, if any.
    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.current_question.as_ref()
    }

    /// Slot mapping of the current question.
    #[must_use]
    pub fn permutation(&self) -> AnswerPermutation {
        self.permutation
    }

    /// The running game, if any.
    #[must_use]
    pub fn active_game(&self) -> Option<&Game> {
        self.active_game.as_ref()
    }

    /// Mutable access to the running game, for persisting it.
    pub fn active_game_mut(&mut self) -> Option<&mut Game> {
        self.active_game.as_mut()
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        match (&self.active_game, &self.current_question) {
            (None, _) => SessionPhase::NoGame,
            (Some(_), Some(_)) if !self.question_resolved => SessionPhase::QuestionPending,
            (Some(_), _) => SessionPhase::QuestionResolved,
        }
    }

    /// Makes `game` the running game and seeds every seat's score from it.
    ///
    /// A fresh game has no recorded scores, so everyone starts at zero.
    pub fn begin_game(&mut self, game: Game) {
        for seat in &mut self.seats {
            seat.score = seat.user.id().map_or(0, |id| game.score_of(id));
            seat.pending = None;
        }
        self.arrival_order.clear();
        self.current_question = None;
        self.question_resolved = false;
        self.active_game = Some(game);
    }

    /// Puts `question` on display with a new slot mapping.
    ///
    /// Clears every pending answer and the arrival order.
    pub fn set_current_question(&mut self, question: Question, permutation: AnswerPermutation) {
        for seat in &mut self.seats {
            seat.pending = None;
        }
        self.arrival_order.clear();
        self.permutation = permutation;
        self.question_resolved = false;
        self.current_question = Some(question);
    }

    /// Stores `name`'s answer to the open question.
    ///
    /// A repeated answer replaces the earlier one and moves the user to the
    /// back of the arrival order. This does not score the question; see
    /// [`QuizSession::resolve_question`].
    pub fn record_answer(&mut self, name: &str, slot: AnswerSlot) -> AnswerOutcome {
        if self.active_game.is_none() {
            return AnswerOutcome::NoActiveGame;
        }
        if self.phase() != SessionPhase::QuestionPending {
            return AnswerOutcome::NoPendingQuestion;
        }
        let Some(seat) = self.seat_mut(name) else {
            return AnswerOutcome::UnknownUser;
        };
        seat.pending = Some(slot);
        self.arrival_order.retain(|arrived| arrived != name);
        self.arrival_order.push(name.to_owned());
        AnswerOutcome::Recorded
    }

    /// Whether every seated user has answered.
    #[must_use]
    pub fn all_answered(&self) -> bool {
        !self.seats.is_empty() && self.seats.iter().all(|seat| seat.pending.is_some())
    }

    /// Scores the open question once everyone has answered.
    ///
    /// Correct answers earn a point. Every seated user gets the question in
    /// their history, and the running game gets the code and the new
    /// scores. The question is marked resolved here, so a later call
    /// returns `None` until the next question is set.
    pub fn resolve_question(&mut self) -> Option<ResolvedQuestion> {
        if self.phase() != SessionPhase::QuestionPending || !self.all_answered() {
            return None;
        }
        let code = self.current_question.as_ref()?.code().clone();
        let permutation = self.permutation;
        self.question_resolved = true;

        let mut correct_users = Vec::new();
        for seat in &mut self.seats {
            let correct = seat.pending.is_some_and(|slot| permutation.is_correct(slot));
            if correct {
                seat.score += 1;
                correct_users.push(seat.name.clone());
            }
            seat.user.record_answer(code.clone(), correct);
        }

        if let Some(game) = self.active_game.as_mut() {
            game.record_question(&code);
            for seat in &self.seats {
                if let Some(id) = seat.user.id() {
                    game.set_score(id, seat.score);
                }
            }
        }

        Some(ResolvedQuestion {
            code,
            correct_slot: permutation.correct_slot(),
            correct_users,
        })
    }

    /// Sorted, deduplicated codes of every question any seated user has seen.
    #[must_use]
    pub fn known_question_codes(&self) -> BTreeSet<QuestionCode> {
        self.seats
            .iter()
            .flat_map(|seat| seat.user.question_history().iter().cloned())
            .collect()
    }

    /// The unique highest scorer, if there is one.
    #[must_use]
    pub fn leader(&self) -> Option<(&str, RecordId)> {
        let top = self.seats.iter().map(|seat| seat.score).max()?;
        let mut leaders = self.seats.iter().filter(|seat| seat.score == top);
        match (leaders.next(), leaders.next()) {
            (Some(seat), None) => seat.user.id().map(|id| (seat.name.as_str(), id)),
            _ => None,
        }
    }

    /// Ends the running game and hands it back.
    pub fn end_game(&mut self) -> Option<Game> {
        let game = self.active_game.take()?;
        for seat in &mut self.seats {
            seat.pending = None;
        }
        self.arrival_order.clear();
        self.current_question = None;
        self.question_resolved = false;
        Some(game)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use trivia_core::id::Collection;
    use trivia_test_support::{InMemoryDocumentRepository, sample_question};

    use super::*;

    // Every seat needs a stored identity.
    async fn seat_users(session: &mut QuizSession, repo: &InMemoryDocumentRepository, names: &[&str]) {
        for name in names {
            let user = User::find_or_create_by_name(repo, name).await.unwrap();
            session.register_user(user).unwrap();
        }
    }

    fn question(text: &str) -> Question {
        Question::from_provider(sample_question(text))
    }

    fn slot(letter: char) -> AnswerSlot {
        AnswerSlot::from_letter(letter).unwrap()
    }

    #[tokio::test]
    async fn test_registration_keeps_roster_maps_aligned() {
        // Arrange
        let repo = InMemoryDocumentRepository::new();
        let mut session = QuizSession::new();

        // Act
        seat_users(&mut session, &repo, &["Ann", "Bob", "Cy"]).await;

        // Assert
        let scored: Vec<&str> = session.scores().into_iter().map(|(n, _)| n).collect();
        let pending: Vec<&str> = session.pending_answers().into_iter().map(|(n, _)| n).collect();
        let loaded: Vec<&str> = session.users().filter_map(User::name).collect();
        assert_eq!(scored, ["Ann", "Bob", "Cy"]);
        assert_eq!(pending, scored);
        assert_eq!(loaded, scored);
        assert_eq!(session.phase(), SessionPhase::NoGame);
    }

    #[tokio::test]
    async fn test_reregistering_is_a_reconnect() {
        // Arrange
        let repo = InMemoryDocumentRepository::new();
        let mut session = QuizSession::new();
        seat_users(&mut session, &repo, &["Ann"]).await;
        session.begin_game(Game::new());
        session.set_current_question(question("Q1"), AnswerPermutation::identity());
        session.record_answer("Ann", slot('A'));
        session.resolve_question().unwrap();
        session.set_current_question(question("Q2"), AnswerPermutation::identity());
        session.record_answer("Ann", slot('C'));
        let again = User::find_or_create_by_name(&repo, "Ann").await.unwrap();

        // Act
        let registration = session.register_user(again).unwrap();

        // Assert
        assert_eq!(registration, Registration::Reconnected);
        assert_eq!(session.user_count(), 1);
        assert_eq!(session.scores(), vec![("Ann", 1)]);
        assert_eq!(session.pending_answers(), vec![("Ann", Some(slot('C')))]);
    }

    #[test]
    fn test_unsaved_or_unnamed_users_cannot_register() {
        let mut session = QuizSession::new();

        assert_eq!(
            session.register_user(User::named("Ann")),
            Err(ValidationError::Unsaved(Collection::Users))
        );
        assert_eq!(
            session.register_user(User::new()),
            Err(ValidationError::MissingField("user.name"))
        );
    }

    #[tokio::test]
    async fn test_newcomer_cannot_join_running_game() {
        // Arrange
        let repo = InMemoryDocumentRepository::new();
        let mut session = QuizSession::new();
        seat_users(&mut session, &repo, &["Ann"]).await;
        session.begin_game(Game::new());
        let bob = User::find_or_create_by_name(&repo, "Bob").await.unwrap();

        // Act
        let result = session.register_user(bob);

        // Assert
        assert_eq!(result, Err(ValidationError::GameInProgress("Bob".to_owned())));
        assert_eq!(session.user_count(), 1);
    }

    #[tokio::test]
    async fn test_setting_question_resets_pending_answers_and_arrivals() {
        // Arrange
        let repo = InMemoryDocumentRepository::new();
        let mut session = QuizSession::new();
        seat_users(&mut session, &repo, &["Ann", "Bob"]).await;
        session.begin_game(Game::new());
        session.set_current_question(question("Q1"), AnswerPermutation::identity());
        session.record_answer("Ann", slot('A'));

        // Act
        session.set_current_question(question("Q2"), AnswerPermutation::identity());

        // Assert
        assert!(session.pending_answers().iter().all(|(_, p)| p.is_none()));
        assert!(session.arrival_order().is_empty());
        assert_eq!(session.phase(), SessionPhase::QuestionPending);
    }

    #[tokio::test]
    async fn test_reanswer_overwrites_and_moves_to_tail() {
        // Arrange
        let repo = InMemoryDocumentRepository::new();
        let mut session = QuizSession::new();
        seat_users(&mut session, &repo, &["Ann", "Bob", "Cy"]).await;
        session.begin_game(Game::new());
        session.set_current_question(question("Q1"), AnswerPermutation::identity());

        // Act
        session.record_answer("Ann", slot('A'));
        session.record_answer("Bob", slot('B'));
        session.record_answer("Ann", slot('D'));

        // Assert
        assert_eq!(session.arrival_order(), ["Bob", "Ann"]);
        assert_eq!(session.pending_answers()[0], ("Ann", Some(slot('D'))));
        assert!(!session.all_answered());
        assert!(session.resolve_question().is_none());
    }

    #[tokio::test]
    async fn test_soft_failures_leave_state_untouched() {
        let repo = InMemoryDocumentRepository::new();
        let mut session = QuizSession::new();
        seat_users(&mut session, &repo, &["Ann"]).await;

        assert_eq!(session.record_answer("Ann", slot('A')), AnswerOutcome::NoActiveGame);
        session.begin_game(Game::new());
        assert_eq!(
            session.record_answer("Ann", slot('A')),
            AnswerOutcome::NoPendingQuestion
        );
        session.set_current_question(question("Q1"), AnswerPermutation::identity());
        assert_eq!(session.record_answer("Zed", slot('A')), AnswerOutcome::UnknownUser);
        assert!(session.arrival_order().is_empty());
    }

    #[tokio::test]
    async fn test_resolution_scores_only_correct_slot() {
        // Arrange
        let repo = InMemoryDocumentRepository::new();
        let mut session = QuizSession::new();
        seat_users(&mut session, &repo, &["Ann", "Bob"]).await;
        let mut game = Game::new();
        for id in session.user_ids().unwrap() {
            game.add_participant(id, &repo).await.unwrap();
        }
        session.begin_game(game);
        let permutation = AnswerPermutation::new([2, 0, 3, 1]).unwrap();
        session.set_current_question(question("Q1"), permutation);

        // Act
        session.record_answer("Ann", slot('B'));
        session.record_answer("Bob", slot('A'));
        let resolved = session.resolve_question().unwrap();

        // Assert
        assert_eq!(resolved.correct_slot, slot('B'));
        assert_eq!(resolved.correct_users, ["Ann"]);
        assert_eq!(session.scores(), vec![("Ann", 1), ("Bob", 0)]);
        let game = session.active_game().unwrap();
        assert_eq!(game.score_vector(), vec![1, 0]);
        assert_eq!(game.question_history(), &[QuestionCode::derive("Q1")]);
        let correct: Vec<u32> = session.users().map(User::correct_answers).collect();
        assert_eq!(correct, [1, 0]);
        assert!(session
            .users()
            .all(|u| u.question_history() == [QuestionCode::derive("Q1")]));
        assert_eq!(session.phase(), SessionPhase::QuestionResolved);
        assert!(session.resolve_question().is_none());
    }

    #[tokio::test]
    async fn test_known_question_codes_is_sorted_union() {
        // Arrange
        let repo = InMemoryDocumentRepository::new();
        repo.seed(
            Collection::Users,
            json!({ "name": "Ann", "correct_answers": 0, "questions": ["CD34", "AB12"], "games": [] }),
        );
        repo.seed(
            Collection::Users,
            json!({ "name": "Bob", "correct_answers": 0, "questions": ["EF56", "CD34"], "games": [] }),
        );
        let mut session = QuizSession::new();
        seat_users(&mut session, &repo, &["Ann", "Bob"]).await;

        // Act
        let codes = session.known_question_codes();

        // Assert
        let codes: Vec<&str> = codes.iter().map(QuestionCode::as_str).collect();
        assert_eq!(codes, ["AB12", "CD34", "EF56"]);
    }

    #[tokio::test]
    async fn test_leader_requires_unique_top_score() {
        // Arrange
        let repo = InMemoryDocumentRepository::new();
        let mut session = QuizSession::new();
        seat_users(&mut session, &repo, &["Ann", "Bob"]).await;
        let mut game = Game::new();
        for id in session.user_ids().unwrap() {
            game.add_participant(id, &repo).await.unwrap();
        }
        session.begin_game(game);
        session.set_current_question(question("Q1"), AnswerPermutation::identity());
        session.record_answer("Ann", slot('A'));
        session.record_answer("Bob", slot('A'));
        session.resolve_question();
        assert!(session.leader().is_none());

        // Act
        session.set_current_question(question("Q2"), AnswerPermutation::identity());
        session.record_answer("Ann", slot('B'));
        session.record_answer("Bob", slot('A'));
        session.resolve_question();

        // Assert
        assert_eq!(session.leader().map(|(name, _)| name), Some("Bob"));
    }

    #[tokio::test]
    async fn test_participant_rejoining_gets_score_back() {
        // Arrange
        let repo = InMemoryDocumentRepository::new();
        let mut session = QuizSession::new();
        seat_users(&mut session, &repo, &["Ann", "Bob"]).await;
        let mut game = Game::new();
        for id in session.user_ids().unwrap() {
            game.add_participant(id, &repo).await.unwrap();
        }
        session.begin_game(game);
        session.set_current_question(question("Q1"), AnswerPermutation::identity());
        session.record_answer("Ann", slot('A'));
        session.record_answer("Bob", slot('C'));
        session.resolve_question();
        assert!(session.remove_user("Ann"));
        let ann = User::find_or_create_by_name(&repo, "Ann").await.unwrap();

        // Act
        let registration = session.register_user(ann).unwrap();

        // Assert
        assert_eq!(registration, Registration::Rejoined);
        assert_eq!(session.scores(), vec![("Bob", 0), ("Ann", 1)]);
        assert!(!session.remove_user("Zed"));
    }

    #[tokio::test]
    async fn test_end_game_returns_to_no_game() {
        let repo = InMemoryDocumentRepository::new();
        let mut session = QuizSession::new();
        seat_users(&mut session, &repo, &["Ann"]).await;
        session.begin_game(Game::new());
        session.set_current_question(question("Q1"), AnswerPermutation::identity());

        let game = session.end_game();

        assert!(game.is_some());
        assert_eq!(session.phase(), SessionPhase::NoGame);
        assert!(session.current_question().is_none());
        assert!(session.end_game().is_none());
    }
}
