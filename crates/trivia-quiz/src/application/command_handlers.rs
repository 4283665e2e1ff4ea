//! Command handlers for the quiz context.
//!
//! Each handler applies a command to the in-memory [`QuizSession`] and then
//! persists what changed. The caller must hold the session exclusively for
//! the whole call; the handlers never release it between the state change
//! and the writes that follow.

use std::sync::Mutex;

use tracing::{debug, info, warn};
use trivia_core::clock::Clock;
use trivia_core::command::Command;
use trivia_core::error::{DomainError, ValidationError};
use trivia_core::id::{Collection, RecordId};
use trivia_core::repository::DocumentRepository;
use trivia_core::rng::DeterministicRng;

use crate::application::question_source::QuestionSource;
use crate::domain::answer::{AnswerPermutation, AnswerSlot};
use crate::domain::commands::{FinishGame, RegisterUser, RemoveUser, StartGame, SubmitAnswer};
use crate::domain::game::Game;
use crate::domain::question_code::QuestionCode;
use crate::domain::session::{AnswerOutcome, QuizSession, Registration, SessionPhase};
use crate::domain::user::User;

/// Collaborators the handlers need besides the session itself.
#[derive(Clone, Copy)]
pub struct QuizContext<'a> {
    /// Stamps game start times.
    pub clock: &'a dyn Clock,
    /// Shuffles answers and picks stored questions.
    pub rng: &'a Mutex<dyn DeterministicRng + Send>,
    /// Record storage.
    pub repo: &'a dyn DocumentRepository,
    /// Supplies unseen questions.
    pub questions: &'a QuestionSource,
}

/// Result of registering a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterUserResult {
    /// The user's stored identity.
    pub user_id: RecordId,
    /// How the registration was applied.
    pub registration: Registration,
}

/// Result of starting a game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartGameResult {
    /// The running game's identity.
    pub game_id: RecordId,
    /// Whether an unfinished game was resumed.
    pub resumed: bool,
    /// Code of the first question put up.
    pub question_code: QuestionCode,
}

/// Result of finishing a game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinishGameResult {
    /// The finished game's identity.
    pub game_id: RecordId,
    /// The winner's identity and name, if the top score was not shared.
    pub winner: Option<(RecordId, String)>,
    /// Final scores in participant order.
    pub score_vector: Vec<u32>,
}

fn log_command(command: &dyn Command) {
    debug!(
        command_type = command.command_type(),
        correlation_id = %command.correlation_id(),
        subject = command.subject().unwrap_or_default(),
        "Handling command"
    );
}

/// Handles `RegisterUser`: loads or creates the named user and seats them.
///
/// # Errors
///
/// Returns the repository's error, or `ValidationError::GameInProgress` when
/// a non-participant tries to join a running game.
pub async fn handle_register_user(
    command: &RegisterUser,
    session: &mut QuizSession,
    repo: &dyn DocumentRepository,
) -> Result<RegisterUserResult, DomainError> {
    log_command(command);
    let user = User::find_or_create_by_name(repo, &command.name).await?;
    let user_id = user
        .id()
        .ok_or(ValidationError::Unsaved(Collection::Users))?;
    let registration = session.register_user(user)?;
    debug!(%user_id, ?registration, "User registered");
    Ok(RegisterUserResult {
        user_id,
        registration,
    })
}

/// Handles `RemoveUser`. Returns whether the user had a seat.
///
/// The running game keeps the user as a participant.
#[must_use]
pub fn handle_remove_user(command: &RemoveUser, session: &mut QuizSession) -> bool {
    log_command(command);
    let removed = session.remove_user(&command.name);
    if !removed {
        warn!(name = %command.name, "Remove requested for a user who is not seated");
    }
    removed
}

/// Returns the seated users' unfinished game, or a fresh unsaved one.
///
/// # Errors
///
/// Returns `ValidationError::NoUsersLoaded` when nobody is seated, or the
/// repository's error.
pub async fn propose_game(
    session: &QuizSession,
    repo: &dyn DocumentRepository,
) -> Result<Game, DomainError> {
    let user_ids = session.user_ids()?;
    Ok(Game::find_by_participants(repo, &user_ids)
        .await?
        .unwrap_or_default())
}

/// Makes `game` the running game and puts up its first question.
///
/// An unsaved game gets every seated user as participant, is stored, and is
/// added to each user's game history. A stored game is resumed with the
/// scores it recorded.
///
/// # Errors
///
/// Returns `ValidationError::NoUsersLoaded` when nobody is seated, a
/// validation error if the game cannot take the participants, or the
/// repository's or provider's error.
pub async fn start_game(
    session: &mut QuizSession,
    mut game: Game,
    ctx: QuizContext<'_>,
) -> Result<RecordId, DomainError> {
    let user_ids = session.user_ids()?;

    let game_id = match game.id() {
        Some(id) => id,
        None => {
            for user_id in &user_ids {
                game.add_participant(*user_id, ctx.repo).await?;
            }
            let id = game.save(ctx.repo, ctx.clock).await?;
            for user in session.users_mut() {
                user.join_game(id, ctx.repo).await?;
                user.save(ctx.repo).await?;
            }
            info!(game_id = %id, participants = user_ids.len(), "Created game");
            id
        }
    };

    session.begin_game(game);
    load_next_question(session, ctx).await?;
    Ok(game_id)
}

/// Handles `StartGame`: resumes or creates a game for the seated users.
///
/// While a game is already running it is continued in place, keeping the
/// scores held in the session.
///
/// # Errors
///
/// Same as [`start_game`] and [`continue_game`].
pub async fn handle_start_game(
    command: &StartGame,
    session: &mut QuizSession,
    ctx: QuizContext<'_>,
) -> Result<StartGameResult, DomainError> {
    log_command(command);
    if let Some(game_id) = session.active_game().and_then(Game::id) {
        let question_code = continue_game(session, ctx).await?;
        return Ok(StartGameResult {
            game_id,
            resumed: true,
            question_code,
        });
    }
    let game = propose_game(session, ctx.repo).await?;
    let resumed = game.id().is_some();
    let game_id = start_game(session, game, ctx).await?;
    let question_code = session
        .current_question()
        .map(|q| q.code().clone())
        .ok_or(ValidationError::NoActiveGame)?;
    Ok(StartGameResult {
        game_id,
        resumed,
        question_code,
    })
}

/// Puts up a question none of the seated users has seen, with freshly
/// shuffled answers.
///
/// # Errors
///
/// Returns the question source's error.
pub async fn load_next_question(
    session: &mut QuizSession,
    ctx: QuizContext<'_>,
) -> Result<QuestionCode, DomainError> {
    let known = session.known_question_codes();
    let question = ctx.questions.fetch_unseen(ctx.repo, &known, ctx.rng).await?;
    let permutation = {
        let mut rng = ctx
            .rng
            .lock()
            .map_err(|e| DomainError::Infrastructure(format!("RNG mutex poisoned: {e}")))?;
        AnswerPermutation::shuffled(&mut *rng)
    };
    let code = question.code().clone();
    session.set_current_question(question, permutation);
    info!(%code, known = known.len(), "Question loaded");
    Ok(code)
}

/// Records an answer and scores the question if it was the last one
/// missing.
///
/// # Errors
///
/// Only persistence or question-loading failures after a resolution are
/// errors; rejected answers are reported through [`AnswerOutcome`].
pub async fn register_answer(
    session: &mut QuizSession,
    user_name: &str,
    slot: AnswerSlot,
    ctx: QuizContext<'_>,
) -> Result<AnswerOutcome, DomainError> {
    let outcome = session.record_answer(user_name, slot);
    if !outcome.accepted() {
        warn!(user_name, ?outcome, "Answer rejected");
        return Ok(outcome);
    }
    if consider_question(session, ctx).await? {
        Ok(AnswerOutcome::Resolved)
    } else {
        Ok(outcome)
    }
}

/// Handles `SubmitAnswer`, parsing the choice letter first.
///
/// # Errors
///
/// Same as [`register_answer`].
pub async fn handle_submit_answer(
    command: &SubmitAnswer,
    session: &mut QuizSession,
    ctx: QuizContext<'_>,
) -> Result<AnswerOutcome, DomainError> {
    log_command(command);
    let Some(slot) = AnswerSlot::parse(&command.choice) else {
        warn!(choice = %command.choice, "Invalid answer choice");
        return Ok(AnswerOutcome::InvalidChoice);
    };
    register_answer(session, &command.user_name, slot, ctx).await
}

/// Scores the open question if every seated user has answered, stores the
/// game and the users, and puts up the next question.
///
/// Returns `false` while answers are still pending. The question counts as
/// resolved before anything is written, so a storage failure does not
/// score it twice.
///
/// # Errors
///
/// Returns the repository's or question source's error.
pub async fn consider_question(
    session: &mut QuizSession,
    ctx: QuizContext<'_>,
) -> Result<bool, DomainError> {
    let Some(resolved) = session.resolve_question() else {
        return Ok(false);
    };
    info!(
        code = %resolved.code,
        correct_slot = %resolved.correct_slot,
        correct_users = ?resolved.correct_users,
        "Question resolved"
    );

    store_progress(session, ctx).await?;
    load_next_question(session, ctx).await?;
    Ok(true)
}

/// Stores the running game and every seated user.
async fn store_progress(
    session: &mut QuizSession,
    ctx: QuizContext<'_>,
) -> Result<(), DomainError> {
    if let Some(game) = session.active_game_mut() {
        game.save(ctx.repo, ctx.clock).await?;
    }
    for user in session.users_mut() {
        user.save(ctx.repo).await?;
    }
    Ok(())
}

/// Brings the running game back to an open question.
///
/// An open question is left as it is. Otherwise the last resolution, or a
/// failed question load, did not complete: the game and users are stored
/// again and the next question is put up.
///
/// # Errors
///
/// Returns the repository's or question source's error.
pub async fn continue_game(
    session: &mut QuizSession,
    ctx: QuizContext<'_>,
) -> Result<QuestionCode, DomainError> {
    let open = session
        .current_question()
        .filter(|_| session.phase() == SessionPhase::QuestionPending);
    if let Some(question) = open {
        return Ok(question.code().clone());
    }
    warn!(phase = ?session.phase(), "Continuing game without an open question");
    store_progress(session, ctx).await?;
    load_next_question(session, ctx).await
}

/// Handles `FinishGame`: ends the running game, naming the unique top
/// scorer as winner, and stores it.
///
/// # Errors
///
/// Returns `ValidationError::NoActiveGame` when no game runs, or the
/// repository's error.
pub async fn handle_finish_game(
    command: &FinishGame,
    session: &mut QuizSession,
    ctx: QuizContext<'_>,
) -> Result<FinishGameResult, DomainError> {
    log_command(command);
    let winner = session.leader().map(|(name, id)| (id, name.to_owned()));
    let game = finish_game(session, winner.as_ref().map(|(id, _)| *id), ctx)
        .await?
        .ok_or(ValidationError::NoActiveGame)?;
    let game_id = game.id().ok_or(ValidationError::Unsaved(Collection::Games))?;
    Ok(FinishGameResult {
        game_id,
        winner,
        score_vector: game.score_vector(),
    })
}

/// Marks the running game finished with `winner`, stores it, and returns
/// the session to having no game. Returns `None` if no game was running.
///
/// The finished copy replaces the running game only once it is stored; on
/// error the session keeps running the unchanged game.
///
/// # Errors
///
/// Returns a validation error if a different winner was already recorded,
/// or the repository's error.
pub async fn finish_game(
    session: &mut QuizSession,
    winner: Option<RecordId>,
    ctx: QuizContext<'_>,
) -> Result<Option<Game>, DomainError> {
    let Some(running) = session.active_game() else {
        return Ok(None);
    };
    let mut game = running.clone();
    game.finish(winner)?;
    let game_id = game.save(ctx.repo, ctx.clock).await?;
    info!(%game_id, winner = ?winner, "Game finished");
    session.end_game();
    Ok(Some(game))
}
